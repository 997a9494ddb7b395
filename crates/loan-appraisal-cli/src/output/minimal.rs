use serde_json::{Map, Value};

/// Headline figure per result kind, in order of priority.
const PRIORITY_KEYS: [&str; 4] = ["recommendation", "display_payment", "irr", "total_payment"];

/// Print just the key answer from the output.
///
/// An appraisal prints its recommendation with the metric that drove it
/// (`RISKY dti=68.39`); other results print the first priority field found,
/// falling back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(line) = appraisal_line(map) {
            println!("{}", line);
            return;
        }

        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn appraisal_line(map: &Map<String, Value>) -> Option<String> {
    let recommendation = map.get("recommendation")?;
    // Personal results carry an income allocation, business results do not.
    let driver = if map.contains_key("income_allocation") { "dti" } else { "npv" };
    let figure = map.get(driver).map(format_minimal).unwrap_or_default();
    let tag = format_minimal(recommendation).to_uppercase();
    Some(format!("{tag} {driver}={figure}"))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
