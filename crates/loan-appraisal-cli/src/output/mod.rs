//! Renderers for command results. Every command hands back a JSON value,
//! usually a `ComputationOutput` envelope, and `--output` picks the view.

pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;
use tracing::debug;

pub fn format_output(format: &OutputFormat, value: &Value) {
    debug!(?format, "rendering output");
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
