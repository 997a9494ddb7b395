use loan_appraisal_core::amortization::{
    analyze_loan, compute_schedule, CalculationResult, LoanInputs, LoanPurpose,
    PaymentFrequency, RepaymentMethod, UserType,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOLERANCE: Decimal = dec!(0.0001);

fn scenario_a() -> LoanInputs {
    LoanInputs {
        amount: dec!(2_000_000_000),
        annual_rate: dec!(8.5),
        term_months: 240,
        inflation: dec!(4),
        user_type: UserType::Personal,
        purpose: LoanPurpose::HomeBuying,
        repayment_method: RepaymentMethod::Annuity,
        frequency: PaymentFrequency::Monthly,
        tax_rate: Decimal::ZERO,
        monthly_income: dec!(60_000_000),
        grace_period_months: 0,
        balloon_amount: Decimal::ZERO,
    }
}

fn assert_closes_to_zero(r: &CalculationResult) {
    assert!(!r.schedule.is_empty());
    for row in &r.schedule {
        assert!(row.balance >= Decimal::ZERO, "negative balance at {}", row.period);
    }
    assert_eq!(r.final_balance(), Decimal::ZERO);
}

// ===========================================================================
// Scenario A: 20-year annuity
// ===========================================================================

#[test]
fn test_scenario_a_annuity_schedule() {
    let r = compute_schedule(&scenario_a());
    assert_eq!(r.schedule.len(), 240);
    assert_closes_to_zero(&r);
    assert_eq!(r.display_payment, r.schedule[0].payment);

    // PMT ≈ 17,356,464.67
    assert!((r.display_payment - dec!(17_356_464.67)).abs() < dec!(0.01));
}

#[test]
fn test_scenario_a_payment_constant() {
    let r = compute_schedule(&scenario_a());
    let first = r.schedule[0].payment;
    for row in &r.schedule {
        assert!(
            (row.payment - first).abs() < TOLERANCE,
            "period {} payment {} differs from {}",
            row.period,
            row.payment,
            first
        );
    }
}

#[test]
fn test_annuity_principal_share_grows() {
    let r = compute_schedule(&scenario_a());
    for pair in r.schedule.windows(2) {
        assert!(pair[1].principal > pair[0].principal);
        assert!(pair[1].interest < pair[0].interest);
    }
}

// ===========================================================================
// Scenario B: 12-month grace period
// ===========================================================================

#[test]
fn test_scenario_b_grace_period() {
    let mut inputs = scenario_a();
    inputs.grace_period_months = 12;
    let r = compute_schedule(&inputs);

    assert_eq!(r.schedule.len(), 240);
    for row in &r.schedule[..12] {
        assert_eq!(row.principal, Decimal::ZERO);
        assert_eq!(row.payment, row.interest);
        assert_eq!(row.balance, dec!(2_000_000_000));
    }
    assert_eq!(r.display_payment, r.schedule[12].payment);
    assert!(r.display_payment > r.schedule[0].payment);

    // Annuity over the remaining 228 periods ≈ 17,708,912.61
    assert!((r.display_payment - dec!(17_708_912.61)).abs() < dec!(0.01));
    assert_closes_to_zero(&r);
}

// ===========================================================================
// Scenario C: flat rate
// ===========================================================================

#[test]
fn test_scenario_c_flat_rate_interest_constant() {
    let inputs = LoanInputs {
        amount: dec!(100_000_000),
        annual_rate: dec!(18),
        term_months: 36,
        purpose: LoanPurpose::Consumption,
        repayment_method: RepaymentMethod::FlatRate,
        ..scenario_a()
    };
    let r = compute_schedule(&inputs);
    assert_eq!(r.schedule.len(), 36);
    for row in &r.schedule {
        // 100M × 18% × 3 years / 36 periods
        assert_eq!(row.interest, dec!(1_500_000));
    }
    assert_eq!(r.total_interest, dec!(54_000_000));
    assert_closes_to_zero(&r);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_reducing_balance_principal_identical() {
    let inputs = LoanInputs {
        repayment_method: RepaymentMethod::ReducingBalance,
        ..scenario_a()
    };
    let r = compute_schedule(&inputs);
    let first = r.schedule[0].principal;
    for row in &r.schedule {
        assert!((row.principal - first).abs() < TOLERANCE);
    }
    for pair in r.schedule.windows(2) {
        assert!(pair[1].payment < pair[0].payment);
    }
}

#[test]
fn test_principal_sums_to_amount_for_every_method() {
    let methods = [
        RepaymentMethod::Annuity,
        RepaymentMethod::ReducingBalance,
        RepaymentMethod::FlatRate,
    ];
    let frequencies = [
        PaymentFrequency::Monthly,
        PaymentFrequency::Quarterly,
        PaymentFrequency::SemiAnnually,
        PaymentFrequency::Yearly,
    ];
    for method in methods {
        for frequency in frequencies {
            let inputs = LoanInputs {
                repayment_method: method,
                frequency,
                grace_period_months: 6,
                balloon_amount: dec!(300_000_000),
                ..scenario_a()
            };
            let r = compute_schedule(&inputs);
            let balloon = inputs.balloon_amount;
            let amortized = r.total_principal() - balloon;
            assert!(
                (amortized - (inputs.amount - balloon)).abs() < TOLERANCE,
                "{method:?}/{frequency:?}: amortized {amortized}"
            );
            assert_closes_to_zero(&r);
        }
    }
}

#[test]
fn test_period_counts_per_frequency() {
    let cases = [
        (PaymentFrequency::Monthly, 240),
        (PaymentFrequency::Quarterly, 80),
        (PaymentFrequency::SemiAnnually, 40),
        (PaymentFrequency::Yearly, 20),
    ];
    for (frequency, expected) in cases {
        let r = compute_schedule(&LoanInputs {
            frequency,
            ..scenario_a()
        });
        assert_eq!(r.schedule.len(), expected, "{frequency:?}");
        assert_eq!(r.schedule.last().unwrap().period, expected as u32);
    }
}

#[test]
fn test_partial_year_term_rounds_periods_up() {
    let r = compute_schedule(&LoanInputs {
        term_months: 18,
        frequency: PaymentFrequency::Yearly,
        ..scenario_a()
    });
    assert_eq!(r.schedule.len(), 2);
    assert_closes_to_zero(&r);
}

#[test]
fn test_balloon_lands_in_final_payment() {
    let inputs = LoanInputs {
        term_months: 60,
        balloon_amount: dec!(500_000_000),
        ..scenario_a()
    };
    let r = compute_schedule(&inputs);
    let last = r.schedule.last().unwrap();
    assert!(last.payment > dec!(500_000_000));
    assert!(last.principal > dec!(500_000_000));
    assert_closes_to_zero(&r);
}

#[test]
fn test_recompute_is_idempotent() {
    let inputs = LoanInputs {
        grace_period_months: 3,
        inflation: dec!(7),
        user_type: UserType::Business,
        tax_rate: dec!(20),
        ..scenario_a()
    };
    assert_eq!(compute_schedule(&inputs), compute_schedule(&inputs));
}

#[test]
fn test_guarded_inputs_return_zero_result() {
    let zero = CalculationResult::default();
    assert_eq!(
        compute_schedule(&LoanInputs {
            amount: Decimal::ZERO,
            ..scenario_a()
        }),
        zero
    );
    assert_eq!(
        compute_schedule(&LoanInputs {
            term_months: 0,
            ..scenario_a()
        }),
        zero
    );
    assert_eq!(
        compute_schedule(&LoanInputs {
            grace_period_months: 300,
            ..scenario_a()
        }),
        zero
    );
}

#[test]
fn test_analyze_loan_envelope() {
    let out = analyze_loan(&scenario_a()).unwrap();
    assert_eq!(out.result.schedule.len(), 240);
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    assert_eq!(out.assumptions["plan"]["total_periods"], 240);
    assert!(!out.methodology.is_empty());
}

// ===========================================================================
// Extreme rates
// ===========================================================================

#[test]
fn test_high_rate_annuity_schedules() {
    // 300% a year is 25% a month; the level payment is ≈ 25% of principal
    let inputs = LoanInputs {
        annual_rate: dec!(300),
        ..LoanInputs::default()
    };
    let r = compute_schedule(&inputs);
    assert_eq!(r.schedule.len(), 240);
    assert!((r.display_payment - dec!(500_000_000)).abs() < dec!(0.01));
    assert_closes_to_zero(&r);
    assert!((r.total_principal() - inputs.amount).abs() < TOLERANCE);
}

#[test]
fn test_overflowing_rate_yields_empty_schedule() {
    // 1000% a month compounds past the representable range
    let inputs = LoanInputs {
        annual_rate: dec!(12_000),
        ..LoanInputs::default()
    };
    assert_eq!(compute_schedule(&inputs), CalculationResult::default());
    assert!(analyze_loan(&inputs).is_err());
}
