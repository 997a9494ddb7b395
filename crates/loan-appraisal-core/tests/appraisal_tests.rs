use loan_appraisal_core::amortization::{
    compute_schedule, LoanInputs, LoanPurpose, PaymentFrequency, UserType,
};
use loan_appraisal_core::appraisal::{
    appraise, compute_appraisal, npv_profile, AdviceClause, AppraisalInput, InvestmentInputs,
    Recommendation,
};
use loan_appraisal_core::time_value::npv;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn business_loan() -> LoanInputs {
    LoanInputs::defaults_for(UserType::Business)
}

// ===========================================================================
// Scenario D: short business loan against a modest project
// ===========================================================================

#[test]
fn test_scenario_d_business_reject() {
    let inputs = business_loan();
    assert_eq!(inputs.amount, dec!(5_000_000_000));
    assert_eq!(inputs.annual_rate, dec!(7.5));
    assert_eq!(inputs.term_months, 12);

    let inv = InvestmentInputs {
        equity: dec!(1_000_000_000),
        projected_cashflow: dec!(600_000_000),
        wacc: dec!(12),
    };
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&inv, &loan, &inputs);

    // One appraisal year; debt service ≈ 5.205bn against 600M of cash flow
    assert_eq!(r.yearly_cash_flows.len(), 1);
    assert!((r.min_dscr - dec!(0.1153)).abs() < dec!(0.0001), "dscr {}", r.min_dscr);
    assert!(r.npv < Decimal::ZERO);
    assert_eq!(r.recommendation, Recommendation::Reject);
    assert!(matches!(r.advice_clauses[0], AdviceClause::ValueDestroying(_)));
    assert_eq!(r.dti, Decimal::ZERO);
}

#[test]
fn test_business_invest_case() {
    let inputs = LoanInputs {
        amount: dec!(1_000_000_000),
        annual_rate: dec!(8),
        term_months: 60,
        purpose: LoanPurpose::ProjectInvestment,
        ..business_loan()
    };
    let inv = InvestmentInputs::default();
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&inv, &loan, &inputs);

    // Debt service ≈ 243.3M/yr => DSCR ≈ 2.47; NPV ≈ 285.8M; IRR ≈ 23.0%
    assert_eq!(r.yearly_cash_flows.len(), 5);
    assert!((r.min_dscr - dec!(2.4659)).abs() < dec!(0.001));
    assert!((r.npv - dec!(285_763_358)).abs() < dec!(1_000));
    assert!((r.irr - dec!(23.0)).abs() < dec!(0.01), "irr {}", r.irr);
    assert!(r.irr_solution.unwrap().converged);
    assert_eq!(r.recommendation, Recommendation::Invest);
    assert!(r.advice.contains("above"));
}

#[test]
fn test_npv_consistent_with_yearly_breakdown() {
    let inputs = LoanInputs {
        term_months: 36,
        frequency: PaymentFrequency::Quarterly,
        ..business_loan()
    };
    let inv = InvestmentInputs {
        projected_cashflow: dec!(2_500_000_000),
        ..InvestmentInputs::default()
    };
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&inv, &loan, &inputs);

    let debt_service: Decimal = r.yearly_cash_flows.iter().map(|y| y.debt_service).sum();
    assert!((debt_service - loan.total_payment).abs() < dec!(0.0001));

    let flows: Vec<Decimal> = std::iter::once(-inv.equity)
        .chain(r.yearly_cash_flows.iter().map(|y| y.net_cash_flow))
        .collect();
    assert_eq!(r.npv, npv(dec!(0.12), &flows).unwrap());
}

// ===========================================================================
// DSCR with debt-free years
// ===========================================================================

#[test]
fn test_debt_free_year_never_binds() {
    // Zero-rate loan with a 12-month grace: year 1 pays nothing
    let inputs = LoanInputs {
        amount: dec!(1_200_000_000),
        annual_rate: Decimal::ZERO,
        term_months: 24,
        grace_period_months: 12,
        ..business_loan()
    };
    let inv = InvestmentInputs {
        projected_cashflow: dec!(1_800_000_000),
        ..InvestmentInputs::default()
    };
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&inv, &loan, &inputs);

    assert_eq!(r.yearly_cash_flows[0].debt_service, Decimal::ZERO);
    assert_eq!(r.yearly_cash_flows[0].dscr, None);
    assert_eq!(r.yearly_cash_flows[1].debt_service, dec!(1_200_000_000));
    assert_eq!(r.min_dscr, dec!(1.5));
}

#[test]
fn test_all_years_debt_free_reports_zero_and_counts_as_safe() {
    let inputs = business_loan();
    let inv = InvestmentInputs {
        equity: dec!(100),
        projected_cashflow: dec!(1_000),
        wacc: dec!(10),
    };
    // Empty schedule => no debt service anywhere
    let loan = compute_schedule(&LoanInputs {
        amount: Decimal::ZERO,
        ..inputs.clone()
    });
    let r = compute_appraisal(&inv, &loan, &inputs);
    assert_eq!(r.min_dscr, Decimal::ZERO);
    assert_eq!(r.recommendation, Recommendation::Invest);
}

// ===========================================================================
// Scenario E: personal borrower over-stretched
// ===========================================================================

#[test]
fn test_scenario_e_personal_risky() {
    let inputs = LoanInputs {
        term_months: 60,
        ..LoanInputs::defaults_for(UserType::Personal)
    };
    assert_eq!(inputs.monthly_income, dec!(60_000_000));
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&InvestmentInputs::default(), &loan, &inputs);

    // PMT ≈ 41.03M against 60M income => DTI ≈ 68.4%
    assert!((r.dti - dec!(68.39)).abs() < dec!(0.01), "dti {}", r.dti);
    assert_eq!(r.recommendation, Recommendation::Risky);
    assert!(r.advice.contains("WARNING"));
    assert!(r.advice.contains("borrowing less"));
    // Home purchase above 40% also suggests a longer term
    assert!(r.advice_clauses.contains(&AdviceClause::ExtendHomeLoanTerm));
    assert_eq!(r.npv, Decimal::ZERO);
}

#[test]
fn test_personal_default_is_safe() {
    let inputs = LoanInputs::defaults_for(UserType::Personal);
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&InvestmentInputs::default(), &loan, &inputs);
    // 17.36M / 60M ≈ 28.9%
    assert_eq!(r.recommendation, Recommendation::Safe);
    assert_eq!(r.advice_clauses.len(), 1);
}

#[test]
fn test_zero_income_dti_is_zero() {
    let inputs = LoanInputs {
        monthly_income: Decimal::ZERO,
        ..LoanInputs::defaults_for(UserType::Personal)
    };
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&InvestmentInputs::default(), &loan, &inputs);
    assert_eq!(r.dti, Decimal::ZERO);
    assert_eq!(r.recommendation, Recommendation::Safe);
}

#[test]
fn test_grace_and_balloon_clauses_for_personal() {
    let inputs = LoanInputs {
        grace_period_months: 12,
        balloon_amount: dec!(400_000_000),
        ..LoanInputs::defaults_for(UserType::Personal)
    };
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&InvestmentInputs::default(), &loan, &inputs);
    assert!(r
        .advice_clauses
        .contains(&AdviceClause::GracePaymentShock { grace_months: 12 }));
    assert!(r.advice.contains("400M"));
}

// ===========================================================================
// Envelope and profile
// ===========================================================================

#[test]
fn test_appraise_matches_pure_functions() {
    let input = AppraisalInput {
        loan: LoanInputs {
            term_months: 48,
            ..business_loan()
        },
        investment: InvestmentInputs {
            projected_cashflow: dec!(2_000_000_000),
            ..InvestmentInputs::default()
        },
    };
    let out = appraise(&input).unwrap();
    let loan = compute_schedule(&input.loan);
    let expected = compute_appraisal(&input.investment, &loan, &input.loan);
    assert_eq!(out.result, expected);
}

#[test]
fn test_appraisal_input_json_round_trip() {
    let input = AppraisalInput {
        loan: business_loan(),
        investment: InvestmentInputs::default(),
    };
    let json = serde_json::to_string(&input).unwrap();
    let back: AppraisalInput = serde_json::from_str(&json).unwrap();
    assert_eq!(back, input);
}

#[test]
fn test_profile_crosses_zero_near_irr() {
    let inputs = LoanInputs {
        amount: dec!(1_000_000_000),
        annual_rate: dec!(8),
        term_months: 60,
        ..business_loan()
    };
    let inv = InvestmentInputs::default();
    let loan = compute_schedule(&inputs);
    let r = compute_appraisal(&inv, &loan, &inputs);
    let points = npv_profile(&inv, &loan, &inputs, r.irr);

    assert_eq!(points.len(), 41);
    for p in &points {
        if p.rate_pct < r.irr - dec!(1) {
            assert!(p.npv > Decimal::ZERO, "npv at {} should be positive", p.rate_pct);
        }
        if p.rate_pct > r.irr + dec!(1) {
            assert!(p.npv < Decimal::ZERO, "npv at {} should be negative", p.rate_pct);
        }
    }
}

#[test]
fn test_extreme_rates_never_panic() {
    let inputs = LoanInputs {
        annual_rate: dec!(300),
        term_months: 60,
        ..business_loan()
    };
    let loan = compute_schedule(&inputs);
    assert_eq!(loan.schedule.len(), 60);
    let r = compute_appraisal(&InvestmentInputs::default(), &loan, &inputs);
    // Debt service dwarfs the cash flow
    assert_eq!(r.recommendation, Recommendation::Reject);

    let overflowing = LoanInputs {
        annual_rate: dec!(12_000),
        ..inputs
    };
    assert!(compute_schedule(&overflowing).is_empty());
    assert!(appraise(&AppraisalInput {
        loan: overflowing,
        investment: InvestmentInputs::default(),
    })
    .is_err());
}
