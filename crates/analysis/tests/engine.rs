//! End-to-end runs of the analysis pipeline over small synthetic books.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use kira_analysis::input::{
    AccountInfo, AnalysisConfig, AnalysisInput, MonthlySummary, RawStatement, RawTransaction,
    RelatedParty,
};
use kira_analysis::Analyzer;
use kira_core::{Category, CoverageStatus, Direction, Money, VolatilityLevel};

fn raw(date: &str, desc: &str, credit: f64, debit: f64) -> RawTransaction {
    RawTransaction {
        date: Some(date.to_string()),
        description: Some(desc.to_string()),
        credit: (credit != 0.0).then(|| Money::from_f64(credit)),
        debit: (debit != 0.0).then(|| Money::from_f64(debit)),
        balance: None,
    }
}

fn account(bank: &str, number: &str) -> AccountInfo {
    AccountInfo {
        bank_name: bank.to_string(),
        account_number: number.to_string(),
    }
}

fn monthly(month: &str, high: f64, low: f64, ending: f64, net: f64) -> MonthlySummary {
    serde_json::from_value(serde_json::json!({
        "month": month,
        "highest_balance": high,
        "lowest_balance": low,
        "ending_balance": ending,
        "net_change": net,
        "total_credit": 0,
        "total_debit": 0,
        "transaction_count": 0,
    }))
    .unwrap()
}

fn build_input(statements: Vec<(&str, RawStatement)>) -> AnalysisInput {
    let statements: BTreeMap<String, RawStatement> = statements
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let accounts = statements
        .keys()
        .map(|k| (k.clone(), account("CIMB", "1234567890")))
        .collect();
    AnalysisInput {
        config: AnalysisConfig {
            company_name: "MY COMPANY SDN BHD".to_string(),
            company_keywords: vec!["MY COMPANY".to_string()],
            related_parties: vec![],
        },
        accounts,
        statements,
    }
}

fn statement(transactions: Vec<RawTransaction>) -> RawStatement {
    RawStatement {
        transactions,
        monthly_summary: vec![],
    }
}

#[test]
fn ibg_transfer_pair_reconciles_across_accounts() {
    let input = build_input(vec![
        (
            "ACC_A",
            statement(vec![raw("2024-01-10", "IBG TRANSFER", 50_000.0, 0.0)]),
        ),
        (
            "ACC_B",
            statement(vec![raw("2024-01-10", "IBG TRANSFER", 0.0, 50_000.0)]),
        ),
    ]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    assert_eq!(report.transfers.matched.len(), 1);
    let m = &report.transfers.matched[0];
    assert_eq!(m.amount, Money::from_units(50_000));
    assert_eq!(m.from_account, "ACC_B");
    assert_eq!(m.to_account, "ACC_A");

    // Both sides excluded from turnover.
    assert_eq!(
        report.consolidated.business_turnover.total_credits,
        Money::zero()
    );
    assert_eq!(
        report.consolidated.business_turnover.total_debits,
        Money::zero()
    );
    let credit_excl = report
        .consolidated
        .exclusions
        .credit_breakdown
        .iter()
        .find(|e| e.reason == Category::InterAccountTransfer)
        .unwrap();
    assert_eq!(credit_excl.amount, Money::from_units(50_000));
    assert_eq!(credit_excl.count, 1);
}

#[test]
fn kwsp_debit_is_statutory_and_counts_as_turnover() {
    let input = build_input(vec![(
        "ACC_A",
        statement(vec![raw("2024-01-15", "KWSP CONTRIBUTION JAN", 0.0, 500.0)]),
    )]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    let debit_cats = &report.categories.debits;
    assert_eq!(debit_cats.len(), 1);
    assert_eq!(debit_cats[0].category, Category::StatutoryPayment);
    // Operating expense: stays in net debits.
    assert_eq!(
        report.consolidated.business_turnover.total_debits,
        Money::from_units(500)
    );
    let epf = report
        .statutory_coverage
        .iter()
        .find(|c| c.kind.to_string() == "EPF/KWSP")
        .unwrap();
    assert_eq!(epf.months_found.len(), 1);
    assert_eq!(epf.status, CoverageStatus::Partial);
}

#[test]
fn duitnow_round_figure_credit_is_flagged_genuine_sales() {
    let input = build_input(vec![(
        "ACC_A",
        statement(vec![raw(
            "2024-01-20",
            "DUITNOW TO ACCOUNT XYZ TRADING",
            12_000.0,
            0.0,
        )]),
    )]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    assert_eq!(report.categories.credits.len(), 1);
    assert_eq!(
        report.categories.credits[0].category,
        Category::GenuineSalesCollections
    );
    assert_eq!(report.flags.round_figures.len(), 1);
    assert_eq!(report.flags.round_figures[0].amount, Money::from_units(12_000));
    assert_eq!(report.flags.round_figure_pct, 100.0);
}

#[test]
fn round_figure_ignores_excluded_categories() {
    // A 20 000 loan disbursement is even and large but not genuine sales.
    let input = build_input(vec![(
        "ACC_A",
        statement(vec![
            raw("2024-01-20", "TERM LOAN DISBURSEMENT", 20_000.0, 0.0),
            raw("2024-01-21", "SALE COLLECTION", 9_000.0, 0.0), // below minimum
        ]),
    )]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();
    assert!(report.flags.round_figures.is_empty());
}

#[test]
fn related_party_debit_matches_full_name_with_purpose() {
    let mut input = build_input(vec![(
        "ACC_A",
        statement(vec![raw(
            "2024-02-05",
            "TRANSFER TO ABC SDN BHD LOAN REPAY",
            0.0,
            15_000.0,
        )]),
    )]);
    input.config.related_parties = vec![RelatedParty {
        name: "ABC Sdn Bhd".to_string(),
        relationship: "Director".to_string(),
    }];
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    let rp = &report.related_party_transactions;
    assert_eq!(rp.count, 1);
    assert_eq!(rp.total_debits, Money::from_units(15_000));
    assert_eq!(rp.details[0].party, "ABC Sdn Bhd");
    assert_eq!(rp.details[0].direction, Direction::Debit);
    assert!(rp.details[0].purpose.starts_with("LOAN"));
    // Related-party flows are excluded from net turnover.
    assert_eq!(
        report.consolidated.business_turnover.total_debits,
        Money::zero()
    );
}

#[test]
fn per_category_sums_equal_gross_totals() {
    let input = build_input(vec![
        (
            "ACC_A",
            statement(vec![
                raw("2024-01-05", "SALE ONE", 1_000.0, 0.0),
                raw("2024-01-06", "PROFIT CREDIT", 50.0, 0.0),
                raw("2024-01-07", "SUPPLIER INVOICE", 0.0, 700.0),
                raw("2024-01-08", "SERVICE CHG", 0.0, 12.0),
            ]),
        ),
        (
            "ACC_B",
            statement(vec![
                raw("2024-01-09", "SALARY RUN", 0.0, 8_000.0),
                raw("2024-01-10", "SALE TWO", 2_500.0, 0.0),
            ]),
        ),
    ]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    let credit_sum: Money = report.categories.credits.iter().map(|c| c.amount).sum();
    let debit_sum: Money = report.categories.debits.iter().map(|c| c.amount).sum();
    assert_eq!(credit_sum, report.consolidated.gross.total_credits);
    assert_eq!(debit_sum, report.consolidated.gross.total_debits);
    assert_eq!(report.consolidated.gross.total_credits, Money::from_f64(3_550.0));
    assert_eq!(report.consolidated.gross.total_debits, Money::from_f64(8_712.0));
}

#[test]
fn identical_input_yields_byte_identical_reports() {
    let stmt_a = statement(vec![
        raw("2024-01-10", "ITB TRF FROM OPS", 20_000.0, 0.0),
        raw("2024-01-15", "KWSP CONTRIBUTION", 0.0, 500.0),
        raw("2024-01-20", "SALE", 3_000.0, 0.0),
    ]);
    let stmt_b = statement(vec![raw("2024-01-10", "ITB TRF OUT", 0.0, 20_000.0)]);

    // Same accounts, inserted in opposite orders.
    let forward = build_input(vec![("ACC_A", stmt_a.clone()), ("ACC_B", stmt_b.clone())]);
    let backward = build_input(vec![("ACC_B", stmt_b), ("ACC_A", stmt_a)]);

    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let analyzer = Analyzer::with_default_tables();
    let one = serde_json::to_string(&analyzer.analyze_at(&forward, at).unwrap()).unwrap();
    let two = serde_json::to_string(&analyzer.analyze_at(&backward, at).unwrap()).unwrap();
    assert_eq!(one, two);

    // And re-running the same input is byte-stable too.
    let three = serde_json::to_string(&analyzer.analyze_at(&forward, at).unwrap()).unwrap();
    assert_eq!(one, three);
}

#[test]
fn monthly_summaries_drive_volatility_and_integrity() {
    let mut stmt = statement(vec![
        raw("2024-01-05", "SALE", 1_000.0, 0.0),
        raw("2024-02-05", "SALE", 1_000.0, 0.0),
    ]);
    stmt.monthly_summary = vec![
        monthly("2024-01", 100_000.0, 90_000.0, 95_000.0, 5_000.0),
        monthly("2024-02", 120_000.0, 20_000.0, 60_000.0, -35_000.0),
    ];
    let input = build_input(vec![("ACC_A", stmt)]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    let acc = &report.accounts[0];
    assert_eq!(acc.monthly_summary.len(), 2);
    assert_eq!(acc.monthly_summary[0].opening, Money::from_units(90_000));
    assert_eq!(acc.monthly_summary[0].volatility_level, VolatilityLevel::Low);
    // high 120k, low 20k: avg 70k, swing 100k → ~142.86% HIGH
    assert_eq!(acc.monthly_summary[1].volatility_level, VolatilityLevel::High);

    // Overall spans global high 120k / global low 20k, same bucket here.
    assert_eq!(report.volatility.overall_level, VolatilityLevel::High);

    // The volatility check fails, so the score drops below maximum.
    let vol_check = report
        .integrity_score
        .checks
        .iter()
        .find(|c| c.name == "Volatility Level")
        .unwrap();
    assert_eq!(vol_check.points, 0);
    assert!(report.integrity_score.score < 100.0);
}

#[test]
fn missing_bank_reference_fails_completeness_check() {
    let input = build_input(vec![(
        "ACC_A",
        statement(vec![
            raw("2024-01-10", "INTERBANK MBB SETTLEMENT", 0.0, 8_000.0),
            raw("2024-01-11", "SALE", 2_000.0, 0.0),
        ]),
    )]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    assert_eq!(report.report_info.missing_bank_accounts.len(), 1);
    assert_eq!(report.report_info.missing_bank_accounts[0].label, "MBB (Maybank)");

    // The one-sided transfer is unverified and excluded.
    assert_eq!(report.transfers.unverified.len(), 1);
    assert_eq!(report.transfers.unverified[0].bank_code, "MBB");
    assert_eq!(
        report.consolidated.business_turnover.total_debits,
        Money::zero()
    );

    let completeness = report
        .integrity_score
        .checks
        .iter()
        .find(|c| c.name == "Data Completeness")
        .unwrap();
    assert_eq!(completeness.points, 0);
}

#[test]
fn statutory_coverage_found_needs_recurring_months() {
    let mut rows = Vec::new();
    for m in 1..=6 {
        rows.push(raw(&format!("2024-{m:02}-15"), "KWSP CONTRIBUTION", 0.0, 500.0));
        rows.push(raw(&format!("2024-{m:02}-20"), "SALE", 1_000.0, 0.0));
    }
    let input = build_input(vec![("ACC_A", statement(rows))]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    let epf = &report.statutory_coverage[0];
    assert_eq!(epf.months_found.len(), 6);
    assert_eq!(epf.expected_months, 6);
    assert_eq!(epf.status, CoverageStatus::Found);

    let statutory_check = report
        .integrity_score
        .checks
        .iter()
        .find(|c| c.name == "Statutory Coverage")
        .unwrap();
    assert_eq!(statutory_check.points, statutory_check.max_points);
}

#[test]
fn empty_input_produces_empty_but_valid_report() {
    let input = build_input(vec![("ACC_A", statement(vec![]))]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    assert_eq!(report.report_info.total_transactions, 0);
    assert_eq!(report.report_info.period, "");
    assert_eq!(report.report_info.month_count, 0);
    assert_eq!(report.consolidated.gross.total_credits, Money::zero());
    assert_eq!(report.volatility.overall_level, VolatilityLevel::Low);
    for c in &report.statutory_coverage {
        assert_eq!(c.status, CoverageStatus::NotApplicable);
    }
}

#[test]
fn top_counterparties_group_by_stripped_prefix() {
    let input = build_input(vec![(
        "ACC_A",
        statement(vec![
            raw("2024-01-10", "DUITNOW TRANSFER ACME SUPPLIES KL", 0.0, 300.0),
            raw("2024-01-11", "DUITNOW TRANSFER ACME SUPPLIES KL", 0.0, 200.0),
            raw("2024-01-12", "IBG TRANSFER OTHER VENDOR", 0.0, 100.0),
        ]),
    )]);
    let report = Analyzer::with_default_tables().analyze(&input).unwrap();

    let payees = &report.counterparties.top_payees;
    assert_eq!(payees[0].name, "ACME SUPPLIES KL");
    assert_eq!(payees[0].count, 2);
    assert_eq!(payees[0].amount, Money::from_units(500));
}
