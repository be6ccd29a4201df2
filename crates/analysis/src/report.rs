use chrono::{DateTime, NaiveDate, Utc};
use kira_core::{Category, CoverageStatus, Direction, Money, Month, StatutoryType, VolatilityLevel};
use serde::Serialize;

use crate::transfer::{MatchedTransfer, UnverifiedTransfer};

/// The complete result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub report_info: ReportInfo,
    pub consolidated: Consolidated,
    pub transfers: TransferSection,
    pub related_party_transactions: RelatedPartySection,
    pub categories: CategorySection,
    pub counterparties: CounterpartySection,
    pub flags: FlagSection,
    pub statutory_coverage: Vec<StatutoryCoverage>,
    pub volatility: VolatilitySummary,
    pub integrity_score: IntegrityScore,
    pub accounts: Vec<AccountReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportInfo {
    pub company_name: String,
    pub generated_at: DateTime<Utc>,
    /// "start - end" over the transaction set, empty when there are no rows.
    pub period: String,
    pub total_accounts: usize,
    pub total_transactions: usize,
    pub month_count: usize,
    pub missing_bank_accounts: Vec<MissingBankAccount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingBankAccount {
    pub label: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Consolidated {
    pub gross: SideTotals,
    pub exclusions: Exclusions,
    /// Gross minus exclusions, per side.
    pub business_turnover: SideTotals,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SideTotals {
    pub total_credits: Money,
    pub total_debits: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct Exclusions {
    pub total_credits: Money,
    pub total_debits: Money,
    pub credit_breakdown: Vec<ExclusionEntry>,
    pub debit_breakdown: Vec<ExclusionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExclusionEntry {
    pub reason: Category,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferSection {
    pub matched: Vec<MatchedTransfer>,
    pub unverified: Vec<UnverifiedTransfer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedPartySection {
    pub count: usize,
    pub total_credits: Money,
    pub total_debits: Money,
    /// Itemized rows, sorted by date.
    pub details: Vec<RelatedPartyDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedPartyDetail {
    pub date: NaiveDate,
    pub party: String,
    pub relationship: String,
    pub amount: Money,
    pub direction: Direction,
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySection {
    pub credits: Vec<CategoryBreakdown>,
    pub debits: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub count: usize,
    pub amount: Money,
    /// Share of the side's gross total.
    pub percentage: f64,
    pub top_transactions: Vec<TransactionDigest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDigest {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterpartySection {
    pub top_payers: Vec<CounterpartyEntry>,
    pub top_payees: Vec<CounterpartyEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterpartyEntry {
    pub name: String,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlagSection {
    pub round_figures: Vec<RoundFigureFlag>,
    pub round_figure_total: Money,
    /// Round-figure total as a share of gross credits.
    pub round_figure_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundFigureFlag {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatutoryCoverage {
    pub kind: StatutoryType,
    pub months_found: Vec<Month>,
    pub expected_months: usize,
    pub status: CoverageStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolatilitySummary {
    pub overall_pct: f64,
    pub overall_level: VolatilityLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityScore {
    /// Earned points as a percentage of the maximum, rounded to 1dp.
    pub score: f64,
    pub earned_points: u32,
    pub max_points: u32,
    pub checks: Vec<IntegrityCheck>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityCheck {
    pub id: u32,
    pub name: String,
    pub status: CheckStatus,
    pub points: u32,
    pub max_points: u32,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub account_id: String,
    pub bank_name: String,
    pub account_number: String,
    pub total_credits: Money,
    pub total_debits: Money,
    pub closing_balance: Money,
    pub monthly_summary: Vec<MonthlyReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: Month,
    pub opening: Money,
    pub credits: Money,
    pub debits: Money,
    pub closing: Money,
    pub highest_intraday: Money,
    pub lowest_intraday: Money,
    pub volatility_pct: f64,
    pub volatility_level: VolatilityLevel,
}
