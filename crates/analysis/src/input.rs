use std::collections::BTreeMap;

use kira_core::{Money, Month};
use serde::Deserialize;

/// One uploaded statement file, as produced by the ingestion layer.
///
/// Numeric fields may be absent or null; they default to zero. `date` and
/// `description` are kept optional here so the normalizer can report which
/// account and row is missing them instead of a bare serde error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatement {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub monthly_summary: Vec<MonthlySummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub credit: Option<Money>,
    #[serde(default)]
    pub debit: Option<Money>,
    #[serde(default)]
    pub balance: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlySummary {
    pub month: Month,
    #[serde(default)]
    pub highest_balance: Money,
    #[serde(default)]
    pub lowest_balance: Money,
    #[serde(default)]
    pub ending_balance: Money,
    #[serde(default)]
    pub net_change: Money,
    #[serde(default)]
    pub total_credit: Money,
    #[serde(default)]
    pub total_debit: Money,
    #[serde(default)]
    pub transaction_count: u64,
}

/// Metadata for one account, supplied separately from the statement file.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub bank_name: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedParty {
    pub name: String,
    pub relationship: String,
}

/// Run configuration: who the company is and which parties are related.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub company_name: String,
    /// Aliases of the company's own name, for self-transfer detection.
    #[serde(default)]
    pub company_keywords: Vec<String>,
    #[serde(default)]
    pub related_parties: Vec<RelatedParty>,
}

/// Everything one analysis run consumes. Both maps are BTreeMaps so account
/// iteration order — and therefore the whole run — is independent of the
/// order the caller inserted them in.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub config: AnalysisConfig,
    pub accounts: BTreeMap<String, AccountInfo>,
    pub statements: BTreeMap<String, RawStatement>,
}
