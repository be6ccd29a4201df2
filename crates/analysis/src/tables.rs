use std::collections::{BTreeMap, BTreeSet};

use kira_core::{Money, StatutoryType};
use serde::Deserialize;

use crate::error::AnalysisError;

/// Keyword lists, bank-code tables and numeric thresholds driving the
/// classification passes. Pure lookup data, loaded from TOML so the rule set
/// can change without touching the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleTables {
    /// Bank code → display name, for the missing-counterparty scan.
    pub bank_codes: BTreeMap<String, String>,
    /// Codes whose accounts are assumed present even if not uploaded.
    pub provided_bank_codes: BTreeSet<String>,
    pub inter_account_markers: Vec<String>,
    pub statutory_keywords: StatutoryKeywords,
    pub loan_keywords: Vec<String>,
    pub interest_keywords: Vec<String>,
    pub reversal_keywords: Vec<String>,
    pub salary_keywords: Vec<String>,
    pub utility_keywords: Vec<String>,
    pub bank_charge_keywords: Vec<String>,
    pub stop_words: BTreeSet<String>,
    pub context_keywords: Vec<String>,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatutoryKeywords {
    pub epf_kwsp: Vec<String>,
    pub socso_perkeso: Vec<String>,
    pub lhdn_tax: Vec<String>,
    pub hrdf_psmb: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    pub amount_tolerance: Money,
    pub date_tolerance_days: i64,
    pub large_transfer: Money,
    pub round_figure_min: Money,
    pub round_figure_step: i64,
    pub bank_charge_cap: Money,
    pub round_figure_fail_pct: f64,
}

const MALAYSIA_TABLES: &str = include_str!("../tables/malaysia.toml");

impl RuleTables {
    pub fn from_toml(content: &str) -> Result<Self, AnalysisError> {
        toml::from_str(content).map_err(|e| AnalysisError::InvalidTables(e.to_string()))
    }

    /// The built-in Malaysian rule set.
    pub fn malaysia() -> Self {
        Self::from_toml(MALAYSIA_TABLES).expect("embedded rule tables are valid")
    }

    pub fn statutory_keywords_for(&self, kind: StatutoryType) -> &[String] {
        match kind {
            StatutoryType::EpfKwsp => &self.statutory_keywords.epf_kwsp,
            StatutoryType::SocsoPerkeso => &self.statutory_keywords.socso_perkeso,
            StatutoryType::LhdnTax => &self.statutory_keywords.lhdn_tax,
            StatutoryType::HrdfPsmb => &self.statutory_keywords.hrdf_psmb,
        }
    }
}

/// Case-sensitive containment over an already-uppercased description.
pub fn contains_any(description_upper: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| description_upper.contains(k.as_str()))
}
