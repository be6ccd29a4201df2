use chrono::{DateTime, Utc};

use crate::aggregate::Aggregator;
use crate::cascade::Cascade;
use crate::error::AnalysisError;
use crate::input::AnalysisInput;
use crate::missing_bank::MissingBanks;
use crate::normalize::normalize;
use crate::related_party::build_patterns;
use crate::report::AnalysisReport;
use crate::tables::RuleTables;
use crate::transfer::TransferMatcher;

/// One-shot batch analyzer. Holds only the rule tables; every run owns its
/// working collections exclusively and produces a single report.
pub struct Analyzer {
    tables: RuleTables,
}

impl Analyzer {
    pub fn new(tables: RuleTables) -> Self {
        Analyzer { tables }
    }

    /// Analyzer with the built-in Malaysian rule set.
    pub fn with_default_tables() -> Self {
        Analyzer::new(RuleTables::malaysia())
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    /// Run the full pipeline, stamping the report with the current time.
    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_at(input, Utc::now())
    }

    /// Run the full pipeline with an injected timestamp. Identical input
    /// and timestamp yield a byte-identical serialized report.
    pub fn analyze_at(
        &self,
        input: &AnalysisInput,
        generated_at: DateTime<Utc>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let mut txns = normalize(input)?;
        tracing::debug!(transactions = txns.len(), "normalized statement lines");

        let missing = MissingBanks::detect(&txns, &self.tables);
        if !missing.is_empty() {
            tracing::info!(
                banks = missing.occurrences.len(),
                "descriptions reference counterparty banks that were not supplied"
            );
        }
        let patterns = build_patterns(&input.config.related_parties, &self.tables);

        let matcher = TransferMatcher::new(&self.tables, &missing, &input.config.company_keywords);
        let (matched, unverified) = matcher.run(&mut txns);
        tracing::debug!(
            matched = matched.len(),
            unverified = unverified.len(),
            "transfer passes complete"
        );

        Cascade::new(&self.tables, &patterns).run(&mut txns);

        let report = Aggregator::new(&self.tables).build_report(
            input,
            &txns,
            matched,
            unverified,
            &missing,
            generated_at,
        );
        tracing::info!(
            transactions = report.report_info.total_transactions,
            accounts = report.report_info.total_accounts,
            score = report.integrity_score.score,
            "analysis complete"
        );
        Ok(report)
    }
}
