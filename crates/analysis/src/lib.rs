//! Bank-statement turnover and integrity analysis.
//!
//! Flattens multi-account statement data into one deterministic order,
//! reconciles inter-account transfers, classifies every line through a
//! priority cascade, and aggregates turnover, exclusion and integrity
//! metrics into a single report object. Pure batch computation: no I/O,
//! no shared state across runs.

pub mod aggregate;
pub mod cascade;
pub mod error;
pub mod input;
pub mod missing_bank;
pub mod normalize;
pub mod related_party;
pub mod report;
pub mod tables;
pub mod transfer;

mod engine;

pub use engine::Analyzer;
pub use error::AnalysisError;
pub use input::{AccountInfo, AnalysisConfig, AnalysisInput, RawStatement, RelatedParty};
pub use report::AnalysisReport;
pub use tables::RuleTables;

/// Run one analysis with the built-in rule tables.
pub fn analyze(input: &AnalysisInput) -> Result<AnalysisReport, AnalysisError> {
    Analyzer::with_default_tables().analyze(input)
}
