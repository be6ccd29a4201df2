use thiserror::Error;

/// Failures that abort an analysis run.
///
/// One malformed record corrupts the deterministic total order every later
/// pass depends on, so field and date errors fail the whole run — there is
/// no partial report. Missing numeric fields are not errors; they default
/// to zero at ingestion.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("account {account_id} row {row}: missing required field `{field}`")]
    MissingField {
        account_id: String,
        row: usize,
        field: &'static str,
    },

    #[error("account {account_id}: cannot parse date `{value}`")]
    InvalidDate { account_id: String, value: String },

    #[error("failed to parse rule tables: {0}")]
    InvalidTables(String),
}
