use chrono::NaiveDate;
use kira_core::{Category, Direction, Money, Month};

use crate::error::AnalysisError;
use crate::input::AnalysisInput;

/// A flattened, typed statement line. Owned by one analysis run.
#[derive(Debug, Clone)]
pub struct Txn {
    pub account_id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Uppercased once at ingestion; every matching pass reads this form.
    pub description_upper: String,
    pub debit: Money,
    pub credit: Money,
    pub balance: Money,
    /// Original ingestion order.
    pub sequence_index: usize,
    /// Position in the deterministic total order; the matching key.
    pub sorted_index: usize,
    pub category: Option<Category>,
    pub exclude_from_turnover: bool,
    /// Set when a pass claims this line; later passes skip used lines.
    pub used: bool,
    pub related_party: Option<RelatedPartyTag>,
    pub statutory: Option<kira_core::StatutoryType>,
}

#[derive(Debug, Clone)]
pub struct RelatedPartyTag {
    pub name: String,
    pub relationship: String,
    pub purpose: String,
}

impl Txn {
    pub fn amount(&self) -> Money {
        if !self.credit.is_zero() {
            self.credit
        } else {
            self.debit
        }
    }

    pub fn direction(&self) -> Direction {
        if !self.credit.is_zero() {
            Direction::Credit
        } else {
            Direction::Debit
        }
    }

    pub fn month(&self) -> Month {
        Month::from_date(self.date)
    }

    /// Assign the single category this line will carry, derive its turnover
    /// exclusion, and retire the line from further passes.
    pub fn assign(&mut self, category: Category) {
        self.category = Some(category);
        self.exclude_from_turnover = category.excludes_from_turnover();
        self.used = true;
    }
}

/// Flatten all accounts present in both the statement map and the metadata
/// map into one deterministically ordered collection.
///
/// Zero-value rows (both sides zero) are dropped: they carry no business
/// meaning and would corrupt matching and aggregation. A missing `date` or
/// `description`, or an unparseable date, fails the whole run.
pub fn normalize(input: &AnalysisInput) -> Result<Vec<Txn>, AnalysisError> {
    let mut txns = Vec::new();
    let mut sequence_index = 0usize;

    for (account_id, statement) in &input.statements {
        if !input.accounts.contains_key(account_id) {
            continue; // metadata never supplied — intentional partial-input tolerance
        }

        for (row, raw) in statement.transactions.iter().enumerate() {
            let credit = raw.credit.unwrap_or_default();
            let debit = raw.debit.unwrap_or_default();
            if credit.is_zero() && debit.is_zero() {
                continue;
            }

            let date_str = raw.date.as_deref().ok_or_else(|| AnalysisError::MissingField {
                account_id: account_id.clone(),
                row,
                field: "date",
            })?;
            let description = raw
                .description
                .as_deref()
                .ok_or_else(|| AnalysisError::MissingField {
                    account_id: account_id.clone(),
                    row,
                    field: "description",
                })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
                AnalysisError::InvalidDate {
                    account_id: account_id.clone(),
                    value: date_str.to_string(),
                }
            })?;

            txns.push(Txn {
                account_id: account_id.clone(),
                date,
                description: description.to_string(),
                description_upper: description.to_uppercase(),
                debit,
                credit,
                balance: raw.balance.unwrap_or_default(),
                sequence_index,
                sorted_index: 0,
                category: None,
                exclude_from_turnover: false,
                used: false,
                related_party: None,
                statutory: None,
            });
            sequence_index += 1;
        }
    }

    // Total order: date asc, amount desc, description asc. Matching and the
    // cascade are first-match-wins, so this order is the reproducibility
    // contract — it must not depend on upload or map-insertion order.
    txns.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| b.amount().cmp(&a.amount()))
            .then_with(|| a.description.cmp(&b.description))
    });
    for (i, txn) in txns.iter_mut().enumerate() {
        txn.sorted_index = i;
    }

    Ok(txns)
}
