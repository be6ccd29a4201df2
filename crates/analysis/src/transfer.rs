use chrono::NaiveDate;
use kira_core::{Category, Direction, Money};
use serde::Serialize;

use crate::missing_bank::MissingBanks;
use crate::normalize::Txn;
use crate::tables::{contains_any, RuleTables};

/// A reconciled credit/debit pair across two accounts.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedTransfer {
    pub date: NaiveDate,
    pub amount: Money,
    pub from_account: String,
    pub to_account: String,
    pub credit_description: String,
    pub debit_description: String,
    pub credit_sorted_index: usize,
    pub debit_sorted_index: usize,
}

/// A one-sided transfer referencing a bank whose account was not supplied.
#[derive(Debug, Clone, Serialize)]
pub struct UnverifiedTransfer {
    pub direction: Direction,
    pub date: NaiveDate,
    pub amount: Money,
    pub account_id: String,
    pub description: String,
    pub bank_code: String,
}

/// Pairs inter-account transfers within amount/date tolerance windows, then
/// flags one-sided transfers toward missing banks.
pub struct TransferMatcher<'a> {
    tables: &'a RuleTables,
    missing: &'a MissingBanks,
    company_keywords: Vec<String>,
}

impl<'a> TransferMatcher<'a> {
    pub fn new(
        tables: &'a RuleTables,
        missing: &'a MissingBanks,
        company_keywords: &[String],
    ) -> Self {
        TransferMatcher {
            tables,
            missing,
            company_keywords: company_keywords.iter().map(|k| k.to_uppercase()).collect(),
        }
    }

    /// Run both passes. `txns` must already be in the normalizer's sort
    /// order — the credit and debit views inherit it, and that order is the
    /// greedy tie-break rule.
    pub fn run(&self, txns: &mut [Txn]) -> (Vec<MatchedTransfer>, Vec<UnverifiedTransfer>) {
        let matched = self.matched_pass(txns);
        let unverified = self.unverified_pass(txns);
        (matched, unverified)
    }

    /// Greedy pairing: for each unused credit in sort order, the first
    /// compatible unused debit wins. Deliberately not optimal assignment —
    /// the first-match order is the determinism contract, and a later,
    /// "better" pairing never displaces an earlier one.
    fn matched_pass(&self, txns: &mut [Txn]) -> Vec<MatchedTransfer> {
        let credits: Vec<usize> = view(txns, Direction::Credit);
        let debits: Vec<usize> = view(txns, Direction::Debit);
        let tol = self.tables.thresholds.amount_tolerance;
        let window = self.tables.thresholds.date_tolerance_days;
        let mut matched = Vec::new();

        for &ci in &credits {
            if txns[ci].used {
                continue;
            }
            for &di in &debits {
                if txns[di].used {
                    continue;
                }
                if txns[di].account_id == txns[ci].account_id {
                    continue;
                }
                if txns[ci].amount().abs_diff(txns[di].amount()) > tol {
                    continue;
                }
                if (txns[ci].date - txns[di].date).num_days().abs() > window {
                    continue;
                }
                let large = txns[ci].amount() >= self.tables.thresholds.large_transfer;
                if !large
                    && !self.has_transfer_context(&txns[ci].description_upper)
                    && !self.has_transfer_context(&txns[di].description_upper)
                {
                    continue;
                }

                matched.push(MatchedTransfer {
                    date: txns[ci].date,
                    amount: txns[ci].amount(),
                    from_account: txns[di].account_id.clone(),
                    to_account: txns[ci].account_id.clone(),
                    credit_description: txns[ci].description.clone(),
                    debit_description: txns[di].description.clone(),
                    credit_sorted_index: txns[ci].sorted_index,
                    debit_sorted_index: txns[di].sorted_index,
                });
                txns[ci].assign(Category::InterAccountTransfer);
                txns[di].assign(Category::InterAccountTransfer);
                break;
            }
        }

        matched
    }

    /// Credits first, then debits: a still-unused line naming a missing bank
    /// together with transfer context becomes an unverified transfer.
    fn unverified_pass(&self, txns: &mut [Txn]) -> Vec<UnverifiedTransfer> {
        let mut unverified = Vec::new();

        for direction in [Direction::Credit, Direction::Debit] {
            for i in view(txns, direction) {
                if txns[i].used {
                    continue;
                }
                let Some(code) = self.missing.referenced_code(&txns[i].description_upper) else {
                    continue;
                };
                if !self.has_transfer_context(&txns[i].description_upper) {
                    continue;
                }
                let code = code.to_string();
                unverified.push(UnverifiedTransfer {
                    direction,
                    date: txns[i].date,
                    amount: txns[i].amount(),
                    account_id: txns[i].account_id.clone(),
                    description: txns[i].description.clone(),
                    bank_code: code,
                });
                txns[i].assign(Category::UnverifiedTransfer);
            }
        }

        unverified
    }

    fn has_transfer_context(&self, description_upper: &str) -> bool {
        contains_any(description_upper, &self.tables.inter_account_markers)
            || contains_any(description_upper, &self.company_keywords)
    }
}

/// Indices of one side of the book, preserving the slice's sort order.
fn view(txns: &[Txn], direction: Direction) -> Vec<usize> {
    (0..txns.len())
        .filter(|&i| txns[i].direction() == direction)
        .collect()
}
