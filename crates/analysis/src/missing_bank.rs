use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::Txn;
use crate::tables::RuleTables;

/// Bank codes referenced in transaction descriptions whose accounts were not
/// supplied for this run. One-sided transfers toward these banks can only be
/// classified as unverified, never matched.
#[derive(Debug, Clone, Default)]
pub struct MissingBanks {
    /// `"CODE (Bank Name)"` → number of transactions referencing it.
    pub occurrences: BTreeMap<String, usize>,
    codes: BTreeSet<String>,
}

impl MissingBanks {
    /// Scan every description for known bank codes absent from the provided
    /// set. A transaction counts once per code it references.
    pub fn detect(txns: &[Txn], tables: &RuleTables) -> Self {
        let mut occurrences: BTreeMap<String, usize> = BTreeMap::new();
        let mut codes = BTreeSet::new();

        for (code, bank_name) in &tables.bank_codes {
            if tables.provided_bank_codes.contains(code) {
                continue;
            }
            for txn in txns {
                if txn.description_upper.contains(code.as_str()) {
                    *occurrences
                        .entry(format!("{code} ({bank_name})"))
                        .or_insert(0) += 1;
                    codes.insert(code.clone());
                }
            }
        }

        MissingBanks { occurrences, codes }
    }

    /// First missing code the description references, in code order.
    pub fn referenced_code(&self, description_upper: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|c| description_upper.contains(c.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
