use kira_core::{Category, Direction, StatutoryType};

use crate::normalize::{RelatedPartyTag, Txn};
use crate::related_party::{match_party, purpose_note, RelatedPartyPattern};
use crate::tables::{contains_any, RuleTables};

/// Priority-ordered rule cascade for everything the transfer passes left
/// behind. Each rule is one full pass over the still-unused lines of its
/// side; assigning a category retires the line, so no transaction is ever
/// reconsidered by a later rule.
pub struct Cascade<'a> {
    tables: &'a RuleTables,
    patterns: &'a [RelatedPartyPattern],
}

impl<'a> Cascade<'a> {
    pub fn new(tables: &'a RuleTables, patterns: &'a [RelatedPartyPattern]) -> Self {
        Cascade { tables, patterns }
    }

    pub fn run(&self, txns: &mut [Txn]) {
        // Related party outranks every keyword rule on both sides.
        self.related_party_pass(txns);

        // Credit side.
        self.keyword_pass(txns, Direction::Credit, &self.tables.loan_keywords, Category::LoanDisbursement);
        self.keyword_pass(txns, Direction::Credit, &self.tables.interest_keywords, Category::InterestProfitDividend);
        self.keyword_pass(txns, Direction::Credit, &self.tables.reversal_keywords, Category::Reversal);

        // Debit side.
        self.statutory_pass(txns);
        self.keyword_pass(txns, Direction::Debit, &self.tables.salary_keywords, Category::SalaryWages);
        self.keyword_pass(txns, Direction::Debit, &self.tables.utility_keywords, Category::UtilityPayment);
        self.bank_charge_pass(txns);

        // Catch-alls. Whatever remains is operating flow, never excluded.
        for txn in txns.iter_mut().filter(|t| !t.used) {
            let category = match txn.direction() {
                Direction::Credit => Category::GenuineSalesCollections,
                Direction::Debit => Category::SupplierVendorPayments,
            };
            txn.assign(category);
        }
    }

    fn related_party_pass(&self, txns: &mut [Txn]) {
        for txn in txns.iter_mut().filter(|t| !t.used) {
            if let Some(party) = match_party(self.patterns, &txn.description_upper) {
                txn.related_party = Some(RelatedPartyTag {
                    name: party.name.clone(),
                    relationship: party.relationship.clone(),
                    purpose: purpose_note(&txn.description_upper, &self.tables.context_keywords),
                });
                txn.assign(Category::RelatedParty);
            }
        }
    }

    fn keyword_pass(
        &self,
        txns: &mut [Txn],
        direction: Direction,
        keywords: &[String],
        category: Category,
    ) {
        for txn in txns.iter_mut().filter(|t| !t.used && t.direction() == direction) {
            if contains_any(&txn.description_upper, keywords) {
                txn.assign(category);
            }
        }
    }

    /// One pass covering all four statutory regimes, checked in fixed order.
    /// The type and calendar month are recorded for the recurrence check.
    fn statutory_pass(&self, txns: &mut [Txn]) {
        for txn in txns.iter_mut().filter(|t| !t.used && t.direction() == Direction::Debit) {
            for kind in StatutoryType::ALL {
                if contains_any(&txn.description_upper, self.tables.statutory_keywords_for(kind)) {
                    txn.statutory = Some(kind);
                    txn.assign(Category::StatutoryPayment);
                    break;
                }
            }
        }
    }

    fn bank_charge_pass(&self, txns: &mut [Txn]) {
        let cap = self.tables.thresholds.bank_charge_cap;
        for txn in txns.iter_mut().filter(|t| !t.used && t.direction() == Direction::Debit) {
            if txn.amount() < cap && contains_any(&txn.description_upper, &self.tables.bank_charge_keywords) {
                txn.assign(Category::BankCharges);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RelatedParty;
    use crate::related_party::build_patterns;
    use kira_core::Money;

    fn txn(desc: &str, credit: f64, debit: f64) -> Txn {
        Txn {
            account_id: "ACC_1".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: desc.to_string(),
            description_upper: desc.to_uppercase(),
            debit: Money::from_f64(debit),
            credit: Money::from_f64(credit),
            balance: Money::zero(),
            sequence_index: 0,
            sorted_index: 0,
            category: None,
            exclude_from_turnover: false,
            used: false,
            related_party: None,
            statutory: None,
        }
    }

    fn run(txns: &mut [Txn], parties: &[RelatedParty]) {
        let tables = RuleTables::malaysia();
        let patterns = build_patterns(parties, &tables);
        Cascade::new(&tables, &patterns).run(txns);
    }

    #[test]
    fn every_transaction_ends_with_exactly_one_category() {
        let mut txns = vec![
            txn("KWSP CONTRIBUTION JAN", 0.0, 500.0),
            txn("RANDOM CREDIT", 250.0, 0.0),
            txn("RANDOM DEBIT", 0.0, 250.0),
        ];
        run(&mut txns, &[]);
        for t in &txns {
            assert!(t.category.is_some());
            assert!(t.used);
            assert_eq!(
                t.exclude_from_turnover,
                t.category.unwrap().excludes_from_turnover()
            );
        }
    }

    #[test]
    fn statutory_debit_records_type_and_stays_in_turnover() {
        let mut txns = vec![txn("KWSP CONTRIBUTION JAN", 0.0, 500.0)];
        run(&mut txns, &[]);
        assert_eq!(txns[0].category, Some(Category::StatutoryPayment));
        assert_eq!(txns[0].statutory, Some(StatutoryType::EpfKwsp));
        assert!(!txns[0].exclude_from_turnover);
    }

    #[test]
    fn all_four_statutory_regimes_classify() {
        let mut txns = vec![
            txn("EPF PAYMENT", 0.0, 100.0),
            txn("PERKESO REMIT", 0.0, 100.0),
            txn("LHDN PCB MARCH", 0.0, 100.0),
            txn("HRD CORP LEVY", 0.0, 100.0),
        ];
        run(&mut txns, &[]);
        let kinds: Vec<_> = txns.iter().map(|t| t.statutory.unwrap()).collect();
        assert_eq!(
            kinds,
            vec![
                StatutoryType::EpfKwsp,
                StatutoryType::SocsoPerkeso,
                StatutoryType::LhdnTax,
                StatutoryType::HrdfPsmb,
            ]
        );
    }

    #[test]
    fn related_party_outranks_loan_keywords() {
        let parties = vec![RelatedParty {
            name: "ABC Sdn Bhd".to_string(),
            relationship: "Director".to_string(),
        }];
        let mut txns = vec![txn("TRANSFER TO ABC SDN BHD LOAN REPAY", 0.0, 9000.0)];
        run(&mut txns, &parties);
        assert_eq!(txns[0].category, Some(Category::RelatedParty));
        assert!(txns[0].exclude_from_turnover);
        let tag = txns[0].related_party.as_ref().unwrap();
        assert_eq!(tag.relationship, "Director");
        assert!(tag.purpose.starts_with("LOAN"));
    }

    #[test]
    fn credit_priority_loan_then_interest_then_reversal() {
        let mut txns = vec![
            txn("TERM LOAN DISBURSEMENT", 80_000.0, 0.0),
            txn("PROFIT PAYMENT Q1", 120.0, 0.0),
            txn("REVERSAL OF DUPLICATE POSTING", 300.0, 0.0),
        ];
        run(&mut txns, &[]);
        assert_eq!(txns[0].category, Some(Category::LoanDisbursement));
        assert_eq!(txns[1].category, Some(Category::InterestProfitDividend));
        assert_eq!(txns[2].category, Some(Category::Reversal));
        assert!(txns.iter().all(|t| t.exclude_from_turnover));
    }

    #[test]
    fn bank_charge_requires_amount_below_cap() {
        let mut txns = vec![
            txn("SERVICE CHARGE", 0.0, 15.0),
            txn("SERVICE CHARGE", 0.0, 1500.0),
        ];
        run(&mut txns, &[]);
        assert_eq!(txns[0].category, Some(Category::BankCharges));
        // Over the cap the charge keyword is ignored; falls to the catch-all.
        assert_eq!(txns[1].category, Some(Category::SupplierVendorPayments));
    }

    #[test]
    fn salary_outranks_utility_and_charges() {
        let mut txns = vec![txn("PAYROLL FEE RUN", 0.0, 500.0)];
        run(&mut txns, &[]);
        assert_eq!(txns[0].category, Some(Category::SalaryWages));
    }

    #[test]
    fn defaults_are_not_excluded() {
        let mut txns = vec![
            txn("DUITNOW TO ACCOUNT XYZ TRADING", 12_000.0, 0.0),
            txn("INVOICE 443 SETTLEMENT", 0.0, 7000.0),
        ];
        run(&mut txns, &[]);
        assert_eq!(txns[0].category, Some(Category::GenuineSalesCollections));
        assert_eq!(txns[1].category, Some(Category::SupplierVendorPayments));
        assert!(txns.iter().all(|t| !t.exclude_from_turnover));
    }

    #[test]
    fn used_lines_are_never_reclassified() {
        let mut txns = vec![txn("KWSP CONTRIBUTION", 0.0, 500.0)];
        txns[0].assign(Category::InterAccountTransfer); // claimed by matching
        run(&mut txns, &[]);
        assert_eq!(txns[0].category, Some(Category::InterAccountTransfer));
        assert!(txns[0].statutory.is_none());
    }
}
