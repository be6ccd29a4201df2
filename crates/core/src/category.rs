use serde::{Deserialize, Serialize};
use std::fmt;

/// Business category of a statement line. Every transaction is assigned
/// exactly one of these by the analysis passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    InterAccountTransfer,
    UnverifiedTransfer,
    RelatedParty,
    LoanDisbursement,
    InterestProfitDividend,
    Reversal,
    GenuineSalesCollections,
    StatutoryPayment,
    SalaryWages,
    UtilityPayment,
    BankCharges,
    SupplierVendorPayments,
}

impl Category {
    /// Whether the category removes the amount from net business turnover.
    ///
    /// Only internal or non-operating flows are excluded. Operating expenses
    /// (statutory, salary, utilities, charges, suppliers) stay in net debits.
    pub fn excludes_from_turnover(self) -> bool {
        matches!(
            self,
            Category::InterAccountTransfer
                | Category::UnverifiedTransfer
                | Category::RelatedParty
                | Category::LoanDisbursement
                | Category::InterestProfitDividend
                | Category::Reversal
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::InterAccountTransfer => "INTER_ACCOUNT_TRANSFER",
            Category::UnverifiedTransfer => "UNVERIFIED_TRANSFER",
            Category::RelatedParty => "RELATED_PARTY",
            Category::LoanDisbursement => "LOAN_DISBURSEMENT",
            Category::InterestProfitDividend => "INTEREST_PROFIT_DIVIDEND",
            Category::Reversal => "REVERSAL",
            Category::GenuineSalesCollections => "GENUINE_SALES_COLLECTIONS",
            Category::StatutoryPayment => "STATUTORY_PAYMENT",
            Category::SalaryWages => "SALARY_WAGES",
            Category::UtilityPayment => "UTILITY_PAYMENT",
            Category::BankCharges => "BANK_CHARGES",
            Category::SupplierVendorPayments => "SUPPLIER_VENDOR_PAYMENTS",
        };
        f.write_str(name)
    }
}

/// The four Malaysian statutory payment regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatutoryType {
    #[serde(rename = "EPF/KWSP")]
    EpfKwsp,
    #[serde(rename = "SOCSO/PERKESO")]
    SocsoPerkeso,
    #[serde(rename = "LHDN/Tax")]
    LhdnTax,
    #[serde(rename = "HRDF/PSMB")]
    HrdfPsmb,
}

impl StatutoryType {
    pub const ALL: [StatutoryType; 4] = [
        StatutoryType::EpfKwsp,
        StatutoryType::SocsoPerkeso,
        StatutoryType::LhdnTax,
        StatutoryType::HrdfPsmb,
    ];
}

impl fmt::Display for StatutoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatutoryType::EpfKwsp => "EPF/KWSP",
            StatutoryType::SocsoPerkeso => "SOCSO/PERKESO",
            StatutoryType::LhdnTax => "LHDN/Tax",
            StatutoryType::HrdfPsmb => "HRDF/PSMB",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Credit,
    Debit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Credit => f.write_str("CREDIT"),
            Direction::Debit => f.write_str("DEBIT"),
        }
    }
}

/// Intraday balance-swing bucket relative to the average balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VolatilityLevel {
    pub fn from_percent(pct: f64) -> Self {
        if pct <= 50.0 {
            VolatilityLevel::Low
        } else if pct <= 100.0 {
            VolatilityLevel::Moderate
        } else if pct <= 200.0 {
            VolatilityLevel::High
        } else {
            VolatilityLevel::Extreme
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, VolatilityLevel::High | VolatilityLevel::Extreme)
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VolatilityLevel::Low => "LOW",
            VolatilityLevel::Moderate => "MODERATE",
            VolatilityLevel::High => "HIGH",
            VolatilityLevel::Extreme => "EXTREME",
        };
        f.write_str(name)
    }
}

/// Coverage verdict for a recurring statutory payment stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageStatus {
    Found,
    Partial,
    NotFound,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoverageStatus::Found => "FOUND",
            CoverageStatus::Partial => "PARTIAL",
            CoverageStatus::NotFound => "NOT_FOUND",
            CoverageStatus::NotApplicable => "N/A",
        };
        f.write_str(name)
    }
}
