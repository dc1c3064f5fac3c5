//! The closed set of topical aspects a valid comment is classified into.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six fixed topical categories.
///
/// Variant order matches the label index of both the English and Sinhala
/// aspect classifiers (`LABEL_0` .. `LABEL_5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aspect {
    #[serde(rename = "Customer Support")]
    CustomerSupport,
    #[serde(rename = "Digital Banking Experience")]
    DigitalBankingExperience,
    #[serde(rename = "Loans and Credit Services")]
    LoansAndCreditServices,
    #[serde(rename = "Others")]
    Others,
    #[serde(rename = "Transactions and Payments")]
    TransactionsAndPayments,
    #[serde(rename = "Trust and Security")]
    TrustAndSecurity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown aspect label: {0:?}")]
pub struct UnknownAspect(pub String);

impl Aspect {
    /// All aspects in classifier label order.
    pub const ALL: [Aspect; 6] = [
        Aspect::CustomerSupport,
        Aspect::DigitalBankingExperience,
        Aspect::LoansAndCreditServices,
        Aspect::Others,
        Aspect::TransactionsAndPayments,
        Aspect::TrustAndSecurity,
    ];

    /// Number of aspects, i.e. the length of a classifier probability vector.
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name, as stored in the database and snapshot files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Aspect::CustomerSupport => "Customer Support",
            Aspect::DigitalBankingExperience => "Digital Banking Experience",
            Aspect::LoansAndCreditServices => "Loans and Credit Services",
            Aspect::Others => "Others",
            Aspect::TransactionsAndPayments => "Transactions and Payments",
            Aspect::TrustAndSecurity => "Trust and Security",
        }
    }

    /// Parse a display name or classifier label.
    ///
    /// Accepts the canonical names, the English model's
    /// `"Transaction, Payments and Accounts"` spelling of label 4, and the
    /// generic `LABEL_<n>` form. Matching is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownAspect`] when the label matches none of the above.
    pub fn from_label(label: &str) -> Result<Self, UnknownAspect> {
        let lower = label.trim().to_lowercase();
        if let Some(index) = lower
            .strip_prefix("label_")
            .and_then(|n| n.parse::<usize>().ok())
        {
            return Self::from_index(index).ok_or_else(|| UnknownAspect(label.to_string()));
        }

        if lower == "transaction, payments and accounts" {
            return Ok(Aspect::TransactionsAndPayments);
        }
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().to_lowercase() == lower)
            .ok_or_else(|| UnknownAspect(label.to_string()))
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Aspect {
    type Err = UnknownAspect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}
