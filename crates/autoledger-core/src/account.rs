//! Accounts and account-type compatibility.
//!
//! Every leg of a journal references an account. The account's type
//! constrains where it may appear: a withdrawal draws from an asset or
//! liability account and lands on an expense account, a deposit flows from
//! revenue into an asset or liability, and so on. The compatibility table
//! lives here so both journal construction and the move-to-account mutation
//! enforce the same policy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::journal::JournalType;

/// Unique identifier for an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountType {
    /// Bank accounts, cash, anything owned
    Asset,
    /// Credit cards, loans, anything owed
    Liability,
    /// Destinations of spending
    Expense,
    /// Sources of income
    Revenue,
    /// Opening balances and reconciliation counter-accounts
    Equity,
}

impl AccountType {
    /// The lowercase name of this account type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Expense => "expense",
            Self::Revenue => "revenue",
            Self::Equity => "equity",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which side of a journal a leg sits on.
///
/// The source side is debited (negative amount), the destination side is
/// credited (positive amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegSide {
    /// The debited side of the journal
    Source,
    /// The credited side of the journal
    Destination,
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

/// A resolved account reference.
///
/// Journals snapshot the account (id, name, type) into their legs at
/// construction time; the engine never chases account ids at evaluation
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account id
    pub id: AccountId,
    /// Human-readable account name
    pub name: String,
    /// The account's type
    #[serde(rename = "type")]
    pub kind: AccountType,
}

impl Account {
    /// Create a new account reference.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, kind: AccountType) -> Self {
        Self {
            id: AccountId(id),
            name: name.into(),
            kind,
        }
    }

    /// Check whether this account may appear on the given side of a journal
    /// of the given type.
    ///
    /// # Examples
    ///
    /// ```
    /// use autoledger_core::{Account, AccountType, JournalType, LegSide};
    ///
    /// let checking = Account::new(1, "Checking", AccountType::Asset);
    /// let groceries = Account::new(2, "Groceries", AccountType::Expense);
    ///
    /// assert!(checking.allowed_on(JournalType::Withdrawal, LegSide::Source));
    /// assert!(groceries.allowed_on(JournalType::Withdrawal, LegSide::Destination));
    /// assert!(!groceries.allowed_on(JournalType::Withdrawal, LegSide::Source));
    /// ```
    #[must_use]
    pub fn allowed_on(&self, journal_type: JournalType, side: LegSide) -> bool {
        use AccountType::{Asset, Equity, Expense, Liability, Revenue};
        use LegSide::{Destination, Source};

        match journal_type {
            JournalType::Withdrawal => match side {
                Source => matches!(self.kind, Asset | Liability),
                Destination => matches!(self.kind, Expense),
            },
            JournalType::Deposit => match side {
                Source => matches!(self.kind, Revenue),
                Destination => matches!(self.kind, Asset | Liability),
            },
            JournalType::Transfer => matches!(self.kind, Asset | Liability),
            // The equity counter-account may sit on either side of an
            // opening balance or reconciliation.
            JournalType::OpeningBalance | JournalType::Reconciliation => {
                matches!(self.kind, Asset | Liability | Equity)
            }
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}
