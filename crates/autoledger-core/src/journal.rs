//! Journals and legs: the balanced double-entry data model.
//!
//! A [`Journal`] records one logical financial event as a set of signed
//! [`Leg`]s that sum to zero within the currency's tolerance. Construction
//! goes through [`JournalBuilder`], which validates every invariant before a
//! `Journal` exists; a journal that fails validation is never observable.
//!
//! After construction, leg amounts are frozen. The only mutations are the
//! explicit setters for the descriptive fields (category, budget, tags,
//! description, notes) and [`Journal::move_leg_account`], none of which touch
//! the monetary amounts. Each setter returns the previous value so callers
//! can record reversible audits.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::account::{Account, AccountType, LegSide};
use crate::amount::{rescaled, unit_tolerance, Amount};

/// Unique identifier for a journal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct JournalId(pub u64);

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type of a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JournalType {
    /// Money leaving an asset or liability account for an expense
    Withdrawal,
    /// Money arriving from a revenue account into an asset or liability
    Deposit,
    /// Money moving between asset/liability accounts
    Transfer,
    /// Initial balance of an account against equity
    OpeningBalance,
    /// Balance correction recorded during reconciliation
    Reconciliation,
}

impl JournalType {
    /// The kebab-case name of this journal type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::OpeningBalance => "opening-balance",
            Self::Reconciliation => "reconciliation",
        }
    }
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors raised while constructing or mutating a journal.
///
/// Construction errors are fatal: no partially-valid journal is ever
/// produced. Mutation errors leave the journal exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A journal needs at least two legs to balance.
    #[error("journal needs at least two legs, got {count}")]
    InsufficientLegs {
        /// Number of legs supplied
        count: usize,
    },
    /// The signed leg amounts do not sum to zero within tolerance.
    #[error("journal legs do not balance: residual {residual} {currency}")]
    UnbalancedJournal {
        /// The non-zero residual
        residual: Decimal,
        /// The journal currency
        currency: String,
    },
    /// A leg carries a foreign amount in the journal's own currency.
    #[error("leg {index} declares a foreign amount in the journal currency {currency}")]
    RedundantForeignCurrency {
        /// Index of the offending leg
        index: usize,
        /// The journal currency
        currency: String,
    },
    /// An account's type is not allowed on its side of this journal type.
    #[error(
        "account '{account}' ({account_type}) cannot be the {side} of a {journal_type} journal"
    )]
    IncompatibleAccount {
        /// The account name
        account: String,
        /// The account's type
        account_type: AccountType,
        /// The journal's type
        journal_type: JournalType,
        /// The side the account was placed on
        side: LegSide,
    },
    /// Budgets only exist on withdrawals.
    #[error("cannot assign a budget to a {journal_type} journal")]
    BudgetNotSupported {
        /// The journal's type
        journal_type: JournalType,
    },
    /// The journal has no leg on the requested side.
    #[error("journal has no {side} leg")]
    MissingSide {
        /// The requested side
        side: LegSide,
    },
}

/// One account-side effect of a journal.
///
/// The signed amount is always expressed in the journal's currency; a leg
/// settled in another currency additionally carries the original foreign
/// amount. Legs are immutable once the journal is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// The account this leg debits or credits
    pub account: Account,
    /// Signed amount in the journal currency (negative = debit)
    pub amount: Decimal,
    /// The original amount for legs settled in a foreign currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign: Option<Amount>,
}

impl Leg {
    /// Create a leg in the journal's native currency.
    #[must_use]
    pub const fn new(account: Account, amount: Decimal) -> Self {
        Self {
            account,
            amount,
            foreign: None,
        }
    }

    /// Attach the original foreign amount to this leg.
    #[must_use]
    pub fn with_foreign(mut self, foreign: Amount) -> Self {
        self.foreign = Some(foreign);
        self
    }

    /// Which side of the journal this leg sits on.
    ///
    /// Negative amounts are debits (the source side); zero and positive
    /// amounts count as the destination side.
    #[must_use]
    pub fn side(&self) -> LegSide {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            LegSide::Source
        } else {
            LegSide::Destination
        }
    }
}

/// Raw journal shape used for deserialization before validation.
#[derive(Debug, Deserialize)]
struct RawJournal {
    id: JournalId,
    #[serde(rename = "type")]
    journal_type: JournalType,
    date: DateTime<FixedOffset>,
    currency: String,
    description: String,
    legs: Vec<Leg>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// A balanced double-entry journal.
///
/// # Examples
///
/// ```
/// use autoledger_core::{Account, AccountType, JournalBuilder, JournalType};
/// use chrono::DateTime;
/// use rust_decimal_macros::dec;
///
/// let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
/// let journal = JournalBuilder::new(1, JournalType::Withdrawal, date, "USD", "SuperMart #123")
///     .leg(Account::new(1, "Checking", AccountType::Asset), dec!(-50.00))
///     .leg(Account::new(2, "Groceries", AccountType::Expense), dec!(50.00))
///     .build()
///     .unwrap();
///
/// assert_eq!(journal.amount(), dec!(50.00));
/// assert_eq!(journal.source_account().unwrap().name, "Checking");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Journal {
    id: JournalId,
    #[serde(rename = "type")]
    journal_type: JournalType,
    date: DateTime<FixedOffset>,
    currency: String,
    description: String,
    legs: Vec<Leg>,
    category: Option<String>,
    budget: Option<String>,
    tags: BTreeSet<String>,
    notes: Option<String>,
}

impl Journal {
    /// The journal's unique id.
    #[must_use]
    pub const fn id(&self) -> JournalId {
        self.id
    }

    /// The journal's type.
    #[must_use]
    pub const fn journal_type(&self) -> JournalType {
        self.journal_type
    }

    /// The journal's date, with time zone.
    #[must_use]
    pub const fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    /// The journal's currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The journal's description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The journal's legs.
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The assigned category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The assigned budget, if any.
    #[must_use]
    pub fn budget(&self) -> Option<&str> {
        self.budget.as_deref()
    }

    /// The journal's tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// The journal's notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// The journal's magnitude: the sum of credited amounts, rendered at the
    /// currency's canonical scale.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        let total: Decimal = self
            .legs
            .iter()
            .filter(|leg| leg.amount.is_sign_positive())
            .map(|leg| leg.amount)
            .sum();
        rescaled(total, &self.currency)
    }

    /// The account on the source (debited) side, if any.
    #[must_use]
    pub fn source_account(&self) -> Option<&Account> {
        self.legs
            .iter()
            .find(|leg| leg.side() == LegSide::Source)
            .map(|leg| &leg.account)
    }

    /// The account on the destination (credited) side, if any.
    #[must_use]
    pub fn destination_account(&self) -> Option<&Account> {
        self.legs
            .iter()
            .find(|leg| leg.side() == LegSide::Destination)
            .map(|leg| &leg.account)
    }

    /// Assign or clear the category. Returns the previous value.
    pub fn set_category(&mut self, category: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.category, category)
    }

    /// Assign or clear the budget. Returns the previous value.
    ///
    /// Budgets only exist on withdrawals; assigning one to any other journal
    /// type fails and leaves the journal unchanged. Clearing is always
    /// permitted.
    pub fn set_budget(&mut self, budget: Option<String>) -> Result<Option<String>, LedgerError> {
        if budget.is_some() && self.journal_type != JournalType::Withdrawal {
            return Err(LedgerError::BudgetNotSupported {
                journal_type: self.journal_type,
            });
        }
        Ok(std::mem::replace(&mut self.budget, budget))
    }

    /// Replace the description. Returns the previous value.
    pub fn set_description(&mut self, description: impl Into<String>) -> String {
        std::mem::replace(&mut self.description, description.into())
    }

    /// Assign or clear the notes. Returns the previous value.
    pub fn set_notes(&mut self, notes: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.notes, notes)
    }

    /// Add a tag. Returns `true` if the tag was not already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag. Returns `true` if the tag was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Reassign the account of the first leg on the given side.
    ///
    /// The replacement account must be allowed on that side for this
    /// journal's type; otherwise the journal is left untouched. Returns the
    /// previous account on success.
    pub fn move_leg_account(
        &mut self,
        side: LegSide,
        account: Account,
    ) -> Result<Account, LedgerError> {
        if !account.allowed_on(self.journal_type, side) {
            return Err(LedgerError::IncompatibleAccount {
                account: account.name,
                account_type: account.kind,
                journal_type: self.journal_type,
                side,
            });
        }
        let leg = self
            .legs
            .iter_mut()
            .find(|leg| leg.side() == side)
            .ok_or(LedgerError::MissingSide { side })?;
        Ok(std::mem::replace(&mut leg.account, account))
    }
}

impl<'de> Deserialize<'de> for Journal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawJournal::deserialize(deserializer)?;
        let mut builder = JournalBuilder::new(
            raw.id.0,
            raw.journal_type,
            raw.date,
            raw.currency,
            raw.description,
        );
        for leg in raw.legs {
            builder = builder.raw_leg(leg);
        }
        builder.category = raw.category;
        builder.budget = raw.budget;
        builder.tags = raw.tags;
        builder.notes = raw.notes;
        builder.build().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} \"{}\" {} {}",
            self.id,
            self.journal_type,
            self.description,
            self.amount(),
            self.currency
        )
    }
}

/// Builder for [`Journal`], the only way to construct one.
///
/// `build()` runs every construction invariant; on failure no journal is
/// produced.
#[derive(Debug, Clone)]
pub struct JournalBuilder {
    id: JournalId,
    journal_type: JournalType,
    date: DateTime<FixedOffset>,
    currency: String,
    description: String,
    legs: Vec<Leg>,
    category: Option<String>,
    budget: Option<String>,
    tags: BTreeSet<String>,
    notes: Option<String>,
}

impl JournalBuilder {
    /// Start a builder for a journal of the given type.
    #[must_use]
    pub fn new(
        id: u64,
        journal_type: JournalType,
        date: DateTime<FixedOffset>,
        currency: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: JournalId(id),
            journal_type,
            date,
            currency: currency.into(),
            description: description.into(),
            legs: Vec::new(),
            category: None,
            budget: None,
            tags: BTreeSet::new(),
            notes: None,
        }
    }

    /// Add a leg in the journal's native currency.
    #[must_use]
    pub fn leg(mut self, account: Account, amount: Decimal) -> Self {
        self.legs.push(Leg::new(account, amount));
        self
    }

    /// Add a leg settled in a foreign currency.
    ///
    /// `amount` is the converted value in the journal currency; `foreign` is
    /// the original amount.
    #[must_use]
    pub fn foreign_leg(mut self, account: Account, amount: Decimal, foreign: Amount) -> Self {
        self.legs.push(Leg::new(account, amount).with_foreign(foreign));
        self
    }

    /// Add an already-constructed leg.
    #[must_use]
    pub fn raw_leg(mut self, leg: Leg) -> Self {
        self.legs.push(leg);
        self
    }

    /// Pre-assign a category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Pre-assign a budget.
    #[must_use]
    pub fn budget(mut self, budget: impl Into<String>) -> Self {
        self.budget = Some(budget.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validate every invariant and produce the journal.
    pub fn build(self) -> Result<Journal, LedgerError> {
        if self.legs.len() < 2 {
            return Err(LedgerError::InsufficientLegs {
                count: self.legs.len(),
            });
        }

        for (index, leg) in self.legs.iter().enumerate() {
            if let Some(foreign) = &leg.foreign {
                if foreign.currency == self.currency {
                    return Err(LedgerError::RedundantForeignCurrency {
                        index,
                        currency: self.currency,
                    });
                }
            }
            if !leg.account.allowed_on(self.journal_type, leg.side()) {
                return Err(LedgerError::IncompatibleAccount {
                    account: leg.account.name.clone(),
                    account_type: leg.account.kind,
                    journal_type: self.journal_type,
                    side: leg.side(),
                });
            }
        }

        let residual: Decimal = self.legs.iter().map(|leg| leg.amount).sum();
        if residual.abs() > unit_tolerance(&self.currency) {
            return Err(LedgerError::UnbalancedJournal {
                residual,
                currency: self.currency,
            });
        }

        if self.budget.is_some() && self.journal_type != JournalType::Withdrawal {
            return Err(LedgerError::BudgetNotSupported {
                journal_type: self.journal_type,
            });
        }

        Ok(Journal {
            id: self.id,
            journal_type: self.journal_type,
            date: self.date,
            currency: self.currency,
            description: self.description,
            legs: self.legs,
            category: self.category,
            budget: self.budget,
            tags: self.tags,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap()
    }

    fn checking() -> Account {
        Account::new(1, "Checking", AccountType::Asset)
    }

    fn groceries() -> Account {
        Account::new(2, "Groceries", AccountType::Expense)
    }

    fn withdrawal() -> Journal {
        JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "SuperMart #123")
            .leg(checking(), dec!(-50.00))
            .leg(groceries(), dec!(50.00))
            .build()
            .unwrap()
    }

    #[test]
    fn test_balanced_construction() {
        let journal = withdrawal();
        assert_eq!(journal.amount(), dec!(50.00));
        assert_eq!(journal.source_account().unwrap().name, "Checking");
        assert_eq!(journal.destination_account().unwrap().name, "Groceries");
    }

    #[test]
    fn test_unbalanced_construction_fails() {
        let err = JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "off by two")
            .leg(checking(), dec!(-50.02))
            .leg(groceries(), dec!(50.00))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnbalancedJournal {
                residual: dec!(-0.02),
                currency: "USD".into()
            }
        );
    }

    #[test]
    fn test_one_minor_unit_tolerated() {
        // Exchange-rate rounding can leave a one-cent residual.
        let journal = JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "fx rounding")
            .leg(checking(), dec!(-50.01))
            .foreign_leg(groceries(), dec!(50.00), Amount::new(dec!(45.90), "EUR"))
            .build()
            .unwrap();
        assert_eq!(journal.legs().len(), 2);
    }

    #[test]
    fn test_insufficient_legs() {
        let err = JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "half an entry")
            .leg(checking(), dec!(-50.00))
            .build()
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientLegs { count: 1 });
    }

    #[test]
    fn test_redundant_foreign_currency() {
        let err = JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "bad foreign")
            .leg(checking(), dec!(-50.00))
            .foreign_leg(groceries(), dec!(50.00), Amount::new(dec!(50.00), "USD"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::RedundantForeignCurrency { index: 1, .. }
        ));
    }

    #[test]
    fn test_incompatible_account_rejected() {
        // An expense account cannot be the source of a withdrawal.
        let err = JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "backwards")
            .leg(groceries(), dec!(-50.00))
            .leg(checking(), dec!(50.00))
            .build()
            .unwrap_err();
        assert!(matches!(err, LedgerError::IncompatibleAccount { .. }));
    }

    #[test]
    fn test_setters_return_previous() {
        let mut journal = withdrawal();

        assert_eq!(journal.set_category(Some("Groceries".into())), None);
        assert_eq!(
            journal.set_category(Some("Food".into())),
            Some("Groceries".into())
        );

        let prev = journal.set_description("renamed");
        assert_eq!(prev, "SuperMart #123");
        assert_eq!(journal.description(), "renamed");

        assert_eq!(journal.set_notes(Some("checked".into())), None);
        assert_eq!(journal.set_notes(None), Some("checked".into()));
    }

    #[test]
    fn test_tags_idempotent() {
        let mut journal = withdrawal();
        assert!(journal.add_tag("food"));
        assert!(!journal.add_tag("food"));
        assert!(journal.remove_tag("food"));
        assert!(!journal.remove_tag("food"));
    }

    #[test]
    fn test_budget_only_on_withdrawals() {
        let mut journal = withdrawal();
        assert_eq!(journal.set_budget(Some("monthly".into())).unwrap(), None);

        let mut deposit = JournalBuilder::new(2, JournalType::Deposit, date(), "USD", "salary")
            .leg(Account::new(3, "Salary", AccountType::Revenue), dec!(-100.00))
            .leg(checking(), dec!(100.00))
            .build()
            .unwrap();
        let err = deposit.set_budget(Some("monthly".into())).unwrap_err();
        assert_eq!(
            err,
            LedgerError::BudgetNotSupported {
                journal_type: JournalType::Deposit
            }
        );
        // Clearing an (absent) budget is always fine.
        assert_eq!(deposit.set_budget(None).unwrap(), None);
    }

    #[test]
    fn test_move_leg_account() {
        let mut journal = withdrawal();
        let restaurant = Account::new(5, "Restaurants", AccountType::Expense);

        let prev = journal
            .move_leg_account(LegSide::Destination, restaurant)
            .unwrap();
        assert_eq!(prev.name, "Groceries");
        assert_eq!(journal.destination_account().unwrap().name, "Restaurants");
    }

    #[test]
    fn test_move_leg_account_incompatible_leaves_unchanged() {
        let mut journal = withdrawal();
        let savings = Account::new(6, "Savings", AccountType::Asset);

        let err = journal
            .move_leg_account(LegSide::Destination, savings)
            .unwrap_err();
        assert!(matches!(err, LedgerError::IncompatibleAccount { .. }));
        assert_eq!(journal.destination_account().unwrap().name, "Groceries");
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "id": 7,
            "type": "withdrawal",
            "date": "2026-03-01T09:30:00+01:00",
            "currency": "USD",
            "description": "SuperMart #123",
            "legs": [
                {"account": {"id": 1, "name": "Checking", "type": "asset"}, "amount": "-50.00"},
                {"account": {"id": 2, "name": "Groceries", "type": "expense"}, "amount": "50.00"}
            ]
        }"#;
        let journal: Journal = serde_json::from_str(json).unwrap();
        assert_eq!(journal.id(), JournalId(7));
        assert_eq!(journal.amount(), dec!(50.00));

        let unbalanced = json.replace("\"-50.00\"", "\"-50.05\"");
        assert!(serde_json::from_str::<Journal>(&unbalanced).is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut journal = withdrawal();
        journal.add_tag("food");
        journal.set_category(Some("Groceries".into()));

        let json = serde_json::to_string(&journal).unwrap();
        let back: Journal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, journal);
    }
}
