//! Read-only field projections over journals.
//!
//! Rule triggers never touch a journal directly; they go through
//! [`Journal::field`], which projects one attribute into a [`FieldValue`].
//! Two lookalike results are deliberately distinct:
//!
//! - [`FieldValue::NotApplicable`]: the field cannot exist for this
//!   journal's type (a reconciliation has no destination account).
//! - [`FieldValue::Empty`]: the field exists but holds nothing (a
//!   withdrawal whose category was never assigned).
//!
//! Projections are pure `&self` reads and safe to call from any number of
//! evaluator threads.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::journal::{Journal, JournalType};

/// A journal attribute a trigger can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    /// The journal description
    Description,
    /// The journal magnitude (sum of credited legs)
    Amount,
    /// The journal currency code
    Currency,
    /// The journal date
    Date,
    /// Name of the account on the debited side
    SourceAccount,
    /// Name of the account on the credited side
    DestinationAccount,
    /// The assigned category
    Category,
    /// The assigned budget
    Budget,
    /// The tag set
    Tags,
    /// Free-form notes
    Notes,
    /// The journal type name
    JournalType,
}

impl Field {
    /// The kebab-case name of this field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::Date => "date",
            Self::SourceAccount => "source-account",
            Self::DestinationAccount => "destination-account",
            Self::Category => "category",
            Self::Budget => "budget",
            Self::Tags => "tags",
            Self::Notes => "notes",
            Self::JournalType => "journal-type",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The projection of one journal field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldValue {
    /// A textual value
    Text(String),
    /// A monetary value at the currency's canonical scale
    Number(Decimal),
    /// A date value
    Date(DateTime<FixedOffset>),
    /// The tag set
    Tags(BTreeSet<String>),
    /// The field exists but holds nothing
    Empty,
    /// The field cannot exist for this journal's type
    NotApplicable,
}

impl FieldValue {
    /// Check whether the field holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Check whether the field cannot exist for the journal's type.
    #[must_use]
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    /// The canonical string form used for string-operator comparisons.
    ///
    /// Numbers render at the currency scale ("50.00"), dates as RFC 3339,
    /// tag sets as a comma-separated list in sorted order. `Empty` and
    /// `NotApplicable` render as the empty string.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Tags(tags) => tags.iter().cloned().collect::<Vec<_>>().join(", "),
            Self::Empty | Self::NotApplicable => String::new(),
        }
    }

    /// The candidate strings a string operator tests against.
    ///
    /// Most fields yield a single candidate; a tag set yields one per tag so
    /// "equals groceries" passes when any tag is `groceries`.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Self::Tags(tags) => tags.iter().cloned().collect(),
            other => vec![other.canonical()],
        }
    }
}

fn text_or_empty(value: Option<&str>) -> FieldValue {
    match value {
        Some(s) if !s.trim().is_empty() => FieldValue::Text(s.to_string()),
        _ => FieldValue::Empty,
    }
}

impl Journal {
    /// Project one field of this journal.
    ///
    /// # Examples
    ///
    /// ```
    /// use autoledger_core::{Account, AccountType, Field, FieldValue, JournalBuilder, JournalType};
    /// use chrono::DateTime;
    /// use rust_decimal_macros::dec;
    ///
    /// let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
    /// let journal = JournalBuilder::new(1, JournalType::Deposit, date, "USD", "Salary")
    ///     .leg(Account::new(1, "Employer", AccountType::Revenue), dec!(-100.00))
    ///     .leg(Account::new(2, "Checking", AccountType::Asset), dec!(100.00))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(journal.field(Field::Amount), FieldValue::Number(dec!(100.00)));
    /// // Budgets only exist on withdrawals.
    /// assert_eq!(journal.field(Field::Budget), FieldValue::NotApplicable);
    /// ```
    #[must_use]
    pub fn field(&self, field: Field) -> FieldValue {
        match field {
            Field::Description => text_or_empty(Some(self.description())),
            Field::Amount => FieldValue::Number(self.amount()),
            Field::Currency => FieldValue::Text(self.currency().to_string()),
            Field::Date => FieldValue::Date(self.date()),
            Field::SourceAccount => {
                if accounts_not_applicable(self.journal_type()) {
                    FieldValue::NotApplicable
                } else {
                    text_or_empty(self.source_account().map(|a| a.name.as_str()))
                }
            }
            Field::DestinationAccount => {
                if accounts_not_applicable(self.journal_type()) {
                    FieldValue::NotApplicable
                } else {
                    text_or_empty(self.destination_account().map(|a| a.name.as_str()))
                }
            }
            Field::Category => text_or_empty(self.category()),
            Field::Budget => {
                if self.journal_type() == JournalType::Withdrawal {
                    text_or_empty(self.budget())
                } else {
                    FieldValue::NotApplicable
                }
            }
            Field::Tags => {
                if self.tags().is_empty() {
                    FieldValue::Empty
                } else {
                    FieldValue::Tags(self.tags().clone())
                }
            }
            Field::Notes => text_or_empty(self.notes()),
            Field::JournalType => FieldValue::Text(self.journal_type().name().to_string()),
        }
    }
}

/// Source/destination projections make no sense for balance-style journals.
const fn accounts_not_applicable(journal_type: JournalType) -> bool {
    matches!(
        journal_type,
        JournalType::OpeningBalance | JournalType::Reconciliation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountType};
    use crate::journal::JournalBuilder;
    use rust_decimal_macros::dec;

    fn date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap()
    }

    fn withdrawal() -> Journal {
        JournalBuilder::new(1, JournalType::Withdrawal, date(), "USD", "SuperMart #123")
            .leg(Account::new(1, "Checking", AccountType::Asset), dec!(-50.00))
            .leg(Account::new(2, "Groceries", AccountType::Expense), dec!(50.00))
            .build()
            .unwrap()
    }

    fn opening_balance() -> Journal {
        JournalBuilder::new(2, JournalType::OpeningBalance, date(), "USD", "Opening")
            .leg(
                Account::new(3, "Opening balances", AccountType::Equity),
                dec!(-1000.00),
            )
            .leg(Account::new(1, "Checking", AccountType::Asset), dec!(1000.00))
            .build()
            .unwrap()
    }

    #[test]
    fn test_text_fields() {
        let journal = withdrawal();
        assert_eq!(
            journal.field(Field::Description),
            FieldValue::Text("SuperMart #123".into())
        );
        assert_eq!(journal.field(Field::Currency), FieldValue::Text("USD".into()));
        assert_eq!(
            journal.field(Field::JournalType),
            FieldValue::Text("withdrawal".into())
        );
    }

    #[test]
    fn test_amount_canonical_scale() {
        let journal = withdrawal();
        let FieldValue::Number(n) = journal.field(Field::Amount) else {
            panic!("amount should be a number");
        };
        assert_eq!(n.to_string(), "50.00");
    }

    #[test]
    fn test_accounts() {
        let journal = withdrawal();
        assert_eq!(
            journal.field(Field::SourceAccount),
            FieldValue::Text("Checking".into())
        );
        assert_eq!(
            journal.field(Field::DestinationAccount),
            FieldValue::Text("Groceries".into())
        );
    }

    #[test]
    fn test_not_applicable_on_opening_balance() {
        let journal = opening_balance();
        assert_eq!(journal.field(Field::SourceAccount), FieldValue::NotApplicable);
        assert_eq!(
            journal.field(Field::DestinationAccount),
            FieldValue::NotApplicable
        );
        assert_eq!(journal.field(Field::Budget), FieldValue::NotApplicable);
    }

    #[test]
    fn test_empty_vs_not_applicable() {
        let mut journal = withdrawal();
        // Category exists on a withdrawal but is unset: Empty, not NotApplicable.
        assert_eq!(journal.field(Field::Category), FieldValue::Empty);
        assert_eq!(journal.field(Field::Budget), FieldValue::Empty);
        assert_eq!(journal.field(Field::Tags), FieldValue::Empty);
        assert_eq!(journal.field(Field::Notes), FieldValue::Empty);

        journal.set_category(Some("Groceries".into()));
        assert_eq!(
            journal.field(Field::Category),
            FieldValue::Text("Groceries".into())
        );
    }

    #[test]
    fn test_tags_candidates() {
        let mut journal = withdrawal();
        journal.add_tag("food");
        journal.add_tag("weekly");
        let value = journal.field(Field::Tags);
        assert_eq!(value.candidates(), vec!["food".to_string(), "weekly".to_string()]);
        assert_eq!(value.canonical(), "food, weekly");
    }

    #[test]
    fn test_date_canonical() {
        let journal = withdrawal();
        assert_eq!(
            journal.field(Field::Date).canonical(),
            "2026-03-01T09:30:00+01:00"
        );
    }

    #[test]
    fn test_field_serde_names() {
        assert_eq!(
            serde_json::to_string(&Field::SourceAccount).unwrap(),
            "\"source-account\""
        );
        let field: Field = serde_json::from_str("\"destination-account\"").unwrap();
        assert_eq!(field, Field::DestinationAccount);
    }
}
