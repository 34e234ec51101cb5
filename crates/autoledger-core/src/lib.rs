//! Core types for autoledger
//!
//! This crate provides the double-entry ledger model the rule engine
//! operates on:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`Account`] - A resolved account reference with a type
//! - [`Journal`] / [`Leg`] - A balanced financial event and its sides
//! - [`JournalBuilder`] - The only way to construct a journal; validates
//!   every invariant before a journal exists
//! - [`Field`] / [`FieldValue`] - Read-only projections of journal
//!   attributes for the rule engine
//!
//! # Example
//!
//! ```
//! use autoledger_core::{Account, AccountType, Field, FieldValue, JournalBuilder, JournalType};
//! use chrono::DateTime;
//! use rust_decimal_macros::dec;
//!
//! let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
//!
//! // A withdrawal: fifty dollars from Checking to Groceries.
//! let mut journal = JournalBuilder::new(1, JournalType::Withdrawal, date, "USD", "SuperMart #123")
//!     .leg(Account::new(1, "Checking", AccountType::Asset), dec!(-50.00))
//!     .leg(Account::new(2, "Groceries", AccountType::Expense), dec!(50.00))
//!     .build()
//!     .unwrap();
//!
//! // Legs always balance; descriptive fields mutate through setters that
//! // return the previous value.
//! let previous = journal.set_category(Some("Groceries".to_string()));
//! assert_eq!(previous, None);
//!
//! // The rule engine reads journals through field projections.
//! assert_eq!(
//!     journal.field(Field::Category),
//!     FieldValue::Text("Groceries".to_string())
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod amount;
pub mod field;
pub mod journal;

pub use account::{Account, AccountId, AccountType, LegSide};
pub use amount::{minor_units, unit_tolerance, Amount};
pub use field::{Field, FieldValue};
pub use journal::{Journal, JournalBuilder, JournalId, JournalType, LedgerError, Leg};

// Re-export commonly used external types
pub use chrono::{DateTime, FixedOffset};
pub use rust_decimal::Decimal;
