//! Rule engine for autoledger
//!
//! This crate evaluates user-authored rules against balanced journals and
//! applies their actions:
//!
//! - [`Trigger`] / [`TriggerOperator`] - single predicates over journal
//!   fields
//! - [`Action`] / [`ActionKind`] - ordered, individually-reversible
//!   mutations
//! - [`Rule`] - triggers + actions + priority and control flags
//! - [`evaluate`] - trigger combination producing a [`MatchResult`]
//! - [`execute`] - best-effort sequential action application
//! - [`Dispatcher`] - orders rules, runs passes, aggregates reports
//! - [`ports`] - the collaborator traits the engine consumes
//! - [`memory`] - in-memory collaborators for tests and simple callers
//!
//! # Example
//!
//! ```
//! use autoledger_core::{Account, AccountType, Field, JournalBuilder, JournalType};
//! use autoledger_rules::memory::{MemoryResolver, MemorySink, VecSource};
//! use autoledger_rules::{
//!     ActionKind, CancelToken, Dispatcher, Rule, Trigger, TriggerOperator,
//! };
//! use chrono::DateTime;
//! use rust_decimal_macros::dec;
//!
//! let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
//! let journal = JournalBuilder::new(1, JournalType::Withdrawal, date, "USD", "SuperMart #123")
//!     .leg(Account::new(1, "Checking", AccountType::Asset), dec!(-50.00))
//!     .leg(Account::new(2, "Groceries", AccountType::Expense), dec!(50.00))
//!     .build()
//!     .unwrap();
//!
//! let rule = Rule::new(1, "categorize groceries")
//!     .with_trigger(Trigger::new(Field::Description, TriggerOperator::Contains, "supermart"))
//!     .with_action(ActionKind::SetCategory("Groceries".to_string()));
//!
//! let dispatcher = Dispatcher::new(vec![rule]);
//! let resolver = MemoryResolver::new().with_category("Groceries");
//! let sink = MemorySink::new();
//!
//! let batch = dispatcher
//!     .run_batch(
//!         &mut VecSource::new(vec![journal]),
//!         &resolver,
//!         &sink,
//!         &CancelToken::new(),
//!     )
//!     .unwrap();
//!
//! assert!(batch.reports[0].outcomes[0].match_result.matched);
//! assert_eq!(batch.reports[0].journal.category(), Some("Groceries"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod engine;
pub mod evaluate;
pub mod memory;
pub mod ports;
pub mod rule;
pub mod trigger;

pub use action::{
    execute, Action, ActionError, ActionFailure, ActionKind, AppliedAction, ExecutionReport,
    ReferenceKind,
};
pub use engine::{BatchReport, CancelToken, Dispatcher, JournalReport, PassAbort, RuleOutcome};
pub use evaluate::{evaluate, MatchResult, TriggerResult};
pub use ports::{
    BudgetRef, CategoryRef, PersistenceSink, PortError, ReferenceResolver, RuleGroupRef,
    RuleStore, TransactionSource,
};
pub use rule::{Rule, RuleId, TriggerMode};
pub use trigger::{evaluate_trigger, Trigger, TriggerOperator, TriggerOutcome};
