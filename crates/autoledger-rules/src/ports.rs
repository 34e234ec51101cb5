//! Collaborator ports consumed by the rule engine.
//!
//! The engine core owns none of its surroundings: reference data, the
//! journal feed, the rule set, and durable storage all arrive through these
//! narrow traits. Implementations may block; the engine calls them at
//! well-defined points (field resolution never does, reference resolution
//! and persistence do) and makes no asynchrony assumptions.
//!
//! A port returning `Ok(None)` means "not found" and is ordinary data (it
//! becomes a recorded action failure). A port returning `Err(PortError)`
//! means the collaborator itself broke and aborts the in-flight journal's
//! pass.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use autoledger_core::{Account, Journal};

use crate::action::AppliedAction;
use crate::rule::Rule;

/// A collaborator breakdown. Unwinds the in-flight journal's pass; prior
/// completed journals stay committed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum PortError {
    /// The collaborator could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// The collaborator reached its backend but the call failed.
    #[error("collaborator backend error: {0}")]
    Backend(String),
}

/// A resolved category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    /// Category id
    pub id: u64,
    /// Canonical category name
    pub name: String,
}

/// A resolved budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetRef {
    /// Budget id
    pub id: u64,
    /// Canonical budget name
    pub name: String,
}

/// A resolved rule group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleGroupRef {
    /// Rule group id
    pub id: u64,
    /// Canonical rule group name
    pub name: String,
}

macro_rules! named_ref {
    ($ty:ty) => {
        impl $ty {
            /// Create a reference from id and canonical name.
            #[must_use]
            pub fn new(id: u64, name: impl Into<String>) -> Self {
                Self {
                    id,
                    name: name.into(),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} (#{})", self.name, self.id)
            }
        }
    };
}

named_ref!(CategoryRef);
named_ref!(BudgetRef);
named_ref!(RuleGroupRef);

/// Resolves names and ids used by rule actions.
///
/// Whether an unknown category or budget is created on demand or reported
/// as absent is the resolver's decision, not the engine's.
pub trait ReferenceResolver: Send + Sync {
    /// Resolve an account by id or name.
    fn account(&self, reference: &str) -> Result<Option<Account>, PortError>;

    /// Resolve a category by name.
    fn category(&self, name: &str) -> Result<Option<CategoryRef>, PortError>;

    /// Resolve a budget by name.
    fn budget(&self, name: &str) -> Result<Option<BudgetRef>, PortError>;

    /// Resolve a rule group by name.
    fn rule_group(&self, name: &str) -> Result<Option<RuleGroupRef>, PortError>;
}

/// Supplies the candidate journals for one pass.
///
/// The sequence is finite; a new pass restarts by constructing a new
/// source with the same filter.
pub trait TransactionSource: Send {
    /// Pull the next journal, or `None` when the sequence is exhausted.
    fn next_journal(&mut self) -> Result<Option<Journal>, PortError>;
}

/// Supplies the rule set for a pass. Read-only to the engine.
pub trait RuleStore: Send + Sync {
    /// The full rule set; the dispatcher filters and orders it.
    fn rules(&self) -> Result<Vec<Rule>, PortError>;
}

/// Accepts a mutated journal plus its action audit for durable storage.
///
/// The engine does not retry failed commits; retrying is the sink's
/// responsibility.
pub trait PersistenceSink: Send + Sync {
    /// Persist the journal and the audit of actions applied to it.
    fn commit(&self, journal: &Journal, audit: &[AppliedAction]) -> Result<(), PortError>;
}
