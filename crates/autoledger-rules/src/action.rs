//! Actions: ordered, individually-reversible mutations applied to a
//! matching journal.
//!
//! The executor walks the action list in order on a journal working copy;
//! a later action observes the effects of an earlier one. Failures are
//! recorded and never abort the remaining actions (best-effort, no
//! rollback): the audit of applied actions keeps every previous value, so a
//! caller holding the report can still revert manually.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use autoledger_core::{AccountType, Journal, JournalType, LedgerError, LegSide};

use crate::ports::{PortError, ReferenceResolver};
use crate::rule::Rule;

/// What a reference-resolving action was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// An account
    Account,
    /// A category
    Category,
    /// A budget
    Budget,
    /// A rule group
    RuleGroup,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "account"),
            Self::Category => write!(f, "category"),
            Self::Budget => write!(f, "budget"),
            Self::RuleGroup => write!(f, "rule group"),
        }
    }
}

/// A recorded action failure. Local to one action; the rest of the list
/// still runs.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ActionError {
    /// The action's target does not resolve.
    #[error("{kind} '{name}' not found")]
    ReferenceNotFound {
        /// What was being resolved
        kind: ReferenceKind,
        /// The unresolved name or id
        name: String,
    },
    /// The target account's type is incompatible with the journal's type.
    #[error(
        "account '{account}' ({account_type}) cannot be the {side} of a {journal_type} journal"
    )]
    InvalidAccountType {
        /// The account name
        account: String,
        /// The account's type
        account_type: AccountType,
        /// The journal's type
        journal_type: JournalType,
        /// The targeted side
        side: LegSide,
    },
    /// The targeted field does not exist for this journal's type.
    #[error("field not applicable to a {journal_type} journal")]
    FieldNotApplicable {
        /// The journal's type
        journal_type: JournalType,
    },
}

/// A single mutation directive.
///
/// A closed set of typed variants rather than free-form code: evaluation
/// stays total and side effects stay bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ActionKind {
    /// Assign a category (resolved through the reference resolver)
    SetCategory(String),
    /// Remove the category
    ClearCategory,
    /// Assign a budget; withdrawals only
    SetBudget(String),
    /// Remove the budget
    ClearBudget,
    /// Add a tag (no-op if present)
    AddTag(String),
    /// Remove a tag (no-op if absent)
    RemoveTag(String),
    /// Replace the description
    SetDescription(String),
    /// Replace the notes
    SetNotes(String),
    /// Remove the notes
    ClearNotes,
    /// Reassign one side of the journal to another account
    #[serde(rename_all = "kebab-case")]
    MoveToAccount {
        /// Which side to reassign
        side: LegSide,
        /// The target account, by name or id
        account: String,
    },
    /// Mark the journal as handled by a rule group
    LinkToRuleGroup(String),
}

impl ActionKind {
    /// Short human-readable form for logs and reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::SetCategory(name) => format!("set-category '{name}'"),
            Self::ClearCategory => "clear-category".to_string(),
            Self::SetBudget(name) => format!("set-budget '{name}'"),
            Self::ClearBudget => "clear-budget".to_string(),
            Self::AddTag(tag) => format!("add-tag '{tag}'"),
            Self::RemoveTag(tag) => format!("remove-tag '{tag}'"),
            Self::SetDescription(text) => format!("set-description '{text}'"),
            Self::SetNotes(text) => format!("set-notes '{text}'"),
            Self::ClearNotes => "clear-notes".to_string(),
            Self::MoveToAccount { side, account } => {
                format!("move-to-account {side} -> '{account}'")
            }
            Self::LinkToRuleGroup(name) => format!("link-to-rule-group '{name}'"),
        }
    }
}

/// An action plus its local stop flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Action {
    /// The mutation to perform
    #[serde(flatten)]
    pub kind: ActionKind,
    /// When set and the action succeeds, skip the rule's remaining actions
    #[serde(default)]
    pub stop_processing: bool,
}

impl Action {
    /// Create an action without the stop flag.
    #[must_use]
    pub const fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            stop_processing: false,
        }
    }

    /// Set the local stop flag.
    #[must_use]
    pub const fn stop_processing(mut self) -> Self {
        self.stop_processing = true;
        self
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Self::new(kind)
    }
}

/// Audit record of one successfully applied action.
///
/// `previous` holds the replaced value where one existed, which is what
/// makes every action individually reversible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedAction {
    /// Position of the action in the rule's list
    pub index: usize,
    /// The action that ran
    pub action: ActionKind,
    /// The value replaced by this action, if any
    pub previous: Option<String>,
    /// Whether the journal actually changed (idempotent re-runs record
    /// `false`)
    pub changed: bool,
}

/// Record of one failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    /// Position of the action in the rule's list
    pub index: usize,
    /// The action that failed
    pub action: ActionKind,
    /// Why it failed
    pub error: ActionError,
}

/// The outcome of running a rule's action list against one journal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExecutionReport {
    /// Successfully applied actions, in order
    pub applied: Vec<AppliedAction>,
    /// Recorded failures, in order
    pub failures: Vec<ActionFailure>,
    /// Whether an action-level stop flag ended the list early
    pub halted: bool,
}

/// Outcome of one action: the replaced value and whether anything changed,
/// or a recorded failure.
type ActionOutcome = Result<(Option<String>, bool), ActionError>;

/// Apply a rule's actions to a journal, strictly in list order.
///
/// Recorded failures never unwind; only a collaborator breakdown
/// (`PortError`) does, aborting the journal's pass.
pub fn execute(
    rule: &Rule,
    journal: &mut Journal,
    resolver: &dyn ReferenceResolver,
) -> Result<ExecutionReport, PortError> {
    let mut report = ExecutionReport::default();

    for (index, action) in rule.actions.iter().enumerate() {
        match apply_action(&action.kind, journal, resolver)? {
            Ok((previous, changed)) => {
                debug!(
                    rule = %rule.id,
                    journal = %journal.id(),
                    action = %action.kind.describe(),
                    changed,
                    "applied action"
                );
                report.applied.push(AppliedAction {
                    index,
                    action: action.kind.clone(),
                    previous,
                    changed,
                });
                if action.stop_processing {
                    report.halted = true;
                    break;
                }
            }
            Err(error) => {
                warn!(
                    rule = %rule.id,
                    journal = %journal.id(),
                    action = %action.kind.describe(),
                    %error,
                    "action failed"
                );
                report.failures.push(ActionFailure {
                    index,
                    action: action.kind.clone(),
                    error,
                });
            }
        }
    }

    Ok(report)
}

fn apply_action(
    kind: &ActionKind,
    journal: &mut Journal,
    resolver: &dyn ReferenceResolver,
) -> Result<ActionOutcome, PortError> {
    let outcome = match kind {
        ActionKind::SetCategory(name) => match resolver.category(name)? {
            Some(category) => {
                let previous = journal.set_category(Some(category.name.clone()));
                let changed = previous.as_deref() != Some(category.name.as_str());
                Ok((previous, changed))
            }
            None => Err(ActionError::ReferenceNotFound {
                kind: ReferenceKind::Category,
                name: name.clone(),
            }),
        },
        ActionKind::ClearCategory => {
            let previous = journal.set_category(None);
            let changed = previous.is_some();
            Ok((previous, changed))
        }
        ActionKind::SetBudget(name) => match resolver.budget(name)? {
            Some(budget) => match journal.set_budget(Some(budget.name.clone())) {
                Ok(previous) => {
                    let changed = previous.as_deref() != Some(budget.name.as_str());
                    Ok((previous, changed))
                }
                Err(err) => Err(ledger_to_action_error(err)),
            },
            None => Err(ActionError::ReferenceNotFound {
                kind: ReferenceKind::Budget,
                name: name.clone(),
            }),
        },
        ActionKind::ClearBudget => match journal.set_budget(None) {
            Ok(previous) => {
                let changed = previous.is_some();
                Ok((previous, changed))
            }
            Err(err) => Err(ledger_to_action_error(err)),
        },
        ActionKind::AddTag(tag) => {
            let changed = journal.add_tag(tag.clone());
            Ok((None, changed))
        }
        ActionKind::RemoveTag(tag) => {
            let changed = journal.remove_tag(tag);
            Ok((changed.then(|| tag.clone()), changed))
        }
        ActionKind::SetDescription(text) => {
            let previous = journal.set_description(text.clone());
            let changed = previous != *text;
            Ok((Some(previous), changed))
        }
        ActionKind::SetNotes(text) => {
            let previous = journal.set_notes(Some(text.clone()));
            let changed = previous.as_deref() != Some(text.as_str());
            Ok((previous, changed))
        }
        ActionKind::ClearNotes => {
            let previous = journal.set_notes(None);
            let changed = previous.is_some();
            Ok((previous, changed))
        }
        ActionKind::MoveToAccount { side, account } => match resolver.account(account)? {
            Some(target) => match journal.move_leg_account(*side, target) {
                Ok(previous) => Ok((Some(previous.name), true)),
                Err(err) => Err(ledger_to_action_error(err)),
            },
            None => Err(ActionError::ReferenceNotFound {
                kind: ReferenceKind::Account,
                name: account.clone(),
            }),
        },
        ActionKind::LinkToRuleGroup(name) => match resolver.rule_group(name)? {
            Some(group) => {
                let changed = journal.add_tag(format!("rule-group:{}", group.name));
                Ok((None, changed))
            }
            None => Err(ActionError::ReferenceNotFound {
                kind: ReferenceKind::RuleGroup,
                name: name.clone(),
            }),
        },
    };
    Ok(outcome)
}

/// Journal mutation errors surface as recorded action failures, never as
/// collaborator breakdowns.
fn ledger_to_action_error(err: LedgerError) -> ActionError {
    match err {
        LedgerError::IncompatibleAccount {
            account,
            account_type,
            journal_type,
            side,
        } => ActionError::InvalidAccountType {
            account,
            account_type,
            journal_type,
            side,
        },
        LedgerError::BudgetNotSupported { journal_type } => {
            ActionError::FieldNotApplicable { journal_type }
        }
        LedgerError::MissingSide { .. } => ActionError::FieldNotApplicable {
            journal_type: JournalType::Withdrawal,
        },
        // Construction errors cannot arise from the setters the executor
        // uses; treat any other ledger error as a not-applicable field.
        other => {
            warn!(%other, "unexpected ledger error during action application");
            ActionError::FieldNotApplicable {
                journal_type: JournalType::Withdrawal,
            }
        }
    }
}
