//! Rules: named automation units combining triggers and actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::Action;
use crate::trigger::Trigger;

/// Unique identifier for a rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a rule's triggers combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMode {
    /// Every non-skipped trigger must pass
    #[default]
    All,
    /// A single passing trigger is enough
    Any,
}

/// A named, ordered automation unit.
///
/// Rules are authored by an external rule-management collaborator and are
/// read-only to the engine: evaluation never mutates a rule. Lower
/// `priority` runs first; ties keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Rule {
    /// Unique rule id
    pub id: RuleId,
    /// Human-readable title
    pub title: String,
    /// Evaluation order: lower runs first
    #[serde(default)]
    pub priority: i32,
    /// Inactive rules are never evaluated
    #[serde(default = "default_true")]
    pub active: bool,
    /// Strict rules evaluate every trigger and treat not-applicable fields
    /// as failures
    #[serde(default)]
    pub strict: bool,
    /// When set, a match ends the journal's pass after this rule's actions
    #[serde(default)]
    pub stop_processing: bool,
    /// How the triggers combine
    #[serde(default)]
    pub mode: TriggerMode,
    /// Ordered trigger list
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    /// Ordered action list
    #[serde(default)]
    pub actions: Vec<Action>,
}

const fn default_true() -> bool {
    true
}

impl Rule {
    /// Create a rule with the given id and title; everything else defaults
    /// (active, non-strict, all-must-match, priority 0).
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: RuleId(id),
            title: title.into(),
            priority: 0,
            active: true,
            strict: false,
            stop_processing: false,
            mode: TriggerMode::All,
            triggers: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the rule strict.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Mark the rule inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Set the stop-processing flag.
    #[must_use]
    pub const fn stop_processing(mut self) -> Self {
        self.stop_processing = true;
        self
    }

    /// Use any-must-match trigger combination.
    #[must_use]
    pub const fn any_trigger(mut self) -> Self {
        self.mode = TriggerMode::Any;
        self
    }

    /// Append a trigger.
    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Append an action.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{} \"{}\" (priority {})", self.id, self.title, self.priority)
    }
}
