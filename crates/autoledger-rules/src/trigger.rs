//! Triggers: single predicates testable against a journal field.
//!
//! A trigger names a field, an operator, a comparison value, and an optional
//! negation. Evaluation is total: a malformed regex or an unparsable
//! comparison value never raises, it yields a recorded outcome instead.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use autoledger_core::{Field, FieldValue, Journal};

/// Comparison operators for triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerOperator {
    /// Case-insensitive equality against the canonical string form
    Equals,
    /// Case-insensitive substring match
    Contains,
    /// Case-insensitive prefix match
    StartsWith,
    /// Case-insensitive suffix match
    EndsWith,
    /// Numeric comparison on monetary fields, chronological on dates
    GreaterThan,
    /// Numeric comparison on monetary fields, chronological on dates
    LessThan,
    /// Regular-expression match against the canonical string form
    Matches,
    /// The field exists but holds nothing
    IsEmpty,
}

impl TriggerOperator {
    /// The kebab-case name of this operator.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
            Self::EndsWith => "ends-with",
            Self::GreaterThan => "greater-than",
            Self::LessThan => "less-than",
            Self::Matches => "matches",
            Self::IsEmpty => "is-empty",
        }
    }
}

impl fmt::Display for TriggerOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single predicate: field, operator, comparison value, negation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Trigger {
    /// The field to test
    pub field: Field,
    /// The comparison operator
    pub operator: TriggerOperator,
    /// The comparison value (unused by is-empty)
    #[serde(default)]
    pub value: String,
    /// Flip the result of the underlying operator
    #[serde(default)]
    pub negate: bool,
}

impl Trigger {
    /// Create a trigger.
    #[must_use]
    pub fn new(field: Field, operator: TriggerOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
            negate: false,
        }
    }

    /// Negate this trigger.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            write!(f, "not {} {} \"{}\"", self.field, self.operator, self.value)
        } else {
            write!(f, "{} {} \"{}\"", self.field, self.operator, self.value)
        }
    }
}

/// The outcome of evaluating one trigger against one journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerOutcome {
    /// The predicate held
    Passed,
    /// The predicate did not hold
    Failed,
    /// The field is not applicable and the rule is not strict
    Skipped,
    /// Short-circuiting ended evaluation before this trigger
    NotEvaluated,
    /// The trigger itself is malformed (e.g. an invalid pattern)
    Error(String),
}

impl TriggerOutcome {
    /// Did the trigger pass?
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Does this outcome rule out a match (failure or malformed trigger)?
    #[must_use]
    pub const fn blocks_match(&self) -> bool {
        matches!(self, Self::Failed | Self::Error(_))
    }
}

/// Evaluate one trigger against a journal.
///
/// `strict` turns a not-applicable field into a failure; otherwise the
/// trigger is skipped. A negated trigger on a not-applicable field passes:
/// "does not have X" is true when X cannot exist.
#[must_use]
pub fn evaluate_trigger(trigger: &Trigger, journal: &Journal, strict: bool) -> TriggerOutcome {
    let value = journal.field(trigger.field);

    if value.is_not_applicable() {
        if trigger.negate {
            return TriggerOutcome::Passed;
        }
        return if strict {
            TriggerOutcome::Failed
        } else {
            TriggerOutcome::Skipped
        };
    }

    let held = match apply_operator(trigger.operator, &value, &trigger.value) {
        Ok(held) => held,
        Err(err) => return TriggerOutcome::Error(format!("invalid pattern: {err}")),
    };

    if held != trigger.negate {
        TriggerOutcome::Passed
    } else {
        TriggerOutcome::Failed
    }
}

/// Apply an operator to a projected field value.
///
/// Only pattern compilation can error; everything else that does not fit an
/// operator (a text field under greater-than, an unparsable number) simply
/// does not hold.
fn apply_operator(
    operator: TriggerOperator,
    value: &FieldValue,
    needle: &str,
) -> Result<bool, regex::Error> {
    match operator {
        TriggerOperator::IsEmpty => Ok(value.is_empty()),
        TriggerOperator::Equals => Ok(string_op(value, needle, |c, n| c == n)),
        TriggerOperator::Contains => Ok(string_op(value, needle, |c, n| c.contains(n))),
        TriggerOperator::StartsWith => Ok(string_op(value, needle, |c, n| c.starts_with(n))),
        TriggerOperator::EndsWith => Ok(string_op(value, needle, |c, n| c.ends_with(n))),
        TriggerOperator::GreaterThan => Ok(ordering_op(value, needle, true)),
        TriggerOperator::LessThan => Ok(ordering_op(value, needle, false)),
        TriggerOperator::Matches => {
            let pattern = Regex::new(needle)?;
            Ok(value.candidates().iter().any(|c| pattern.is_match(c)))
        }
    }
}

fn string_op(value: &FieldValue, needle: &str, test: impl Fn(&str, &str) -> bool) -> bool {
    let needle = needle.to_lowercase();
    value
        .candidates()
        .iter()
        .any(|candidate| test(&candidate.to_lowercase(), &needle))
}

/// Chronological comparison for dates, numeric for amounts. Ordering other
/// field kinds is meaningless and never holds.
fn ordering_op(value: &FieldValue, needle: &str, greater: bool) -> bool {
    match value {
        FieldValue::Number(n) => needle
            .parse::<Decimal>()
            .map(|bound| if greater { *n > bound } else { *n < bound })
            .unwrap_or(false),
        FieldValue::Date(d) => parse_date_bound(needle)
            .map(|bound| if greater { *d > bound } else { *d < bound })
            .unwrap_or(false),
        _ => false,
    }
}

/// Accept either a full RFC 3339 timestamp or a bare date (taken as midnight
/// in the journal's own offset is not knowable here, so UTC).
fn parse_date_bound(needle: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(needle) {
        return Some(dt);
    }
    let date = needle.parse::<NaiveDate>().ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().fixed_offset())
}
