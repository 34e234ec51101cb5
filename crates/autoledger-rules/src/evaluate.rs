//! Trigger combination: evaluating a rule's trigger list against a journal.
//!
//! Two combination modes exist. `All` requires every non-skipped trigger to
//! pass and at least one to actually pass; `Any` passes at the first passing
//! trigger. Non-strict `All` rules short-circuit at the first failure for
//! efficiency; strict rules evaluate everything so the caller sees every
//! failing trigger, which costs the short-circuit.

use serde::Serialize;
use tracing::trace;

use autoledger_core::Journal;

use crate::rule::{Rule, TriggerMode};
use crate::trigger::{evaluate_trigger, TriggerOutcome};

/// The outcome of one trigger within a rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResult {
    /// Position of the trigger in the rule's list
    pub index: usize,
    /// What happened
    pub outcome: TriggerOutcome,
}

/// The ephemeral result of evaluating one rule against one journal.
///
/// Produced and consumed within a single dispatcher pass; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Did the rule match?
    pub matched: bool,
    /// Per-trigger outcomes, one entry per trigger in rule order
    pub triggers: Vec<TriggerResult>,
}

impl MatchResult {
    /// A non-match with no trigger outcomes (used for zero-trigger rules).
    #[must_use]
    pub const fn unmatched() -> Self {
        Self {
            matched: false,
            triggers: Vec::new(),
        }
    }
}

/// Evaluate a rule's triggers against a journal.
///
/// A rule with zero triggers never matches: rules carrying only actions must
/// not fire indiscriminately.
#[must_use]
pub fn evaluate(rule: &Rule, journal: &Journal) -> MatchResult {
    if rule.triggers.is_empty() {
        trace!(rule = %rule.id, "rule has no triggers, never matches");
        return MatchResult::unmatched();
    }

    let result = match rule.mode {
        TriggerMode::All => evaluate_all(rule, journal),
        TriggerMode::Any => evaluate_any(rule, journal),
    };
    trace!(
        rule = %rule.id,
        journal = %journal.id(),
        matched = result.matched,
        "evaluated rule"
    );
    result
}

fn evaluate_all(rule: &Rule, journal: &Journal) -> MatchResult {
    let mut triggers = Vec::with_capacity(rule.triggers.len());
    let mut any_passed = false;
    let mut any_blocked = false;

    for (index, trigger) in rule.triggers.iter().enumerate() {
        if any_blocked && !rule.strict {
            // Non-strict rules short-circuit after the first failure.
            triggers.push(TriggerResult {
                index,
                outcome: TriggerOutcome::NotEvaluated,
            });
            continue;
        }
        let outcome = evaluate_trigger(trigger, journal, rule.strict);
        any_passed |= outcome.passed();
        any_blocked |= outcome.blocks_match();
        triggers.push(TriggerResult { index, outcome });
    }

    MatchResult {
        // All-skipped trigger lists carry no positive evidence, so they do
        // not match, mirroring the zero-trigger policy.
        matched: !any_blocked && any_passed,
        triggers,
    }
}

fn evaluate_any(rule: &Rule, journal: &Journal) -> MatchResult {
    let mut triggers = Vec::with_capacity(rule.triggers.len());
    let mut matched = false;

    for (index, trigger) in rule.triggers.iter().enumerate() {
        if matched {
            triggers.push(TriggerResult {
                index,
                outcome: TriggerOutcome::NotEvaluated,
            });
            continue;
        }
        let outcome = evaluate_trigger(trigger, journal, rule.strict);
        matched |= outcome.passed();
        triggers.push(TriggerResult { index, outcome });
    }

    MatchResult { matched, triggers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{Trigger, TriggerOperator};
    use autoledger_core::{Account, AccountType, Field, JournalBuilder, JournalType};
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn withdrawal() -> Journal {
        let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
        JournalBuilder::new(1, JournalType::Withdrawal, date, "USD", "SuperMart #123")
            .leg(Account::new(1, "Checking", AccountType::Asset), dec!(-50.00))
            .leg(Account::new(2, "Groceries", AccountType::Expense), dec!(50.00))
            .build()
            .unwrap()
    }

    fn opening_balance() -> Journal {
        let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
        JournalBuilder::new(2, JournalType::OpeningBalance, date, "USD", "Opening")
            .leg(
                Account::new(3, "Opening balances", AccountType::Equity),
                dec!(-1000.00),
            )
            .leg(Account::new(1, "Checking", AccountType::Asset), dec!(1000.00))
            .build()
            .unwrap()
    }

    fn contains(value: &str) -> Trigger {
        Trigger::new(Field::Description, TriggerOperator::Contains, value)
    }

    #[test]
    fn test_zero_triggers_never_match() {
        let rule = Rule::new(1, "actions only");
        let result = evaluate(&rule, &withdrawal());
        assert!(!result.matched);
        assert!(result.triggers.is_empty());
    }

    #[test]
    fn test_all_mode_requires_every_trigger() {
        let rule = Rule::new(1, "both")
            .with_trigger(contains("SuperMart"))
            .with_trigger(contains("#123"));
        assert!(evaluate(&rule, &withdrawal()).matched);

        let rule = Rule::new(1, "one wrong")
            .with_trigger(contains("SuperMart"))
            .with_trigger(contains("MegaMart"));
        assert!(!evaluate(&rule, &withdrawal()).matched);
    }

    #[test]
    fn test_any_mode_one_is_enough() {
        let rule = Rule::new(1, "either")
            .any_trigger()
            .with_trigger(contains("MegaMart"))
            .with_trigger(contains("SuperMart"));
        let result = evaluate(&rule, &withdrawal());
        assert!(result.matched);
        assert_eq!(result.triggers[0].outcome, TriggerOutcome::Failed);
        assert_eq!(result.triggers[1].outcome, TriggerOutcome::Passed);
    }

    #[test]
    fn test_any_mode_short_circuits() {
        let rule = Rule::new(1, "first wins")
            .any_trigger()
            .with_trigger(contains("SuperMart"))
            .with_trigger(contains("never looked at"));
        let result = evaluate(&rule, &withdrawal());
        assert!(result.matched);
        assert_eq!(result.triggers[1].outcome, TriggerOutcome::NotEvaluated);
    }

    #[test]
    fn test_non_strict_short_circuits_after_failure() {
        let rule = Rule::new(1, "stops early")
            .with_trigger(contains("MegaMart"))
            .with_trigger(contains("SuperMart"));
        let result = evaluate(&rule, &withdrawal());
        assert!(!result.matched);
        assert_eq!(result.triggers[0].outcome, TriggerOutcome::Failed);
        assert_eq!(result.triggers[1].outcome, TriggerOutcome::NotEvaluated);
    }

    #[test]
    fn test_strict_reports_every_trigger() {
        let rule = Rule::new(1, "reports all")
            .strict()
            .with_trigger(contains("MegaMart"))
            .with_trigger(contains("SuperMart"))
            .with_trigger(contains("also wrong"));
        let result = evaluate(&rule, &withdrawal());
        assert!(!result.matched);
        assert_eq!(result.triggers[0].outcome, TriggerOutcome::Failed);
        assert_eq!(result.triggers[1].outcome, TriggerOutcome::Passed);
        assert_eq!(result.triggers[2].outcome, TriggerOutcome::Failed);
    }

    #[test]
    fn test_all_skipped_does_not_match() {
        // Both triggers probe fields that are not applicable on an opening
        // balance; with nothing actually passing the rule must not fire.
        let rule = Rule::new(1, "all skipped")
            .with_trigger(Trigger::new(
                Field::DestinationAccount,
                TriggerOperator::Equals,
                "Checking",
            ))
            .with_trigger(Trigger::new(
                Field::Budget,
                TriggerOperator::Equals,
                "monthly",
            ));
        let result = evaluate(&rule, &opening_balance());
        assert!(!result.matched);
        assert_eq!(result.triggers[0].outcome, TriggerOutcome::Skipped);
        assert_eq!(result.triggers[1].outcome, TriggerOutcome::Skipped);
    }

    #[test]
    fn test_skipped_triggers_do_not_block() {
        let rule = Rule::new(1, "skip plus pass")
            .with_trigger(Trigger::new(
                Field::Budget,
                TriggerOperator::Equals,
                "monthly",
            ))
            .with_trigger(contains("Opening"));
        let result = evaluate(&rule, &opening_balance());
        assert!(result.matched);
        assert_eq!(result.triggers[0].outcome, TriggerOutcome::Skipped);
        assert_eq!(result.triggers[1].outcome, TriggerOutcome::Passed);
    }

    #[test]
    fn test_invalid_pattern_blocks_match_but_is_recorded() {
        let rule = Rule::new(1, "bad pattern")
            .with_trigger(Trigger::new(
                Field::Description,
                TriggerOperator::Matches,
                "[unclosed",
            ))
            .with_trigger(contains("SuperMart"));
        let result = evaluate(&rule, &withdrawal());
        assert!(!result.matched);
        assert!(matches!(result.triggers[0].outcome, TriggerOutcome::Error(_)));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let rule = Rule::new(1, "repeatable")
            .with_trigger(contains("SuperMart"))
            .with_trigger(Trigger::new(Field::Amount, TriggerOperator::GreaterThan, "10"));
        let journal = withdrawal();
        assert_eq!(evaluate(&rule, &journal), evaluate(&rule, &journal));
    }
}
