//! Property-based tests for the rule engine.
//!
//! Evaluation must be total (no input panics, malformed patterns become
//! recorded outcomes) and deterministic, and action application idempotent.

use chrono::DateTime;
use proptest::prelude::*;
use rust_decimal_macros::dec;

use autoledger_core::{Account, AccountType, Field, Journal, JournalBuilder, JournalType};
use autoledger_rules::memory::MemoryResolver;
use autoledger_rules::{
    evaluate_trigger, ActionKind, Dispatcher, Rule, Trigger, TriggerOperator,
};

fn journal(description: &str) -> Journal {
    let date = DateTime::parse_from_rfc3339("2026-03-01T09:30:00+01:00").unwrap();
    JournalBuilder::new(1, JournalType::Withdrawal, date, "USD", description)
        .leg(Account::new(1, "Checking", AccountType::Asset), dec!(-50.00))
        .leg(Account::new(2, "Groceries", AccountType::Expense), dec!(50.00))
        .build()
        .unwrap()
}

fn arb_field() -> impl Strategy<Value = Field> {
    prop_oneof![
        Just(Field::Description),
        Just(Field::Amount),
        Just(Field::Currency),
        Just(Field::Date),
        Just(Field::SourceAccount),
        Just(Field::DestinationAccount),
        Just(Field::Category),
        Just(Field::Budget),
        Just(Field::Tags),
        Just(Field::Notes),
        Just(Field::JournalType),
    ]
}

fn arb_operator() -> impl Strategy<Value = TriggerOperator> {
    prop_oneof![
        Just(TriggerOperator::Equals),
        Just(TriggerOperator::Contains),
        Just(TriggerOperator::StartsWith),
        Just(TriggerOperator::EndsWith),
        Just(TriggerOperator::GreaterThan),
        Just(TriggerOperator::LessThan),
        Just(TriggerOperator::Matches),
        Just(TriggerOperator::IsEmpty),
    ]
}

fn arb_trigger() -> impl Strategy<Value = Trigger> {
    (arb_field(), arb_operator(), ".{0,40}", prop::bool::ANY).prop_map(
        |(field, operator, value, negate)| {
            let trigger = Trigger::new(field, operator, value);
            if negate {
                trigger.negated()
            } else {
                trigger
            }
        },
    )
}

proptest! {
    /// Evaluation never panics, whatever the trigger contents (including
    /// comparison values that are invalid regexes or unparsable numbers),
    /// and yields the same outcome every time.
    #[test]
    fn trigger_evaluation_is_total_and_deterministic(
        trigger in arb_trigger(),
        description in ".{0,40}",
        strict in prop::bool::ANY,
    ) {
        let journal = journal(&description);
        let first = evaluate_trigger(&trigger, &journal, strict);
        let second = evaluate_trigger(&trigger, &journal, strict);
        prop_assert_eq!(first, second);
    }

    /// Running the same matching rule's actions twice ends in the same
    /// journal state as running them once.
    #[test]
    fn action_application_is_idempotent(
        tag in "[a-z]{1,12}",
        category in "[A-Z][a-z]{1,12}",
    ) {
        let rule = Rule::new(1, "generated")
            .with_trigger(Trigger::new(Field::Amount, TriggerOperator::GreaterThan, "0"))
            .with_action(ActionKind::SetCategory(category))
            .with_action(ActionKind::AddTag(tag));
        let dispatcher = Dispatcher::new(vec![rule]);
        let resolver = MemoryResolver::new().create_missing();

        let once = dispatcher.run_journal(journal("generated spend"), &resolver).unwrap();
        let twice = dispatcher.run_journal(once.journal.clone(), &resolver).unwrap();

        prop_assert_eq!(once.journal, twice.journal);
    }
}
