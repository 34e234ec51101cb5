//! In-memory collaborator implementations.
//!
//! These back the test suites and the CLI caller. They are complete,
//! thread-safe implementations of the ports, not mocks: `MemoryResolver`
//! even demonstrates the create-if-absent policy the resolver contract
//! leaves to the implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use autoledger_core::{Account, Journal};

use crate::action::AppliedAction;
use crate::ports::{
    BudgetRef, CategoryRef, PersistenceSink, PortError, ReferenceResolver, RuleGroupRef,
    RuleStore, TransactionSource,
};
use crate::rule::Rule;

/// Map-backed reference resolver.
///
/// Accounts resolve by id or name and are never invented. Categories,
/// budgets, and rule groups resolve from the registered sets; with
/// [`MemoryResolver::create_missing`] enabled, unknown names resolve to
/// fresh references instead of `None` (the create-if-absent policy).
#[derive(Debug, Default)]
pub struct MemoryResolver {
    accounts_by_id: HashMap<u64, Account>,
    accounts_by_name: HashMap<String, Account>,
    categories: HashMap<String, CategoryRef>,
    budgets: HashMap<String, BudgetRef>,
    rule_groups: HashMap<String, RuleGroupRef>,
    create_missing: bool,
}

impl MemoryResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve unknown categories, budgets, and rule groups to fresh
    /// references instead of reporting them absent.
    #[must_use]
    pub const fn create_missing(mut self) -> Self {
        self.create_missing = true;
        self
    }

    /// Register an account.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts_by_id.insert(account.id.0, account.clone());
        self.accounts_by_name.insert(account.name.clone(), account);
        self
    }

    /// Register a category.
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let id = self.categories.len() as u64 + 1;
        self.categories.insert(name.clone(), CategoryRef::new(id, name));
        self
    }

    /// Register a budget.
    #[must_use]
    pub fn with_budget(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let id = self.budgets.len() as u64 + 1;
        self.budgets.insert(name.clone(), BudgetRef::new(id, name));
        self
    }

    /// Register a rule group.
    #[must_use]
    pub fn with_rule_group(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let id = self.rule_groups.len() as u64 + 1;
        self.rule_groups
            .insert(name.clone(), RuleGroupRef::new(id, name));
        self
    }
}

impl ReferenceResolver for MemoryResolver {
    fn account(&self, reference: &str) -> Result<Option<Account>, PortError> {
        if let Ok(id) = reference.parse::<u64>() {
            if let Some(account) = self.accounts_by_id.get(&id) {
                return Ok(Some(account.clone()));
            }
        }
        Ok(self.accounts_by_name.get(reference).cloned())
    }

    fn category(&self, name: &str) -> Result<Option<CategoryRef>, PortError> {
        match self.categories.get(name) {
            Some(category) => Ok(Some(category.clone())),
            None if self.create_missing => Ok(Some(CategoryRef::new(0, name))),
            None => Ok(None),
        }
    }

    fn budget(&self, name: &str) -> Result<Option<BudgetRef>, PortError> {
        match self.budgets.get(name) {
            Some(budget) => Ok(Some(budget.clone())),
            None if self.create_missing => Ok(Some(BudgetRef::new(0, name))),
            None => Ok(None),
        }
    }

    fn rule_group(&self, name: &str) -> Result<Option<RuleGroupRef>, PortError> {
        match self.rule_groups.get(name) {
            Some(group) => Ok(Some(group.clone())),
            None if self.create_missing => Ok(Some(RuleGroupRef::new(0, name))),
            None => Ok(None),
        }
    }
}

/// A finite journal source over an owned vector.
#[derive(Debug)]
pub struct VecSource {
    journals: std::vec::IntoIter<Journal>,
}

impl VecSource {
    /// Create a source over the given journals.
    #[must_use]
    pub fn new(journals: Vec<Journal>) -> Self {
        Self {
            journals: journals.into_iter(),
        }
    }
}

impl TransactionSource for VecSource {
    fn next_journal(&mut self) -> Result<Option<Journal>, PortError> {
        Ok(self.journals.next())
    }
}

/// A rule store over an owned vector.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Vec<Rule>,
}

impl MemoryRuleStore {
    /// Create a store over the given rules.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for MemoryRuleStore {
    fn rules(&self) -> Result<Vec<Rule>, PortError> {
        Ok(self.rules.clone())
    }
}

/// A sink that collects committed journals and audits in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    committed: Mutex<Vec<(Journal, Vec<AppliedAction>)>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything committed so far, in commit order.
    #[must_use]
    pub fn committed(&self) -> Vec<(Journal, Vec<AppliedAction>)> {
        match self.committed.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PersistenceSink for MemorySink {
    fn commit(&self, journal: &Journal, audit: &[AppliedAction]) -> Result<(), PortError> {
        self.committed
            .lock()
            .map_err(|_| PortError::Backend("sink poisoned".into()))?
            .push((journal.clone(), audit.to_vec()));
        Ok(())
    }
}
