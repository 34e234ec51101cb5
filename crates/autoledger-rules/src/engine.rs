//! The dispatcher: runs the ordered rule set over journals.
//!
//! Per journal the pass is strictly sequential: rules in priority order,
//! each evaluated at most once, actions in list order. Across journals the
//! passes are independent (no journal's rules touch another journal's
//! state), which is what makes [`Dispatcher::run_batch_parallel`] safe.
//!
//! Failure handling follows a strict split: trigger and action failures are
//! recorded in the reports and never abort anything; a collaborator
//! breakdown aborts the in-flight journal and surfaces as [`PassAbort`],
//! with every previously completed journal left committed.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use autoledger_core::{Journal, JournalId};

use crate::action::{execute, ActionFailure, AppliedAction};
use crate::evaluate::{evaluate, MatchResult};
use crate::ports::{PersistenceSink, PortError, ReferenceResolver, RuleStore, TransactionSource};
use crate::rule::{Rule, RuleId};

/// Cooperative cancellation flag for batch passes.
///
/// Cancellation is only observed between journals: a journal's pass is the
/// atomic unit of observable mutation and never stops halfway.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Everything that happened between one rule and one journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    /// The rule that was evaluated
    pub rule_id: RuleId,
    /// The rule's title, for reports
    pub title: String,
    /// The trigger evaluation result
    pub match_result: MatchResult,
    /// Actions applied (empty when the rule did not match)
    pub applied: Vec<AppliedAction>,
    /// Action failures recorded (empty when the rule did not match)
    pub failures: Vec<ActionFailure>,
}

/// The aggregate result of one journal's pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalReport {
    /// The journal in its final, post-pass state
    pub journal: Journal,
    /// One outcome per evaluated rule, in evaluation order. Rules skipped
    /// by stop-processing do not appear.
    pub outcomes: Vec<RuleOutcome>,
    /// The rule whose stop-processing flag ended the pass, if any
    pub stopped_by: Option<RuleId>,
}

impl JournalReport {
    /// Whether any action failure was recorded during the pass.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.failures.is_empty())
    }

    /// The flattened audit of every applied action, in application order.
    #[must_use]
    pub fn audit(&self) -> Vec<AppliedAction> {
        self.outcomes
            .iter()
            .flat_map(|o| o.applied.iter().cloned())
            .collect()
    }
}

/// The result of a full batch pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// One report per completed journal, in source order
    pub reports: Vec<JournalReport>,
    /// Whether the pass ended early because of cancellation
    pub cancelled: bool,
}

/// A batch pass aborted by a collaborator breakdown.
///
/// Journals completed before the abort stay committed; there is no
/// batch-wide rollback.
#[derive(Debug, Error)]
#[error("rule pass aborted: {source}")]
pub struct PassAbort {
    /// Reports of journals that completed (and were committed) before the
    /// abort
    pub completed: Vec<JournalReport>,
    /// The journal whose pass was in flight, if one was
    pub journal_id: Option<JournalId>,
    /// The collaborator failure
    #[source]
    pub source: PortError,
}

/// Orders rules and applies them to journals.
///
/// The rule snapshot is immutable per dispatcher: selection (active only),
/// priority order, and tie-breaking by insertion order all happen once, in
/// [`Dispatcher::new`]. Re-running a pass with the same rules and reference
/// data yields identical reports.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    rules: Vec<Rule>,
}

impl Dispatcher {
    /// Build a dispatcher from a rule snapshot.
    ///
    /// Inactive rules are dropped; the rest are stably sorted by ascending
    /// priority, so equal priorities keep their insertion order.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().filter(|r| r.active).collect();
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    /// Build a dispatcher from a rule store.
    pub fn from_store(store: &dyn RuleStore) -> Result<Self, PortError> {
        Ok(Self::new(store.rules()?))
    }

    /// The selected, ordered rules this dispatcher will run.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the full rule pass over one journal.
    ///
    /// The journal is taken by value as the pass's working copy and handed
    /// back inside the report; each rule fires at most once, so an action
    /// that makes an earlier rule's triggers true again cannot re-trigger
    /// it.
    pub fn run_journal(
        &self,
        journal: Journal,
        resolver: &dyn ReferenceResolver,
    ) -> Result<JournalReport, PortError> {
        let mut working = journal;
        let mut outcomes = Vec::new();
        let mut stopped_by = None;

        debug!(journal = %working.id(), rules = self.rules.len(), "starting rule pass");

        for rule in &self.rules {
            let match_result = evaluate(rule, &working);
            if match_result.matched {
                let execution = execute(rule, &mut working, resolver)?;
                let stop = rule.stop_processing;
                outcomes.push(RuleOutcome {
                    rule_id: rule.id,
                    title: rule.title.clone(),
                    match_result,
                    applied: execution.applied,
                    failures: execution.failures,
                });
                if stop {
                    debug!(journal = %working.id(), rule = %rule.id, "stop-processing ends pass");
                    stopped_by = Some(rule.id);
                    break;
                }
            } else {
                outcomes.push(RuleOutcome {
                    rule_id: rule.id,
                    title: rule.title.clone(),
                    match_result,
                    applied: Vec::new(),
                    failures: Vec::new(),
                });
            }
        }

        Ok(JournalReport {
            journal: working,
            outcomes,
            stopped_by,
        })
    }

    /// Run a sequential batch pass, committing each finished journal to the
    /// sink.
    ///
    /// Cancellation is checked between journals. A collaborator breakdown
    /// aborts with [`PassAbort`]; everything committed before it stays
    /// committed.
    pub fn run_batch(
        &self,
        source: &mut dyn TransactionSource,
        resolver: &dyn ReferenceResolver,
        sink: &dyn PersistenceSink,
        cancel: &CancelToken,
    ) -> Result<BatchReport, PassAbort> {
        let mut reports = Vec::new();

        loop {
            if cancel.is_cancelled() {
                debug!(completed = reports.len(), "batch pass cancelled");
                return Ok(BatchReport {
                    reports,
                    cancelled: true,
                });
            }

            let journal = match source.next_journal() {
                Ok(Some(journal)) => journal,
                Ok(None) => break,
                Err(source) => {
                    return Err(PassAbort {
                        completed: reports,
                        journal_id: None,
                        source,
                    })
                }
            };

            let journal_id = journal.id();
            let report = match self.run_journal(journal, resolver) {
                Ok(report) => report,
                Err(source) => {
                    return Err(PassAbort {
                        completed: reports,
                        journal_id: Some(journal_id),
                        source,
                    })
                }
            };

            if let Err(source) = sink.commit(&report.journal, &report.audit()) {
                return Err(PassAbort {
                    completed: reports,
                    journal_id: Some(journal_id),
                    source,
                });
            }
            reports.push(report);
        }

        Ok(BatchReport {
            reports,
            cancelled: false,
        })
    }

    /// Run a batch pass fanned out across journals.
    ///
    /// Each journal's pass is independent, so journals are processed in
    /// parallel; within a journal everything stays sequential. Reports come
    /// back in input order. On a collaborator breakdown the abort carries
    /// every journal that did complete (parallel siblings may have
    /// committed after the failing one; all of them stay committed).
    pub fn run_batch_parallel(
        &self,
        journals: Vec<Journal>,
        resolver: &dyn ReferenceResolver,
        sink: &dyn PersistenceSink,
        cancel: &CancelToken,
    ) -> Result<BatchReport, PassAbort> {
        let results: Vec<Result<Option<JournalReport>, (JournalId, PortError)>> = journals
            .into_par_iter()
            .map(|journal| {
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                let journal_id = journal.id();
                let report = self
                    .run_journal(journal, resolver)
                    .map_err(|e| (journal_id, e))?;
                sink.commit(&report.journal, &report.audit())
                    .map_err(|e| (journal_id, e))?;
                Ok(Some(report))
            })
            .collect();

        let mut reports = Vec::new();
        let mut cancelled = false;
        let mut abort: Option<(JournalId, PortError)> = None;

        for result in results {
            match result {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => cancelled = true,
                Err(failure) => abort = abort.or(Some(failure)),
            }
        }

        if let Some((journal_id, source)) = abort {
            return Err(PassAbort {
                completed: reports,
                journal_id: Some(journal_id),
                source,
            });
        }

        Ok(BatchReport { reports, cancelled })
    }
}
