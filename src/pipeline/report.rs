//! Validation run report
//!
//! An ordered record of task outcomes plus the final verdict. The report is
//! assembled incrementally by the controller and finalized exactly once, at
//! queue end or at the first fail-fast abort; after that it is a read-only
//! value handed to the caller.

use super::controller::PipelineState;
use super::task::TaskOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Final record of one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique id of this run.
    pub run_id: Uuid,

    /// Number of tasks the queue was expanded to.
    pub total_tasks: usize,

    /// Outcomes in execution order (equal to expansion order).
    pub outcomes: Vec<TaskOutcome>,

    /// Terminal controller state.
    pub state: PipelineState,

    /// True iff the run completed and every task passed.
    pub overall_passed: bool,

    /// Id of the first task that did not pass, if any.
    pub first_failure: Option<String>,
}

impl Report {
    /// Finalizes a report from the executed outcomes
    ///
    /// The verdict passes only when the queue ran to completion and no
    /// recorded outcome failed; an advisory failure fails the verdict even
    /// though it never stops the queue.
    #[must_use]
    pub fn finalize(
        run_id: Uuid,
        total_tasks: usize,
        outcomes: Vec<TaskOutcome>,
        state: PipelineState,
    ) -> Self {
        let first_failure = outcomes
            .iter()
            .find(|outcome| !outcome.succeeded())
            .map(|outcome| outcome.task_id.clone());
        let overall_passed = state == PipelineState::Completed && first_failure.is_none();

        Self {
            run_id,
            total_tasks,
            outcomes,
            state,
            overall_passed,
            first_failure,
        }
    }

    /// Number of tasks that passed
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Number of tasks that ran and did not pass
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    /// Number of queued tasks that never ran because of an abort
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.total_tasks - self.outcomes.len()
    }

    /// Outcomes that did not pass, in execution order
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}
