use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::train::evaluation::Evaluation;

/// What a termination condition gets to look at, once before every epoch.
#[derive(Debug, Clone, Copy)]
pub struct TrainingProgress<'a> {
    /// Epochs completed so far in this run.
    pub epoch: usize,
    /// Evaluation log of this run, oldest first.
    pub evaluations: &'a [Evaluation],
}

impl TrainingProgress<'_> {
    pub fn latest_evaluation(&self) -> Option<&Evaluation> {
        self.evaluations.last()
    }
}

/// A predicate that halts training.  A trainer ORs all of its conditions.
///
/// Any `Fn(&TrainingProgress) -> bool` closure is a condition.
pub trait TerminationCondition {
    fn has_finished(&self, progress: &TrainingProgress<'_>) -> bool;
}

impl<F> TerminationCondition for F
where
    F: Fn(&TrainingProgress<'_>) -> bool,
{
    fn has_finished(&self, progress: &TrainingProgress<'_>) -> bool {
        self(progress)
    }
}

/// Finished once the epoch counter exceeds the limit, so `limit + 1` epochs
/// run in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochLimit(pub usize);

impl TerminationCondition for EpochLimit {
    fn has_finished(&self, progress: &TrainingProgress<'_>) -> bool {
        progress.epoch > self.0
    }
}

/// Observes a flag that another thread may raise; training stops before the
/// next epoch once it is set.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> StopFlag {
        StopFlag::default()
    }

    /// Shares an existing flag.
    pub fn from_flag(flag: Arc<AtomicBool>) -> StopFlag {
        StopFlag(flag)
    }

    /// Handle for the thread that will request the stop.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl TerminationCondition for StopFlag {
    fn has_finished(&self, _progress: &TrainingProgress<'_>) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Finished once the most recent evaluation's training loss is below the
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingLossBelow(pub f64);

impl TerminationCondition for TrainingLossBelow {
    fn has_finished(&self, progress: &TrainingProgress<'_>) -> bool {
        progress
            .latest_evaluation()
            .and_then(|e| e.training_loss)
            .map_or(false, |loss| loss < self.0)
    }
}
