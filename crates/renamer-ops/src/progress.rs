//! Progress reporting and run summaries.

use serde::{Deserialize, Serialize};

use renamer_core::{ItemStatus, ItemUpdate};

/// Progress snapshot sent before each item is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameProgress {
    /// One-based position of the item about to be processed.
    pub current: usize,
    /// Number of items in the run.
    pub total: usize,
    /// Items copied so far.
    pub succeeded: usize,
    /// Items failed so far.
    pub failed: usize,
    /// Items skipped so far.
    pub skipped: usize,
    /// Original name of the item about to be processed.
    pub current_file: String,
}

impl RenameProgress {
    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Per-run success/error/skip counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub success: usize,
    pub error: usize,
    pub skipped: usize,
}

impl Counters {
    /// Count a terminal status.
    pub fn record(&mut self, status: ItemStatus) {
        match status {
            ItemStatus::Done => self.success += 1,
            ItemStatus::Error => self.error += 1,
            ItemStatus::Skipped => self.skipped += 1,
            ItemStatus::Pending | ItemStatus::Ready => {}
        }
    }

    /// Items that reached a terminal status.
    pub fn processed(&self) -> usize {
        self.success + self.error + self.skipped
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every item was processed.
    Completed,
    /// The run was stopped by the user or a cancel-all conflict decision.
    Cancelled,
}

/// Final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: usize,
    pub error: usize,
    pub skipped: usize,
    /// Number of items in the run.
    pub total: usize,
    pub outcome: RunOutcome,
}

impl RunSummary {
    pub(crate) fn new(counters: Counters, total: usize, outcome: RunOutcome) -> Self {
        Self {
            success: counters.success,
            error: counters.error,
            skipped: counters.skipped,
            total,
            outcome,
        }
    }

    /// Items that reached a terminal status.
    pub fn processed(&self) -> usize {
        self.success + self.error + self.skipped
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }

    /// Check if the run completed with every item copied.
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed && self.error == 0 && self.skipped == 0
    }

    /// Get a human-readable summary of the run.
    pub fn summary(&self) -> String {
        match self.outcome {
            RunOutcome::Cancelled => format!(
                "Stopped: {} done, {} errors, {} skipped",
                self.success, self.error, self.skipped
            ),
            RunOutcome::Completed => {
                let mut text = format!("Completed: {}/{} files", self.success, self.total);
                if self.error > 0 {
                    text.push_str(&format!(", {} errors", self.error));
                }
                if self.skipped > 0 {
                    text.push_str(&format!(", {} skipped", self.skipped));
                }
                text
            }
        }
    }
}

/// Receives progress and status changes from a running engine.
pub trait ProgressReporter {
    /// Called before each item is processed.
    fn progress(&mut self, progress: &RenameProgress);

    /// Called once an item reaches a terminal status.
    fn item_updated(&mut self, update: &ItemUpdate);
}

/// Discards everything.
impl ProgressReporter for () {
    fn progress(&mut self, _progress: &RenameProgress) {}

    fn item_updated(&mut self, _update: &ItemUpdate) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let progress = RenameProgress {
            current: 1,
            total: 4,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            current_file: "a.txt".into(),
        };
        assert_eq!(progress.percentage(), 25.0);

        let empty = RenameProgress { total: 0, ..progress };
        assert_eq!(empty.percentage(), 0.0);
    }

    #[test]
    fn test_counters_ignore_non_terminal() {
        let mut counters = Counters::default();
        counters.record(ItemStatus::Done);
        counters.record(ItemStatus::Error);
        counters.record(ItemStatus::Skipped);
        counters.record(ItemStatus::Ready);
        assert_eq!(counters.processed(), 3);
    }

    #[test]
    fn test_summary_text() {
        let counters = Counters {
            success: 3,
            error: 1,
            skipped: 0,
        };
        let done = RunSummary::new(counters, 4, RunOutcome::Completed);
        assert_eq!(done.summary(), "Completed: 3/4 files, 1 errors");
        assert!(!done.is_success());

        let stopped = RunSummary::new(counters, 10, RunOutcome::Cancelled);
        assert!(stopped.is_cancelled());
        assert!(stopped.summary().starts_with("Stopped"));
        assert_eq!(stopped.processed(), 4);
    }
}
