//! Rename execution engine for renamer.
//!
//! This crate runs a [`RenamePlan`](renamer_core::RenamePlan): every item is
//! validated, checked for a destination conflict and copied into the output
//! folder under its new name, strictly in plan order. Runs can be driven
//! synchronously with [`RenameEngine::run`] or on a background worker with
//! [`RenameEngine::start`], which reports through a channel following the
//! same pattern as the rest of the workspace.

mod config;
mod conflict;
mod copy;
mod engine;
mod progress;
mod worker;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use conflict::{Conflict, ConflictRequest, ConflictResolution, ConflictResolver};
pub use copy::{LocalFs, OutputFs};
pub use engine::{prepare_jobs, RenameEngine, RenameJob, RunState};
pub use progress::{Counters, ProgressReporter, RenameProgress, RunOutcome, RunSummary};
pub use worker::{RenameEvent, RunHandle};

/// Default channel buffer size for run events.
pub const RENAME_CHANNEL_SIZE: usize = 100;
