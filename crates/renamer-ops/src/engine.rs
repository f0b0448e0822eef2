//! The rename engine: validates, resolves conflicts and copies each item of
//! a plan in order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use renamer_core::{validate, ConfigurationError, ItemUpdate, RenamePlan};

use crate::config::EngineConfig;
use crate::conflict::{Conflict, ConflictResolution, ConflictResolver};
use crate::copy::{LocalFs, OutputFs};
use crate::progress::{Counters, ProgressReporter, RenameProgress, RunOutcome, RunSummary};

/// One item of a run, captured from the plan when the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameJob {
    /// Position of the item in the plan.
    pub index: usize,
    pub original_name: String,
    pub source: PathBuf,
    pub target_name: String,
}

/// Snapshot the plan into jobs, after checking the run can start.
///
/// Creates the output folder if it does not exist yet.
pub fn prepare_jobs(
    plan: &RenamePlan,
    input_dir: &Path,
    output_root: &Path,
) -> Result<Vec<RenameJob>, ConfigurationError> {
    if plan.is_empty() {
        return Err(ConfigurationError::EmptyPlan);
    }
    if !input_dir.is_dir() {
        return Err(ConfigurationError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    if !output_root.is_dir() {
        fs::create_dir_all(output_root).map_err(|e| ConfigurationError::OutputUnavailable {
            path: output_root.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    Ok(plan
        .iter()
        .enumerate()
        .map(|(index, item)| RenameJob {
            index,
            original_name: item.original_name().to_string(),
            source: input_dir.join(item.original_name()),
            target_name: item.target_name().to_string(),
        })
        .collect())
}

/// State owned by a single run.
#[derive(Debug)]
pub struct RunState {
    cancel: CancellationToken,
    sticky: Option<ConflictResolution>,
    counters: Counters,
    total: usize,
}

impl RunState {
    pub fn new(cancel: CancellationToken, total: usize) -> Self {
        Self {
            cancel,
            sticky: None,
            counters: Counters::default(),
            total,
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// The sticky conflict decision, if one was made this run.
    pub fn sticky(&self) -> Option<ConflictResolution> {
        self.sticky
    }

    fn progress(&self, position: usize, current_file: &str) -> RenameProgress {
        RenameProgress {
            current: position + 1,
            total: self.total,
            succeeded: self.counters.success,
            failed: self.counters.error,
            skipped: self.counters.skipped,
            current_file: current_file.to_string(),
        }
    }
}

/// What happened to one item.
enum Step {
    Finished(ItemUpdate),
    Cancelled,
}

/// Releases the single-run slot when dropped.
#[derive(Debug)]
pub(crate) struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub(crate) fn acquire(running: &Arc<AtomicBool>) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                running: Arc::clone(running),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Copies each item of a plan into the output folder under its new name.
///
/// Items are processed strictly in plan order, one at a time. Per-item
/// failures are recorded on the item and never stop the run; only
/// cancellation does. At most one run is active per engine.
#[derive(Debug)]
pub struct RenameEngine<F = LocalFs> {
    pub(crate) config: EngineConfig,
    pub(crate) fs: Arc<F>,
    pub(crate) running: Arc<AtomicBool>,
}

impl<F> Clone for RenameEngine<F> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            fs: Arc::clone(&self.fs),
            running: Arc::clone(&self.running),
        }
    }
}

impl Default for RenameEngine<LocalFs> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RenameEngine<LocalFs> {
    /// Create an engine writing to the local filesystem.
    pub fn new(config: EngineConfig) -> Self {
        let fs = LocalFs::new(config.preserve_timestamps);
        Self::with_fs(config, fs)
    }
}

impl<F: OutputFs> RenameEngine<F> {
    /// Create an engine with a custom output filesystem.
    pub fn with_fs(config: EngineConfig, fs: F) -> Self {
        Self {
            config,
            fs: Arc::new(fs),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run the plan on the calling thread, applying status changes to it.
    ///
    /// Returns `Ok(None)` without doing anything if another run is already in
    /// progress on this engine.
    pub fn run<R, P>(
        &self,
        plan: &mut RenamePlan,
        input_dir: &Path,
        output_root: &Path,
        resolver: &mut R,
        reporter: &mut P,
        cancel: CancellationToken,
    ) -> Result<Option<RunSummary>, ConfigurationError>
    where
        R: ConflictResolver,
        P: ProgressReporter,
    {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            tracing::debug!("run requested while another run is active");
            return Ok(None);
        };

        let jobs = prepare_jobs(plan, input_dir, output_root)?;
        let mut sink = PlanReporter { plan, inner: reporter };
        let state = RunState::new(cancel, jobs.len());

        Ok(Some(self.execute(&jobs, output_root, resolver, &mut sink, state)))
    }

    /// Process `jobs` in order. The caller holds the run slot.
    pub(crate) fn execute<R, P>(
        &self,
        jobs: &[RenameJob],
        output_root: &Path,
        resolver: &mut R,
        reporter: &mut P,
        mut state: RunState,
    ) -> RunSummary
    where
        R: ConflictResolver,
        P: ProgressReporter,
    {
        tracing::info!(total = jobs.len(), output = %output_root.display(), "rename run started");

        let mut stopped_early = false;
        for (position, job) in jobs.iter().enumerate() {
            if state.cancel.is_cancelled() {
                stopped_early = true;
                break;
            }

            reporter.progress(&state.progress(position, &job.original_name));

            match self.process(job, output_root, resolver, &mut state) {
                Step::Finished(update) => {
                    state.counters.record(update.status);
                    reporter.item_updated(&update);
                }
                Step::Cancelled => {
                    stopped_early = true;
                    break;
                }
            }

            if !self.config.item_delay.is_zero() {
                std::thread::sleep(self.config.item_delay);
            }
        }

        let outcome = if stopped_early {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Completed
        };
        let summary = RunSummary::new(state.counters, state.total, outcome);
        tracing::info!(
            success = summary.success,
            error = summary.error,
            skipped = summary.skipped,
            ?outcome,
            "rename run finished"
        );
        summary
    }

    fn process<R: ConflictResolver>(
        &self,
        job: &RenameJob,
        output_root: &Path,
        resolver: &mut R,
        state: &mut RunState,
    ) -> Step {
        if job.target_name.trim().is_empty() {
            tracing::debug!(file = %job.original_name, "no target name, skipping");
            return Step::Finished(ItemUpdate::skipped(job.index));
        }

        if let Err(reason) = validate(&job.target_name) {
            tracing::warn!(file = %job.original_name, new_name = %job.target_name, %reason, "invalid target name");
            return Step::Finished(ItemUpdate::error(job.index, reason.to_string()));
        }

        let destination = output_root.join(&job.target_name);
        if self.fs.exists(&destination) {
            let Some(resolution) = self.resolve_conflict(job, &destination, resolver, state) else {
                return Step::Cancelled;
            };

            match resolution {
                ConflictResolution::Overwrite | ConflictResolution::OverwriteAll => {}
                ConflictResolution::Skip | ConflictResolution::SkipAll => {
                    return Step::Finished(ItemUpdate::skipped(job.index));
                }
                ConflictResolution::CancelAll => {
                    state.cancel.cancel();
                    return Step::Cancelled;
                }
            }
        }

        match self.fs.copy(&job.source, &destination) {
            Ok(bytes) => {
                tracing::debug!(file = %job.original_name, new_name = %job.target_name, bytes, "copied");
                Step::Finished(ItemUpdate::done(job.index))
            }
            Err(e) => {
                tracing::warn!(file = %job.original_name, new_name = %job.target_name, error = %e, "copy failed");
                Step::Finished(ItemUpdate::error(job.index, e.to_string()))
            }
        }
    }

    /// Decide what to do about an occupied destination.
    ///
    /// Returns `None` if the run was cancelled before the question was asked.
    fn resolve_conflict<R: ConflictResolver>(
        &self,
        job: &RenameJob,
        destination: &Path,
        resolver: &mut R,
        state: &mut RunState,
    ) -> Option<ConflictResolution> {
        if let Some(sticky) = state.sticky {
            return Some(sticky);
        }
        if state.cancel.is_cancelled() {
            return None;
        }

        let conflict = Conflict {
            candidate_name: job.target_name.clone(),
            source: job.source.clone(),
            destination: destination.to_path_buf(),
            source_size: self.fs.size(&job.source).unwrap_or(0),
            destination_size: self.fs.size(destination).unwrap_or(0),
        };

        let resolution = resolver.resolve(&conflict);
        tracing::debug!(new_name = %job.target_name, %resolution, "conflict resolved");
        if resolution.is_sticky() {
            state.sticky = Some(resolution);
        }
        Some(resolution)
    }
}

/// Applies item updates to the plan before forwarding them.
struct PlanReporter<'a, P> {
    plan: &'a mut RenamePlan,
    inner: &'a mut P,
}

impl<P: ProgressReporter> ProgressReporter for PlanReporter<'_, P> {
    fn progress(&mut self, progress: &RenameProgress) {
        self.inner.progress(progress);
    }

    fn item_updated(&mut self, update: &ItemUpdate) {
        if let Err(e) = self.plan.apply_update(update) {
            tracing::warn!(error = %e, "status update for unknown item");
        }
        self.inner.item_updated(update);
    }
}
