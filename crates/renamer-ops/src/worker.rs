//! Background runs.
//!
//! The engine loop runs on a blocking worker thread. Everything it produces
//! travels over one ordered channel to the owning context, which applies
//! status changes to its plan. Conflicts are handed over as requests the
//! owner answers; the worker waits for that answer.

use std::path::Path;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use renamer_core::{ConfigurationError, ItemUpdate, RenamePlan};

use crate::conflict::{Conflict, ConflictRequest, ConflictResolution, ConflictResolver};
use crate::copy::OutputFs;
use crate::engine::{prepare_jobs, RenameEngine, RunGuard, RunState};
use crate::progress::{ProgressReporter, RenameProgress, RunSummary};

/// Event sent from a background run to its owner.
#[derive(Debug)]
pub enum RenameEvent {
    /// The run began.
    Started { total: usize },
    /// An item is about to be processed.
    Progress(RenameProgress),
    /// An item reached a terminal status.
    ItemUpdated(ItemUpdate),
    /// A destination exists; the worker waits for an answer.
    Conflict(ConflictRequest),
    /// The run ended. A new run may be started once this arrives.
    Finished(RunSummary),
}

/// Owner side of a background run.
#[derive(Debug)]
pub struct RunHandle {
    events: mpsc::Receiver<RenameEvent>,
    cancel: CancellationToken,
}

impl RunHandle {
    /// Receive the next event. Returns `None` once the run is over and all
    /// events were delivered.
    pub async fn recv(&mut self) -> Option<RenameEvent> {
        self.events.recv().await
    }

    /// Ask the run to stop.
    ///
    /// Takes effect before the next item or the next conflict prompt; a copy
    /// already in progress is finished first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl<F> RenameEngine<F>
where
    F: OutputFs + Send + Sync + 'static,
{
    /// Start a run of `plan` on a background worker.
    ///
    /// Must be called from within a tokio runtime. Returns `Ok(None)` if a run
    /// is already in progress on this engine. The plan is snapshotted; later
    /// edits do not affect the run.
    pub fn start(
        &self,
        plan: &RenamePlan,
        input_dir: &Path,
        output_root: &Path,
    ) -> Result<Option<RunHandle>, ConfigurationError> {
        let Some(guard) = RunGuard::acquire(&self.running) else {
            tracing::debug!("start requested while another run is active");
            return Ok(None);
        };

        let jobs = prepare_jobs(plan, input_dir, output_root)?;
        let (tx, rx) = mpsc::channel(self.config.channel_size);
        let cancel = CancellationToken::new();

        let engine = self.clone();
        let token = cancel.clone();
        let output_root = output_root.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let total = jobs.len();
            let mut reporter = ChannelReporter {
                tx: tx.clone(),
                cancel: token.clone(),
            };
            reporter.send(RenameEvent::Started { total });

            let mut resolver = ChannelResolver {
                tx: tx.clone(),
                cancel: token.clone(),
            };
            let state = RunState::new(token, total);
            let summary = engine.execute(&jobs, &output_root, &mut resolver, &mut reporter, state);

            drop(guard);
            reporter.send(RenameEvent::Finished(summary));
        });

        Ok(Some(RunHandle { events: rx, cancel }))
    }
}

/// Forwards progress to the owner. Stops the run if the owner went away.
struct ChannelReporter {
    tx: mpsc::Sender<RenameEvent>,
    cancel: CancellationToken,
}

impl ChannelReporter {
    fn send(&self, event: RenameEvent) {
        if self.tx.blocking_send(event).is_err() {
            tracing::debug!("run owner dropped, cancelling");
            self.cancel.cancel();
        }
    }
}

impl ProgressReporter for ChannelReporter {
    fn progress(&mut self, progress: &RenameProgress) {
        self.send(RenameEvent::Progress(progress.clone()));
    }

    fn item_updated(&mut self, update: &ItemUpdate) {
        self.send(RenameEvent::ItemUpdated(update.clone()));
    }
}

/// Hands conflicts to the owner and blocks until it answers.
struct ChannelResolver {
    tx: mpsc::Sender<RenameEvent>,
    cancel: CancellationToken,
}

impl ConflictResolver for ChannelResolver {
    fn resolve(&mut self, conflict: &Conflict) -> ConflictResolution {
        let (request, reply) = ConflictRequest::new(conflict.clone());
        if self.tx.blocking_send(RenameEvent::Conflict(request)).is_err() {
            self.cancel.cancel();
            return ConflictResolution::default();
        }

        // An unanswered request counts as a skip
        reply.blocking_recv().unwrap_or_default()
    }
}
