//! Conflict detection and resolution.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A destination that already exists when an item is about to be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Target name of the item being copied.
    pub candidate_name: String,
    /// The source file.
    pub source: PathBuf,
    /// The occupied destination.
    pub destination: PathBuf,
    /// Source size in bytes.
    pub source_size: u64,
    /// Size of the existing destination in bytes.
    pub destination_size: u64,
}

/// How to resolve a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConflictResolution {
    /// Skip this item.
    #[default]
    Skip,
    /// Overwrite the existing file.
    Overwrite,
    /// Skip this and every later conflict in the run.
    SkipAll,
    /// Overwrite this and every later conflict in the run.
    OverwriteAll,
    /// Stop the run.
    CancelAll,
}

impl ConflictResolution {
    /// Check if this resolution applies to every later conflict in the run.
    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::SkipAll | Self::OverwriteAll)
    }
}

impl std::fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "Skip"),
            Self::Overwrite => write!(f, "Overwrite"),
            Self::SkipAll => write!(f, "Skip all"),
            Self::OverwriteAll => write!(f, "Overwrite all"),
            Self::CancelAll => write!(f, "Cancel all"),
        }
    }
}

/// Asks someone what to do about a conflict.
///
/// The engine calls this from its worker and waits for the answer. The
/// resolver decides nothing itself; it surfaces the choice.
pub trait ConflictResolver {
    fn resolve(&mut self, conflict: &Conflict) -> ConflictResolution;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&Conflict) -> ConflictResolution,
{
    fn resolve(&mut self, conflict: &Conflict) -> ConflictResolution {
        self(conflict)
    }
}

/// A conflict handed to the owning context, answered exactly once.
///
/// Dropping the request without answering counts as [`ConflictResolution::Skip`].
#[derive(Debug)]
pub struct ConflictRequest {
    conflict: Conflict,
    reply: oneshot::Sender<ConflictResolution>,
}

impl ConflictRequest {
    pub(crate) fn new(conflict: Conflict) -> (Self, oneshot::Receiver<ConflictResolution>) {
        let (reply, rx) = oneshot::channel();
        (Self { conflict, reply }, rx)
    }

    pub fn conflict(&self) -> &Conflict {
        &self.conflict
    }

    /// Answer the request and wake the worker.
    pub fn respond(self, resolution: ConflictResolution) {
        // The worker only goes away if the runtime is shutting down.
        let _ = self.reply.send(resolution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> Conflict {
        Conflict {
            candidate_name: "x.txt".into(),
            source: PathBuf::from("/in/a.txt"),
            destination: PathBuf::from("/out/x.txt"),
            source_size: 10,
            destination_size: 20,
        }
    }

    #[test]
    fn test_sticky_resolutions() {
        assert!(ConflictResolution::SkipAll.is_sticky());
        assert!(ConflictResolution::OverwriteAll.is_sticky());
        assert!(!ConflictResolution::CancelAll.is_sticky());
        assert!(!ConflictResolution::Skip.is_sticky());
    }

    #[test]
    fn test_default_is_skip() {
        assert_eq!(ConflictResolution::default(), ConflictResolution::Skip);
    }

    #[test]
    fn test_closure_resolver() {
        let mut asked = 0;
        let mut resolver = |_: &Conflict| {
            asked += 1;
            ConflictResolution::Overwrite
        };
        assert_eq!(resolver.resolve(&conflict()), ConflictResolution::Overwrite);
        assert_eq!(asked, 1);
    }

    #[test]
    fn test_request_round_trip() {
        let (request, mut rx) = ConflictRequest::new(conflict());
        assert_eq!(request.conflict().destination_size, 20);
        request.respond(ConflictResolution::CancelAll);
        assert_eq!(rx.try_recv().unwrap(), ConflictResolution::CancelAll);
    }

    #[test]
    fn test_dropped_request_closes_channel() {
        let (request, mut rx) = ConflictRequest::new(conflict());
        drop(request);
        assert!(rx.try_recv().is_err());
    }
}
