//! Work items and their status.

use serde::{Deserialize, Serialize};

/// Longest error detail kept on a work item, in characters.
pub const ERROR_DETAIL_MAX_CHARS: usize = 64;

/// Processing status of a work item.
///
/// This is plain data; how a status is rendered is up to the presentation
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Listed but not yet given a new name by the user.
    #[default]
    Pending,
    /// A new name was assigned.
    Ready,
    /// Copied to the output folder.
    Done,
    /// Validation or copy failed.
    Error,
    /// Left out of the run (blank name or a skip decision).
    Skipped,
}

impl ItemStatus {
    /// Check if this status was produced by the engine.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Skipped)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Ready => write!(f, "Ready"),
            Self::Done => write!(f, "Done"),
            Self::Error => write!(f, "Error"),
            Self::Skipped => write!(f, "Skipped"),
        }
    }
}

/// One file of the plan: a source file paired with the name it will be
/// copied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    original_name: String,
    target_name: String,
    status: ItemStatus,
    error_detail: Option<String>,
    size: u64,
}

impl WorkItem {
    /// Create a pending item whose target starts out as the original name.
    pub fn new(original_name: impl Into<String>, size: u64) -> Self {
        let original_name = original_name.into();
        Self {
            target_name: original_name.clone(),
            original_name,
            status: ItemStatus::Pending,
            error_detail: None,
            size,
        }
    }

    /// Name of the source file inside the input folder.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Name the file will be copied to.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Reason for the last failure, if the item is in error.
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// Source size in bytes at listing time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Check if no target name is assigned.
    pub fn has_blank_target(&self) -> bool {
        self.target_name.trim().is_empty()
    }

    /// Replace the target name and return the previous one.
    pub(crate) fn replace_target(&mut self, name: String, status: ItemStatus) -> String {
        self.set_status(status, None);
        std::mem::replace(&mut self.target_name, name)
    }

    pub(crate) fn set_status(&mut self, status: ItemStatus, detail: Option<String>) {
        self.status = status;
        self.error_detail = detail;
    }
}

/// A status change for one item, produced by the engine and applied by the
/// owner of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    /// Position of the item in the plan.
    pub index: usize,
    pub status: ItemStatus,
    pub detail: Option<String>,
}

impl ItemUpdate {
    pub fn done(index: usize) -> Self {
        Self {
            index,
            status: ItemStatus::Done,
            detail: None,
        }
    }

    pub fn skipped(index: usize) -> Self {
        Self {
            index,
            status: ItemStatus::Skipped,
            detail: None,
        }
    }

    /// Create an error update; the message is shortened for display.
    pub fn error(index: usize, message: impl AsRef<str>) -> Self {
        Self {
            index,
            status: ItemStatus::Error,
            detail: Some(summarize_detail(message.as_ref())),
        }
    }
}

/// Shorten a message to at most [`ERROR_DETAIL_MAX_CHARS`] characters.
pub fn summarize_detail(message: &str) -> String {
    if message.chars().count() <= ERROR_DETAIL_MAX_CHARS {
        message.to_string()
    } else {
        let kept: String = message.chars().take(ERROR_DETAIL_MAX_CHARS - 1).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_targets_original_name() {
        let item = WorkItem::new("a.txt", 12);
        assert_eq!(item.original_name(), "a.txt");
        assert_eq!(item.target_name(), "a.txt");
        assert_eq!(item.status(), ItemStatus::Pending);
        assert_eq!(item.size(), 12);
        assert!(item.error_detail().is_none());
    }

    #[test]
    fn test_blank_target() {
        let mut item = WorkItem::new("a.txt", 0);
        assert!(!item.has_blank_target());
        item.replace_target("  \t".into(), ItemStatus::Ready);
        assert!(item.has_blank_target());
    }

    #[test]
    fn test_replace_target_clears_error_detail() {
        let mut item = WorkItem::new("a.txt", 0);
        item.set_status(ItemStatus::Error, Some("boom".into()));
        let old = item.replace_target("b.txt".into(), ItemStatus::Ready);
        assert_eq!(old, "a.txt");
        assert_eq!(item.status(), ItemStatus::Ready);
        assert!(item.error_detail().is_none());
    }

    #[test]
    fn test_summarize_detail() {
        assert_eq!(summarize_detail("short"), "short");

        let long = "x".repeat(200);
        let summary = summarize_detail(&long);
        assert_eq!(summary.chars().count(), ERROR_DETAIL_MAX_CHARS);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ItemStatus::Done.is_terminal());
        assert!(ItemStatus::Error.is_terminal());
        assert!(ItemStatus::Skipped.is_terminal());
        assert!(!ItemStatus::Pending.is_terminal());
        assert!(!ItemStatus::Ready.is_terminal());
    }
}
