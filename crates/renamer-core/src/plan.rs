//! The ordered rename plan.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::listing::{list_input_dir, FileEntry};
use crate::model::{ItemStatus, ItemUpdate, WorkItem};
use crate::PlanError;

/// Ordered list of work items, in directory listing order.
///
/// An item's identity is its position. Target names may collide; that is
/// resolved at copy time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    items: Vec<WorkItem>,
}

impl RenamePlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan with one pending item per listed file.
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        Self {
            items: entries
                .into_iter()
                .map(|entry| WorkItem::new(entry.name, entry.size))
                .collect(),
        }
    }

    /// List `dir` and build a plan from its regular files.
    pub fn load(dir: &Path) -> Result<Self, PlanError> {
        list_input_dir(dir).map(Self::from_entries)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WorkItem> {
        self.items.get(index)
    }

    /// Iterate over items in plan order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    /// Number of items with a non-blank target name.
    pub fn named_count(&self) -> usize {
        self.items.iter().filter(|i| !i.has_blank_target()).count()
    }

    /// Count items per status.
    pub fn count_status(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status() == status).count()
    }

    /// Apply a status change reported by the engine.
    pub fn apply_update(&mut self, update: &ItemUpdate) -> Result<(), PlanError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(update.index)
            .ok_or(PlanError::IndexOutOfRange {
                index: update.index,
                len,
            })?;
        item.set_status(update.status, update.detail.clone());
        Ok(())
    }

    /// Replace an item's target name, returning the previous name.
    pub(crate) fn set_target(
        &mut self,
        index: usize,
        name: String,
        status: ItemStatus,
    ) -> Result<String, PlanError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .map(|item| item.replace_target(name, status))
            .ok_or(PlanError::IndexOutOfRange { index, len })
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a RenamePlan {
    type Item = &'a WorkItem;
    type IntoIter = std::slice::Iter<'a, WorkItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> RenamePlan {
        RenamePlan::from_entries(vec![
            FileEntry::new("a.txt", 1),
            FileEntry::new("b.txt", 2),
            FileEntry::new("c.txt", 3),
        ])
    }

    #[test]
    fn test_from_entries_keeps_order() {
        let plan = plan();
        let names: Vec<_> = plan.iter().map(|i| i.original_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(plan.count_status(ItemStatus::Pending), 3);
    }

    #[test]
    fn test_named_count() {
        let mut plan = plan();
        assert_eq!(plan.named_count(), 3);
        plan.set_target(1, " ".into(), ItemStatus::Pending).unwrap();
        assert_eq!(plan.named_count(), 2);
    }

    #[test]
    fn test_apply_update() {
        let mut plan = plan();
        plan.apply_update(&ItemUpdate::error(2, "disk full")).unwrap();
        let item = plan.get(2).unwrap();
        assert_eq!(item.status(), ItemStatus::Error);
        assert_eq!(item.error_detail(), Some("disk full"));

        let err = plan.apply_update(&ItemUpdate::done(3)).unwrap_err();
        assert!(matches!(err, PlanError::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_set_target_out_of_range() {
        let mut plan = plan();
        assert!(plan.set_target(9, "x".into(), ItemStatus::Ready).is_err());
    }
}
