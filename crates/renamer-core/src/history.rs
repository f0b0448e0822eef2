//! Undo/redo log for edits to planned names.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::ItemStatus;
use crate::plan::RenamePlan;
use crate::PlanError;

/// Default number of undoable edits kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// An edit to the plan that can be undone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditAction {
    /// An item's target name changed.
    TargetName {
        /// Position of the item in the plan.
        index: usize,
        old_value: String,
        new_value: String,
    },
    /// Edits made together, undone and redone as one step.
    Batch(Vec<EditAction>),
}

impl EditAction {
    /// Create a target name edit.
    pub fn target_name(
        index: usize,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self::TargetName {
            index,
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// The action that reverts this one.
    pub fn inverse(&self) -> Self {
        match self {
            Self::TargetName {
                index,
                old_value,
                new_value,
            } => Self::TargetName {
                index: *index,
                old_value: new_value.clone(),
                new_value: old_value.clone(),
            },
            Self::Batch(actions) => Self::Batch(actions.iter().rev().map(Self::inverse).collect()),
        }
    }

    /// Apply this action to the plan, leaving touched items at `status`.
    ///
    /// Every index is checked first; on error the plan is left unchanged.
    pub fn apply(&self, plan: &mut RenamePlan, status: ItemStatus) -> Result<(), PlanError> {
        let len = plan.len();
        if let Some(index) = self.max_index().filter(|&index| index >= len) {
            return Err(PlanError::IndexOutOfRange { index, len });
        }
        self.apply_each(plan, status)
    }

    fn apply_each(&self, plan: &mut RenamePlan, status: ItemStatus) -> Result<(), PlanError> {
        match self {
            Self::TargetName {
                index, new_value, ..
            } => plan.set_target(*index, new_value.clone(), status).map(|_| ()),
            Self::Batch(actions) => actions.iter().try_for_each(|a| a.apply_each(plan, status)),
        }
    }

    fn max_index(&self) -> Option<usize> {
        match self {
            Self::TargetName { index, .. } => Some(*index),
            Self::Batch(actions) => actions.iter().filter_map(Self::max_index).max(),
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            Self::TargetName {
                old_value,
                new_value,
                ..
            } => format!("Renamed '{}' to '{}'", old_value, new_value),
            Self::Batch(actions) => format!("Changed {} names", actions.len()),
        }
    }
}

/// Two-stack undo/redo log.
///
/// Any new edit clears the redo stack. Undo leaves the item `Pending`, redo
/// leaves it `Ready`.
#[derive(Debug)]
pub struct EditHistory {
    undo_stack: VecDeque<EditAction>,
    redo_stack: Vec<EditAction>,
    max_entries: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl EditHistory {
    /// Create a history keeping at most `max_entries` undoable edits.
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_entries.min(1000)),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record an edit that has already been applied to the plan.
    pub fn record(&mut self, action: EditAction) {
        if self.undo_stack.len() >= self.max_entries {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(action);
        self.redo_stack.clear();
    }

    /// Record a target name change.
    pub fn record_target(
        &mut self,
        index: usize,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) {
        self.record(EditAction::target_name(index, old_value, new_value));
    }

    /// Revert the most recent edit.
    ///
    /// Returns false if there is nothing to undo.
    pub fn undo(&mut self, plan: &mut RenamePlan) -> bool {
        let Some(action) = self.undo_stack.pop_back() else {
            return false;
        };

        if let Err(e) = action.inverse().apply(plan, ItemStatus::Pending) {
            tracing::warn!(error = %e, "dropping undo entry that no longer matches the plan");
            return false;
        }

        tracing::debug!(action = %action.description(), "undo");
        self.redo_stack.push(action);
        true
    }

    /// Re-apply the most recently undone edit.
    ///
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self, plan: &mut RenamePlan) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };

        if let Err(e) = action.apply(plan, ItemStatus::Ready) {
            tracing::warn!(error = %e, "dropping redo entry that no longer matches the plan");
            return false;
        }

        tracing::debug!(action = %action.description(), "redo");
        self.undo_stack.push_back(action);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Peek at the edit the next undo would revert.
    pub fn peek_undo(&self) -> Option<&EditAction> {
        self.undo_stack.back()
    }

    /// Number of undoable edits.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileEntry;

    fn plan() -> RenamePlan {
        RenamePlan::from_entries(vec![FileEntry::new("a.txt", 1), FileEntry::new("b.txt", 1)])
    }

    fn edit(plan: &mut RenamePlan, history: &mut EditHistory, index: usize, name: &str) {
        let old = plan
            .set_target(index, name.to_string(), ItemStatus::Ready)
            .unwrap();
        history.record_target(index, old, name);
    }

    #[test]
    fn test_undo_restores_old_value_and_pending() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        edit(&mut plan, &mut history, 0, "x.txt");

        assert!(history.undo(&mut plan));
        let item = plan.get(0).unwrap();
        assert_eq!(item.target_name(), "a.txt");
        assert_eq!(item.status(), ItemStatus::Pending);
    }

    #[test]
    fn test_undo_then_redo_restores_post_edit_value() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        edit(&mut plan, &mut history, 1, "y.txt");

        assert!(history.undo(&mut plan));
        assert!(history.redo(&mut plan));
        let item = plan.get(1).unwrap();
        assert_eq!(item.target_name(), "y.txt");
        assert_eq!(item.status(), ItemStatus::Ready);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut plan = plan();
        let before = plan.clone();
        let mut history = EditHistory::default();

        assert!(!history.undo(&mut plan));
        assert!(!history.redo(&mut plan));
        assert_eq!(plan, before);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        edit(&mut plan, &mut history, 0, "x.txt");
        history.undo(&mut plan);
        assert!(history.can_redo());

        edit(&mut plan, &mut history, 1, "y.txt");
        assert!(!history.can_redo());
        assert!(!history.redo(&mut plan));
    }

    #[test]
    fn test_batch_undoes_in_one_step() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        let old_a = plan.set_target(0, "1.txt".into(), ItemStatus::Ready).unwrap();
        let old_b = plan.set_target(1, "2.txt".into(), ItemStatus::Ready).unwrap();
        history.record(EditAction::Batch(vec![
            EditAction::target_name(0, old_a, "1.txt"),
            EditAction::target_name(1, old_b, "2.txt"),
        ]));

        assert!(history.undo(&mut plan));
        assert_eq!(plan.get(0).unwrap().target_name(), "a.txt");
        assert_eq!(plan.get(1).unwrap().target_name(), "b.txt");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_repeated_edits_on_same_item_unwind_in_order() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        edit(&mut plan, &mut history, 0, "first.txt");
        edit(&mut plan, &mut history, 0, "second.txt");

        history.undo(&mut plan);
        assert_eq!(plan.get(0).unwrap().target_name(), "first.txt");
        history.undo(&mut plan);
        assert_eq!(plan.get(0).unwrap().target_name(), "a.txt");
    }

    #[test]
    fn test_max_entries() {
        let mut plan = plan();
        let mut history = EditHistory::new(2);
        edit(&mut plan, &mut history, 0, "1");
        edit(&mut plan, &mut history, 0, "2");
        edit(&mut plan, &mut history, 0, "3");
        assert_eq!(history.len(), 2);

        assert!(history.undo(&mut plan));
        assert!(history.undo(&mut plan));
        assert!(!history.undo(&mut plan));
        assert_eq!(plan.get(0).unwrap().target_name(), "1");
    }

    #[test]
    fn test_partly_stale_batch_leaves_plan_untouched() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        let old_a = plan.set_target(0, "1.txt".into(), ItemStatus::Ready).unwrap();
        history.record(EditAction::Batch(vec![
            EditAction::target_name(0, old_a, "1.txt"),
            EditAction::target_name(7, "gone.txt", "2.txt"),
        ]));
        let before = plan.clone();

        assert!(!history.undo(&mut plan));
        assert_eq!(plan, before);
        assert_eq!(plan.get(0).unwrap().target_name(), "1.txt");
        assert_eq!(plan.get(0).unwrap().status(), ItemStatus::Ready);
    }

    #[test]
    fn test_stale_entry_is_dropped() {
        let mut plan = plan();
        let mut history = EditHistory::default();
        history.record_target(5, "old", "new");
        assert!(!history.undo(&mut plan));
        assert!(!history.can_redo());
    }
}
