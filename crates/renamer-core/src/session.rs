//! Plan editing session.
//!
//! A [`Session`] is the owning side of a rename: it holds the selected
//! folders, the plan loaded from the input folder and the edit history.
//! Every change to a target name goes through here so it can be undone.

use std::path::{Path, PathBuf};

use crate::history::{EditAction, EditHistory};
use crate::model::{ItemStatus, ItemUpdate};
use crate::plan::RenamePlan;
use crate::settings::Settings;
use crate::{ConfigurationError, PlanError};

/// Result of the pre-run check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCheck {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Number of items in the plan.
    pub total: usize,
    /// Number of items with a non-blank target name.
    pub named: usize,
}

impl PlanCheck {
    /// Check if some items have no target name and will be skipped.
    pub fn has_unnamed(&self) -> bool {
        self.named < self.total
    }
}

/// Folders, plan and edit history for one loaded input folder.
#[derive(Debug, Default)]
pub struct Session {
    plan: RenamePlan,
    history: EditHistory,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            input_dir: settings.input_dir.clone(),
            output_dir: settings.output_dir.clone(),
            ..Self::default()
        }
    }

    /// The folders to persist.
    pub fn settings(&self) -> Settings {
        Settings {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn plan(&self) -> &RenamePlan {
        &self.plan
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn input_dir(&self) -> Option<&Path> {
        self.input_dir.as_deref()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn set_input_dir(&mut self, dir: impl Into<PathBuf>) {
        self.input_dir = Some(dir.into());
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = Some(dir.into());
    }

    /// Replace the plan with a fresh listing of the input folder.
    ///
    /// Returns the number of files found. The edit history is cleared.
    pub fn load_files(&mut self) -> Result<usize, PlanError> {
        let dir = self
            .input_dir
            .as_deref()
            .ok_or(ConfigurationError::MissingInputDir)?;

        self.plan = RenamePlan::load(dir)?;
        self.history.clear();
        tracing::info!(dir = %dir.display(), files = self.plan.len(), "loaded input folder");

        Ok(self.plan.len())
    }

    /// Set one item's target name.
    ///
    /// If the original file has an extension and `name` has none, the
    /// original extension is appended. A blank name leaves the item
    /// `Pending`; anything else makes it `Ready`.
    pub fn edit_target(&mut self, index: usize, name: &str) -> Result<(), PlanError> {
        let item = self.plan.get(index).ok_or(PlanError::IndexOutOfRange {
            index,
            len: self.plan.len(),
        })?;

        let name = inherit_extension(item.original_name(), name);
        let status = if name.trim().is_empty() {
            ItemStatus::Pending
        } else {
            ItemStatus::Ready
        };

        let old = self.plan.set_target(index, name.clone(), status)?;
        self.history.record_target(index, old, name);
        Ok(())
    }

    /// Assign pasted names, one per non-blank line, starting at `start`.
    ///
    /// Lines are trimmed and blank lines dropped. Lines past the end of the
    /// plan are ignored. The whole paste is one undo step. Returns the number
    /// of names assigned.
    pub fn paste_names(&mut self, start: usize, text: &str) -> Result<usize, PlanError> {
        let names: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if names.is_empty() {
            return Ok(0);
        }
        if start >= self.plan.len() {
            return Err(PlanError::IndexOutOfRange {
                index: start,
                len: self.plan.len(),
            });
        }

        let mut actions = Vec::new();
        for (index, name) in (start..self.plan.len()).zip(names) {
            let old = self
                .plan
                .set_target(index, name.to_string(), ItemStatus::Ready)?;
            actions.push(EditAction::target_name(index, old, name));
        }

        let count = actions.len();
        self.history.record(EditAction::Batch(actions));
        Ok(count)
    }

    /// Blank out the target names of the given items.
    ///
    /// Cleared items go back to `Pending` and will be skipped by a run. The
    /// whole clear is one undo step.
    pub fn clear_targets(&mut self, indices: &[usize]) -> Result<usize, PlanError> {
        let len = self.plan.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(PlanError::IndexOutOfRange { index, len });
        }

        let mut actions = Vec::with_capacity(indices.len());
        for &index in indices {
            let old = self
                .plan
                .set_target(index, String::new(), ItemStatus::Pending)?;
            actions.push(EditAction::target_name(index, old, ""));
        }

        let count = actions.len();
        if count > 0 {
            self.history.record(EditAction::Batch(actions));
        }
        Ok(count)
    }

    /// Revert the most recent edit. Returns false if there was none.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.plan)
    }

    /// Re-apply the most recently undone edit. Returns false if there was none.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.plan)
    }

    /// Apply a status change reported by a run.
    pub fn apply_update(&mut self, update: &ItemUpdate) -> Result<(), PlanError> {
        self.plan.apply_update(update)
    }

    /// Forget everything: plan, history and both folders.
    pub fn clear(&mut self) {
        self.plan.clear();
        self.history.clear();
        self.input_dir = None;
        self.output_dir = None;
    }

    /// Check that a run can start.
    pub fn check_ready(&self) -> Result<PlanCheck, ConfigurationError> {
        let input_dir = self
            .input_dir
            .clone()
            .ok_or(ConfigurationError::MissingInputDir)?;
        let output_dir = self
            .output_dir
            .clone()
            .ok_or(ConfigurationError::MissingOutputDir)?;
        if self.plan.is_empty() {
            return Err(ConfigurationError::EmptyPlan);
        }

        Ok(PlanCheck {
            input_dir,
            output_dir,
            total: self.plan.len(),
            named: self.plan.named_count(),
        })
    }
}

/// Append the original extension when a non-blank new name has none.
fn inherit_extension(original: &str, name: &str) -> String {
    if name.trim().is_empty() || Path::new(name).extension().is_some() {
        return name.to_string();
    }

    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{name}.{ext}"),
        None => name.to_string(),
    }
}
