//! Core types for renamer.
//!
//! This crate holds everything the rename engine consumes and everything the
//! interactive front-end edits: the rename plan and its work items, the name
//! validator, the undo/redo history over planned names, and the two persisted
//! folder settings.

mod error;
mod history;
mod listing;
mod model;
mod plan;
mod session;
mod settings;
mod validate;

pub use error::{ConfigurationError, PlanError};
pub use history::{EditAction, EditHistory, DEFAULT_HISTORY_DEPTH};
pub use listing::{list_input_dir, FileEntry};
pub use model::{summarize_detail, ItemStatus, ItemUpdate, WorkItem, ERROR_DETAIL_MAX_CHARS};
pub use plan::RenamePlan;
pub use session::{PlanCheck, Session};
pub use settings::{Settings, SettingsError, SETTINGS_FILE};
pub use validate::{validate, InvalidName, INVALID_CHARS, MAX_NAME_LEN, RESERVED_NAMES};
