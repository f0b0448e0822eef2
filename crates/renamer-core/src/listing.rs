//! Input folder listing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PlanError;

/// A regular file found directly inside the input folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// List the regular files directly inside `dir`, sorted by name.
///
/// Subdirectories are not descended into. Entries whose metadata cannot be
/// read are listed with a size of 0; names that are not valid UTF-8 are left
/// out.
pub fn list_input_dir(dir: &Path) -> Result<Vec<FileEntry>, PlanError> {
    if !dir.is_dir() {
        return Err(if dir.exists() {
            PlanError::NotADirectory {
                path: dir.to_path_buf(),
            }
        } else {
            PlanError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "folder not found"),
            )
        });
    }

    let entries = fs::read_dir(dir).map_err(|e| PlanError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PlanError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };

        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        files.push(FileEntry::new(name, size));
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(dir = %dir.display(), count = files.len(), "listed input folder");

    Ok(files)
}
