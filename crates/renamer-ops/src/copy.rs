//! Output filesystem access and the staged file copy.

use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::Path;

/// Filesystem operations the engine needs on the output side.
pub trait OutputFs {
    /// Check if something already occupies `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Copy `source` to `dest`, replacing `dest` if present.
    ///
    /// Returns the number of bytes copied. On error nothing may be left at
    /// `dest` that was not there before.
    fn copy(&self, source: &Path, dest: &Path) -> io::Result<u64>;

    /// Size of the file at `path` in bytes.
    fn size(&self, path: &Path) -> io::Result<u64>;
}

/// The local filesystem.
///
/// Copies are staged in a temporary file next to the destination and moved
/// into place only once fully written.
#[derive(Debug, Clone)]
pub struct LocalFs {
    preserve_timestamps: bool,
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LocalFs {
    pub fn new(preserve_timestamps: bool) -> Self {
        Self {
            preserve_timestamps,
        }
    }
}

impl OutputFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        // A dangling symlink still occupies the name
        path.symlink_metadata().is_ok()
    }

    fn copy(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut input = File::open(source)?;
        let metadata = input.metadata()?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "source is not a regular file",
            ));
        }

        let mut staged = tempfile::Builder::new()
            .prefix(".renamer-")
            .suffix(".part")
            .tempfile_in(parent)?;
        let bytes = io::copy(&mut input, staged.as_file_mut())?;

        if self.preserve_timestamps {
            copy_timestamps(&metadata, staged.as_file())?;
        }
        staged.as_file().set_permissions(metadata.permissions())?;

        staged.persist(dest).map_err(|e| e.error)?;
        Ok(bytes)
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        fs::metadata(path).map(|m| m.len())
    }
}

/// Carry modification and access times over to the copy.
fn copy_timestamps(metadata: &Metadata, file: &File) -> io::Result<()> {
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    file.set_times(times)
}
