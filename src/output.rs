//! Atomic file output for build artifacts and the project manifest.
//!
//! Every write goes to a temporary file in the destination directory and is
//! renamed over the target only once the full content is on disk. A reader
//! (or a failed build) never observes a half-written file, and a failure
//! before the rename leaves the previous output untouched.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write `contents` to `path`, replacing any existing file atomically.
///
/// Parent directories are created as needed. When the target already exists
/// its permissions are carried over to the replacement.
///
/// # Arguments
///
/// * `path` - The output file path
/// * `contents` - The bytes to write
///
/// # Returns
///
/// * `Ok(())` once the new content is in place
/// * `Err(io::Error)` if any step fails (the old file is left as it was)
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
