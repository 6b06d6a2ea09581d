//! Atomic file replacement.

use std::io::Write;
use std::path::Path;

/// Replace a file's contents atomically: tempfile in the same directory,
/// fsync, rename. Either the full write succeeds or the original file is
/// unchanged.
pub fn atomic_replace(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Refresh mtime so editors and watchers pick up the replacement
    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}
