//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write content atomically to a file with locking.
///
/// An exclusive advisory lock is held on a sidecar `.<name>.lock` file for
/// the whole write, so two writers targeting the same path are serialized.
/// Content goes to a temp file in the same directory which is then renamed
/// over the target; readers see either the old or the new file, never a
/// truncated one.
///
/// Returns the number of bytes written.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<usize> {
    let native_path = path.to_native();
    let file_name = native_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock_path = native_path.with_file_name(format!(".{file_name}.lock"));
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;
    lock_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    let temp_path = native_path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = write_then_rename(&temp_path, &native_path, content);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    // Lock released when lock_file is dropped
    result.map(|()| content.len())
}

fn write_then_rename(temp_path: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    drop(temp_file);

    fs::rename(temp_path, target).map_err(|e| Error::io(target, e))
}

/// Read a file while holding a shared lock on its sidecar lock file.
///
/// Pairs with [`write_atomic`]: a reader never observes a half-renamed
/// state from a concurrent writer that uses the same sidecar.
pub fn read_locked(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    let file_name = native_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lock_path = native_path.with_file_name(format!(".{file_name}.lock"));

    // The sidecar may not exist yet (file written by hand); then no writer
    // can be active and the read proceeds unlocked.
    let _guard = match OpenOptions::new().read(true).open(&lock_path) {
        Ok(file) => {
            file.lock_shared().map_err(|_| Error::LockFailed {
                path: native_path.clone(),
            })?;
            Some(file)
        }
        Err(_) => None,
    };

    read_text(path)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<usize> {
    write_atomic(path, content.as_bytes())
}

/// Write `content` to `path` only if nothing exists there yet.
///
/// Returns `true` when the file was created.
pub fn write_once(path: &NormalizedPath, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_atomic(path, content.as_bytes())?;
    Ok(true)
}
