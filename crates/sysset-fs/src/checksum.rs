//! SHA-256 content digests
//!
//! Digests are lowercase hex with no prefix, which is the representation
//! stored in the lockfile's `content_hash` field.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const READ_BUFFER: usize = 64 * 1024;

/// Compute the SHA-256 digest of in-memory bytes.
pub fn compute_content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of a file, streaming its contents.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_digest(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute a file digest, giving up after `timeout`.
///
/// The read runs on a helper thread so a hung mount or FIFO cannot stall
/// the caller. On timeout the helper is detached and its result dropped;
/// the caller gets an [`io::ErrorKind::TimedOut`] error.
pub fn compute_file_digest_with_timeout(
    path: &Path,
    timeout: Option<Duration>,
) -> io::Result<String> {
    let Some(timeout) = timeout else {
        return compute_file_digest(path);
    };

    let owned: PathBuf = path.to_path_buf();
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("sysset-digest".into())
        .spawn(move || {
            let _ = tx.send(compute_file_digest(&owned));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(path = %path.display(), ?timeout, "digest read timed out");
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("read timed out after {}ms", timeout.as_millis()),
            ))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(io::Error::other(
            "digest worker exited without a result",
        )),
    }
}
