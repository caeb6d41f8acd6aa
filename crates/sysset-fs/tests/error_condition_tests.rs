//! Tests for error handling under adverse filesystem conditions

use std::time::Duration;
use sysset_fs::{NormalizedPath, checksum, io};
use tempfile::tempdir;

#[test]
fn digest_of_directory_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(checksum::compute_file_digest(dir.path()).is_err());
}

#[test]
fn digest_with_timeout_matches_plain_digest() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.conf");
    std::fs::write(&file, "x=1\n").unwrap();

    let bounded =
        checksum::compute_file_digest_with_timeout(&file, Some(Duration::from_secs(5))).unwrap();
    let unbounded = checksum::compute_file_digest_with_timeout(&file, None).unwrap();

    assert_eq!(bounded, unbounded);
    assert_eq!(bounded, checksum::compute_content_digest(b"x=1\n"));
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn digest_permission_denied_is_typed() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("shadow");
        fs::write(&file_path, "secret").unwrap();
        fs::set_permissions(&file_path, Permissions::from_mode(0o000)).unwrap();

        let result = checksum::compute_file_digest(&file_path);

        let _ = fs::set_permissions(&file_path, Permissions::from_mode(0o644));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn failed_write_keeps_previous_content() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let state = dir.path().join(".sysset");
        fs::create_dir(&state).unwrap();
        let file_path = state.join("lock.json");
        fs::write(&file_path, "{\"valid\":true}").unwrap();
        // sidecar must already exist, the directory becomes read-only below
        fs::write(state.join(".lock.json.lock"), "").unwrap();
        fs::set_permissions(&state, Permissions::from_mode(0o555)).unwrap();

        let result = io::write_text(&NormalizedPath::new(&file_path), "garbage");

        let _ = fs::set_permissions(&state, Permissions::from_mode(0o755));
        assert!(result.is_err(), "temp file creation should fail");
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{\"valid\":true}");
    }
}
