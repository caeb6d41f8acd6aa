use std::fs;
use sysset_fs::{NormalizedPath, io};
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_reports_bytes() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("lock.json"));

    let written = io::write_atomic(&path, b"hello world").unwrap();

    assert_eq!(written, 11);
    assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "hello world");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("lock.json");
    fs::write(&file_path, "original").unwrap();

    io::write_atomic(&NormalizedPath::new(&file_path), b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(".sysset").join("lock.json"));

    io::write_text(&path, "{}").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "{}");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("lock.json"));

    io::write_text(&path, "a").unwrap();
    io::write_text(&path, "b").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[test]
fn test_read_locked_works_with_and_without_sidecar() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("hand-written.json");
    fs::write(&file_path, "{}").unwrap();
    let path = NormalizedPath::new(&file_path);

    // no sidecar yet
    assert_eq!(io::read_locked(&path).unwrap(), "{}");

    io::write_text(&path, "{\"a\":1}").unwrap();
    assert_eq!(io::read_locked(&path).unwrap(), "{\"a\":1}");
}

#[test]
fn test_write_once_does_not_clobber() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(".gitignore"));

    assert!(io::write_once(&path, "*\n").unwrap());
    fs::write(path.to_native(), "custom\n").unwrap();
    assert!(!io::write_once(&path, "*\n").unwrap());

    assert_eq!(io::read_text(&path).unwrap(), "custom\n");
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/file.txt");
    let err = io::read_text(&path).unwrap_err();
    assert_eq!(err.path(), Some(std::path::Path::new("/nonexistent/file.txt")));
}
