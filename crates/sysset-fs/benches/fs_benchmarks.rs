use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use sysset_fs::{NormalizedPath, checksum, io};
use tempfile::tempdir;

fn write_atomic_benchmark(c: &mut Criterion) {
    c.bench_function("io::write_atomic", |b| {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("lock.json"));
        let content = br#"{"/etc/hosts":{"mtime":1.0,"content_hash":"","corresponding_git_hash":""}}"#;

        b.iter(|| {
            io::write_atomic(black_box(&path), black_box(content)).unwrap();
        })
    });
}

fn digest_benchmark(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let small = dir.path().join("small.conf");
    let large = dir.path().join("large.bin");
    fs::write(&small, "x=1\n").unwrap();
    fs::write(&large, vec![0xA5u8; 4 * 1024 * 1024]).unwrap();

    c.bench_function("checksum::compute_file_digest (4 B)", |b| {
        b.iter(|| checksum::compute_file_digest(black_box(&small)).unwrap())
    });
    c.bench_function("checksum::compute_file_digest (4 MiB)", |b| {
        b.iter(|| checksum::compute_file_digest(black_box(&large)).unwrap())
    });
    c.bench_function("checksum::compute_file_digest_with_timeout (4 B)", |b| {
        let timeout = Some(std::time::Duration::from_secs(5));
        b.iter(|| checksum::compute_file_digest_with_timeout(black_box(&small), timeout).unwrap())
    });
}

criterion_group!(benches, write_atomic_benchmark, digest_benchmark);
criterion_main!(benches);
