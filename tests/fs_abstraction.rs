// tests/fs_abstraction.rs

use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

use stemshift::fs::mock::MockFileSystem;
use stemshift::fs::{FileSystem, RealFileSystem};
use stemshift::job::artifact::latest_artifact;
use tempfile::TempDir;

fn touch(path: &Path, age_secs: u64) {
    let file = File::create(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

#[test]
fn real_fs_picks_the_most_recent_wav() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("old.wav"), 300);
    touch(&dir.path().join("new.WAV"), 10);
    touch(&dir.path().join("newest.webm"), 1);
    std::fs::create_dir(dir.path().join("folder.wav")).unwrap();

    let found = latest_artifact(&RealFileSystem, dir.path(), "wav").unwrap();
    assert_eq!(found, Some(dir.path().join("new.WAV")));
}

#[test]
fn real_fs_create_dir_all_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");

    RealFileSystem.create_dir_all(&nested).unwrap();
    RealFileSystem.create_dir_all(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(latest_artifact(&RealFileSystem, &nested, "wav").unwrap(), None);
}

#[test]
fn missing_sink_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(latest_artifact(&RealFileSystem, &dir.path().join("gone"), "wav").is_err());
}

#[test]
fn mock_and_real_agree_on_explicit_mtimes() {
    let fs = MockFileSystem::new();
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    fs.add_file_with_mtime("/d/b.wav", base);
    fs.add_file_with_mtime("/d/a.wav", base + Duration::from_secs(5));

    let found = latest_artifact(&fs, Path::new("/d"), "wav").unwrap();
    assert_eq!(found.as_deref(), Some(Path::new("/d/a.wav")));
}
