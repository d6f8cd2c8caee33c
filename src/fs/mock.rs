// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    clock: u64,
}

/// In-memory filesystem with a logical clock for modification times.
///
/// Every `add_file` advances the clock by one second, so the most recently
/// added file is also the most recently modified one.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a panicking test; keep going.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a file, stamped with the next tick of the logical clock.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        state.clock += 1;
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(state.clock);
        insert_file(&mut state.entries, path.as_ref(), modified);
    }

    /// Add a file with an explicit modification time.
    pub fn add_file_with_mtime(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut state = self.lock();
        insert_file(&mut state.entries, path.as_ref(), modified);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }
}

fn insert_file(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, modified: SystemTime) {
    entries.insert(path.to_path_buf(), MockEntry::File { modified });
    if let Some(parent) = path.parent() {
        ensure_dir_entry(entries, parent);
        link_child(entries, parent, path);
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        if parent != path && !parent.as_os_str().is_empty() {
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        if let Some(MockEntry::File { .. }) = state.entries.get(path) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        ensure_dir_entry(&mut state.entries, path);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.lock().entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.lock().entries.get(path) {
            Some(MockEntry::File { modified }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_create_their_parent_dirs() {
        let fs = MockFileSystem::new();
        fs.add_file("/work/downloads/a.wav");

        assert_eq!(
            fs.read_dir(Path::new("/work")).unwrap(),
            vec![PathBuf::from("/work/downloads")]
        );
        assert_eq!(
            fs.read_dir(Path::new("/work/downloads")).unwrap(),
            vec![PathBuf::from("/work/downloads/a.wav")]
        );
    }

    #[test]
    fn clock_advances_per_file() {
        let fs = MockFileSystem::new();
        fs.add_file("/d/a.wav");
        fs.add_file("/d/b.wav");

        let a = fs.modified(Path::new("/d/a.wav")).unwrap();
        let b = fs.modified(Path::new("/d/b.wav")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn create_dir_all_is_idempotent_and_rejects_files() {
        let fs = MockFileSystem::new();
        fs.create_dir_all(Path::new("/x/y")).unwrap();
        fs.create_dir_all(Path::new("/x/y")).unwrap();
        assert!(fs.read_dir(Path::new("/x/y")).unwrap().is_empty());

        fs.add_file("/x/file");
        assert!(fs.create_dir_all(Path::new("/x/file")).is_err());
    }
}
