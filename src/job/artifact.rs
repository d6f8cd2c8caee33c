// src/job/artifact.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;

/// Most recently modified file in `dir` whose extension is `ext`
/// (case-insensitive, without the dot).
///
/// Entries whose mtime cannot be read are skipped. Returns `Ok(None)` when
/// nothing matches.
pub fn latest_artifact(fs: &dyn FileSystem, dir: &Path, ext: &str) -> Result<Option<PathBuf>> {
    let mut best: Option<(std::time::SystemTime, PathBuf)> = None;

    for path in fs.read_dir(dir)? {
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if !matches_ext || !fs.is_file(&path) {
            continue;
        }

        let modified = match fs.modified(&path) {
            Ok(t) => t,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping unreadable artifact");
                continue;
            }
        };

        if best.as_ref().is_none_or(|(t, _)| modified > *t) {
            best = Some((modified, path));
        }
    }

    Ok(best.map(|(_, path)| path))
}
