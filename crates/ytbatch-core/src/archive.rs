//! Read-only view of the external tool's download archive.
//!
//! The archive is the idempotency ledger: one `<extractor> <id>` line per
//! completed unit, appended by the tool itself (`--download-archive`).
//! ytbatch only reads it, to decide whether a collection is fully drained.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// In-memory snapshot of the archive's unit ids.
#[derive(Debug, Default, Clone)]
pub struct Archive {
    ids: HashSet<String>,
}

impl Archive {
    /// Load the archive; a missing file is an empty archive, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read archive {}", path.display()))?;
        let ids = text
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let _extractor = parts.next()?;
                parts.next().map(str::to_string)
            })
            .collect();
        Ok(Self { ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// How many of the given unit ids are already recorded.
    pub fn downloaded_count<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        ids.into_iter().filter(|id| self.contains(id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_extractor_id_pairs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("download_archive.txt");
        std::fs::write(&path, "youtube abc123\nyoutube def456\n\nmalformed\n").unwrap();
        let archive = Archive::load(&path).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.contains("abc123"));
        assert!(archive.contains("def456"));
        assert!(!archive.contains("malformed"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let archive = Archive::load(&dir.path().join("absent.txt")).unwrap();
        assert!(archive.is_empty());
    }

    #[test]
    fn downloaded_count_intersects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "youtube one\nyoutube two\n").unwrap();
        let archive = Archive::load(&path).unwrap();
        let playlist = ["one", "three"];
        assert_eq!(archive.downloaded_count(playlist.iter().copied()), 1);
    }
}
