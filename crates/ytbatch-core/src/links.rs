//! Input URL list parsing.

use anyhow::{Context, Result};
use std::path::Path;

use crate::playlist;

/// One queued input URL, immutable once read from the links file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    /// True when the URL names a collection (playlist/channel) that expands
    /// into an unknown number of units.
    pub is_playlist: bool,
}

impl WorkItem {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let is_playlist = playlist::is_playlist_url(&url);
        Self { url, is_playlist }
    }
}

/// Parse the links file body: blank lines and `#` comments are ignored, and
/// only lines starting with an `http` scheme are accepted.
pub fn parse_links(text: &str) -> Vec<WorkItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && line.starts_with("http"))
        .map(WorkItem::new)
        .collect()
}

pub fn read_links_file(path: &Path) -> Result<Vec<WorkItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read links file {}", path.display()))?;
    Ok(parse_links(&text))
}
