//! Filesystem layout for a batch run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths the orchestrator works with, all rooted in one run directory.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// Working directory the tool is invoked in.
    pub root: PathBuf,
    /// Where the tool writes media and sidecar artifacts.
    pub downloads_dir: PathBuf,
    /// Newline-delimited URL list.
    pub links_file: PathBuf,
    /// The tool's download archive (the idempotency ledger; tool-owned).
    pub archive_file: PathBuf,
    /// Permanently-failed URLs, for operator re-submission.
    pub failed_file: PathBuf,
}

impl RunPaths {
    /// Standard layout under `root`; `links_file` may be overridden.
    pub fn new(root: impl Into<PathBuf>, links_file: Option<PathBuf>) -> Self {
        let root = root.into();
        Self {
            downloads_dir: root.join("downloads"),
            links_file: links_file.unwrap_or_else(|| root.join("links.txt")),
            archive_file: root.join("download_archive.txt"),
            failed_file: root.join("failed_links.txt"),
            root,
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.downloads_dir).with_context(|| {
            format!("create downloads dir {}", self.downloads_dir.display())
        })?;
        Ok(())
    }
}

/// Append one failed URL to the failed-links file. Written incrementally so
/// an aborted run still leaves the list behind.
pub fn append_failed(path: &Path, url: &str) -> Result<()> {
    use std::io::Write;
    let mut f = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open failed-links file {}", path.display()))?;
    writeln!(f, "{url}")?;
    Ok(())
}

/// Truncate the failed-links file at the start of a run.
pub fn reset_failed(path: &Path) -> Result<()> {
    if path.exists() {
        fs::write(path, "").with_context(|| format!("truncate {}", path.display()))?;
    }
    Ok(())
}
