//! Expandable-item (playlist/channel) support.
//!
//! A playlist URL expands into an unknown number of units; completion for
//! such an item means "every unit is in the archive", which is a different
//! axis than the per-invocation success reported by the retry loop. This
//! module detects playlist URLs and measures drain state by asking the tool
//! for the flat unit id list and intersecting it with the archive.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;

use crate::archive::Archive;
use crate::config::ToolConfig;
use crate::control::CancelToken;
use crate::paths::RunPaths;

/// Deadline for the flat-playlist listing; it only fetches metadata.
const LIST_TIMEOUT: Duration = Duration::from_secs(120);

fn playlist_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            [?&]list= |
            /playlist\? |
            youtube\.com/c/ |
            youtube\.com/@ |
            youtube\.com/channel/ |
            youtube\.com/user/
            ",
        )
        .expect("valid regex")
    })
}

/// True when the URL names a collection rather than a single unit.
pub fn is_playlist_url(url: &str) -> bool {
    playlist_url_re().is_match(url)
}

/// Drain state of one playlist measured against the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainStatus {
    pub total: usize,
    pub downloaded: usize,
}

impl DrainStatus {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.downloaded)
    }

    /// Fully drained: the listing was non-empty and every unit is archived.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.downloaded >= self.total
    }
}

/// Measure how much of a playlist the archive already covers.
///
/// Returns `Ok(None)` when the listing fails or times out: drain state is
/// then unknown and the caller proceeds as if the playlist were incomplete.
pub async fn drain_status(
    tool: &ToolConfig,
    url: &str,
    paths: &RunPaths,
    cancel: &CancelToken,
) -> Result<Option<DrainStatus>> {
    let ids = match list_unit_ids(tool, url, cancel).await {
        Ok(Some(ids)) => ids,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::warn!(url, error = %e, "playlist listing failed");
            return Ok(None);
        }
    };
    if ids.is_empty() {
        return Ok(None);
    }
    let archive = Archive::load(&paths.archive_file)?;
    let downloaded = archive.downloaded_count(ids.iter().map(String::as_str));
    Ok(Some(DrainStatus {
        total: ids.len(),
        downloaded,
    }))
}

/// Ask the tool for the playlist's flat unit id list.
async fn list_unit_ids(
    tool: &ToolConfig,
    url: &str,
    cancel: &CancelToken,
) -> Result<Option<Vec<String>>> {
    let mut cmd = tokio::process::Command::new(&tool.binary);
    cmd.args(["--flat-playlist", "--print", "id", "--no-warnings", url])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::select! {
        out = tokio::time::timeout(LIST_TIMEOUT, cmd.output()) => match out {
            Ok(res) => res?,
            Err(_) => {
                tracing::warn!(url, "timeout while listing playlist");
                return Ok(None);
            }
        },
        _ = cancel.stopped() => return Err(crate::control::StopRequested.into()),
    };

    if !output.status.success() {
        tracing::warn!(url, code = ?output.status.code(), "could not list playlist units");
        return Ok(None);
    }

    let mut ids: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    ids.sort();
    ids.dedup();
    Ok(Some(ids))
}
