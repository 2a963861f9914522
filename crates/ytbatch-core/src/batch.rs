//! Batch orchestrator: the sequential item loop.
//!
//! Items run strictly one at a time — the systemic rate-limit and
//! bot-detection fault modes are global to the target service, so parallel
//! attempts would only trip them faster. Playlist items are checked against
//! the archive before processing (fully drained playlists are skipped
//! outright) and after (a still-incomplete playlist downgrades the whole
//! run to incomplete, which is what drives the supervisor's restart).

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::breaker::DnsBreaker;
use crate::config::Config;
use crate::control::{self, CancelToken};
use crate::events::{EventSink, PauseReason, RunEvent};
use crate::links::WorkItem;
use crate::paths::{self, RunPaths};
use crate::retry::{self, ItemResult};
use crate::{playlist, sidecar};

/// Monotonic counters for one orchestrator execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub succeeded: u32,
    pub skipped: u32,
    pub failed: u32,
    pub elapsed_secs: u64,
}

impl RunStats {
    fn absorb(&mut self, item: &ItemResult) {
        self.succeeded += item.succeeded;
        self.skipped += item.skipped;
        self.failed += item.failed;
    }
}

/// Result of one full pass over the batch.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// True only when no item was fatal and every playlist is fully drained.
    /// A run can have failed items and still be "completed": those failures
    /// are final and re-running would not help.
    pub completed: bool,
    /// Set when the run aborted on a fatal condition.
    pub fatal_reason: Option<String>,
    pub stats: RunStats,
    pub failed_urls: Vec<String>,
}

/// Process every item in input order. Aborts immediately on a fatal item
/// result; everything else is absorbed into the statistics.
pub async fn run_batch(
    items: &[WorkItem],
    cfg: &Config,
    paths: &RunPaths,
    cancel: &CancelToken,
    events: &EventSink,
) -> Result<RunOutcome> {
    let started = Instant::now();
    let mut stats = RunStats::default();
    let mut failed_urls: Vec<String> = Vec::new();
    let mut incomplete_playlists = 0usize;
    let mut breaker = DnsBreaker::new(cfg.breaker.clone());

    paths::reset_failed(&paths.failed_file)?;
    tracing::info!(items = items.len(), "starting batch");

    for (idx, item) in items.iter().enumerate() {
        events.emit(RunEvent::ItemStarted {
            index: idx + 1,
            total: items.len(),
            url: item.url.clone(),
            is_playlist: item.is_playlist,
        });
        tracing::info!(index = idx + 1, total = items.len(), url = %item.url, "processing item");

        // Fully drained playlists are advanced without invoking the tool.
        if item.is_playlist {
            if let Some(status) =
                playlist::drain_status(&cfg.tool, &item.url, paths, cancel).await?
            {
                events.emit(RunEvent::PlaylistDrain {
                    url: item.url.clone(),
                    total: status.total,
                    downloaded: status.downloaded,
                });
                if status.is_complete() {
                    tracing::info!(url = %item.url, total = status.total, "playlist already fully downloaded");
                    stats.skipped += u32::try_from(status.total).unwrap_or(u32::MAX);
                    continue;
                }
                tracing::info!(
                    url = %item.url,
                    total = status.total,
                    remaining = status.remaining(),
                    "playlist has remaining units"
                );
            }
        }

        let result = retry::process_item(item, cfg, paths, &mut breaker, cancel, events).await?;
        stats.absorb(&result);

        if result.is_fatal() {
            let reason = result
                .fatal_reason
                .unwrap_or_else(|| "fatal error".to_string());
            stats.elapsed_secs = started.elapsed().as_secs();
            return Ok(RunOutcome {
                completed: false,
                fatal_reason: Some(reason),
                stats,
                failed_urls,
            });
        }

        if let Some(url) = &result.failed_url {
            paths::append_failed(&paths.failed_file, url)?;
            failed_urls.push(url.clone());
        }

        if result.succeeded > 0 {
            sidecar::generate_for_ids(&paths.downloads_dir, &result.media_ids);
        }

        // Per-invocation success and collection drain are independent axes:
        // the tool can exit cleanly while the playlist still has units left.
        if item.is_playlist {
            if let Some(status) =
                playlist::drain_status(&cfg.tool, &item.url, paths, cancel).await?
            {
                events.emit(RunEvent::PlaylistDrain {
                    url: item.url.clone(),
                    total: status.total,
                    downloaded: status.downloaded,
                });
                if !status.is_complete() {
                    tracing::warn!(
                        url = %item.url,
                        remaining = status.remaining(),
                        "playlist incomplete after processing, run will be retried"
                    );
                    incomplete_playlists += 1;
                }
            }
        }

        if idx + 1 < items.len() {
            let pause = cfg.pacing.pause_after(result.succeeded > 0);
            events.emit(RunEvent::Paused {
                reason: PauseReason::BetweenItems,
                duration: pause,
            });
            control::sleep(pause, cancel).await?;
        }
    }

    stats.elapsed_secs = started.elapsed().as_secs();
    tracing::info!(
        succeeded = stats.succeeded,
        skipped = stats.skipped,
        failed = stats.failed,
        elapsed = %human_duration(Duration::from_secs(stats.elapsed_secs)),
        incomplete_playlists,
        "batch finished"
    );

    Ok(RunOutcome {
        completed: incomplete_playlists == 0,
        fatal_reason: None,
        stats,
        failed_urls,
    })
}

/// Format seconds as "1h 2m 3s" / "2m 3s" / "3s".
pub fn human_duration(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
