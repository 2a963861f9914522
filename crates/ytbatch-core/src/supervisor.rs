//! Process supervisor: restart the batch until it is fully drained.
//!
//! An incomplete run (typically a playlist with units still missing) is the
//! expected restart path. Consecutive incomplete runs first get a short
//! restart delay, then a long cool-down with a counter reset so a systemic
//! outage is not hot-looped against. Fatal runs consume the same budget but
//! exhaust it into a hard error instead of a cool-down.

use anyhow::{bail, Result};

use crate::batch::{self, RunOutcome};
use crate::config::Config;
use crate::control::{self, CancelToken};
use crate::events::EventSink;
use crate::links;
use crate::paths::RunPaths;

/// Run batches until one completes. The links file is re-read on every pass
/// so operator edits between restarts take effect.
pub async fn run_supervised(
    cfg: &Config,
    paths: &RunPaths,
    cancel: &CancelToken,
    events: &EventSink,
) -> Result<RunOutcome> {
    let mut consecutive_failures = 0u32;
    let mut restart = 0u32;

    loop {
        restart += 1;
        if restart > 1 {
            tracing::info!(restart, "restarting batch to continue incomplete work");
        }

        let items = links::read_links_file(&paths.links_file)?;
        if items.is_empty() {
            tracing::info!("no active links to download");
            return Ok(RunOutcome {
                completed: true,
                fatal_reason: None,
                stats: Default::default(),
                failed_urls: Vec::new(),
            });
        }

        let outcome = batch::run_batch(&items, cfg, paths, cancel, events).await?;
        if outcome.completed {
            tracing::info!("batch fully drained");
            return Ok(outcome);
        }

        consecutive_failures += 1;
        let at_threshold = consecutive_failures >= cfg.supervisor.max_consecutive_failures;

        if let Some(reason) = &outcome.fatal_reason {
            tracing::error!(reason, consecutive_failures, "run aborted fatally");
            if at_threshold {
                bail!("unrecoverable after {consecutive_failures} runs: {reason}");
            }
        }

        if at_threshold {
            tracing::warn!(
                consecutive_failures,
                cooldown_secs = cfg.supervisor.cooldown_secs,
                "too many consecutive incomplete runs, cooling down"
            );
            control::sleep(cfg.supervisor.cooldown(), cancel).await?;
            consecutive_failures = 0;
        } else {
            tracing::info!(
                delay_secs = cfg.supervisor.restart_delay_secs,
                "restarting shortly to continue"
            );
            control::sleep(cfg.supervisor.restart_delay(), cancel).await?;
        }
    }
}
