//! Attempt runner: one tool invocation for one work item.
//!
//! Spawns the external tool, drains stdout and stderr line-by-line under a
//! shared wall-clock deadline, feeds diagnostic lines through the
//! classifier, and returns the folded [`AttemptResult`]. A child that
//! overruns its deadline is killed, not waited on.

mod aggregate;
mod command;
mod scan;

pub use aggregate::Aggregate;

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::ToolConfig;
use crate::control::{CancelToken, StopRequested};
use crate::events::EventSink;
use crate::links::WorkItem;
use crate::paths::RunPaths;

use scan::LineScanner;

/// Result of one tool invocation for one work item.
#[derive(Debug, Clone, Default)]
pub struct AttemptResult {
    /// Child exit code; `None` when killed by the deadline (or by a signal).
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Units the archive already covered ("has already been downloaded").
    pub already_done: u32,
    /// Units that finished downloading during this attempt.
    pub newly_completed: u32,
    /// DNS faults observed in this attempt's output.
    pub dns_errors: u32,
    /// Media ids seen on destination lines, for sidecar generation.
    pub media_ids: Vec<String>,
    /// Message of the first fatal-classified line, for abort reporting.
    pub fatal_message: Option<&'static str>,
    pub aggregate: Aggregate,
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit 0 with nothing newly downloaded and only archive hits: all the
    /// work was done on a previous run.
    pub fn is_noop_success(&self) -> bool {
        self.is_success() && self.newly_completed == 0 && self.already_done > 0
    }
}

/// Run one attempt for `item`, enforcing `timeout` as a hard deadline.
///
/// Returns `StopRequested` (as the error) when the operator interrupts; the
/// child is killed before returning in both the timeout and interrupt paths.
pub async fn run_attempt(
    tool: &ToolConfig,
    item: &WorkItem,
    paths: &RunPaths,
    timeout: Duration,
    cancel: &CancelToken,
    events: &EventSink,
) -> Result<AttemptResult> {
    let mut child = command::build_command(tool, paths, item)
        .spawn()
        .with_context(|| format!("spawn {}", tool.binary))?;

    let stdout = child.stdout.take().context("child stdout not piped")?;
    let stderr = child.stderr.take().context("child stderr not piped")?;
    let mut out_lines = BufReader::new(stdout).lines();
    let mut err_lines = BufReader::new(stderr).lines();

    let deadline = tokio::time::Instant::now() + timeout;
    let mut scanner = LineScanner::new(events.clone());
    let mut out_open = true;
    let mut err_open = true;
    let mut timed_out = false;

    while out_open || err_open {
        tokio::select! {
            line = out_lines.next_line(), if out_open => {
                match line.context("read tool stdout")? {
                    Some(l) => scanner.observe(&l),
                    None => out_open = false,
                }
            }
            line = err_lines.next_line(), if err_open => {
                match line.context("read tool stderr")? {
                    Some(l) => scanner.observe(&l),
                    None => err_open = false,
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                tracing::warn!(
                    url = %item.url,
                    timeout_secs = timeout.as_secs(),
                    "attempt deadline exceeded, killing tool process"
                );
                child.kill().await.context("kill timed-out tool process")?;
                timed_out = true;
                break;
            }
            _ = cancel.stopped() => {
                child.kill().await.context("kill tool process on stop")?;
                return Err(StopRequested.into());
            }
        }
    }

    // Both pipes at EOF is not child exit: the deadline and stop token must
    // keep covering the wait, or a child that closes its streams and lingers
    // would hold the attempt open indefinitely.
    let exit_code = if timed_out {
        None
    } else {
        tokio::select! {
            status = child.wait() => status.context("wait for tool process")?.code(),
            _ = tokio::time::sleep_until(deadline) => {
                tracing::warn!(
                    url = %item.url,
                    timeout_secs = timeout.as_secs(),
                    "attempt deadline exceeded after output closed, killing tool process"
                );
                child.kill().await.context("kill timed-out tool process")?;
                timed_out = true;
                None
            }
            _ = cancel.stopped() => {
                child.kill().await.context("kill tool process on stop")?;
                return Err(StopRequested.into());
            }
        }
    };

    Ok(scanner.finish(exit_code, timed_out))
}
