//! The bounded retry loop for one work item.

use anyhow::Result;
use std::time::Duration;

use crate::breaker::{BreakerVerdict, DnsBreaker};
use crate::config::Config;
use crate::control::{self, CancelToken};
use crate::events::{EventSink, ItemOutcomeKind, PauseReason, RunEvent};
use crate::links::WorkItem;
use crate::paths::RunPaths;
use crate::runner;

use super::result::ItemResult;
use super::state::{advance, Disposition, Step};

/// Settle pause after the breaker confirms DNS recovery, before re-attempting.
const POST_RECOVERY_PAUSE: Duration = Duration::from_secs(30);

/// A pause demanded by a classified line (rate limit, backoff) is reported
/// as such; the fixed inter-retry delay alone is ordinary pacing.
fn pause_reason(classifier_pause: Duration) -> PauseReason {
    if classifier_pause > Duration::ZERO {
        PauseReason::Classified
    } else {
        PauseReason::BetweenAttempts
    }
}

fn outcome_kind(d: Disposition) -> ItemOutcomeKind {
    match d {
        Disposition::Succeeded => ItemOutcomeKind::Succeeded,
        Disposition::AlreadyDone => ItemOutcomeKind::AlreadyDone,
        Disposition::Skipped => ItemOutcomeKind::Skipped,
        Disposition::Exhausted => ItemOutcomeKind::Exhausted,
        Disposition::BadInvocation => ItemOutcomeKind::BadInvocation,
        Disposition::Fatal => ItemOutcomeKind::Fatal,
    }
}

/// Run the retry loop for one item until a terminal disposition.
///
/// DNS faults observed in any attempt feed the breaker; any successful
/// attempt resets it. A tripped breaker probes before the next attempt and
/// an unrecoverable probe escalates to a run-fatal [`ItemResult`]. The only
/// error this returns is `StopRequested` (wrapped in anyhow) plus genuine
/// I/O failures spawning or reading the tool.
pub async fn process_item(
    item: &WorkItem,
    cfg: &Config,
    paths: &RunPaths,
    breaker: &mut DnsBreaker,
    cancel: &CancelToken,
    events: &EventSink,
) -> Result<ItemResult> {
    let max_attempts = cfg.retry.max_attempts;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        events.emit(RunEvent::AttemptStarted { attempt, max_attempts });
        if attempt > 1 {
            tracing::info!(url = %item.url, attempt, max_attempts, "retry attempt");
        }

        let timeout = cfg.timeouts.for_playlist(item.is_playlist);
        let result = runner::run_attempt(&cfg.tool, item, paths, timeout, cancel, events).await?;

        if result.dns_errors > 0 {
            breaker.record_faults(result.dns_errors);
        }
        if result.is_success() {
            breaker.reset();
        }

        if result.aggregate.saw_dns_error && breaker.tripped() {
            tracing::warn!(faults = breaker.faults(), "consecutive DNS fault threshold reached");
            events.emit(RunEvent::BreakerProbing { faults: breaker.faults() });
            let verdict = breaker.check_and_wait(cancel).await?;
            events.emit(RunEvent::BreakerResolved { recovered: verdict.is_ok() });
            match verdict {
                BreakerVerdict::Unrecoverable => {
                    return Ok(ItemResult::fatal("name resolution did not recover"));
                }
                BreakerVerdict::Recovered => {
                    control::sleep(POST_RECOVERY_PAUSE, cancel).await?;
                }
                BreakerVerdict::FalseAlarm => {}
            }
        }

        match advance(&result, attempt, &cfg.retry, &cfg.tool) {
            Step::Done(Disposition::Fatal) => {
                let reason = result.fatal_message.unwrap_or("fatal error in tool output");
                tracing::error!(url = %item.url, reason, "fatal error, aborting run");
                events.emit(RunEvent::ItemFinished {
                    url: item.url.clone(),
                    outcome: ItemOutcomeKind::Fatal,
                });
                return Ok(ItemResult::fatal(reason));
            }
            Step::Done(disposition) => {
                tracing::info!(url = %item.url, ?disposition, attempt, "item finished");
                events.emit(RunEvent::ItemFinished {
                    url: item.url.clone(),
                    outcome: outcome_kind(disposition),
                });
                return Ok(ItemResult::from_attempt(&item.url, disposition, &result));
            }
            Step::RetryAfter(pause) => {
                tracing::info!(
                    url = %item.url,
                    pause_secs = pause.as_secs(),
                    "pausing before next attempt"
                );
                events.emit(RunEvent::Paused {
                    reason: pause_reason(result.aggregate.pause),
                    duration: pause,
                });
                control::sleep(pause, cancel).await?;
            }
        }
    }
}
