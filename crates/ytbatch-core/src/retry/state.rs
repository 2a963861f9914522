//! Per-item retry state machine: pure transitions, no I/O.

use std::time::Duration;

use crate::config::{RetryConfig, ToolConfig};
use crate::runner::AttemptResult;

/// Terminal disposition of one work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The tool exited cleanly and downloaded something.
    Succeeded,
    /// The tool exited cleanly and everything was already archived.
    AlreadyDone,
    /// Classifier-driven skip or user-cancelled exit code.
    Skipped,
    /// Attempt budget spent without success, skip, or fatal.
    Exhausted,
    /// The tool rejected its invocation; a configuration problem, terminal
    /// for the item but not for the run.
    BadInvocation,
    /// Local-resource fault; aborts the entire run.
    Fatal,
}

impl Disposition {
    pub fn counts_as_failure(self) -> bool {
        matches!(self, Disposition::Exhausted | Disposition::BadInvocation)
    }
}

/// What the controller should do after one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sleep the given duration (classifier pause plus fixed inter-retry
    /// delay), then re-attempt.
    RetryAfter(Duration),
    /// The item reached a terminal state.
    Done(Disposition),
}

/// Decide the next step from an attempt result. `attempt` is 1-based.
///
/// Precedence: fatal classification beats everything (even a clean exit —
/// a disk-full warning on exit 0 must still abort); then the exit-code
/// conventions; then classifier skip; then the attempt budget.
pub fn advance(
    result: &AttemptResult,
    attempt: u32,
    retry: &RetryConfig,
    tool: &ToolConfig,
) -> Step {
    if result.aggregate.fatal {
        return Step::Done(Disposition::Fatal);
    }

    if let Some(code) = result.exit_code {
        if code == 0 {
            return Step::Done(if result.is_noop_success() {
                Disposition::AlreadyDone
            } else {
                Disposition::Succeeded
            });
        }
        if code == tool.bad_invocation_exit {
            return Step::Done(Disposition::BadInvocation);
        }
        if code == tool.cancelled_exit {
            return Step::Done(Disposition::Skipped);
        }
    }

    if result.aggregate.should_skip {
        return Step::Done(Disposition::Skipped);
    }

    if attempt >= retry.max_attempts {
        return Step::Done(Disposition::Exhausted);
    }

    Step::RetryAfter(result.aggregate.pause + retry.retry_delay())
}
