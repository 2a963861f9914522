//! Per-item outcome folded into run-level totals.

use crate::runner::AttemptResult;

use super::state::Disposition;

/// Outcome of processing one work item through the retry loop.
#[derive(Debug, Clone)]
pub struct ItemResult {
    pub disposition: Disposition,
    pub succeeded: u32,
    pub skipped: u32,
    pub failed: u32,
    /// Set when the item counts as a failure, for the failed-links list.
    pub failed_url: Option<String>,
    /// Media ids seen during the final attempt, for sidecar generation.
    pub media_ids: Vec<String>,
    /// Human-readable reason when `disposition` is `Fatal`.
    pub fatal_reason: Option<String>,
}

impl ItemResult {
    /// Fold the terminal attempt into counters, mirroring how operators
    /// read the numbers: a playlist invocation can succeed and also skip
    /// the units the archive already covered.
    pub fn from_attempt(url: &str, disposition: Disposition, attempt: &AttemptResult) -> Self {
        let (succeeded, skipped, failed) = match disposition {
            Disposition::Succeeded => (attempt.newly_completed.max(1), attempt.already_done, 0),
            Disposition::AlreadyDone => (0, attempt.already_done.max(1), 0),
            Disposition::Skipped => (0, attempt.already_done.max(1), 0),
            Disposition::Exhausted | Disposition::BadInvocation => (0, attempt.already_done, 1),
            Disposition::Fatal => (0, 0, 0),
        };
        Self {
            disposition,
            succeeded,
            skipped,
            failed,
            failed_url: (failed > 0).then(|| url.to_string()),
            media_ids: attempt.media_ids.clone(),
            fatal_reason: None,
        }
    }

    /// Run-fatal result (fatal classification or unrecoverable breaker).
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Fatal,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            failed_url: None,
            media_ids: Vec::new(),
            fatal_reason: Some(reason.into()),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.disposition, Disposition::Fatal)
    }
}
