//! Structured run events for display.
//!
//! The retry and batch layers stay free of console concerns: they emit
//! `RunEvent`s over an optional channel and the CLI renders them. The
//! persistent log is written with `tracing` at the emission site, so a run
//! that aborts still leaves its diagnostic history on disk.

use std::time::Duration;

/// Why the pipeline is sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Mandatory pause demanded by a classified error (rate limit, backoff).
    Classified,
    /// Fixed delay between attempts of the same item.
    BetweenAttempts,
    /// Pacing pause between items.
    BetweenItems,
}

/// Terminal outcome kinds, mirrored from the retry state machine for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcomeKind {
    Succeeded,
    AlreadyDone,
    Skipped,
    Exhausted,
    BadInvocation,
    Fatal,
}

/// One display-worthy occurrence during a batch run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    ItemStarted {
        /// 1-based position within the batch.
        index: usize,
        total: usize,
        url: String,
        is_playlist: bool,
    },
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
    },
    /// Raw output line from the tool (progress, merges, archive hits).
    ToolLine {
        line: String,
    },
    /// A diagnostic line matched a taxonomy rule.
    LineClassified {
        message: &'static str,
    },
    /// The tool reported playlist progress ("downloading item N of M").
    PlaylistProgress {
        current: u64,
        total: u64,
    },
    /// Playlist drain state measured against the download archive.
    PlaylistDrain {
        url: String,
        total: usize,
        downloaded: usize,
    },
    Paused {
        reason: PauseReason,
        duration: Duration,
    },
    ItemFinished {
        url: String,
        outcome: ItemOutcomeKind,
    },
    /// The DNS circuit breaker tripped and is probing for recovery.
    BreakerProbing {
        faults: u32,
    },
    BreakerResolved {
        recovered: bool,
    },
}

/// Fire-and-forget event emitter. An absent or closed receiver is fine: the
/// file log carries the same information.
#[derive(Clone, Default)]
pub struct EventSink {
    tx: Option<tokio::sync::mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink that drops every event (library use, tests).
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
