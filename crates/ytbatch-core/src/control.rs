//! Run control: cooperative stop token and interruptible sleeps.
//!
//! All sleeps in the batch pipeline go through [`sleep`] so an operator
//! interrupt is observed promptly instead of after an hour-scale rate-limit
//! pause. The runner additionally selects on [`CancelToken::stopped`] while
//! draining child output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Error returned when processing is stopped by the operator.
#[derive(Debug)]
pub struct StopRequested;

impl std::fmt::Display for StopRequested {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stop requested by operator")
    }
}

impl std::error::Error for StopRequested {}

/// Process-wide stop flag. Cloned into the Ctrl-C handler by the CLI; the
/// pipeline observes it during sleeps and subprocess streaming.
#[derive(Default)]
pub struct CancelToken {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once a stop has been requested.
    pub async fn stopped(&self) {
        loop {
            // Register before checking so a concurrent request_stop is not missed.
            let notified = self.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

/// Sleep that returns early with `StopRequested` when a stop is requested.
pub async fn sleep(duration: Duration, cancel: &CancelToken) -> Result<(), StopRequested> {
    if cancel.is_stopped() {
        return Err(StopRequested);
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = cancel.stopped() => Err(StopRequested),
    }
}
