//! DNS health circuit breaker.
//!
//! Name-resolution failures are systemic: when they streak, every later item
//! fails the same way. The breaker counts consecutive DNS faults fed in by
//! the retry controller; at the threshold it actively probes a well-known
//! host and, if the outage is real, blocks and re-probes until recovery or
//! the wait budget runs out. Exhausting the budget is fatal for the run.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;

use crate::config::BreakerConfig;
use crate::control::CancelToken;

/// Outcome of a tripped breaker's probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerVerdict {
    /// The first probe succeeded: the fault streak was a false alarm.
    FalseAlarm,
    /// Resolution came back within the wait budget.
    Recovered,
    /// The wait budget elapsed without recovery; the run cannot proceed.
    Unrecoverable,
}

impl BreakerVerdict {
    pub fn is_ok(self) -> bool {
        !matches!(self, BreakerVerdict::Unrecoverable)
    }
}

type ProbeFn = Box<dyn FnMut() -> Pin<Box<dyn Future<Output = bool> + Send>> + Send>;

/// Consecutive-fault counter plus probe configuration. The probe is fixed at
/// construction so the whole controller stack above can be driven without
/// touching the network.
pub struct DnsBreaker {
    faults: u32,
    cfg: BreakerConfig,
    probe: ProbeFn,
}

impl DnsBreaker {
    /// Breaker probing the configured well-known host over real DNS.
    pub fn new(cfg: BreakerConfig) -> Self {
        let host = cfg.probe_host.clone();
        let timeout = cfg.probe_timeout();
        Self::with_probe(cfg, move || {
            let host = host.clone();
            async move { probe_dns(&host, timeout).await }
        })
    }

    /// Breaker with a caller-supplied probe.
    pub fn with_probe<F, Fut>(cfg: BreakerConfig, mut probe: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            faults: 0,
            cfg,
            probe: Box::new(move || Box::pin(probe())),
        }
    }

    pub fn record_faults(&mut self, count: u32) {
        self.faults = self.faults.saturating_add(count);
    }

    /// Any successful attempt clears the streak.
    pub fn reset(&mut self) {
        self.faults = 0;
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn tripped(&self) -> bool {
        self.faults >= self.cfg.fault_threshold
    }

    /// Probe cycle: an immediate probe success is a false alarm; otherwise
    /// poll until recovery or the wait budget runs out.
    pub async fn check_and_wait(&mut self, cancel: &CancelToken) -> Result<BreakerVerdict> {
        if (self.probe)().await {
            tracing::info!(faults = self.faults, "DNS probe ok, fault streak was a false alarm");
            self.reset();
            return Ok(BreakerVerdict::FalseAlarm);
        }

        tracing::warn!(
            host = %self.cfg.probe_host,
            max_wait_secs = self.cfg.max_wait_secs,
            "DNS unavailable, waiting for recovery"
        );
        let mut elapsed = Duration::ZERO;
        while elapsed < self.cfg.max_wait() {
            crate::control::sleep(self.cfg.poll_interval(), cancel).await?;
            elapsed += self.cfg.poll_interval();
            if (self.probe)().await {
                tracing::info!(elapsed_secs = elapsed.as_secs(), "DNS recovered");
                self.reset();
                return Ok(BreakerVerdict::Recovered);
            }
            tracing::debug!(elapsed_secs = elapsed.as_secs(), "still waiting for DNS");
        }

        tracing::error!(
            waited_secs = self.cfg.max_wait_secs,
            "DNS did not recover within the wait budget"
        );
        Ok(BreakerVerdict::Unrecoverable)
    }
}

/// One active name-resolution check against `host:443`.
pub async fn probe_dns(host: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, tokio::net::lookup_host((host, 443))).await {
        Ok(Ok(mut addrs)) => addrs.next().is_some(),
        _ => false,
    }
}
