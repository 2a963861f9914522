use std::time::Duration;

/// Structured verdict for one diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Give up on the item without counting it as a failure.
    pub skip: bool,
    /// The condition is transient; another attempt may succeed.
    pub retry: bool,
    /// Mandatory pause before the next attempt (zero = none).
    pub pause: Duration,
    /// Unrecoverable local fault; abort the whole run.
    pub fatal: bool,
    /// Name-resolution failure; feeds the DNS circuit breaker.
    pub dns_error: bool,
    /// Operator-facing description of the matched category (empty if unmatched).
    pub message: &'static str,
}

impl Verdict {
    /// The no-op verdict returned for lines matching no taxonomy rule.
    pub const fn none() -> Self {
        Self {
            skip: false,
            retry: false,
            pause: Duration::ZERO,
            fatal: false,
            dns_error: false,
            message: "",
        }
    }

    pub fn is_match(&self) -> bool {
        !self.message.is_empty()
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::none()
    }
}
