//! Per-attempt aggregate of classified line verdicts.

use std::time::Duration;

use crate::classify::Verdict;

/// Folded decision state for one attempt.
///
/// OR for the flags and max for the pause make the fold associative and
/// order-insensitive, so feeding the same lines twice (or in a different
/// order) yields the same aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub should_skip: bool,
    pub should_retry: bool,
    pub pause: Duration,
    pub fatal: bool,
    pub saw_dns_error: bool,
}

impl Aggregate {
    pub fn fold(&mut self, v: &Verdict) {
        self.should_skip |= v.skip;
        self.should_retry |= v.retry;
        self.pause = self.pause.max(v.pause);
        self.fatal |= v.fatal;
        self.saw_dns_error |= v.dns_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn folded(lines: &[&str]) -> Aggregate {
        let mut agg = Aggregate::default();
        for line in lines {
            agg.fold(&classify(line));
        }
        agg
    }

    #[test]
    fn fold_takes_or_of_flags_and_max_pause() {
        let agg = folded(&[
            "ERROR: Connection timed out",            // retry, 30s
            "ERROR: HTTP Error 429: Too Many Requests", // no retry, 1800s
            "ERROR: Video unavailable",               // skip
        ]);
        assert!(agg.should_retry);
        assert!(agg.should_skip);
        assert!(!agg.fatal);
        assert_eq!(agg.pause, Duration::from_secs(1800));
    }

    #[test]
    fn fold_is_order_insensitive() {
        let lines = [
            "ERROR: Failed to resolve host",
            "ERROR: HTTP Error 403: Forbidden",
            "ERROR: No space left on device",
        ];
        let mut reversed = lines;
        reversed.reverse();
        assert_eq!(folded(&lines), folded(&reversed));
    }

    #[test]
    fn fold_is_idempotent_over_duplicates() {
        let once = folded(&["ERROR: Connection timed out", "ERROR: Video unavailable"]);
        let twice = folded(&[
            "ERROR: Connection timed out",
            "ERROR: Video unavailable",
            "ERROR: Connection timed out",
            "ERROR: Video unavailable",
        ]);
        assert_eq!(once, twice);
    }

    #[test]
    fn unmatched_lines_leave_aggregate_untouched() {
        let agg = folded(&["[download]  12.0% of 10MiB", "random chatter"]);
        assert_eq!(agg, Aggregate::default());
    }
}
