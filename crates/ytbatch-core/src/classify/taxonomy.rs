//! The ordered taxonomy table and the classification function.

use std::time::Duration;

use super::verdict::Verdict;

/// One taxonomy entry. A lowercased line matches when it contains every
/// needle in `all` and, if `any` is non-empty, at least one needle in `any`.
struct Rule {
    all: &'static [&'static str],
    any: &'static [&'static str],
    verdict: Verdict,
}

impl Rule {
    fn matches(&self, lower: &str) -> bool {
        self.all.iter().all(|n| lower.contains(n))
            && (self.any.is_empty() || self.any.iter().any(|n| lower.contains(n)))
    }
}

const fn verdict(
    skip: bool,
    retry: bool,
    pause_secs: u64,
    fatal: bool,
    dns_error: bool,
    message: &'static str,
) -> Verdict {
    Verdict {
        skip,
        retry,
        pause: Duration::from_secs(pause_secs),
        fatal,
        dns_error,
        message,
    }
}

/// Priority-ordered taxonomy: first match wins. Severe and systemic
/// categories (rate limiting, bot detection, DNS) come first; then HTTP
/// status variants, content-availability states, transport errors, and
/// finally fatal local-resource errors.
const TAXONOMY: &[Rule] = &[
    // Rate limiting: long mandatory pause, no in-loop retry flag.
    Rule {
        all: &[],
        any: &["rate-limited", "rate limit"],
        verdict: verdict(false, false, 3600, false, false, "rate limited, pausing for 1 hour"),
    },
    // Bot detection asks for a sign-in; a cool-down sometimes clears it.
    Rule {
        all: &["sign in", "bot"],
        any: &[],
        verdict: verdict(false, true, 300, false, false, "bot detection, pausing for 5 minutes"),
    },
    // Name resolution: transient locally, systemic when it streaks.
    Rule {
        all: &[],
        any: &["failed to resolve", "getaddrinfo failed"],
        verdict: verdict(false, true, 30, false, true, "DNS failure, check connectivity"),
    },
    // HTTP status variants.
    Rule {
        all: &["http error 403"],
        any: &[],
        verdict: verdict(false, true, 600, false, false, "HTTP 403: cookie or access issue"),
    },
    Rule {
        all: &["http error 429"],
        any: &[],
        verdict: verdict(false, false, 1800, false, false, "HTTP 429: too many requests"),
    },
    Rule {
        all: &["http error 400"],
        any: &[],
        verdict: verdict(false, true, 0, false, false, "HTTP 400: possibly outdated tool version"),
    },
    Rule {
        all: &[],
        any: &["http error 404", "http error 410"],
        verdict: verdict(true, false, 0, false, false, "content has been deleted"),
    },
    // Content-availability states: permanently unavailable, skip.
    Rule {
        all: &[],
        any: &["private video", "members-only"],
        verdict: verdict(true, false, 0, false, false, "private or members-only content"),
    },
    Rule {
        all: &["video unavailable"],
        any: &[],
        verdict: verdict(true, false, 0, false, false, "content unavailable"),
    },
    Rule {
        all: &[],
        any: &["premieres in", "will begin in"],
        verdict: verdict(true, false, 0, false, false, "scheduled premiere, not yet available"),
    },
    // Age / geo / copyright / payment variants.
    Rule {
        all: &[],
        any: &["age-restricted", "age restricted"],
        verdict: verdict(false, true, 0, false, false, "age-restricted, check cookies"),
    },
    Rule {
        all: &["geo"],
        any: &["blocked", "restricted"],
        verdict: verdict(true, false, 0, false, false, "geo-blocked"),
    },
    Rule {
        all: &[],
        any: &["copyright", "takedown"],
        verdict: verdict(true, false, 0, false, false, "removed for copyright"),
    },
    Rule {
        all: &[],
        any: &["requires payment", "rental"],
        verdict: verdict(true, false, 0, false, false, "payment required"),
    },
    // Transport errors: short pause, retry.
    Rule {
        all: &[],
        any: &["timeout", "timed out"],
        verdict: verdict(false, true, 30, false, false, "connection timeout"),
    },
    Rule {
        all: &["connection", "error"],
        any: &[],
        verdict: verdict(false, true, 60, false, false, "connection error"),
    },
    // Fatal local-resource errors: continuing would only repeat them.
    Rule {
        all: &[],
        any: &["no space left", "disk full"],
        verdict: verdict(false, false, 0, true, false, "disk full"),
    },
    Rule {
        all: &[],
        any: &["permission denied", "access denied"],
        verdict: verdict(false, false, 0, true, false, "no permission for file or directory"),
    },
    Rule {
        all: &["not found"],
        any: &["ffmpeg", "ffprobe"],
        verdict: verdict(false, false, 0, true, false, "ffmpeg not found, cannot merge formats"),
    },
];

/// Classify one diagnostic line against the ordered taxonomy.
///
/// Pure and total: matching is case-insensitive, the first matching rule
/// wins, and a line matching nothing yields [`Verdict::none`].
pub fn classify(line: &str) -> Verdict {
    let lower = line.to_ascii_lowercase();
    for rule in TAXONOMY {
        if rule.matches(&lower) {
            return rule.verdict;
        }
    }
    Verdict::none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_long_pause_no_retry() {
        for line in [
            "ERROR: You are being rate-limited by the service",
            "WARNING: rate limit exceeded",
        ] {
            let v = classify(line);
            assert!(!v.retry, "{line}");
            assert!(!v.fatal, "{line}");
            assert_eq!(v.pause, Duration::from_secs(3600), "{line}");
        }
    }

    #[test]
    fn bot_detection_needs_both_markers() {
        let v = classify("ERROR: Sign in to confirm you're not a bot");
        assert!(v.retry);
        assert_eq!(v.pause, Duration::from_secs(300));

        // "sign in" alone is not bot detection
        assert!(!classify("please sign in to continue").is_match());
    }

    #[test]
    fn dns_failures_flagged_for_breaker() {
        for line in [
            "ERROR: Failed to resolve www.example.com",
            "error: getaddrinfo failed",
        ] {
            let v = classify(line);
            assert!(v.dns_error, "{line}");
            assert!(v.retry, "{line}");
            assert_eq!(v.pause, Duration::from_secs(30), "{line}");
        }
    }

    #[test]
    fn http_variants() {
        assert_eq!(classify("ERROR: HTTP Error 403: Forbidden").pause, Duration::from_secs(600));
        let v429 = classify("ERROR: HTTP Error 429: Too Many Requests");
        assert!(!v429.retry);
        assert_eq!(v429.pause, Duration::from_secs(1800));
        assert!(classify("ERROR: HTTP Error 400: Bad Request").retry);
        assert!(classify("ERROR: HTTP Error 404: Not Found").skip);
        assert!(classify("ERROR: HTTP Error 410: Gone").skip);
    }

    #[test]
    fn permanently_unavailable_content_skips() {
        for line in [
            "ERROR: Private video. Sign in if you've been granted access",
            "ERROR: This video is available to members-only",
            "ERROR: Video unavailable",
            "ERROR: Premieres in 3 hours",
            "ERROR: This live event will begin in 2 hours",
            "ERROR: This video is geo restricted",
            "ERROR: removed due to a copyright claim",
            "ERROR: DMCA takedown notice",
            "ERROR: This video requires payment to watch",
            "ERROR: only available as a rental",
        ] {
            let v = classify(line);
            assert!(v.skip, "{line}");
            assert!(!v.retry, "{line}");
            assert!(!v.fatal, "{line}");
        }
    }

    #[test]
    fn age_restriction_retries_without_skip() {
        let v = classify("ERROR: This video is age-restricted");
        assert!(v.retry);
        assert!(!v.skip);
    }

    #[test]
    fn transport_errors_retry_with_short_pause() {
        let t = classify("ERROR: Connection timed out");
        assert!(t.retry);
        assert_eq!(t.pause, Duration::from_secs(30));

        let c = classify("ERROR: Unable to download: connection reset");
        assert!(c.retry);
        assert_eq!(c.pause, Duration::from_secs(60));
    }

    #[test]
    fn local_resource_errors_are_fatal() {
        for line in [
            "ERROR: No space left on device",
            "error: disk full",
            "ERROR: Permission denied: downloads/video.mp4",
            "error: access denied",
            "ERROR: ffmpeg not found. Please install it",
            "ERROR: ffprobe not found",
        ] {
            let v = classify(line);
            assert!(v.fatal, "{line}");
            assert!(!v.retry, "{line}");
            assert!(!v.skip, "{line}");
        }
    }

    #[test]
    fn priority_order_first_match_wins() {
        // Rate limiting outranks the generic timeout needle on the same line.
        let v = classify("ERROR: rate limit reached, request timed out");
        assert_eq!(v.pause, Duration::from_secs(3600));
        assert!(!v.retry);

        // DNS outranks generic connection errors.
        let v = classify("ERROR: connection error: failed to resolve host");
        assert!(v.dns_error);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(classify("ERROR: VIDEO UNAVAILABLE").skip);
        assert!(classify("error: No Space LEFT on device").fatal);
    }

    #[test]
    fn unmatched_lines_are_noops() {
        for line in [
            "",
            "[download]  42.0% of 100MiB at 2MiB/s",
            "[Merger] Merging formats into video.mp4",
            "some unrelated chatter",
        ] {
            let v = classify(line);
            assert_eq!(v, Verdict::none(), "{line}");
        }
    }

    #[test]
    fn classifier_is_pure() {
        let line = "ERROR: HTTP Error 429: Too Many Requests";
        assert_eq!(classify(line), classify(line));
    }
}
