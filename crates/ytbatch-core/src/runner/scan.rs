//! Line-by-line scanning of the tool's merged output.

use std::sync::OnceLock;

use regex::Regex;

use crate::classify::classify;
use crate::events::{EventSink, RunEvent};

use super::{Aggregate, AttemptResult};

fn playlist_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"downloading item (\d+) of (\d+)").expect("valid regex"))
}

fn media_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([a-zA-Z0-9_-]{11})\]").expect("valid regex"))
}

/// Folds the tool's output lines into an [`AttemptResult`]. Each classified
/// line is logged immediately so partial diagnostic history survives a later
/// fatal abort.
pub(super) struct LineScanner {
    already_done: u32,
    newly_completed: u32,
    dns_errors: u32,
    media_ids: Vec<String>,
    fatal_message: Option<&'static str>,
    aggregate: Aggregate,
    events: EventSink,
}

impl LineScanner {
    pub(super) fn new(events: EventSink) -> Self {
        Self {
            already_done: 0,
            newly_completed: 0,
            dns_errors: 0,
            media_ids: Vec::new(),
            fatal_message: None,
            aggregate: Aggregate::default(),
            events,
        }
    }

    pub(super) fn observe(&mut self, line: &str) {
        let lower = line.to_ascii_lowercase();

        if let Some(caps) = playlist_item_re().captures(&lower) {
            let current = caps[1].parse().unwrap_or(0);
            let total = caps[2].parse().unwrap_or(0);
            self.events.emit(RunEvent::PlaylistProgress { current, total });
        }

        // Archive hits are informational, not errors.
        if lower.contains("has already been downloaded")
            || lower.contains("has already been recorded in the archive")
        {
            self.already_done += 1;
            tracing::info!(line, "already downloaded");
            self.events.emit(RunEvent::ToolLine { line: line.to_string() });
            return;
        }

        if line.contains("[download] 100%") {
            self.newly_completed += 1;
        }

        // The media id shows up bracketed in destination paths; captured for
        // sidecar generation after the item completes.
        if line.contains("[download]") && line.contains("Destination") {
            if let Some(caps) = media_id_re().captures(line) {
                let id = caps[1].to_string();
                if !self.media_ids.contains(&id) {
                    self.media_ids.push(id);
                }
            }
        }

        if lower.contains("error") || lower.contains("warning") {
            let verdict = classify(line);
            if verdict.dns_error {
                self.dns_errors += 1;
                tracing::error!(line, dns_fault = self.dns_errors, "DNS error");
            } else {
                tracing::error!(line, "tool error");
            }
            if verdict.is_match() {
                tracing::warn!(verdict.message);
                self.events.emit(RunEvent::LineClassified { message: verdict.message });
            }
            if verdict.fatal && self.fatal_message.is_none() {
                self.fatal_message = Some(verdict.message);
            }
            self.aggregate.fold(&verdict);
        }

        self.events.emit(RunEvent::ToolLine { line: line.to_string() });
    }

    pub(super) fn finish(self, exit_code: Option<i32>, timed_out: bool) -> AttemptResult {
        AttemptResult {
            exit_code,
            timed_out,
            already_done: self.already_done,
            newly_completed: self.newly_completed,
            dns_errors: self.dns_errors,
            media_ids: self.media_ids,
            fatal_message: self.fatal_message,
            aggregate: self.aggregate,
        }
    }
}
