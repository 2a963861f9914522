//! Line-level error taxonomy.
//!
//! Maps one line of the tool's diagnostic output to a structured verdict
//! (skip / retry / pause / fatal / dns). The taxonomy is an ordered table of
//! substring rules; the first matching rule wins, so severe systemic
//! categories are listed before generic transport errors. Unmatched lines
//! classify as a no-op: the tool's message text drifts between versions and
//! the classifier must degrade gracefully rather than fail.

mod taxonomy;
mod verdict;

pub use taxonomy::classify;
pub use verdict::Verdict;
