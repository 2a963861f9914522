//! Per-item retry and backoff.
//!
//! Wraps the attempt runner in a bounded loop driven by the aggregated line
//! classifications. The transition logic is a pure function
//! ([`state::advance`]) so retry decisions are unit-testable without
//! processes or clocks; [`run::process_item`] is the thin async loop
//! around it.

mod result;
mod run;
mod state;

pub use result::ItemResult;
pub use run::process_item;
pub use state::{advance, Disposition, Step};
