//! CLI command handlers. Each command is in its own file.

mod check;
mod run;
mod status;

pub use check::run_check;
pub use run::run_batch_cmd;
pub use status::run_status;
