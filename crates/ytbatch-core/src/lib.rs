pub mod config;
pub mod logging;

pub mod archive;
pub mod batch;
pub mod breaker;
pub mod classify;
pub mod control;
pub mod events;
pub mod links;
pub mod paths;
pub mod playlist;
pub mod preflight;
pub mod retry;
pub mod runner;
pub mod sidecar;
pub mod supervisor;
