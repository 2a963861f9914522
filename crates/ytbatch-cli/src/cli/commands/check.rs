//! `ytbatch check` – preflight: tool presence, versions, name resolution.

use anyhow::Result;
use ytbatch_core::config::{self, Config};
use ytbatch_core::{breaker, preflight};

pub async fn run_check(cfg: &Config) -> Result<()> {
    if let Ok(path) = config::config_path() {
        println!("config:  {}", path.display());
    }

    let versions = preflight::check_tool(&cfg.tool).await?;
    println!("tool:    {} ({})", cfg.tool.binary, versions.tool);
    match &versions.ffmpeg {
        Some(v) => println!("ffmpeg:  {v}"),
        None => println!("ffmpeg:  not found (merged formats may be unavailable)"),
    }

    let reachable = breaker::probe_dns(&cfg.breaker.probe_host, cfg.breaker.probe_timeout()).await;
    if reachable {
        println!("network: {} resolves", cfg.breaker.probe_host);
    } else {
        println!("network: {} does NOT resolve", cfg.breaker.probe_host);
    }

    Ok(())
}
