//! `ytbatch status` – drain report for the links file.

use anyhow::Result;
use std::path::PathBuf;
use ytbatch_core::archive::Archive;
use ytbatch_core::config::Config;
use ytbatch_core::control::CancelToken;
use ytbatch_core::paths::RunPaths;
use ytbatch_core::{links, playlist};

pub async fn run_status(
    cfg: &Config,
    links_file: Option<PathBuf>,
    dir: Option<PathBuf>,
) -> Result<()> {
    let root = match dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    let paths = RunPaths::new(root, links_file);

    let items = links::read_links_file(&paths.links_file)?;
    if items.is_empty() {
        println!("No active links in {}.", paths.links_file.display());
        return Ok(());
    }

    let archive = Archive::load(&paths.archive_file)?;
    println!("{} entries in the download archive", archive.len());
    println!("{:<10} {}", "DRAINED", "URL");

    let cancel = CancelToken::new();
    for item in &items {
        if !item.is_playlist {
            println!("{:<10} {}", "-", item.url);
            continue;
        }
        let drained = match playlist::drain_status(&cfg.tool, &item.url, &paths, &cancel).await? {
            Some(status) => format!("{}/{}", status.downloaded, status.total),
            None => "?".to_string(),
        };
        println!("{:<10} {}", drained, item.url);
    }

    Ok(())
}
