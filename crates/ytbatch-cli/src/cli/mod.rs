//! CLI for the ytbatch download supervisor.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ytbatch_core::config;

use commands::{run_batch_cmd, run_check, run_status};

/// Top-level CLI for the ytbatch download supervisor.
#[derive(Debug, Parser)]
#[command(name = "ytbatch")]
#[command(about = "ytbatch: resilient batch front-end for yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download everything in the links file, restarting until drained.
    Run {
        /// Links file (one URL per line; default <dir>/links.txt).
        #[arg(long, value_name = "FILE")]
        links: Option<PathBuf>,
        /// Run directory for downloads, archive, and failed list (default cwd).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Single pass: no restart loop for incomplete playlists.
        #[arg(long)]
        once: bool,
    },

    /// Verify the downloader tool and network are usable.
    Check,

    /// Report per-playlist drain state against the download archive.
    Status {
        /// Links file (one URL per line; default <dir>/links.txt).
        #[arg(long, value_name = "FILE")]
        links: Option<PathBuf>,
        /// Run directory holding the download archive (default cwd).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { links, dir, once } => run_batch_cmd(&cfg, links, dir, once).await?,
            CliCommand::Check => run_check(&cfg).await?,
            CliCommand::Status { links, dir } => run_status(&cfg, links, dir).await?,
        }

        Ok(())
    }
}
