//! `ytbatch run` – supervised batch download of the links file.

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use ytbatch_core::batch::{self, RunOutcome};
use ytbatch_core::config::Config;
use ytbatch_core::control::{CancelToken, StopRequested};
use ytbatch_core::events::{EventSink, ItemOutcomeKind, PauseReason, RunEvent};
use ytbatch_core::paths::RunPaths;
use ytbatch_core::{breaker, links, preflight, supervisor};

pub async fn run_batch_cmd(
    cfg: &Config,
    links_file: Option<PathBuf>,
    dir: Option<PathBuf>,
    once: bool,
) -> Result<()> {
    let root = match dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    let paths = RunPaths::new(root, links_file);
    paths.ensure_dirs()?;

    let versions = preflight::check_tool(&cfg.tool).await?;
    println!("using {}", versions.tool);
    if versions.ffmpeg.is_none() {
        println!("note: ffmpeg not found, merged formats may be unavailable");
    }
    if !breaker::probe_dns(&cfg.breaker.probe_host, cfg.breaker.probe_timeout()).await {
        println!(
            "warning: {} is not resolving; starting anyway",
            cfg.breaker.probe_host
        );
    }

    let cancel = CancelToken::new();
    spawn_ctrl_c(Arc::clone(&cancel));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            render_event(&event);
        }
    });

    let events = EventSink::new(tx);
    let result = if once {
        let items = links::read_links_file(&paths.links_file)?;
        batch::run_batch(&items, cfg, &paths, &cancel, &events).await
    } else {
        supervisor::run_supervised(cfg, &paths, &cancel, &events).await
    };

    // Close the channel so the printer drains and exits.
    drop(events);
    let _ = printer.await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) if err.is::<StopRequested>() => {
            println!("interrupted; progress so far is kept in the archive");
            bail!("stopped before the batch completed");
        }
        Err(err) => return Err(err),
    };

    print_summary(&outcome, &paths);
    if !outcome.completed {
        bail!("batch did not fully drain");
    }
    Ok(())
}

fn spawn_ctrl_c(cancel: Arc<CancelToken>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nstop requested, finishing current cleanup...");
            cancel.request_stop();
        }
    });
}

fn print_summary(outcome: &RunOutcome, paths: &RunPaths) {
    let s = &outcome.stats;
    println!(
        "done in {}: {} downloaded, {} skipped, {} failed",
        batch::human_duration(std::time::Duration::from_secs(s.elapsed_secs)),
        s.succeeded,
        s.skipped,
        s.failed,
    );
    if !outcome.failed_urls.is_empty() {
        println!(
            "{} permanently failed URL(s) written to {}",
            outcome.failed_urls.len(),
            paths.failed_file.display()
        );
    }
    if let Some(reason) = &outcome.fatal_reason {
        println!("aborted: {reason}");
    }
}

fn render_event(event: &RunEvent) {
    match event {
        RunEvent::ItemStarted {
            index,
            total,
            url,
            is_playlist,
        } => {
            let kind = if *is_playlist { " (playlist)" } else { "" };
            println!("[{index}/{total}] {url}{kind}");
        }
        RunEvent::AttemptStarted {
            attempt,
            max_attempts,
        } if *attempt > 1 => {
            println!("  attempt {attempt}/{max_attempts}");
        }
        RunEvent::AttemptStarted { .. } => {}
        RunEvent::ToolLine { line } => println!("  {line}"),
        RunEvent::LineClassified { message } => println!("  -> {message}"),
        RunEvent::PlaylistProgress { .. } => {}
        RunEvent::PlaylistDrain {
            total, downloaded, ..
        } => {
            println!("  playlist: {downloaded}/{total} in archive");
        }
        RunEvent::Paused { reason, duration } => {
            let why = match reason {
                PauseReason::Classified => "backoff",
                PauseReason::BetweenAttempts => "retry delay",
                PauseReason::BetweenItems => "pacing",
            };
            println!("  waiting {}s ({why})", duration.as_secs());
        }
        RunEvent::ItemFinished { outcome, .. } => {
            let word = match outcome {
                ItemOutcomeKind::Succeeded => "done",
                ItemOutcomeKind::AlreadyDone => "already in archive",
                ItemOutcomeKind::Skipped => "skipped",
                ItemOutcomeKind::Exhausted => "failed (attempts exhausted)",
                ItemOutcomeKind::BadInvocation => "failed (bad tool invocation)",
                ItemOutcomeKind::Fatal => "aborting",
            };
            println!("  {word}");
        }
        RunEvent::BreakerProbing { faults } => {
            println!("  network check: {faults} resolver fault(s), probing...");
        }
        RunEvent::BreakerResolved { recovered } => {
            if *recovered {
                println!("  network recovered");
            } else {
                println!("  network still unreachable");
            }
        }
    }
}
