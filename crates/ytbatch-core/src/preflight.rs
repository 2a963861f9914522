//! Preflight checks: external tool presence, ffmpeg, startup DNS probe.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;

use crate::config::ToolConfig;

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("`{0}` not found in PATH; install it first")]
    ToolMissing(String),
    #[error("`{tool}` did not report a version: {reason}")]
    ToolBroken { tool: String, reason: String },
}

/// Versions reported by the toolchain. `ffmpeg` is optional: without it the
/// tool cannot merge formats, which is worth a warning but not a refusal.
#[derive(Debug, Clone)]
pub struct ToolVersions {
    pub tool: String,
    pub ffmpeg: Option<String>,
}

async fn version_of(binary: &str, flag: &str) -> Option<String> {
    let mut cmd = tokio::process::Command::new(binary);
    cmd.arg(flag)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    let output = tokio::time::timeout(VERSION_TIMEOUT, cmd.output())
        .await
        .ok()?
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
}

/// Verify the downloader tool is installed and answers `--version`; probe
/// ffmpeg as well. Call before the first batch run.
pub async fn check_tool(tool: &ToolConfig) -> Result<ToolVersions, PreflightError> {
    if which::which(&tool.binary).is_err() {
        return Err(PreflightError::ToolMissing(tool.binary.clone()));
    }

    let version = version_of(&tool.binary, "--version")
        .await
        .ok_or_else(|| PreflightError::ToolBroken {
            tool: tool.binary.clone(),
            reason: "no output from --version".to_string(),
        })?;
    tracing::info!(tool = %tool.binary, version, "tool found");

    let ffmpeg = match which::which("ffmpeg") {
        Ok(_) => version_of("ffmpeg", "-version").await,
        Err(_) => None,
    };
    if ffmpeg.is_none() {
        tracing::warn!("ffmpeg not found, format merging unavailable");
    }

    Ok(ToolVersions {
        tool: version,
        ffmpeg,
    })
}
