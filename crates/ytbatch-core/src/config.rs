use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// External tool parameters (optional `[tool]` section in config.toml).
///
/// The exit codes are conventions of the invoked tool, not of ytbatch, so
/// they are configuration rather than constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Name or path of the downloader binary.
    pub binary: String,
    /// Tuning flags passed on every invocation, before the structural flags
    /// ytbatch itself adds (archive, output template, line buffering).
    pub extra_args: Vec<String>,
    /// Exit code the tool uses for a malformed invocation (fails the item, no retry).
    pub bad_invocation_exit: i32,
    /// Exit code the tool uses for a user-cancelled download (skips the item).
    pub cancelled_exit: i32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            extra_args: default_extra_args(),
            bad_invocation_exit: 2,
            cancelled_exit: 101,
        }
    }
}

fn default_extra_args() -> Vec<String> {
    [
        // Format and conversion
        "-f",
        "bestvideo+bestaudio/best",
        "--merge-output-format",
        "mp4",
        "--remux-video",
        "mp4",
        // The tool's own retry budget, below ytbatch's attempt loop
        "--retries",
        "15",
        "--fragment-retries",
        "15",
        "--extractor-retries",
        "8",
        "--file-access-retries",
        "5",
        // Pacing against the remote service
        "--sleep-requests",
        "5",
        "--sleep-interval",
        "20",
        "--max-sleep-interval",
        "60",
        "--socket-timeout",
        "60",
        "--concurrent-fragments",
        "1",
        "--buffer-size",
        "16K",
        // Metadata and thumbnails
        "--embed-metadata",
        "--embed-thumbnail",
        "--write-thumbnail",
        "--convert-thumbnails",
        "jpg",
        "--write-info-json",
        "--windows-filenames",
        "--no-check-certificate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Per-item retry loop parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per item (including the first).
    pub max_attempts: u32,
    /// Fixed delay between attempts, added on top of any classifier pause.
    pub retry_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_secs: 5,
        }
    }
}

impl RetryConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Wall-clock attempt deadlines. A playlist invocation may legitimately run
/// much longer than a single item, so it gets its own budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub attempt_secs: u64,
    pub playlist_attempt_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            attempt_secs: 3600,
            playlist_attempt_secs: 7200,
        }
    }
}

impl TimeoutConfig {
    pub fn for_playlist(&self, is_playlist: bool) -> Duration {
        if is_playlist {
            Duration::from_secs(self.playlist_attempt_secs)
        } else {
            Duration::from_secs(self.attempt_secs)
        }
    }
}

/// DNS health circuit breaker parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive DNS faults before the breaker trips and probes.
    pub fault_threshold: u32,
    /// Well-known host used for the active name-resolution probe.
    pub probe_host: String,
    /// Timeout for a single probe.
    pub probe_timeout_secs: u64,
    /// Interval between probes while waiting for recovery.
    pub poll_interval_secs: u64,
    /// Total wait budget before declaring the outage unrecoverable.
    pub max_wait_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            fault_threshold: 20,
            probe_host: "www.youtube.com".to_string(),
            probe_timeout_secs: 10,
            poll_interval_secs: 60,
            max_wait_secs: 600,
        }
    }
}

impl BreakerConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

/// Restart loop parameters for the process supervisor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Consecutive incomplete runs before the long cool-down (or, for fatal
    /// runs, before giving up).
    pub max_consecutive_failures: u32,
    /// Delay before an ordinary restart.
    pub restart_delay_secs: u64,
    /// Long cool-down once the failure threshold is crossed.
    pub cooldown_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 3,
            restart_delay_secs: 60,
            cooldown_secs: 300,
        }
    }
}

impl SupervisorConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Pauses between items, so ytbatch does not hammer the tool's own rate
/// limiting. Longer after a success (the service just did real work).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacingConfig {
    pub after_success_secs: u64,
    pub after_failure_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            after_success_secs: 10,
            after_failure_secs: 5,
        }
    }
}

impl PacingConfig {
    pub fn pause_after(&self, succeeded: bool) -> Duration {
        if succeeded {
            Duration::from_secs(self.after_success_secs)
        } else {
            Duration::from_secs(self.after_failure_secs)
        }
    }
}

/// Global configuration loaded from `~/.config/ytbatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ytbatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = Config::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: Config = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.retry_delay_secs, 5);
        assert_eq!(cfg.breaker.fault_threshold, 20);
        assert_eq!(cfg.breaker.max_wait_secs, 600);
        assert_eq!(cfg.supervisor.max_consecutive_failures, 3);
        assert_eq!(cfg.tool.bad_invocation_exit, 2);
        assert_eq!(cfg.tool.cancelled_exit, 101);
        assert_eq!(cfg.timeouts.attempt_secs, 3600);
        assert_eq!(cfg.timeouts.playlist_attempt_secs, 7200);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = Config::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.retry.max_attempts, cfg.retry.max_attempts);
        assert_eq!(parsed.breaker.probe_host, cfg.breaker.probe_host);
        assert_eq!(parsed.tool.binary, cfg.tool.binary);
        assert_eq!(parsed.pacing.after_success_secs, cfg.pacing.after_success_secs);
    }

    #[test]
    fn config_toml_partial_sections_use_defaults() {
        let toml = r#"
            [retry]
            max_attempts = 5
            retry_delay_secs = 1

            [tool]
            binary = "yt-dlp-nightly"
            extra_args = []
            bad_invocation_exit = 2
            cancelled_exit = 101
        "#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.tool.binary, "yt-dlp-nightly");
        // untouched sections fall back to defaults
        assert_eq!(cfg.breaker.fault_threshold, 20);
        assert_eq!(cfg.supervisor.restart_delay_secs, 60);
    }

    #[test]
    fn timeout_selection_by_item_kind() {
        let t = TimeoutConfig::default();
        assert_eq!(t.for_playlist(false), Duration::from_secs(3600));
        assert_eq!(t.for_playlist(true), Duration::from_secs(7200));
    }
}
