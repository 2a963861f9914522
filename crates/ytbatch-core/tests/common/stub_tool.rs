//! Shell-script stand-in for the external downloader binary.
//!
//! Each test composes a small `case`/`if` body over three variables that a
//! shared preamble extracts from the argument list: `$url` (last argument),
//! `$flat` (1 when invoked with `--flat-playlist`), and `$archive` (the value
//! following `--download-archive`, when present).

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use ytbatch_core::config::Config;

const PREAMBLE: &str = r#"#!/bin/sh
url=
flat=0
archive=
prev=
for a in "$@"; do
  [ "$a" = "--flat-playlist" ] && flat=1
  [ "$prev" = "--download-archive" ] && archive="$a"
  prev="$a"
  url="$a"
done
"#;

/// Writes an executable stub script into `dir` and returns its path.
pub fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("stub-tool.sh");
    std::fs::write(&path, format!("{PREAMBLE}\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Config pointing at the stub with every delay zeroed so tests run fast.
pub fn test_config(binary: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.tool.binary = binary.display().to_string();
    cfg.tool.extra_args = Vec::new();
    cfg.retry.retry_delay_secs = 0;
    cfg.pacing.after_success_secs = 0;
    cfg.pacing.after_failure_secs = 0;
    cfg.supervisor.restart_delay_secs = 0;
    cfg.supervisor.cooldown_secs = 0;
    cfg
}
