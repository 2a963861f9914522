//! Restart-loop behavior over whole batch runs.

mod common;

use common::stub_tool::{test_config, write_stub};
use tempfile::tempdir;
use ytbatch_core::control::CancelToken;
use ytbatch_core::events::EventSink;
use ytbatch_core::paths::RunPaths;
use ytbatch_core::supervisor;

#[tokio::test]
async fn restarts_until_the_playlist_drains() {
    let dir = tempdir().unwrap();
    // First download pass fails and leaves a marker; the retry pass after the
    // restart records the unit in the archive and succeeds.
    let stub = write_stub(
        dir.path(),
        r#"if [ "$flat" = "1" ]; then
  echo "vid00000001"
  exit 0
fi
if [ ! -f first-pass-done ]; then
  : > first-pass-done
  echo "ERROR: HTTP Error 400: Bad Request" >&2
  exit 1
fi
echo "youtube vid00000001" >> "$archive"
echo "[download] 100% of 1.00MiB in 00:01"
exit 0"#,
    );
    let mut cfg = test_config(&stub);
    cfg.retry.max_attempts = 1;
    let paths = RunPaths::new(dir.path(), None);
    paths.ensure_dirs().unwrap();
    std::fs::write(&paths.links_file, "https://www.youtube.com/playlist?list=PLx\n").unwrap();

    let cancel = CancelToken::new();
    let outcome = supervisor::run_supervised(&cfg, &paths, &cancel, &EventSink::disabled())
        .await
        .unwrap();

    assert!(outcome.completed);
    assert!(dir.path().join("first-pass-done").exists());
    let archive = std::fs::read_to_string(&paths.archive_file).unwrap();
    assert!(archive.contains("vid00000001"));
}

#[tokio::test]
async fn empty_links_file_completes_without_running_the_tool() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), ": > tool-was-invoked\nexit 0");
    let cfg = test_config(&stub);
    let paths = RunPaths::new(dir.path(), None);
    paths.ensure_dirs().unwrap();
    std::fs::write(&paths.links_file, "# nothing active\n\n").unwrap();

    let cancel = CancelToken::new();
    let outcome = supervisor::run_supervised(&cfg, &paths, &cancel, &EventSink::disabled())
        .await
        .unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.stats.succeeded + outcome.stats.failed, 0);
    assert!(!dir.path().join("tool-was-invoked").exists());
}

#[tokio::test]
async fn fatal_runs_exhaust_the_restart_budget() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        r#"echo "ERROR: unable to write: No space left on device" >&2
exit 1"#,
    );
    let mut cfg = test_config(&stub);
    cfg.supervisor.max_consecutive_failures = 2;
    let paths = RunPaths::new(dir.path(), None);
    paths.ensure_dirs().unwrap();
    std::fs::write(&paths.links_file, "https://v.example/doomed\n").unwrap();

    let cancel = CancelToken::new();
    let err = supervisor::run_supervised(&cfg, &paths, &cancel, &EventSink::disabled())
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("unrecoverable after 2 runs"), "got: {msg}");
    assert!(msg.contains("disk full"), "got: {msg}");
}
