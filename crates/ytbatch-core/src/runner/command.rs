//! External tool command construction.

use std::process::Stdio;

use tokio::process::Command;

use crate::config::ToolConfig;
use crate::links::WorkItem;
use crate::paths::RunPaths;

/// Playlist items get a per-collection subfolder; single items land in the
/// downloads root. The templates are the tool's own substitution syntax.
const PLAYLIST_OUTPUT: &str = "%(playlist_title,uploader,channel).100s/%(title).200s [%(id)s].%(ext)s";
const SINGLE_OUTPUT: &str = "%(title).200s [%(id)s].%(ext)s";

/// Build the full argument vector for one attempt: configured tuning flags
/// first, then the structural flags ytbatch depends on (line-buffered
/// progress, archive, output template, error tolerance), then the URL.
pub(super) fn build_args(tool: &ToolConfig, paths: &RunPaths, item: &WorkItem) -> Vec<String> {
    let template = if item.is_playlist {
        PLAYLIST_OUTPUT
    } else {
        SINGLE_OUTPUT
    };
    let output = paths.downloads_dir.join(template);

    let mut args: Vec<String> = tool.extra_args.clone();
    args.extend(
        [
            "--no-overwrites",
            "--ignore-errors",
            "--no-abort-on-error",
            "--newline",
            "--progress",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    args.push("--download-archive".to_string());
    args.push(paths.archive_file.to_string_lossy().into_owned());
    args.push("--output".to_string());
    args.push(output.to_string_lossy().into_owned());
    args.push(item.url.clone());
    args
}

pub(super) fn build_command(tool: &ToolConfig, paths: &RunPaths, item: &WorkItem) -> Command {
    let mut cmd = Command::new(&tool.binary);
    cmd.args(build_args(tool, paths, item))
        .current_dir(&paths.root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> RunPaths {
        RunPaths::new("/work", None)
    }

    fn item(url: &str, is_playlist: bool) -> WorkItem {
        WorkItem {
            url: url.to_string(),
            is_playlist,
        }
    }

    #[test]
    fn url_is_last_and_archive_is_bound() {
        let tool = ToolConfig::default();
        let args = build_args(&tool, &paths(), &item("https://v.example/watch?v=x", false));
        assert_eq!(args.last().unwrap(), "https://v.example/watch?v=x");
        let idx = args.iter().position(|a| a == "--download-archive").unwrap();
        assert_eq!(args[idx + 1], "/work/download_archive.txt");
        assert!(args.contains(&"--newline".to_string()));
    }

    #[test]
    fn playlist_items_get_collection_subfolder() {
        let tool = ToolConfig::default();
        let single = build_args(&tool, &paths(), &item("https://v.example/a", false));
        let listed = build_args(&tool, &paths(), &item("https://v.example/playlist?list=L", true));
        let out_of = |args: &[String]| {
            let idx = args.iter().position(|a| a == "--output").unwrap();
            args[idx + 1].clone()
        };
        assert!(!out_of(&single).contains("%(playlist_title"));
        assert!(out_of(&listed).contains("%(playlist_title"));
    }

    #[test]
    fn configured_extra_args_come_first() {
        let mut tool = ToolConfig::default();
        tool.extra_args = vec!["--simulate".to_string()];
        let args = build_args(&tool, &paths(), &item("https://v.example/a", false));
        assert_eq!(args[0], "--simulate");
    }
}
