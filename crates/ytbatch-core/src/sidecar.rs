//! Kodi/Plex `.nfo` sidecar generation from the tool's `.info.json`.
//!
//! Best-effort: sidecars are a convenience artifact, so nothing here ever
//! fails an item. Missing or malformed JSON is logged and ignored.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct MediaInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// YYYYMMDD, as the tool writes it.
    #[serde(default)]
    upload_date: Option<String>,
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the `.nfo` next to an `.info.json`; returns the written path.
pub fn nfo_from_info_json(info_json: &Path) -> Result<PathBuf> {
    let data = std::fs::read_to_string(info_json)
        .with_context(|| format!("read {}", info_json.display()))?;
    let info: MediaInfo = serde_json::from_str(&data)
        .with_context(|| format!("parse {}", info_json.display()))?;

    let name = info_json.to_string_lossy();
    let nfo_path = PathBuf::from(
        name.strip_suffix(".info.json")
            .map(|stem| format!("{stem}.nfo"))
            .unwrap_or_else(|| format!("{name}.nfo")),
    );

    let title = info.title.as_deref().unwrap_or("Unknown");
    let uploader = info
        .uploader
        .as_deref()
        .or(info.channel.as_deref())
        .unwrap_or("Unknown");
    let id = info.id.as_deref().unwrap_or("");
    let plot = info.description.as_deref().unwrap_or("");
    let date = info.upload_date.as_deref().unwrap_or("");
    let (premiered, year) = if date.len() == 8 {
        (
            format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..8]),
            date[..4].to_string(),
        )
    } else {
        (String::new(), String::new())
    };

    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <musicvideo>\n\
         \x20 <title>{}</title>\n\
         \x20 <artist>{}</artist>\n\
         \x20 <uniqueid type=\"youtube\" default=\"true\">{}</uniqueid>\n\
         \x20 <plot>{}</plot>\n\
         \x20 <premiered>{}</premiered>\n\
         \x20 <year>{}</year>\n\
         \x20 <studio>YouTube</studio>\n\
         </musicvideo>\n",
        xml_escape(title),
        xml_escape(uploader),
        xml_escape(id),
        xml_escape(plot),
        premiered,
        year,
    );

    std::fs::write(&nfo_path, body).with_context(|| format!("write {}", nfo_path.display()))?;
    Ok(nfo_path)
}

/// Generate sidecars for every media id captured during an item's attempts.
/// Looks for `*[<id>].info.json` under the downloads dir (one level of
/// playlist subfolders included).
pub fn generate_for_ids(downloads_dir: &Path, ids: &[String]) {
    for id in ids {
        let marker = format!("[{id}].info.json");
        match find_by_suffix(downloads_dir, &marker, 2) {
            Some(info_json) => match nfo_from_info_json(&info_json) {
                Ok(path) => tracing::info!(path = %path.display(), "created sidecar"),
                Err(e) => tracing::warn!(id, error = %e, "sidecar generation failed"),
            },
            None => tracing::debug!(id, "no info.json found for sidecar"),
        }
    }
}

fn find_by_suffix(dir: &Path, suffix: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if depth > 0 {
                if let Some(found) = find_by_suffix(&path, suffix, depth - 1) {
                    return Some(found);
                }
            }
        } else if path.file_name()?.to_string_lossy().ends_with(suffix) {
            return Some(path);
        }
    }
    None
}
