//! Probed video metadata and output file naming

use crate::error::DownloadError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, rename = "_type")]
    pub kind: Option<String>,
}

impl VideoMetadata {
    /// Parse the JSON printed by `yt-dlp -J`
    pub fn from_json(json: &str) -> Result<Self, DownloadError> {
        serde_json::from_str(json).map_err(|e| DownloadError::MetadataParse(e.to_string()))
    }

    pub fn is_playlist(&self) -> bool {
        matches!(self.kind.as_deref(), Some("playlist" | "multi_video"))
    }

    /// Display title, "untitled" when yt-dlp reports none
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("untitled")
    }

    /// File name without extension for the converted audio
    pub fn file_stem(&self) -> String {
        let stem = sanitize_filename(self.title());
        if !stem.is_empty() {
            return stem;
        }
        let id = sanitize_filename(&self.id);
        if id.is_empty() {
            "untitled".to_string()
        } else {
            id
        }
    }
}

/// Sanitize filename for filesystem
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .trim_end_matches('.')
        .to_string()
}
