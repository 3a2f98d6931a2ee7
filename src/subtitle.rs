use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;

const SRT_EXTENSION: &str = ".srt";

/// A fragment of caption text; highlighted fragments were rewritten by the censor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub text: String,
    pub is_highlighted: bool,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_highlighted: false }
    }

    pub fn highlighted(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_highlighted: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleEntry {
    /// 1-based position in the start-sorted list
    pub id: usize,
    /// Start offset in milliseconds
    pub start: u64,
    /// End offset in milliseconds
    pub end: u64,
    pub text_parts: Vec<TextSpan>,
}

impl SubtitleEntry {
    pub fn new(id: usize, start: u64, end: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            text_parts: vec![TextSpan::plain(text)],
        }
    }

    /// Display text: every span concatenated in order
    pub fn text(&self) -> String {
        self.text_parts.iter().map(|p| p.text.as_str()).collect()
    }

    /// Same timing, text replaced by a single plain span
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            id: self.id,
            start: self.start,
            end: self.end,
            text_parts: vec![TextSpan::plain(text)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Nothing to export; no file was produced
    Empty,
}

/// Render subtitles in SRT block format, in list order
pub fn render_srt(subtitles: &[SubtitleEntry]) -> String {
    let mut srt_content = String::new();

    for (index, entry) in subtitles.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(entry.start),
            format_srt_time(entry.end),
            entry.text()
        ));
    }

    srt_content
}

/// Append the `.srt` extension unless the name already carries it
pub fn srt_file_name(base_name: &str) -> String {
    if base_name.ends_with(SRT_EXTENSION) {
        base_name.to_string()
    } else {
        format!("{}{}", base_name, SRT_EXTENSION)
    }
}

/// Generate SRT subtitle file in `output_dir`
pub async fn generate_srt<P: AsRef<Path>>(
    subtitles: &[SubtitleEntry],
    base_name: &str,
    output_dir: P,
) -> Result<ExportOutcome> {
    if subtitles.is_empty() {
        warn!("No subtitles to export");
        return Ok(ExportOutcome::Empty);
    }

    let output_path = output_dir.as_ref().join(srt_file_name(base_name));
    info!("Generating SRT file: {}", output_path.display());

    fs::write(&output_path, render_srt(subtitles)).await?;

    info!("SRT file generated successfully ({} entries)", subtitles.len());
    Ok(ExportOutcome::Written(output_path))
}

/// Format a millisecond offset as SRT time (HH:MM:SS,mmm); hours wrap at 24
pub fn format_srt_time(offset_ms: u64) -> String {
    let hours = (offset_ms / 3_600_000) % 24;
    let minutes = (offset_ms % 3_600_000) / 60_000;
    let secs = (offset_ms % 60_000) / 1_000;
    let millis = offset_ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
