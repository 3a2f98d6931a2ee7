use std::collections::HashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CapsubError, Result};
use crate::subtitle::SubtitleEntry;
use super::model::{DraftContent, DraftSegment, TextContent, TextMaterial, TimeRange, TrackKind};

/// Decode a draft_content.json document into start-ordered subtitles.
///
/// An empty result is valid: the project simply has no captions. Only a
/// document that cannot be decoded at all is an error.
pub fn parse_project(json_content: &str) -> Result<Vec<SubtitleEntry>> {
    let draft: DraftContent = serde_json::from_str(json_content)
        .map_err(|e| CapsubError::MalformedProject(e.to_string()))?;

    Ok(extract_subtitles(&draft))
}

pub fn extract_subtitles(draft: &DraftContent) -> Vec<SubtitleEntry> {
    // Last declared text track wins
    let Some(text_track) = draft.tracks.iter().rev().find(|t| t.kind == TrackKind::Text) else {
        debug!("Project has no text track");
        return Vec::new();
    };

    let segments: Vec<DraftSegment> = decode_records(&text_track.segments, "segment");
    let mut time_map: HashMap<String, TimeRange> = HashMap::new();
    for segment in segments {
        if let (Some(material_id), Some(range)) = (segment.material_id, segment.target_timerange) {
            time_map.insert(material_id, range);
        }
    }

    let materials: Vec<TextMaterial> = decode_records(&draft.materials.texts, "text material");
    let mut subtitles: Vec<SubtitleEntry> = materials
        .iter()
        .filter_map(|material| {
            let range = time_map.get(material.id.as_str())?;
            let text = decode_caption_text(material)?;
            Some(SubtitleEntry::new(
                0,
                micros_to_millis(range.start),
                micros_to_millis(range.start.saturating_add(range.duration)),
                text,
            ))
        })
        .collect();

    // sort_by_key is stable, so ties keep material order
    subtitles.sort_by_key(|s| s.start);
    for (index, subtitle) in subtitles.iter_mut().enumerate() {
        subtitle.id = index + 1;
    }

    debug!("Extracted {} subtitles from text track '{}'", subtitles.len(), text_track.id);
    subtitles
}

/// Decode each raw record on its own, skipping the ones that don't fit `T`
fn decode_records<T: DeserializeOwned>(values: &[Value], kind: &str) -> Vec<T> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {} #{}: {}", kind, index, e);
                None
            }
        })
        .collect()
}

/// Second decode stage: the caption text lives in a JSON string nested in the material
fn decode_caption_text(material: &TextMaterial) -> Option<String> {
    let Some(raw) = material.content.as_deref() else {
        warn!("Text material {} has no content, skipping", material.id);
        return None;
    };

    match serde_json::from_str::<TextContent>(raw) {
        Ok(TextContent { text: Some(text) }) if !text.is_empty() => Some(text),
        Ok(_) => {
            debug!("Text material {} has empty text, skipping", material.id);
            None
        }
        Err(e) => {
            warn!("Could not parse content for material {}: {}", material.id, e);
            None
        }
    }
}

/// Microseconds to milliseconds, rounding half up
fn micros_to_millis(micros: u64) -> u64 {
    micros.saturating_add(500) / 1000
}
