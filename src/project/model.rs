use serde::{Deserialize, Serialize};
use serde_json::Value;

// Structs for decoding CapCut's draft_content.json. Only the fields the
// caption pipeline reads are modelled; everything else is ignored.
//
// Segments and text materials stay raw here and are decoded one at a time
// by the parser, so a single bad record cannot fail the whole document.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftContent {
    pub tracks: Vec<DraftTrack>,
    pub materials: DraftMaterials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftTrack {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    /// Raw `DraftSegment` records
    #[serde(default)]
    pub segments: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Sticker,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSegment {
    #[serde(default)]
    pub id: String,
    pub material_id: Option<String>,
    pub target_timerange: Option<TimeRange>,
}

/// Placement on the timeline, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: u64,
    pub duration: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftMaterials {
    /// Raw `TextMaterial` records
    #[serde(default)]
    pub texts: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMaterial {
    pub id: String,
    /// A second JSON document, encoded as a string
    pub content: Option<String>,
}

/// The decoded form of `TextMaterial::content`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub text: Option<String>,
}
