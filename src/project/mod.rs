// CapCut project handling
//
// - model: serde schema for draft_content.json
// - parser: two-stage decode into ordered subtitles
// - scan: project discovery under a drafts directory

pub mod model;
pub mod parser;
pub mod scan;

pub use parser::parse_project;
pub use scan::{Project, PROJECT_DESCRIPTOR, base_name_for, discover_projects, resolve_descriptor, scan_directory};
