//! Capsub - CapCut Caption Extraction
//!
//! Reads the caption track out of CapCut project files, censors profanity,
//! translates through a language model and exports SRT subtitles.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod project;
pub mod censor;
pub mod translate;
pub mod subtitle;
pub mod storage;
pub mod error;
