use std::time::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{CapsubError, Result};

/// Prefix for lines the model did not return
pub const FAILED_TRANSLATION_MARKER: &str = "[Translation failed]";

pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("capsub/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(CapsubError::Http)
}

/// Leading "N." / "N)" / "N " echoed back by the model
static NUMBERING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:[.)\s]+(.*))?$").unwrap()
});

/// Build a single numbered prompt covering every line, in order
pub fn build_prompt(lines: &[String], target_language: &str) -> String {
    let language_name = language_code_to_name(target_language);
    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Translate the following numbered list of subtitles into \"{}\".\n\
         Keep the original numbering and order exactly.\n\
         Do not add any explanations or introductions.\n\
         Return only the translated text for each number, one per line.\n\
         \n\
         ---\n\
         {}\n\
         ---",
        language_name, numbered
    )
}

/// Pair response lines back up with the originals.
///
/// Returns exactly `originals.len()` lines: missing tail lines become
/// failure placeholders carrying the original text. A response with more
/// usable lines than requested cannot be aligned and is rejected.
pub fn reconcile_lines(response: &str, originals: &[String]) -> Result<Vec<String>> {
    let usable: Vec<&str> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "---")
        .collect();

    if usable.len() > originals.len() {
        return Err(CapsubError::TranslationMisalignment {
            expected: originals.len(),
            received: usable.len(),
        });
    }

    let mut failed = 0;
    let lines: Vec<String> = originals
        .iter()
        .enumerate()
        .map(|(i, original)| match usable.get(i) {
            Some(line) => strip_numbering(line, i + 1),
            None => {
                failed += 1;
                format!("{} {}", FAILED_TRANSLATION_MARKER, original)
            }
        })
        .collect();

    if failed > 0 {
        warn!("Model returned {} of {} lines; {} marked as failed", usable.len(), originals.len(), failed);
    }
    debug!("Reconciled {} translated lines", lines.len());
    Ok(lines)
}

/// Remove an echoed "N." / "N)" / "N " prefix, but only for the line's own number
fn strip_numbering(line: &str, number: usize) -> String {
    match NUMBERING_REGEX.captures(line) {
        Some(captures) if captures[1].parse::<usize>().ok() == Some(number) => captures
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        _ => line.to_string(),
    }
}

/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" => "English".to_string(),
        "vi" => "Vietnamese".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "th" => "Thai".to_string(),
        "id" => "Indonesian".to_string(),
        "hi" => "Hindi".to_string(),
        "ar" => "Arabic".to_string(),
        _ => code.to_string(),
    }
}
