// Profanity censoring for subtitle text
//
// Words are matched whole-word and case-insensitively. Spans are always
// rebuilt from the entry's full text, so callers must keep the uncensored
// list and treat the censored one as a derived view.

pub mod vocabulary;

use std::collections::BTreeMap;
use regex::{Regex, RegexBuilder};
use tracing::debug;

pub use vocabulary::Vocabulary;
use crate::config::CensorConfig;
use crate::error::{CapsubError, Result};
use crate::subtitle::{SubtitleEntry, TextSpan};

/// Lowercased matched word to occurrence count
pub type ReplacedWords = BTreeMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensorResult {
    pub subtitles: Vec<SubtitleEntry>,
    pub replaced_words: ReplacedWords,
}

impl CensorResult {
    /// Pass-through result for when censoring is switched off
    pub fn unfiltered(subtitles: &[SubtitleEntry]) -> Self {
        Self {
            subtitles: subtitles.to_vec(),
            replaced_words: ReplacedWords::new(),
        }
    }

    pub fn total_replacements(&self) -> usize {
        self.replaced_words.values().sum()
    }
}

#[derive(Debug, Clone)]
pub struct ProfanityCensor {
    /// None when the denylist is empty
    pattern: Option<Regex>,
}

impl ProfanityCensor {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|e| CapsubError::Config(format!("Invalid denylist: {}", e)))?;

        debug!("Compiled denylist with {} words", alternatives.len());
        Ok(Self { pattern: Some(pattern) })
    }

    pub fn from_config(config: &CensorConfig, vocabulary: &Vocabulary) -> Result<Self> {
        let mut words = vocabulary.denylist(config.locales.as_slice());
        for extra in &config.extra_words {
            let folded = extra.to_lowercase();
            if !words.iter().any(|w| w.to_lowercase() == folded) {
                words.push(extra.clone());
            }
        }
        Self::new(words.as_slice())
    }

    pub fn filter(&self, subtitles: &[SubtitleEntry]) -> CensorResult {
        let mut replaced_words = ReplacedWords::new();
        let subtitles = subtitles
            .iter()
            .map(|entry| self.filter_entry(entry, &mut replaced_words))
            .collect();

        CensorResult { subtitles, replaced_words }
    }

    fn filter_entry(&self, entry: &SubtitleEntry, replaced_words: &mut ReplacedWords) -> SubtitleEntry {
        let Some(pattern) = &self.pattern else {
            return entry.clone();
        };

        let original_text = entry.text();
        let mut parts = Vec::new();
        let mut last_index = 0;

        for found in pattern.find_iter(&original_text) {
            if found.start() > last_index {
                parts.push(TextSpan::plain(&original_text[last_index..found.start()]));
            }
            parts.push(TextSpan::highlighted(censor_word(found.as_str())));
            *replaced_words.entry(found.as_str().to_lowercase()).or_insert(0) += 1;
            last_index = found.end();
        }

        // No match: keep the entry's existing spans
        if parts.is_empty() {
            return entry.clone();
        }

        if last_index < original_text.len() {
            parts.push(TextSpan::plain(&original_text[last_index..]));
        }

        SubtitleEntry {
            text_parts: parts,
            ..entry.clone()
        }
    }
}

/// Mask a word, keeping its first and last character when longer than two
pub fn censor_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 2 {
        return "*".repeat(chars.len());
    }

    let mut censored = String::with_capacity(word.len());
    censored.push(chars[0]);
    censored.push_str(&"*".repeat(chars.len() - 2));
    censored.push(chars[chars.len() - 1]);
    censored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(texts: &[&str]) -> Vec<SubtitleEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SubtitleEntry::new(i + 1, i as u64 * 1_000, i as u64 * 1_000 + 900, *t))
            .collect()
    }

    #[test]
    fn test_censor_word() {
        assert_eq!(censor_word("evil"), "e**l");
        assert_eq!(censor_word("no"), "**");
        assert_eq!(censor_word("x"), "*");
        assert_eq!(censor_word("tự tử"), "t***ử");
    }

    #[test]
    fn test_whole_word_case_insensitive() {
        let censor = ProfanityCensor::new(&["bad"]).unwrap();
        let result = censor.filter(&entries(&["badge bad BAD."]));

        assert_eq!(
            result.subtitles[0].text_parts,
            vec![
                TextSpan::plain("badge "),
                TextSpan::highlighted("b*d"),
                TextSpan::plain(" "),
                TextSpan::highlighted("B*D"),
                TextSpan::plain("."),
            ]
        );
        assert_eq!(result.replaced_words.get("bad"), Some(&2));
        assert_eq!(result.replaced_words.len(), 1);
    }

    #[test]
    fn test_tally_spans_the_whole_list() {
        let censor = ProfanityCensor::new(&["evil", "no"]).unwrap();
        let result = censor.filter(&entries(&["Evil plan", "no, no evil", "fine"]));

        assert_eq!(result.replaced_words.get("evil"), Some(&2));
        assert_eq!(result.replaced_words.get("no"), Some(&2));
        assert_eq!(result.total_replacements(), 4);
        assert_eq!(result.subtitles[1].text(), "**, ** e**l");
        assert_eq!(result.subtitles[0].id, 1);
        assert_eq!(result.subtitles[1].start, 1_000);
    }

    #[test]
    fn test_empty_denylist_leaves_text_untouched() {
        let censor = ProfanityCensor::new::<&str>(&[]).unwrap();
        let input = entries(&["anything goes", ""]);
        let result = censor.filter(&input);

        assert_eq!(result.subtitles, input);
        assert!(result.subtitles.iter().flat_map(|s| &s.text_parts).all(|p| !p.is_highlighted));
        assert!(result.replaced_words.is_empty());
    }

    #[test]
    fn test_unmatched_entry_keeps_its_spans() {
        let censor = ProfanityCensor::new(&["bad"]).unwrap();
        let entry = SubtitleEntry {
            id: 1,
            start: 0,
            end: 10,
            text_parts: vec![TextSpan::plain("all "), TextSpan::plain("good")],
        };

        let result = censor.filter(std::slice::from_ref(&entry));
        assert_eq!(result.subtitles[0], entry);
    }

    #[test]
    fn test_repeated_filtering_of_original_is_deterministic() {
        let censor = ProfanityCensor::new(&["kill"]).unwrap();
        let original = entries(&["kill the lights", "don't kill it"]);

        let first = censor.filter(&original);
        let second = censor.filter(&original);
        assert_eq!(first, second);
        assert_eq!(original[0].text(), "kill the lights");
    }

    #[test]
    fn test_censored_text_is_not_rematched() {
        let censor = ProfanityCensor::new(&["kill"]).unwrap();
        let once = censor.filter(&entries(&["kill"]));
        let twice = censor.filter(&once.subtitles);

        assert_eq!(twice.subtitles[0].text(), "k**l");
        assert!(twice.replaced_words.is_empty());
    }

    #[test]
    fn test_unicode_word_boundaries() {
        let censor = ProfanityCensor::new(&["chết", "ngu"]).unwrap();
        let result = censor.filter(&entries(&["Chết rồi, đừng ngủ ngu quá"]));

        assert_eq!(result.subtitles[0].text(), "C**t rồi, đừng ngủ n*u quá");
        assert_eq!(result.replaced_words.get("chết"), Some(&1));
        assert_eq!(result.replaced_words.get("ngu"), Some(&1));
    }

    #[test]
    fn test_longer_word_matches_before_prefix() {
        let censor = ProfanityCensor::new(&["fuck", "fucking"]).unwrap();
        let result = censor.filter(&entries(&["fucking hell"]));

        assert_eq!(result.subtitles[0].text(), "f*****g hell");
        assert_eq!(result.replaced_words.get("fucking"), Some(&1));
    }

    #[test]
    fn test_from_config_adds_extra_words() {
        let config = CensorConfig {
            enabled: true,
            locales: vec!["en".to_string()],
            extra_words: vec!["heck".to_string()],
        };
        let censor = ProfanityCensor::from_config(&config, &Vocabulary::builtin()).unwrap();
        let result = censor.filter(&entries(&["heck, a gun"]));

        assert_eq!(result.subtitles[0].text(), "h**k, a g*n");
    }
}
