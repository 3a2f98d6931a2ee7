// Subtitle translation through a remote language model
//
// The engines only turn a prompt into text. Batching, numbering and the
// alignment checks live here so they hold for every engine:
// - gemini: Google Gemini generateContent API
// - ollama: local Ollama server

pub mod common;
pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use tracing::{info, warn};

pub use common::*;
use crate::config::{TranslateConfig, TranslationEngine};
use crate::error::{CapsubError, Result};
use crate::subtitle::SubtitleEntry;

/// A text generation service used for translation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> String;

    /// Send a prompt and return the raw response text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Lightweight round trip proving the credential and endpoint work
    async fn check_credential(&self) -> Result<()>;
}

/// Factory for creating language model clients
pub struct LanguageModelFactory;

impl LanguageModelFactory {
    pub fn create(config: &TranslateConfig, api_key: Option<String>) -> Result<Box<dyn LanguageModel>> {
        match config.engine {
            TranslationEngine::Gemini => {
                let api_key = api_key.ok_or(CapsubError::CredentialMissing)?;
                Ok(Box::new(gemini::GeminiModel::new(config.clone(), api_key)?))
            }
            TranslationEngine::Ollama => Ok(Box::new(ollama::OllamaModel::new(config.clone())?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationStatus {
    /// Every line came back
    Complete,
    /// The response was short; this many tail lines carry the failure marker
    Padded { failed: usize },
    /// The response could not be aligned; the subtitles are the untouched input
    Misaligned { expected: usize, received: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub subtitles: Vec<SubtitleEntry>,
    pub status: TranslationStatus,
}

impl TranslationOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self.status, TranslationStatus::Misaligned { .. })
    }
}

/// Translate every subtitle in one request, preserving order and timing.
///
/// Engine errors propagate; a misaligned response is reported through the
/// outcome with the input returned unchanged.
pub async fn translate_subtitles(
    model: &dyn LanguageModel,
    subtitles: &[SubtitleEntry],
    target_language: &str,
) -> Result<TranslationOutcome> {
    if subtitles.is_empty() {
        return Ok(TranslationOutcome {
            subtitles: Vec::new(),
            status: TranslationStatus::Complete,
        });
    }

    info!("Translating {} subtitles to {} using {}", subtitles.len(), target_language, model.name());

    let originals: Vec<String> = subtitles.iter().map(SubtitleEntry::text).collect();
    let prompt = build_prompt(&originals, target_language);
    let response = model.generate(&prompt).await?;

    let lines = match reconcile_lines(&response, &originals) {
        Ok(lines) => lines,
        Err(CapsubError::TranslationMisalignment { expected, received }) => {
            warn!("Translation misaligned ({} lines for {}), keeping original subtitles", received, expected);
            return Ok(TranslationOutcome {
                subtitles: subtitles.to_vec(),
                status: TranslationStatus::Misaligned { expected, received },
            });
        }
        Err(e) => return Err(e),
    };

    let failed = lines.iter().filter(|l| l.starts_with(FAILED_TRANSLATION_MARKER)).count();
    let translated = subtitles
        .iter()
        .zip(lines)
        .map(|(entry, line)| entry.with_text(line))
        .collect();

    let status = if failed > 0 {
        TranslationStatus::Padded { failed }
    } else {
        TranslationStatus::Complete
    };

    info!("Translation finished: {:?}", status);
    Ok(TranslationOutcome { subtitles: translated, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::TextSpan;
    use mockall::predicate::*;

    fn subtitles(texts: &[&str]) -> Vec<SubtitleEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SubtitleEntry::new(i + 1, i as u64 * 2_000, i as u64 * 2_000 + 1_500, *t))
            .collect()
    }

    fn model_returning(response: &'static str) -> MockLanguageModel {
        let mut model = MockLanguageModel::new();
        model.expect_name().return_const("mock".to_string());
        model
            .expect_generate()
            .times(1)
            .returning(move |_| Ok(response.to_string()));
        model
    }

    #[tokio::test]
    async fn test_translation_keeps_timing() {
        let model = model_returning("1. Xin chào\n2. Tạm biệt");
        let input = subtitles(&["Hello", "Goodbye"]);

        let outcome = translate_subtitles(&model, &input, "vi").await.unwrap();

        assert_eq!(outcome.status, TranslationStatus::Complete);
        assert_eq!(outcome.subtitles[1].start, 2_000);
        assert_eq!(outcome.subtitles[1].end, 3_500);
        assert_eq!(outcome.subtitles[1].text_parts, vec![TextSpan::plain("Tạm biệt")]);
    }

    #[tokio::test]
    async fn test_short_response_is_padded() {
        let model = model_returning("1. Uno\n2. Dos");
        let input = subtitles(&["One", "Two", "Three"]);

        let outcome = translate_subtitles(&model, &input, "es").await.unwrap();

        assert_eq!(outcome.subtitles.len(), 3);
        assert_eq!(outcome.status, TranslationStatus::Padded { failed: 1 });
        assert_eq!(outcome.subtitles[2].text(), "[Translation failed] Three");
        assert!(outcome.is_applied());
    }

    #[tokio::test]
    async fn test_misaligned_response_returns_originals() {
        let model = model_returning("Sure! Here are the lines:\n1. Uno\n2. Dos\n3. Tres");
        let input = subtitles(&["One", "Two", "Three"]);

        let outcome = translate_subtitles(&model, &input, "es").await.unwrap();

        assert_eq!(outcome.subtitles, input);
        assert_eq!(outcome.status, TranslationStatus::Misaligned { expected: 3, received: 4 });
        assert!(!outcome.is_applied());
    }

    #[tokio::test]
    async fn test_prompt_lists_every_line() {
        let mut model = MockLanguageModel::new();
        model.expect_name().return_const("mock".to_string());
        model
            .expect_generate()
            .with(function(|prompt: &str| prompt.contains("1. Hello\n2. what the h**l")))
            .times(1)
            .returning(|_| Ok("a\nb".to_string()));

        let mut input = subtitles(&["Hello", ""]);
        input[1].text_parts = vec![TextSpan::plain("what the "), TextSpan::highlighted("h**l")];

        translate_subtitles(&model, &input, "fr").await.unwrap();
    }

    #[tokio::test]
    async fn test_engine_error_propagates() {
        let mut model = MockLanguageModel::new();
        model.expect_name().return_const("mock".to_string());
        model
            .expect_generate()
            .returning(|_| Err(CapsubError::Translation("boom".to_string())));

        let result = translate_subtitles(&model, &subtitles(&["x"]), "fr").await;
        assert!(matches!(result, Err(CapsubError::Translation(_))));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let model = MockLanguageModel::new();
        let outcome = translate_subtitles(&model, &[], "fr").await.unwrap();
        assert!(outcome.subtitles.is_empty());
    }

    #[test]
    fn test_gemini_requires_key() {
        let config = TranslateConfig::default();
        assert!(matches!(
            LanguageModelFactory::create(&config, None),
            Err(CapsubError::CredentialMissing)
        ));
    }
}
