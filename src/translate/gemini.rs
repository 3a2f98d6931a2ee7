use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{CapsubError, Result};
use super::{LanguageModel, common::build_http_client};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate.content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Google Gemini client
pub struct GeminiModel {
    client: Client,
    config: TranslateConfig,
    api_key: String,
}

impl GeminiModel {
    pub fn new(config: TranslateConfig, api_key: String) -> Result<Self> {
        let client = build_http_client(config.timeout_secs)?;
        Ok(Self { client, config, api_key })
    }

    fn base_url(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> String {
        format!("gemini:{}", self.config.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url(), self.config.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt.to_string() }],
            }],
        };

        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CapsubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CapsubError::Translation(format!(
                "Gemini API error {}: {}", status, error_text
            )));
        }

        let body: GenerateContentResponse = response.json().await
            .map_err(|e| CapsubError::Translation(format!("Failed to parse response: {}", e)))?;

        body.text()
            .ok_or_else(|| CapsubError::Translation("Empty translation received".to_string()))
    }

    async fn check_credential(&self) -> Result<()> {
        let url = format!("{}/v1beta/models", self.base_url());

        let response = self.client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .query(&[("pageSize", "1")])
            .send()
            .await
            .map_err(|e| CapsubError::CredentialInvalid(format!("Failed to reach Gemini: {}", e)))?;

        if response.status().is_success() {
            info!("Gemini API key accepted");
            Ok(())
        } else {
            Err(CapsubError::CredentialInvalid(format!(
                "Gemini rejected the key ({})", response.status()
            )))
        }
    }
}
