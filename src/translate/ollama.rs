use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{CapsubError, Result};
use super::{LanguageModel, common::build_http_client};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

/// Local Ollama client; no credential involved
pub struct OllamaModel {
    client: Client,
    config: TranslateConfig,
}

impl OllamaModel {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = build_http_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> String {
        format!("ollama:{}", self.config.model)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CapsubError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CapsubError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let body: GenerateResponse = response.json().await
            .map_err(|e| CapsubError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw_response = body.response.trim().to_string();
        if raw_response.is_empty() {
            return Err(CapsubError::Translation("Empty translation received".to_string()));
        }
        Ok(raw_response)
    }

    /// Check that Ollama is reachable and the model is pulled
    async fn check_credential(&self) -> Result<()> {
        let url = format!("{}/api/show", self.config.endpoint.trim_end_matches('/'));

        let response = self.client
            .post(&url)
            .json(&json!({ "name": self.config.model }))
            .send()
            .await
            .map_err(|e| CapsubError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(CapsubError::Translation(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.config.model, self.config.model
            )))
        }
    }
}
