use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use crate::error::{CapsubError, Result};

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "capsub.toml";

fn default_timeout_secs() -> u64 {
    300
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "vi".to_string()]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub censor: CensorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Which language model service performs translation
    pub engine: TranslationEngine,
    /// Base URL of the engine's API
    pub endpoint: String,
    /// Model identifier passed to the engine
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable consulted before the stored API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationEngine {
    /// Google Gemini generateContent API (needs an API key)
    Gemini,
    /// Local Ollama server
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensorConfig {
    /// Censor exported subtitles; `--no-censor` switches it off per command
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Built-in vocabularies to load
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    /// Additional words to censor
    #[serde(default)]
    pub extra_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base name used when none can be derived from the project
    pub default_name: String,
    /// Default directory for exported SRT files
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the session, API key and logs live; platform data dir when unset
    pub directory: Option<PathBuf>,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            engine: TranslationEngine::Gemini,
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for CensorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locales: default_locales(),
            extra_words: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_name: "subtitles".to_string(),
            directory: None,
        }
    }
}

impl StorageConfig {
    /// Resolved storage directory
    pub fn resolve_dir(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .map(|d| d.join("capsub"))
                .unwrap_or_else(|| PathBuf::from(".capsub")),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CapsubError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| CapsubError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path, else `capsub.toml` in the working directory, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CapsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CapsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.endpoint.trim().is_empty() {
            return Err(CapsubError::Config("translate.endpoint must not be empty".to_string()));
        }
        if self.translate.model.trim().is_empty() {
            return Err(CapsubError::Config("translate.model must not be empty".to_string()));
        }
        if self.translate.timeout_secs == 0 {
            return Err(CapsubError::Config("translate.timeout_secs must be positive".to_string()));
        }
        if self.output.default_name.trim().is_empty() {
            return Err(CapsubError::Config("output.default_name must not be empty".to_string()));
        }
        Ok(())
    }
}
