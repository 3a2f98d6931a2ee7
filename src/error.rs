use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapsubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed project file: {0}")]
    MalformedProject(String),

    #[error("No subtitles found in project: {0}")]
    NoSubtitles(String),

    #[error("No CapCut projects found in {0} (expected sub-directories containing draft_content.json)")]
    NoProjects(String),

    #[error("Translation misaligned: expected {expected} lines, received {received}; keeping original subtitles")]
    TranslationMisalignment { expected: usize, received: usize },

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("A translation is already in progress")]
    TranslationInProgress,

    #[error("No API key stored. Run `capsub key set <KEY>` first")]
    CredentialMissing,

    #[error("API key validation failed: {0}")]
    CredentialInvalid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, CapsubError>;
