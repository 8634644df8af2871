//! Error types for Musitech.

use thiserror::Error;

/// Library-level error type for Musitech operations.
#[derive(Error, Debug)]
pub enum MusitechError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Empty response from completion service")]
    EmptyResponse,

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Musitech operations.
pub type Result<T> = std::result::Result<T, MusitechError>;
