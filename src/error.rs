//! Error types for Notat.

use thiserror::Error;

/// Library-level error type for Notat operations.
#[derive(Error, Debug)]
pub enum NotatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing cancelled")]
    Cancelled,
}

/// Failures encountered while requesting or interpreting an AI completion.
///
/// `Timeout`, `EmptyResponse` and `Parse` are retried up to the attempt
/// budget before being surfaced; `Request` and `ProviderReported` are
/// assumed non-transient within a run and surfaced immediately.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("AI request timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("AI request failed: {0}")]
    Request(String),

    #[error("Empty response from AI after {attempts} attempts")]
    EmptyResponse { attempts: u32 },

    #[error("Provider reported an error: {0}")]
    ProviderReported(String),

    #[error("Failed to parse AI response: {0}")]
    Parse(String),
}

/// Result type alias for Notat operations.
pub type Result<T> = std::result::Result<T, NotatError>;
