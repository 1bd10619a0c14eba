//! Error type shared by the trainer and the predictor.
//!
//! Every failure is fatal for the current run: nothing here is retried or
//! downgraded to a warning.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    // Data
    #[error("Column '{column}' not found in {path} (available: {available})")]
    MissingColumn {
        column: String,
        path: String,
        available: String,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("After pruning, no terms remain. Try a lower min_df or a higher max_df")]
    EmptyVocabulary,

    // Models
    #[error("Model has not been fitted: {0}")]
    NotFitted(&'static str),

    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Artifacts
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Invalid artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    // Configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl SentimentError {
    pub fn insufficient(msg: impl Into<String>) -> Self {
        SentimentError::InsufficientData(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        SentimentError::Config(msg.into())
    }

    pub fn artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SentimentError::Artifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
