//! Locating the trained artifacts on disk.
//!
//! The trainer writes two files into its model directory; the predictor only
//! needs to know where they are.
//!
//! # Examples
//!
//! ## Check if models exist
//!
//! ```no_run
//! use sentiment_forest::model_loader::ModelFiles;
//!
//! let files = ModelFiles::in_dir("model");
//! if files.exists() {
//!     println!("Models are ready!");
//! }
//! ```
//!
//! ## Custom model directory
//!
//! ```no_run
//! use sentiment_forest::model_loader::ModelLoaderConfig;
//!
//! let config = ModelLoaderConfig::new()
//!     .with_model_dir("/custom/models")
//!     .with_model_file("forest.bin");
//!
//! let files = config.get_model_files();
//! ```

use crate::error::{Result, SentimentError};
use crate::pipeline::config::OutputConfig;
use std::path::{Path, PathBuf};

const DEFAULT_MODEL_DIR: &str = "model";
const DEFAULT_MODEL_FILE: &str = "model.bin";
const DEFAULT_VECTORIZER_FILE: &str = "vectorizer.bin";

/// Paths of the classifier and vectorizer artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub vectorizer: PathBuf,
}

impl ModelFiles {
    /// Default file names inside `model_dir`.
    pub fn in_dir(model_dir: impl AsRef<Path>) -> Self {
        let base = model_dir.as_ref();
        Self {
            model: base.join(DEFAULT_MODEL_FILE),
            vectorizer: base.join(DEFAULT_VECTORIZER_FILE),
        }
    }

    /// Paths as configured in the `[output]` section.
    pub fn from_output(output: &OutputConfig) -> Self {
        Self {
            model: output.model_path(),
            vectorizer: output.vectorizer_path(),
        }
    }

    /// Check if all required files exist
    pub fn exists(&self) -> bool {
        self.model.exists() && self.vectorizer.exists()
    }

    /// Error naming the first missing artifact, if any.
    pub fn ensure_exists(&self) -> Result<()> {
        for path in [&self.model, &self.vectorizer] {
            if !path.exists() {
                return Err(SentimentError::ArtifactNotFound(format!(
                    "{} (train a model first with `sentiment-forest train`)",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl Default for ModelFiles {
    fn default() -> Self {
        Self::in_dir(DEFAULT_MODEL_DIR)
    }
}

/// Configuration for model loading
#[derive(Debug, Clone)]
pub struct ModelLoaderConfig {
    pub model_dir: PathBuf,
    pub model_file: String,
    pub vectorizer_file: String,
}

impl Default for ModelLoaderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            vectorizer_file: DEFAULT_VECTORIZER_FILE.to_string(),
        }
    }
}

impl From<&OutputConfig> for ModelLoaderConfig {
    fn from(output: &OutputConfig) -> Self {
        Self {
            model_dir: output.model_dir.clone(),
            model_file: output.model_file.clone(),
            vectorizer_file: output.vectorizer_file.clone(),
        }
    }
}

impl ModelLoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn with_model_file(mut self, name: impl Into<String>) -> Self {
        self.model_file = name.into();
        self
    }

    pub fn with_vectorizer_file(mut self, name: impl Into<String>) -> Self {
        self.vectorizer_file = name.into();
        self
    }

    pub fn get_model_files(&self) -> ModelFiles {
        ModelFiles {
            model: self.model_dir.join(&self.model_file),
            vectorizer: self.model_dir.join(&self.vectorizer_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_files_paths() {
        let files = ModelFiles::default();
        assert_eq!(files.model, PathBuf::from("model/model.bin"));
        assert_eq!(files.vectorizer, PathBuf::from("model/vectorizer.bin"));
    }

    #[test]
    fn test_custom_model_dir() {
        let files = ModelFiles::in_dir("/tmp/models");
        assert_eq!(files.model, PathBuf::from("/tmp/models/model.bin"));
    }

    #[test]
    fn test_config_builder() {
        let config = ModelLoaderConfig::new()
            .with_model_dir("custom_models")
            .with_vectorizer_file("tfidf.bin");

        let files = config.get_model_files();
        assert_eq!(files.model, PathBuf::from("custom_models/model.bin"));
        assert_eq!(files.vectorizer, PathBuf::from("custom_models/tfidf.bin"));
    }

    #[test]
    fn test_output_config_agrees_with_loader() {
        let output = OutputConfig::default();
        assert_eq!(
            ModelFiles::from_output(&output),
            ModelLoaderConfig::from(&output).get_model_files()
        );
        assert_eq!(ModelFiles::from_output(&output), ModelFiles::default());
    }

    #[test]
    fn test_ensure_exists_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let files = ModelFiles::in_dir(dir.path());
        assert!(!files.exists());
        assert!(matches!(
            files.ensure_exists(),
            Err(SentimentError::ArtifactNotFound(_))
        ));
    }
}
