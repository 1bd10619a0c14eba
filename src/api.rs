//! High-level API for sentiment prediction
//!
//! This module provides a simple interface for loading the trained artifacts
//! and classifying text.
//!
//! # Quick Start
//!
//! ```no_run
//! use sentiment_forest::api::Predictor;
//!
//! let predictor = Predictor::new()?;
//! let result = predictor.predict("What a wonderful morning!")?;
//! println!("{}", result.label); // e.g., "Positive"
//! # Ok::<(), sentiment_forest::SentimentError>(())
//! ```
//!
//! # Examples
//!
//! ## Batch Predictions
//!
//! ```no_run
//! # use sentiment_forest::api::Predictor;
//! # fn main() -> sentiment_forest::Result<()> {
//! let predictor = Predictor::new()?;
//! let texts = vec!["Text 1", "Text 2", "Text 3"];
//! let results = predictor.predict_batch(&texts)?;
//!
//! for (text, result) in texts.iter().zip(results.iter()) {
//!     println!("{}: {}", text, result.label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Model Directory
//!
//! ```no_run
//! use sentiment_forest::api::{Predictor, PredictorConfig};
//!
//! let config = PredictorConfig::new().with_model_dir("/custom/path");
//! let predictor = Predictor::with_config(config)?;
//! # Ok::<(), sentiment_forest::SentimentError>(())
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use sentiment_forest::api::Predictor;
//!
//! match Predictor::new() {
//!     Ok(predictor) => {
//!         // Use predictor
//!     }
//!     Err(e) => {
//!         eprintln!("Failed to load model: {}", e);
//!         eprintln!("Try: sentiment-forest train");
//!     }
//! }
//! ```

use crate::error::{Result, SentimentError};
use crate::model_loader::ModelFiles;
use crate::pipeline::clean::clean_text;
use crate::pipeline::save::load_artifact;
use crate::random_forest::{argmax, ForestParams, RandomForest};
use crate::TfidfVectorizer;
use rayon::prelude::*;

pub use crate::model_loader::ModelLoaderConfig as PredictorConfig;

/// Main predictor interface for sentiment classification
#[derive(Debug, Clone)]
pub struct Predictor {
    model: RandomForest,
    vectorizer: TfidfVectorizer,
}

/// Prediction result containing the label and class probabilities
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// The predicted label (e.g., "Positive")
    pub label: String,

    /// Averaged tree vote for `label` (0.0 to 1.0)
    pub confidence: f64,

    /// `(label, probability)` for every known label, in lexical label order
    pub probabilities: Vec<(String, f64)>,
}

impl Predictor {
    /// Create a new predictor from `model/model.bin` and `model/vectorizer.bin`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either artifact is missing
    /// - An artifact is corrupted, of the wrong kind, or from an incompatible format version
    /// - The two artifacts do not belong together
    pub fn new() -> Result<Self> {
        Self::with_config(PredictorConfig::default())
    }

    /// Create a new predictor with custom configuration
    pub fn with_config(config: PredictorConfig) -> Result<Self> {
        Self::from_files(&config.get_model_files())
    }

    /// Load the artifacts at explicit paths.
    pub fn from_files(files: &ModelFiles) -> Result<Self> {
        files.ensure_exists()?;
        let vectorizer: TfidfVectorizer = load_artifact(&files.vectorizer)?;
        let model: RandomForest = load_artifact(&files.model)?;
        tracing::info!(
            "Loaded classifier from {} and vectorizer from {}",
            files.model.display(),
            files.vectorizer.display()
        );
        Self::from_parts(model, vectorizer)
    }

    /// Wrap an in-memory model pair, checking that their dimensions agree.
    pub fn from_parts(model: RandomForest, vectorizer: TfidfVectorizer) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(SentimentError::NotFitted("vectorizer"));
        }
        if model.n_features() != vectorizer.n_features() {
            return Err(SentimentError::DimensionMismatch {
                expected: model.n_features(),
                actual: vectorizer.n_features(),
            });
        }
        Ok(Self { model, vectorizer })
    }

    /// Predict the sentiment label of `text`.
    ///
    /// The text is cleaned exactly as the training texts were before it is
    /// vectorized. Text sharing no terms with the vocabulary still gets a
    /// label: the forest's answer for an all-zero row.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use sentiment_forest::api::Predictor;
    /// let predictor = Predictor::new().unwrap();
    /// let result = predictor.predict("This is terrible").unwrap();
    /// assert!(result.confidence > 0.0);
    /// ```
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let row = self.vectorizer.transform(&clean_text(text));
        let proba = self.model.predict_proba(&row);
        let best = argmax(&proba);
        let classes = self.model.classes();

        Ok(PredictionResult {
            label: classes[best].clone(),
            confidence: proba[best],
            probabilities: classes.iter().cloned().zip(proba).collect(),
        })
    }

    /// Label only, without probabilities.
    pub fn predict_label(&self, text: &str) -> Result<String> {
        Ok(self.predict(text)?.label)
    }

    /// Predict labels for multiple texts.
    pub fn predict_batch<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
    ) -> Result<Vec<PredictionResult>> {
        texts.par_iter().map(|t| self.predict(t.as_ref())).collect()
    }

    /// Get information about the loaded model
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            params: *self.model.params(),
            n_trees: self.model.n_estimators(),
            n_features: self.vectorizer.n_features(),
            labels: self.model.classes().to_vec(),
        }
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }
}

/// Information about the loaded model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub params: ForestParams,
    pub n_trees: usize,
    pub n_features: usize,
    pub labels: Vec<String>,
}

impl std::fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sentiment: {}", self.label)?;
        writeln!(f, "Confidence: {:.2}%", self.confidence * 100.0)?;
        let mut ranked: Vec<&(String, f64)> = self.probabilities.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        writeln!(f, "\nTop labels:")?;
        for (label, p) in ranked.into_iter().take(5) {
            writeln!(f, "  {}: {:.2}%", label, p * 100.0)?;
        }
        Ok(())
    }
}
