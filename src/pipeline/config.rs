//! Configuration structures for the sentiment training pipeline.
//!
//! This module provides strongly-typed configuration management using TOML files.
//! The configuration covers data paths, the rare-label filter, the train/test
//! split, TF-IDF settings, the hyperparameter grid, and output paths.

use crate::error::{Result, SentimentError};
use crate::random_forest::{ClassWeight, ForestParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data loading configuration
    pub data: DataConfig,
    /// Rare-label filter thresholds
    pub filter: FilterConfig,
    /// Train/test split configuration
    pub split: SplitConfig,
    /// TF-IDF feature extraction configuration
    pub features: FeaturesConfig,
    /// Hyperparameter search configuration
    pub search: SearchConfig,
    /// Output paths configuration
    pub output: OutputConfig,
}

/// Data loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the CSV dataset file
    pub csv_path: PathBuf,
    /// Header of the text column (matched after trimming whitespace)
    pub text_column: String,
    /// Header of the label column (matched after trimming whitespace)
    pub label_column: String,
}

/// Labels with fewer samples than these thresholds are dropped, in two passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// First pass: drop obviously unusable labels (singletons by default)
    pub drop_below: usize,
    /// Second pass: minimum samples a label needs to survive
    pub min_samples: usize,
}

/// Train/test split configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Test set size: an absolute count (`35`) or a fraction (`0.2`)
    pub test_size: TestSize,
    /// Seed shared by the split and the forest
    pub random_state: u64,
}

/// Size of the held-out test set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestSize {
    Count(usize),
    Fraction(f64),
}

impl TestSize {
    /// Resolve to a sample count for a dataset of `n_samples` records.
    pub fn resolve(&self, n_samples: usize) -> Result<usize> {
        match *self {
            TestSize::Count(n) => {
                if n == 0 || n >= n_samples {
                    return Err(SentimentError::insufficient(format!(
                        "test_size={} should be positive and smaller than the number of samples {}",
                        n, n_samples
                    )));
                }
                Ok(n)
            }
            TestSize::Fraction(f) => {
                if !(f > 0.0 && f < 1.0) {
                    return Err(SentimentError::config(format!(
                        "test_size={} should be a fraction in (0, 1)",
                        f
                    )));
                }
                let n = (f * n_samples as f64).ceil() as usize;
                if n == 0 || n >= n_samples {
                    return Err(SentimentError::insufficient(format!(
                        "test_size={} leaves an empty train or test set for {} samples",
                        f, n_samples
                    )));
                }
                Ok(n)
            }
        }
    }
}

/// TF-IDF feature extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Smallest and largest n-gram length
    pub ngram_range: (usize, usize),
    /// Terms must appear in at least this many training documents
    pub min_df: usize,
    /// Terms appearing in more than this fraction of documents are dropped
    pub max_df: f64,
    /// Optional cap on the vocabulary, keeping the most frequent terms
    pub max_features: Option<usize>,
}

/// Hyperparameter grid and cross-validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidate forest sizes
    pub n_estimators: Vec<usize>,
    /// Candidate depth limits; `"none"` means unlimited
    pub max_depth: Vec<DepthSetting>,
    /// Candidate class weightings
    pub class_weight: Vec<ClassWeight>,
    /// Number of stratified folds
    pub cv_folds: usize,
}

/// A depth limit as written in TOML: an integer or the keyword `"none"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepthSetting {
    Limit(usize),
    Keyword(String),
}

impl DepthSetting {
    fn resolve(&self) -> Result<Option<usize>> {
        match self {
            DepthSetting::Limit(0) => Err(SentimentError::config("max_depth must be at least 1")),
            DepthSetting::Limit(d) => Ok(Some(*d)),
            DepthSetting::Keyword(k) if k.eq_ignore_ascii_case("none") => Ok(None),
            DepthSetting::Keyword(k) => Err(SentimentError::config(format!(
                "unknown max_depth value '{}' (expected an integer or \"none\")",
                k
            ))),
        }
    }
}

impl SearchConfig {
    /// Expand the grid into concrete forest parameters.
    ///
    /// Order follows the grid keys sorted by name (`class_weight`,
    /// `max_depth`, `n_estimators`) with the last key varying fastest.
    pub fn candidates(&self, random_state: u64) -> Result<Vec<ForestParams>> {
        let depths = self
            .max_depth
            .iter()
            .map(DepthSetting::resolve)
            .collect::<Result<Vec<_>>>()?;

        let mut grid = Vec::new();
        for &class_weight in &self.class_weight {
            for &max_depth in &depths {
                for &n_estimators in &self.n_estimators {
                    grid.push(ForestParams {
                        n_estimators,
                        max_depth,
                        class_weight,
                        random_state,
                    });
                }
            }
        }
        Ok(grid)
    }
}

/// Output paths configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory to save model files
    pub model_dir: PathBuf,
    /// Classifier artifact filename
    pub model_file: String,
    /// TF-IDF vectorizer artifact filename
    pub vectorizer_file: String,
    /// Training summary filename (JSON)
    pub summary_file: String,
}

impl OutputConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join(&self.vectorizer_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.model_dir.join(&self.summary_file)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// Returns `Ok(Config)` if successful, or an error if the file cannot be read,
    /// parsed, or holds invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in defaults.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from {}", path.display());
            Self::load(path)
        } else {
            tracing::warn!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.filter.drop_below > self.filter.min_samples {
            return Err(SentimentError::config(format!(
                "filter.drop_below ({}) must not exceed filter.min_samples ({})",
                self.filter.drop_below, self.filter.min_samples
            )));
        }
        let (lo, hi) = self.features.ngram_range;
        if lo == 0 || lo > hi {
            return Err(SentimentError::config(format!(
                "invalid ngram_range ({}, {})",
                lo, hi
            )));
        }
        if !(self.features.max_df > 0.0 && self.features.max_df <= 1.0) {
            return Err(SentimentError::config(format!(
                "max_df={} should be in (0, 1]",
                self.features.max_df
            )));
        }
        if self.search.cv_folds < 2 {
            return Err(SentimentError::config(format!(
                "cv_folds={} should be at least 2",
                self.search.cv_folds
            )));
        }
        if self.search.n_estimators.iter().any(|&n| n == 0) {
            return Err(SentimentError::config("n_estimators must be positive"));
        }
        let candidates = self.search.candidates(self.split.random_state)?;
        if candidates.is_empty() {
            return Err(SentimentError::config("hyperparameter grid is empty"));
        }
        Ok(())
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            csv_path: PathBuf::from("data/sentimentdataset.csv"),
            text_column: "Text".to_string(),
            label_column: "Sentiment".to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            drop_below: 2,
            min_samples: 5,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_size: TestSize::Count(35),
            random_state: 42,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        FeaturesConfig {
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 0.95,
            max_features: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            n_estimators: vec![100, 200],
            max_depth: vec![
                DepthSetting::Keyword("none".to_string()),
                DepthSetting::Limit(10),
                DepthSetting::Limit(20),
            ],
            class_weight: vec![ClassWeight::Balanced],
            cv_folds: 3,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            model_dir: PathBuf::from("model"),
            model_file: "model.bin".to_string(),
            vectorizer_file: "vectorizer.bin".to_string(),
            summary_file: "training_summary.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_has_six_candidates() {
        let config = Config::default();
        let grid = config.search.candidates(42).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0].max_depth, None);
        assert_eq!(grid[0].n_estimators, 100);
        assert_eq!(grid[1].n_estimators, 200);
        assert_eq!(grid[2].max_depth, Some(10));
        assert!(grid.iter().all(|p| p.class_weight == ClassWeight::Balanced));
        assert!(grid.iter().all(|p| p.random_state == 42));
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [data]
            csv_path = "data/reviews.csv"
            text_column = "review"

            [split]
            test_size = 0.25

            [search]
            max_depth = ["none", 5]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data.csv_path, PathBuf::from("data/reviews.csv"));
        assert_eq!(config.data.text_column, "review");
        assert_eq!(config.data.label_column, "Sentiment");
        assert_eq!(config.split.test_size, TestSize::Fraction(0.25));
        assert_eq!(config.split.random_state, 42);
        assert_eq!(config.search.candidates(0).unwrap().len(), 4);
        config.validate().unwrap();
    }

    #[test]
    fn test_integer_test_size_is_count() {
        let config: Config = toml::from_str("[split]\ntest_size = 35\n").unwrap();
        assert_eq!(config.split.test_size, TestSize::Count(35));
    }

    #[test]
    fn test_test_size_resolution() {
        assert_eq!(TestSize::Count(35).resolve(100).unwrap(), 35);
        assert_eq!(TestSize::Fraction(0.25).resolve(10).unwrap(), 3);
        assert!(TestSize::Count(100).resolve(100).is_err());
        assert!(TestSize::Fraction(1.5).resolve(100).is_err());
    }

    #[test]
    fn test_rejects_unknown_depth_keyword() {
        let mut config = Config::default();
        config.search.max_depth = vec![DepthSetting::Keyword("deep".to_string())];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_single_fold() {
        let mut config = Config::default();
        config.search.cv_folds = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_paths() {
        let output = OutputConfig {
            model_dir: PathBuf::from("/tmp/models"),
            ..OutputConfig::default()
        };
        assert_eq!(output.model_path(), PathBuf::from("/tmp/models/model.bin"));
        assert_eq!(
            output.vectorizer_path(),
            PathBuf::from("/tmp/models/vectorizer.bin")
        );
    }
}
