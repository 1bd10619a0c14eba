//! Sentiment training pipeline
//!
//! This module trains a sentiment classifier from a labeled CSV file:
//!
//! - **Cleaning**: lowercase and strip ASCII punctuation
//! - **Filtering**: drop labels too rare to stratify (two passes, `< 2` then `< 5`)
//! - **Split**: stratified shuffle split with a fixed-size test set and fixed seed
//! - **TF-IDF**: unigrams and bigrams, `min_df = 2`, `max_df = 0.95`, fitted on the
//!   training split only
//! - **Random forest**: chosen by exhaustive grid search with stratified 3-fold CV
//!
//! The trainer writes two artifacts (`model.bin`, `vectorizer.bin`) plus a
//! `training_summary.json`; the [`crate::api::Predictor`] reads them back.
//!
//! ## Usage
//!
//! ### Training
//!
//! ```bash
//! ./target/release/sentiment-forest train --data data/sentimentdataset.csv
//! ```
//!
//! ### Prediction
//!
//! ```bash
//! ./target/release/sentiment-forest predict "What a beautiful day!"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use sentiment_forest::pipeline::{config::Config, train::train_model};
//!
//! let config = Config::load_or_default("config.toml")?;
//! let outcome = train_model(&config)?;
//! println!("Test accuracy: {:.4}", outcome.test_accuracy);
//! # Ok::<(), sentiment_forest::SentimentError>(())
//! ```
//!
//! ## Configuration
//!
//! Every key is optional; missing keys take the values shown here.
//!
//! ```toml
//! [data]
//! csv_path = "data/sentimentdataset.csv"
//! text_column = "Text"
//! label_column = "Sentiment"
//!
//! [filter]
//! drop_below = 2
//! min_samples = 5
//!
//! [split]
//! test_size = 35        # or a fraction such as 0.2
//! random_state = 42
//!
//! [features]
//! ngram_range = [1, 2]
//! min_df = 2
//! max_df = 0.95
//!
//! [search]
//! n_estimators = [100, 200]
//! max_depth = ["none", 10, 20]
//! class_weight = ["balanced"]
//! cv_folds = 3
//!
//! [output]
//! model_dir = "model"
//! model_file = "model.bin"
//! vectorizer_file = "vectorizer.bin"
//! summary_file = "training_summary.json"
//! ```
//!
//! ## Module Structure
//!
//! - [`config`] - Configuration structures and loading
//! - [`clean`] - Text normalisation
//! - [`data`] - CSV loading and rare-label filtering
//! - [`split`] - Stratified train/test split
//! - [`tfidf`] - TF-IDF vectorizer implementation
//! - [`search`] - Stratified k-fold and grid search
//! - [`train`] - Model training pipeline
//! - [`evaluate`] - Model evaluation and metrics
//! - [`save`] - Artifact persistence
//! - [`predict`] - Single text prediction
//! - `cli` - Command-line interface (`cli` feature)

pub mod clean;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod data;
pub mod evaluate;
pub mod predict;
pub mod save;
pub mod search;
pub mod split;
pub mod tfidf;
pub mod train;

// Re-export commonly used items for external use
#[cfg(feature = "cli")]
pub use cli::Cli;
pub use train::{train_from_records, train_model, TrainingOutcome};
