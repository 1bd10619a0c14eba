//! # sentiment-forest - Sentiment Classifier
//!
//! Sentiment classification of short texts with TF-IDF features and a
//! grid-searched random forest, in pure Rust.
//!
//! ## Features
//!
//! - **Training pipeline**: CSV loading, cleaning, rare-label filtering, stratified split
//! - **TF-IDF**: unigrams + bigrams with document-frequency pruning
//! - **Random forest**: CART trees built in parallel, deterministic for a fixed seed
//! - **Grid search**: stratified k-fold cross-validation scored by accuracy
//! - **Artifacts**: versioned bincode files for the classifier and the vectorizer
//!
//! ## Quick Start
//!
//! Train a model first:
//!
//! ```bash
//! sentiment-forest train --data data/sentimentdataset.csv
//! ```
//!
//! ### Basic Usage
//!
//! ```no_run
//! use sentiment_forest::api::Predictor;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let predictor = Predictor::new()?;
//!
//!     let result = predictor.predict("Feeling grateful for my friends today")?;
//!
//!     println!("Sentiment: {}", result.label);
//!     println!("Confidence: {:.1}%", result.confidence * 100.0);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Batch Predictions
//!
//! ```no_run
//! # use sentiment_forest::api::Predictor;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let predictor = Predictor::new()?;
//!
//! let texts = vec![
//!     "Best concert of my life",
//!     "Stuck in traffic again",
//! ];
//!
//! let results = predictor.predict_batch(&texts)?;
//! for (text, result) in texts.iter().zip(results) {
//!     println!("{}: {}", text, result.label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom Configuration
//!
//! ```no_run
//! # use sentiment_forest::api::{Predictor, PredictorConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PredictorConfig::new()
//!     .with_model_dir("custom_models")
//!     .with_model_file("forest.bin");
//!
//! let predictor = Predictor::with_config(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cargo Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `cli` | Include CLI binary | ✓ |
//!
//! ```toml
//! # Library only
//! sentiment-forest = { version = "0.1", default-features = false }
//! ```
//!
//! ## Logging
//!
//! The library logs through `tracing`; the binary installs a
//! `tracing-subscriber` filter that honours `RUST_LOG`
//! (default `sentiment_forest=info`).
//!
//! ## License
//!
//! GNU General Public License v3.0 (GPLv3)

// Public API modules
pub mod api;
pub mod error;
pub mod model_loader;

// Core modules
pub mod decision_tree;
pub mod pipeline;
pub mod random_forest;
pub mod sparse;

// Re-export commonly used items from pipeline module
pub use api::{PredictionResult, Predictor};
pub use error::{Result, SentimentError};
pub use pipeline::clean::clean_text;
pub use pipeline::config::Config;
pub use pipeline::data::{load_data, Record};
pub use pipeline::tfidf::TfidfVectorizer;
pub use pipeline::train::{train_model, TrainingOutcome};
pub use random_forest::{ClassWeight, ForestParams, RandomForest};
pub use sparse::SparseVector;
