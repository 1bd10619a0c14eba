//! Model training pipeline for the sentiment classifier.

use super::clean::clean_text;
use super::config::{Config, TestSize};
use super::data::{filter_labels, load_data, LabelCounts, Record};
use super::evaluate::{print_results, ClassificationReport};
use super::save::{save_model, save_summary};
use super::search::{CandidateScore, GridSearch};
use super::split::stratified_split;
use super::tfidf::TfidfVectorizer;
use crate::error::Result;
use crate::model_loader::ModelFiles;
use crate::random_forest::{ForestParams, RandomForest};
use serde::Serialize;
use std::time::Instant;

/// Everything a training run produced, in memory.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best_params: ForestParams,
    /// Mean cross-validated accuracy of the best candidate
    pub best_score: f64,
    pub test_accuracy: f64,
    pub report: ClassificationReport,
    pub candidates: Vec<CandidateScore>,
    /// Label counts after the rare-label filter
    pub label_counts: LabelCounts,
    pub model_files: ModelFiles,
    pub forest: RandomForest,
    pub vectorizer: TfidfVectorizer,
}

/// Contents of `training_summary.json`.
#[derive(Debug, Serialize)]
pub struct TrainingSummary<'a> {
    pub crate_version: &'static str,
    pub best_params: &'a ForestParams,
    pub best_cv_score: f64,
    pub test_accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub label_counts: &'a LabelCounts,
    pub candidates: &'a [CandidateScore],
    pub report: &'a ClassificationReport,
}

/// Train the classifier from the CSV named in `config.data`.
///
/// This function orchestrates the entire training pipeline:
/// 1. Load, clean and filter the records
/// 2. Stratified train/test split
/// 3. Fit TF-IDF on the training texts
/// 4. Grid-search the random forest with stratified k-fold CV
/// 5. Save both artifacts, evaluate on the test split, write the summary
pub fn train_model(config: &Config) -> Result<TrainingOutcome> {
    config.validate()?;
    print_training_header(config);

    println!("Loading dataset...");
    let start = Instant::now();
    let records = load_data(
        &config.data.csv_path,
        &config.data.text_column,
        &config.data.label_column,
    )?;
    println!(
        "  Loaded {} records ({:.2}s)\n",
        records.len(),
        start.elapsed().as_secs_f64()
    );

    train_from_records(records, config)
}

/// Run the pipeline from already-loaded records (cleaning onwards).
pub fn train_from_records(records: Vec<Record>, config: &Config) -> Result<TrainingOutcome> {
    let records: Vec<Record> = records
        .into_iter()
        .map(|r| Record {
            text: clean_text(&r.text),
            label: r.label,
        })
        .collect();

    let filter = &config.filter;
    let filtered = filter_labels(records, filter.drop_below, filter.min_samples);
    println!("Label counts (before filtering):");
    println!("{}\n", filtered.before);
    println!(
        "Label counts (labels with fewer than {} samples removed):",
        filter.drop_below
    );
    println!("{}\n", filtered.after_first_pass);
    println!(
        "Label counts (labels with fewer than {} samples removed):",
        filter.min_samples
    );
    println!("{}\n", filtered.after_second_pass);
    let label_counts = filtered.after_second_pass;

    let split = stratified_split(
        filtered.records,
        config.split.test_size,
        config.split.random_state,
    )?;
    println!("Train: {} | Test: {}\n", split.train.len(), split.test.len());
    println!("===================================================================\n");

    let (train_texts, train_labels): (Vec<String>, Vec<String>) =
        split.train.into_iter().map(|r| (r.text, r.label)).unzip();
    let (test_texts, test_labels): (Vec<String>, Vec<String>) =
        split.test.into_iter().map(|r| (r.text, r.label)).unzip();

    println!("Building TF-IDF vectorizer...");
    let mut vectorizer = TfidfVectorizer::from_config(&config.features);
    let train_rows = vectorizer.fit_transform(&train_texts)?;
    let test_rows = vectorizer.transform_batch(&test_texts);
    println!("  Vocabulary size: {}\n", vectorizer.n_features());

    println!("Searching hyperparameters...");
    let search_start = Instant::now();
    let candidates = config.search.candidates(config.split.random_state)?;
    let search = GridSearch::new(candidates, config.search.cv_folds);
    let result = search.fit(&train_rows, &train_labels, vectorizer.n_features())?;
    println!(
        "  Best parameters: {} (CV accuracy {:.4}, {:.2}s)\n",
        result.best_params,
        result.best_score,
        search_start.elapsed().as_secs_f64()
    );

    let forest = result.best_estimator;
    save_model(&forest, &vectorizer, &config.output)?;

    let predictions = forest.predict_batch(&test_rows);
    let report = ClassificationReport::new(&test_labels, &predictions);
    print_results(&result.best_params, result.best_score, &report);

    let summary = TrainingSummary {
        crate_version: env!("CARGO_PKG_VERSION"),
        best_params: &result.best_params,
        best_cv_score: result.best_score,
        test_accuracy: report.accuracy,
        n_train: train_labels.len(),
        n_test: test_labels.len(),
        n_features: vectorizer.n_features(),
        label_counts: &label_counts,
        candidates: &result.candidates,
        report: &report,
    };
    save_summary(&summary, config.output.summary_path())?;

    println!("Training complete!\n");

    Ok(TrainingOutcome {
        best_params: result.best_params,
        best_score: result.best_score,
        test_accuracy: report.accuracy,
        report,
        candidates: result.candidates,
        label_counts,
        model_files: ModelFiles::from_output(&config.output),
        forest,
        vectorizer,
    })
}

/// Print training header with configuration details.
fn print_training_header(config: &Config) {
    println!("\n===================================================================");
    println!("  Sentiment Classifier: TF-IDF + Random Forest");
    println!("===================================================================\n");

    println!("Configuration:");
    println!("  Data: {}", config.data.csv_path.display());
    println!(
        "  Columns: text='{}', label='{}'",
        config.data.text_column, config.data.label_column
    );
    match config.split.test_size {
        TestSize::Count(n) => println!("  Test size: {} samples", n),
        TestSize::Fraction(f) => println!("  Test size: {:.0}%", f * 100.0),
    }
    println!("  Seed: {}", config.split.random_state);
    println!(
        "  N-grams: {:?}, min_df: {}, max_df: {}",
        config.features.ngram_range, config.features.min_df, config.features.max_df
    );
    println!("  n_estimators: {:?}", config.search.n_estimators);
    println!("  CV folds: {}", config.search.cv_folds);
    println!("  Output: {}\n", config.output.model_dir.display());
    println!("===================================================================\n");
}
