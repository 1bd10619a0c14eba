use sentiment_forest::api::Predictor;
use sentiment_forest::model_loader::ModelFiles;
use sentiment_forest::pipeline::config::{Config, TestSize};
use sentiment_forest::pipeline::save::save_artifact;
use sentiment_forest::pipeline::train::train_from_records;
use sentiment_forest::{train_model, Record, SentimentError};
use std::path::Path;

const POSITIVE: [&str; 4] = ["wonderful", "lovely", "delightful", "cheerful"];
const NEGATIVE: [&str; 4] = ["awful", "dreadful", "miserable", "gloomy"];

/// 40 positive and 40 negative records plus one singleton label.
fn synthetic_records() -> Vec<Record> {
    let mut records = Vec::new();
    for i in 0..40 {
        records.push(Record::new(
            format!("This is GOOD, {}!", POSITIVE[i % 4]),
            "positive",
        ));
        records.push(Record::new(
            format!("This is terrible... {}.", NEGATIVE[i % 4]),
            "negative",
        ));
    }
    records.push(Record::new("meh", "neutral"));
    records
}

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.output.model_dir = dir.join("model");
    config
}

fn write_csv(path: &Path, records: &[Record]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer
        .write_record(["id", " Text ", " Sentiment ", "Platform"])
        .unwrap();
    for (i, r) in records.iter().enumerate() {
        writer
            .write_record([
                i.to_string().as_str(),
                r.text.as_str(),
                r.label.as_str(),
                "Twitter",
            ])
            .unwrap();
    }
    writer.flush().unwrap();
}

#[test]
fn test_train_and_predict_good_and_terrible() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let outcome = train_from_records(synthetic_records(), &config).unwrap();

    assert_eq!(outcome.label_counts.len(), 2);
    assert_eq!(outcome.label_counts.get("positive"), 40);
    assert_eq!(outcome.label_counts.get("negative"), 40);
    assert_eq!(outcome.label_counts.get("neutral"), 0);
    assert_eq!(outcome.candidates.len(), 6);
    assert_eq!(outcome.report.macro_avg.support, 35);

    let predictor = Predictor::from_files(&outcome.model_files).unwrap();
    assert_eq!(predictor.predict("this is good").unwrap().label, "positive");
    assert_eq!(predictor.predict("this is terrible").unwrap().label, "negative");
}

#[test]
fn test_training_is_reproducible() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let a = train_from_records(synthetic_records(), &config_in(dir_a.path())).unwrap();
    let b = train_from_records(synthetic_records(), &config_in(dir_b.path())).unwrap();

    assert_eq!(a.best_params, b.best_params);
    assert_eq!(a.test_accuracy, b.test_accuracy);
    assert_eq!(a.best_score, b.best_score);
    assert_eq!(a.forest, b.forest);
}

#[test]
fn test_reloaded_artifacts_predict_like_in_memory_model() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = train_from_records(synthetic_records(), &config_in(dir.path())).unwrap();

    let in_memory =
        Predictor::from_parts(outcome.forest.clone(), outcome.vectorizer.clone()).unwrap();
    let reloaded = Predictor::from_files(&outcome.model_files).unwrap();
    assert_eq!(reloaded.model(), &outcome.forest);
    assert_eq!(reloaded.vectorizer(), &outcome.vectorizer);

    let texts = [
        "this is good",
        "this is terrible",
        "lovely and cheerful",
        "gloomy",
        "no known words here",
    ];
    assert_eq!(
        in_memory.predict_batch(&texts).unwrap(),
        reloaded.predict_batch(&texts).unwrap()
    );
}

#[test]
fn test_train_from_csv_with_padded_headers() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("sentimentdataset.csv");
    write_csv(&csv_path, &synthetic_records());

    let mut config = config_in(dir.path());
    config.data.csv_path = csv_path;
    let outcome = train_model(&config).unwrap();

    assert_eq!(outcome.label_counts.total(), 80);
    assert!(outcome.model_files.exists());
    assert!(config.output.summary_path().exists());

    let summary_text = std::fs::read_to_string(config.output.summary_path()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary_text).unwrap();
    assert_eq!(summary["candidates"].as_array().unwrap().len(), 6);
    assert!(summary["best_params"]["n_estimators"].is_u64());
    assert_eq!(summary["n_test"], 35);
}

#[test]
fn test_retraining_overwrites_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    train_from_records(synthetic_records(), &config).unwrap();
    let second = train_from_records(synthetic_records(), &config).unwrap();

    let predictor = Predictor::from_files(&second.model_files).unwrap();
    assert_eq!(predictor.model(), &second.forest);
}

#[test]
fn test_missing_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let err = Predictor::from_files(&ModelFiles::in_dir(dir.path())).unwrap_err();
    assert!(matches!(err, SentimentError::ArtifactNotFound(_)));
}

#[test]
fn test_corrupt_and_swapped_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = train_from_records(synthetic_records(), &config_in(dir.path())).unwrap();
    let files = outcome.model_files;

    std::fs::copy(&files.vectorizer, &files.model).unwrap();
    let err = Predictor::from_files(&files).unwrap_err();
    assert!(matches!(err, SentimentError::Artifact { .. }));

    std::fs::write(&files.model, b"\x00\x01garbage").unwrap();
    let err = Predictor::from_files(&files).unwrap_err();
    assert!(matches!(err, SentimentError::Artifact { .. }));
}

#[test]
fn test_inconsistent_vectorizer_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = train_from_records(synthetic_records(), &config_in(dir.path())).unwrap();

    let mut vectorizer = outcome.vectorizer.clone();
    vectorizer.vocabulary.insert("good".to_string(), 999);
    save_artifact(&vectorizer, &outcome.model_files.vectorizer).unwrap();

    let err = Predictor::from_files(&outcome.model_files).unwrap_err();
    assert!(matches!(err, SentimentError::Artifact { .. }));
}

#[test]
fn test_too_few_records_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let records: Vec<Record> = synthetic_records().into_iter().take(20).collect();
    let err = train_from_records(records, &config_in(dir.path())).unwrap_err();
    assert!(matches!(err, SentimentError::InsufficientData(_)));
}

#[test]
fn test_fractional_test_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.split.test_size = TestSize::Fraction(0.25);
    let outcome = train_from_records(synthetic_records(), &config).unwrap();
    assert_eq!(outcome.report.macro_avg.support, 20);
}

#[test]
fn test_missing_label_column() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    std::fs::write(&csv_path, "Text,Mood\nhello,happy\n").unwrap();

    let mut config = config_in(dir.path());
    config.data.csv_path = csv_path;
    let err = train_model(&config).unwrap_err();
    assert!(matches!(err, SentimentError::MissingColumn { .. }));
}
