//! Labeled records: CSV loading, label frequency tables and the rare-label filter.

use crate::error::{Result, SentimentError};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// A single labeled text sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Free-form text
    pub text: String,
    /// Sentiment label (e.g., "Positive", "Joy")
    pub label: String,
}

impl Record {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Record {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Load labeled records from a CSV file.
///
/// Header names are trimmed before `text_column` and `label_column` are
/// looked up; other columns are ignored. Rows whose text or label cell is
/// empty or absent are dropped.
///
/// # Example
/// ```no_run
/// use sentiment_forest::load_data;
///
/// let records = load_data("data/sentimentdataset.csv", "Text", "Sentiment")?;
/// println!("Loaded {} records", records.len());
/// # Ok::<(), sentiment_forest::SentimentError>(())
/// ```
pub fn load_data(
    path: impl AsRef<Path>,
    text_column: &str,
    label_column: &str,
) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let text_idx = column_index(&headers, text_column, path)?;
    let label_idx = column_index(&headers, label_column, path)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row?;
        match (non_empty(&row, text_idx), non_empty(&row, label_idx)) {
            (Some(text), Some(label)) => records.push(Record::new(text, label)),
            _ => dropped += 1,
        }
    }

    tracing::info!(
        "Loaded {} records from {} ({} dropped for missing text or label)",
        records.len(),
        path.display(),
        dropped
    );
    Ok(records)
}

fn column_index(headers: &StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SentimentError::MissingColumn {
            column: column.to_string(),
            path: path.display().to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        })
}

fn non_empty(row: &StringRecord, idx: usize) -> Option<&str> {
    row.get(idx).filter(|cell| !cell.is_empty())
}

/// Label → sample count, displayed in descending count order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    counts: BTreeMap<String, usize>,
}

impl LabelCounts {
    pub fn from_records(records: &[Record]) -> Self {
        Self::from_labels(records.iter().map(|r| r.label.as_str()))
    }

    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = BTreeMap::new();
        for label in labels {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        LabelCounts { counts }
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Labels in lexical order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Smallest class size, or `None` when empty.
    pub fn min_count(&self) -> Option<usize> {
        self.counts.values().copied().min()
    }

    /// `(label, count)` pairs sorted by count (descending), then label.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut pairs: Vec<(&str, usize)> =
            self.counts.iter().map(|(l, &c)| (l.as_str(), c)).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        pairs
    }

    fn labels_at_least(&self, min_count: usize) -> HashSet<&str> {
        self.counts
            .iter()
            .filter(|&(_, &c)| c >= min_count)
            .map(|(l, _)| l.as_str())
            .collect()
    }
}

impl fmt::Display for LabelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sorted = self.sorted();
        let width = sorted
            .iter()
            .map(|(l, _)| l.chars().count())
            .max()
            .unwrap_or(0)
            .max("label".len());
        writeln!(f, "{:<width$}  count", "label", width = width)?;
        for (label, count) in sorted {
            writeln!(f, "{:<width$}  {:>5}", label, count, width = width)?;
        }
        write!(f, "{} labels, {} samples", self.len(), self.total())
    }
}

/// Keep only records whose label occurs at least `min_count` times.
pub fn filter_rare_labels(records: Vec<Record>, min_count: usize) -> Vec<Record> {
    let counts = LabelCounts::from_records(&records);
    let keep: HashSet<String> = counts
        .labels_at_least(min_count)
        .into_iter()
        .map(str::to_string)
        .collect();
    records
        .into_iter()
        .filter(|r| keep.contains(&r.label))
        .collect()
}

/// Result of the two-stage rare-label filter.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub records: Vec<Record>,
    /// Counts before any label was dropped
    pub before: LabelCounts,
    /// Counts after dropping labels below `drop_below`
    pub after_first_pass: LabelCounts,
    /// Counts after dropping labels below `min_samples`
    pub after_second_pass: LabelCounts,
}

/// Drop labels with fewer than `drop_below` samples, recount, then drop
/// labels with fewer than `min_samples`.
///
/// The first pass removes obviously unusable labels so the intermediate
/// table is readable before the final threshold applies.
pub fn filter_labels(
    records: Vec<Record>,
    drop_below: usize,
    min_samples: usize,
) -> FilterOutcome {
    let before = LabelCounts::from_records(&records);
    let records = filter_rare_labels(records, drop_below);
    let after_first_pass = LabelCounts::from_records(&records);
    tracing::debug!(
        "First label filter (< {}): {} -> {} records",
        drop_below,
        before.total(),
        records.len()
    );

    let mid = records.len();
    let records = filter_rare_labels(records, min_samples);
    let after_second_pass = LabelCounts::from_records(&records);
    tracing::debug!(
        "Second label filter (< {}): {} -> {} records",
        min_samples,
        mid,
        records.len()
    );

    FilterOutcome {
        records,
        before,
        after_first_pass,
        after_second_pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scenario_records() -> Vec<Record> {
        let mut records = Vec::new();
        for _ in 0..10 {
            records.push(Record::new("great day", "positive"));
        }
        for _ in 0..10 {
            records.push(Record::new("bad day", "negative"));
        }
        records.push(Record::new("meh", "neutral"));
        records
    }

    #[test]
    fn test_filter_removes_singleton_label() {
        let outcome = filter_labels(scenario_records(), 2, 5);
        assert_eq!(outcome.before.len(), 3);
        assert_eq!(outcome.before.get("neutral"), 1);
        assert_eq!(outcome.before.total(), 21);
        assert_eq!(outcome.after_first_pass.len(), 2);
        assert_eq!(outcome.after_second_pass.len(), 2);
        assert_eq!(outcome.after_second_pass.get("positive"), 10);
        assert_eq!(outcome.after_second_pass.get("negative"), 10);
        assert_eq!(outcome.after_second_pass.get("neutral"), 0);
        assert_eq!(outcome.records.len(), 20);
    }

    #[test]
    fn test_filter_is_monotonic_and_respects_minimum() {
        let mut records = Vec::new();
        for (label, n) in [("a", 1), ("b", 2), ("c", 4), ("d", 5), ("e", 9)] {
            for i in 0..n {
                records.push(Record::new(format!("text {}", i), label));
            }
        }
        let outcome = filter_labels(records, 2, 5);

        let first: HashSet<&str> = outcome.after_first_pass.labels().collect();
        let second: HashSet<&str> = outcome.after_second_pass.labels().collect();
        assert!(second.is_subset(&first));
        assert_eq!(first, HashSet::from(["b", "c", "d", "e"]));
        assert_eq!(second, HashSet::from(["d", "e"]));
        assert!(outcome.after_second_pass.min_count().unwrap() >= 5);
        assert!(outcome.records.iter().all(|r| second.contains(r.label.as_str())));
    }

    #[test]
    fn test_label_counts_sorted_by_count_then_label() {
        let counts = LabelCounts::from_labels(["b", "a", "c", "c", "a", "c"]);
        assert_eq!(counts.sorted(), vec![("c", 3), ("a", 2), ("b", 1)]);
        assert_eq!(counts.total(), 6);
        let table = counts.to_string();
        assert!(table.starts_with("label"));
        assert!(table.ends_with("3 labels, 6 samples"));
    }

    #[test]
    fn test_load_data_trims_headers_and_drops_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "id, Text ,Sentiment  ,User").unwrap();
        writeln!(file, "1,Loving this!,Positive,alice").unwrap();
        writeln!(file, "2,,Negative,bob").unwrap();
        writeln!(file, "3,No label here,,carol").unwrap();
        writeln!(file, "4,\"Quoted, with comma\",Neutral,dave").unwrap();
        writeln!(file, "5,short row").unwrap();
        drop(file);

        let records = load_data(&path, "Text", "Sentiment").unwrap();
        assert_eq!(
            records,
            vec![
                Record::new("Loving this!", "Positive"),
                Record::new("Quoted, with comma", "Neutral"),
            ]
        );
    }

    #[test]
    fn test_load_data_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "Text,Label\nhello,Positive\n").unwrap();

        let err = load_data(&path, "Text", "Sentiment").unwrap_err();
        assert!(matches!(
            err,
            SentimentError::MissingColumn { ref column, .. } if column == "Sentiment"
        ));
    }

    #[test]
    fn test_load_data_missing_file() {
        let err = load_data("/nonexistent/data.csv", "Text", "Sentiment").unwrap_err();
        assert!(matches!(err, SentimentError::Io(_)));
    }
}
