//! Stratified shuffle split into training and held-out test records.

use super::config::TestSize;
use super::data::{LabelCounts, Record};
use crate::error::{Result, SentimentError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<Record>,
    pub test: Vec<Record>,
}

/// Shuffle and split `records` so each label keeps its share of the test set.
///
/// Per-label test counts are `floor(count * n_test / n)`, with the leftover
/// slots going to the labels with the largest fractional remainder. A label
/// never gives all of its samples to the test set, so every test label is
/// also present in training.
pub fn stratified_split(
    records: Vec<Record>,
    test_size: TestSize,
    seed: u64,
) -> Result<TrainTestSplit> {
    let counts = LabelCounts::from_records(&records);
    let n = records.len();
    let n_classes = counts.len();

    if let Some((label, count)) = counts.sorted().into_iter().find(|&(_, c)| c < 2) {
        return Err(SentimentError::insufficient(format!(
            "the least populated class '{}' has only {} member, which is too few; \
             the minimum number of members in any class cannot be less than 2",
            label, count
        )));
    }

    let n_test = test_size.resolve(n)?;
    let n_train = n - n_test;
    if n_test < n_classes {
        return Err(SentimentError::insufficient(format!(
            "the test_size = {} should be greater or equal to the number of classes = {}",
            n_test, n_classes
        )));
    }
    if n_train < n_classes {
        return Err(SentimentError::insufficient(format!(
            "the train_size = {} should be greater or equal to the number of classes = {}",
            n_train, n_classes
        )));
    }

    let allocation = allocate_test_counts(&counts, n, n_test);

    let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        by_label.entry(record.label.as_str()).or_default().push(i);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(n_train);
    let mut test_idx = Vec::with_capacity(n_test);
    for (label, mut indices) in by_label {
        indices.shuffle(&mut rng);
        let take = allocation.get(label).copied().unwrap_or(0);
        test_idx.extend_from_slice(&indices[..take]);
        train_idx.extend_from_slice(&indices[take..]);
    }
    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    let mut slots: Vec<Option<Record>> = records.into_iter().map(Some).collect();
    let mut take_all = |idx: &[usize]| -> Vec<Record> {
        idx.iter().filter_map(|&i| slots[i].take()).collect()
    };
    let train = take_all(&train_idx);
    let test = take_all(&test_idx);

    tracing::info!(
        "Split {} records into {} train / {} test (seed {})",
        n,
        train.len(),
        test.len(),
        seed
    );
    Ok(TrainTestSplit { train, test })
}

fn allocate_test_counts<'a>(
    counts: &'a LabelCounts,
    n: usize,
    n_test: usize,
) -> BTreeMap<&'a str, usize> {
    let mut allocation = BTreeMap::new();
    let mut order: Vec<(&str, usize, f64)> = Vec::with_capacity(counts.len());
    let mut assigned = 0;

    for (label, count) in counts.sorted() {
        let exact = count as f64 * n_test as f64 / n as f64;
        let floor = (exact.floor() as usize).min(count - 1);
        allocation.insert(label, floor);
        assigned += floor;
        order.push((label, count, exact - exact.floor()));
    }

    // Largest remainder first, then larger class, then label.
    order.sort_by(|a, b| {
        b.2.total_cmp(&a.2)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.cmp(b.0))
    });

    let mut remaining = n_test.saturating_sub(assigned);
    while remaining > 0 {
        let mut progressed = false;
        for &(label, count, _) in &order {
            if remaining == 0 {
                break;
            }
            if let Some(slot) = allocation.get_mut(label) {
                if *slot + 1 < count {
                    *slot += 1;
                    remaining -= 1;
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn records(groups: &[(&str, usize)]) -> Vec<Record> {
        groups
            .iter()
            .flat_map(|&(label, n)| {
                (0..n).map(move |i| Record::new(format!("{} text {}", label, i), label))
            })
            .collect()
    }

    #[test]
    fn test_split_sizes_and_stratification() {
        let data = records(&[("positive", 20), ("negative", 10), ("neutral", 6)]);
        let split = stratified_split(data, TestSize::Count(12), 42).unwrap();
        assert_eq!(split.test.len(), 12);
        assert_eq!(split.train.len(), 24);

        let test_counts = LabelCounts::from_records(&split.test);
        // 20*12/36 = 6.67, 10*12/36 = 3.33, 6*12/36 = 2.0
        assert_eq!(test_counts.get("positive"), 7);
        assert_eq!(test_counts.get("negative"), 3);
        assert_eq!(test_counts.get("neutral"), 2);
    }

    #[test]
    fn test_every_test_label_is_in_train() {
        let data = records(&[("a", 2), ("b", 2), ("c", 2), ("d", 30)]);
        let split = stratified_split(data, TestSize::Count(10), 7).unwrap();
        let train_labels: HashSet<&str> = split.train.iter().map(|r| r.label.as_str()).collect();
        assert!(split.test.iter().all(|r| train_labels.contains(r.label.as_str())));
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let data = records(&[("x", 8), ("y", 8)]);
        let a = stratified_split(data.clone(), TestSize::Count(4), 42).unwrap();
        let b = stratified_split(data, TestSize::Count(4), 42).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);
    }

    #[test]
    fn test_no_record_lost_or_duplicated() {
        let data = records(&[("x", 9), ("y", 5)]);
        let split = stratified_split(data.clone(), TestSize::Fraction(0.3), 3).unwrap();
        let mut all: Vec<String> = split
            .train
            .iter()
            .chain(&split.test)
            .map(|r| r.text.clone())
            .collect();
        all.sort();
        let mut expected: Vec<String> = data.into_iter().map(|r| r.text).collect();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_rejects_singleton_class() {
        let data = records(&[("x", 10), ("y", 1)]);
        let err = stratified_split(data, TestSize::Count(4), 42).unwrap_err();
        assert!(matches!(err, SentimentError::InsufficientData(_)));
    }

    #[test]
    fn test_rejects_test_smaller_than_class_count() {
        let data = records(&[("x", 10), ("y", 10), ("z", 10)]);
        assert!(stratified_split(data, TestSize::Count(2), 42).is_err());
    }

    #[test]
    fn test_rejects_train_smaller_than_class_count() {
        let data = records(&[("x", 2), ("y", 2), ("z", 2)]);
        assert!(stratified_split(data, TestSize::Count(4), 42).is_err());
    }
}
