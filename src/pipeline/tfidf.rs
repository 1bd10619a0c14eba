//! TF-IDF (Term Frequency-Inverse Document Frequency) vectorizer implementation.
//!
//! Documents are tokenized into words of two or more word characters, expanded
//! into n-grams, and weighted by raw term count times smoothed IDF
//! (`ln((1 + n) / (1 + df)) + 1`). Each output row is L2-normalised.

use super::config::FeaturesConfig;
use crate::error::{Result, SentimentError};
use crate::sparse::SparseVector;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// TF-IDF vectorizer for converting text to sparse numerical features.
///
/// This implementation:
/// - Lowercases and tokenizes on runs of two or more word characters
/// - Builds n-grams over the `ngram_range` (joined with a single space)
/// - Keeps terms with document frequency in `[min_df, max_df * n_docs]`
/// - Optionally keeps only the `max_features` most frequent terms
/// - Applies smoothed IDF weighting and L2 normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Smallest and largest n-gram length
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Optional vocabulary cap
    pub max_features: Option<usize>,
    /// Term to feature index mapping (indices follow lexical term order)
    pub vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency for each feature
    pub idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer: unigrams, no document-frequency pruning.
    pub fn new() -> Self {
        TfidfVectorizer {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            max_features: None,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// Create an unfitted vectorizer from the `[features]` configuration.
    pub fn from_config(config: &FeaturesConfig) -> Self {
        let mut vectorizer = Self::new()
            .with_ngram_range(config.ngram_range.0, config.ngram_range.1)
            .with_min_df(config.min_df)
            .with_max_df(config.max_df);
        vectorizer.max_features = config.max_features;
        vectorizer
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    #[must_use]
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Number of output features (vocabulary size).
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    /// Split a document into its terms: lowercase word tokens and their n-grams.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        if min_n == 1 {
            terms.extend(tokens.iter().map(|t| t.to_string()));
        }
        for n in min_n.max(2)..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    /// Check that a deserialized vocabulary agrees with its IDF table.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        if let Some((term, &idx)) = self
            .vocabulary
            .iter()
            .find(|(_, &idx)| idx >= self.idf.len())
        {
            return Err(format!(
                "term '{}' maps to feature {} of {}",
                term,
                idx,
                self.idf.len()
            ));
        }
        Ok(())
    }

    /// Fit the vectorizer on a collection of documents.
    ///
    /// This builds the vocabulary and calculates IDF values. Fails when no
    /// documents are given or when pruning leaves no terms.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(SentimentError::insufficient(
                "cannot fit a vectorizer on zero documents",
            ));
        }
        let n_docs = documents.len();
        let max_doc_count = self.max_df * n_docs as f64;
        if (self.min_df as f64) > max_doc_count {
            return Err(SentimentError::config(format!(
                "max_df={} corresponds to fewer documents than min_df={}",
                self.max_df, self.min_df
            )));
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let terms = self.analyze(doc);
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|&(_, df)| df >= self.min_df && df as f64 <= max_doc_count)
            .collect();

        if let Some(limit) = self.max_features {
            kept.sort_by(|a, b| {
                let fa = term_freq.get(&a.0).copied().unwrap_or(0);
                let fb = term_freq.get(&b.0).copied().unwrap_or(0);
                fb.cmp(&fa).then_with(|| a.0.cmp(&b.0))
            });
            kept.truncate(limit);
        }

        if kept.is_empty() {
            return Err(SentimentError::EmptyVocabulary);
        }

        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let n = n_docs as f64;
        self.vocabulary = BTreeMap::new();
        self.idf = Vec::with_capacity(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            self.idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            self.vocabulary.insert(term, idx);
        }

        tracing::debug!(
            "Fitted TF-IDF on {} documents: {} terms",
            n_docs,
            self.vocabulary.len()
        );
        Ok(())
    }

    /// Fit on `documents` and return their feature rows.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        Ok(self.transform_batch(documents))
    }

    /// Transform a document into an L2-normalised TF-IDF feature vector.
    ///
    /// Terms outside the vocabulary are ignored; an unfitted vectorizer
    /// yields empty vectors.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row = SparseVector::from_pairs(
            counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * self.idf[idx]))
                .collect(),
        );
        row.normalize();
        row
    }

    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents
            .iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_analyze_unigrams_and_bigrams() {
        let v = TfidfVectorizer::new().with_ngram_range(1, 2);
        assert_eq!(
            v.analyze("Good day, a Sunny day"),
            vec!["good", "day", "sunny", "day", "good day", "day sunny", "sunny day"]
        );
    }

    #[test]
    fn test_analyze_bigrams_only() {
        let v = TfidfVectorizer::new().with_ngram_range(2, 2);
        assert_eq!(v.analyze("one two three"), vec!["one two", "two three"]);
        assert!(v.analyze("single").is_empty());
    }

    #[test]
    fn test_min_df_and_max_df_pruning() {
        let corpus = docs(&[
            "the cat sat",
            "the cat ran",
            "the dog sat",
            "the bird flew",
        ]);
        let mut v = TfidfVectorizer::new().with_min_df(2).with_max_df(0.95);
        v.fit(&corpus).unwrap();
        // "the" appears in 4/4 documents (> 0.95 * 4) and is pruned;
        // "dog", "ran", "bird", "flew" appear once.
        let terms: Vec<&str> = v.vocabulary.keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["cat", "sat"]);
        assert_eq!(v.vocabulary["cat"], 0);
        assert_eq!(v.vocabulary["sat"], 1);
        assert_eq!(v.n_features(), 2);
    }

    #[test]
    fn test_smoothed_idf() {
        let corpus = docs(&["apple banana", "apple cherry", "banana cherry apple"]);
        let mut v = TfidfVectorizer::new();
        v.fit(&corpus).unwrap();
        let apple = v.idf[v.vocabulary["apple"]];
        let banana = v.idf[v.vocabulary["banana"]];
        assert!((apple - 1.0).abs() < 1e-12);
        assert!((banana - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_l2_normalised_and_ignores_unknown_terms() {
        let corpus = docs(&["good movie", "bad movie", "good plot", "bad plot"]);
        let mut v = TfidfVectorizer::new().with_min_df(2);
        v.fit(&corpus).unwrap();

        let row = v.transform("Good GOOD movie, unknown words");
        assert!((row.norm() - 1.0).abs() < 1e-12);
        assert_eq!(row.nnz(), 2);
        assert!(row.get(v.vocabulary["good"]) > row.get(v.vocabulary["movie"]));

        assert!(v.transform("nothing known here").is_empty());
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let corpus = docs(&["alpha", "beta", "gamma"]);
        let mut v = TfidfVectorizer::new().with_min_df(2);
        assert!(matches!(v.fit(&corpus), Err(SentimentError::EmptyVocabulary)));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let corpus = docs(&["a1 b2 b2 c3", "b2 c3", "c3 c3"]);
        let mut v = TfidfVectorizer::new().with_max_features(2);
        v.fit(&corpus).unwrap();
        let terms: Vec<&str> = v.vocabulary.keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["b2", "c3"]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_term() {
        let mut v = TfidfVectorizer::new();
        v.fit(&docs(&["good movie", "bad movie", "good plot"])).unwrap();
        assert!(v.validate().is_ok());

        v.vocabulary.insert("good".to_string(), 999);
        assert!(v.validate().is_err());

        v.vocabulary.remove("good");
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let corpus = docs(&["good good day", "bad day", "good night", "bad night day"]);
        let mut a = TfidfVectorizer::new().with_ngram_range(1, 2);
        let mut b = a.clone();
        a.fit(&corpus).unwrap();
        b.fit(&corpus).unwrap();
        assert_eq!(a, b);
    }
}
