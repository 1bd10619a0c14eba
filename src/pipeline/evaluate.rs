//! Model evaluation and results reporting.

use crate::random_forest::ForestParams;
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Fraction of positions where `y_pred` equals `y_true`.
pub fn accuracy_score(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Confusion matrix with rows = true label, columns = predicted label,
/// both indexed by position in `labels`. Pairs with an unknown label are skipped.
pub fn confusion_matrix(y_true: &[String], y_pred: &[String], labels: &[String]) -> Array2<usize> {
    let k = labels.len();
    let mut matrix = Array2::<usize>::zeros((k, k));
    for (t, p) in y_true.iter().zip(y_pred) {
        if let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) {
            matrix[[i, j]] += 1;
        }
    }
    matrix
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-label precision, recall, F1 and support, plus accuracy and averages.
///
/// Labels are the sorted union of true and predicted labels. A metric whose
/// denominator is zero is reported as 0.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub labels: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    #[serde(skip_serializing)]
    pub confusion: Array2<usize>,
}

impl ClassificationReport {
    pub fn new(y_true: &[String], y_pred: &[String]) -> Self {
        let labels: Vec<String> = y_true
            .iter()
            .chain(y_pred)
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let confusion = confusion_matrix(y_true, y_pred, &labels);

        let per_label: Vec<LabelMetrics> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = confusion[[i, i]];
                let predicted = confusion.column(i).sum();
                let support = confusion.row(i).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                LabelMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total: usize = per_label.iter().map(|m| m.support).sum();
        let k = per_label.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: per_label.iter().map(|m| m.precision).sum::<f64>() / k,
            recall: per_label.iter().map(|m| m.recall).sum::<f64>() / k,
            f1: per_label.iter().map(|m| m.f1).sum::<f64>() / k,
            support: total,
        };
        let weighted = |metric: fn(&LabelMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_label
                    .iter()
                    .map(|m| metric(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        ClassificationReport {
            labels: per_label,
            accuracy: accuracy_score(y_true, y_pred),
            macro_avg,
            weighted_avg,
            confusion,
        }
    }

    pub fn label(&self, label: &str) -> Option<&LabelMetrics> {
        self.labels.iter().find(|m| m.label == label)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|m| m.label.chars().count())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            width = width
        )?;
        writeln!(f)?;
        for m in &self.labels {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label,
                m.precision,
                m.recall,
                m.f1,
                m.support,
                width = width
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support,
            width = width
        )?;
        let averages = [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ];
        for (name, avg) in averages {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name,
                avg.precision,
                avg.recall,
                avg.f1,
                avg.support,
                width = width
            )?;
        }
        Ok(())
    }
}

/// Print the final evaluation block: best parameters, CV score, test accuracy
/// and the classification report.
pub fn print_results(
    best_params: &ForestParams,
    best_cv_score: f64,
    report: &ClassificationReport,
) {
    println!("===================================================================\n");
    println!("Final Results\n");
    println!("Best hyperparameters: {}", best_params);
    println!("Best CV accuracy:     {:.4}", best_cv_score);
    println!("Test accuracy:        {:.4}\n", report.accuracy);
    println!("Classification report:\n");
    print!("{}", report);
    println!("\n===================================================================\n");
}
