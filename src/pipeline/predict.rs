//! Single text prediction using trained models.

use crate::api::{PredictionResult, Predictor};
use crate::error::Result;
use crate::model_loader::ModelFiles;
use std::time::Instant;

/// Load the artifacts in `files`, classify `text` and print the result.
pub fn predict_single(text: &str, files: &ModelFiles) -> Result<PredictionResult> {
    println!("\n===================================================================");
    println!("  Sentiment Classifier: Prediction");
    println!("===================================================================\n");

    println!("Loading model...");
    let predictor = Predictor::from_files(files)?;
    let info = predictor.model_info();
    println!(
        "  ✓ Random forest loaded ({} trees, {} labels)",
        info.n_trees,
        info.labels.len()
    );
    println!("  ✓ TF-IDF loaded ({} features)\n", info.n_features);

    println!("Input text:");
    let display = if text.chars().count() > 100 {
        format!("{}...", text.chars().take(100).collect::<String>())
    } else {
        text.to_string()
    };
    println!("  {}\n", display);

    let start = Instant::now();
    let result = predictor.predict(text)?;

    println!("===================================================================");
    print!("{}", result);
    println!("  Time: {:.3}s", start.elapsed().as_secs_f64());
    println!("===================================================================\n");

    Ok(result)
}
