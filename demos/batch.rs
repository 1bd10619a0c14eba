//! Batch prediction example
//!
//! Train a model first, then run with:
//! ```
//! cargo run --example batch
//! ```

use sentiment_forest::api::Predictor;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sentiment Forest - Batch Prediction Example\n");

    let predictor = Predictor::new()?;
    println!("✓ Model loaded\n");

    let texts = vec![
        "Celebrating a milestone with friends tonight",
        "Lost my keys and missed the bus",
        "The sunset over the lake was breathtaking",
        "Another rainy Monday, nothing to look forward to",
        "Grateful for the support of my family",
        "Frustrated with the endless delays at the airport",
        "Curious about the new exhibit at the museum",
        "Nervous about tomorrow's presentation",
    ];

    println!("Predicting {} texts in batch...\n", texts.len());

    let start = Instant::now();
    let results = predictor.predict_batch(&texts)?;
    let elapsed = start.elapsed();

    println!("{}", "=".repeat(90));
    println!("{:<50} | {:^14} | {:>8}", "Text (truncated)", "Sentiment", "Conf %");
    println!("{}", "=".repeat(90));

    for (text, result) in texts.iter().zip(results.iter()) {
        let truncated = if text.chars().count() > 47 {
            format!("{}...", text.chars().take(47).collect::<String>())
        } else {
            text.to_string()
        };

        println!(
            "{:<50} | {:^14} | {:>7.1}%",
            truncated,
            result.label,
            result.confidence * 100.0
        );
    }

    println!("{}", "=".repeat(90));
    println!("\n✓ Batch prediction complete");
    println!(
        "  Time: {:.2}ms ({:.2}ms per text)",
        elapsed.as_millis(),
        elapsed.as_millis() as f64 / texts.len() as f64
    );

    Ok(())
}
