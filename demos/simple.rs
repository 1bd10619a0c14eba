//! Simple example of using the sentiment-forest library
//!
//! Train a model first, then run with:
//! ```
//! cargo run --example simple
//! ```
use sentiment_forest::api::Predictor;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sentiment Forest - Simple Example\n");

    println!("Loading model...");
    let predictor = Predictor::new()?;

    let info = predictor.model_info();
    println!(
        "✓ Model loaded: {} trees, {} features, {} labels\n",
        info.n_trees,
        info.n_features,
        info.labels.len()
    );

    let examples = vec![
        "Enjoying a beautiful day at the park!",
        "Traffic was terrible this morning.",
        "Just finished an amazing workout session!",
        "Feeling lonely on a rainy evening.",
    ];

    println!("Making predictions...\n");
    println!("{}", "=".repeat(70));

    for text in examples {
        let result = predictor.predict(text)?;

        println!("\nText: \"{}\"", text);
        println!(
            "Predicted Sentiment: {} (confidence: {:.1}%)",
            result.label,
            result.confidence * 100.0
        );
        println!("{}", "-".repeat(70));
    }

    println!("\n✓ Done!");

    Ok(())
}
