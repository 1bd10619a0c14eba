//! Command-line interface for the sentiment classifier.

use super::config::Config;
use super::predict::predict_single;
use super::train::train_model;
use crate::model_loader::ModelFiles;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sentiment-forest",
    version,
    about = "Train a TF-IDF + random forest sentiment classifier, then classify text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a new model (saves to the configured model directory)
    Train(TrainArgs),
    /// Predict the sentiment of a single text (requires a trained model)
    Predict(PredictArgs),
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the TOML configuration; built-in defaults are used if it does not exist
    #[arg(long, env = "SENTIMENT_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Override `[output].model_dir`
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Override `[data].csv_path`
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Text to classify
    pub text: String,

    #[command(flatten)]
    pub common: ConfigArgs,
}

impl ConfigArgs {
    /// Load the configuration file and apply command-line overrides.
    fn load(&self) -> Result<Config> {
        let mut config = Config::load_or_default(&self.config).with_context(|| {
            format!(
                "failed to load configuration from {}",
                self.config.display()
            )
        })?;
        if let Some(dir) = &self.model_dir {
            config.output.model_dir = dir.clone();
        }
        Ok(config)
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut config = args.common.load()?;
    if let Some(data) = args.data {
        config.data.csv_path = data;
    }
    tracing::info!("Training on {}", config.data.csv_path.display());

    let outcome = train_model(&config).context("training failed")?;
    println!(
        "Best parameters: {}\nTest accuracy: {:.4}",
        outcome.best_params, outcome.test_accuracy
    );
    println!(
        "To predict: sentiment-forest predict \"your text here\" --model-dir {}",
        config.output.model_dir.display()
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let config = args.common.load()?;
    let files = ModelFiles::from_output(&config.output);
    predict_single(&args.text, &files).context("prediction failed")?;
    Ok(())
}
