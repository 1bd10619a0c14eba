//! Saving and loading of the trained artifacts.
//!
//! Each artifact is a bincode file: a small header (magic bytes, format
//! version, artifact kind, crate version) followed by the serialized model.

use super::config::OutputConfig;
use super::tfidf::TfidfVectorizer;
use crate::error::{Result, SentimentError};
use crate::random_forest::RandomForest;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const MAGIC: [u8; 4] = *b"SFRT";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Classifier,
    Vectorizer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactHeader {
    magic: [u8; 4],
    format_version: u32,
    kind: ArtifactKind,
    crate_version: String,
}

/// A model that can be stored as an artifact of a fixed kind.
pub trait Artifact: Serialize + DeserializeOwned {
    const KIND: ArtifactKind;

    /// Internal consistency check run on every loaded artifact.
    fn validate(&self) -> std::result::Result<(), String>;
}

impl Artifact for RandomForest {
    const KIND: ArtifactKind = ArtifactKind::Classifier;

    fn validate(&self) -> std::result::Result<(), String> {
        RandomForest::validate(self)
    }
}

impl Artifact for TfidfVectorizer {
    const KIND: ArtifactKind = ArtifactKind::Vectorizer;

    fn validate(&self) -> std::result::Result<(), String> {
        TfidfVectorizer::validate(self)
    }
}

/// Write `value` to `path`, replacing any existing file.
pub fn save_artifact<T: Artifact>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let header = ArtifactHeader {
        magic: MAGIC,
        format_version: FORMAT_VERSION,
        kind: T::KIND,
        crate_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &header)?;
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    tracing::debug!("Wrote {:?} artifact to {}", T::KIND, path.display());
    Ok(())
}

/// Read an artifact written by [`save_artifact`], checking its header and
/// the consistency of the payload.
///
/// The whole file is read up front; decoding from the in-memory slice turns
/// a corrupt length prefix into an error instead of a huge allocation.
pub fn load_artifact<T: Artifact>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SentimentError::ArtifactNotFound(path.display().to_string()));
    }
    let invalid = |reason: String| SentimentError::artifact(path.display().to_string(), reason);
    let bytes = std::fs::read(path)?;

    let header: ArtifactHeader = bincode::deserialize(&bytes)
        .map_err(|e| invalid(format!("unreadable header: {}", e)))?;
    if header.magic != MAGIC {
        return Err(invalid("not a sentiment-forest artifact".to_string()));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(invalid(format!(
            "format version {} is not supported (expected {})",
            header.format_version, FORMAT_VERSION
        )));
    }
    if header.kind != T::KIND {
        return Err(invalid(format!(
            "expected a {:?} artifact, found {:?}",
            T::KIND, header.kind
        )));
    }

    let offset = bincode::serialized_size(&header)? as usize;
    let payload = bytes.get(offset..).unwrap_or_default();
    let value: T = bincode::deserialize(payload)
        .map_err(|e| invalid(format!("corrupt payload: {}", e)))?;
    value.validate().map_err(invalid)?;
    Ok(value)
}

/// Save the fitted classifier and vectorizer into `output.model_dir`.
pub fn save_model(
    forest: &RandomForest,
    vectorizer: &TfidfVectorizer,
    output: &OutputConfig,
) -> Result<()> {
    std::fs::create_dir_all(&output.model_dir)?;

    println!("Saving model...");

    let model_path = output.model_path();
    let vectorizer_path = output.vectorizer_path();
    save_artifact(forest, &model_path)?;
    save_artifact(vectorizer, &vectorizer_path)?;

    println!("\n✓ Model saved:");
    println!("  - {}", model_path.display());
    println!("  - {}", vectorizer_path.display());
    println!();

    Ok(())
}

/// Write a serializable summary as pretty JSON.
pub fn save_summary<T: Serialize>(summary: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    tracing::info!("Training summary written to {}", path.display());
    Ok(())
}
