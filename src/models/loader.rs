//! Model artifact loading and validation.
//!
//! Model and label files must live under the `models/` directory of the
//! configured base path. Model files can be checked against a SHA-256 digest
//! before they are handed to a backend.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Model path not allowed: {0}")]
    PathNotAllowed(PathBuf),

    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    #[error("Hash mismatch for {path}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validated path inside the allowed model directory.
#[derive(Debug, Clone)]
pub struct ModelPath {
    path: PathBuf,
}

impl ModelPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

/// Directory under the base path that artifacts are loaded from.
const MODEL_DIR: &str = "models";

/// Loads and validates model artifacts.
#[derive(Debug, Clone)]
pub struct ModelLoader {
    base_path: PathBuf,
}

impl ModelLoader {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve `relative_path` and reject anything outside `models/`.
    pub fn validate_path(&self, relative_path: &str) -> Result<ModelPath, LoadError> {
        let full_path = self.base_path.join(relative_path);
        let canonical = full_path
            .canonicalize()
            .map_err(|_| LoadError::NotFound(full_path.clone()))?;

        let allowed = self
            .base_path
            .join(MODEL_DIR)
            .canonicalize()
            .map(|dir| canonical.starts_with(dir))
            .unwrap_or(false);

        if !allowed || !canonical.is_file() {
            return Err(LoadError::PathNotAllowed(canonical));
        }

        Ok(ModelPath { path: canonical })
    }

    /// Read class labels, one per line. Blank lines are skipped.
    pub fn load_labels(&self, labels_path: &ModelPath) -> Result<Vec<String>, LoadError> {
        let reader = BufReader::new(File::open(labels_path.as_path())?);
        let mut labels = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let label = line.trim();
            if !label.is_empty() {
                labels.push(label.to_string());
            }
        }

        if labels.is_empty() {
            return Err(LoadError::InvalidFormat(format!(
                "labels file {} is empty",
                labels_path.as_path().display()
            )));
        }
        Ok(labels)
    }

    /// Check the file against an expected hex SHA-256 digest.
    pub fn verify_sha256(&self, model_path: &ModelPath, expected: &str) -> Result<(), LoadError> {
        let expected = expected.trim().to_ascii_lowercase();
        if expected.len() != 64 || hex::decode(&expected).is_err() {
            return Err(LoadError::InvalidFormat(
                "sha256 must be 64 hex characters".into(),
            ));
        }

        let actual = file_sha256(model_path.as_path())?;
        if actual != expected {
            return Err(LoadError::HashMismatch {
                path: model_path.as_path().to_path_buf(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Hex SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String, LoadError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
