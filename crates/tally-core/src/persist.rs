//! Handing a finished document to storage.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tally_model::{EventDocument, ModelError};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid document in {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("save refused: {reason}")]
    Refused { reason: String },
}

/// Receives the regenerated document on save.
pub trait Persistence {
    fn save(&mut self, document: &Value) -> Result<(), PersistenceError>;
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<EventDocument, PersistenceError> {
        let source = std::fs::read_to_string(&self.path).map_err(|source| self.io(source))?;
        EventDocument::from_json_str(&source).map_err(|source| PersistenceError::Document {
            path: self.path.clone(),
            source,
        })
    }

    fn io(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Persistence for JsonFileStore {
    fn save(&mut self, document: &Value) -> Result<(), PersistenceError> {
        let mut encoded = serde_json::to_vec_pretty(document)?;
        encoded.push(b'\n');

        // Write next to the target so the rename stays on one filesystem.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|source| self.io(source))?;
        temp.write_all(&encoded).map_err(|source| self.io(source))?;
        temp.flush().map_err(|source| self.io(source))?;
        temp.persist(&self.path)
            .map_err(|error| self.io(error.error))?;

        tracing::info!(path = %self.path.display(), bytes = encoded.len(), "saved document");
        Ok(())
    }
}
