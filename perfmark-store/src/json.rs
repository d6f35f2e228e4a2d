//! JSON File Store
//!
//! All histories live in one JSON document:
//!
//! ```text
//! {
//!   "schema": "perfmark-history",
//!   "version": 1,
//!   "histories": { "<identifier>": [Measurement, ...] }
//! }
//! ```
//!
//! Each write goes to a sibling temp file that is then renamed over the
//! document, so readers never observe a half-written file.

use crate::{HistoryStore, StoreError};
use perfmark_core::Measurement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Schema identifier written into every document
pub const HISTORY_SCHEMA: &str = "perfmark-history";

/// Document version understood by this build
pub const HISTORY_VERSION: u32 = 1;

/// On-disk document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    /// Schema identifier
    pub schema: String,
    /// Schema version
    pub version: u32,
    /// Histories keyed by identifier, oldest entry first
    #[serde(default)]
    pub histories: BTreeMap<String, Vec<Measurement>>,
}

impl Default for HistoryDocument {
    fn default() -> Self {
        Self {
            schema: HISTORY_SCHEMA.to_string(),
            version: HISTORY_VERSION,
            histories: BTreeMap::new(),
        }
    }
}

impl HistoryDocument {
    fn validate(self) -> Result<Self, StoreError> {
        if self.schema != HISTORY_SCHEMA {
            return Err(StoreError::InvalidSchema(self.schema));
        }
        if self.version != HISTORY_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                expected: HISTORY_VERSION,
            });
        }
        Ok(self)
    }
}

/// Store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document (empty if the file does not exist)
    pub fn read_document(&self) -> Result<HistoryDocument, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HistoryDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        let document: HistoryDocument = serde_json::from_str(&content)?;
        document.validate()
    }

    /// Replace the whole document
    pub fn write_document(&self, document: &HistoryDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::trace!(
            target: "perfmark",
            path = %self.path.display(),
            identifiers = document.histories.len(),
            "history document written"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HistoryStore for JsonFileStore {
    fn load_all(&self) -> Result<BTreeMap<String, Vec<Measurement>>, StoreError> {
        Ok(self.read_document()?.histories)
    }

    fn save(&mut self, identifier: &str, history: &[Measurement]) -> Result<(), StoreError> {
        let mut document = self.read_document()?;
        if history.is_empty() {
            document.histories.remove(identifier);
        } else {
            document
                .histories
                .insert(identifier.to_string(), history.to_vec());
        }
        self.write_document(&document)
    }

    fn remove(&mut self, identifier: &str) -> Result<bool, StoreError> {
        let mut document = self.read_document()?;
        let existed = document.histories.remove(identifier).is_some();
        if existed {
            self.write_document(&document)?;
        }
        Ok(existed)
    }
}
