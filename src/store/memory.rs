//! Offline content store backed by a dataset export.

use super::{ContentStore, Params, StoreError, groq};
use crate::config::Perspective;
use serde_json::Value;
use std::{fs, path::Path, sync::Arc};

/// Documents held in memory, queried with the local GROQ subset.
///
/// Exports are NDJSON, one document per line. Under the published
/// perspective, `drafts.*` documents are dropped at load time.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Vec<Value>>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Value>, perspective: Perspective) -> Self {
        let documents = match perspective {
            Perspective::Raw => documents,
            Perspective::Published => documents.into_iter().filter(|doc| !is_draft(doc)).collect(),
        };
        Self {
            documents: Arc::new(documents),
        }
    }

    /// Load an NDJSON export; blank lines are skipped.
    pub fn open(path: &Path, perspective: Perspective) -> Result<Self, StoreError> {
        let text =
            fs::read_to_string(path).map_err(|err| StoreError::ExportIo(path.to_path_buf(), err))?;

        let mut documents = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let doc = serde_json::from_str(line).map_err(|source| StoreError::ExportLine {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
            documents.push(doc);
        }

        Ok(Self::new(documents, perspective))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn is_draft(doc: &Value) -> bool {
    doc.get("_id")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with("drafts."))
}

impl ContentStore for MemoryStore {
    async fn fetch(&self, query: &str, params: &Params) -> Result<Value, StoreError> {
        groq::parse(query)?.evaluate(&self.documents, params)
    }
}
