//! In-memory document records, keyed by uploaded file name.

use crate::dtos::DocumentMap;
use crate::models::{DocumentRecord, QaPair};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide document mapping.
///
/// Lock sections are short and never span an upstream call; a re-upload
/// replaces the record under the same name.
#[derive(Clone, Default)]
pub struct DocumentStore {
    inner: Arc<RwLock<DocumentMap>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record for `file_name`.
    pub async fn upsert(&self, file_name: String, record: DocumentRecord) {
        let replaced = self
            .inner
            .write()
            .await
            .insert(file_name.clone(), record)
            .is_some();

        if replaced {
            tracing::info!(file_name = %file_name, "Replaced existing document record");
        }
    }

    /// Extracted text of a known document.
    pub async fn document_text(&self, file_name: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .get(file_name)
            .map(|record| record.document_text.clone())
    }

    /// Appends an exchange and returns the document's full history, or `None`
    /// if the document is unknown.
    pub async fn record_exchange(&self, file_name: &str, pair: QaPair) -> Option<Vec<QaPair>> {
        let mut documents = self.inner.write().await;
        let record = documents.get_mut(file_name)?;
        record.chat_history.push(pair);
        Some(record.chat_history.clone())
    }

    /// Copy of every record.
    pub async fn snapshot(&self) -> DocumentMap {
        self.inner.read().await.clone()
    }
}
