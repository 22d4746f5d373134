use serde::{Deserialize, Serialize};

/// One question asked against a document, with the model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Everything kept in memory for an uploaded PDF, keyed by its file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub document_text: String,
    pub summary: String,
    #[serde(default)]
    pub chat_history: Vec<QaPair>,
}

impl DocumentRecord {
    pub fn new(document_text: String, summary: String) -> Self {
        Self {
            document_text,
            summary,
            chat_history: Vec::new(),
        }
    }
}
