use crate::models::{DocumentRecord, QaPair};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multipart field name carrying the uploaded PDFs.
pub const UPLOAD_FIELD: &str = "files";

/// Response of `/upload_pdf`: every document seen so far, by file name.
pub type DocumentMap = BTreeMap<String, DocumentRecord>;

#[derive(Debug, Deserialize)]
pub struct AskQuestionRequest {
    pub file_name: Option<String>,
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskQuestionResponse {
    pub file_name: String,
    pub question: String,
    pub answer: String,
    pub chat_history: Vec<QaPair>,
}
