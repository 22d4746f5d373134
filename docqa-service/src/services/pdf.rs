//! Best-effort PDF text extraction.
//!
//! Failures never reach the client: an unreadable document simply has no text.

use anyhow::Context;

/// Extracts the text of every page, in page order.
pub fn extract_pages(bytes: &[u8]) -> anyhow::Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| anyhow::anyhow!("{:?}", e))
        .context("failed to extract text from PDF bytes using pdf-extract")
}

/// Concatenated page text of `bytes`, or an empty string if the PDF cannot be read.
///
/// Parsing runs on the blocking pool; a panic inside the parser is treated like
/// any other extraction failure.
pub async fn extract_text(file_name: &str, bytes: Vec<u8>) -> String {
    let result = tokio::task::spawn_blocking(move || extract_pages(&bytes)).await;

    match result {
        Ok(Ok(pages)) => {
            tracing::debug!(file_name, page_count = pages.len(), "Extracted PDF text");
            pages.concat()
        }
        Ok(Err(e)) => {
            tracing::warn!(file_name, error = %format!("{:#}", e), "PDF text extraction failed");
            String::new()
        }
        Err(e) => {
            tracing::warn!(file_name, error = %e, "PDF text extraction aborted");
            String::new()
        }
    }
}

/// Returns true if the bytes start with the PDF magic header.
pub fn looks_like_pdf(head: &[u8]) -> bool {
    head.starts_with(b"%PDF-")
}
