//! Prompt construction and one-shot generation for documents.
//!
//! Upstream failures are folded into the returned text rather than surfaced as
//! an error status; callers always get something to store.

use service_core::genai::{record_provider_call, FinishReason, TextProvider};
use std::sync::Arc;
use std::time::Instant;

pub const SUMMARY_PROMPT_PREFIX: &str =
    "Summarize the following document. Highlight its main topics and key points:\n\n";
pub const QUESTION_PROMPT_PREFIX: &str =
    "Answer the following question using only the document provided below.\n\nQuestion: ";
pub const DOCUMENT_SEPARATOR: &str = "\n\nDocument:\n";

pub const NO_SUMMARY: &str = "No summary generated.";
pub const NO_ANSWER: &str = "No answer generated.";

pub fn summary_prompt(document_text: &str) -> String {
    format!("{}{}", SUMMARY_PROMPT_PREFIX, document_text)
}

pub fn question_prompt(question: &str, document_text: &str) -> String {
    format!(
        "{}{}{}{}",
        QUESTION_PROMPT_PREFIX, question, DOCUMENT_SEPARATOR, document_text
    )
}

#[derive(Clone)]
pub struct DocumentAssistant {
    provider: Arc<dyn TextProvider>,
}

impl DocumentAssistant {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    pub async fn summarize(&self, document_text: &str) -> String {
        self.generate_text(
            "summarize",
            &summary_prompt(document_text),
            NO_SUMMARY,
            "Error generating summary",
        )
        .await
    }

    pub async fn answer(&self, question: &str, document_text: &str) -> String {
        self.generate_text(
            "answer",
            &question_prompt(question, document_text),
            NO_ANSWER,
            "Error generating answer",
        )
        .await
    }

    async fn generate_text(
        &self,
        operation: &'static str,
        prompt: &str,
        fallback: &str,
        error_prefix: &str,
    ) -> String {
        let started = Instant::now();
        let result = self.provider.generate(prompt).await;
        record_provider_call(operation, started, &result);

        match result {
            Ok(response) => {
                tracing::debug!(
                    operation,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Generation completed"
                );
                if response.finish_reason == FinishReason::Length {
                    tracing::warn!(operation, "Generated text truncated at the model's token limit");
                }
                response.text.unwrap_or_else(|| {
                    tracing::warn!(operation, "Model returned no candidates");
                    fallback.to_string()
                })
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "Generation failed");
                format!("{}: {}", error_prefix, e)
            }
        }
    }
}
