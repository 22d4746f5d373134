//! Mock provider implementation for testing.

use super::{
    ChatTurn, FinishReason, ProviderError, ProviderResponse, ProviderStream, StreamChunk,
    TextProvider,
};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockBehavior {
    Respond,
    NoCandidates,
    Fail,
}

/// Mock text provider for testing.
///
/// Replies are derived from the prompt, so tests can assert on them without
/// network access. Every prompt and replayed history is recorded.
pub struct MockTextProvider {
    behavior: MockBehavior,
    stream_finish_reason: FinishReason,
    prompts: Mutex<Vec<String>>,
    histories: Mutex<Vec<Vec<ChatTurn>>>,
}

impl MockTextProvider {
    /// `enabled = false` makes every call fail with `NotConfigured`.
    pub fn new(enabled: bool) -> Self {
        Self::with_behavior(if enabled {
            MockBehavior::Respond
        } else {
            MockBehavior::Fail
        })
    }

    /// Behaves like a model that returned no candidates.
    pub fn without_candidates() -> Self {
        Self::with_behavior(MockBehavior::NoCandidates)
    }

    /// Streams the usual reply but ends it with `finish_reason`.
    pub fn finishing_with(finish_reason: FinishReason) -> Self {
        Self {
            stream_finish_reason: finish_reason,
            ..Self::new(true)
        }
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            stream_finish_reason: FinishReason::Complete,
            prompts: Mutex::new(Vec::new()),
            histories: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Histories passed to `generate_stream`, oldest first.
    pub fn histories(&self) -> Vec<Vec<ChatTurn>> {
        self.histories.lock().map(|h| h.clone()).unwrap_or_default()
    }

    fn record_prompt(&self, prompt: &str) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
    }

    fn not_configured() -> ProviderError {
        ProviderError::NotConfigured("Mock text provider not enabled".to_string())
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        self.record_prompt(prompt);

        let text = match self.behavior {
            MockBehavior::Fail => return Err(Self::not_configured()),
            MockBehavior::NoCandidates => None,
            MockBehavior::Respond => Some(format!("Mock response for: {}", prompt)),
        };

        Ok(ProviderResponse {
            text,
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn generate_stream(
        &self,
        history: &[ChatTurn],
        prompt: &str,
    ) -> Result<ProviderStream, ProviderError> {
        self.record_prompt(prompt);
        if let Ok(mut histories) = self.histories.lock() {
            histories.push(history.to_vec());
        }

        let input_tokens = prompt.len() as i32 / 4;

        let chunks: Vec<Result<StreamChunk, ProviderError>> = match self.behavior {
            MockBehavior::Fail => return Err(Self::not_configured()),
            MockBehavior::NoCandidates => vec![Ok(StreamChunk::Complete {
                input_tokens,
                output_tokens: 0,
                finish_reason: FinishReason::Complete,
            })],
            MockBehavior::Respond => vec![
                Ok(StreamChunk::Text("Mock".to_string())),
                Ok(StreamChunk::Text(" streaming".to_string())),
                Ok(StreamChunk::Text(" response".to_string())),
                Ok(StreamChunk::Text(" for:".to_string())),
                Ok(StreamChunk::Text(format!(" {}", prompt))),
                Ok(StreamChunk::Complete {
                    input_tokens,
                    output_tokens: 5,
                    finish_reason: self.stream_finish_reason,
                }),
            ],
        };

        Ok(Box::pin(tokio_stream::iter(chunks)))
    }
}
