//! Process-wide conversational session.

use super::{
    ChatTurn, FinishReason, ProviderError, StreamChunk, TextProvider, record_provider_call,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// A single conversation shared by every caller of the process.
///
/// Gemini is stateless, so the session owns the turn history and replays it on
/// each message. The history lock is held for the whole exchange: messages are
/// answered one at a time and always see the complete preceding history.
pub struct ChatSession {
    provider: Arc<dyn TextProvider>,
    history: Mutex<Vec<ChatTurn>>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Send `message` and return the streamed reply concatenated in order.
    ///
    /// History is only extended when the whole reply was received.
    pub async fn send_message(&self, message: &str) -> Result<String, ProviderError> {
        let mut history = self.history.lock().await;
        let started = Instant::now();

        let result = self.collect_reply(&history, message).await;
        record_provider_call("chat", started, &result);

        let reply = result?;
        history.push(ChatTurn::user(message));
        history.push(ChatTurn::model(reply.clone()));

        tracing::debug!(
            turns = history.len(),
            reply_len = reply.len(),
            "Chat session extended"
        );

        Ok(reply)
    }

    async fn collect_reply(
        &self,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, ProviderError> {
        let mut stream = self.provider.generate_stream(history, message).await?;
        let mut reply = String::new();

        while let Some(chunk) = stream.next().await {
            match chunk? {
                StreamChunk::Text(text) => reply.push_str(&text),
                StreamChunk::Complete {
                    input_tokens,
                    output_tokens,
                    finish_reason,
                } => {
                    tracing::debug!(
                        input_tokens,
                        output_tokens,
                        ?finish_reason,
                        "Chat reply stream completed"
                    );
                    match finish_reason {
                        FinishReason::ContentFilter => return Err(ProviderError::ContentFiltered),
                        FinishReason::Length => {
                            tracing::warn!("Chat reply truncated at the model's token limit")
                        }
                        FinishReason::Error => {
                            tracing::warn!("Chat reply stopped for an unspecified reason")
                        }
                        FinishReason::Complete => {}
                    }
                    break;
                }
            }
        }

        Ok(reply)
    }

    /// Snapshot of the turns exchanged so far.
    pub async fn history(&self) -> Vec<ChatTurn> {
        self.history.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::mock::MockTextProvider;
    use crate::genai::Role;

    #[tokio::test]
    async fn reply_is_concatenation_of_fragments() {
        let session = ChatSession::new(Arc::new(MockTextProvider::new(true)));

        let reply = session.send_message("hello").await.unwrap();

        assert_eq!(reply, "Mock streaming response for: hello");
    }

    #[tokio::test]
    async fn history_is_replayed_on_next_message() {
        let provider = Arc::new(MockTextProvider::new(true));
        let session = ChatSession::new(provider.clone());

        session.send_message("first").await.unwrap();
        session.send_message("second").await.unwrap();

        let histories = provider.histories();
        assert_eq!(histories.len(), 2);
        assert!(histories[0].is_empty());
        assert_eq!(
            histories[1],
            vec![
                ChatTurn::user("first"),
                ChatTurn::model("Mock streaming response for: first"),
            ]
        );

        let history = session.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[2].role, Role::User);
        assert_eq!(history[2].text, "second");
    }

    #[tokio::test]
    async fn failed_exchange_leaves_history_untouched() {
        let session = ChatSession::new(Arc::new(MockTextProvider::new(false)));

        let err = session.send_message("hello").await.unwrap_err();

        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(session.history().await.is_empty());
    }

    #[tokio::test]
    async fn truncated_reply_is_kept() {
        let session =
            ChatSession::new(Arc::new(MockTextProvider::finishing_with(FinishReason::Length)));

        let reply = session.send_message("long").await.unwrap();

        assert_eq!(reply, "Mock streaming response for: long");
        assert_eq!(session.history().await.len(), 2);
    }

    #[tokio::test]
    async fn filtered_reply_is_an_error() {
        let session = ChatSession::new(Arc::new(MockTextProvider::finishing_with(
            FinishReason::ContentFilter,
        )));

        let err = session.send_message("unsafe").await.unwrap_err();

        assert!(matches!(err, ProviderError::ContentFiltered));
        assert!(session.history().await.is_empty());
    }
}
