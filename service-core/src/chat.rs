//! `POST /ask`: forwards a question to the process chat session.
//!
//! Shared by every service that mounts it; the router state only needs to
//! yield an `Arc<ChatSession>` through `FromRef`.

use crate::error::AppError;
use crate::genai::ChatSession;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub response: String,
}

pub async fn ask(
    State(session): State<Arc<ChatSession>>,
    payload: Option<Json<AskRequest>>,
) -> Result<Json<AskResponse>, AppError> {
    let question = payload
        .and_then(|Json(body)| body.question)
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("No question provided"))?;

    let response = session.send_message(&question).await.map_err(|e| {
        tracing::error!(error = %e, "Chat session request failed");
        AppError::from(e)
    })?;

    Ok(Json(AskResponse { question, response }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::mock::MockTextProvider;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::post,
    };
    use tower::ServiceExt;

    fn router(enabled: bool) -> Router {
        let session = Arc::new(ChatSession::new(Arc::new(MockTextProvider::new(enabled))));
        Router::new().route("/ask", post(ask)).with_state(session)
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_question_is_a_bad_request() {
        let response = router(true).oneshot(json_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "No question provided");
    }

    #[tokio::test]
    async fn non_json_body_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/ask")
            .body(Body::from("question=hi"))
            .unwrap();

        let response = router(true).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn question_is_answered_with_streamed_reply() {
        let response = router(true)
            .oneshot(json_request(r#"{"question": "What is Rust?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["question"], "What is Rust?");
        assert_eq!(body["response"], "Mock streaming response for: What is Rust?");
    }

    #[tokio::test]
    async fn upstream_failure_is_a_server_error() {
        let response = router(false)
            .oneshot(json_request(r#"{"question": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not enabled"));
    }
}
