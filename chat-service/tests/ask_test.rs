mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use service_core::genai::mock::MockTextProvider;
use service_core::genai::ChatTurn;

#[tokio::test]
async fn ask_without_question_returns_400() {
    let app = TestApp::spawn().await;

    let response = app.ask(json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.provider.prompts().is_empty());
}

#[tokio::test]
async fn ask_with_empty_question_returns_400() {
    let app = TestApp::spawn().await;

    let response = app.ask(json!({ "question": "" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ask_returns_concatenated_stream() {
    let app = TestApp::spawn().await;

    let response = app.ask(json!({ "question": "What is a PDF?" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["question"], "What is a PDF?");
    assert_eq!(
        body["response"],
        "Mock streaming response for: What is a PDF?"
    );
}

#[tokio::test]
async fn session_history_accumulates_across_requests() {
    let app = TestApp::spawn().await;

    app.ask(json!({ "question": "first" })).await;
    app.ask(json!({ "question": "second" })).await;

    let history = app.session.history().await;
    assert_eq!(
        history,
        vec![
            ChatTurn::user("first"),
            ChatTurn::model("Mock streaming response for: first"),
            ChatTurn::user("second"),
            ChatTurn::model("Mock streaming response for: second"),
        ]
    );

    // The second call replayed the first exchange
    assert_eq!(app.provider.histories()[1].len(), 2);
}

#[tokio::test]
async fn upstream_failure_returns_server_error() {
    let app = TestApp::spawn_with(MockTextProvider::new(false)).await;

    let response = app.ask(json!({ "question": "hi" })).await;

    assert!(response.status().is_server_error());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.session.history().await.is_empty());
}
