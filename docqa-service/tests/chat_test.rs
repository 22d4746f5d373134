//! The document service also exposes the bare chat endpoint.

mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn ask_is_served_alongside_document_routes() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({ "question": "Hello?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Mock streaming response for: Hello?");
}

#[tokio::test]
async fn ask_without_question_returns_400() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/ask", app.address))
        .json(&json!({ "file_name": "doc.pdf" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("http://localhost:{}/health", app.port))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["service"], "docqa-service");
}
