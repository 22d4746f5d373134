use crate::dtos::{AskQuestionRequest, AskQuestionResponse, DocumentMap, UPLOAD_FIELD};
use crate::models::{DocumentRecord, QaPair};
use crate::services::pdf;
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use service_core::error::AppError;

/// Default name for parts uploaded without a file name.
const UNNAMED_FILE: &str = "unnamed";

struct UploadedFile {
    file_name: String,
    data: Vec<u8>,
}

/// Reads every `files` part of the request; other fields are skipped.
async fn read_uploads(
    mut multipart: Multipart,
    max_file_bytes: usize,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_FILE)
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?
            .to_vec();

        if data.len() > max_file_bytes {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "File '{}' too large (max {} bytes)",
                file_name,
                max_file_bytes
            )));
        }

        uploads.push(UploadedFile { file_name, data });
    }

    Ok(uploads)
}

pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DocumentMap>, AppError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Upload without a multipart body");
        AppError::bad_request("No files provided")
    })?;

    let uploads = read_uploads(multipart, state.config.upload.max_file_bytes).await?;
    if uploads.is_empty() {
        return Err(AppError::bad_request("No files provided"));
    }

    for UploadedFile { file_name, data } in uploads {
        if !pdf::looks_like_pdf(&data) {
            tracing::warn!(file_name = %file_name, "Uploaded file has no PDF header");
        }

        tracing::info!(
            file_name = %file_name,
            size = data.len(),
            "Document upload started"
        );

        let document_text = pdf::extract_text(&file_name, data).await;
        let summary = state.assistant.summarize(&document_text).await;

        tracing::info!(
            file_name = %file_name,
            text_length = document_text.len(),
            "Document summarized"
        );

        state
            .documents
            .upsert(file_name, DocumentRecord::new(document_text, summary))
            .await;
        metrics::counter!("docqa_documents_uploaded_total").increment(1);
    }

    Ok(Json(state.documents.snapshot().await))
}

pub async fn ask_question(
    State(state): State<AppState>,
    payload: Option<Json<AskQuestionRequest>>,
) -> Result<Json<AskQuestionResponse>, AppError> {
    let (file_name, question) = payload
        .and_then(|Json(body)| {
            let file_name = body.file_name.filter(|f| !f.is_empty())?;
            let question = body.question.filter(|q| !q.trim().is_empty())?;
            Some((file_name, question))
        })
        .ok_or_else(|| AppError::bad_request("Both file_name and question are required"))?;

    let not_found =
        || AppError::bad_request(format!("File '{}' not found. Please upload it first.", file_name));

    let document_text = state
        .documents
        .document_text(&file_name)
        .await
        .ok_or_else(not_found)?;

    let answer = state.assistant.answer(&question, &document_text).await;

    let chat_history = state
        .documents
        .record_exchange(
            &file_name,
            QaPair {
                question: question.clone(),
                answer: answer.clone(),
            },
        )
        .await
        .ok_or_else(not_found)?;

    tracing::info!(
        file_name = %file_name,
        exchanges = chat_history.len(),
        "Answered document question"
    );

    Ok(Json(AskQuestionResponse {
        file_name,
        question,
        answer,
        chat_history,
    }))
}
