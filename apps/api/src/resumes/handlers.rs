//! Resume endpoints: multipart upload with dedup, history, detail, stats.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract;
use crate::models::resume::ResumeRow;
use crate::state::AppState;
use crate::storage::{self, NewResume, StatsReport, DEFAULT_HISTORY_LIMIT};

/// Multipart field that carries the document.
const FILE_FIELD: &str = "file";

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart payload: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// Accepts a PDF or DOCX resume, extracts its text, classifies the sector,
/// and stores it. Re-uploading identical content returns the existing row
/// with `is_duplicate` set instead of creating another copy.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let upload = read_file_field(&mut multipart).await?;
    if upload.data.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".into()));
    }

    let text = extract::extract_text(
        &upload.data,
        upload.content_type.as_deref(),
        &upload.file_name,
    )?;
    let characters = text.chars().count();
    let sector = state.classifier.classify(&text);
    info!(
        "extracted {characters} characters from '{}' (sector: {sector})",
        upload.file_name
    );

    let display_name = if upload.file_name.is_empty() {
        "upload"
    } else {
        &upload.file_name
    };
    let title = format!("CV - {display_name} - {}", Utc::now().format("%Y-%m-%d %H:%M"));
    let stored_name = (!upload.file_name.is_empty()).then_some(upload.file_name.as_str());

    let outcome = storage::save_resume(
        &state.db,
        NewResume {
            title: &title,
            file_name: stored_name,
            extracted_text: &text,
            sector,
        },
    )
    .await?;

    let resume = outcome.resume();
    Ok(Json(json!({
        "resume_id": resume.id,
        "title": resume.title,
        "sector": resume.sector,
        "is_duplicate": outcome.is_duplicate(),
        "characters": characters,
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 100);
    let resumes = storage::list_resumes(&state.db, limit).await?;
    let count = resumes.len();

    Ok(Json(json!({
        "count": count,
        "resumes": resumes,
    })))
}

pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = storage::get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("resume {id} not found")))?;

    Ok(Json(resume))
}

pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsReport>, AppError> {
    let stats = storage::fetch_stats(&state.db).await?;
    Ok(Json(stats))
}
