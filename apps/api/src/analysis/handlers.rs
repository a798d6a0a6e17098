//! Analysis endpoints: ATS scoring, job matching, and model diagnostics.
//!
//! Analysis responses are always 200: a degraded or failed run is reported
//! inside the envelope (`fallback_mode`, `error`), not as an HTTP error.
//! Only genuine HTTP-level problems (unknown resume, bad payload, database
//! trouble) surface through [`AppError`].

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer;
use crate::errors::AppError;
use crate::model_client::{ModelHealth, ModelOutcome};
use crate::state::AppState;
use crate::storage;

/// Diagnostic prompt for the model test endpoint.
const TEST_PROMPT: &str = "Reply with the single word: ready";
const TEST_MAX_TOKENS: u32 = 20;

pub async fn handle_analyze_ats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let resume = storage::get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("resume {id} not found")))?;

    let result =
        analyzer::analyze_ats(&state.model, &state.classifier, &resume.extracted_text).await;

    if !result.is_failed() {
        let analysis_id = storage::save_ats_analysis(&state.db, resume.id, &result).await?;
        info!("stored ATS analysis {analysis_id} for resume {id}");
    }

    Ok(Json(json!({
        "resume_id": resume.id,
        "sector": resume.sector,
        "analysis": result,
    })))
}

#[derive(Debug, Deserialize)]
pub struct JobMatchRequest {
    pub job_description: String,
}

pub async fn handle_match_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobMatchRequest>,
) -> Result<Json<Value>, AppError> {
    let job_description = payload.job_description.trim().to_string();
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "job_description must not be empty".into(),
        ));
    }

    let resume = storage::get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("resume {id} not found")))?;

    let result = analyzer::match_job(
        &state.model,
        &state.classifier,
        &resume.extracted_text,
        &job_description,
    )
    .await;

    if !result.is_failed() {
        let match_id =
            storage::save_job_match(&state.db, resume.id, &job_description, &result).await?;
        info!("stored job match {match_id} for resume {id}");
    }

    Ok(Json(json!({
        "resume_id": resume.id,
        "job_title": storage::job_title_from(&job_description),
        "analysis": result,
    })))
}

/// Reports the two-stage model probe without touching the database.
pub async fn handle_model_health(State(state): State<AppState>) -> Json<Value> {
    match state.model.check_health().await {
        ModelHealth::Healthy => Json(json!({
            "status": "healthy",
            "model": state.model.model_name(),
        })),
        ModelHealth::Unavailable(reason) => Json(json!({
            "status": "unavailable",
            "model": state.model.model_name(),
            "reason": reason.message(),
        })),
    }
}

/// Runs one end-to-end completion and echoes the attempt trail, so operators
/// can see retries and timeouts instead of guessing from logs.
pub async fn handle_model_test(State(state): State<AppState>) -> Json<Value> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = state
        .model
        .invoke_with_events(TEST_PROMPT, TEST_MAX_TOKENS, Some(&tx))
        .await;
    drop(tx);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    let (status, detail) = match &outcome {
        ModelOutcome::Success { raw_text } => ("ok", json!({ "response": raw_text })),
        ModelOutcome::Degraded { reason } => ("degraded", json!({ "reason": reason.message() })),
        ModelOutcome::Failure(error) => ("failed", json!({ "error": error.to_string() })),
    };

    Json(json!({
        "status": status,
        "model": state.model.model_name(),
        "detail": detail,
        "events": events,
    }))
}
