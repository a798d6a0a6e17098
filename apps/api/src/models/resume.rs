use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume document with its extracted text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub title: String,
    pub file_name: Option<String>,
    pub extracted_text: String,
    pub content_hash: String,
    pub sector: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for history views: metadata plus analysis counts, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub file_name: Option<String>,
    pub sector: String,
    pub created_at: DateTime<Utc>,
    pub analysis_count: i64,
    pub job_match_count: i64,
}

/// Aggregate totals for the stats endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatsTotalsRow {
    pub total_resumes: i64,
    pub total_analyses: i64,
    pub total_job_matches: i64,
    pub avg_ats_score: Option<f64>,
}

/// One sector bucket of the stored-resume distribution.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SectorCountRow {
    pub sector: String,
    pub count: i64,
}
