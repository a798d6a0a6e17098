//! Resume storage: content fingerprinting, dedup-aware saves, analysis
//! persistence, history, and stats.
//!
//! Analyses are persisted denormalized: headline scores in typed columns for
//! cheap aggregation, the full result envelope as jsonb. Genuine model
//! output nests its section scores under `section_analysis` while demo
//! payloads keep them flat, so every score lookup carries both spellings.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::result::AnalysisResult;
use crate::models::resume::{ResumeRow, ResumeSummaryRow, SectorCountRow, StatsTotalsRow};

/// Default page size for history listings.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Longest stored job title, taken from the posting's first line.
const MAX_JOB_TITLE_CHARS: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Fingerprinting
// ────────────────────────────────────────────────────────────────────────────

/// Canonical content fingerprint: SHA-256 over whitespace-collapsed,
/// lowercased text. Re-uploads of the same document hash identically even
/// when extraction spacing or casing differs.
pub fn content_fingerprint(text: &str) -> String {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// Parameters for saving an uploaded resume.
pub struct NewResume<'a> {
    pub title: &'a str,
    pub file_name: Option<&'a str>,
    pub extracted_text: &'a str,
    pub sector: &'a str,
}

/// Result of a dedup-aware save. A duplicate is a normal outcome: callers
/// get the existing row and proceed with its id.
#[derive(Debug)]
pub enum SaveOutcome {
    Created(ResumeRow),
    Duplicate(ResumeRow),
}

impl SaveOutcome {
    pub fn resume(&self) -> &ResumeRow {
        match self {
            Self::Created(row) | Self::Duplicate(row) => row,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

pub async fn save_resume(pool: &PgPool, new: NewResume<'_>) -> Result<SaveOutcome, sqlx::Error> {
    let fingerprint = content_fingerprint(new.extracted_text);

    if let Some(existing) = find_by_fingerprint(pool, &fingerprint).await? {
        info!("upload is a duplicate of resume {}", existing.id);
        return Ok(SaveOutcome::Duplicate(existing));
    }

    let inserted: Result<ResumeRow, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO resumes (id, title, file_name, extracted_text, content_hash, sector, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.title)
    .bind(new.file_name)
    .bind(new.extracted_text)
    .bind(&fingerprint)
    .bind(new.sector)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(row) => Ok(SaveOutcome::Created(row)),
        // Lost a race against an identical concurrent upload; the unique
        // index on content_hash guarantees the winner is fetchable.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let existing = find_by_fingerprint(pool, &fingerprint)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            Ok(SaveOutcome::Duplicate(existing))
        }
        Err(e) => Err(e),
    }
}

pub async fn find_by_fingerprint(
    pool: &PgPool,
    fingerprint: &str,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE content_hash = $1")
        .bind(fingerprint)
        .fetch_optional(pool)
        .await
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Newest-first resume history with per-resume analysis counts.
pub async fn list_resumes(pool: &PgPool, limit: i64) -> Result<Vec<ResumeSummaryRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT r.id, r.title, r.file_name, r.sector, r.created_at,
               COUNT(DISTINCT a.id) AS analysis_count,
               COUNT(DISTINCT j.id) AS job_match_count
        FROM resumes r
        LEFT JOIN ats_analyses a ON a.resume_id = r.id
        LEFT JOIN job_matches j ON j.resume_id = r.id
        GROUP BY r.id, r.title, r.file_name, r.sector, r.created_at
        ORDER BY r.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Analyses
// ────────────────────────────────────────────────────────────────────────────

/// Persists a completed ATS analysis. Callers skip failed runs; only
/// genuine and demo payloads are worth recording.
pub async fn save_ats_analysis(
    pool: &PgPool,
    resume_id: Uuid,
    result: &AnalysisResult,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ats_analyses
            (id, resume_id, overall_score, contact_score, summary_score,
             experience_score, education_score, skills_score, suggestions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(resume_id)
    .bind(result.score_any(&["/overall_ats_score", "/overall_score"]))
    .bind(result.score_any(&["/section_analysis/contact_info/score", "/contact_score"]))
    .bind(result.score_any(&["/section_analysis/professional_summary/score", "/summary_score"]))
    .bind(result.score_any(&["/section_analysis/work_experience/score", "/experience_score"]))
    .bind(result.score_any(&["/section_analysis/education/score", "/education_score"]))
    .bind(result.score_any(&["/section_analysis/skills/score", "/skills_score"]))
    .bind(serde_json::to_value(result).unwrap_or(Value::Null))
    .execute(pool)
    .await?;

    Ok(id)
}

/// Persists a completed job-match analysis.
pub async fn save_job_match(
    pool: &PgPool,
    resume_id: Uuid,
    job_description: &str,
    result: &AnalysisResult,
) -> Result<Uuid, sqlx::Error> {
    let matching = result
        .value_any(&[
            "/detailed_analysis/skills_analysis/technical_skills/matched",
            "/matching_skills",
        ])
        .unwrap_or_else(|| Value::Array(Vec::new()));
    let missing = result
        .value_any(&[
            "/detailed_analysis/skills_analysis/technical_skills/missing",
            "/missing_skills",
        ])
        .unwrap_or_else(|| Value::Array(Vec::new()));

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO job_matches
            (id, resume_id, job_title, job_description, compatibility_score,
             missing_skills, matching_skills, suggestions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(resume_id)
    .bind(job_title_from(job_description))
    .bind(job_description)
    .bind(result.score_any(&["/overall_match_score"]))
    .bind(missing)
    .bind(matching)
    .bind(serde_json::to_value(result).unwrap_or(Value::Null))
    .execute(pool)
    .await?;

    Ok(id)
}

/// First line of the posting, truncated, used as the stored job title.
pub fn job_title_from(job_description: &str) -> String {
    job_description
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .chars()
        .take(MAX_JOB_TITLE_CHARS)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Stats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub totals: StatsTotalsRow,
    pub sector_distribution: Vec<SectorCountRow>,
}

pub async fn fetch_stats(pool: &PgPool) -> Result<StatsReport, sqlx::Error> {
    let totals: StatsTotalsRow = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM resumes) AS total_resumes,
            (SELECT COUNT(*) FROM ats_analyses) AS total_analyses,
            (SELECT COUNT(*) FROM job_matches) AS total_job_matches,
            (SELECT AVG(overall_score)::float8 FROM ats_analyses) AS avg_ats_score
        "#,
    )
    .fetch_one(pool)
    .await?;

    let sector_distribution: Vec<SectorCountRow> = sqlx::query_as(
        "SELECT sector, COUNT(*) AS count FROM resumes GROUP BY sector ORDER BY count DESC, sector",
    )
    .fetch_all(pool)
    .await?;

    Ok(StatsReport {
        totals,
        sector_distribution,
    })
}
