use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Idempotent schema bootstrap. Runs on every startup so a fresh database is
/// usable without a separate migration step.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resumes (
            id UUID PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            file_name VARCHAR(255),
            extracted_text TEXT NOT NULL,
            content_hash VARCHAR(64) NOT NULL UNIQUE,
            sector VARCHAR(100) NOT NULL DEFAULT 'general',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ats_analyses (
            id UUID PRIMARY KEY,
            resume_id UUID NOT NULL REFERENCES resumes(id) ON DELETE CASCADE,
            overall_score INTEGER NOT NULL DEFAULT 0,
            contact_score INTEGER NOT NULL DEFAULT 0,
            summary_score INTEGER NOT NULL DEFAULT 0,
            experience_score INTEGER NOT NULL DEFAULT 0,
            education_score INTEGER NOT NULL DEFAULT 0,
            skills_score INTEGER NOT NULL DEFAULT 0,
            suggestions JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_matches (
            id UUID PRIMARY KEY,
            resume_id UUID NOT NULL REFERENCES resumes(id) ON DELETE CASCADE,
            job_title VARCHAR(255),
            job_description TEXT NOT NULL,
            compatibility_score INTEGER NOT NULL DEFAULT 0,
            missing_skills JSONB,
            matching_skills JSONB,
            suggestions JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ats_analyses_resume ON ats_analyses(resume_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_job_matches_resume ON job_matches(resume_id)")
        .execute(pool)
        .await?;

    info!("Database schema ensured");
    Ok(())
}
