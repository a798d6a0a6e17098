use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::sector::SectorClassifier;
use crate::config::Config;
use crate::model_client::ModelClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub model: ModelClient,
    /// Keyword classifier with its regexes compiled once at startup.
    pub classifier: Arc<SectorClassifier>,
    pub config: Config,
}
