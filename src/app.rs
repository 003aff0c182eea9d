//! Application state and service initialization
//!
//! Centralizes service construction and dependency injection so the binary
//! entry point stays small and tests can build services in isolation.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::repository::AnalysisRepository;
use crate::service::llm::ENV_GEMINI_API_KEY;
use crate::service::{AnalysisCache, AnalysisService, GeminiClient, ModelGateway};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Database connection pool
    pub db_pool: PgPool,
    /// Redis cache (optional)
    pub cache: Option<AnalysisCache>,
    /// Analysis pipeline service
    pub analysis_service: Arc<AnalysisService>,
    /// Persistence for analysis records
    pub repository: AnalysisRepository,
}

impl AppState {
    /// Initialize all services and build application state.
    ///
    /// This performs:
    /// 1. Database connection and schema initialization
    /// 2. Redis cache initialization (optional)
    /// 3. Gemini client initialization (optional: without GEMINI_API_KEY the
    ///    service starts but analysis endpoints return 503)
    pub async fn new() -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let cache = match AnalysisCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        let gateway = ModelGateway::new(Self::build_client()?);
        let analysis_service = Arc::new(AnalysisService::new(gateway));
        let repository = AnalysisRepository::new(db_pool.clone());

        Ok(Self {
            db_pool,
            cache,
            analysis_service,
            repository,
        })
    }

    fn build_client() -> Result<Option<Arc<dyn crate::service::llm::GenerativeClient>>, AppError> {
        match std::env::var(ENV_GEMINI_API_KEY) {
            Ok(key) if !key.trim().is_empty() => {
                let client = GeminiClient::new(key)
                    .map_err(|e| AppError::InvalidConfig(e.to_string()))?;
                Ok(Some(Arc::new(client)))
            }
            _ => {
                tracing::warn!(
                    "GEMINI_API_KEY not set, analysis endpoints will report service unavailable"
                );
                Ok(None)
            }
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
