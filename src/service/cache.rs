//! Redis cache for analysis results
//!
//! Analyses of identical document text are reused instead of re-invoking the
//! model. The cache sits outside the analysis pipeline: callers consult it
//! before starting an analysis and store only fully parsed results.

use std::env;

use redis::{AsyncCommands, Client};
use sha2::{Digest, Sha256};

use crate::model::AnalysisResult;

// Environment variable names
const ENV_REDIS_HOST: &str = "CONTRACT_INTEL_REDIS_HOST";
const ENV_REDIS_PORT: &str = "CONTRACT_INTEL_REDIS_PORT";
const ENV_REDIS_PASSWORD: &str = "CONTRACT_INTEL_REDIS_PASSWORD";
const ENV_REDIS_DB: &str = "CONTRACT_INTEL_REDIS_DB";
const ENV_CACHE_TTL: &str = "CONTRACT_INTEL_CACHE_TTL";

// Default values
const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: &str = "6379";
const DEFAULT_REDIS_DB: &str = "0";
const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour

const PREFIX_ANALYSIS: &str = "analysis:";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache miss for key: {0}")]
    Miss(String),
}

/// Cache key for a document: hex SHA-256 of its extracted text
pub fn document_cache_key(document_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Redis-backed cache of analysis results keyed by document content hash
#[derive(Clone)]
pub struct AnalysisCache {
    client: Client,
    ttl_seconds: u64,
}

impl AnalysisCache {
    /// Create a new cache instance and verify the connection.
    ///
    /// Configuration via environment variables:
    /// - `CONTRACT_INTEL_REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `CONTRACT_INTEL_REDIS_PORT` - Redis port (default: 6379)
    /// - `CONTRACT_INTEL_REDIS_PASSWORD` - Redis password (default: none)
    /// - `CONTRACT_INTEL_REDIS_DB` - Redis database number (default: 0)
    /// - `CONTRACT_INTEL_CACHE_TTL` - TTL in seconds (default: 3600)
    pub async fn new() -> Result<Self, CacheError> {
        let host = env::var(ENV_REDIS_HOST).unwrap_or_else(|_| DEFAULT_REDIS_HOST.to_string());
        let port = env::var(ENV_REDIS_PORT).unwrap_or_else(|_| DEFAULT_REDIS_PORT.to_string());
        let password = env::var(ENV_REDIS_PASSWORD).ok();
        let db = env::var(ENV_REDIS_DB).unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        let ttl_seconds = env::var(ENV_CACHE_TTL)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        // Build Redis URL: redis://[password@]host:port/db
        let redis_url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        tracing::debug!(host = %host, port = %port, db = %db, "Connecting to Redis");

        let client = Client::open(redis_url)?;

        // Test the connection by pinging Redis
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(host = %host, port = %port, "Redis connection established");

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    /// Get a cached analysis by document content hash
    pub async fn get_analysis(&self, key: &str) -> Result<AnalysisResult, CacheError> {
        let full_key = format!("{}{}", PREFIX_ANALYSIS, key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let data: Option<String> = conn.get(&full_key).await?;

        match data {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string()))
            }
            None => Err(CacheError::Miss(key.to_string())),
        }
    }

    /// Cache an analysis by document content hash
    pub async fn set_analysis(
        &self,
        key: &str,
        analysis: &AnalysisResult,
    ) -> Result<(), CacheError> {
        let full_key = format!("{}{}", PREFIX_ANALYSIS, key);
        let json = serde_json::to_string(analysis)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(&full_key, json, self.ttl_seconds).await?;

        tracing::debug!(key = %full_key, ttl = self.ttl_seconds, "Cached analysis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_and_content_sensitive() {
        let a = document_cache_key("The parties agree.");
        let b = document_cache_key("The parties agree.");
        let c = document_cache_key("The parties disagree.");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
