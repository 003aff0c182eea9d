//! Repository for analysis record database operations

use sqlx::PgPool;

use super::models::{AnalysisRow, AnalysisSummaryRow};
use super::DbError;
use crate::model::AnalysisRecord;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 100;

/// Repository for stored analyses
#[derive(Clone)]
pub struct AnalysisRepository {
    pool: PgPool,
}

impl AnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new analysis record
    pub async fn insert(&self, record: &AnalysisRecord) -> Result<(), DbError> {
        let analysis_json = serde_json::to_value(&record.analysis)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO analyses (
                id, document_name, document_text, analysis,
                analysis_type, file_type, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.document_name)
        .bind(&record.document_text)
        .bind(&analysis_json)
        .bind(record.analysis_type.as_str())
        .bind(&record.file_type)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %record.id, "Inserted analysis record");
        Ok(())
    }

    /// Get an analysis record by ID
    pub async fn get_by_id(&self, id: &str) -> Result<AnalysisRecord, DbError> {
        let row: AnalysisRow = sqlx::query_as(
            r#"
            SELECT * FROM analyses WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        row.into_domain().map_err(DbError::Serialization)
    }

    /// List recent analyses, newest first
    pub async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<AnalysisSummaryRow>, DbError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

        let rows: Vec<AnalysisSummaryRow> = sqlx::query_as(
            r#"
            SELECT id, document_name, analysis_type, file_type, created_at
            FROM analyses
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete an analysis record by ID.
    /// Returns true if the record was deleted, false if it didn't exist.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM analyses WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(id = %id, "Deleted analysis record");
        }

        Ok(deleted)
    }
}
