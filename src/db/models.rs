//! Database models for analysis records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::model::{AnalysisRecord, AnalysisType};

/// Database representation of a stored analysis
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: String,
    pub document_name: String,
    pub document_text: String,
    pub analysis: serde_json::Value,
    pub analysis_type: String,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<AnalysisRecord, String> {
        let analysis = serde_json::from_value(self.analysis)
            .map_err(|e| format!("Invalid stored analysis: {}", e))?;

        Ok(AnalysisRecord {
            id: self.id,
            document_name: self.document_name,
            document_text: self.document_text,
            analysis,
            analysis_type: AnalysisType::from_str_or_default(&self.analysis_type),
            file_type: self.file_type,
            created_at: self.created_at,
        })
    }
}

/// One entry in the recent-analyses listing
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct AnalysisSummaryRow {
    pub id: String,
    pub document_name: String,
    pub analysis_type: String,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisResult;

    #[test]
    fn row_converts_to_domain_record() {
        let analysis = AnalysisResult {
            ai_confidence: 0.85,
            ..Default::default()
        };

        let row = AnalysisRow {
            id: "abc".to_string(),
            document_name: "contract.pdf".to_string(),
            document_text: "The parties agree.".to_string(),
            analysis: serde_json::to_value(&analysis).unwrap(),
            analysis_type: "risk_assessment".to_string(),
            file_type: Some("pdf".to_string()),
            created_at: Utc::now(),
        };

        let record = row.into_domain().unwrap();
        assert_eq!(record.analysis.ai_confidence, 0.85);
        assert_eq!(record.analysis_type, AnalysisType::RiskAssessment);
        assert_eq!(record.file_type.as_deref(), Some("pdf"));
    }

    #[test]
    fn unknown_analysis_type_defaults_to_comprehensive() {
        let row = AnalysisRow {
            id: "abc".to_string(),
            document_name: "doc".to_string(),
            document_text: "text".to_string(),
            analysis: serde_json::json!({}),
            analysis_type: "something_else".to_string(),
            file_type: None,
            created_at: Utc::now(),
        };

        let record = row.into_domain().unwrap();
        assert_eq!(record.analysis_type, AnalysisType::Comprehensive);
    }
}
