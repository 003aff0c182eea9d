//! Domain model for legal document analysis results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Overall risk classification of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// High-level summary of the analyzed document
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DocumentSummary {
    /// Contract type (e.g. Employment Agreement, Service Agreement)
    pub document_type: String,
    pub key_parties: Vec<String>,
    pub main_purpose: String,
    pub effective_date: String,
    pub expiration_date: String,
}

/// Risk flags grouped by severity
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskLevel,
    /// Concerning clauses
    pub red_flags: Vec<String>,
    /// Clauses needing attention
    pub yellow_flags: Vec<String>,
    /// Favorable clauses
    pub green_flags: Vec<String>,
}

/// Monetary terms found in the document
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FinancialTerms {
    pub payment_amounts: Vec<String>,
    pub payment_schedules: Vec<String>,
    pub penalties: Vec<String>,
    pub fees: Vec<String>,
}

/// Duties of each party under the agreement
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Obligations {
    pub party_1_obligations: Vec<String>,
    pub party_2_obligations: Vec<String>,
    pub mutual_obligations: Vec<String>,
}

/// A notable clause with a plain-language explanation
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct KeyClause {
    /// termination/liability/confidentiality/etc
    pub clause_type: String,
    pub clause_text: String,
    pub plain_language: String,
    /// High/Medium/Low
    pub importance: String,
}

/// Complete structured analysis of a single document.
///
/// Every list field defaults to an empty sequence so consumers never need
/// null checks, and partial model output still decodes into a usable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AnalysisResult {
    pub document_summary: DocumentSummary,
    pub risk_assessment: RiskAssessment,
    pub financial_terms: FinancialTerms,
    pub obligations: Obligations,
    pub key_clauses: Vec<KeyClause>,
    /// Model self-reported confidence, clamped to [0, 1]
    pub ai_confidence: f64,
    /// Wall-clock seconds spent producing this result
    pub processing_time_seconds: f64,
}

/// Answer to a follow-up question about an analyzed document
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct QuestionAnswer {
    pub answer: String,
    /// Confidence in the answer, clamped to [0, 1]
    pub confidence: f64,
    pub relevant_clauses: Vec<String>,
    pub additional_context: String,
}

/// Kind of analysis requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Comprehensive,
    RiskAssessment,
    ClauseExtraction,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Comprehensive => "comprehensive",
            AnalysisType::RiskAssessment => "risk_assessment",
            AnalysisType::ClauseExtraction => "clause_extraction",
        }
    }

    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "risk_assessment" => AnalysisType::RiskAssessment,
            "clause_extraction" => AnalysisType::ClauseExtraction,
            _ => AnalysisType::Comprehensive,
        }
    }
}

/// A persisted analysis: the result plus the request context it came from
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisRecord {
    pub id: String,
    pub document_name: String,
    /// Stored excerpt of the analyzed text (truncated for persistence)
    pub document_text: String,
    pub analysis: AnalysisResult,
    pub analysis_type: AnalysisType,
    /// File extension of the uploaded source, when the document was a file
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
