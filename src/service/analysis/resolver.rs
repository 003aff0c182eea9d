//! Resolution of raw model output into structured results
//!
//! Model replies are unconstrained text. Resolution is staged: an optimistic
//! strict JSON decode of the brace-delimited slice, then the deterministic
//! pattern fallback over the source document, then a fixed error value. Every
//! stage is total - resolution never fails.

use crate::model::{AnalysisResult, QuestionAnswer, RiskLevel};
use crate::service::analysis::fallback::PatternAnalyzer;

/// How a result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The model reply decoded as valid JSON
    Parsed,
    /// The reply was unusable; the pattern fallback ran over the source text
    Degraded,
    /// The model call itself failed
    Error,
}

/// A resolved analysis tagged with the path that produced it
#[derive(Debug, Clone)]
pub struct ResolvedAnalysis {
    pub result: AnalysisResult,
    pub resolution: Resolution,
}

/// Turns raw model text into typed results
pub struct ResponseResolver {
    patterns: PatternAnalyzer,
}

impl ResponseResolver {
    pub fn new() -> Self {
        Self {
            patterns: PatternAnalyzer::new(),
        }
    }

    /// Resolve a raw analysis reply.
    ///
    /// `elapsed_seconds` is the measured model-call latency; it becomes the
    /// result's processing time until the orchestrator substitutes its own
    /// total for successfully parsed replies.
    pub fn resolve_analysis(
        &self,
        raw_text: &str,
        source_document_text: &str,
        elapsed_seconds: f64,
    ) -> ResolvedAnalysis {
        if let Some(slice) = json_object_slice(raw_text) {
            match serde_json::from_str::<AnalysisResult>(slice) {
                Ok(mut result) => {
                    result.processing_time_seconds = elapsed_seconds;
                    result.ai_confidence = result.ai_confidence.clamp(0.0, 1.0);
                    return ResolvedAnalysis {
                        result,
                        resolution: Resolution::Parsed,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Model reply is not valid JSON, using pattern fallback");
                }
            }
        } else {
            tracing::warn!("Model reply contains no JSON object, using pattern fallback");
        }

        ResolvedAnalysis {
            result: self.patterns.analyze(source_document_text, elapsed_seconds),
            resolution: Resolution::Degraded,
        }
    }

    /// Fixed result for a failed model call
    pub fn error_analysis(&self, reason: &str) -> AnalysisResult {
        let mut result = AnalysisResult::default();
        result.document_summary.document_type = "Analysis Error".to_string();
        result.document_summary.main_purpose = format!("Error occurred: {}", reason);
        result.document_summary.effective_date = "N/A".to_string();
        result.document_summary.expiration_date = "N/A".to_string();
        result.risk_assessment.overall_risk_level = RiskLevel::Unknown;
        result.ai_confidence = 0.0;
        result.processing_time_seconds = 0.0;
        result
    }

    /// Resolve a raw question-answering reply
    pub fn resolve_answer(&self, raw_text: &str) -> QuestionAnswer {
        let Some(slice) = json_object_slice(raw_text) else {
            return QuestionAnswer {
                answer: raw_text.to_string(),
                confidence: 0.7,
                relevant_clauses: vec!["Unable to extract specific clauses".to_string()],
                additional_context: "Full AI response provided".to_string(),
            };
        };

        match serde_json::from_str::<QuestionAnswer>(slice) {
            Ok(mut answer) => {
                answer.confidence = answer.confidence.clamp(0.0, 1.0);
                answer
            }
            Err(e) => {
                tracing::warn!(error = %e, "Answer reply is not valid JSON, echoing raw text");
                QuestionAnswer {
                    answer: raw_text.to_string(),
                    confidence: 0.6,
                    relevant_clauses: vec!["JSON parsing failed".to_string()],
                    additional_context: "Raw AI response".to_string(),
                }
            }
        }
    }
}

impl Default for ResponseResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice the first-`{`-to-last-`}` region of the text, tolerating leading and
/// trailing prose around the JSON object. Returns None when no such region
/// exists.
fn json_object_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start { Some(&text[start..=end]) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_reply() -> String {
        r#"{
            "document_summary": {
                "document_type": "Employment Agreement",
                "key_parties": ["TechCorp Inc.", "Jane Smith"],
                "main_purpose": "Employment terms",
                "effective_date": "January 1, 2025",
                "expiration_date": "Not specified"
            },
            "risk_assessment": {
                "overall_risk_level": "Low",
                "red_flags": [],
                "yellow_flags": ["At-will termination"],
                "green_flags": ["Clear compensation terms"]
            },
            "financial_terms": {
                "payment_amounts": ["$120,000"],
                "payment_schedules": ["Annual salary, regular payroll"],
                "penalties": [],
                "fees": []
            },
            "obligations": {
                "party_1_obligations": ["Pay salary"],
                "party_2_obligations": ["Perform duties"],
                "mutual_obligations": []
            },
            "key_clauses": [
                {
                    "clause_type": "termination",
                    "clause_text": "Either party may terminate with 30 days notice.",
                    "plain_language": "Both sides can end the deal with a month of warning.",
                    "importance": "High"
                }
            ],
            "ai_confidence": 0.85
        }"#
        .to_string()
    }

    #[test]
    fn valid_json_round_trips_with_elapsed_time() {
        let resolver = ResponseResolver::new();
        let resolved = resolver.resolve_analysis(&valid_reply(), "source text", 2.25);

        assert_eq!(resolved.resolution, Resolution::Parsed);
        let result = resolved.result;
        assert_eq!(result.ai_confidence, 0.85);
        assert_eq!(result.processing_time_seconds, 2.25);
        assert_eq!(
            result.document_summary.key_parties,
            vec!["TechCorp Inc.", "Jane Smith"]
        );
        assert_eq!(result.risk_assessment.overall_risk_level, RiskLevel::Low);
        assert_eq!(result.key_clauses.len(), 1);
        assert_eq!(result.key_clauses[0].clause_type, "termination");
    }

    #[test]
    fn json_embedded_in_prose_is_parsed() {
        let reply = format!(
            "Sure! Here is the analysis you asked for:\n```json\n{}\n```\nLet me know if you need more.",
            valid_reply()
        );

        let resolver = ResponseResolver::new();
        let resolved = resolver.resolve_analysis(&reply, "source text", 1.0);
        assert_eq!(resolved.resolution, Resolution::Parsed);
        assert_eq!(resolved.result.ai_confidence, 0.85);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let reply = r#"{"document_summary": {"document_type": "NDA"}, "ai_confidence": 0.5}"#;
        let resolver = ResponseResolver::new();
        let resolved = resolver.resolve_analysis(reply, "source", 0.1);

        assert_eq!(resolved.resolution, Resolution::Parsed);
        let result = resolved.result;
        assert!(result.risk_assessment.red_flags.is_empty());
        assert_eq!(
            result.risk_assessment.overall_risk_level,
            RiskLevel::Unknown
        );
        assert!(result.obligations.mutual_obligations.is_empty());
        assert!(result.key_clauses.is_empty());
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let reply = r#"{"ai_confidence": 3.5}"#;
        let resolver = ResponseResolver::new();
        let resolved = resolver.resolve_analysis(reply, "source", 0.0);
        assert_eq!(resolved.result.ai_confidence, 1.0);
    }

    #[test]
    fn empty_reply_degrades_to_pattern_fallback() {
        let source = "This contract is between TechCorp Inc. and Jane Smith\nfor $120,000 per year.";
        let resolver = ResponseResolver::new();
        let resolved = resolver.resolve_analysis("", source, 0.5);

        assert_eq!(resolved.resolution, Resolution::Degraded);
        let result = resolved.result;
        assert_eq!(
            result.document_summary.key_parties,
            vec!["TechCorp Inc.", "Jane Smith"]
        );
        assert!(result
            .financial_terms
            .payment_amounts
            .contains(&"$120,000".to_string()));
        assert_eq!(result.risk_assessment.overall_risk_level, RiskLevel::Medium);
        assert_eq!(result.ai_confidence, 0.4);
    }

    #[test]
    fn malformed_json_degrades_to_pattern_fallback() {
        let resolver = ResponseResolver::new();
        let resolved =
            resolver.resolve_analysis("{\"document_summary\": oops}", "plain source", 0.5);
        assert_eq!(resolved.resolution, Resolution::Degraded);
        assert_eq!(resolved.result.ai_confidence, 0.4);
    }

    #[test]
    fn reversed_braces_degrade() {
        let resolver = ResponseResolver::new();
        let resolved = resolver.resolve_analysis("} nothing useful {", "source", 0.0);
        assert_eq!(resolved.resolution, Resolution::Degraded);
    }

    #[test]
    fn resolution_is_total_and_deterministic() {
        let resolver = ResponseResolver::new();
        for raw in ["", "{", "}{", "{{{", "no braces at all", "{\"a\":}"] {
            let first = resolver.resolve_analysis(raw, "same source", 1.0);
            let second = resolver.resolve_analysis(raw, "same source", 1.0);
            assert_eq!(
                serde_json::to_value(&first.result).unwrap(),
                serde_json::to_value(&second.result).unwrap()
            );
            assert!((0.0..=1.0).contains(&first.result.ai_confidence));
        }
    }

    #[test]
    fn error_analysis_carries_reason() {
        let resolver = ResponseResolver::new();
        let result = resolver.error_analysis("connection refused");

        assert_eq!(result.document_summary.document_type, "Analysis Error");
        assert!(result
            .document_summary
            .main_purpose
            .contains("connection refused"));
        assert_eq!(
            result.risk_assessment.overall_risk_level,
            RiskLevel::Unknown
        );
        assert!(result.risk_assessment.red_flags.is_empty());
        assert!(result.key_clauses.is_empty());
        assert_eq!(result.ai_confidence, 0.0);
        assert_eq!(result.processing_time_seconds, 0.0);
    }

    #[test]
    fn answer_without_braces_echoes_raw_text() {
        let resolver = ResponseResolver::new();
        let answer = resolver.resolve_answer("The term is 30 days.");

        assert_eq!(answer.answer, "The term is 30 days.");
        assert_eq!(answer.confidence, 0.7);
        assert_eq!(
            answer.relevant_clauses,
            vec!["Unable to extract specific clauses"]
        );
    }

    #[test]
    fn answer_with_invalid_json_echoes_raw_text() {
        let resolver = ResponseResolver::new();
        let answer = resolver.resolve_answer("{\"answer\": broken}");

        assert_eq!(answer.answer, "{\"answer\": broken}");
        assert_eq!(answer.confidence, 0.6);
        assert_eq!(answer.relevant_clauses, vec!["JSON parsing failed"]);
    }

    #[test]
    fn answer_with_valid_json_is_parsed() {
        let reply = r#"Noted. {"answer": "Thirty days.", "confidence": 0.9,
            "relevant_clauses": ["Section 3: Termination"],
            "additional_context": "Notice must be written."}"#;

        let resolver = ResponseResolver::new();
        let answer = resolver.resolve_answer(reply);

        assert_eq!(answer.answer, "Thirty days.");
        assert_eq!(answer.confidence, 0.9);
        assert_eq!(answer.relevant_clauses, vec!["Section 3: Termination"]);
    }

    #[test]
    fn answer_missing_fields_default() {
        let resolver = ResponseResolver::new();
        let answer = resolver.resolve_answer(r#"{"answer": "Yes."}"#);
        assert_eq!(answer.answer, "Yes.");
        assert_eq!(answer.confidence, 0.0);
        assert!(answer.relevant_clauses.is_empty());
    }
}
