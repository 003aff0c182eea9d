//! Deterministic pattern-matching analysis
//!
//! Produces a structurally complete, low-confidence result from the source
//! document alone when the model's reply cannot be parsed. Total over any
//! input: a document with no matches yields placeholder values.

use regex::Regex;

use crate::model::{AnalysisResult, RiskLevel};

/// Confidence reported for pattern-matched results
const FALLBACK_CONFIDENCE: f64 = 0.4;
/// At most this many monetary matches are kept
const MAX_PAYMENT_MATCHES: usize = 5;

const PLACEHOLDER_PARTIES: [&str; 2] = ["Party 1", "Party 2"];
const DATE_NOT_SPECIFIED: &str = "Not specified";

/// Pattern-based document scanner with pre-compiled expressions
pub struct PatternAnalyzer {
    parties: Regex,
    dates: Regex,
    monetary: Regex,
    termination: Regex,
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self {
            // "between X and Y" with both names stopping at a comma or newline
            parties: Regex::new(r"(?i)between\s+([^,\n]+)\s+and\s+([^,\n]+)").unwrap(),
            // numeric dd/mm/yyyy-style or "Month day, year"-style tokens
            dates: Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\w+\s+\d{1,2},?\s+\d{4}\b")
                .unwrap(),
            // currency-prefixed amount with optional thousands separators and cents
            monetary: Regex::new(r"\$[\d,]+(?:\.\d{2})?").unwrap(),
            termination: Regex::new(r"(?i)terminat\w*|expir\w*|end\s+of\s+agreement").unwrap(),
        }
    }

    /// Build a degraded analysis from the source document text
    pub fn analyze(&self, document_text: &str, elapsed_seconds: f64) -> AnalysisResult {
        let mut result = AnalysisResult::default();

        result.document_summary.document_type = "Legal Document".to_string();
        result.document_summary.main_purpose =
            "Document analysis using pattern matching".to_string();
        result.document_summary.key_parties = self.key_parties(document_text);
        result.document_summary.effective_date = self
            .dates
            .find(document_text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DATE_NOT_SPECIFIED.to_string());
        result.document_summary.expiration_date = DATE_NOT_SPECIFIED.to_string();

        result.risk_assessment.overall_risk_level = RiskLevel::Medium;
        result.risk_assessment.red_flags =
            vec!["AI analysis unavailable - manual review recommended".to_string()];
        result.risk_assessment.yellow_flags = vec!["Document requires legal review".to_string()];
        if self.termination.is_match(document_text) {
            result
                .risk_assessment
                .yellow_flags
                .push("Termination or expiration language detected - review notice periods".to_string());
        }

        result.financial_terms.payment_amounts = self
            .monetary
            .find_iter(document_text)
            .take(MAX_PAYMENT_MATCHES)
            .map(|m| m.as_str().to_string())
            .collect();

        result.ai_confidence = FALLBACK_CONFIDENCE;
        result.processing_time_seconds = elapsed_seconds;

        result
    }

    fn key_parties(&self, document_text: &str) -> Vec<String> {
        match self.parties.captures(document_text) {
            Some(caps) => vec![
                caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
                caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            ],
            None => PLACEHOLDER_PARTIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_parties_dates_and_amounts() {
        let document = "This Employment Agreement is entered into as of January 1, 2025, \
                        between TechCorp Inc. and Jane Smith\nwith a base salary of $120,000 per year.";

        let analyzer = PatternAnalyzer::new();
        let result = analyzer.analyze(document, 1.5);

        assert_eq!(
            result.document_summary.key_parties,
            vec!["TechCorp Inc.", "Jane Smith"]
        );
        assert_eq!(result.document_summary.effective_date, "January 1, 2025");
        assert_eq!(result.financial_terms.payment_amounts, vec!["$120,000"]);
        assert_eq!(result.risk_assessment.overall_risk_level, RiskLevel::Medium);
        assert_eq!(result.ai_confidence, 0.4);
        assert_eq!(result.processing_time_seconds, 1.5);
    }

    #[test]
    fn placeholder_parties_when_pattern_absent() {
        let analyzer = PatternAnalyzer::new();
        let result = analyzer.analyze("No party phrasing appears in this text.", 0.0);

        assert_eq!(
            result.document_summary.key_parties,
            vec!["Party 1", "Party 2"]
        );
        assert_eq!(result.document_summary.effective_date, "Not specified");
        assert!(result.financial_terms.payment_amounts.is_empty());
    }

    #[test]
    fn numeric_dates_matched() {
        let analyzer = PatternAnalyzer::new();
        let result = analyzer.analyze("Effective 12/31/2024 until further notice.", 0.0);
        assert_eq!(result.document_summary.effective_date, "12/31/2024");
    }

    #[test]
    fn monetary_matches_capped_at_five_and_keep_cents() {
        let document = "$1.00 $2,500.50 $3 $4 $5 $6 $7";
        let analyzer = PatternAnalyzer::new();
        let result = analyzer.analyze(document, 0.0);

        assert_eq!(
            result.financial_terms.payment_amounts,
            vec!["$1.00", "$2,500.50", "$3", "$4", "$5"]
        );
    }

    #[test]
    fn termination_language_adds_yellow_flag() {
        let analyzer = PatternAnalyzer::new();
        let result = analyzer.analyze(
            "Either party may terminate this Agreement with 30 days notice.",
            0.0,
        );
        assert_eq!(result.risk_assessment.yellow_flags.len(), 2);

        let quiet = analyzer.analyze("Nothing about endings here.", 0.0);
        assert_eq!(quiet.risk_assessment.yellow_flags.len(), 1);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let document = "Agreement between Alpha LLC and Beta Corp for $9,999.99 signed March 3, 2025.";
        let analyzer = PatternAnalyzer::new();

        let first = serde_json::to_value(analyzer.analyze(document, 2.0)).unwrap();
        let second = serde_json::to_value(analyzer.analyze(document, 2.0)).unwrap();
        assert_eq!(first, second);
    }
}
