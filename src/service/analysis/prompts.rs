//! Prompts for document analysis and question answering

use crate::model::DocumentSummary;

/// Build the comprehensive analysis prompt for a document.
///
/// The embedded JSON shape must stay in sync with the `AnalysisResult` model:
/// the resolver decodes the model's reply against those exact field names.
pub fn build_analysis_prompt(document_text: &str, document_name: &str) -> String {
    format!(
        r#"Please analyze this legal document: "{document_name}"

Document Text:
{document_text}

Provide a comprehensive analysis in the following JSON format:
{{
    "document_summary": {{
        "document_type": "contract type (e.g., Employment Agreement, Service Agreement)",
        "key_parties": ["Party 1", "Party 2"],
        "main_purpose": "Brief description of the agreement's purpose",
        "effective_date": "date if mentioned",
        "expiration_date": "date if mentioned"
    }},
    "risk_assessment": {{
        "overall_risk_level": "Low/Medium/High",
        "red_flags": ["List of concerning clauses"],
        "yellow_flags": ["List of clauses needing attention"],
        "green_flags": ["List of favorable clauses"]
    }},
    "financial_terms": {{
        "payment_amounts": ["Any monetary amounts mentioned"],
        "payment_schedules": ["Payment timing details"],
        "penalties": ["Financial penalties or liquidated damages"],
        "fees": ["Any fees mentioned"]
    }},
    "obligations": {{
        "party_1_obligations": ["What first party must do"],
        "party_2_obligations": ["What second party must do"],
        "mutual_obligations": ["Shared responsibilities"]
    }},
    "key_clauses": [
        {{
            "clause_type": "termination/liability/confidentiality/etc",
            "clause_text": "Actual clause text",
            "plain_language": "Simple explanation",
            "importance": "High/Medium/Low"
        }}
    ],
    "ai_confidence": 0.85
}}

Make sure to provide accurate, detailed analysis. Focus on practical implications for non-lawyers."#
    )
}

/// Build the question-answering prompt, optionally grounded with the summary
/// of a previous analysis.
pub fn build_question_prompt(
    document_text: &str,
    question: &str,
    context: Option<&DocumentSummary>,
) -> String {
    let context_block = context
        .and_then(|summary| serde_json::to_string_pretty(summary).ok())
        .map(|json| format!("Previous analysis context: {}\n", json))
        .unwrap_or_default();

    format!(
        r#"Based on this legal document, please answer the user's question:

Document Text:
{document_text}

{context_block}
User Question: {question}

Please respond in JSON format:
{{
    "answer": "Direct answer to the question",
    "confidence": 0.85,
    "relevant_clauses": ["Specific clauses that support this answer"],
    "additional_context": "Any additional relevant information"
}}

Provide a clear, accurate answer based on the document content."#
    )
}
