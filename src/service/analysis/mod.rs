//! Document analysis pipeline
//!
//! Composes prompt construction, model invocation, and response resolution
//! into the two operations callers use: `analyze` and `answer_question`.

use std::time::Instant;

use crate::model::{DocumentSummary, QuestionAnswer};
use crate::service::llm::{GatewayError, ModelGateway};

pub mod fallback;
pub mod prompts;
pub mod resolver;

pub use resolver::{Resolution, ResolvedAnalysis};

use resolver::ResponseResolver;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No generative client was configured at startup; callers should surface
    /// a service-unavailable condition instead of degrading silently.
    #[error("Analysis service is unavailable: generative model client is not configured")]
    ModelUnavailable,
}

/// Orchestrates the analysis pipeline.
///
/// Stateless across calls: concurrent analyses share only the injected model
/// client, which is used read-only.
pub struct AnalysisService {
    gateway: ModelGateway,
    resolver: ResponseResolver,
}

impl AnalysisService {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            gateway,
            resolver: ResponseResolver::new(),
        }
    }

    /// Whether the underlying model client is configured
    pub fn is_available(&self) -> bool {
        self.gateway.is_available()
    }

    /// Run the full analysis pipeline over a document.
    ///
    /// Model invocation failures and unparseable replies degrade to the
    /// resolver's fallback paths; only a missing model client is an error.
    pub async fn analyze(
        &self,
        document_text: &str,
        document_name: &str,
    ) -> Result<ResolvedAnalysis, AnalysisError> {
        if !self.gateway.is_available() {
            return Err(AnalysisError::ModelUnavailable);
        }

        let started = Instant::now();
        let prompt = prompts::build_analysis_prompt(document_text, document_name);

        let mut resolved = match self.gateway.invoke(&prompt).await {
            Ok(raw) => self
                .resolver
                .resolve_analysis(&raw.text, document_text, raw.elapsed_seconds),
            Err(GatewayError::ModelUnavailable) => return Err(AnalysisError::ModelUnavailable),
            Err(GatewayError::InvocationFailed(reason)) => ResolvedAnalysis {
                result: self.resolver.error_analysis(&reason),
                resolution: Resolution::Error,
            },
        };

        // The externally reported figure is the orchestrator total; the
        // degraded path keeps the model-call latency measured by the gateway
        // and the error path stays at zero.
        if resolved.resolution == Resolution::Parsed {
            resolved.result.processing_time_seconds = started.elapsed().as_secs_f64();
        }

        tracing::info!(
            document_name = %document_name,
            resolution = ?resolved.resolution,
            ai_confidence = resolved.result.ai_confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Document analysis complete"
        );

        Ok(resolved)
    }

    /// Answer a question about a document, optionally grounded with the
    /// summary of a previous analysis.
    ///
    /// Never fails outward except when no model client is configured: an
    /// invocation failure becomes an error-carrying answer.
    pub async fn answer_question(
        &self,
        document_text: &str,
        question: &str,
        context: Option<&DocumentSummary>,
    ) -> Result<QuestionAnswer, AnalysisError> {
        if !self.gateway.is_available() {
            return Err(AnalysisError::ModelUnavailable);
        }

        let prompt = prompts::build_question_prompt(document_text, question, context);

        let answer = match self.gateway.invoke(&prompt).await {
            Ok(raw) => self.resolver.resolve_answer(&raw.text),
            Err(GatewayError::ModelUnavailable) => return Err(AnalysisError::ModelUnavailable),
            Err(GatewayError::InvocationFailed(reason)) => QuestionAnswer {
                answer: format!("Error processing question: {}", reason),
                confidence: 0.0,
                relevant_clauses: Vec::new(),
                additional_context: "Error occurred during processing".to_string(),
            },
        };

        tracing::info!(
            question_chars = question.len(),
            confidence = answer.confidence,
            "Question answered"
        );

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::model::RiskLevel;
    use crate::service::llm::{GenerativeClient, GenerativeError};

    struct FixedClient(String);

    #[async_trait]
    impl GenerativeClient for FixedClient {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerativeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl GenerativeClient for FailingClient {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerativeError> {
            Err(GenerativeError::Api {
                status: 502,
                message: "upstream unavailable".to_string(),
            })
        }
    }

    fn service_with(client: Arc<dyn GenerativeClient>) -> AnalysisService {
        AnalysisService::new(ModelGateway::new(Some(client)))
    }

    #[tokio::test]
    async fn parsed_reply_reports_orchestrator_total_time() {
        let reply = r#"{"document_summary": {"document_type": "NDA"}, "ai_confidence": 0.9}"#;
        let service = service_with(Arc::new(FixedClient(reply.to_string())));

        let resolved = service.analyze("Some document text.", "nda.txt").await.unwrap();
        assert_eq!(resolved.resolution, Resolution::Parsed);
        assert_eq!(resolved.result.document_summary.document_type, "NDA");
        assert!(resolved.result.processing_time_seconds >= 0.0);
    }

    #[tokio::test]
    async fn unusable_reply_degrades() {
        let service = service_with(Arc::new(FixedClient("I cannot help with that.".to_string())));

        let resolved = service
            .analyze("Agreement between Acme Corp and Widget LLC\nworth $5,000.", "deal.txt")
            .await
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Degraded);
        assert_eq!(
            resolved.result.document_summary.key_parties,
            vec!["Acme Corp", "Widget LLC"]
        );
        assert_eq!(resolved.result.ai_confidence, 0.4);
    }

    #[tokio::test]
    async fn invocation_failure_becomes_error_result() {
        let service = service_with(Arc::new(FailingClient));

        let resolved = service.analyze("Some document text.", "doc.txt").await.unwrap();
        assert_eq!(resolved.resolution, Resolution::Error);
        assert_eq!(
            resolved.result.document_summary.document_type,
            "Analysis Error"
        );
        assert_eq!(
            resolved.result.risk_assessment.overall_risk_level,
            RiskLevel::Unknown
        );
        assert_eq!(resolved.result.ai_confidence, 0.0);
        assert_eq!(resolved.result.processing_time_seconds, 0.0);
    }

    #[tokio::test]
    async fn missing_client_is_a_hard_error() {
        let service = AnalysisService::new(ModelGateway::new(None));
        assert!(!service.is_available());

        let err = service.analyze("text", "doc").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ModelUnavailable));

        let err = service.answer_question("text", "question?", None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::ModelUnavailable));
    }

    #[tokio::test]
    async fn question_invocation_failure_never_raises() {
        let service = service_with(Arc::new(FailingClient));

        let answer = service
            .answer_question("Document text.", "What is the notice period?", None)
            .await
            .unwrap();

        assert_eq!(answer.confidence, 0.0);
        assert!(answer.answer.contains("Error processing question"));
        assert!(answer.relevant_clauses.is_empty());
    }

    #[tokio::test]
    async fn question_with_parsed_reply() {
        let reply = r#"{"answer": "Thirty days.", "confidence": 0.8, "relevant_clauses": ["Termination"], "additional_context": ""}"#;
        let service = service_with(Arc::new(FixedClient(reply.to_string())));

        let summary = DocumentSummary {
            document_type: "Service Agreement".to_string(),
            ..Default::default()
        };

        let answer = service
            .answer_question("Document text.", "What is the notice period?", Some(&summary))
            .await
            .unwrap();

        assert_eq!(answer.answer, "Thirty days.");
        assert_eq!(answer.confidence, 0.8);
    }
}
