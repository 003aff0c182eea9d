//! Generative model client and invocation gateway
//!
//! The model is consumed as a capability: a trait object injected at startup
//! so the analysis pipeline never depends on a concrete provider and tests
//! can substitute a deterministic fake.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable overriding the analysis model
const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// System instruction fixed at client construction time
const SYSTEM_INSTRUCTION: &str = "You are a legal AI assistant specializing in contract analysis. \
Your role is to:\n\
1. Analyze legal documents and extract key information\n\
2. Identify risks, obligations, and important clauses\n\
3. Provide plain-language explanations of complex legal terms\n\
4. Answer questions about specific contract provisions\n\n\
Always provide accurate, helpful analysis while noting that this is not legal advice.";

#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no candidates")]
    EmptyResponse,
}

/// Capability consumed by the analysis pipeline: a prompt in, raw text out
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError>;
}

// Request/response shapes for the Gemini generateContent REST API

#[derive(Serialize)]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini implementation of the generative capability
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from the API key.
    ///
    /// The model defaults to gemini-2.5-flash and can be overridden with the
    /// ANALYSIS_MODEL environment variable.
    pub fn new(api_key: String) -> Result<Self, GenerativeError> {
        let model = std::env::var(ENV_ANALYSIS_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        tracing::info!(model = %model, "Gemini client initialized");

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        let text: String = body
            .candidates
            .first()
            .ok_or(GenerativeError::EmptyResponse)?
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(GenerativeError::EmptyResponse);
        }

        Ok(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Generative model client is not configured")]
    ModelUnavailable,

    #[error("Model invocation failed: {0}")]
    InvocationFailed(String),
}

/// Raw model output plus the measured model-call latency
#[derive(Debug, Clone)]
pub struct RawModelResponse {
    pub text: String,
    pub elapsed_seconds: f64,
}

/// Single entry point for model invocations.
///
/// Owns the timing of the model call itself; orchestration-level timing is
/// measured by the caller.
pub struct ModelGateway {
    client: Option<Arc<dyn GenerativeClient>>,
}

impl ModelGateway {
    pub fn new(client: Option<Arc<dyn GenerativeClient>>) -> Self {
        Self { client }
    }

    /// Whether a generative client was configured at startup
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Invoke the model with the given prompt
    pub async fn invoke(&self, prompt: &str) -> Result<RawModelResponse, GatewayError> {
        let client = self.client.as_ref().ok_or(GatewayError::ModelUnavailable)?;

        let started = Instant::now();
        match client.generate(prompt).await {
            Ok(text) => {
                let elapsed_seconds = started.elapsed().as_secs_f64();
                tracing::debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    response_chars = text.len(),
                    "Model invocation completed"
                );
                Ok(RawModelResponse {
                    text,
                    elapsed_seconds,
                })
            }
            Err(e) => {
                tracing::error!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Model invocation failed"
                );
                Err(GatewayError::InvocationFailed(e.to_string()))
            }
        }
    }
}
