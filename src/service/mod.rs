pub mod analysis;
pub mod cache;
pub mod llm;

pub use analysis::AnalysisService;
pub use cache::AnalysisCache;
pub use llm::{GeminiClient, ModelGateway};
