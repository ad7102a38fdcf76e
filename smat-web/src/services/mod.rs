//! Outbound collaborators: LLM, external flow, PDF, markdown rendering

pub mod advisor;
pub mod langflow;
pub mod llm;
pub mod markdown;
pub mod pdf;

pub use advisor::LlmAdvisor;
pub use langflow::{LangflowClient, LangflowError, TranscriptHeader};
pub use llm::{ChatRequest, LlmError, LlmProvider, OpenAiCompatibleProvider};
pub use pdf::{ChromiumPdfRenderer, PdfError, PdfRenderer};
