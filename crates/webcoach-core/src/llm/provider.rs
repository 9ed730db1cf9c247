//! LlmProvider trait definition.
//!
//! This is the completion-provider port: given an ordered list of
//! role-tagged messages, return one generated assistant message or fail.

use webcoach_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (OpenAI and OpenAI-compatible APIs).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in webcoach-infra (e.g., `OpenAiCompatibleProvider`).
/// Implementations do not retry; a failed call surfaces immediately.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
