//! Completion provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`] trait
//! defined in `webcoach-core`, plus a factory ([`create_provider`]) that
//! builds it from the `[llm]` config section.
//!
//! [`LlmProvider`]: webcoach_core::llm::provider::LlmProvider

pub mod openai_compat;

use secrecy::SecretString;

use webcoach_core::llm::box_provider::BoxLlmProvider;
use webcoach_types::config::LlmConfig;
use webcoach_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, default_base_url};

/// Create a [`BoxLlmProvider`] from the `[llm]` config section.
///
/// The base URL is `llm.base_url` when set, otherwise inferred from
/// `provider_name` for well-known providers (unknown names fall back to
/// OpenAI). An API key is required unless an explicit `base_url` points at
/// a server that does not check one.
///
/// # Errors
///
/// Returns `LlmError::AuthenticationFailed` if no API key is available and
/// no explicit base URL is configured.
pub fn create_provider(
    llm: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let base_url = match llm.base_url.as_deref() {
        Some(url) => url.to_string(),
        None => default_base_url(&llm.provider_name)
            .unwrap_or(openai_compat::config::OPENAI_BASE_URL)
            .to_string(),
    };

    let api_key = match (api_key, llm.base_url.is_some()) {
        (Some(key), _) => key,
        (None, true) => SecretString::from("unused"),
        (None, false) => return Err(LlmError::AuthenticationFailed),
    };

    tracing::debug!(
        provider = %llm.provider_name,
        base_url = %base_url,
        model = %llm.model,
        "Creating completion provider"
    );

    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig {
        provider_name: llm.provider_name.clone(),
        base_url,
        api_key,
        model: llm.model.clone(),
    });
    Ok(BoxLlmProvider::new(provider))
}
