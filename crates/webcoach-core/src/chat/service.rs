//! Chat engine: session lifecycle and message exchange.
//!
//! `ChatService` owns session creation, context assembly, the completion
//! call, and durable recording of each exchange. It holds no per-request
//! state; everything durable lives behind `ChatRepository`.
//!
//! Ownership failures and missing sessions are both reported as
//! `ChatError::NotFound` so a caller cannot probe for other users' sessions.

use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;
use webcoach_types::chat::{ChatSession, SessionSummary, Turn};
use webcoach_types::error::ChatError;
use webcoach_types::llm::{CompletionRequest, Message};

use crate::chat::prompt::{DEFAULT_SYSTEM_PROMPT, PROVIDER_CHECK_MESSAGE, build_context};
use crate::chat::repository::ChatRepository;
use crate::llm::box_provider::BoxLlmProvider;

/// Static settings for the engine, fixed at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub system_prompt: String,
    /// Empty means "provider default".
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: String::new(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Orchestrates chat sessions and message exchange.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (webcoach-core never depends on webcoach-infra).
pub struct ChatService<C: ChatRepository> {
    chat_repo: C,
    provider: BoxLlmProvider,
    config: EngineConfig,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(chat_repo: C, provider: BoxLlmProvider, config: EngineConfig) -> Self {
        Self {
            chat_repo,
            provider,
            config,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    // --- Session lifecycle ---

    /// Create an empty chat session for `owner_id` and return its id.
    pub async fn create_session(&self, owner_id: &Uuid) -> Result<Uuid, ChatError> {
        let session = ChatSession::new(*owner_id);
        self.chat_repo.insert_session(&session).await?;
        info!(session_id = %session.id, owner_id = %owner_id, "Chat session created");
        Ok(session.id)
    }

    /// Summaries of every session owned by `owner_id`.
    ///
    /// Order is whatever the store returns; callers needing a stable order
    /// must sort.
    pub async fn list_sessions(&self, owner_id: &Uuid) -> Result<Vec<SessionSummary>, ChatError> {
        Ok(self.chat_repo.list_sessions_by_owner(owner_id).await?)
    }

    /// Full turn history of a session, oldest first.
    pub async fn get_history(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<Vec<Turn>, ChatError> {
        let session = self.load_owned(session_id, owner_id).await?;
        Ok(session.turns)
    }

    /// Permanently delete a session owned by `owner_id`.
    pub async fn delete_session(&self, session_id: &Uuid, owner_id: &Uuid) -> Result<(), ChatError> {
        let deleted = self
            .chat_repo
            .delete_session_if_owned(session_id, owner_id)
            .await?;
        if deleted == 0 {
            return Err(ChatError::NotFound);
        }
        info!(session_id = %session_id, "Chat session deleted");
        Ok(())
    }

    // --- Message exchange ---

    /// Send `user_text` to the coach and record the exchange.
    ///
    /// The turn is appended only after the provider answers, in a single
    /// store operation, so a failed or abandoned call leaves history
    /// untouched.
    pub async fn send_message(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
        user_text: &str,
    ) -> Result<String, ChatError> {
        if user_text.is_empty() {
            return Err(ChatError::InvalidInput("message is required".to_string()));
        }

        let session = self.load_owned(session_id, owner_id).await?;

        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: build_context(&self.config.system_prompt, &session.turns, user_text),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = ?request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            session_id = %session_id,
            context_messages = request.messages.len(),
        );

        let started = Instant::now();
        let response = self
            .provider
            .complete(&request)
            .instrument(span)
            .await
            .map_err(|e| {
                warn!(session_id = %session_id, kind = e.kind(), error = %e, "Completion failed");
                ChatError::Provider(e)
            })?;
        let response_ms = started.elapsed().as_millis() as u64;

        debug!(
            session_id = %session_id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            response_ms,
            "Completion received"
        );

        let turn = Turn::now(user_text, response.content);
        let appended = self
            .chat_repo
            .append_turn(session_id, owner_id, &turn)
            .await?;
        if !appended {
            // Deleted (or never owned) while the provider call was in flight.
            warn!(session_id = %session_id, "Session vanished before turn could be recorded");
            return Err(ChatError::NotFound);
        }

        info!(session_id = %session_id, turns = session.turns.len() + 1, "Turn recorded");
        Ok(turn.ai_text)
    }

    /// Send a one-line probe to the provider and return its reply.
    pub async fn check_provider(&self) -> Result<String, ChatError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![Message::user(PROVIDER_CHECK_MESSAGE)],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let response = self.provider.complete(&request).await?;
        Ok(response.content)
    }

    /// Load a session and verify ownership, conflating both failures.
    async fn load_owned(&self, session_id: &Uuid, owner_id: &Uuid) -> Result<ChatSession, ChatError> {
        match self.chat_repo.get_session(session_id).await? {
            Some(session) if session.is_owned_by(owner_id) => Ok(session),
            _ => Err(ChatError::NotFound),
        }
    }
}
