//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/hasher traits, but AppState pins them
//! to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use webcoach_core::chat::prompt::DEFAULT_SYSTEM_PROMPT;
use webcoach_core::chat::service::{ChatService, EngineConfig};
use webcoach_core::llm::box_provider::BoxLlmProvider;
use webcoach_core::service::auth::AuthService;
use webcoach_infra::config::{load_global_config, resolve_api_key, resolve_data_dir};
use webcoach_infra::crypto::credentials::Argon2CredentialHasher;
use webcoach_infra::llm::create_provider;
use webcoach_infra::sqlite::chat::SqliteChatRepository;
use webcoach_infra::sqlite::pool::{DatabasePool, database_url};
use webcoach_infra::sqlite::user::SqliteUserRepository;
use webcoach_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteAuthService =
    AuthService<SqliteUserRepository, SqliteUserRepository, Argon2CredentialHasher>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub auth_service: Arc<ConcreteAuthService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB,
    /// build the completion provider, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open database")?;

        let provider = create_provider(&config.llm, resolve_api_key(&config.llm))
            .with_context(|| {
                format!(
                    "no API key for provider '{}': set {}",
                    config.llm.provider_name, config.llm.api_key_env
                )
            })?;

        tracing::info!(
            data_dir = %data_dir.display(),
            provider = provider.name(),
            model = %config.llm.model,
            "Application state initialized"
        );

        Ok(Self::build(config, data_dir, db_pool, provider))
    }

    /// Wire services from already-constructed parts.
    pub fn build(
        config: GlobalConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
    ) -> Self {
        let engine_config = EngineConfig {
            system_prompt: config
                .chat
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        };

        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            provider,
            engine_config,
        );

        let user_repo = SqliteUserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(
            user_repo.clone(),
            user_repo,
            Argon2CredentialHasher::new(),
        )
        .with_session_ttl(chrono::Duration::hours(i64::from(
            config.auth.session_ttl_hours,
        )));

        Self {
            chat_service: Arc::new(chat_service),
            auth_service: Arc::new(auth_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
