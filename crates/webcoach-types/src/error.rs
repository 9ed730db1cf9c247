use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by the chat engine.
///
/// `NotFound` deliberately covers both "no such session" and "session owned
/// by someone else". Callers are authenticated before reaching the engine, so
/// `Unauthenticated` lives on [`AuthError`].
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("chat not found")]
    NotFound,

    #[error("completion provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other.to_string()),
        }
    }
}

/// Errors related to registration, login, and identity resolution.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => AuthError::UsernameTaken,
            other => AuthError::Storage(other.to_string()),
        }
    }
}

/// Errors from repository operations (used by trait definitions in webcoach-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_chat_error_from_repository_not_found() {
        let err: ChatError = RepositoryError::NotFound.into();
        assert!(matches!(err, ChatError::NotFound));
    }

    #[test]
    fn test_chat_error_from_repository_query_is_storage() {
        let err: ChatError = RepositoryError::Query("disk I/O error".into()).into();
        match err {
            ChatError::Storage(msg) => assert!(msg.contains("disk I/O error")),
            other => panic!("expected Storage, got {other:?}"),
        }
    }

    #[test]
    fn test_chat_error_wraps_provider_message() {
        let err: ChatError = LlmError::Provider {
            message: "model overloaded".into(),
        }
        .into();
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn test_auth_error_from_conflict() {
        let err: AuthError = RepositoryError::Conflict("username".into()).into();
        assert!(matches!(err, AuthError::UsernameTaken));
    }
}
