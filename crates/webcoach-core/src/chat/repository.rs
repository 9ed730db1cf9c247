//! ChatRepository trait definition.
//!
//! A chat session is stored as a document: the session record plus its
//! ordered turns. Mutations that need an ownership check take the owner as
//! part of the same atomic operation.

use webcoach_types::chat::{ChatSession, SessionSummary, Turn};
use webcoach_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session persistence.
///
/// Implementations live in webcoach-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Persist a new session. Any turns already on it are ignored.
    fn insert_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load a session with all of its turns, oldest first.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Append one turn to a session owned by `owner_id`.
    ///
    /// Must be a single atomic operation. Returns `false` when no session
    /// with that id and owner exists; nothing is written in that case.
    fn append_turn(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete a session and its turns if it is owned by `owner_id`.
    ///
    /// Returns the number of sessions deleted (0 or 1).
    fn delete_session_if_owned(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Summaries of every session owned by `owner_id`, in store-defined order.
    fn list_sessions_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, RepositoryError>> + Send;
}
