//! User and login-session repository traits.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use webcoach_types::error::RepositoryError;
use webcoach_types::user::{AuthSession, User};

/// Storage for registered users.
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the username is already taken.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Look up a user by exact username.
    fn get_user_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look up a user by id.
    fn get_user(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;
}

/// Storage for server-side login sessions, keyed by token hash.
pub trait AuthSessionRepository: Send + Sync {
    fn create_auth_session(
        &self,
        session: &AuthSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve a token hash to the owning user, ignoring sessions that
    /// expired at or before `now`.
    fn find_user_for_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Delete a login session. Returns `true` if a row was removed.
    fn delete_auth_session(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
