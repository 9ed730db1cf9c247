//! Authentication service.
//!
//! Registers users, issues and revokes bearer tokens, and resolves a token
//! to the owning user. Only token hashes are ever handed to storage.

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use webcoach_types::error::AuthError;
use webcoach_types::user::{AuthSession, LoginGrant, User};

use crate::repository::user::{AuthSessionRepository, UserRepository};
use crate::service::hash::CredentialHasher;

/// Default lifetime of a login session.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Service gating access to the chat engine.
///
/// Generic over repository and hasher traits so the core never depends on
/// webcoach-infra.
pub struct AuthService<U: UserRepository, A: AuthSessionRepository, H: CredentialHasher> {
    user_repo: U,
    session_repo: A,
    hasher: H,
    session_ttl: Duration,
}

impl<U: UserRepository, A: AuthSessionRepository, H: CredentialHasher> AuthService<U, A, H> {
    pub fn new(user_repo: U, session_repo: A, hasher: H) -> Self {
        Self {
            user_repo,
            session_repo,
            hasher,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Override the login session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Register a new user. The username is stored trimmed.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        if self.user_repo.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self
            .hasher
            .hash_password(password)
            .map_err(AuthError::Storage)?;

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };
        // A concurrent registration can still win the race; the store's
        // unique constraint surfaces it as Conflict -> UsernameTaken.
        self.user_repo.create_user(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a new bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        let user = match self.user_repo.get_user_by_username(username).await? {
            Some(user) if self.hasher.verify_password(password, &user.password_hash) => user,
            _ => {
                debug!(username = %username, "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.hasher.generate_token();
        let now = Utc::now();
        let session = AuthSession {
            token_hash: self.hasher.hash_token(&token),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.session_repo.create_auth_session(&session).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginGrant {
            user,
            token,
            expires_at: session.expires_at,
        })
    }

    /// Revoke the login session behind `token`.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let removed = self
            .session_repo
            .delete_auth_session(&self.hasher.hash_token(token))
            .await?;
        if !removed {
            return Err(AuthError::Unauthenticated);
        }
        info!("User logged out");
        Ok(())
    }

    /// Resolve a bearer token to the owning user's id.
    pub async fn authenticate(&self, token: &str) -> Result<Uuid, AuthError> {
        Ok(self.current_user(token).await?.id)
    }

    /// Resolve a bearer token to the full user record.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }
        self.session_repo
            .find_user_for_token(&self.hasher.hash_token(token), Utc::now())
            .await?
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::DateTime;
    use webcoach_types::error::RepositoryError;

    // --- Mock implementations ---

    #[derive(Default, Clone)]
    struct MockStore {
        users: Arc<Mutex<HashMap<Uuid, User>>>,
        sessions: Arc<Mutex<HashMap<String, AuthSession>>>,
    }

    impl UserRepository for MockStore {
        async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.username == user.username) {
                return Err(RepositoryError::Conflict(user.username.clone()));
            }
            users.insert(user.id, user.clone());
            Ok(())
        }

        async fn get_user_by_username(
            &self,
            username: &str,
        ) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn get_user(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
            Ok(self.users.lock().unwrap().get(id).cloned())
        }
    }

    impl AuthSessionRepository for MockStore {
        async fn create_auth_session(&self, session: &AuthSession) -> Result<(), RepositoryError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.token_hash.clone(), session.clone());
            Ok(())
        }

        async fn find_user_for_token(
            &self,
            token_hash: &str,
            now: DateTime<Utc>,
        ) -> Result<Option<User>, RepositoryError> {
            let user_id = match self.sessions.lock().unwrap().get(token_hash) {
                Some(s) if !s.is_expired(now) => s.user_id,
                _ => return Ok(None),
            };
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }

        async fn delete_auth_session(&self, token_hash: &str) -> Result<bool, RepositoryError> {
            Ok(self.sessions.lock().unwrap().remove(token_hash).is_some())
        }
    }

    /// Reversible "hash" so tests can assert on stored values.
    struct MockHasher {
        counter: Mutex<u32>,
    }

    impl MockHasher {
        fn new() -> Self {
            Self {
                counter: Mutex::new(0),
            }
        }
    }

    impl CredentialHasher for MockHasher {
        fn hash_password(&self, password: &str) -> Result<String, String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> bool {
            hash == format!("hashed:{password}")
        }

        fn generate_token(&self) -> String {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            format!("token-{counter}")
        }

        fn hash_token(&self, token: &str) -> String {
            format!("sha:{token}")
        }
    }

    fn service() -> (AuthService<MockStore, MockStore, MockHasher>, MockStore) {
        let store = MockStore::default();
        let svc = AuthService::new(store.clone(), store.clone(), MockHasher::new());
        (svc, store)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (svc, store) = service();
        let user = svc.register("  alice ", "secret").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hashed:secret");

        let grant = svc.login("alice", "secret").await.unwrap();
        assert_eq!(grant.user.id, user.id);
        assert!(grant.expires_at > Utc::now());

        // Only the token hash is stored.
        let sessions = store.sessions.lock().unwrap();
        assert!(sessions.contains_key(&format!("sha:{}", grant.token)));
        assert!(!sessions.contains_key(&grant.token));
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let (svc, _) = service();
        for (u, p) in [("", "pw"), ("   ", "pw"), ("bob", ""), ("bob", "  ")] {
            assert!(matches!(
                svc.register(u, p).await,
                Err(AuthError::InvalidInput(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let (svc, _) = service();
        svc.register("alice", "one").await.unwrap();
        assert!(matches!(
            svc.register("alice", "two").await,
            Err(AuthError::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn test_store_conflict_maps_to_username_taken() {
        let (svc, store) = service();
        // Simulate a concurrent insert that the pre-check cannot see.
        let raced = User {
            id: Uuid::now_v7(),
            username: "alice".to_string(),
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        };
        assert!(store.create_user(&raced).await.is_ok());
        let err = store.create_user(&raced).await.unwrap_err();
        assert!(matches!(AuthError::from(err), AuthError::UsernameTaken));
        assert!(matches!(
            svc.register("alice", "pw").await,
            Err(AuthError::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let (svc, _) = service();
        svc.register("alice", "secret").await.unwrap();

        let wrong = svc.login("alice", "nope").await.unwrap_err();
        let unknown = svc.login("mallory", "secret").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_and_current_user() {
        let (svc, _) = service();
        let user = svc.register("alice", "secret").await.unwrap();
        let grant = svc.login("alice", "secret").await.unwrap();

        assert_eq!(svc.authenticate(&grant.token).await.unwrap(), user.id);
        assert_eq!(
            svc.current_user(&grant.token).await.unwrap().username,
            "alice"
        );
        assert!(matches!(
            svc.authenticate("forged").await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            svc.authenticate("").await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let store = MockStore::default();
        let svc = AuthService::new(store.clone(), store.clone(), MockHasher::new())
            .with_session_ttl(Duration::zero());
        svc.register("alice", "secret").await.unwrap();
        let grant = svc.login("alice", "secret").await.unwrap();

        assert!(matches!(
            svc.authenticate(&grant.token).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let (svc, _) = service();
        svc.register("alice", "secret").await.unwrap();
        let grant = svc.login("alice", "secret").await.unwrap();
        let other = svc.login("alice", "secret").await.unwrap();

        svc.logout(&grant.token).await.unwrap();
        assert!(matches!(
            svc.authenticate(&grant.token).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            svc.logout(&grant.token).await,
            Err(AuthError::Unauthenticated)
        ));
        // Other sessions for the same user survive.
        assert!(svc.authenticate(&other.token).await.is_ok());
    }
}
