//! SQLite user and login-session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;
use webcoach_core::repository::user::{AuthSessionRepository, UserRepository};
use webcoach_types::error::RepositoryError;
use webcoach_types::user::{AuthSession, User};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `UserRepository` and `AuthSessionRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Remove login sessions that expired at or before `now`.
    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
            .bind(format_datetime(&now))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

/// Internal row type for mapping SQLite rows to domain User.
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            username: self.username,
            password_hash: self.password_hash,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_user_row(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<User>, RepositoryError> {
    match row {
        Some(row) => {
            let user_row =
                UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(user_row.into_user()?))
        }
        None => Ok(None),
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(format_datetime(&user.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("username '{}' already exists", user.username)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        map_user_row(row)
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        map_user_row(row)
    }
}

impl AuthSessionRepository for SqliteUserRepository {
    async fn create_auth_session(&self, session: &AuthSession) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token_hash)
        .bind(session.user_id.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.expires_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn find_user_for_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT u.* FROM auth_sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = ? AND s.expires_at > ?"#,
        )
        .bind(token_hash)
        .bind(format_datetime(&now))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        map_user_row(row)
    }

    async fn delete_auth_session(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sqlite::pool::tests::test_pool;
    use chrono::Duration;

    pub(crate) fn make_user(username: &str) -> User {
        User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$salt$hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("alice");
        repo.create_user(&user).await.unwrap();

        let by_name = repo.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.password_hash, user.password_hash);

        let by_id = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(repo.get_user_by_username("bob").await.unwrap().is_none());
        assert!(repo.get_user(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_conflict() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create_user(&make_user("alice")).await.unwrap();

        let err = repo.create_user(&make_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_lookup_respects_expiry() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("alice");
        repo.create_user(&user).await.unwrap();

        let now = Utc::now();
        let session = AuthSession {
            token_hash: "abc123".to_string(),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::hours(24),
        };
        repo.create_auth_session(&session).await.unwrap();

        let found = repo.find_user_for_token("abc123", now).await.unwrap();
        assert_eq!(found.unwrap().id, user.id);

        let later = now + Duration::hours(25);
        assert!(repo.find_user_for_token("abc123", later).await.unwrap().is_none());
        assert!(repo.find_user_for_token("other", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_and_purge_sessions() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("alice");
        repo.create_user(&user).await.unwrap();

        let now = Utc::now();
        for (hash, ttl) in [("live", 24), ("stale", -1)] {
            repo.create_auth_session(&AuthSession {
                token_hash: hash.to_string(),
                user_id: user.id,
                created_at: now,
                expires_at: now + Duration::hours(ttl),
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.purge_expired_sessions(now).await.unwrap(), 1);
        assert!(repo.delete_auth_session("live").await.unwrap());
        assert!(!repo.delete_auth_session("live").await.unwrap());
    }
}
