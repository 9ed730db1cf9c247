//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `webcoach-core` using sqlx with split
//! read/write pools. Turns live in `chat_turns`; their AUTOINCREMENT `seq`
//! column is the authoritative turn order.

use sqlx::Row;
use uuid::Uuid;
use webcoach_core::chat::repository::ChatRepository;
use webcoach_types::chat::{ChatSession, SessionSummary, Turn};
use webcoach_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    owner_id: String,
    created_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_session(self, turns: Vec<Turn>) -> Result<ChatSession, RepositoryError> {
        Ok(ChatSession {
            id: parse_uuid(&self.id, "session id")?,
            owner_id: parse_uuid(&self.owner_id, "owner_id")?,
            created_at: parse_datetime(&self.created_at)?,
            turns,
        })
    }
}

struct TurnRow {
    user_text: String,
    ai_text: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_text: row.try_get("user_text")?,
            ai_text: row.try_get("ai_text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        Ok(Turn {
            user_text: self.user_text,
            ai_text: self.ai_text,
            timestamp: parse_datetime(&self.created_at)?,
        })
    }
}

struct SummaryRow {
    id: String,
    created_at: String,
    last_user_text: Option<String>,
}

impl SummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            last_user_text: row.try_get("last_user_text")?,
        })
    }

    fn into_summary(self) -> Result<SessionSummary, RepositoryError> {
        Ok(SessionSummary {
            id: parse_uuid(&self.id, "session id")?,
            created_at: parse_datetime(&self.created_at)?,
            last_user_text: self.last_user_text,
        })
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn insert_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO chat_sessions (id, owner_id, created_at) VALUES (?, ?, ?)")
            .bind(session.id.to_string())
            .bind(session.owner_id.to_string())
            .bind(format_datetime(&session.created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        // One read transaction: the session row and its turns come from the
        // same snapshot, even if a delete commits in between.
        let mut tx = self
            .pool
            .reader
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT id, owner_id, created_at FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let session_row =
            ChatSessionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;

        let rows = sqlx::query(
            "SELECT user_text, ai_text, created_at FROM chat_turns WHERE session_id = ? ORDER BY seq ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(Some(session_row.into_session(turns)?))
    }

    async fn append_turn(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
        turn: &Turn,
    ) -> Result<bool, RepositoryError> {
        // Single statement: the ownership check and the insert cannot interleave
        // with a concurrent delete.
        let result = sqlx::query(
            r#"INSERT INTO chat_turns (session_id, user_text, ai_text, created_at)
               SELECT id, ?, ?, ? FROM chat_sessions WHERE id = ? AND owner_id = ?"#,
        )
        .bind(&turn.user_text)
        .bind(&turn.ai_text)
        .bind(format_datetime(&turn.timestamp))
        .bind(session_id.to_string())
        .bind(owner_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_session_if_owned(
        &self,
        session_id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ? AND owner_id = ?")
            .bind(session_id.to_string())
            .bind(owner_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn list_sessions_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<SessionSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT s.id, s.created_at,
                      (SELECT t.user_text FROM chat_turns t
                       WHERE t.session_id = s.id
                       ORDER BY t.seq DESC LIMIT 1) AS last_user_text
               FROM chat_sessions s
               WHERE s.owner_id = ?
               ORDER BY s.created_at DESC, s.id DESC"#,
        )
        .bind(owner_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let summary_row =
                SummaryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            summaries.push(summary_row.into_summary()?);
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::tests::test_pool;
    use crate::sqlite::user::SqliteUserRepository;
    use crate::sqlite::user::tests::make_user;
    use webcoach_core::repository::user::UserRepository;

    /// Pool plus one registered user (needed for the owner FK).
    async fn setup() -> (SqliteChatRepository, DatabasePool, Uuid) {
        let pool = test_pool().await;
        let user = make_user("owner");
        SqliteUserRepository::new(pool.clone())
            .create_user(&user)
            .await
            .unwrap();
        (SqliteChatRepository::new(pool.clone()), pool, user.id)
    }

    #[tokio::test]
    async fn test_insert_and_get_session() {
        let (repo, _, owner) = setup().await;
        let session = ChatSession::new(owner);
        repo.insert_session(&session).await.unwrap();

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.owner_id, owner);
        assert!(found.turns.is_empty());

        assert!(repo.get_session(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (repo, _, owner) = setup().await;
        let session = ChatSession::new(owner);
        repo.insert_session(&session).await.unwrap();

        for i in 0..5 {
            let turn = Turn::now(format!("q{i}"), format!("a{i}"));
            assert!(repo.append_turn(&session.id, &owner, &turn).await.unwrap());
        }

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        let users: Vec<&str> = found.turns.iter().map(|t| t.user_text.as_str()).collect();
        assert_eq!(users, ["q0", "q1", "q2", "q3", "q4"]);
        assert_eq!(found.turns[4].ai_text, "a4");
    }

    #[tokio::test]
    async fn test_append_rejects_foreign_owner_and_missing_session() {
        let (repo, _, owner) = setup().await;
        let session = ChatSession::new(owner);
        repo.insert_session(&session).await.unwrap();

        let turn = Turn::now("hi", "hello");
        assert!(!repo.append_turn(&session.id, &Uuid::now_v7(), &turn).await.unwrap());
        assert!(!repo.append_turn(&Uuid::now_v7(), &owner, &turn).await.unwrap());

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert!(found.turns.is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_turns() {
        let (repo, pool, owner) = setup().await;
        let session = ChatSession::new(owner);
        repo.insert_session(&session).await.unwrap();
        repo.append_turn(&session.id, &owner, &Turn::now("q", "a"))
            .await
            .unwrap();

        assert_eq!(
            repo.delete_session_if_owned(&session.id, &Uuid::now_v7())
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            repo.delete_session_if_owned(&session.id, &owner).await.unwrap(),
            1
        );
        assert!(repo.get_session(&session.id).await.unwrap().is_none());

        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_turns WHERE session_id = ?")
            .bind(session.id.to_string())
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(remaining.0, 0);

        // Appending after deletion records nothing.
        assert!(!repo
            .append_turn(&session.id, &owner, &Turn::now("late", "reply"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_list_sessions_by_owner() {
        let (repo, pool, owner) = setup().await;
        let other = make_user("other");
        SqliteUserRepository::new(pool.clone())
            .create_user(&other)
            .await
            .unwrap();

        let empty = ChatSession::new(owner);
        let active = ChatSession::new(owner);
        repo.insert_session(&empty).await.unwrap();
        repo.insert_session(&active).await.unwrap();
        repo.insert_session(&ChatSession::new(other.id)).await.unwrap();
        repo.append_turn(&active.id, &owner, &Turn::now("first", "a"))
            .await
            .unwrap();
        repo.append_turn(&active.id, &owner, &Turn::now("latest", "b"))
            .await
            .unwrap();

        let listed = repo.list_sessions_by_owner(&owner).await.unwrap();
        assert_eq!(listed.len(), 2);

        // Newest first.
        assert_eq!(listed[0].id, active.id);
        assert_eq!(listed[0].last_user_text.as_deref(), Some("latest"));
        assert_eq!(listed[1].id, empty.id);
        assert_eq!(listed[1].last_user_text, None);

        assert!(repo
            .list_sessions_by_owner(&Uuid::now_v7())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_recorded() {
        let (repo, _, owner) = setup().await;
        let session = ChatSession::new(owner);
        repo.insert_session(&session).await.unwrap();

        let left = Turn::now("left", "a");
        let right = Turn::now("right", "b");
        let (a, b) = tokio::join!(
            repo.append_turn(&session.id, &owner, &left),
            repo.append_turn(&session.id, &owner, &right),
        );
        assert!(a.unwrap() && b.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            let id = session.id;
            handles.push(tokio::spawn(async move {
                repo.append_turn(&id, &owner, &Turn::now(format!("q{i}"), format!("a{i}")))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.turns.len(), 10);
        let users: std::collections::HashSet<&str> =
            found.turns.iter().map(|t| t.user_text.as_str()).collect();
        assert_eq!(users.len(), 10);
        assert!(users.contains("left") && users.contains("right"));
    }

    #[tokio::test]
    async fn test_get_session_during_delete_sees_whole_document() {
        let (repo, _, owner) = setup().await;
        let session = ChatSession::new(owner);
        repo.insert_session(&session).await.unwrap();
        for i in 0..3 {
            repo.append_turn(&session.id, &owner, &Turn::now(format!("q{i}"), "a"))
                .await
                .unwrap();
        }

        let mut readers = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            let id = session.id;
            readers.push(tokio::spawn(async move { repo.get_session(&id).await }));
        }
        assert_eq!(
            repo.delete_session_if_owned(&session.id, &owner).await.unwrap(),
            1
        );

        // Each read is either before the delete (all turns) or after (nothing).
        for reader in readers {
            if let Some(found) = reader.await.unwrap().unwrap() {
                assert_eq!(found.turns.len(), 3);
            }
        }
        assert!(repo.get_session(&session.id).await.unwrap().is_none());
    }
}
