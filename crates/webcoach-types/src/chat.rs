//! Chat session and turn types for WebCoach.
//!
//! A chat session is an owner-scoped, append-only conversation. Each entry in
//! the conversation is a [`Turn`]: one user message paired with the coach's
//! reply. Turns are never stored half-written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user message paired with its AI response.
///
/// The atomic unit of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user_text: String,
    pub ai_text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Build a turn stamped with the current UTC time.
    pub fn now(user_text: impl Into<String>, ai_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            ai_text: ai_text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A chat session owned by a single user.
///
/// `turns` is ordered oldest first and only ever grows by appending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
}

impl ChatSession {
    /// Create an empty session for `owner_id`.
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            owner_id,
            created_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    /// Whether `user_id` owns this session.
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.owner_id == *user_id
    }
}

/// Listing projection of a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// `user_text` of the most recently appended turn, if any.
    pub last_user_text: Option<String>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            last_user_text: session.turns.last().map(|t| t.user_text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let owner = Uuid::now_v7();
        let session = ChatSession::new(owner);
        assert!(session.turns.is_empty());
        assert!(session.is_owned_by(&owner));
        assert!(!session.is_owned_by(&Uuid::now_v7()));
    }

    #[test]
    fn test_summary_last_user_text() {
        let mut session = ChatSession::new(Uuid::now_v7());
        assert_eq!(SessionSummary::from(&session).last_user_text, None);

        session.turns.push(Turn::now("first", "a"));
        session.turns.push(Turn::now("second", "b"));
        let summary = SessionSummary::from(&session);
        assert_eq!(summary.id, session.id);
        assert_eq!(summary.last_user_text.as_deref(), Some("second"));
    }

    #[test]
    fn test_turn_serialize() {
        let turn = Turn::now("Hello", "Hi there");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["user_text"], "Hello");
        assert_eq!(json["ai_text"], "Hi there");
        assert!(json["timestamp"].is_string());
    }
}
