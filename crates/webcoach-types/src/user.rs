//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// `password_hash` is a PHC-format string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A server-side login session.
///
/// Only the SHA-256 hash of the bearer token is stored.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a successful login.
///
/// `token` is the plaintext bearer token, handed to the client exactly once.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::now_v7(),
            username: "coachee".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("coachee"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_auth_session_expiry() {
        let now = Utc::now();
        let session = AuthSession {
            token_hash: "abc".to_string(),
            user_id: Uuid::now_v7(),
            created_at: now,
            expires_at: now + Duration::hours(24),
        };
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(24)));
    }
}
