//! CredentialHasher trait for password and token hashing.
//!
//! Defined in webcoach-core so services can verify credentials without
//! coupling to a specific algorithm. The Argon2/SHA-256 adapter lives in
//! webcoach-infra.

/// Abstraction over credential hashing and token generation.
pub trait CredentialHasher: Send + Sync {
    /// Hash a password into a self-describing string (salt included).
    fn hash_password(&self, password: &str) -> Result<String, String>;

    /// Check a password against a hash produced by `hash_password`.
    /// Malformed hashes verify as `false`.
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Generate a fresh, unguessable bearer token.
    fn generate_token(&self) -> String;

    /// Deterministic hex digest of a token, used as its storage key.
    fn hash_token(&self, token: &str) -> String;
}
