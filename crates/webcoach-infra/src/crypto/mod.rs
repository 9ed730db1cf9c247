//! Cryptographic operations for WebCoach.
//!
//! - `credentials`: Argon2id password hashing and SHA-256 token digests

pub mod credentials;
