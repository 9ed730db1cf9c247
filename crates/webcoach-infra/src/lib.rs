//! Infrastructure layer for WebCoach.
//!
//! Contains implementations of the ports defined in `webcoach-core`:
//! SQLite storage, the OpenAI-compatible completion provider, Argon2id
//! credential hashing, and the `config.toml` loader.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
