//! Chat session lifecycle and message exchange.
//!
//! - `repository`: the `ChatRepository` port (session store)
//! - `prompt`: coach persona and conversation context assembly
//! - `service`: `ChatService`, the chat engine

pub mod prompt;
pub mod repository;
pub mod service;
