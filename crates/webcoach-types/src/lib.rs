//! Shared domain types for WebCoach.
//!
//! This crate contains the core domain types used across the WebCoach backend:
//! users, chat sessions and their turns, LLM request/response shapes,
//! configuration, and the error kinds surfaced by the services.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
