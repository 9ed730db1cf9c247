//! Business logic and port trait definitions for WebCoach.
//!
//! This crate defines the "ports" (repository, provider, and hasher traits)
//! that the infrastructure layer implements, plus the two services built on
//! them: the chat engine and the auth gate. It depends only on
//! `webcoach-types` -- never on `webcoach-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod repository;
pub mod service;
