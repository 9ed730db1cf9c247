//! Repository trait definitions (ports) for accounts and login sessions.
//!
//! These traits define the storage interface that the infrastructure layer
//! (webcoach-infra) implements. The core crate never depends on any
//! specific storage technology. Chat storage lives in `crate::chat::repository`.

pub mod user;
