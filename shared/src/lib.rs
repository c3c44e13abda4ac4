//! Shared types for the Pronto workspace
//!
//! Domain models, auth DTOs and the unified error system used by
//! pronto-server and its clients.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
