//! Shared types for FitFlow
//!
//! Common types used by the server and its clients: error codes, the API
//! response envelope, domain models and the subscription plan catalog.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
