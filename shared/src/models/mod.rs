//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps are Unix millis.

pub mod admin;
pub mod gym;
pub mod member;
pub mod money;
pub mod pagination;
pub mod plan;
pub mod profile;
pub mod report;
pub mod transaction;
pub mod user;
pub mod visit;

// Re-exports
pub use admin::*;
pub use gym::*;
pub use member::*;
pub use pagination::*;
pub use plan::*;
pub use profile::*;
pub use report::*;
pub use transaction::*;
pub use user::*;
pub use visit::*;
