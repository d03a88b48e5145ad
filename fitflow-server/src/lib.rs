//! FitFlow server
//!
//! Members buy token bundles and spend one token per gym per day at check-in.
//!
//! ```text
//! fitflow-server/src/
//! ├── api/        # HTTP routes and handlers per role area
//! ├── auth/       # JWT, role/permission guards, rate limiting
//! ├── db/         # SQLite repositories
//! ├── services/   # ledger, check-in, accounts, reports
//! └── ...         # config, logging, validation, mock email
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod logger;
pub mod services;
pub mod state;
pub mod util;
pub mod validation;

pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use state::AppState;

// Security events go to the "security" target (separate log file when enabled)
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
