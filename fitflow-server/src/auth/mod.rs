//! Authentication and authorization
//!
//! - [`JwtService`] - token issue / validation
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - authentication middleware
//! - [`require_role`] / [`require_permission`] - role and admin capability guards
//! - [`rate_limit`] - per-IP limits for login and registration

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtError, JwtService};
pub use middleware::{require_auth, require_permission, require_role};
