//! Service layer
//!
//! - [`ledger`] - subscription purchase, admin adjustments, reconciliation
//! - [`checkin`] - gym resolution and idempotent daily check-in
//! - [`accounts`] - login, registration, profiles, user management
//! - [`reports`] - dashboards and period reports
//!
//! Operations take an explicit `now` (Unix millis) so calendar-day behavior
//! is deterministic under test.

pub mod accounts;
pub mod checkin;
pub mod ledger;
pub mod reports;
