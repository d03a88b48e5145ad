//! Database Module
//!
//! SQLite connection pool, migrations and per-table query functions.
//! Functions taking `&mut SqliteConnection` are meant to run inside a caller's
//! transaction; functions taking `&SqlitePool` run standalone.

pub mod admins;
pub mod gyms;
pub mod members;
pub mod reports;
pub mod transactions;
pub mod users;
pub mod visits;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.message().to_string());
            }
            if db_err.is_check_violation() {
                return RepoError::Validation(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl RepoError {
    /// Unique-constraint violation on the given `table.column`
    pub fn is_duplicate_of(&self, column: &str) -> bool {
        matches!(self, RepoError::Duplicate(msg) if msg.contains(column))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Owns the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database file with WAL mode and run migrations
    pub async fn new(db_path: &str) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| RepoError::Database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            // busy_timeout: wait up to 5s on write contention instead of failing
            .busy_timeout(Duration::from_millis(5000))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = db_path, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

pub async fn run_migrations(pool: &SqlitePool) -> RepoResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RepoError::Database(format!("Failed to apply migrations: {e}")))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Fresh in-memory database with the real schema.
///
/// Every in-memory connection is its own database, so the pool is pinned to a
/// single connection.
pub async fn memory_pool() -> RepoResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| RepoError::Database(e.to_string()))?
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// LIKE pattern for a case-insensitive substring search
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by repository and service tests

    use super::*;
    use shared::models::{GymCreate, Location, RegisterMember};

    pub async fn test_pool() -> SqlitePool {
        memory_pool().await.unwrap()
    }

    pub async fn seed_member(pool: &SqlitePool, email: &str, tokens: i64) -> i64 {
        let data = RegisterMember {
            name: format!("Member {email}"),
            email: email.to_string(),
            password: "password123".into(),
            phone: None,
            address: None,
            date_of_birth: None,
            emergency_contact: None,
        };
        let id = members::create(pool, &data, "hash", 1_000).await.unwrap();
        if tokens > 0 {
            sqlx::query("UPDATE members SET tokens = ? WHERE user_id = ?")
                .bind(tokens)
                .bind(id)
                .execute(pool)
                .await
                .unwrap();
            // Matching ledger row keeps reconciliation consistent
            sqlx::query(
                "INSERT INTO transactions (id, member_id, kind, plan, amount_cents, tokens, payment_method, payment_status, transaction_id, description, balance_after, created_at)
                 VALUES (?1, ?2, 'adjustment', NULL, 0, ?3, 'mock', 'completed', ?4, 'seed', ?3, 1000)",
            )
            .bind(shared::util::snowflake_id())
            .bind(id)
            .bind(tokens)
            .bind(format!("seed-{id}"))
            .execute(pool)
            .await
            .unwrap();
        }
        id
    }

    pub async fn seed_gym(pool: &SqlitePool, code: &str, name: &str) -> i64 {
        let data = GymCreate {
            name: name.to_string(),
            email: format!("{}@gyms.fitflow.app", code.to_lowercase()),
            gym_code: Some(code.to_string()),
            location: Location {
                address: "1 Main St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip_code: "62701".into(),
                coordinates: None,
            },
            facilities: vec!["Cardio".into()],
            capacity: 80,
            operating_hours: None,
            phone: None,
        };
        gyms::create(pool, &data, code, "hash", 1_000).await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Zone"), "%zone%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn file_database_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitflow.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'members', 'gyms', 'admins', 'transactions', 'visits')",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate() {
        let pool = test_support::test_pool().await;
        test_support::seed_member(&pool, "dup@fit.io", 0).await;
        let err = sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, name, is_active, created_at, updated_at) VALUES (1, 'dup@fit.io', 'x', 'member', 'Dup', 1, 0, 0)",
        )
        .execute(&pool)
        .await
        .map_err(RepoError::from)
        .unwrap_err();
        assert!(err.is_duplicate_of("users.email"));
    }
}
