//! Admin Repository

use super::{RepoResult, users};
use shared::models::{Admin, Role};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Admin>> {
    let row = sqlx::query_as::<_, Admin>(
        "SELECT u.id, u.email, u.name, u.is_active, a.permissions, u.created_at, u.updated_at FROM users u JOIN admins a ON a.user_id = u.id WHERE u.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// `permissions` is a JSON array of capability strings
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    permissions: &str,
    now: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let email = email.trim().to_lowercase();
    let mut tx = pool.begin().await?;
    users::insert(&mut tx, id, &email, password_hash, Role::Admin, name.trim(), now).await?;
    sqlx::query("INSERT INTO admins (user_id, permissions) VALUES (?, ?)")
        .bind(id)
        .bind(permissions)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(id)
}
