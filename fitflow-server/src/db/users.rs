//! User Repository (base identity rows)

use super::RepoResult;
use shared::models::{Role, User};
use sqlx::{SqliteConnection, SqlitePool};

const USER_SELECT: &str =
    "SELECT id, email, password_hash, role, name, is_active, created_at, updated_at FROM users";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// `email` must already be lowercased
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> RepoResult<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn count_by_role(pool: &SqlitePool, role: Role) -> RepoResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_active_by_role(pool: &SqlitePool, role: Role) -> RepoResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ? AND is_active = 1")
            .bind(role)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Insert the base row; the caller adds the role extension in the same transaction
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    id: i64,
    email: &str,
    password_hash: &str,
    role: Role,
    name: &str,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, name, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(name)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Partial update of the shared columns
pub(crate) async fn update_base(
    conn: &mut SqliteConnection,
    id: i64,
    name: Option<&str>,
    is_active: Option<bool>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), is_active = COALESCE(?2, is_active), updated_at = ?3 WHERE id = ?4",
    )
    .bind(name)
    .bind(is_active)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn deactivate(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<Option<User>> {
    let rows = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_gym, seed_member, test_pool};

    #[tokio::test]
    async fn lookup_and_deactivate() {
        let pool = test_pool().await;
        let id = seed_member(&pool, "ana@fit.io", 0).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let user = find_by_email(&pool, "ana@fit.io").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Member);
        assert!(user.is_active);
        assert!(email_exists(&pool, "ana@fit.io").await.unwrap());
        assert!(!email_exists(&pool, "bob@fit.io").await.unwrap());

        assert_eq!(count_by_role(&pool, Role::Gym).await.unwrap(), 1);
        let user = deactivate(&pool, id, 2_000).await.unwrap().unwrap();
        assert!(!user.is_active);
        assert_eq!(count_active_by_role(&pool, Role::Member).await.unwrap(), 0);
        assert!(deactivate(&pool, 42, 2_000).await.unwrap().is_none());
    }
}
