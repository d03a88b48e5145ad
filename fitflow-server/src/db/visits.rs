//! Visit Repository

use super::RepoResult;
use shared::models::{VisitDetail, VisitWithGym, VisitWithMember};
use sqlx::{SqliteConnection, SqlitePool};

const VISIT_COLUMNS: &str = "v.id, v.member_id, v.gym_id, v.visit_date, v.check_in_time, v.check_out_time, v.tokens_used, v.notes, v.created_at";

fn with_gym_select() -> String {
    format!(
        "SELECT {VISIT_COLUMNS}, gu.name AS gym_name, g.gym_code, g.address AS gym_address, g.city AS gym_city FROM visits v JOIN gyms g ON g.user_id = v.gym_id JOIN users gu ON gu.id = v.gym_id"
    )
}

fn with_member_select() -> String {
    format!(
        "SELECT {VISIT_COLUMNS}, mu.name AS member_name, mu.email AS member_email FROM visits v JOIN users mu ON mu.id = v.member_id"
    )
}

fn detail_select() -> String {
    format!(
        "SELECT {VISIT_COLUMNS}, mu.name AS member_name, mu.email AS member_email, gu.name AS gym_name, g.gym_code FROM visits v JOIN users mu ON mu.id = v.member_id JOIN gyms g ON g.user_id = v.gym_id JOIN users gu ON gu.id = v.gym_id"
    )
}

/// Insert the day's visit unless one exists; returns whether a row was written
pub(crate) async fn insert_if_absent(
    conn: &mut SqliteConnection,
    member_id: i64,
    gym_id: i64,
    visit_date: &str,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT INTO visits (id, member_id, gym_id, visit_date, check_in_time, tokens_used, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?5)
         ON CONFLICT (member_id, gym_id, visit_date) DO NOTHING",
    )
    .bind(shared::util::snowflake_id())
    .bind(member_id)
    .bind(gym_id)
    .bind(visit_date)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

pub(crate) async fn find_for_day(
    conn: &mut SqliteConnection,
    member_id: i64,
    gym_id: i64,
    visit_date: &str,
) -> RepoResult<Option<VisitWithGym>> {
    let sql = format!(
        "{} WHERE v.member_id = ? AND v.gym_id = ? AND v.visit_date = ?",
        with_gym_select()
    );
    let row = sqlx::query_as::<_, VisitWithGym>(&sql)
        .bind(member_id)
        .bind(gym_id)
        .bind(visit_date)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// A member's visits, newest first
pub async fn list_for_member(
    pool: &SqlitePool,
    member_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<VisitWithGym>, i64)> {
    let sql = format!(
        "{} WHERE v.member_id = ? ORDER BY v.check_in_time DESC, v.id DESC LIMIT ? OFFSET ?",
        with_gym_select()
    );
    let rows = sqlx::query_as::<_, VisitWithGym>(&sql)
        .bind(member_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits WHERE member_id = ?")
        .bind(member_id)
        .fetch_one(pool)
        .await?;
    Ok((rows, total))
}

pub async fn count_for_member_since(
    pool: &SqlitePool,
    member_id: i64,
    since: i64,
) -> RepoResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM visits WHERE member_id = ? AND check_in_time >= ?")
            .bind(member_id)
            .bind(since)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Tokens consumed by a member's visits
pub async fn token_sum_for_member(pool: &SqlitePool, member_id: i64) -> RepoResult<i64> {
    let (sum,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(tokens_used), 0) FROM visits WHERE member_id = ?")
            .bind(member_id)
            .fetch_one(pool)
            .await?;
    Ok(sum)
}

/// A gym's visits since `since`, newest first; `limit` of `None` returns all
pub async fn list_for_gym_since(
    pool: &SqlitePool,
    gym_id: i64,
    since: i64,
    limit: Option<i64>,
) -> RepoResult<Vec<VisitWithMember>> {
    let sql = format!(
        "{} WHERE v.gym_id = ? AND v.check_in_time >= ? ORDER BY v.check_in_time DESC, v.id DESC LIMIT ?",
        with_member_select()
    );
    let rows = sqlx::query_as::<_, VisitWithMember>(&sql)
        .bind(gym_id)
        .bind(since)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_for_gym_on_day(
    pool: &SqlitePool,
    gym_id: i64,
    visit_date: &str,
) -> RepoResult<Vec<VisitWithMember>> {
    let sql = format!(
        "{} WHERE v.gym_id = ? AND v.visit_date = ? ORDER BY v.check_in_time DESC, v.id DESC",
        with_member_select()
    );
    let rows = sqlx::query_as::<_, VisitWithMember>(&sql)
        .bind(gym_id)
        .bind(visit_date)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_for_gym_since(pool: &SqlitePool, gym_id: i64, since: i64) -> RepoResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM visits WHERE gym_id = ? AND check_in_time >= ?")
            .bind(gym_id)
            .bind(since)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn distinct_members_for_gym(pool: &SqlitePool, gym_id: i64) -> RepoResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(DISTINCT member_id) FROM visits WHERE gym_id = ?")
            .bind(gym_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn count_all(pool: &SqlitePool) -> RepoResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Platform-wide recent visits with both parties
pub async fn recent_all(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<VisitDetail>> {
    let sql = format!(
        "{} ORDER BY v.check_in_time DESC, v.id DESC LIMIT ?",
        detail_select()
    );
    let rows = sqlx::query_as::<_, VisitDetail>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
