//! Member Repository
//!
//! Balance mutations are relative SQL updates that bump `balance_version`;
//! they take a connection so callers can pair them with a ledger or visit
//! insert in one transaction.

use super::{RepoError, RepoResult, like_pattern, users};
use shared::models::{Member, MemberUpdate, PageQuery, RegisterMember, Role};
use sqlx::{SqliteConnection, SqlitePool};

const MEMBER_SELECT: &str = "SELECT u.id, u.email, u.name, u.is_active, m.tokens, m.balance_version, m.subscription_plan, m.subscription_start, m.subscription_end, m.subscription_active, m.phone, m.address, m.date_of_birth, m.emergency_contact_name, m.emergency_contact_phone, u.created_at, u.updated_at FROM users u JOIN members m ON m.user_id = u.id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE u.id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Active members only
pub async fn find_active(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    Ok(find_by_id(pool, id).await?.filter(|m| m.is_active))
}

pub(crate) async fn find_in_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE u.id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Create the user + member rows with a zero balance; returns the new id
pub async fn create(
    pool: &SqlitePool,
    data: &RegisterMember,
    password_hash: &str,
    now: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let email = data.email.trim().to_lowercase();
    let contact = data.emergency_contact.clone().unwrap_or_default();

    let mut tx = pool.begin().await?;
    users::insert(&mut tx, id, &email, password_hash, Role::Member, data.name.trim(), now).await?;
    sqlx::query(
        "INSERT INTO members (user_id, tokens, balance_version, phone, address, date_of_birth, emergency_contact_name, emergency_contact_phone) VALUES (?1, 0, 0, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(&data.date_of_birth)
    .bind(&contact.name)
    .bind(&contact.phone)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Newest first, optional case-insensitive name/email search
pub async fn list(pool: &SqlitePool, query: &PageQuery) -> RepoResult<(Vec<Member>, i64)> {
    let pattern = query.search().map(like_pattern);
    let filter = "(?1 IS NULL OR LOWER(u.name) LIKE ?1 ESCAPE '\\' OR u.email LIKE ?1 ESCAPE '\\')";

    let sql = format!("{MEMBER_SELECT} WHERE {filter} ORDER BY u.created_at DESC, u.id DESC LIMIT ?2 OFFSET ?3");
    let rows = sqlx::query_as::<_, Member>(&sql)
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM users u JOIN members m ON m.user_id = u.id WHERE {filter}");
    let (total,): (i64,) = sqlx::query_as(&count_sql)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok((rows, total))
}

/// Profile fields only; the balance is changed through the ledger
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &MemberUpdate,
    now: i64,
) -> RepoResult<Member> {
    let contact = data.emergency_contact.clone().unwrap_or_default();
    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE members SET phone = COALESCE(?1, phone), address = COALESCE(?2, address), date_of_birth = COALESCE(?3, date_of_birth), emergency_contact_name = COALESCE(?4, emergency_contact_name), emergency_contact_phone = COALESCE(?5, emergency_contact_phone) WHERE user_id = ?6",
    )
    .bind(&data.phone)
    .bind(&data.address)
    .bind(&data.date_of_birth)
    .bind(&contact.name)
    .bind(&contact.phone)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    users::update_base(&mut tx, id, data.name.as_deref().map(str::trim), data.is_active, now).await?;
    let member = find_in_tx(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))?;
    tx.commit().await?;
    Ok(member)
}

/// Balance and subscription window after a purchase
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct PurchaseApplied {
    pub tokens: i64,
    pub balance_version: i64,
    pub subscription_start: i64,
    pub subscription_end: i64,
}

/// Credit plan tokens and write the subscription window in one statement.
///
/// With `extend`, an active window ending after `now` keeps its start and is
/// lengthened by `duration_ms`; otherwise the window becomes
/// `[now, now + duration_ms]`. Returns `None` when no active member matches.
pub(crate) async fn apply_purchase(
    conn: &mut SqliteConnection,
    id: i64,
    tokens: i64,
    plan: shared::models::PlanId,
    duration_ms: i64,
    extend: bool,
    now: i64,
) -> RepoResult<Option<PurchaseApplied>> {
    let row = sqlx::query_as::<_, PurchaseApplied>(
        "UPDATE members SET
            tokens = tokens + ?1,
            balance_version = balance_version + 1,
            subscription_plan = ?2,
            subscription_start = CASE WHEN ?3 AND subscription_active = 1 AND subscription_end > ?4
                                      THEN subscription_start ELSE ?4 END,
            subscription_end = CASE WHEN ?3 AND subscription_active = 1 AND subscription_end > ?4
                                    THEN subscription_end + ?5 ELSE ?4 + ?5 END,
            subscription_active = 1
         WHERE user_id = ?6
           AND EXISTS (SELECT 1 FROM users u WHERE u.id = ?6 AND u.is_active = 1)
         RETURNING tokens, balance_version, subscription_start, subscription_end",
    )
    .bind(tokens)
    .bind(plan)
    .bind(extend)
    .bind(now)
    .bind(duration_ms)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Guarded single-token debit; `None` when the balance is already zero
pub(crate) async fn debit_token(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "UPDATE members SET tokens = tokens - 1, balance_version = balance_version + 1
         WHERE user_id = ? AND tokens > 0
         RETURNING tokens",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(tokens,)| tokens))
}

/// Compare-and-swap balance change.
///
/// Applies only when `balance_version` still equals `expected_version` and the
/// result stays non-negative. Returns the new `(tokens, balance_version)`.
pub(crate) async fn adjust_balance(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
    expected_version: i64,
) -> RepoResult<Option<(i64, i64)>> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "UPDATE members SET tokens = tokens + ?1, balance_version = balance_version + 1
         WHERE user_id = ?2 AND balance_version = ?3 AND tokens + ?1 >= 0
         RETURNING tokens, balance_version",
    )
    .bind(delta)
    .bind(id)
    .bind(expected_version)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Members whose subscription is flagged active and has not yet ended
pub async fn count_current_subscriptions(pool: &SqlitePool, now: i64) -> RepoResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM members WHERE subscription_active = 1 AND subscription_end > ?",
    )
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_member, test_pool};
    use shared::models::{EmergencyContact, PlanId};

    #[tokio::test]
    async fn create_starts_with_empty_balance() {
        let pool = test_pool().await;
        let data = RegisterMember {
            name: " Lena ".into(),
            email: "Lena@Fit.IO".into(),
            password: "password123".into(),
            phone: Some("555-0100".into()),
            address: None,
            date_of_birth: Some("1990-04-01".into()),
            emergency_contact: Some(EmergencyContact {
                name: Some("Max".into()),
                phone: None,
            }),
        };
        let id = create(&pool, &data, "hash", 1_000).await.unwrap();
        let member = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(member.email, "lena@fit.io");
        assert_eq!(member.name, "Lena");
        assert_eq!(member.tokens, 0);
        assert_eq!(member.balance_version, 0);
        assert!(member.subscription().is_none());
        assert_eq!(member.emergency_contact().unwrap().name.as_deref(), Some("Max"));
    }

    #[tokio::test]
    async fn debit_never_goes_negative() {
        let pool = test_pool().await;
        let id = seed_member(&pool, "one@fit.io", 1).await;
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(debit_token(&mut conn, id).await.unwrap(), Some(0));
        assert_eq!(debit_token(&mut conn, id).await.unwrap(), None);
        drop(conn);
        let member = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(member.tokens, 0);
        assert_eq!(member.balance_version, 1);
    }

    #[tokio::test]
    async fn purchase_overwrite_and_extend_windows() {
        let pool = test_pool().await;
        let id = seed_member(&pool, "sub@fit.io", 0).await;
        let week = 7 * shared::util::DAY_MILLIS;
        let mut conn = pool.acquire().await.unwrap();

        let first = apply_purchase(&mut conn, id, 7, PlanId::Weekly, week, false, 10_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.tokens, 7);
        assert_eq!(first.subscription_start, 10_000);
        assert_eq!(first.subscription_end, 10_000 + week);

        let extended = apply_purchase(&mut conn, id, 7, PlanId::Weekly, week, true, 20_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(extended.tokens, 14);
        assert_eq!(extended.subscription_start, 10_000);
        assert_eq!(extended.subscription_end, 10_000 + 2 * week);

        let overwritten = apply_purchase(&mut conn, id, 7, PlanId::Weekly, week, false, 30_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(overwritten.subscription_start, 30_000);
        assert_eq!(overwritten.subscription_end, 30_000 + week);
        assert_eq!(overwritten.balance_version, 3);
    }

    #[tokio::test]
    async fn adjust_balance_checks_version_and_floor() {
        let pool = test_pool().await;
        let id = seed_member(&pool, "cas@fit.io", 5).await;
        let mut conn = pool.acquire().await.unwrap();

        assert_eq!(adjust_balance(&mut conn, id, -2, 0).await.unwrap(), Some((3, 1)));
        // stale version
        assert_eq!(adjust_balance(&mut conn, id, 1, 0).await.unwrap(), None);
        // would go negative
        assert_eq!(adjust_balance(&mut conn, id, -4, 1).await.unwrap(), None);
    }
}
