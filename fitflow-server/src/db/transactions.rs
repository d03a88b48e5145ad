//! Ledger Repository (append-only)

use super::RepoResult;
use shared::models::{LedgerEntry, PaymentMethod, PaymentStatus, PlanId, TransactionType};
use sqlx::{SqliteConnection, SqlitePool};

const LEDGER_SELECT: &str = "SELECT id, member_id, kind, plan, amount_cents, tokens, payment_method, payment_status, transaction_id, description, balance_after, created_at FROM transactions";

/// Fields of a new ledger row; id and `transaction_id` are generated
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub member_id: i64,
    pub kind: TransactionType,
    pub plan: Option<PlanId>,
    pub amount_cents: i64,
    pub tokens: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub description: &'a str,
    pub balance_after: i64,
}

pub(crate) async fn append(
    conn: &mut SqliteConnection,
    entry: NewEntry<'_>,
    now: i64,
) -> RepoResult<LedgerEntry> {
    let row = LedgerEntry {
        id: shared::util::snowflake_id(),
        member_id: entry.member_id,
        kind: entry.kind,
        plan: entry.plan,
        amount_cents: entry.amount_cents,
        tokens: entry.tokens,
        payment_method: entry.payment_method,
        payment_status: entry.payment_status,
        transaction_id: uuid::Uuid::new_v4().to_string(),
        description: entry.description.to_string(),
        balance_after: entry.balance_after,
        created_at: now,
    };
    sqlx::query(
        "INSERT INTO transactions (id, member_id, kind, plan, amount_cents, tokens, payment_method, payment_status, transaction_id, description, balance_after, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(row.id)
    .bind(row.member_id)
    .bind(row.kind)
    .bind(row.plan)
    .bind(row.amount_cents)
    .bind(row.tokens)
    .bind(row.payment_method)
    .bind(row.payment_status)
    .bind(&row.transaction_id)
    .bind(&row.description)
    .bind(row.balance_after)
    .bind(row.created_at)
    .execute(conn)
    .await?;
    Ok(row)
}

/// A member's entries, newest first
pub async fn list_for_member(
    pool: &SqlitePool,
    member_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<LedgerEntry>, i64)> {
    let sql = format!("{LEDGER_SELECT} WHERE member_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
    let rows = sqlx::query_as::<_, LedgerEntry>(&sql)
        .bind(member_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE member_id = ?")
        .bind(member_id)
        .fetch_one(pool)
        .await?;
    Ok((rows, total))
}

/// Sum of completed token deltas for a member
pub async fn completed_token_sum(pool: &SqlitePool, member_id: i64) -> RepoResult<i64> {
    let (sum,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(tokens), 0) FROM transactions WHERE member_id = ? AND payment_status = 'completed'",
    )
    .bind(member_id)
    .fetch_one(pool)
    .await?;
    Ok(sum)
}
