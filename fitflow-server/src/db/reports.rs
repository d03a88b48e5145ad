//! Read-only aggregation queries for admin reports

use super::RepoResult;
use shared::models::{GymVisitSummary, PlanRevenue};
use sqlx::SqlitePool;

/// Completed purchase revenue in cents
pub async fn total_revenue_cents(pool: &SqlitePool) -> RepoResult<i64> {
    let (sum,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM transactions WHERE kind = 'purchase' AND payment_status = 'completed'",
    )
    .fetch_one(pool)
    .await?;
    Ok(sum)
}

/// Visits per gym since `since`, busiest first
pub async fn visits_by_gym_since(pool: &SqlitePool, since: i64) -> RepoResult<Vec<GymVisitSummary>> {
    let rows = sqlx::query_as::<_, GymVisitSummary>(
        "SELECT v.gym_id, gu.name AS gym_name, g.gym_code, COUNT(*) AS total_visits, COALESCE(SUM(v.tokens_used), 0) AS total_tokens
         FROM visits v
         JOIN gyms g ON g.user_id = v.gym_id
         JOIN users gu ON gu.id = v.gym_id
         WHERE v.check_in_time >= ?
         GROUP BY v.gym_id, gu.name, g.gym_code
         ORDER BY total_visits DESC, gu.name ASC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Completed purchase revenue per plan since `since`, highest first
pub async fn revenue_by_plan_since(pool: &SqlitePool, since: i64) -> RepoResult<Vec<PlanRevenue>> {
    let rows = sqlx::query_as::<_, PlanRevenue>(
        "SELECT plan, COALESCE(SUM(amount_cents), 0) AS total_revenue, COUNT(*) AS total_transactions
         FROM transactions
         WHERE kind = 'purchase' AND payment_status = 'completed' AND plan IS NOT NULL AND created_at >= ?
         GROUP BY plan
         ORDER BY total_revenue DESC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_gym, seed_member, test_pool};
    use crate::db::{transactions, visits};
    use shared::models::{PaymentMethod, PaymentStatus, PlanId, TransactionType};

    #[tokio::test]
    async fn aggregates_group_by_gym_and_plan() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "r@fit.io", 5).await;
        let downtown = seed_gym(&pool, "FZ001", "FitZone Downtown").await;
        let uptown = seed_gym(&pool, "FZ002", "FitZone Uptown").await;

        let mut conn = pool.acquire().await.unwrap();
        visits::insert_if_absent(&mut conn, member, downtown, "2025-01-01", 10_000).await.unwrap();
        visits::insert_if_absent(&mut conn, member, downtown, "2025-01-02", 20_000).await.unwrap();
        visits::insert_if_absent(&mut conn, member, uptown, "2025-01-02", 20_500).await.unwrap();
        for (plan, cents, at) in [
            (PlanId::Monthly, 9999, 10_000),
            (PlanId::Monthly, 9999, 20_000),
            (PlanId::Weekly, 2999, 500),
        ] {
            transactions::append(
                &mut conn,
                transactions::NewEntry {
                    member_id: member,
                    kind: TransactionType::Purchase,
                    plan: Some(plan),
                    amount_cents: cents,
                    tokens: plan.plan().tokens,
                    payment_method: PaymentMethod::Mock,
                    payment_status: PaymentStatus::Completed,
                    description: "purchase",
                    balance_after: 0,
                },
                at,
            )
            .await
            .unwrap();
        }
        drop(conn);

        let by_gym = visits_by_gym_since(&pool, 0).await.unwrap();
        assert_eq!(by_gym.len(), 2);
        assert_eq!(by_gym[0].gym_code, "FZ001");
        assert_eq!(by_gym[0].total_visits, 2);
        assert_eq!(by_gym[0].total_tokens, 2);

        let by_plan = revenue_by_plan_since(&pool, 1_000).await.unwrap();
        assert_eq!(by_plan.len(), 1);
        assert_eq!(by_plan[0].plan, PlanId::Monthly);
        assert_eq!(by_plan[0].total_revenue, 19998);
        assert_eq!(by_plan[0].total_transactions, 2);

        // seed adjustment is not revenue
        assert_eq!(total_revenue_cents(&pool).await.unwrap(), 9999 * 2 + 2999);
    }
}
