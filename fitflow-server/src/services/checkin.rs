//! Check-in: one visit and at most one token per (member, gym, calendar day)

use shared::error::{AppError, ErrorCode};
use shared::models::{CheckIn, CheckInOutcome, Gym};
use shared::util::local_day;
use sqlx::SqlitePool;

use crate::db::{gyms, members, visits};
use crate::error::ServiceResult;

/// How a client named the gym
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GymRef {
    Id(i64),
    Code(String),
}

/// All-digit identifiers are internal ids, anything else is a gym code
pub fn parse_gym_identifier(identifier: &str) -> Option<GymRef> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }
    if identifier.bytes().all(|b| b.is_ascii_digit()) {
        return identifier.parse().ok().map(GymRef::Id);
    }
    Some(GymRef::Code(identifier.to_ascii_uppercase()))
}

/// Active gym by id or code
pub async fn resolve_gym(pool: &SqlitePool, identifier: &str) -> ServiceResult<Gym> {
    let gym = match parse_gym_identifier(identifier) {
        Some(GymRef::Id(id)) => gyms::find_active_by_id(pool, id).await?,
        Some(GymRef::Code(code)) => gyms::find_active_by_code(pool, &code).await?,
        None => None,
    };
    gym.ok_or_else(|| {
        AppError::new(ErrorCode::GymNotFound)
            .with_detail("gym", identifier.trim().to_string())
            .into()
    })
}

pub async fn check_in(
    pool: &SqlitePool,
    member_id: i64,
    gym_identifier: &str,
    now: i64,
) -> ServiceResult<CheckIn> {
    let member = members::find_active(pool, member_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;
    let gym = resolve_gym(pool, gym_identifier).await?;
    if member.tokens <= 0 {
        return Err(AppError::new(ErrorCode::InsufficientTokens)
            .with_detail("tokens", member.tokens)
            .into());
    }

    let visit_date = local_day(now);
    let mut tx = pool.begin().await?;

    if !visits::insert_if_absent(&mut tx, member_id, gym.id, &visit_date, now).await? {
        let visit = visits::find_for_day(&mut tx, member_id, gym.id, &visit_date)
            .await?
            .ok_or_else(|| AppError::internal("Visit vanished after conflict"))?;
        let remaining = members::find_in_tx(&mut tx, member_id)
            .await?
            .map_or(member.tokens, |m| m.tokens);
        tx.commit().await?;
        tracing::debug!(member_id, gym_id = gym.id, %visit_date, "Already checked in today");
        return Ok(CheckIn {
            visit,
            remaining_tokens: remaining,
            outcome: CheckInOutcome::AlreadyCheckedIn,
        });
    }

    let Some(remaining) = members::debit_token(&mut tx, member_id).await? else {
        tx.rollback().await?;
        return Err(AppError::new(ErrorCode::InsufficientTokens).into());
    };
    let visit = visits::find_for_day(&mut tx, member_id, gym.id, &visit_date)
        .await?
        .ok_or_else(|| AppError::internal("Inserted visit not found"))?;
    tx.commit().await?;

    tracing::info!(
        member_id,
        gym_id = gym.id,
        gym_code = %gym.gym_code,
        %visit_date,
        remaining,
        "Check-in recorded"
    );
    Ok(CheckIn {
        visit,
        remaining_tokens: remaining,
        outcome: CheckInOutcome::Created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_gym, seed_member, test_pool};
    use chrono::{Local, NaiveDate, TimeZone};

    const NOW: i64 = 1_718_000_000_000;

    async fn visit_count(pool: &SqlitePool, member_id: i64) -> i64 {
        visits::count_for_member_since(pool, member_id, 0).await.unwrap()
    }

    async fn balance(pool: &SqlitePool, member_id: i64) -> i64 {
        members::find_by_id(pool, member_id).await.unwrap().unwrap().tokens
    }

    fn local_millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap().timestamp_millis()
    }

    #[test]
    fn identifier_parsing() {
        assert_eq!(parse_gym_identifier(" 123 "), Some(GymRef::Id(123)));
        assert_eq!(parse_gym_identifier("fz001"), Some(GymRef::Code("FZ001".into())));
        assert_eq!(parse_gym_identifier("-5"), Some(GymRef::Code("-5".into())));
        assert_eq!(parse_gym_identifier("   "), None);
        // all digits but out of i64 range
        assert_eq!(parse_gym_identifier("99999999999999999999"), None);
    }

    #[tokio::test]
    async fn zero_balance_is_rejected_without_visit() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "a@fit.io", 0).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let err = check_in(&pool, member, "FZ001", NOW).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InsufficientTokens));
        assert_eq!(visit_count(&pool, member).await, 0);
    }

    #[tokio::test]
    async fn same_day_check_in_is_idempotent() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "c@fit.io", 5).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let first = check_in(&pool, member, "FZ001", NOW).await.unwrap();
        assert_eq!(first.outcome, CheckInOutcome::Created);
        assert_eq!(first.remaining_tokens, 4);
        assert_eq!(first.visit.gym_code, "FZ001");
        assert_eq!(first.visit.visit.tokens_used, 1);

        let second = check_in(&pool, member, "FZ001", NOW + 60_000).await.unwrap();
        assert_eq!(second.outcome, CheckInOutcome::AlreadyCheckedIn);
        assert_eq!(second.remaining_tokens, 4);
        assert_eq!(second.visit.visit.id, first.visit.visit.id);
        assert_eq!(second.message(), "Already checked in to this gym today");

        assert_eq!(visit_count(&pool, member).await, 1);
        assert_eq!(balance(&pool, member).await, 4);
    }

    #[tokio::test]
    async fn id_and_code_resolve_to_same_gym() {
        let pool = test_pool().await;
        let gym_id = seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let by_id = resolve_gym(&pool, &gym_id.to_string()).await.unwrap();
        let by_code = resolve_gym(&pool, "fz001").await.unwrap();
        assert_eq!(by_id.id, gym_id);
        assert_eq!(by_code.id, gym_id);
    }

    #[tokio::test]
    async fn unknown_gym_debits_nothing() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "e@fit.io", 3).await;

        let err = check_in(&pool, member, "NOPE1", NOW).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::GymNotFound));
        assert_eq!(balance(&pool, member).await, 3);
    }

    #[tokio::test]
    async fn inactive_gym_is_not_resolvable() {
        let pool = test_pool().await;
        let gym_id = seed_gym(&pool, "FZ009", "Closed Gym").await;
        crate::db::users::deactivate(&pool, gym_id, NOW).await.unwrap();

        let err = resolve_gym(&pool, "FZ009").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::GymNotFound));
    }

    #[tokio::test]
    async fn unknown_member_is_rejected() {
        let pool = test_pool().await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;
        let err = check_in(&pool, 777, "FZ001", NOW).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MemberNotFound));
    }

    #[tokio::test]
    async fn midnight_splits_visits() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "night@fit.io", 5).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let before = local_millis(2025, 3, 14, 23, 59);
        let after = local_millis(2025, 3, 15, 0, 1);
        let late = check_in(&pool, member, "FZ001", before).await.unwrap();
        let early = check_in(&pool, member, "FZ001", after).await.unwrap();

        assert_eq!(late.visit.visit.visit_date, "2025-03-14");
        assert_eq!(early.visit.visit.visit_date, "2025-03-15");
        assert_eq!(early.outcome, CheckInOutcome::Created);
        assert_eq!(balance(&pool, member).await, 3);
    }

    #[tokio::test]
    async fn two_gyms_same_day_cost_two_tokens() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "two@fit.io", 5).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;
        seed_gym(&pool, "FZ002", "FitZone Uptown").await;

        check_in(&pool, member, "FZ001", NOW).await.unwrap();
        let second = check_in(&pool, member, "FZ002", NOW).await.unwrap();
        assert_eq!(second.outcome, CheckInOutcome::Created);
        assert_eq!(second.remaining_tokens, 3);
        assert_eq!(visit_count(&pool, member).await, 2);
    }

    #[tokio::test]
    async fn purchase_then_check_in_costs_one_token() {
        let pool = test_pool().await;
        let member = seed_member(&pool, "flow@fit.io", 0).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let receipt = crate::services::ledger::purchase(
            &pool,
            member,
            "weekly",
            crate::config::RenewalPolicy::Overwrite,
            NOW,
        )
        .await
        .unwrap();
        let checked = check_in(&pool, member, "FZ001", NOW).await.unwrap();
        assert_eq!(checked.remaining_tokens, receipt.tokens - 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_check_ins_and_purchases_keep_ledger_consistent() {
        use crate::config::RenewalPolicy;
        use crate::db::DbService;
        use crate::services::ledger;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concurrent.db");
        let pool = DbService::new(path.to_str().unwrap()).await.unwrap().pool;
        let member = seed_member(&pool, "rush@fit.io", 5).await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let visit_pool = pool.clone();
            handles.push(tokio::spawn(async move {
                check_in(&visit_pool, member, "FZ001", NOW + i)
                    .await
                    .map(|c| Some(c.outcome))
            }));
            let purchase_pool = pool.clone();
            handles.push(tokio::spawn(async move {
                ledger::purchase(&purchase_pool, member, "weekly", RenewalPolicy::Overwrite, NOW + i)
                    .await
                    .map(|_| None)
            }));
        }

        let mut created = 0;
        let mut repeated = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(Some(CheckInOutcome::Created)) => created += 1,
                Ok(Some(CheckInOutcome::AlreadyCheckedIn)) => repeated += 1,
                Ok(None) => {}
                Err(e) => panic!("concurrent call failed: {e:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repeated, 9);

        assert_eq!(visit_count(&pool, member).await, 1);
        assert_eq!(visits::token_sum_for_member(&pool, member).await.unwrap(), 1);
        assert_eq!(balance(&pool, member).await, 5 + 10 * 7 - 1);

        let report = ledger::reconcile(&pool, member).await.unwrap();
        assert!(report.consistent, "{report:?}");
    }
}
