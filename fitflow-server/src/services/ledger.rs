//! Token ledger
//!
//! Every balance mutation commits together with its ledger row (purchase,
//! adjustment) or visit row (check-in), so the balance can always be
//! reconciled from stored data.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    LedgerEntry, LedgerReconciliation, PaymentMethod, PaymentStatus, PurchaseReceipt,
    Subscription, TokenAdjustment, TransactionType, find_plan,
};
use sqlx::SqlitePool;

use crate::config::RenewalPolicy;
use crate::db::transactions::{self, NewEntry};
use crate::db::{members, visits};
use crate::error::ServiceResult;
use crate::validation::{MAX_NOTE_LEN, validate_required_text};

/// Buy a catalog plan with mock payment
///
/// Credits `plan.tokens`, rewrites the subscription window and appends a
/// completed purchase entry in one transaction.
pub async fn purchase(
    pool: &SqlitePool,
    member_id: i64,
    plan_id: &str,
    policy: RenewalPolicy,
    now: i64,
) -> ServiceResult<PurchaseReceipt> {
    let plan = find_plan(plan_id).ok_or_else(|| {
        AppError::new(ErrorCode::InvalidPlan).with_detail("plan_id", plan_id.to_string())
    })?;

    let mut tx = pool.begin().await?;
    let applied = members::apply_purchase(
        &mut tx,
        member_id,
        plan.tokens,
        plan.id,
        plan.duration_millis(),
        policy == RenewalPolicy::Extend,
        now,
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;

    let description = format!("{} subscription purchase", plan.name);
    let transaction = transactions::append(
        &mut tx,
        NewEntry {
            member_id,
            kind: TransactionType::Purchase,
            plan: Some(plan.id),
            amount_cents: plan.price_cents,
            tokens: plan.tokens,
            payment_method: PaymentMethod::Mock,
            payment_status: PaymentStatus::Completed,
            description: &description,
            balance_after: applied.tokens,
        },
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        member_id,
        plan = plan.id.as_db(),
        tokens = applied.tokens,
        transaction_id = %transaction.transaction_id,
        "Subscription purchased"
    );

    Ok(PurchaseReceipt {
        transaction,
        tokens: applied.tokens,
        subscription: Subscription {
            plan: plan.id,
            start_date: applied.subscription_start,
            end_date: applied.subscription_end,
            is_active: true,
        },
    })
}

/// Admin balance correction, compare-and-swap on `balance_version`
pub async fn adjust_tokens(
    pool: &SqlitePool,
    member_id: i64,
    adjustment: &TokenAdjustment,
    now: i64,
) -> ServiceResult<LedgerEntry> {
    validate_required_text(&adjustment.reason, "reason", MAX_NOTE_LEN)?;
    if adjustment.delta == 0 {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "delta must not be zero")
            .with_detail("field", "delta")
            .into());
    }

    let mut tx = pool.begin().await?;
    let Some((tokens, version)) =
        members::adjust_balance(&mut tx, member_id, adjustment.delta, adjustment.expected_version)
            .await?
    else {
        let current = members::find_in_tx(&mut tx, member_id).await?;
        tx.rollback().await?;
        return Err(match current {
            None => AppError::new(ErrorCode::MemberNotFound),
            Some(m) if m.balance_version != adjustment.expected_version => {
                AppError::new(ErrorCode::BalanceVersionConflict)
                    .with_detail("expected_version", adjustment.expected_version)
                    .with_detail("current_version", m.balance_version)
            }
            Some(m) => AppError::new(ErrorCode::InsufficientTokens)
                .with_detail("tokens", m.tokens)
                .with_detail("delta", adjustment.delta),
        }
        .into());
    };

    let entry = transactions::append(
        &mut tx,
        NewEntry {
            member_id,
            kind: TransactionType::Adjustment,
            plan: None,
            amount_cents: 0,
            tokens: adjustment.delta,
            payment_method: PaymentMethod::Mock,
            payment_status: PaymentStatus::Completed,
            description: adjustment.reason.trim(),
            balance_after: tokens,
        },
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        member_id,
        delta = adjustment.delta,
        tokens,
        balance_version = version,
        "Token balance adjusted"
    );
    Ok(entry)
}

/// Compare the stored balance with completed ledger credits minus visit debits
pub async fn reconcile(pool: &SqlitePool, member_id: i64) -> ServiceResult<LedgerReconciliation> {
    let member = members::find_by_id(pool, member_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;
    let ledger_tokens = transactions::completed_token_sum(pool, member_id).await?;
    let visit_tokens = visits::token_sum_for_member(pool, member_id).await?;

    let report = LedgerReconciliation::new(member_id, ledger_tokens, visit_tokens, member.tokens);
    if !report.consistent {
        tracing::warn!(
            member_id,
            expected = report.expected_balance,
            actual = report.actual_balance,
            "Ledger does not reconcile with balance"
        );
    }
    Ok(report)
}

/// A member's ledger page, newest first
pub async fn member_transactions(
    pool: &SqlitePool,
    member_id: i64,
    limit: i64,
    offset: i64,
) -> ServiceResult<(Vec<LedgerEntry>, i64)> {
    Ok(transactions::list_for_member(pool, member_id, limit, offset).await?)
}
