//! Member area: plans, purchase, check-in, dashboard and history

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use shared::models::{
    CheckIn, LedgerEntry, MemberDashboard, PLANS, Page, PageQuery, PurchaseReceipt, Role,
    SubscriptionPlan, VisitWithGym,
};

use super::{ApiResult, ok, ok_with};
use crate::auth::{CurrentUser, require_auth, require_role};
use crate::services::{checkin, ledger, reports};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/subscription-plans", get(subscription_plans))
        .route("/purchase-subscription", post(purchase_subscription))
        .route("/check-in", post(check_in))
        .route("/dashboard", get(dashboard))
        .route("/visit-history", get(visit_history))
        .route("/transactions", get(transactions))
        .route_layer(middleware::from_fn(require_role(Role::Member)))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    #[serde(alias = "planId")]
    pub plan_id: String,
}

/// Internal gym id (number or digit string) or gym code
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GymIdentifier {
    Id(i64),
    Text(String),
}

impl GymIdentifier {
    fn as_text(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(alias = "gymId", alias = "gym_code")]
    pub gym_id: GymIdentifier,
}

/// GET /api/member/subscription-plans
pub async fn subscription_plans() -> ApiResult<&'static [SubscriptionPlan]> {
    ok(&PLANS[..])
}

/// POST /api/member/purchase-subscription
pub async fn purchase_subscription(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<PurchaseRequest>,
) -> ApiResult<PurchaseReceipt> {
    let now = shared::util::now_millis();
    let receipt =
        ledger::purchase(&state.pool, user.id, &req.plan_id, state.config.renewal_policy, now)
            .await?;
    ok_with("Subscription purchased successfully", receipt)
}

/// POST /api/member/check-in
///
/// A repeat check-in at the same gym on the same day succeeds with
/// `outcome = already_checked_in` and costs nothing.
pub async fn check_in(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CheckInRequest>,
) -> ApiResult<CheckIn> {
    let now = shared::util::now_millis();
    let result = checkin::check_in(&state.pool, user.id, &req.gym_id.as_text(), now).await?;
    ok_with(result.message(), result)
}

/// GET /api/member/dashboard
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> ApiResult<MemberDashboard> {
    let now = shared::util::now_millis();
    ok(reports::member_dashboard(&state.pool, user.id, now).await?)
}

/// GET /api/member/visit-history?page&limit
pub async fn visit_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<VisitWithGym>> {
    ok(reports::visit_history(&state.pool, user.id, &query).await?)
}

/// GET /api/member/transactions?page&limit
pub async fn transactions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<LedgerEntry>> {
    ok(reports::transaction_history(&state.pool, user.id, &query).await?)
}
