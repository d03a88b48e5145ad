//! Admin area
//!
//! Every route needs the admin role plus the capability named on its group.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router, middleware};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError};
use shared::models::{
    AdminDashboard, GlobalReport, GymCreate, GymProfile, GymUpdate, LedgerEntry,
    LedgerReconciliation, MemberProfile, MemberUpdate, PERM_MANAGE_GYMS,
    PERM_MANAGE_TRANSACTIONS, PERM_MANAGE_USERS, PERM_VIEW_REPORTS, Page, PageQuery,
    ReportPeriod, Role, TokenAdjustment, UserSummary,
};

use super::{ApiResult, ok, ok_with};
use crate::auth::{require_auth, require_permission, require_role};
use crate::services::{accounts, ledger, reports};
use crate::state::AppState;

/// Ledger entries shown with a reconciliation report
const LEDGER_PAGE_LIMIT: i64 = 100;

pub fn router(state: AppState) -> Router<AppState> {
    let guarded = |routes: Router<AppState>, permission: &'static str| {
        routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(permission),
        ))
    };

    let reports_routes = guarded(
        Router::new()
            .route("/dashboard", get(dashboard))
            .route("/reports", get(global_reports)),
        PERM_VIEW_REPORTS,
    );
    let user_routes = guarded(
        Router::new()
            .route("/members", get(list_members))
            .route("/members/{id}", put(update_member))
            .route("/users/{id}/deactivate", patch(deactivate_user)),
        PERM_MANAGE_USERS,
    );
    let gym_routes = guarded(
        Router::new()
            .route("/gyms", get(list_gyms).post(create_gym))
            .route("/gyms/{id}", put(update_gym)),
        PERM_MANAGE_GYMS,
    );
    let ledger_routes = guarded(
        Router::new()
            .route("/members/{id}/adjust-tokens", post(adjust_tokens))
            .route("/members/{id}/ledger", get(member_ledger)),
        PERM_MANAGE_TRANSACTIONS,
    );

    Router::new()
        .merge(reports_routes)
        .merge(user_routes)
        .merge(gym_routes)
        .merge(ledger_routes)
        .route_layer(middleware::from_fn(require_role(Role::Admin)))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: ReportPeriod,
}

#[derive(Debug, Serialize)]
pub struct MemberLedger {
    pub entries: Vec<LedgerEntry>,
    pub total: i64,
    pub reconciliation: LedgerReconciliation,
}

/// GET /api/admin/dashboard
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<AdminDashboard> {
    let now = shared::util::now_millis();
    ok(reports::admin_dashboard(&state.pool, now).await?)
}

/// GET /api/admin/members?page&limit&search
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<MemberProfile>> {
    ok(reports::list_members(&state.pool, &query).await?)
}

/// GET /api/admin/gyms?page&limit&search
pub async fn list_gyms(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<GymProfile>> {
    ok(reports::list_gyms(&state.pool, &query).await?)
}

/// POST /api/admin/gyms
pub async fn create_gym(
    State(state): State<AppState>,
    Json(req): Json<GymCreate>,
) -> Result<(StatusCode, Json<ApiResponse<GymProfile>>), AppError> {
    let now = shared::util::now_millis();
    let gym = accounts::create_gym(&state.pool, &state.mailer, &req, now).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Gym created successfully. Login credentials sent by email.",
            gym,
        )),
    ))
}

/// PUT /api/admin/members/{id}
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MemberUpdate>,
) -> ApiResult<MemberProfile> {
    let now = shared::util::now_millis();
    ok_with(
        "Member updated successfully",
        accounts::update_member(&state.pool, id, &req, now).await?,
    )
}

/// PUT /api/admin/gyms/{id}
pub async fn update_gym(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<GymUpdate>,
) -> ApiResult<GymProfile> {
    let now = shared::util::now_millis();
    ok_with(
        "Gym updated successfully",
        accounts::update_gym(&state.pool, id, &req, now).await?,
    )
}

/// PATCH /api/admin/users/{id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<UserSummary> {
    let now = shared::util::now_millis();
    ok_with(
        "User deactivated successfully",
        accounts::deactivate_user(&state.pool, id, now).await?,
    )
}

/// POST /api/admin/members/{id}/adjust-tokens
pub async fn adjust_tokens(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TokenAdjustment>,
) -> ApiResult<LedgerEntry> {
    let now = shared::util::now_millis();
    ok_with(
        "Token balance adjusted",
        ledger::adjust_tokens(&state.pool, id, &req, now).await?,
    )
}

/// GET /api/admin/members/{id}/ledger
pub async fn member_ledger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<MemberLedger> {
    let reconciliation = ledger::reconcile(&state.pool, id).await?;
    let (entries, total) = ledger::member_transactions(&state.pool, id, LEDGER_PAGE_LIMIT, 0).await?;
    ok(MemberLedger {
        entries,
        total,
        reconciliation,
    })
}

/// GET /api/admin/reports?period
pub async fn global_reports(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<GlobalReport> {
    let now = shared::util::now_millis();
    ok(reports::global_report(&state.pool, query.period, now).await?)
}
