//! Gym area: dashboard, visit reports, today's visits

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, middleware};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{GymDashboard, ReportPeriod, Role, VisitWithMember};

use super::{ApiResult, ok};
use crate::auth::{CurrentUser, require_auth, require_role};
use crate::services::reports;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/reports", get(visit_report))
        .route("/today-visits", get(today_visits))
        .route_layer(middleware::from_fn(require_role(Role::Gym)))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default)]
    pub format: ReportFormat,
}

/// GET /api/gym/dashboard
pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> ApiResult<GymDashboard> {
    let now = shared::util::now_millis();
    ok(reports::gym_dashboard(&state.pool, user.id, now).await?)
}

/// GET /api/gym/reports?period=daily|weekly|monthly|yearly&format=json|csv
pub async fn visit_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let now = shared::util::now_millis();
    let report = reports::gym_report(&state.pool, user.id, query.period, now).await?;

    match query.format {
        ReportFormat::Json => Ok(ApiResponse::success(report).into_response()),
        ReportFormat::Csv => {
            let disposition = format!(
                "attachment; filename=gym-visits-{}.csv",
                query.period.as_str()
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                reports::report_csv(&report),
            )
                .into_response())
        }
    }
}

/// GET /api/gym/today-visits
pub async fn today_visits(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<VisitWithMember>> {
    let now = shared::util::now_millis();
    ok(reports::today_visits(&state.pool, user.id, now).await?)
}
