//! Authentication middleware
//!
//! [`require_auth`] validates the bearer token, confirms the account is still
//! active and injects [`CurrentUser`] into request extensions. Role and
//! permission guards run after it.
//!
//! | Failure | Code |
//! |---------|------|
//! | No Authorization header | 401 NotAuthenticated |
//! | Expired token | 401 TokenExpired |
//! | Invalid token | 401 TokenInvalid |
//! | Deactivated account | 401 AccountDisabled |
//! | Wrong role / missing permission | 403 |

use std::future::Future;
use std::pin::Pin;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::db::{admins, users};
use crate::security_log;
use crate::state::AppState;

type GuardFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Decode and verify the bearer token into a [`CurrentUser`]
pub(crate) fn authenticate(
    jwt: &JwtService,
    header: Option<&str>,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let token = match header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = uri.to_string());
            return Err(AppError::unauthorized());
        }
    };

    let claims = jwt.validate_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri.to_string());
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;
    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let user = authenticate(state.get_jwt_service(), header, req.uri())?;

    let record = users::find_by_id(&state.pool, user.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "User lookup failed during authentication");
            AppError::new(ErrorCode::DatabaseError)
        })?;
    match record {
        Some(u) if u.is_active && u.role == user.role => {}
        Some(u) if !u.is_active => {
            security_log!("WARN", "auth_disabled_account", user_id = user.id);
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }
        _ => {
            security_log!("WARN", "auth_unknown_user", user_id = user.id);
            return Err(AppError::invalid_token("Unknown user"));
        }
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role guard
///
/// ```ignore
/// Router::new()
///     .route("/dashboard", get(dashboard))
///     .layer(middleware::from_fn(require_role(Role::Gym)));
/// ```
pub fn require_role(role: Role) -> impl Fn(Request, Next) -> GuardFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .copied()
                .ok_or(AppError::unauthorized())?;

            if user.role != role {
                security_log!(
                    "WARN",
                    "role_required",
                    user_id = user.id,
                    user_role = user.role.as_db(),
                    required_role = role.as_db()
                );
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    format!("{role} role required"),
                ));
            }
            Ok(next.run(req).await)
        })
    }
}

/// Admin capability guard; use with `middleware::from_fn_with_state`
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(State<AppState>, Request, Next) -> GuardFuture + Clone {
    move |State(state): State<AppState>, req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .copied()
                .ok_or(AppError::unauthorized())?;
            if !user.is_admin() {
                return Err(AppError::new(ErrorCode::AdminRequired));
            }

            let admin = admins::find_by_id(&state.pool, user.id).await.map_err(|e| {
                tracing::error!(error = %e, "Admin lookup failed");
                AppError::new(ErrorCode::DatabaseError)
            })?;
            if !admin.is_some_and(|a| a.has_permission(permission)) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!("Permission denied: {permission}")));
            }
            Ok(next.run(req).await)
        })
    }
}
