//! JWT Extractor
//!
//! Handlers take [`CurrentUser`] as an argument. Behind [`require_auth`] the
//! user is read from request extensions; elsewhere the token is validated here.
//!
//! [`require_auth`]: crate::auth::require_auth

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared::error::AppError;

use crate::auth::CurrentUser;
use crate::auth::middleware::authenticate;
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let user = authenticate(state.get_jwt_service(), header, &parts.uri)?;
        parts.extensions.insert(user);
        Ok(user)
    }
}
