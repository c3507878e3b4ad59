//! Static-token authentication extractor for the admin routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use zawadi_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Admin caller authenticated via a Bearer token in the `Authorization`
/// header, checked against the configured `ADMIN_API_TOKEN`.
///
/// Use this as an extractor parameter in any handler under `/admin`:
///
/// ```ignore
/// async fn my_handler(_admin: AdminAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.admin_api_token.as_deref().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Admin API is not configured".into(),
            ))
        })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        // Compare digests rather than the raw strings so the comparison
        // time does not depend on where the first mismatching byte is.
        if Sha256::digest(token.as_bytes()) != Sha256::digest(expected.as_bytes()) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid admin token".into(),
            )));
        }

        Ok(AdminAuth)
    }
}
