//! Authentication extractors.
//!
//! Tokens arrive in the `authorization` header, with or without a `Bearer `
//! prefix. Extraction fails with the usual JSON error envelope.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::AuthError;
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::InvalidToken("missing authorization header".to_string()))?;

        let user = state.auth().authenticate(token).await?;
        tracing::Span::current().record("user_id", user.id.as_str());
        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "non-admin attempted admin action");
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self(user))
    }
}
