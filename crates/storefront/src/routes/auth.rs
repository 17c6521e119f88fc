//! Signup and login handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use super::ApiJson;
use crate::error::Result;
use crate::models::User;
use crate::services::auth::{LoginRequest, SignupRequest};
use crate::state::AppState;

/// Response to a successful signup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub created_user: User,
    pub encoded_token: String,
}

/// Response to a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub found_user: User,
    pub encoded_token: String,
}

/// Create an account.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let (created_user, encoded_token) = state.auth().signup(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            created_user,
            encoded_token,
        }),
    ))
}

/// Log in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (found_user, encoded_token) = state.auth().login(request).await?;
    Ok(Json(LoginResponse {
        found_user,
        encoded_token,
    }))
}
