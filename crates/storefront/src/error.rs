//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. Every failure is rendered as `{"errors": [message]}`.
//! All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CatalogError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart or wishlist operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request understood but invalid.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repository(err) => repository_status(err),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::UserAlreadyExists => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Repository(err) => repository_status(err),
                AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound(_)
                | CartError::NotInCart(_)
                | CartError::NotInWishlist(_) => StatusCode::NOT_FOUND,
                CartError::AlreadyWishlisted(_) => StatusCode::CONFLICT,
                CartError::OutOfStock(_)
                | CartError::ExceedsStock { .. }
                | CartError::BelowMinimum
                | CartError::UnknownColor { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CartError::Repository(err) => repository_status(err),
            },
            Self::Catalog(err) => match err {
                CatalogError::ProductNotFound(_) | CatalogError::CategoryNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CatalogError::DuplicateProduct(_) => StatusCode::CONFLICT,
                CatalogError::Repository(err) => repository_status(err),
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message shown to the client. Internal details are never exposed.
    #[must_use]
    pub fn message(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(e) => format!("Invalid email address: {e}"),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::UserAlreadyExists => {
                    "This email is already registered. Try another email.".to_string()
                }
                AuthError::UserNotFound => {
                    "The email you entered is not registered.".to_string()
                }
                AuthError::InvalidCredentials => {
                    "The credentials you entered are invalid.".to_string()
                }
                AuthError::InvalidToken(_) => "Please log in to continue.".to_string(),
                AuthError::Forbidden => "Admin access required.".to_string(),
                other => other.to_string(),
            },
            Self::Cart(err) => capitalize(&err.to_string()),
            Self::Catalog(err) => capitalize(&err.to_string()),
            Self::Repository(err) => capitalize(&err.to_string()),
            Self::BadRequest(msg) | Self::Validation(msg) => msg.clone(),
            Self::RateLimited => "Too many requests, please slow down.".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Seed(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        (status, Json(json!({ "errors": [self.message()] }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
