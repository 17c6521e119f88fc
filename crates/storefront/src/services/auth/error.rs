//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account for the email.
    #[error("user not found")]
    UserNotFound,

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Token missing, malformed, expired or for an unknown account.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated, but not an admin.
    #[error("admin access required")]
    Forbidden,

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
