//! Authentication service.
//!
//! Mock email/password accounts. Passwords are compared in plaintext against
//! the in-memory store; sessions are signed tokens (see [`token`]).

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::Email;

use crate::config::AccountsConfig;
use crate::db::users::UserRepository;
use crate::db::{RepositoryError, Store};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Signup form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a Store, tokens: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(store),
            tokens,
        }
    }

    /// Register a new account and issue a token for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<(User, String), AuthError> {
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;

        let user = self
            .users
            .create(NewUser {
                email,
                password: SecretString::from(request.password),
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                is_admin: false,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "account created");
        Ok((user, token))
    }

    /// Check credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserNotFound` if no account has the email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String), AuthError> {
        let email = Email::parse(&request.email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await
            .ok_or(AuthError::UserNotFound)?;

        if !user.password_matches(&request.password) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Resolve a token to its account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token doesn't verify or its
    /// account no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;
        self.users
            .get_by_id(&claims.user_id)
            .await
            .ok_or_else(|| AuthError::InvalidToken("unknown account".to_string()))
    }

    /// Create the guest account, and the admin account when a password is
    /// configured. Existing accounts are left alone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if a configured email is invalid.
    pub async fn seed_accounts(&self, accounts: &AccountsConfig) -> Result<(), AuthError> {
        if let Some(password) = &accounts.admin_password {
            self.ensure_account(&accounts.admin_email, password, "Super", "Admin", true)
                .await?;
        } else {
            tracing::warn!("BAZAAR_ADMIN_PASSWORD not set, admin account disabled");
        }
        self.ensure_account(
            &accounts.guest_email,
            &accounts.guest_password,
            "Guest",
            "Shopper",
            false,
        )
        .await
    }

    async fn ensure_account(
        &self,
        email: &str,
        password: &SecretString,
        first_name: &str,
        last_name: &str,
        is_admin: bool,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        if self.users.get_by_email(&email).await.is_some() {
            return Ok(());
        }
        let user = self
            .users
            .create(NewUser {
                email,
                password: SecretString::from(password.expose_secret().to_owned()),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                is_admin,
            })
            .await?;
        tracing::info!(user_id = %user.id, email = %user.email, is_admin, "seeded account");
        Ok(())
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::SeedCatalog;

    fn keys() -> TokenKeys {
        TokenKeys::new(b"k3Y!pR9#vT2@mW7$xZ4%bN8^cQ1&dF6*", Duration::from_secs(60))
    }

    fn signup(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Kim".to_string(),
            last_name: "Park".to_string(),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let store = Store::new(SeedCatalog::default());
        let keys = keys();
        let auth = AuthService::new(&store, &keys);

        let (created, token) = auth.signup(signup("kim@example.com", "secret1")).await.unwrap();
        assert!(!created.is_admin);
        assert_eq!(auth.authenticate(&token).await.unwrap().id, created.id);

        let (found, _) = auth
            .login(LoginRequest {
                email: "KIM@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_signup_errors() {
        let store = Store::new(SeedCatalog::default());
        let keys = keys();
        let auth = AuthService::new(&store, &keys);

        assert!(matches!(
            auth.signup(signup("not-an-email", "secret1")).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.signup(signup("kim@example.com", "short")).await,
            Err(AuthError::WeakPassword(_))
        ));
        auth.signup(signup("kim@example.com", "secret1")).await.unwrap();
        assert!(matches!(
            auth.signup(signup("kim@example.com", "secret2")).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_login_errors() {
        let store = Store::new(SeedCatalog::default());
        let keys = keys();
        let auth = AuthService::new(&store, &keys);
        auth.signup(signup("kim@example.com", "secret1")).await.unwrap();

        let login = |email: &str, password: &str| LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        assert!(matches!(
            auth.login(login("nobody@example.com", "secret1")).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.login(login("kim@example.com", "wrong-pass")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_seed_accounts_is_idempotent() {
        let store = Store::new(SeedCatalog::default());
        let keys = keys();
        let auth = AuthService::new(&store, &keys);
        let accounts = AccountsConfig {
            admin_password: Some(SecretString::from("admin-pass")),
            ..AccountsConfig::default()
        };

        auth.seed_accounts(&accounts).await.unwrap();
        auth.seed_accounts(&accounts).await.unwrap();
        assert_eq!(store.users().count().await, 2);

        let (admin, _) = auth
            .login(LoginRequest {
                email: "admin@bazaar.local".to_string(),
                password: "admin-pass".to_string(),
            })
            .await
            .unwrap();
        assert!(admin.is_admin);
    }

    #[tokio::test]
    async fn test_no_admin_without_password() {
        let store = Store::new(SeedCatalog::default());
        let keys = keys();
        AuthService::new(&store, &keys)
            .seed_accounts(&AccountsConfig::default())
            .await
            .unwrap();
        assert_eq!(store.users().count().await, 1);
    }
}
