//! User repository.
//!
//! Accounts are indexed by ID and by normalized email. Carts and wishlists live
//! on the account record and are changed through [`UserRepository::update`].

use chrono::Utc;

use bazaar_core::{Email, UserId};

use super::{RepositoryError, Store};
use crate::models::{NewUser, User};

/// Repository for account operations.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get a user by email address (case-insensitive).
    pub async fn get_by_email(&self, email: &Email) -> Option<User> {
        let data = self.store.read().await;
        data.emails
            .get(&email.normalized())
            .and_then(|id| data.users.get(id))
            .cloned()
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &UserId) -> Option<User> {
        self.store.read().await.users.get(id).cloned()
    }

    /// Number of accounts.
    pub async fn count(&self) -> usize {
        self.store.read().await.users.len()
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut data = self.store.write().await;
        let key = new_user.email.normalized();
        if data.emails.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                new_user.email
            )));
        }

        let user = User::new(new_user);
        data.emails.insert(key, user.id.clone());
        data.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    /// Apply `f` to an account under the write lock and stamp `updated_at`.
    ///
    /// Changes are kept only when `f` succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` (converted into `E`) if the account
    /// doesn't exist, or whatever `f` returns.
    pub async fn update<T, E, F>(&self, id: &UserId, f: F) -> Result<(User, T), E>
    where
        F: FnOnce(&mut User) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut data = self.store.write().await;
        let stored = data
            .users
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {id}")))?;

        let mut draft = stored.clone();
        let out = f(&mut draft)?;
        draft.updated_at = Utc::now();
        *stored = draft.clone();
        Ok((draft, out))
    }
}
