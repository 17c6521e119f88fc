//! In-memory data store for the storefront.
//!
//! The store is the simulated backend: products, categories and accounts live
//! in a single [`Store`] behind an async `RwLock`, seeded from the JSON files
//! embedded in the binary. Nothing is persisted; a restart reseeds.
//!
//! # Repositories
//!
//! - [`catalog::CatalogRepository`] - products and categories
//! - [`users::UserRepository`] - accounts, carts and wishlists
//!
//! Every catalog mutation bumps a version counter so derived views (the
//! listing filter state) can tell when they are stale.

pub mod catalog;
pub mod seed;
pub mod users;

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;

use bazaar_core::{Category, Product, UserId};

use crate::models::User;

pub use catalog::{CatalogRepository, CatalogSnapshot};
pub use seed::SeedCatalog;
pub use users::UserRepository;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with the same key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Seed data could not be parsed.
    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),

    /// Stored data violates an invariant.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Shared in-memory store.
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<StoreData>,
}

#[derive(Debug, Default)]
pub(crate) struct StoreData {
    pub(crate) products: Vec<Product>,
    pub(crate) categories: Vec<Category>,
    pub(crate) users: HashMap<UserId, User>,
    /// Normalized email -> account
    pub(crate) emails: HashMap<String, UserId>,
    pub(crate) catalog_version: u64,
}

impl Store {
    /// Create a store holding the given catalog and no accounts.
    #[must_use]
    pub fn new(seed: SeedCatalog) -> Self {
        Self {
            data: RwLock::new(StoreData {
                products: seed.products,
                categories: seed.categories,
                ..StoreData::default()
            }),
        }
    }

    /// Repository for products and categories.
    #[must_use]
    pub const fn catalog(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(self)
    }

    /// Repository for accounts.
    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    pub(crate) async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, StoreData> {
        self.data.read().await
    }

    pub(crate) async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, StoreData> {
        self.data.write().await
    }
}
