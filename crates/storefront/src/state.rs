//! Application state shared across handlers.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::catalog::{FiltersState, SharedFilters, watcher};
use crate::config::StorefrontConfig;
use crate::db::{SeedCatalog, Store};
use crate::services::{AuthError, AuthService, CartService, CatalogService, TokenKeys};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the catalog service, the shared listing state and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<Store>,
    catalog: CatalogService,
    filters: Arc<SharedFilters>,
    tokens: TokenKeys,
}

impl AppState {
    /// Create a new application state over a seeded store.
    ///
    /// Seeds the configured guest and admin accounts and loads the listing
    /// state from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured account email is invalid.
    pub async fn new(config: StorefrontConfig, seed: SeedCatalog) -> Result<Self, AuthError> {
        let store = Arc::new(Store::new(seed));
        let catalog = CatalogService::new(Arc::clone(&store), &config.cache);
        let filters = Arc::new(SharedFilters::new(config.items_per_page));
        let tokens = TokenKeys::new(config.jwt_secret_bytes(), config.token_ttl);

        AuthService::new(&store, &tokens)
            .seed_accounts(&config.accounts)
            .await?;
        let snapshot = catalog.snapshot().await;
        filters.sync(&snapshot).await;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                filters,
                tokens,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the in-memory store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Authentication service over the store.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.store, &self.inner.tokens)
    }

    /// Cart and wishlist service over the store.
    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.inner.store, &self.inner.catalog)
    }

    /// Listing state synced to the current catalog version.
    pub async fn listing(&self) -> FiltersState {
        let snapshot = self.inner.catalog.snapshot().await;
        self.inner.filters.sync(&snapshot).await;
        self.inner.filters.current().await
    }

    /// Start the task that resyncs the listing state on catalog changes.
    #[must_use]
    pub fn start_catalog_watcher(&self) -> JoinHandle<()> {
        watcher::spawn_watcher(
            self.inner.catalog.subscribe(),
            Arc::clone(&self.inner.filters),
            self.inner.catalog.clone(),
        )
    }
}
