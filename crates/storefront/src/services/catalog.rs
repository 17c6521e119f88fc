//! Catalog reads with caching, and admin catalog mutations.
//!
//! Reads go through two `moka` caches: the full catalog snapshot (5 minute TTL
//! by default) and search results (30 seconds, bounded). Cached entries are
//! tagged with the catalog version so a mutation is never masked by a stale
//! entry; mutations also clear both caches and publish a [`CatalogEvent`].

use std::sync::Arc;

use moka::future::Cache;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use bazaar_core::{Category, CategoryId, Product, ProductId};

use crate::catalog::{CatalogEvent, pipeline};
use crate::config::CacheConfig;
use crate::db::{CatalogSnapshot, RepositoryError, Store};

/// Buffered catalog events per subscriber.
const EVENT_CAPACITY: usize = 64;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("product already exists: {0}")]
    DuplicateProduct(ProductId),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalog access shared by handlers and the listing watcher.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    store: Arc<Store>,
    snapshots: Cache<(), Arc<CatalogSnapshot>>,
    searches: Cache<(u64, String), Arc<Vec<Product>>>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogService {
    /// Create the service over `store`.
    #[must_use]
    pub fn new(store: Arc<Store>, config: &CacheConfig) -> Self {
        let snapshots = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_ttl)
            .build();
        let searches = Cache::builder()
            .max_capacity(config.search_capacity)
            .time_to_live(config.search_ttl)
            .build();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(CatalogServiceInner {
                store,
                snapshots,
                searches,
                events,
            }),
        }
    }

    /// Subscribe to catalog change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.inner.events.subscribe()
    }

    /// Current catalog, served from cache while the version is unchanged.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let version = self.inner.store.catalog().version().await;
        if let Some(cached) = self.inner.snapshots.get(&()).await
            && cached.version == version
        {
            return cached;
        }

        let snapshot = Arc::new(self.inner.store.catalog().snapshot().await);
        debug!(version = snapshot.version, "catalog snapshot refreshed");
        self.inner.snapshots.insert((), Arc::clone(&snapshot)).await;
        snapshot
    }

    /// All products.
    pub async fn products(&self) -> Vec<Product> {
        self.snapshot().await.products.clone()
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` for unknown IDs.
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.snapshot()
            .await
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))
    }

    /// All categories.
    pub async fn categories(&self) -> Vec<Category> {
        self.snapshot().await.categories.clone()
    }

    /// One category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` for unknown IDs.
    pub async fn category(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        self.snapshot()
            .await
            .categories
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::CategoryNotFound(id.clone()))
    }

    /// Products matching `query` by name, description, company or category.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Arc<Vec<Product>> {
        let snapshot = self.snapshot().await;
        let key = (snapshot.version, query.trim().to_lowercase());
        if let Some(hit) = self.inner.searches.get(&key).await {
            debug!("search cache hit");
            return hit;
        }

        let results: Arc<Vec<Product>> = Arc::new(
            pipeline::search(&snapshot.products, &key.1)
                .cloned()
                .collect(),
        );
        self.inner.searches.insert(key, Arc::clone(&results)).await;
        results
    }

    // =========================================================================
    // Admin mutations
    // =========================================================================

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProduct` if the ID is taken.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create_product(&self, product: Product) -> Result<Product, CatalogError> {
        let id = product.id.clone();
        self.inner
            .store
            .catalog()
            .insert_product(product.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CatalogError::DuplicateProduct(id),
                other => other.into(),
            })?;
        self.changed(CatalogEvent::ProductsUpdated).await;
        Ok(product)
    }

    /// Replace the product stored under `id`. The body's ID is ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` for unknown IDs.
    #[instrument(skip(self, product))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        mut product: Product,
    ) -> Result<Product, CatalogError> {
        product.id = id.clone();
        self.inner
            .store
            .catalog()
            .replace_product(product.clone())
            .await
            .map_err(|e| not_found_as(e, || CatalogError::ProductNotFound(id.clone())))?;
        self.changed(CatalogEvent::ProductsUpdated).await;
        Ok(product)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        self.inner
            .store
            .catalog()
            .delete_product(id)
            .await
            .map_err(|e| not_found_as(e, || CatalogError::ProductNotFound(id.clone())))?;
        self.changed(CatalogEvent::ProductsUpdated).await;
        Ok(())
    }

    /// Enable or disable a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn set_category_disabled(
        &self,
        id: &CategoryId,
        disabled: bool,
    ) -> Result<Category, CatalogError> {
        let (category, _) = self
            .inner
            .store
            .catalog()
            .set_category_disabled(id, disabled)
            .await
            .map_err(|e| not_found_as(e, || CatalogError::CategoryNotFound(id.clone())))?;
        self.changed(CatalogEvent::CategoriesUpdated).await;
        Ok(category)
    }

    async fn changed(&self, event: CatalogEvent) {
        self.inner.snapshots.invalidate_all();
        self.inner.searches.invalidate_all();
        self.inner.snapshots.run_pending_tasks().await;
        self.inner.searches.run_pending_tasks().await;
        // No subscribers is fine; readers resync lazily.
        let _ = self.inner.events.send(event);
        tracing::info!(?event, "catalog updated");
    }
}

fn not_found_as(error: RepositoryError, not_found: impl FnOnce() -> CatalogError) -> CatalogError {
    match error {
        RepositoryError::NotFound(_) => not_found(),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::SeedCatalog;

    fn service() -> CatalogService {
        let store = Arc::new(Store::new(SeedCatalog::embedded().unwrap()));
        CatalogService::new(store, &CacheConfig::default())
    }

    #[tokio::test]
    async fn test_lookup() {
        let catalog = service();
        let accra = catalog
            .product(&ProductId::new("recmg2a1ctaEJNZhu"))
            .await
            .unwrap();
        assert_eq!(accra.name, "Accra accent chair");
        assert!(matches!(
            catalog.product(&ProductId::new("missing")).await,
            Err(CatalogError::ProductNotFound(_))
        ));
        assert_eq!(catalog.categories().await.len(), 6);
    }

    #[tokio::test]
    async fn test_search_sees_mutations() {
        let catalog = service();
        assert_eq!(catalog.search("sofa").await.len(), 1);

        catalog
            .delete_product(&ProductId::new("recrfxv3EwpvJwvjq"))
            .await
            .unwrap();
        assert!(catalog.search("  SOFA ").await.is_empty());
        assert_eq!(catalog.products().await.len(), 12);
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let catalog = service();
        let mut events = catalog.subscribe();

        let mut product = catalog
            .product(&ProductId::new("recmg2a1ctaEJNZhu"))
            .await
            .unwrap();
        product.id = ProductId::new("new-chair");
        catalog.create_product(product.clone()).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), CatalogEvent::ProductsUpdated);
        assert!(matches!(
            catalog.create_product(product).await,
            Err(CatalogError::DuplicateProduct(_))
        ));

        let kids = catalog
            .set_category_disabled(&CategoryId::new("reckL4KcxhJHxxWla"), false)
            .await
            .unwrap();
        assert!(kids.is_enabled());
        assert_eq!(events.recv().await.unwrap(), CatalogEvent::CategoriesUpdated);
    }

    #[tokio::test]
    async fn test_update_uses_path_id() {
        let catalog = service();
        let id = ProductId::new("recAp0eALpr2IAp89");
        let mut product = catalog.product(&id).await.unwrap();
        product.id = ProductId::new("ignored");
        product.name = "Reading armchair".to_string();

        let updated = catalog.update_product(&id, product).await.unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(catalog.product(&id).await.unwrap().name, "Reading armchair");
        assert_eq!(catalog.snapshot().await.version, 1);
    }
}
