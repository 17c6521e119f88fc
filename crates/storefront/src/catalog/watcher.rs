//! Catalog change notifications and the shared listing state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use super::state::{FilterAction, FiltersState};
use crate::db::CatalogSnapshot;
use crate::services::CatalogService;

/// Published on every catalog mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CatalogEvent {
    ProductsUpdated,
    CategoriesUpdated,
}

/// Server-wide listing state tagged with the catalog version it reflects.
#[derive(Debug)]
pub struct SharedFilters {
    inner: RwLock<Synced>,
}

#[derive(Debug, Default)]
struct Synced {
    state: FiltersState,
    /// `None` until the first catalog load.
    version: Option<u64>,
}

impl SharedFilters {
    /// Empty state paginating by `page_size`.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            inner: RwLock::new(Synced {
                state: FiltersState::new(page_size),
                version: None,
            }),
        }
    }

    /// Bring the state up to `snapshot` if it is newer.
    ///
    /// The first call loads the catalog; later calls resync it. Returns
    /// whether anything changed.
    pub async fn sync(&self, snapshot: &CatalogSnapshot) -> bool {
        if self
            .inner
            .read()
            .await
            .version
            .is_some_and(|v| v >= snapshot.version)
        {
            return false;
        }

        let mut synced = self.inner.write().await;
        let action = match synced.version {
            Some(v) if v >= snapshot.version => return false,
            Some(_) => FilterAction::SyncCatalog {
                products: snapshot.products.clone(),
                categories: snapshot.categories.clone(),
            },
            None => FilterAction::LoadCatalog {
                products: snapshot.products.clone(),
                categories: snapshot.categories.clone(),
            },
        };
        let state = std::mem::take(&mut synced.state);
        synced.state = state.reduce(action);
        synced.version = Some(snapshot.version);
        tracing::debug!(version = snapshot.version, "listing state synced");
        true
    }

    /// Copy of the current state.
    pub async fn current(&self) -> FiltersState {
        self.inner.read().await.state.clone()
    }

    /// Catalog version the state reflects.
    pub async fn version(&self) -> Option<u64> {
        self.inner.read().await.version
    }
}

/// Resync `filters` whenever the catalog publishes a change.
///
/// Lagged receivers resync once; the task ends when every sender is dropped.
pub fn spawn_watcher(
    mut events: broadcast::Receiver<CatalogEvent>,
    filters: Arc<SharedFilters>,
    catalog: CatalogService,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(?event, "catalog changed"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "catalog watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
            let snapshot = catalog.snapshot().await;
            filters.sync(&snapshot).await;
        }
        tracing::info!("catalog watcher stopped");
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::CategoryId;

    use super::*;
    use crate::db::{SeedCatalog, Store};

    #[tokio::test]
    async fn test_first_sync_loads_then_only_newer_versions_apply() {
        let store = Store::new(SeedCatalog::embedded().unwrap());
        let filters = SharedFilters::new(9);
        assert_eq!(filters.version().await, None);

        let snapshot = store.catalog().snapshot().await;
        assert!(filters.sync(&snapshot).await);
        assert!(!filters.sync(&snapshot).await);
        assert_eq!(filters.current().await.displayable(), 13);

        store
            .catalog()
            .set_category_disabled(&CategoryId::new("reckL4KcxhJHxxWla"), false)
            .await
            .unwrap();
        assert!(filters.sync(&store.catalog().snapshot().await).await);
        assert_eq!(filters.version().await, Some(1));
        assert!(
            filters
                .current()
                .await
                .filters()
                .categories
                .iter()
                .any(|c| c.name == "kids")
        );
    }
}
