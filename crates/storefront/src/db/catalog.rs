//! Product and category repository.

use bazaar_core::{Category, CategoryId, Product, ProductId};

use super::{RepositoryError, Store};

/// Point-in-time copy of the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    /// Catalog version the copy was taken at.
    pub version: u64,
}

/// Repository for catalog operations.
pub struct CatalogRepository<'a> {
    store: &'a Store,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Copy of all products and categories with the current version.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        let data = self.store.read().await;
        CatalogSnapshot {
            products: data.products.clone(),
            categories: data.categories.clone(),
            version: data.catalog_version,
        }
    }

    /// Current catalog version.
    pub async fn version(&self) -> u64 {
        self.store.read().await.catalog_version
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ID is taken.
    pub async fn insert_product(&self, product: Product) -> Result<u64, RepositoryError> {
        let mut data = self.store.write().await;
        if data.products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::Conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        data.products.push(product);
        data.catalog_version += 1;
        Ok(data.catalog_version)
    }

    /// Replace a product in place, keeping its position in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the ID.
    pub async fn replace_product(&self, product: Product) -> Result<u64, RepositoryError> {
        let mut data = self.store.write().await;
        let slot = data
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {}", product.id)))?;
        *slot = product;
        data.catalog_version += 1;
        Ok(data.catalog_version)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the ID.
    pub async fn delete_product(&self, id: &ProductId) -> Result<u64, RepositoryError> {
        let mut data = self.store.write().await;
        let before = data.products.len();
        data.products.retain(|p| &p.id != id);
        if data.products.len() == before {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }
        data.catalog_version += 1;
        Ok(data.catalog_version)
    }

    /// Enable or disable a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has the ID.
    pub async fn set_category_disabled(
        &self,
        id: &CategoryId,
        disabled: bool,
    ) -> Result<(Category, u64), RepositoryError> {
        let mut data = self.store.write().await;
        let category = data
            .categories
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("category {id}")))?;
        category.disabled = disabled;
        let updated = category.clone();
        data.catalog_version += 1;
        Ok((updated, data.catalog_version))
    }
}
