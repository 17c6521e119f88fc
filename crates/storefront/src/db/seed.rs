//! Seed catalog embedded in the binary.

use std::collections::HashSet;

use bazaar_core::{Category, Product};

use super::RepositoryError;

const PRODUCTS_JSON: &str = include_str!("../../data/products.json");
const CATEGORIES_JSON: &str = include_str!("../../data/categories.json");

/// Products and categories used to seed the store.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

impl SeedCatalog {
    /// The catalog shipped with the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Seed` if the embedded JSON does not parse and
    /// `RepositoryError::DataCorruption` if product IDs repeat.
    pub fn embedded() -> Result<Self, RepositoryError> {
        Self::from_json(PRODUCTS_JSON, CATEGORIES_JSON)
    }

    /// Parse a catalog from product and category JSON arrays.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Seed` on malformed JSON (including negative
    /// prices) and `RepositoryError::DataCorruption` on duplicate IDs.
    pub fn from_json(products: &str, categories: &str) -> Result<Self, RepositoryError> {
        let products: Vec<Product> = serde_json::from_str(products)?;
        let categories: Vec<Category> = serde_json::from_str(categories)?;

        let mut seen = HashSet::new();
        if let Some(dup) = products.iter().find(|p| !seen.insert(&p.id)) {
            return Err(RepositoryError::DataCorruption(format!(
                "duplicate product id {}",
                dup.id
            )));
        }

        Ok(Self {
            products,
            categories,
        })
    }
}
