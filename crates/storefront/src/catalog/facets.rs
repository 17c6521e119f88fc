//! Facets derived from the catalog: slider bounds, categories, companies.

use std::collections::HashSet;

use bazaar_core::{Category, Price, PriceRange, Product};

/// Upper slider bound used when the catalog is empty.
const EMPTY_MAX_PRICE: u64 = 100_000;

/// Slider bounds used when the catalog is empty.
#[must_use]
pub fn empty_bounds() -> PriceRange {
    PriceRange::new(Price::ZERO, Price::whole(EMPTY_MAX_PRICE))
}

/// Friendly-rounded price bounds of `products`.
#[must_use]
pub fn price_bounds(products: &[Product]) -> PriceRange {
    let Some(min) = products.iter().map(|p| p.price).min() else {
        return empty_bounds();
    };
    let max = products.iter().map(|p| p.price).max().unwrap_or(min);
    PriceRange::new(min.round_down_friendly(), max.round_up_friendly())
}

/// Categories that can be offered as checkboxes.
///
/// Distinct product categories in first-seen order. When category records are
/// present, categories that are disabled or unknown are left out.
#[must_use]
pub fn enabled_categories(products: &[Product], categories: &[Category]) -> Vec<String> {
    let allowed: Option<HashSet<&str>> = (!categories.is_empty()).then(|| {
        categories
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.name.as_str())
            .collect()
    });

    distinct(products.iter().map(|p| p.category.as_str()))
        .into_iter()
        .filter(|name| allowed.as_ref().is_none_or(|set| set.contains(name.as_str())))
        .collect()
}

/// Distinct product companies in first-seen order.
#[must_use]
pub fn companies(products: &[Product]) -> Vec<String> {
    distinct(products.iter().map(|p| p.company.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::SeedCatalog;

    #[test]
    fn test_seed_price_bounds() {
        let seed = SeedCatalog::embedded().unwrap();
        let bounds = price_bounds(&seed.products);
        assert_eq!(bounds.min, Price::whole(200));
        assert_eq!(bounds.max, Price::whole(110_000));
    }

    #[test]
    fn test_empty_catalog_bounds() {
        let bounds = price_bounds(&[]);
        assert_eq!(bounds.min, Price::ZERO);
        assert_eq!(bounds.max, Price::whole(100_000));
    }

    #[test]
    fn test_disabled_categories_hidden() {
        let seed = SeedCatalog::embedded().unwrap();
        assert_eq!(
            enabled_categories(&seed.products, &seed.categories),
            ["office", "living room", "bedroom", "kitchen", "dining"]
        );
    }

    #[test]
    fn test_categories_without_metadata() {
        let seed = SeedCatalog::embedded().unwrap();
        let names = enabled_categories(&seed.products, &[]);
        assert_eq!(names.len(), 6);
        assert_eq!(names.last().map(String::as_str), Some("dining"));
        assert!(names.iter().any(|n| n == "kids"));
    }

    #[test]
    fn test_companies_first_seen() {
        let seed = SeedCatalog::embedded().unwrap();
        assert_eq!(
            companies(&seed.products),
            ["marcos", "liddy", "ikea", "caressa"]
        );
    }
}
