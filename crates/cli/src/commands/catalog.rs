//! Catalog commands over the embedded seed data.

use clap::Args;
use serde_json::{Value, json};

use bazaar_storefront::catalog::{DEFAULT_PAGE_SIZE, FilterAction, FiltersState, facets, pipeline};
use bazaar_storefront::db::SeedCatalog;
use bazaar_storefront::routes::products::{ListingQuery, ListingResponse};

use super::CommandError;

/// Listing options, mirroring the listing endpoint's query parameters.
#[derive(Debug, Default, Args)]
pub struct ListingArgs {
    /// Search text
    #[arg(long)]
    pub search: Option<String>,

    /// Comma-separated category names
    #[arg(long)]
    pub category: Option<String>,

    /// Exact company name, or `all`
    #[arg(long)]
    pub company: Option<String>,

    /// Lowest price (inclusive)
    #[arg(long)]
    pub min_price: Option<String>,

    /// Highest price (inclusive)
    #[arg(long)]
    pub max_price: Option<String>,

    /// Minimum star rating (0-5); unrated products never match
    #[arg(long)]
    pub rating: Option<u8>,

    /// `price_low_to_high`, `price_high_to_low`, `name_a_to_z` or `name_z_to_a`
    #[arg(long)]
    pub sort: Option<String>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Products per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

impl From<ListingArgs> for ListingQuery {
    fn from(args: ListingArgs) -> Self {
        Self {
            search: args.search,
            category: args.category,
            company: args.company,
            min_price: args.min_price,
            max_price: args.max_price,
            rating: args.rating,
            sort: args.sort,
            page: Some(args.page),
        }
    }
}

fn loaded(page_size: usize) -> Result<FiltersState, CommandError> {
    let seed = SeedCatalog::embedded()?;
    tracing::debug!(products = seed.products.len(), "seed catalog loaded");
    Ok(FiltersState::new(page_size).reduce(FilterAction::LoadCatalog {
        products: seed.products,
        categories: seed.categories,
    }))
}

/// One listing page.
///
/// # Errors
///
/// Returns `CommandError::InvalidQuery` for invalid filter options.
pub fn listing(args: ListingArgs) -> Result<Value, CommandError> {
    let state = loaded(args.page_size)?;
    let actions = ListingQuery::from(args).actions(state.bounds())?;
    let state = actions.into_iter().fold(state, FiltersState::reduce);
    Ok(serde_json::to_value(ListingResponse::from(state))?)
}

/// Slider bounds, enabled categories and companies.
///
/// # Errors
///
/// Returns `CommandError::Seed` if the embedded catalog is invalid.
pub fn facets() -> Result<Value, CommandError> {
    let seed = SeedCatalog::embedded()?;
    Ok(json!({
        "priceBounds": facets::price_bounds(&seed.products),
        "categories": facets::enabled_categories(&seed.products, &seed.categories),
        "companies": facets::companies(&seed.products),
    }))
}

/// Products matching `query`, with their discount.
///
/// # Errors
///
/// Returns `CommandError::Seed` if the embedded catalog is invalid.
pub fn search(query: &str) -> Result<Value, CommandError> {
    let seed = SeedCatalog::embedded()?;
    let products: Vec<Value> = pipeline::search(&seed.products, query)
        .map(|p| {
            json!({
                "_id": p.id,
                "name": p.name,
                "price": p.price,
                "discountPercent": p.discount_percent(),
            })
        })
        .collect();
    Ok(json!({ "products": products }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_defaults() {
        let value = listing(ListingArgs {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            ..ListingArgs::default()
        })
        .unwrap();
        assert_eq!(value["totalProducts"], 13);
        assert_eq!(value["totalPages"], 2);
        assert_eq!(value["products"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_listing_filters() {
        let value = listing(ListingArgs {
            category: Some("kitchen".into()),
            sort: Some("price_low_to_high".into()),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            ..ListingArgs::default()
        })
        .unwrap();
        assert_eq!(value["products"][0]["name"], "Simple chair");
        assert_eq!(value["products"][1]["name"], "Kitchen cupboard");
    }

    #[test]
    fn test_listing_rejects_unknown_sort() {
        let err = listing(ListingArgs {
            sort: Some("cheapest".into()),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            ..ListingArgs::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("unknown sort option"));
    }

    #[test]
    fn test_facets() {
        let value = facets().unwrap();
        assert_eq!(value["priceBounds"]["max"], 110_000.0);
        assert_eq!(value["companies"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_search() {
        let value = search("bed").unwrap();
        let names: Vec<&str> = value["products"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        // "bedroom" matches through the category
        assert_eq!(names, ["Armchair", "Emperor bed", "Wooden bed"]);
    }
}
