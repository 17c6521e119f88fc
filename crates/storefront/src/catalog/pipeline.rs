//! Listing pipeline: search, filter, sort, paginate.

use bazaar_core::{Product, SortOption};

use super::state::Filters;

/// Run search, filters and sort over `products`.
#[must_use]
pub fn run(products: &[Product], filters: &Filters) -> Vec<Product> {
    let mut matched: Vec<Product> = search(products, &filters.search)
        .filter(|p| passes(p, filters))
        .cloned()
        .collect();
    sort(&mut matched, filters.sort);
    matched
}

/// Products whose name, description, company or category contains `text`
/// (trimmed, case-insensitive). Blank text matches everything.
pub fn search<'a>(products: &'a [Product], text: &str) -> impl Iterator<Item = &'a Product> {
    let needle = text.trim().to_lowercase();
    products
        .iter()
        .filter(move |p| needle.is_empty() || matches_text(p, &needle))
}

fn matches_text(product: &Product, needle: &str) -> bool {
    [
        &product.name,
        &product.description,
        &product.company,
        &product.category,
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Category, company, price and rating filters.
#[must_use]
pub fn passes(product: &Product, filters: &Filters) -> bool {
    (!filters.any_category_checked() || filters.is_checked(&product.category))
        && filters.company.matches(&product.company)
        && filters.price.contains(product.price)
        && filters
            .rating
            .is_none_or(|min| product.stars > 0 && product.stars >= min)
}

/// Stable sort by `option`; `None` keeps catalog order.
pub fn sort(products: &mut [Product], option: Option<SortOption>) {
    match option {
        None => {}
        Some(SortOption::PriceLowToHigh) => products.sort_by_key(|p| p.price),
        Some(SortOption::PriceHighToLow) => {
            products.sort_by(|a, b| b.price.cmp(&a.price));
        }
        Some(SortOption::NameAToZ) => products.sort_by_cached_key(|p| p.name.to_lowercase()),
        Some(SortOption::NameZToA) => {
            products.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
        }
    }
}

/// Split into pages of `page_size`. An empty list gives one empty page.
#[must_use]
pub fn paginate(products: Vec<Product>, page_size: usize) -> Vec<Vec<Product>> {
    if products.is_empty() {
        return vec![Vec::new()];
    }
    let page_size = page_size.max(1);
    let mut pages = Vec::with_capacity(products.len().div_ceil(page_size));
    let mut rest = products.into_iter().peekable();
    while rest.peek().is_some() {
        pages.push(rest.by_ref().take(page_size).collect());
    }
    pages
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Price, PriceRange};

    use super::*;
    use crate::catalog::{CompanyFilter, FilterAction, FiltersState};
    use crate::db::SeedCatalog;

    fn catalog() -> Vec<Product> {
        SeedCatalog::embedded().unwrap().products
    }

    fn filters() -> Filters {
        FiltersState::default()
            .reduce(FilterAction::LoadCatalog {
                products: catalog(),
                categories: Vec::new(),
            })
            .filters()
            .clone()
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_search_fields_and_case() {
        let products = catalog();
        let hits: Vec<_> = search(&products, "  ARMCHAIR ").cloned().collect();
        assert_eq!(names(&hits), ["Armchair", "Suede armchair"]);

        let by_company: Vec<_> = search(&products, "ikea").collect();
        assert_eq!(by_company.len(), 3);

        assert_eq!(search(&products, "").count(), products.len());
        assert_eq!(search(&products, "zzz").count(), 0);
    }

    #[test]
    fn test_company_filter_is_exact() {
        let mut filters = filters();
        filters.company = CompanyFilter::parse("liddy");
        let matched = run(&catalog(), &filters);
        assert_eq!(matched.len(), 3);
        assert!(matched.iter().all(|p| p.company == "liddy"));

        filters.company = CompanyFilter::parse("Liddy");
        assert!(run(&catalog(), &filters).is_empty());
    }

    #[test]
    fn test_unrated_products_excluded_by_rating() {
        let mut filters = filters();
        filters.rating = Some(0);
        let matched = run(&catalog(), &filters);
        assert_eq!(matched.len(), 12);
        assert!(matched.iter().all(|p| p.name != "High-back bench"));
    }

    #[test]
    fn test_price_range_inclusive() {
        let mut filters = filters();
        filters.price = PriceRange::new(Price::whole(1_099), Price::whole(2_599));
        let matched = run(&catalog(), &filters);
        assert_eq!(names(&matched), ["Kitchen cupboard", "Simple chair"]);
    }

    #[test]
    fn test_sort_orders() {
        let mut products = catalog();
        sort(&mut products, Some(SortOption::PriceHighToLow));
        assert!(products.windows(2).all(|w| w[0].price >= w[1].price));
        assert_eq!(products[0].name, "Albany sectional");

        sort(&mut products, Some(SortOption::PriceLowToHigh));
        assert!(products.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(products[0].name, "Wooden bed");

        sort(&mut products, Some(SortOption::NameAToZ));
        assert_eq!(products[0].name, "Accra accent chair");
        assert_eq!(products[12].name, "Wooden bed");

        sort(&mut products, Some(SortOption::NameZToA));
        assert_eq!(products[0].name, "Wooden bed");
    }

    #[test]
    fn test_sort_none_keeps_order() {
        let mut products = catalog();
        sort(&mut products, None);
        assert_eq!(products, catalog());
    }

    #[test]
    fn test_paginate() {
        let pages = paginate(catalog(), 5);
        assert_eq!(
            pages.iter().map(Vec::len).collect::<Vec<_>>(),
            [5, 5, 3]
        );
        assert_eq!(paginate(Vec::new(), 5), vec![Vec::<Product>::new()]);
        assert_eq!(paginate(catalog(), 0).len(), 13);
    }
}
