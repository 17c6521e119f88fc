//! Listing filter state and its reducer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{Category, Price, PriceRange, Product, SortOption};

use super::{DEFAULT_PAGE_SIZE, facets, pipeline};

/// Largest gap kept between the two price slider thumbs.
const MAX_THUMB_GAP: u64 = 1_000;

/// Company filter: every company or one by exact name.
///
/// Serialized as a plain string, `"all"` for [`CompanyFilter::All`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompanyFilter {
    #[default]
    All,
    Named(String),
}

impl CompanyFilter {
    /// Parse a query value; empty and `all` (any case) mean every company.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    /// Whether a product from `company` passes.
    #[must_use]
    pub fn matches(&self, company: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == company,
        }
    }
}

impl From<String> for CompanyFilter {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CompanyFilter> for String {
    fn from(filter: CompanyFilter) -> Self {
        match filter {
            CompanyFilter::All => "all".to_string(),
            CompanyFilter::Named(name) => name,
        }
    }
}

/// One category checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCheck {
    pub name: String,
    pub checked: bool,
}

/// Filters as selected by the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub search: String,
    pub categories: Vec<CategoryCheck>,
    pub company: CompanyFilter,
    pub price: PriceRange,
    /// Minimum star rating.
    pub rating: Option<u8>,
    pub sort: Option<SortOption>,
}

impl Filters {
    fn cleared(categories: &[CategoryCheck], bounds: PriceRange) -> Self {
        Self {
            search: String::new(),
            categories: categories
                .iter()
                .map(|c| CategoryCheck {
                    name: c.name.clone(),
                    checked: false,
                })
                .collect(),
            company: CompanyFilter::All,
            price: bounds,
            rating: None,
            sort: None,
        }
    }

    /// Whether any category checkbox is ticked.
    #[must_use]
    pub fn any_category_checked(&self) -> bool {
        self.categories.iter().any(|c| c.checked)
    }

    /// Whether `category` is ticked.
    #[must_use]
    pub fn is_checked(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.checked && c.name == category)
    }

    fn set_checked(&mut self, category: &str, checked: impl FnOnce(bool) -> bool) {
        if let Some(check) = self.categories.iter_mut().find(|c| c.name == category) {
            check.checked = checked(check.checked);
        } else {
            self.categories.push(CategoryCheck {
                name: category.to_string(),
                checked: checked(false),
            });
        }
    }
}

/// A single filter change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Search(String),
    Company(CompanyFilter),
    Price(PriceRange),
    Rating(Option<u8>),
    Sort(Option<SortOption>),
}

/// Which price slider thumb moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb {
    Low,
    High,
}

/// Everything that can happen to the listing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Initial load of the catalog.
    LoadCatalog {
        products: Vec<Product>,
        categories: Vec<Category>,
    },
    ToggleCategory(String),
    /// Update the search text without leaving the current page.
    SetSearch(String),
    /// Change one filter and go back to the first page.
    UpdateFilter(FilterUpdate),
    MovePriceThumb {
        low: Price,
        high: Price,
        thumb: Thumb,
    },
    CheckCategory(String),
    ClearFilters,
    SetPage(usize),
    ApplyFilters,
    /// Catalog data changed underneath the listing.
    SyncCatalog {
        products: Vec<Product>,
        categories: Vec<Category>,
    },
}

/// Listing state: the catalog, the selected filters and the derived pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiltersState {
    products: Vec<Product>,
    pages: Vec<Vec<Product>>,
    bounds: PriceRange,
    filters: Filters,
    page: usize,
    displayable: usize,
    page_size: usize,
}

impl Default for FiltersState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FiltersState {
    /// Empty state paginating by `page_size` (at least 1).
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        let bounds = facets::empty_bounds();
        Self {
            products: Vec::new(),
            pages: vec![Vec::new()],
            bounds,
            filters: Filters::cleared(&[], bounds),
            page: 0,
            displayable: 0,
            page_size: page_size.max(1),
        }
    }

    /// Apply `action` and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: FilterAction) -> Self {
        match action {
            FilterAction::LoadCatalog {
                products,
                categories,
            } => {
                self.bounds = facets::price_bounds(&products);
                let checks: Vec<CategoryCheck> = facets::enabled_categories(&products, &categories)
                    .into_iter()
                    .map(|name| CategoryCheck {
                        name,
                        checked: false,
                    })
                    .collect();
                self.filters = Filters::cleared(&checks, self.bounds);
                self.pages = pipeline::paginate(products.clone(), self.page_size);
                self.displayable = products.len();
                self.products = products;
                self.page = 0;
            }
            FilterAction::ToggleCategory(name) => {
                self.filters.set_checked(&name, |checked| !checked);
            }
            FilterAction::SetSearch(text) => {
                self.filters.search = text;
            }
            FilterAction::UpdateFilter(update) => {
                match update {
                    FilterUpdate::Search(text) => self.filters.search = text,
                    FilterUpdate::Company(company) => self.filters.company = company,
                    FilterUpdate::Price(range) => self.filters.price = range,
                    FilterUpdate::Rating(rating) => self.filters.rating = rating,
                    FilterUpdate::Sort(sort) => self.filters.sort = sort,
                }
                self.page = 0;
            }
            FilterAction::MovePriceThumb { low, high, thumb } => {
                self.filters.price = self.slider_range(low, high, thumb);
                self.page = 0;
            }
            FilterAction::CheckCategory(name) => {
                self.filters.set_checked(&name, |_| true);
            }
            FilterAction::ClearFilters => {
                self.filters = Filters::cleared(&self.filters.categories, self.bounds);
                self.page = 0;
            }
            FilterAction::SetPage(index) => {
                self.page = index.min(self.last_page());
            }
            FilterAction::ApplyFilters => {
                self.run_pipeline();
                self.page = 0;
            }
            FilterAction::SyncCatalog {
                products,
                categories,
            } => {
                self.bounds = facets::price_bounds(&products);
                let previous = std::mem::take(&mut self.filters.categories);
                self.filters.categories = facets::enabled_categories(&products, &categories)
                    .into_iter()
                    .map(|name| {
                        let checked = previous.iter().any(|c| c.checked && c.name == name);
                        CategoryCheck { name, checked }
                    })
                    .collect();
                self.filters.price = clamp_range(self.filters.price, self.bounds);
                self.products = products;
                self.run_pipeline();
                self.page = self.page.min(self.last_page());
            }
        }
        self
    }

    fn run_pipeline(&mut self) {
        let matched = pipeline::run(&self.products, &self.filters);
        self.displayable = matched.len();
        self.pages = pipeline::paginate(matched, self.page_size);
    }

    /// New slider range after a thumb move, keeping the thumbs apart.
    fn slider_range(&self, low: Price, high: Price, thumb: Thumb) -> PriceRange {
        let max_gap = Decimal::from(MAX_THUMB_GAP);
        let gap = (self.bounds.width() / Decimal::ONE_HUNDRED).min(max_gap);
        let (mut low, mut high) = (low.amount(), high.amount());
        match thumb {
            Thumb::Low => low = low.min(high - gap),
            Thumb::High => high = high.max(low + gap),
        }
        let (floor, ceiling) = (self.bounds.min.amount(), self.bounds.max.amount());
        let low = low.clamp(floor, ceiling);
        let high = high.clamp(floor, ceiling);
        PriceRange::new(
            Price::new(low).unwrap_or(self.bounds.min),
            Price::new(high).unwrap_or(self.bounds.min),
        )
    }

    fn last_page(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    /// All catalog products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Filtered products, paginated. Always holds at least one page.
    #[must_use]
    pub fn pages(&self) -> &[Vec<Product>] {
        &self.pages
    }

    /// Products on the current page.
    #[must_use]
    pub fn current_page(&self) -> &[Product] {
        self.pages.get(self.page).map(Vec::as_slice).unwrap_or_default()
    }

    /// Zero-based index of the current page.
    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Number of products matching the applied filters.
    #[must_use]
    pub const fn displayable(&self) -> usize {
        self.displayable
    }

    /// Slider bounds for the current catalog.
    #[must_use]
    pub const fn bounds(&self) -> PriceRange {
        self.bounds
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }
}

/// Pull `range` into `bounds`; a range entirely outside collapses onto them.
fn clamp_range(range: PriceRange, bounds: PriceRange) -> PriceRange {
    let clamped = range.clamp_within(bounds);
    if clamped.min > clamped.max {
        bounds
    } else {
        clamped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::SeedCatalog;

    fn loaded() -> FiltersState {
        let seed = SeedCatalog::embedded().unwrap();
        FiltersState::default().reduce(FilterAction::LoadCatalog {
            products: seed.products,
            categories: seed.categories,
        })
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_load_catalog() {
        let state = loaded();
        assert_eq!(state.displayable(), 13);
        assert_eq!(state.total_pages(), 2);
        assert_eq!(state.current_page().len(), 9);
        assert_eq!(state.bounds().min, Price::whole(200));
        assert_eq!(state.bounds().max, Price::whole(110_000));
        assert_eq!(state.filters().price, state.bounds());
        assert_eq!(state.filters().categories.len(), 5);
        assert!(!state.filters().any_category_checked());
    }

    #[test]
    fn test_empty_state_has_one_page() {
        let state = FiltersState::new(9).reduce(FilterAction::ApplyFilters);
        assert_eq!(state.pages(), &[Vec::<Product>::new()]);
        assert_eq!(state.bounds().max, Price::whole(100_000));
    }

    #[test]
    fn test_toggle_category_twice_unchecks() {
        let state = loaded()
            .reduce(FilterAction::ToggleCategory("office".into()))
            .reduce(FilterAction::ToggleCategory("office".into()));
        assert!(!state.filters().is_checked("office"));

        let state = state.reduce(FilterAction::ToggleCategory("unknown".into()));
        assert!(state.filters().is_checked("unknown"));
    }

    #[test]
    fn test_category_filter() {
        let state = loaded()
            .reduce(FilterAction::CheckCategory("kitchen".into()))
            .reduce(FilterAction::CheckCategory("kitchen".into()))
            .reduce(FilterAction::ApplyFilters);
        assert_eq!(state.displayable(), 2);
        assert_eq!(
            names(state.current_page()),
            ["Kitchen cupboard", "Simple chair"]
        );
    }

    #[test]
    fn test_update_filter_resets_page_but_set_search_does_not() {
        let state = loaded().reduce(FilterAction::SetPage(1));
        assert_eq!(state.page_index(), 1);

        let state = state.reduce(FilterAction::SetSearch("chair".into()));
        assert_eq!(state.page_index(), 1);

        let state = state.reduce(FilterAction::UpdateFilter(FilterUpdate::Sort(Some(
            SortOption::PriceLowToHigh,
        ))));
        assert_eq!(state.page_index(), 0);
    }

    #[test]
    fn test_set_page_clamps_to_last() {
        let state = loaded().reduce(FilterAction::SetPage(7));
        assert_eq!(state.page_index(), 1);
        assert_eq!(state.current_page().len(), 4);
    }

    #[test]
    fn test_price_and_rating_filters() {
        let state = loaded()
            .reduce(FilterAction::UpdateFilter(FilterUpdate::Price(
                PriceRange::new(Price::whole(20_000), Price::whole(60_000)),
            )))
            .reduce(FilterAction::UpdateFilter(FilterUpdate::Rating(Some(4))))
            .reduce(FilterAction::UpdateFilter(FilterUpdate::Sort(Some(
                SortOption::PriceLowToHigh,
            ))))
            .reduce(FilterAction::ApplyFilters);
        assert_eq!(
            names(state.current_page()),
            [
                "Emperor bed",
                "Accra accent chair",
                "Modern bookshelf",
                "Dining table"
            ]
        );
        assert!(
            state
                .current_page()
                .iter()
                .all(|p| state.filters().price.contains(p.price))
        );
    }

    #[test]
    fn test_clear_filters_keeps_category_names() {
        let state = loaded()
            .reduce(FilterAction::CheckCategory("office".into()))
            .reduce(FilterAction::UpdateFilter(FilterUpdate::Company(
                CompanyFilter::parse("ikea"),
            )))
            .reduce(FilterAction::ClearFilters);
        assert_eq!(state.filters().categories.len(), 5);
        assert!(!state.filters().any_category_checked());
        assert_eq!(state.filters().company, CompanyFilter::All);
        assert_eq!(state.filters().price, state.bounds());
    }

    #[test]
    fn test_company_filter_wire_format() {
        assert_eq!(
            serde_json::to_value(CompanyFilter::All).unwrap(),
            serde_json::json!("all")
        );
        let named: CompanyFilter = serde_json::from_str("\"ikea\"").unwrap();
        assert_eq!(named, CompanyFilter::Named("ikea".to_string()));
        assert_eq!(CompanyFilter::parse(" ALL "), CompanyFilter::All);
    }

    #[test]
    fn test_move_price_thumb_keeps_gap() {
        let state = loaded();
        // Bounds 200..110000: 1% of the width is 1098, capped at 1000.
        let state = state.reduce(FilterAction::MovePriceThumb {
            low: Price::whole(50_000),
            high: Price::whole(50_500),
            thumb: Thumb::Low,
        });
        assert_eq!(state.filters().price.min, Price::whole(49_500));
        assert_eq!(state.filters().price.max, Price::whole(50_500));

        let state = state.reduce(FilterAction::MovePriceThumb {
            low: Price::whole(109_500),
            high: Price::whole(109_000),
            thumb: Thumb::High,
        });
        assert_eq!(state.filters().price.min, Price::whole(109_500));
        assert_eq!(state.filters().price.max, Price::whole(110_000));
    }

    #[test]
    fn test_move_price_thumb_past_bounds_stays_within() {
        let state = loaded().reduce(FilterAction::MovePriceThumb {
            low: Price::whole(150_000),
            high: Price::whole(120_000),
            thumb: Thumb::High,
        });
        assert_eq!(state.filters().price.min, Price::whole(110_000));
        assert_eq!(state.filters().price.max, Price::whole(110_000));

        let state = state.reduce(FilterAction::MovePriceThumb {
            low: Price::whole(100),
            high: Price::whole(50),
            thumb: Thumb::Low,
        });
        assert_eq!(state.filters().price.min, Price::whole(200));
        assert_eq!(state.filters().price.max, Price::whole(200));
    }

    #[test]
    fn test_sync_keeps_surviving_checks_and_clamps_price() {
        let seed = SeedCatalog::embedded().unwrap();
        let state = loaded()
            .reduce(FilterAction::CheckCategory("office".into()))
            .reduce(FilterAction::CheckCategory("dining".into()))
            .reduce(FilterAction::ApplyFilters);
        assert_eq!(state.displayable(), 4);

        let products: Vec<Product> = seed
            .products
            .into_iter()
            .filter(|p| p.category != "dining" && p.price < Price::whole(100_000))
            .collect();
        let state = state.reduce(FilterAction::SyncCatalog {
            products,
            categories: seed.categories,
        });

        assert!(state.filters().is_checked("office"));
        assert!(state.filters().categories.iter().all(|c| c.name != "dining"));
        // Leather sofa (99999) is now the most expensive product.
        assert_eq!(state.bounds().max, Price::whole(100_000));
        assert_eq!(state.filters().price.max, Price::whole(100_000));
        assert_eq!(state.displayable(), 3);
    }

    #[test]
    fn test_sync_clamps_page_index() {
        let seed = SeedCatalog::embedded().unwrap();
        let state = loaded().reduce(FilterAction::SetPage(1));
        let products = seed.products.into_iter().take(3).collect();
        let state = state.reduce(FilterAction::SyncCatalog {
            products,
            categories: seed.categories,
        });
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.page_index(), 0);
    }
}
