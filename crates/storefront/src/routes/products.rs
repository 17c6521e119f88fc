//! Product handlers: catalog, search, filtered listing and detail.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::{Price, PriceRange, Product, ProductId, SortOption};

use super::ApiQuery;
use crate::catalog::{CompanyFilter, FilterAction, FilterUpdate, Filters, FiltersState, facets};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Highest star rating.
const MAX_RATING: u8 = 5;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Listing query parameters. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub search: Option<String>,
    /// Comma-separated category names.
    pub category: Option<String>,
    pub company: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub rating: Option<u8>,
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
}

/// One page of the filtered listing plus the facets to render filters with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub products: Vec<Product>,
    pub page: usize,
    pub total_pages: usize,
    pub total_products: usize,
    pub page_size: usize,
    pub filters: Filters,
    pub companies: Vec<String>,
    pub price_bounds: PriceRange,
}

impl ListingQuery {
    /// Turn the query into reducer actions, ending with apply and page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for unparsable prices, ratings above 5,
    /// inverted price ranges and unknown sort options.
    pub fn actions(self, bounds: PriceRange) -> Result<Vec<FilterAction>> {
        let mut actions = vec![FilterAction::ClearFilters];

        if let Some(text) = self.search {
            actions.push(FilterAction::UpdateFilter(FilterUpdate::Search(text)));
        }
        for name in self
            .category
            .iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            actions.push(FilterAction::CheckCategory(name.to_string()));
        }
        if let Some(company) = self.company {
            actions.push(FilterAction::UpdateFilter(FilterUpdate::Company(
                CompanyFilter::parse(&company),
            )));
        }
        let min = parse_price("minPrice", self.min_price.as_deref())?;
        let max = parse_price("maxPrice", self.max_price.as_deref())?;
        if let Some(range) = price_range(min, max, bounds)? {
            actions.push(FilterAction::UpdateFilter(FilterUpdate::Price(range)));
        }
        if let Some(rating) = self.rating {
            if rating > MAX_RATING {
                return Err(AppError::Validation(format!(
                    "rating must be between 0 and {MAX_RATING}"
                )));
            }
            actions.push(FilterAction::UpdateFilter(FilterUpdate::Rating(Some(
                rating,
            ))));
        }
        if let Some(sort) = self.sort.filter(|s| !s.trim().is_empty()) {
            let option = SortOption::parse(sort.trim()).ok_or_else(|| {
                AppError::Validation(format!("unknown sort option: {sort}"))
            })?;
            actions.push(FilterAction::UpdateFilter(FilterUpdate::Sort(Some(option))));
        }

        actions.push(FilterAction::ApplyFilters);
        actions.push(FilterAction::SetPage(
            self.page.unwrap_or(1).saturating_sub(1),
        ));
        Ok(actions)
    }
}

/// Selected price range from the query's ends.
///
/// A missing end defaults to the matching bound, or to the given end when that
/// bound would invert the range. Only two explicit ends can be inverted.
fn price_range(
    min: Option<Price>,
    max: Option<Price>,
    bounds: PriceRange,
) -> Result<Option<PriceRange>> {
    let range = match (min, max) {
        (None, None) => return Ok(None),
        (Some(min), Some(max)) if min > max => {
            return Err(AppError::Validation(format!(
                "minPrice ({min}) cannot exceed maxPrice ({max})"
            )));
        }
        (Some(min), Some(max)) => PriceRange::new(min, max),
        (Some(min), None) => PriceRange::new(min, bounds.max.max(min)),
        (None, Some(max)) => PriceRange::new(bounds.min.min(max), max),
    };
    Ok(Some(range))
}

fn parse_price(name: &str, value: Option<&str>) -> Result<Option<Price>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    Decimal::from_str(value)
        .ok()
        .and_then(|amount| Price::new(amount).ok())
        .map(Some)
        .ok_or_else(|| AppError::Validation(format!("{name} must be a non-negative number")))
}

/// All products.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "products": state.catalog().products().await }))
}

/// Text search over name, description, company and category.
#[instrument(skip_all, fields(query = %query.query))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Json<Value> {
    let products = state.catalog().search(&query.query).await;
    Json(json!({ "products": *products }))
}

/// Filtered, sorted and paginated listing.
#[instrument(skip_all)]
pub async fn listing(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> Result<Json<ListingResponse>> {
    let listing = state.listing().await;
    let actions = query.actions(listing.bounds())?;
    let listing = actions.into_iter().fold(listing, FiltersState::reduce);
    Ok(Json(ListingResponse::from(listing)))
}

impl From<FiltersState> for ListingResponse {
    fn from(state: FiltersState) -> Self {
        Self {
            products: state.current_page().to_vec(),
            page: state.page_index() + 1,
            total_pages: state.total_pages(),
            total_products: state.displayable(),
            page_size: state.page_size(),
            companies: facets::companies(state.products()),
            price_bounds: state.bounds(),
            filters: state.filters().clone(),
        }
    }
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>> {
    let product = state.catalog().product(&ProductId::new(product_id)).await?;
    let discount_percent = product.discount_percent();
    Ok(Json(json!({
        "product": product,
        "discountPercent": discount_percent,
    })))
}
