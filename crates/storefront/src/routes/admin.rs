//! Admin catalog handlers.
//!
//! Every mutation publishes a catalog event; the listing state picks it up
//! through the watcher or on the next listing request.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::{CategoryId, Product, ProductId};

use super::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Create or replace product request.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product: Product,
}

/// Category update request.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub disabled: bool,
}

fn validate(product: &Product) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(AppError::Validation("Product name is required".to_string()));
    }
    if product.category.trim().is_empty() {
        return Err(AppError::Validation(
            "Product category is required".to_string(),
        ));
    }
    if product.stars > 5 {
        return Err(AppError::Validation(
            "Stars must be between 0 and 5".to_string(),
        ));
    }
    Ok(())
}

/// Add a product.
#[instrument(skip_all, fields(admin = %admin.id, product_id = %request.product.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(request): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    validate(&request.product)?;
    let product = state.catalog().create_product(request.product).await?;
    Ok((StatusCode::CREATED, Json(json!({ "product": product }))))
}

/// Replace a product.
#[instrument(skip_all, fields(admin = %admin.id, %product_id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<String>,
    ApiJson(request): ApiJson<ProductRequest>,
) -> Result<Json<Value>> {
    validate(&request.product)?;
    let product = state
        .catalog()
        .update_product(&ProductId::new(product_id), request.product)
        .await?;
    Ok(Json(json!({ "product": product })))
}

/// Delete a product; responds with the remaining products.
#[instrument(skip_all, fields(admin = %admin.id, %product_id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<String>,
) -> Result<Json<Value>> {
    state
        .catalog()
        .delete_product(&ProductId::new(product_id))
        .await?;
    Ok(Json(json!({ "products": state.catalog().products().await })))
}

/// Enable or disable a category.
#[instrument(skip_all, fields(admin = %admin.id, %category_id))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(category_id): Path<String>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> Result<Json<Value>> {
    let category = state
        .catalog()
        .set_category_disabled(&CategoryId::new(category_id), request.disabled)
        .await?;
    Ok(Json(json!({ "category": category })))
}
