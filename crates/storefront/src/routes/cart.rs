//! Cart handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::ProductId;

use super::ApiJson;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::models::{CartItem, CartSummary};
use crate::services::QuantityChange;
use crate::state::AppState;

/// Product reference in a cart or wishlist request.
#[derive(Debug, Deserialize)]
pub struct ProductRef {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub color: Option<String>,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product: ProductRef,
}

/// Quantity change in an update request.
#[derive(Debug, Deserialize)]
pub struct CartAction {
    #[serde(rename = "type")]
    pub change: QuantityChange,
    #[serde(default)]
    pub color: Option<String>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub action: CartAction,
}

/// Cart contents.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Vec<CartItem>,
}

/// Cart contents with totals.
#[derive(Debug, Serialize)]
pub struct CartSummaryResponse {
    pub cart: Vec<CartItem>,
    pub summary: CartSummary,
}

/// Show the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartSummaryResponse>> {
    let (cart, summary) = state.cart().cart(&user.id).await?;
    Ok(Json(CartSummaryResponse { cart, summary }))
}

/// Add a product to the cart.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %request.product.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartResponse>)> {
    let cart = state
        .cart()
        .add_to_cart(&user.id, &request.product.id, request.product.color)
        .await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        &[("product_id", request.product.id.as_str())],
    );
    Ok((StatusCode::CREATED, Json(CartResponse { cart })))
}

/// Increment or decrement a cart line.
#[instrument(skip_all, fields(user_id = %user.id, %product_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<String>,
    ApiJson(request): ApiJson<UpdateCartRequest>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .cart()
        .change_quantity(
            &user.id,
            &ProductId::new(product_id),
            request.action.change,
            request.action.color,
        )
        .await?;
    Ok(Json(CartResponse { cart }))
}

/// Remove a product from the cart.
#[instrument(skip_all, fields(user_id = %user.id, %product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .cart()
        .remove_from_cart(&user.id, &ProductId::new(product_id))
        .await?;
    Ok(Json(CartResponse { cart }))
}

/// Empty the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartResponse>> {
    let cart = state.cart().clear_cart(&user.id).await?;
    Ok(Json(CartResponse { cart }))
}
