//! Wishlist handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{Product, ProductId};

use super::ApiJson;
use super::cart::ProductRef;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Add to wishlist request.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub product: ProductRef,
}

/// Wishlist contents.
#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub wishlist: Vec<Product>,
}

pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<WishlistResponse>> {
    let wishlist = state.cart().wishlist(&user.id).await?;
    Ok(Json(WishlistResponse { wishlist }))
}

#[instrument(skip_all, fields(user_id = %user.id, product_id = %request.product.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(request): ApiJson<AddToWishlistRequest>,
) -> Result<(StatusCode, Json<WishlistResponse>)> {
    let wishlist = state
        .cart()
        .add_to_wishlist(&user.id, &request.product.id)
        .await?;
    Ok((StatusCode::CREATED, Json(WishlistResponse { wishlist })))
}

#[instrument(skip_all, fields(user_id = %user.id, %product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<String>,
) -> Result<Json<WishlistResponse>> {
    let wishlist = state
        .cart()
        .remove_from_wishlist(&user.id, &ProductId::new(product_id))
        .await?;
    Ok(Json(WishlistResponse { wishlist }))
}

pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<WishlistResponse>> {
    let wishlist = state.cart().clear_wishlist(&user.id).await?;
    Ok(Json(WishlistResponse { wishlist }))
}
