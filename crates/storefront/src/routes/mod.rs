//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//!
//! # Auth (rate limited by the server binary)
//! POST   /api/auth/signup               - Create account, returns token
//! POST   /api/auth/login                - Log in, returns token
//!
//! # Catalog
//! GET    /api/products                  - All products
//! GET    /api/products/search?query=    - Text search (cached)
//! GET    /api/products/listing          - Filtered, sorted, paginated listing
//! GET    /api/products/{product_id}     - Product detail
//! GET    /api/categories                - All categories
//! GET    /api/categories/{category_id}  - Category detail
//!
//! # Cart and wishlist (requires token)
//! GET    /api/user/cart                 - Cart and totals
//! POST   /api/user/cart                 - Add product
//! DELETE /api/user/cart                 - Empty cart
//! POST   /api/user/cart/{product_id}    - Increment / decrement
//! DELETE /api/user/cart/{product_id}    - Remove product
//! GET    /api/user/wishlist             - Wishlist
//! POST   /api/user/wishlist             - Add product
//! DELETE /api/user/wishlist             - Empty wishlist
//! DELETE /api/user/wishlist/{product_id} - Remove product
//!
//! # Admin (requires admin token)
//! POST   /api/admin/products            - Create product
//! PUT    /api/admin/products/{product_id} - Replace product
//! DELETE /api/admin/products/{product_id} - Delete product
//! PATCH  /api/admin/categories/{category_id} - Enable / disable category
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::{get, patch, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/search", get(products::search))
        .route("/listing", get(products::listing))
        .route("/{product_id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{category_id}", get(categories::show))
}

/// Create the signed-in user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(cart::show).post(cart::add).delete(cart::clear),
        )
        .route(
            "/cart/{product_id}",
            post(cart::update).delete(cart::remove),
        )
        .route(
            "/wishlist",
            get(wishlist::show)
                .post(wishlist::add)
                .delete(wishlist::clear),
        )
        .route("/wishlist/{product_id}", axum::routing::delete(wishlist::remove))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route(
            "/products/{product_id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/categories/{category_id}", patch(admin::update_category))
}

/// Create all routes, nesting `auth` under `/api/auth`.
///
/// The server binary passes the auth router wrapped in a rate limiter.
pub fn api_routes(auth: Router<AppState>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth)
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/user", user_routes())
        .nest("/api/admin", admin_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    api_routes(auth_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
