//! Integration tests for the Bazaar storefront API.
//!
//! The tests drive the full router in-process with `tower::ServiceExt::oneshot`,
//! so no server, port or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Signup and login
//! - `catalog` - Products, search, listing and categories
//! - `cart` - Cart and wishlist
//! - `admin` - Catalog mutations and their effect on the listing
//! - `rate_limit` - The auth rate limiter mounted by the server binary

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db::SeedCatalog;
use bazaar_storefront::state::AppState;

/// Signing secret for test tokens.
const TEST_SECRET: &str = "k7Qz!v2Rw9#Lp4Xm8Tn3@Fy6Hd1Jb5Gc0S";

/// Admin credentials seeded into every test store.
pub const ADMIN_EMAIL: &str = "admin@bazaar.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Guest credentials from the default account settings.
pub const GUEST_EMAIL: &str = "guest@bazaar.local";
pub const GUEST_PASSWORD: &str = "guest1234";

/// A freshly seeded storefront behind its router.
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

impl TestContext {
    /// Build a storefront over the embedded seed catalog.
    ///
    /// # Panics
    ///
    /// Panics if the seed catalog or the seeded accounts fail to load.
    pub async fn new() -> Self {
        Self::build(bazaar_storefront::routes::routes()).await
    }

    /// Like [`TestContext::new`], with the server binary's auth rate limiter.
    pub async fn with_auth_rate_limit() -> Self {
        let auth = bazaar_storefront::routes::auth_routes()
            .layer(bazaar_storefront::middleware::auth_rate_limiter());
        Self::build(bazaar_storefront::routes::api_routes(auth)).await
    }

    async fn build(routes: Router<AppState>) -> Self {
        let mut config = StorefrontConfig::with_secret(TEST_SECRET);
        config.accounts.admin_email = ADMIN_EMAIL.to_string();
        config.accounts.admin_password = Some(SecretString::from(ADMIN_PASSWORD));

        let seed = SeedCatalog::embedded().expect("Failed to load seed catalog");
        let state = AppState::new(config, seed)
            .await
            .expect("Failed to build app state");
        let app = bazaar_storefront::build_router(routes, state.clone());
        Self { app, state }
    }

    /// Send a request and decode the JSON response.
    ///
    /// Non-JSON bodies (such as the health check) come back as a JSON string.
    ///
    /// # Panics
    ///
    /// Panics if the request can't be built or the body can't be read.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("Failed to build request"))
            .await
    }

    /// Send a prepared request and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the body can't be read.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// `GET` without a token.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    /// Create an account and return its token.
    ///
    /// # Panics
    ///
    /// Panics if signup doesn't succeed.
    pub async fn signup(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "email": email,
                    "password": "secret-pass",
                    "firstName": "Test",
                    "lastName": "Shopper",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        token_of(&body)
    }

    /// Log in and return the token.
    ///
    /// # Panics
    ///
    /// Panics if login doesn't succeed.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        token_of(&body)
    }

    /// Log in as the seeded admin.
    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}

fn token_of(body: &Value) -> String {
    body["encodedToken"]
        .as_str()
        .expect("response carries encodedToken")
        .to_string()
}

/// Product names in a `{"products": [...]}` response, in order.
#[must_use]
pub fn product_names(body: &Value) -> Vec<String> {
    body["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(|p| p["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

/// First error message of an error envelope.
#[must_use]
pub fn first_error(body: &Value) -> &str {
    body["errors"][0].as_str().unwrap_or_default()
}
