//! The auth rate limiter as the server binary mounts it.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
};
use serde_json::json;

use bazaar_integration_tests::{GUEST_EMAIL, GUEST_PASSWORD, TestContext, first_error};

/// Burst allowed before the limiter starts rejecting.
const BURST: usize = 5;

/// A guest login as it arrives from a client connected at `peer`.
fn guest_login(peer: SocketAddr, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(ConnectInfo(peer));
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    let body = json!({ "email": GUEST_EMAIL, "password": GUEST_PASSWORD });
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn peer(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[tokio::test]
async fn test_direct_login_is_keyed_by_peer_address() {
    let ctx = TestContext::with_auth_rate_limit().await;

    let (status, body) = ctx.send(guest_login(peer(50_000), None)).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["foundUser"]["email"], GUEST_EMAIL);
}

#[tokio::test]
async fn test_burst_exhaustion_returns_error_envelope() {
    let ctx = TestContext::with_auth_rate_limit().await;

    for _ in 0..BURST {
        let (status, _) = ctx.send(guest_login(peer(50_001), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = ctx.send(guest_login(peer(50_001), None)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(first_error(&body), "Too many requests, please slow down.");

    // Another client behind a proxy still has its own quota.
    let (status, _) = ctx
        .send(guest_login(peer(50_001), Some("203.0.113.9")))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_routes_are_not_limited() {
    let ctx = TestContext::with_auth_rate_limit().await;
    for _ in 0..=BURST {
        let (status, _) = ctx.get("/api/products/listing").await;
        assert_eq!(status, StatusCode::OK);
    }
}
