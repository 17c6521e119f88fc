//! Rate limiting for the signup and login endpoints, using governor and
//! `tower_governor`.
//!
//! Clients are keyed by the IP reported by a fronting proxy, or by the peer
//! address when the server is reached directly. The peer address is only known
//! when the router is served with `into_make_service_with_connect_info`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

/// Proxy headers carrying the client IP, most specific first.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "fly-client-ip"];

/// Key extractor reading the client IP from proxy headers.
///
/// `X-Forwarded-For` is consulted first (leftmost entry), then the
/// single-value headers in [`CLIENT_IP_HEADERS`], then the peer address.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next());

        forwarded
            .into_iter()
            .chain(
                CLIENT_IP_HEADERS
                    .iter()
                    .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok())),
            )
            .find_map(|s| s.trim().parse::<IpAddr>().ok())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
///
/// Uses `ProxyIpKeyExtractor` to get the real client IP.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// Rejections use the API error envelope (see [`rejection_response`]).
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(rejection_response)
}

/// Render a limiter rejection as an [`AppError`] response.
///
/// Rate limit headers from governor are kept on the 429.
fn rejection_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::warn!(wait_time, "auth rate limit exceeded");
            let mut response = AppError::RateLimited.into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("no client address for rate limiting".to_string()).into_response()
        }
        GovernorError::Other { msg, .. } => AppError::Internal(
            msg.unwrap_or_else(|| "rate limiter failure".to_string()),
        )
        .into_response(),
    }
}
