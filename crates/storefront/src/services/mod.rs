//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`auth`] - signup, login and token verification
//! - [`cart`] - cart and wishlist operations
//! - [`catalog`] - cached catalog reads and admin mutations

pub mod auth;
pub mod cart;
pub mod catalog;

pub use auth::{AuthError, AuthService, TokenKeys};
pub use cart::{CartError, CartService, QuantityChange};
pub use catalog::{CatalogError, CatalogService};
