//! Domain models for the storefront.
//!
//! Catalog records ([`Product`](bazaar_core::Product),
//! [`Category`](bazaar_core::Category)) live in `bazaar-core`; this module
//! holds the account-side types.

pub mod user;

pub use user::{CartItem, CartSummary, NewUser, User};
