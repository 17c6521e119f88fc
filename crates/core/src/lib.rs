//! Bazaar Core - Shared types library.
//!
//! This crate provides the types shared by every Bazaar component:
//! - `storefront` - JSON storefront API over the in-memory catalog
//! - `cli` - Catalog inspection tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no store
//! access, no HTTP. The filter engine and services live in the storefront
//! crate and build on these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, categories, sorting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
