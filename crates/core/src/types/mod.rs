//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for the storefront domain.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod sort;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError, PriceRange, round_down_friendly, round_up_friendly};
pub use product::{ColorStock, Product};
pub use sort::SortOption;
