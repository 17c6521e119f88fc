//! Catalog product record.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Stock available in one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStock {
    /// CSS color code, e.g. `#ff0000`.
    pub color: String,
    /// Units available in this color.
    pub color_quantity: u32,
}

/// A product as served by the catalog API.
///
/// Field names follow the storefront JSON format (`_id`, camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub original_price: Price,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub company: String,
    #[serde(default)]
    pub colors: Vec<ColorStock>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub is_shipping_available: bool,
    pub stock: u32,
    #[serde(default)]
    pub review_count: u32,
    /// Average rating, 0 to 5. Zero means "not rated".
    #[serde(default)]
    pub stars: u8,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub can_use_coupons: bool,
}

impl Product {
    /// Whole-percent discount of `price` against `original_price`.
    ///
    /// Returns 0 when there is no original price or no markdown.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        let original = self.original_price.amount();
        let current = self.price.amount();
        if original.is_zero() || current >= original {
            return 0;
        }
        ((original - current) * Decimal::ONE_HUNDRED / original)
            .floor()
            .to_u32()
            .unwrap_or(0)
    }

    /// Whether the product has a color with the given code.
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors
            .iter()
            .any(|c| c.color.eq_ignore_ascii_case(color))
    }

    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
