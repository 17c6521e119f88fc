//! Account domain types: users, their cart and wishlist.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, Price, Product, ProductId, UserId};

/// A storefront account.
///
/// Passwords are mock credentials kept in plaintext and compared directly;
/// they are never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub email: Email,
    #[serde(skip)]
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<Product>,
}

impl User {
    /// Build a fresh account with an empty cart and wishlist.
    #[must_use]
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(uuid::Uuid::new_v4().to_string()),
            email: new_user.email,
            password: new_user.password,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            is_admin: new_user.is_admin,
            created_at: now,
            updated_at: now,
            cart: Vec::new(),
            wishlist: Vec::new(),
        }
    }

    /// Plaintext password check against the mock credential.
    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password.expose_secret() == candidate
    }

    /// Display name, e.g. "Jane Doe".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the wishlist already holds `product_id`.
    #[must_use]
    pub fn has_wishlisted(&self, product_id: &ProductId) -> bool {
        self.wishlist.iter().any(|p| &p.id == product_id)
    }
}

/// Fields needed to create a [`User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// A cart line: a product snapshot, quantity and chosen color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// A new line with quantity 1.
    #[must_use]
    pub fn new(product: Product, selected_color: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            product,
            qty: 1,
            selected_color,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this line is for `product_id` in `color`.
    ///
    /// A `None` color matches any line of the product.
    #[must_use]
    pub fn is_line(&self, product_id: &ProductId, color: Option<&str>) -> bool {
        &self.product.id == product_id
            && color.is_none_or(|c| {
                self.selected_color
                    .as_deref()
                    .is_some_and(|selected| selected.eq_ignore_ascii_case(c))
            })
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.product.price.times(self.qty)
    }

    /// Undiscounted price of the whole line.
    #[must_use]
    pub fn line_original_price(&self) -> Price {
        self.product.original_price.max(self.product.price).times(self.qty)
    }
}

/// Totals shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub item_count: u32,
    pub total_price: Price,
    pub total_original_price: Price,
    pub savings: Price,
}

impl CartSummary {
    /// Summarize a cart.
    #[must_use]
    pub fn of(cart: &[CartItem]) -> Self {
        let total_price: Price = cart.iter().map(CartItem::line_price).sum();
        let total_original_price: Price = cart.iter().map(CartItem::line_original_price).sum();
        Self {
            item_count: cart.iter().map(|item| item.qty).sum(),
            total_price,
            total_original_price,
            savings: total_original_price.saturating_sub(total_price),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: u64, original: u64) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": format!("Product {id}"),
            "price": price,
            "originalPrice": original,
            "category": "office",
            "company": "marcos",
            "stock": 5
        }))
        .unwrap()
    }

    fn user() -> User {
        User::new(NewUser {
            email: Email::parse("jane@example.com").unwrap(),
            password: SecretString::from("hunter22"),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            is_admin: false,
        })
    }

    #[test]
    fn test_password_never_serialized() {
        let value = serde_json::to_value(user()).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], "jane@example.com");
        assert_eq!(value["firstName"], "Jane");
        assert!(value["cart"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_password_matches_is_exact() {
        let user = user();
        assert!(user.password_matches("hunter22"));
        assert!(!user.password_matches("Hunter22"));
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn test_cart_item_flattens_product() {
        let item = CartItem::new(product("p1", 100, 150), Some("#000".to_string()));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["_id"], "p1");
        assert_eq!(value["qty"], 1);
        assert_eq!(value["selectedColor"], "#000");
    }

    #[test]
    fn test_is_line_color_matching() {
        let item = CartItem::new(product("p1", 100, 150), Some("#000".to_string()));
        let id = ProductId::new("p1");
        assert!(item.is_line(&id, None));
        assert!(item.is_line(&id, Some("#000")));
        assert!(!item.is_line(&id, Some("#fff")));
        assert!(!item.is_line(&ProductId::new("p2"), None));
    }

    #[test]
    fn test_cart_summary() {
        let mut a = CartItem::new(product("p1", 100, 150), None);
        a.qty = 2;
        let b = CartItem::new(product("p2", 40, 40), None);
        let summary = CartSummary::of(&[a, b]);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_price, Price::whole(240));
        assert_eq!(summary.total_original_price, Price::whole(340));
        assert_eq!(summary.savings, Price::whole(100));
    }
}
