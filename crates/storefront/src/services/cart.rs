//! Cart and wishlist operations.
//!
//! Products are resolved from the catalog by ID and copied onto the account,
//! so a cart line keeps the price it was added at.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use bazaar_core::{Product, ProductId, UserId};

use super::catalog::{CatalogError, CatalogService};
use crate::db::users::UserRepository;
use crate::db::{RepositoryError, Store};
use crate::models::{CartItem, CartSummary, User};

/// Errors from cart and wishlist operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error("product {0} is not in the wishlist")]
    NotInWishlist(ProductId),

    #[error("product {0} is already in the wishlist")]
    AlreadyWishlisted(ProductId),

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("only {stock} of {name} in stock")]
    ExceedsStock { name: String, stock: u32 },

    #[error("quantity cannot go below 1")]
    BelowMinimum,

    #[error("{name} is not available in color {color}")]
    UnknownColor { name: String, color: String },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<CatalogError> for CartError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::ProductNotFound(id) => Self::ProductNotFound(id),
            CatalogError::Repository(e) => Self::Repository(e),
            other => Self::Repository(RepositoryError::DataCorruption(other.to_string())),
        }
    }
}

/// Direction of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityChange {
    Increment,
    Decrement,
}

/// Cart and wishlist service for one request.
pub struct CartService<'a> {
    users: UserRepository<'a>,
    catalog: &'a CatalogService,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a Store, catalog: &'a CatalogService) -> Self {
        Self {
            users: UserRepository::new(store),
            catalog,
        }
    }

    /// The cart and its totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the account doesn't exist.
    pub async fn cart(&self, user_id: &UserId) -> Result<(Vec<CartItem>, CartSummary), CartError> {
        let user = self.user(user_id).await?;
        let summary = CartSummary::of(&user.cart);
        Ok((user.cart, summary))
    }

    /// Add one unit of a product, merging with an existing line of the same
    /// color.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound`, `CartError::UnknownColor`,
    /// `CartError::OutOfStock` or `CartError::ExceedsStock`.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        color: Option<String>,
    ) -> Result<Vec<CartItem>, CartError> {
        let product = self.catalog.product(product_id).await?;
        if let Some(color) = &color
            && !product.has_color(color)
        {
            return Err(CartError::UnknownColor {
                name: product.name,
                color: color.clone(),
            });
        }
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.name));
        }

        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                ensure_room(&user.cart, &product)?;
                let existing = user.cart.iter_mut().find(|line| {
                    line.product.id == product.id
                        && same_color(line.selected_color.as_deref(), color.as_deref())
                });
                match existing {
                    Some(line) => {
                        line.qty += 1;
                        line.updated_at = Utc::now();
                    }
                    None => user.cart.push(CartItem::new(product.clone(), color.clone())),
                }
                Ok(())
            })
            .await?;
        Ok(user.cart)
    }

    /// Increment or decrement a cart line.
    ///
    /// Without a color, the first line for the product is changed. Increments
    /// are checked against the catalog's current stock, not the snapshot
    /// stored on the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart`, `CartError::ProductNotFound`,
    /// `CartError::ExceedsStock` or `CartError::BelowMinimum`.
    #[instrument(skip(self))]
    pub async fn change_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        change: QuantityChange,
        color: Option<String>,
    ) -> Result<Vec<CartItem>, CartError> {
        let current = match change {
            QuantityChange::Increment => Some(self.catalog.product(product_id).await?),
            QuantityChange::Decrement => None,
        };

        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                let index = user
                    .cart
                    .iter()
                    .position(|line| line.is_line(product_id, color.as_deref()))
                    .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
                if let Some(product) = &current {
                    ensure_room(&user.cart, product)?;
                }
                let line = user
                    .cart
                    .get_mut(index)
                    .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
                match change {
                    QuantityChange::Increment => line.qty += 1,
                    QuantityChange::Decrement if line.qty <= 1 => {
                        return Err(CartError::BelowMinimum);
                    }
                    QuantityChange::Decrement => line.qty -= 1,
                }
                line.updated_at = Utc::now();
                Ok(())
            })
            .await?;
        Ok(user.cart)
    }

    /// Remove every line of a product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product isn't in the cart.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<CartItem>, CartError> {
        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                let before = user.cart.len();
                user.cart.retain(|line| &line.product.id != product_id);
                if user.cart.len() == before {
                    return Err(CartError::NotInCart(product_id.clone()));
                }
                Ok(())
            })
            .await?;
        Ok(user.cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the account doesn't exist.
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<Vec<CartItem>, CartError> {
        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                user.cart.clear();
                Ok(())
            })
            .await?;
        Ok(user.cart)
    }

    /// The wishlist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the account doesn't exist.
    pub async fn wishlist(&self, user_id: &UserId) -> Result<Vec<Product>, CartError> {
        Ok(self.user(user_id).await?.wishlist)
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` or `CartError::AlreadyWishlisted`.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<Product>, CartError> {
        let product = self.catalog.product(product_id).await?;
        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                if user.has_wishlisted(&product.id) {
                    return Err(CartError::AlreadyWishlisted(product.id.clone()));
                }
                user.wishlist.push(product);
                Ok(())
            })
            .await?;
        Ok(user.wishlist)
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInWishlist` if it isn't there.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Vec<Product>, CartError> {
        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                if !user.has_wishlisted(product_id) {
                    return Err(CartError::NotInWishlist(product_id.clone()));
                }
                user.wishlist.retain(|p| &p.id != product_id);
                Ok(())
            })
            .await?;
        Ok(user.wishlist)
    }

    /// Empty the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the account doesn't exist.
    pub async fn clear_wishlist(&self, user_id: &UserId) -> Result<Vec<Product>, CartError> {
        let (user, ()) = self
            .users
            .update(user_id, |user: &mut User| -> Result<(), CartError> {
                user.wishlist.clear();
                Ok(())
            })
            .await?;
        Ok(user.wishlist)
    }

    async fn user(&self, user_id: &UserId) -> Result<User, CartError> {
        self.users
            .get_by_id(user_id)
            .await
            .ok_or_else(|| RepositoryError::NotFound(format!("user {user_id}")).into())
    }
}

/// One more unit of `product` must fit in its stock across all colors.
fn ensure_room(cart: &[CartItem], product: &Product) -> Result<(), CartError> {
    let in_cart: u32 = cart
        .iter()
        .filter(|line| line.product.id == product.id)
        .map(|line| line.qty)
        .sum();
    if in_cart >= product.stock {
        return Err(CartError::ExceedsStock {
            name: product.name.clone(),
            stock: product.stock,
        });
    }
    Ok(())
}

fn same_color(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bazaar_core::Email;
    use secrecy::SecretString;

    use super::*;
    use crate::config::CacheConfig;
    use crate::db::SeedCatalog;
    use crate::models::NewUser;

    const ACCRA: &str = "recmg2a1ctaEJNZhu";
    const SOFA: &str = "recrfxv3EwpvJwvjq";
    const SUEDE: &str = "recvKMNR3YFw0bEt4";

    struct Fixture {
        store: Arc<Store>,
        catalog: CatalogService,
        user: UserId,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = Arc::new(Store::new(SeedCatalog::embedded().unwrap()));
            let catalog = CatalogService::new(Arc::clone(&store), &CacheConfig::default());
            let user = store
                .users()
                .create(NewUser {
                    email: Email::parse("cart@example.com").unwrap(),
                    password: SecretString::from("secret1"),
                    first_name: "Cart".to_string(),
                    last_name: "Tester".to_string(),
                    is_admin: false,
                })
                .await
                .unwrap()
                .id;
            Self {
                store,
                catalog,
                user,
            }
        }

        fn service(&self) -> CartService<'_> {
            CartService::new(&self.store, &self.catalog)
        }
    }

    #[tokio::test]
    async fn test_add_merges_same_color() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        let id = ProductId::new(ACCRA);

        cart.add_to_cart(&fx.user, &id, Some("#ff0000".into())).await.unwrap();
        cart.add_to_cart(&fx.user, &id, Some("#FF0000".into())).await.unwrap();
        let lines = cart.add_to_cart(&fx.user, &id, Some("#00ff00".into())).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].qty, 2);

        let (_, summary) = cart.cart(&fx.user).await.unwrap();
        assert_eq!(summary.item_count, 3);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        assert!(matches!(
            cart.add_to_cart(&fx.user, &ProductId::new("nope"), None).await,
            Err(CartError::ProductNotFound(_))
        ));
        assert!(matches!(
            cart.add_to_cart(&fx.user, &ProductId::new(ACCRA), Some("#123456".into()))
                .await,
            Err(CartError::UnknownColor { .. })
        ));
        assert!(matches!(
            cart.add_to_cart(&fx.user, &ProductId::new(SUEDE), None).await,
            Err(CartError::OutOfStock(_))
        ));
    }

    #[tokio::test]
    async fn test_quantity_bounded_by_stock() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        let sofa = ProductId::new(SOFA);

        // Stock is 3.
        cart.add_to_cart(&fx.user, &sofa, None).await.unwrap();
        cart.change_quantity(&fx.user, &sofa, QuantityChange::Increment, None)
            .await
            .unwrap();
        let lines = cart
            .change_quantity(&fx.user, &sofa, QuantityChange::Increment, None)
            .await
            .unwrap();
        assert_eq!(lines[0].qty, 3);
        assert!(matches!(
            cart.change_quantity(&fx.user, &sofa, QuantityChange::Increment, None)
                .await,
            Err(CartError::ExceedsStock { stock: 3, .. })
        ));
        assert!(matches!(
            cart.add_to_cart(&fx.user, &sofa, None).await,
            Err(CartError::ExceedsStock { .. })
        ));
    }

    #[tokio::test]
    async fn test_increment_uses_current_stock() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        let sofa = ProductId::new(SOFA);
        cart.add_to_cart(&fx.user, &sofa, None).await.unwrap();

        let mut restocked = fx.catalog.product(&sofa).await.unwrap();
        restocked.stock = 1;
        fx.catalog.update_product(&sofa, restocked).await.unwrap();

        assert!(matches!(
            cart.change_quantity(&fx.user, &sofa, QuantityChange::Increment, None)
                .await,
            Err(CartError::ExceedsStock { stock: 1, .. })
        ));
        let (lines, _) = cart.cart(&fx.user).await.unwrap();
        assert_eq!(lines[0].qty, 1);
    }

    #[tokio::test]
    async fn test_decrement_stops_at_one() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        let id = ProductId::new(ACCRA);
        cart.add_to_cart(&fx.user, &id, None).await.unwrap();
        assert!(matches!(
            cart.change_quantity(&fx.user, &id, QuantityChange::Decrement, None)
                .await,
            Err(CartError::BelowMinimum)
        ));
        assert!(matches!(
            cart.change_quantity(&fx.user, &ProductId::new(SOFA), QuantityChange::Decrement, None)
                .await,
            Err(CartError::NotInCart(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        let id = ProductId::new(ACCRA);
        cart.add_to_cart(&fx.user, &id, Some("#ff0000".into())).await.unwrap();
        cart.add_to_cart(&fx.user, &id, Some("#00ff00".into())).await.unwrap();
        cart.add_to_cart(&fx.user, &ProductId::new(SOFA), None).await.unwrap();

        let lines = cart.remove_from_cart(&fx.user, &id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert!(matches!(
            cart.remove_from_cart(&fx.user, &id).await,
            Err(CartError::NotInCart(_))
        ));
        assert!(cart.clear_cart(&fx.user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wishlist() {
        let fx = Fixture::new().await;
        let cart = fx.service();
        let id = ProductId::new(SUEDE);

        // Out of stock products can still be wishlisted.
        assert_eq!(cart.add_to_wishlist(&fx.user, &id).await.unwrap().len(), 1);
        assert!(matches!(
            cart.add_to_wishlist(&fx.user, &id).await,
            Err(CartError::AlreadyWishlisted(_))
        ));
        assert!(cart.remove_from_wishlist(&fx.user, &id).await.unwrap().is_empty());
        assert!(matches!(
            cart.remove_from_wishlist(&fx.user, &id).await,
            Err(CartError::NotInWishlist(_))
        ));

        cart.add_to_wishlist(&fx.user, &ProductId::new(ACCRA)).await.unwrap();
        assert!(cart.clear_wishlist(&fx.user).await.unwrap().is_empty());
        assert!(cart.wishlist(&fx.user).await.unwrap().is_empty());
    }
}
