//! Cart lifecycle and item merge rules

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::views::cart_views;
use crate::application::crud::ensure_exists;
use crate::domain::commerce::{CartResponse, CartSummary};
use crate::infrastructure::database::entities::{cart, cart_item, product, user};
use crate::shared::{DomainError, DomainResult};

/// The user's canonical cart, active or not
pub(crate) async fn find_cart<C: ConnectionTrait>(db: &C, user_id: i32) -> DomainResult<Option<cart::Model>> {
    Ok(cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .order_by_asc(cart::Column::Id)
        .one(db)
        .await?)
}

/// Finds the user's cart, reactivating it when inactive, or creates one
async fn resolve_cart<C: ConnectionTrait>(db: &C, user_id: i32) -> DomainResult<cart::Model> {
    match find_cart(db, user_id).await? {
        Some(existing) if existing.is_active => Ok(existing),
        Some(existing) => {
            let mut entity = existing.into_active_model();
            entity.is_active = Set(true);
            entity.updated_at = Set(Some(Utc::now()));
            let cart = entity.update(db).await?;
            debug!(user_id, cart_id = cart.id, "Cart reactivated");
            Ok(cart)
        }
        None => {
            ensure_exists::<user::Entity, _>(db, "User", user_id).await?;
            let cart = cart::ActiveModel {
                user_id: Set(user_id),
                is_active: Set(true),
                created_at: Set(Utc::now()),
                updated_at: Set(None),
                expires_at: Set(None),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(user_id, cart_id = cart.id, "Cart created");
            Ok(cart)
        }
    }
}

async fn touch<C: ConnectionTrait>(db: &C, cart: cart::Model) -> DomainResult<cart::Model> {
    let mut entity = cart.into_active_model();
    entity.updated_at = Set(Some(Utc::now()));
    Ok(entity.update(db).await?)
}

/// Service for the per-user shopping cart
pub struct CartService {
    db: DatabaseConnection,
}

impl CartService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn view(&self, cart: cart::Model) -> DomainResult<CartResponse> {
        cart_views(&self.db, vec![cart])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Storage("Cart view mapping returned nothing".to_string()))
    }

    async fn require_cart<C: ConnectionTrait>(&self, db: &C, user_id: i32) -> DomainResult<cart::Model> {
        find_cart(db, user_id)
            .await?
            .ok_or_else(|| DomainError::DomainRule(format!("No cart found for user {}.", user_id)))
    }

    async fn require_line<C: ConnectionTrait>(
        &self,
        db: &C,
        cart_id: i32,
        product_id: i32,
    ) -> DomainResult<cart_item::Model> {
        cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                DomainError::DomainRule(format!("Product {} is not in the cart.", product_id))
            })
    }

    /// Returns the user's cart, reactivating or creating it as needed
    pub async fn get_or_create(&self, user_id: i32) -> DomainResult<CartResponse> {
        let txn = self.db.begin().await?;
        let cart = resolve_cart(&txn, user_id).await?;
        txn.commit().await?;
        self.view(cart).await
    }

    /// Adds `quantity` of a product, merging into an existing line
    pub async fn add_item(&self, user_id: i32, product_id: i32, quantity: i32) -> DomainResult<CartResponse> {
        if quantity < 1 {
            return Err(DomainError::Validation("Quantity must be at least 1".to_string()));
        }

        let txn = self.db.begin().await?;
        let cart = resolve_cart(&txn, user_id).await?;
        ensure_exists::<product::Entity, _>(&txn, "Product", product_id).await?;

        let existing = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        let now = Utc::now();
        match existing {
            Some(line) => {
                let merged = line.quantity + quantity;
                let mut entity = line.into_active_model();
                entity.quantity = Set(merged);
                entity.updated_at = Set(Some(now));
                entity.update(&txn).await?;
            }
            None => {
                cart_item::ActiveModel {
                    cart_id: Set(cart.id),
                    product_id: Set(product_id),
                    quantity: Set(quantity),
                    created_at: Set(now),
                    updated_at: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }
        let cart = touch(&txn, cart).await?;
        txn.commit().await?;

        debug!(user_id, product_id, quantity, "Item added to cart");
        self.view(cart).await
    }

    /// Sets a line's quantity; zero or less removes the line
    pub async fn update_item_quantity(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> DomainResult<CartResponse> {
        let txn = self.db.begin().await?;
        let cart = self.require_cart(&txn, user_id).await?;
        let line = self.require_line(&txn, cart.id, product_id).await?;

        if quantity <= 0 {
            cart_item::Entity::delete_by_id(line.id).exec(&txn).await?;
        } else {
            let mut entity = line.into_active_model();
            entity.quantity = Set(quantity);
            entity.updated_at = Set(Some(Utc::now()));
            entity.update(&txn).await?;
        }
        let cart = touch(&txn, cart).await?;
        txn.commit().await?;

        self.view(cart).await
    }

    pub async fn remove_item(&self, user_id: i32, product_id: i32) -> DomainResult<CartResponse> {
        let txn = self.db.begin().await?;
        let cart = self.require_cart(&txn, user_id).await?;
        let line = self.require_line(&txn, cart.id, product_id).await?;

        cart_item::Entity::delete_by_id(line.id).exec(&txn).await?;
        let cart = touch(&txn, cart).await?;
        txn.commit().await?;

        debug!(user_id, product_id, "Item removed from cart");
        self.view(cart).await
    }

    /// Drops every line and leaves the cart active
    pub async fn clear_cart(&self, user_id: i32) -> DomainResult<CartResponse> {
        let txn = self.db.begin().await?;
        let cart = self.require_cart(&txn, user_id).await?;

        let removed = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;

        let mut entity = cart.into_active_model();
        entity.is_active = Set(true);
        entity.updated_at = Set(Some(Utc::now()));
        let cart = entity.update(&txn).await?;
        txn.commit().await?;

        info!(user_id, lines = removed.rows_affected, "Cart cleared");
        self.view(cart).await
    }

    /// Deactivates the cart when it belongs to the user; false otherwise
    pub async fn deactivate_cart(&self, cart_id: i32, user_id: i32) -> DomainResult<bool> {
        let Some(cart) = cart::Entity::find_by_id(cart_id)
            .filter(cart::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut entity = cart.into_active_model();
        entity.is_active = Set(false);
        entity.updated_at = Set(Some(Utc::now()));
        entity.update(&self.db).await?;

        info!(user_id, cart_id, "Cart deactivated");
        Ok(true)
    }

    pub async fn list_carts_for_user(&self, user_id: i32) -> DomainResult<Vec<CartResponse>> {
        let carts = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .order_by_asc(cart::Column::Id)
            .all(&self.db)
            .await?;
        cart_views(&self.db, carts).await
    }

    /// Item count and amount at current prices; zeros when the user has no cart
    pub async fn summary(&self, user_id: i32) -> DomainResult<CartSummary> {
        let Some(cart) = find_cart(&self.db, user_id).await? else {
            return Ok(CartSummary {
                user_id,
                cart_id: None,
                total_items: 0,
                total_amount: Default::default(),
            });
        };

        let view = self.view(cart).await?;
        Ok(CartSummary {
            user_id,
            cart_id: Some(view.id),
            total_items: view.total_items,
            total_amount: view.total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::test_utils::{create_product, create_user, test_db};

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let service = CartService::new(db);

        let first = service.get_or_create(user.id).await.unwrap();
        let second = service.get_or_create(user.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.is_active);
        assert_eq!(service.list_carts_for_user(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_gets_no_cart() {
        let service = CartService::new(test_db().await);
        let err = service.get_or_create(404).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn adding_same_product_merges_lines() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let service = CartService::new(db);

        service.add_item(user.id, gel.id, 1).await.unwrap();
        let cart = service.add_item(user.id, gel.id, 2).await.unwrap();

        assert_eq!(cart.cart_items.len(), 1);
        assert_eq!(cart.cart_items[0].quantity, 3);
        assert!(cart.cart_items[0].updated_at.is_some());
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_amount, Decimal::from(30));
    }

    #[tokio::test]
    async fn add_item_checks_quantity_and_product() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let service = CartService::new(db);

        let err = service.add_item(user.id, 1, 0).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service.add_item(user.id, 999, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Product", .. }));
    }

    #[tokio::test]
    async fn zero_quantity_removes_line() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let wax = create_product(&db, "Wax", Decimal::from(12)).await;
        let service = CartService::new(db);

        service.add_item(user.id, gel.id, 1).await.unwrap();
        service.add_item(user.id, wax.id, 1).await.unwrap();

        let cart = service.update_item_quantity(user.id, gel.id, 5).await.unwrap();
        assert_eq!(cart.total_items, 6);

        let cart = service.update_item_quantity(user.id, gel.id, 0).await.unwrap();
        assert_eq!(cart.cart_items.len(), 1);
        assert_eq!(cart.cart_items[0].product_id, wax.id);

        let err = service.update_item_quantity(user.id, gel.id, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));
    }

    #[tokio::test]
    async fn operations_without_cart_are_rule_violations() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let service = CartService::new(db);

        assert!(matches!(
            service.remove_item(user.id, 1).await.unwrap_err(),
            DomainError::DomainRule(_)
        ));
        assert!(matches!(
            service.update_item_quantity(user.id, 1, 2).await.unwrap_err(),
            DomainError::DomainRule(_)
        ));
        assert!(matches!(
            service.clear_cart(user.id).await.unwrap_err(),
            DomainError::DomainRule(_)
        ));
    }

    #[tokio::test]
    async fn clear_reactivates_and_empties() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let service = CartService::new(db);

        let cart = service.add_item(user.id, gel.id, 2).await.unwrap();
        assert!(service.deactivate_cart(cart.id, user.id).await.unwrap());

        let cleared = service.clear_cart(user.id).await.unwrap();
        assert_eq!(cleared.id, cart.id);
        assert!(cleared.is_active);
        assert!(cleared.cart_items.is_empty());
    }

    #[tokio::test]
    async fn deactivate_checks_owner() {
        let db = test_db().await;
        let owner = create_user(&db, "owner").await;
        let other = create_user(&db, "other").await;
        let service = CartService::new(db);

        let cart = service.get_or_create(owner.id).await.unwrap();
        assert!(!service.deactivate_cart(cart.id, other.id).await.unwrap());
        assert!(service.deactivate_cart(cart.id, owner.id).await.unwrap());

        // The same cart comes back on the next lookup
        let again = service.get_or_create(owner.id).await.unwrap();
        assert_eq!(again.id, cart.id);
        assert!(again.is_active);
    }

    #[tokio::test]
    async fn summary_without_cart_is_zero() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::new(250, 2)).await;
        let service = CartService::new(db);

        let empty = service.summary(user.id).await.unwrap();
        assert_eq!(empty.cart_id, None);
        assert_eq!(empty.total_items, 0);
        assert_eq!(empty.total_amount, Decimal::ZERO);

        service.add_item(user.id, gel.id, 4).await.unwrap();
        let summary = service.summary(user.id).await.unwrap();
        assert!(summary.cart_id.is_some());
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.total_amount, Decimal::from(10));
    }
}
