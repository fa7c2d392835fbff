//! Checkout: converts the user's cart into an order

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use super::cart::find_cart;
use super::views::order_views;
use crate::application::crud::load_map;
use crate::domain::commerce::{format_order_number, OrderResponse};
use crate::infrastructure::database::entities::{cart_item, order, order_item, product};
use crate::shared::{DomainError, DomainResult};

/// Service for order creation and listing
pub struct OrderService {
    db: DatabaseConnection,
}

impl OrderService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an order from the user's active cart at current product
    /// prices and empties the cart. All writes share one transaction.
    pub async fn create_order_from_cart(&self, user_id: i32) -> DomainResult<OrderResponse> {
        let txn = self.db.begin().await?;

        let cart = find_cart(&txn, user_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| {
                DomainError::DomainRule(format!("No active cart found for user {}.", user_id))
            })?;

        let lines = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .order_by_asc(cart_item::Column::Id)
            .all(&txn)
            .await?;
        if lines.is_empty() {
            return Err(DomainError::DomainRule("Cart is empty.".to_string()));
        }

        let products = load_map::<product::Entity, _>(
            &txn,
            product::Column::Id,
            lines.iter().map(|l| l.product_id).collect(),
            |p| p.id,
        )
        .await?;

        // Price every line before writing anything
        let mut priced = Vec::with_capacity(lines.len());
        for line in &lines {
            let unit_price = products
                .get(&line.product_id)
                .map(|p| p.price)
                .ok_or_else(|| DomainError::not_found("Product", line.product_id))?;
            priced.push((line, unit_price, unit_price * Decimal::from(line.quantity)));
        }
        let total_amount: Decimal = priced.iter().map(|(_, _, total)| *total).sum();

        // Header first; the number needs the generated id
        let now = Utc::now();
        let header = order::ActiveModel {
            order_number: Set(String::new()),
            total_amount: Set(total_amount),
            is_active: Set(true),
            user_id: Set(user_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let order_number = format_order_number(header.id, now);
        let mut entity = header.into_active_model();
        entity.order_number = Set(order_number);
        let order = entity.update(&txn).await?;

        for (line, unit_price, total_price) in priced {
            order_item::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price),
                total_price: Set(total_price),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            user_id,
            order_id = order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            lines = lines.len(),
            "Order created from cart"
        );

        order_views(&self.db, vec![order])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Storage("Order view mapping returned nothing".to_string()))
    }

    /// The user's orders, newest first
    pub async fn list_orders_for_user(&self, user_id: i32) -> DomainResult<Vec<OrderResponse>> {
        let orders = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?;
        order_views(&self.db, orders).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::application::commerce::CartService;
    use crate::test_utils::{create_product, create_user, test_db};

    fn looks_like_order_number(s: &str) -> bool {
        let parts: Vec<&str> = s.split('-').collect();
        parts.len() == 3
            && parts[0] == "ORD"
            && parts[1].len() == 14
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].len() == 3
            && parts[2].chars().all(|c| c.is_ascii_digit())
    }

    #[tokio::test]
    async fn checkout_converts_cart_lines() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let a = create_product(&db, "A", Decimal::from(10)).await;
        let b = create_product(&db, "B", Decimal::from(12)).await;
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db);

        carts.add_item(user.id, a.id, 2).await.unwrap();
        carts.add_item(user.id, b.id, 1).await.unwrap();

        let order = orders.create_order_from_cart(user.id).await.unwrap();
        assert_eq!(order.total_amount, Decimal::from(32));
        assert_eq!(order.total_items, 2);
        assert_eq!(order.order_items.len(), 2);
        assert_eq!(order.order_items[0].unit_price, Decimal::from(10));
        assert_eq!(order.order_items[0].total_price, Decimal::from(20));
        assert!(looks_like_order_number(&order.order_number), "{}", order.order_number);
        assert!(order.order_number.ends_with(&format!("{:03}", order.id)));

        let cart = carts.get_or_create(user.id).await.unwrap();
        assert!(cart.is_active);
        assert!(cart.cart_items.is_empty());
    }

    #[tokio::test]
    async fn empty_or_missing_cart_cannot_check_out() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db);

        let err = orders.create_order_from_cart(user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));

        carts.get_or_create(user.id).await.unwrap();
        let err = orders.create_order_from_cart(user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));
        assert!(orders.list_orders_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_cart_cannot_check_out() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db);

        let cart = carts.add_item(user.id, gel.id, 1).await.unwrap();
        carts.deactivate_cart(cart.id, user.id).await.unwrap();

        let err = orders.create_order_from_cart(user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));
    }

    #[tokio::test]
    async fn orders_listed_newest_first() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db);

        carts.add_item(user.id, gel.id, 1).await.unwrap();
        let first = orders.create_order_from_cart(user.id).await.unwrap();
        carts.add_item(user.id, gel.id, 3).await.unwrap();
        let second = orders.create_order_from_cart(user.id).await.unwrap();

        let listed = orders.list_orders_for_user(user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[0].total_amount, Decimal::from(30));
    }
}
