//! Denormalised cart and order responses

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::application::crud::load_map;
use crate::domain::commerce::{CartItemResponse, CartResponse, OrderItemResponse, OrderResponse};
use crate::infrastructure::database::entities::{cart, cart_item, order, order_item, product, user};
use crate::shared::DomainResult;

async fn user_names<C: ConnectionTrait>(db: &C, ids: Vec<i32>) -> DomainResult<HashMap<i32, String>> {
    let users = load_map::<user::Entity, _>(db, user::Column::Id, ids, |u| u.id).await?;
    Ok(users.into_iter().map(|(id, u)| (id, u.full_name())).collect())
}

pub async fn cart_item_views<C: ConnectionTrait>(
    db: &C,
    items: Vec<cart_item::Model>,
) -> DomainResult<Vec<CartItemResponse>> {
    let products = load_map::<product::Entity, _>(
        db,
        product::Column::Id,
        items.iter().map(|i| i.product_id).collect(),
        |p| p.id,
    )
    .await?;

    Ok(items
        .into_iter()
        .map(|i| {
            let product = products.get(&i.product_id);
            let price = product.map(|p| p.price).unwrap_or_default();
            CartItemResponse {
                product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
                product_price: price,
                product_picture: product.and_then(|p| p.picture.clone()),
                total_price: price * Decimal::from(i.quantity),
                id: i.id,
                quantity: i.quantity,
                created_at: i.created_at,
                updated_at: i.updated_at,
                cart_id: i.cart_id,
                product_id: i.product_id,
            }
        })
        .collect())
}

/// Carts with their lines priced at the current catalog price
pub async fn cart_views<C: ConnectionTrait>(
    db: &C,
    carts: Vec<cart::Model>,
) -> DomainResult<Vec<CartResponse>> {
    let cart_ids: Vec<i32> = carts.iter().map(|c| c.id).collect();
    let items = if cart_ids.is_empty() {
        Vec::new()
    } else {
        cart_item::Entity::find()
            .filter(cart_item::Column::CartId.is_in(cart_ids))
            .order_by_asc(cart_item::Column::Id)
            .all(db)
            .await?
    };
    let mut lines: HashMap<i32, Vec<CartItemResponse>> = HashMap::new();
    for line in cart_item_views(db, items).await? {
        lines.entry(line.cart_id).or_default().push(line);
    }
    let names = user_names(db, carts.iter().map(|c| c.user_id).collect()).await?;

    Ok(carts
        .into_iter()
        .map(|c| {
            CartResponse {
                cart_items: lines.remove(&c.id).unwrap_or_default(),
                user_full_name: names.get(&c.user_id).cloned().unwrap_or_default(),
                id: c.id,
                created_at: c.created_at,
                updated_at: c.updated_at,
                expires_at: c.expires_at,
                is_active: c.is_active,
                user_id: c.user_id,
                total_items: 0,
                total_amount: Decimal::ZERO,
            }
            .with_totals()
        })
        .collect())
}

pub async fn order_item_views<C: ConnectionTrait>(
    db: &C,
    items: Vec<order_item::Model>,
) -> DomainResult<Vec<OrderItemResponse>> {
    let products = load_map::<product::Entity, _>(
        db,
        product::Column::Id,
        items.iter().map(|i| i.product_id).collect(),
        |p| p.id,
    )
    .await?;

    Ok(items
        .into_iter()
        .map(|i| OrderItemResponse {
            product_name: products
                .get(&i.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            id: i.id,
            order_id: i.order_id,
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
            total_price: i.total_price,
            created_at: i.created_at,
        })
        .collect())
}

pub async fn order_views<C: ConnectionTrait>(
    db: &C,
    orders: Vec<order::Model>,
) -> DomainResult<Vec<OrderResponse>> {
    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let items = if order_ids.is_empty() {
        Vec::new()
    } else {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?
    };
    let mut lines: HashMap<i32, Vec<OrderItemResponse>> = HashMap::new();
    for line in order_item_views(db, items).await? {
        lines.entry(line.order_id).or_default().push(line);
    }
    let names = user_names(db, orders.iter().map(|o| o.user_id).collect()).await?;

    Ok(orders
        .into_iter()
        .map(|o| {
            let order_items = lines.remove(&o.id).unwrap_or_default();
            OrderResponse {
                total_items: order_items.len(),
                order_items,
                user_full_name: names.get(&o.user_id).cloned().unwrap_or_default(),
                id: o.id,
                order_number: o.order_number,
                total_amount: o.total_amount,
                created_at: o.created_at,
                is_active: o.is_active,
                user_id: o.user_id,
            }
        })
        .collect())
}
