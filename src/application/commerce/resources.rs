//! Carts, cart items, orders and order items through the generic engine

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, Select, Set,
};

use super::views::{cart_item_views, cart_views, order_item_views, order_views};
use crate::application::crud::{ensure_exists, Resource};
use crate::domain::commerce::{
    format_order_number, CartItemResponse, CartItemSearch, CartItemUpsertRequest, CartResponse,
    CartSearch, CartUpsertRequest, OrderItemResponse, OrderItemSearch, OrderItemUpsertRequest,
    OrderResponse, OrderSearch, OrderUpsertRequest,
};
use crate::infrastructure::database::entities::{cart, cart_item, order, order_item, product, user};
use crate::shared::{DomainError, DomainResult};

// ── Cart ────────────────────────────────────────────────────────

pub struct CartResource;

#[async_trait]
impl Resource for CartResource {
    type Entity = cart::Entity;
    type Model = cart::Model;
    type ActiveModel = cart::ActiveModel;
    type Search = CartSearch;
    type Insert = CartUpsertRequest;
    type Update = CartUpsertRequest;
    type Response = CartResponse;

    const NAME: &'static str = "Cart";

    fn apply_filter(&self, mut query: Select<cart::Entity>, search: &CartSearch) -> Select<cart::Entity> {
        if let Some(user_id) = search.user_id {
            query = query.filter(cart::Column::UserId.eq(user_id));
        }
        if let Some(active) = search.is_active {
            query = query.filter(cart::Column::IsActive.eq(active));
        }
        if let Some(from) = search.created_from {
            query = query.filter(cart::Column::CreatedAt.gte(from));
        }
        if let Some(to) = search.created_to {
            query = query.filter(cart::Column::CreatedAt.lte(to));
        }
        query
    }

    /// Owner's username or email
    fn full_text(&self, token: &str) -> Option<Condition> {
        let owners = Query::select()
            .column(user::Column::Id)
            .from(user::Entity)
            .cond_where(
                Condition::any()
                    .add(user::Column::Username.contains(token))
                    .add(user::Column::Email.contains(token)),
            )
            .to_owned();
        Some(Condition::all().add(cart::Column::UserId.in_subquery(owners)))
    }

    fn new_active_model(&self, request: &CartUpsertRequest) -> cart::ActiveModel {
        cart::ActiveModel {
            user_id: Set(request.user_id),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            expires_at: Set(request.expires_at),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut cart::ActiveModel, request: &CartUpsertRequest) {
        entity.user_id = Set(request.user_id);
        entity.is_active = Set(request.is_active);
        entity.expires_at = Set(request.expires_at);
        entity.updated_at = Set(Some(Utc::now()));
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut cart::ActiveModel,
        request: &CartUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<user::Entity, _>(txn, "User", request.user_id).await?;
        Ok(())
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        _current: &cart::Model,
        _entity: &mut cart::ActiveModel,
        request: &CartUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<user::Entity, _>(txn, "User", request.user_id).await?;
        Ok(())
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<cart::Model>,
    ) -> DomainResult<Vec<CartResponse>> {
        cart_views(db, models).await
    }
}

// ── Cart item ───────────────────────────────────────────────────

pub struct CartItemResource;

impl CartItemResource {
    async fn check_line(
        &self,
        txn: &DatabaseTransaction,
        request: &CartItemUpsertRequest,
        exclude_id: Option<i32>,
    ) -> DomainResult<()> {
        ensure_exists::<cart::Entity, _>(txn, "Cart", request.cart_id).await?;
        ensure_exists::<product::Entity, _>(txn, "Product", request.product_id).await?;

        let mut existing = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(request.cart_id))
            .filter(cart_item::Column::ProductId.eq(request.product_id));
        if let Some(id) = exclude_id {
            existing = existing.filter(cart_item::Column::Id.ne(id));
        }
        if existing.one(txn).await?.is_some() {
            return Err(DomainError::Conflict(
                "This product is already in the cart.".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for CartItemResource {
    type Entity = cart_item::Entity;
    type Model = cart_item::Model;
    type ActiveModel = cart_item::ActiveModel;
    type Search = CartItemSearch;
    type Insert = CartItemUpsertRequest;
    type Update = CartItemUpsertRequest;
    type Response = CartItemResponse;

    const NAME: &'static str = "CartItem";

    fn apply_filter(
        &self,
        mut query: Select<cart_item::Entity>,
        search: &CartItemSearch,
    ) -> Select<cart_item::Entity> {
        if let Some(cart_id) = search.cart_id {
            query = query.filter(cart_item::Column::CartId.eq(cart_id));
        }
        if let Some(product_id) = search.product_id {
            query = query.filter(cart_item::Column::ProductId.eq(product_id));
        }
        if let Some(user_id) = search.user_id {
            query = query.filter(
                cart_item::Column::CartId.in_subquery(
                    Query::select()
                        .column(cart::Column::Id)
                        .from(cart::Entity)
                        .and_where(cart::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(min) = search.min_quantity {
            query = query.filter(cart_item::Column::Quantity.gte(min));
        }
        if let Some(max) = search.max_quantity {
            query = query.filter(cart_item::Column::Quantity.lte(max));
        }
        query
    }

    fn new_active_model(&self, request: &CartItemUpsertRequest) -> cart_item::ActiveModel {
        cart_item::ActiveModel {
            cart_id: Set(request.cart_id),
            product_id: Set(request.product_id),
            quantity: Set(request.quantity),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut cart_item::ActiveModel, request: &CartItemUpsertRequest) {
        entity.cart_id = Set(request.cart_id);
        entity.product_id = Set(request.product_id);
        entity.quantity = Set(request.quantity);
        entity.updated_at = Set(Some(Utc::now()));
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut cart_item::ActiveModel,
        request: &CartItemUpsertRequest,
    ) -> DomainResult<()> {
        self.check_line(txn, request, None).await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &cart_item::Model,
        _entity: &mut cart_item::ActiveModel,
        request: &CartItemUpsertRequest,
    ) -> DomainResult<()> {
        self.check_line(txn, request, Some(current.id)).await
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<cart_item::Model>,
    ) -> DomainResult<Vec<CartItemResponse>> {
        cart_item_views(db, models).await
    }
}

// ── Order ───────────────────────────────────────────────────────

pub struct OrderResource;

#[async_trait]
impl Resource for OrderResource {
    type Entity = order::Entity;
    type Model = order::Model;
    type ActiveModel = order::ActiveModel;
    type Search = OrderSearch;
    type Insert = OrderUpsertRequest;
    type Update = OrderUpsertRequest;
    type Response = OrderResponse;

    const NAME: &'static str = "Order";

    fn apply_filter(&self, mut query: Select<order::Entity>, search: &OrderSearch) -> Select<order::Entity> {
        if let Some(user_id) = search.user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        if let Some(name) = search.user_full_name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(
                order::Column::UserId.in_subquery(
                    Query::select()
                        .column(user::Column::Id)
                        .from(user::Entity)
                        .cond_where(
                            Condition::any()
                                .add(user::Column::FirstName.contains(name))
                                .add(user::Column::LastName.contains(name)),
                        )
                        .to_owned(),
                ),
            );
        }
        if let Some(min) = search.min_total_amount {
            query = query.filter(order::Column::TotalAmount.gte(min));
        }
        if let Some(max) = search.max_total_amount {
            query = query.filter(order::Column::TotalAmount.lte(max));
        }
        if let Some(from) = search.created_from {
            query = query.filter(order::Column::CreatedAt.gte(from));
        }
        if let Some(to) = search.created_to {
            query = query.filter(order::Column::CreatedAt.lte(to));
        }
        if let Some(active) = search.is_active {
            query = query.filter(order::Column::IsActive.eq(active));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(Condition::all().add(order::Column::OrderNumber.contains(token)))
    }

    fn new_active_model(&self, request: &OrderUpsertRequest) -> order::ActiveModel {
        order::ActiveModel {
            order_number: Set(String::new()),
            total_amount: Set(request.total_amount),
            is_active: Set(request.is_active),
            user_id: Set(request.user_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut order::ActiveModel, request: &OrderUpsertRequest) {
        entity.total_amount = Set(request.total_amount);
        entity.is_active = Set(request.is_active);
        entity.user_id = Set(request.user_id);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut order::ActiveModel,
        request: &OrderUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<user::Entity, _>(txn, "User", request.user_id).await?;
        Ok(())
    }

    async fn after_insert(
        &self,
        txn: &DatabaseTransaction,
        model: order::Model,
        _request: &OrderUpsertRequest,
    ) -> DomainResult<order::Model> {
        let order_number = format_order_number(model.id, model.created_at);
        let mut entity = model.into_active_model();
        entity.order_number = Set(order_number);
        Ok(entity.update(txn).await?)
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        _current: &order::Model,
        _entity: &mut order::ActiveModel,
        request: &OrderUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<user::Entity, _>(txn, "User", request.user_id).await?;
        Ok(())
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<order::Model>,
    ) -> DomainResult<Vec<OrderResponse>> {
        order_views(db, models).await
    }
}

// ── Order item ──────────────────────────────────────────────────

pub struct OrderItemResource;

impl OrderItemResource {
    async fn check_refs(&self, txn: &DatabaseTransaction, request: &OrderItemUpsertRequest) -> DomainResult<()> {
        ensure_exists::<order::Entity, _>(txn, "Order", request.order_id).await?;
        ensure_exists::<product::Entity, _>(txn, "Product", request.product_id).await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for OrderItemResource {
    type Entity = order_item::Entity;
    type Model = order_item::Model;
    type ActiveModel = order_item::ActiveModel;
    type Search = OrderItemSearch;
    type Insert = OrderItemUpsertRequest;
    type Update = OrderItemUpsertRequest;
    type Response = OrderItemResponse;

    const NAME: &'static str = "OrderItem";

    fn apply_filter(
        &self,
        mut query: Select<order_item::Entity>,
        search: &OrderItemSearch,
    ) -> Select<order_item::Entity> {
        if let Some(order_id) = search.order_id {
            query = query.filter(order_item::Column::OrderId.eq(order_id));
        }
        if let Some(product_id) = search.product_id {
            query = query.filter(order_item::Column::ProductId.eq(product_id));
        }
        if let Some(user_id) = search.user_id {
            query = query.filter(
                order_item::Column::OrderId.in_subquery(
                    Query::select()
                        .column(order::Column::Id)
                        .from(order::Entity)
                        .and_where(order::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(min) = search.min_quantity {
            query = query.filter(order_item::Column::Quantity.gte(min));
        }
        if let Some(max) = search.max_quantity {
            query = query.filter(order_item::Column::Quantity.lte(max));
        }
        if let Some(min) = search.min_unit_price {
            query = query.filter(order_item::Column::UnitPrice.gte(min));
        }
        if let Some(max) = search.max_unit_price {
            query = query.filter(order_item::Column::UnitPrice.lte(max));
        }
        query
    }

    fn new_active_model(&self, request: &OrderItemUpsertRequest) -> order_item::ActiveModel {
        order_item::ActiveModel {
            order_id: Set(request.order_id),
            product_id: Set(request.product_id),
            quantity: Set(request.quantity),
            unit_price: Set(request.unit_price),
            total_price: Set(request.total_price()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut order_item::ActiveModel, request: &OrderItemUpsertRequest) {
        entity.order_id = Set(request.order_id);
        entity.product_id = Set(request.product_id);
        entity.quantity = Set(request.quantity);
        entity.unit_price = Set(request.unit_price);
        entity.total_price = Set(request.total_price());
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut order_item::ActiveModel,
        request: &OrderItemUpsertRequest,
    ) -> DomainResult<()> {
        self.check_refs(txn, request).await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        _current: &order_item::Model,
        _entity: &mut order_item::ActiveModel,
        request: &OrderItemUpsertRequest,
    ) -> DomainResult<()> {
        self.check_refs(txn, request).await
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<order_item::Model>,
    ) -> DomainResult<Vec<OrderItemResponse>> {
        order_item_views(db, models).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::application::crud::CrudService;
    use crate::shared::SearchPaging;
    use crate::test_utils::{create_product, create_user, test_db};

    #[tokio::test]
    async fn product_cannot_be_added_twice_to_a_cart() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let carts = CrudService::new(db.clone(), CartResource);
        let items = CrudService::new(db, CartItemResource);

        let cart = carts
            .create(CartUpsertRequest {
                user_id: user.id,
                expires_at: None,
                is_active: true,
            })
            .await
            .unwrap();
        let line = CartItemUpsertRequest {
            quantity: 2,
            cart_id: cart.id,
            product_id: gel.id,
        };
        let created = items.create(line.clone()).await.unwrap();
        assert_eq!(created.total_price, Decimal::from(20));

        let err = items.create(line.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Updating the line itself is allowed
        let updated = items
            .update(created.id, CartItemUpsertRequest { quantity: 5, ..line })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 5);

        let cart = carts.get_by_id(cart.id).await.unwrap().unwrap();
        assert_eq!(cart.total_items, 5);
        assert_eq!(cart.total_amount, Decimal::from(50));
    }

    #[tokio::test]
    async fn order_insert_assigns_number() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let orders = CrudService::new(db, OrderResource);

        let order = orders
            .create(OrderUpsertRequest {
                total_amount: Decimal::from(15),
                user_id: user.id,
                is_active: true,
            })
            .await
            .unwrap();
        assert!(order.order_number.starts_with("ORD-"));
        assert!(order.order_number.ends_with(&format!("{:03}", order.id)));
        assert_eq!(order.total_items, 0);

        let err = orders
            .create(OrderUpsertRequest {
                total_amount: Decimal::from(15),
                user_id: 999,
                is_active: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn cart_full_text_matches_owner_username_or_email() {
        let db = test_db().await;
        let anna = create_user(&db, "anna").await;
        let boris = create_user(&db, "boris").await;
        let carts = CrudService::new(db, CartResource);
        for user_id in [anna.id, boris.id] {
            carts
                .create(CartUpsertRequest {
                    user_id,
                    expires_at: None,
                    is_active: true,
                })
                .await
                .unwrap();
        }

        let search = |token: &str| CartSearch {
            paging: SearchPaging {
                fts: Some(token.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let by_name = carts.search(&search("ann")).await.unwrap();
        assert_eq!(by_name.items.len(), 1);
        assert_eq!(by_name.items[0].user_id, anna.id);

        let by_email = carts.search(&search("boris@salon")).await.unwrap();
        assert_eq!(by_email.items.len(), 1);
        assert_eq!(by_email.items[0].user_id, boris.id);

        let none = carts.search(&search("nobody-here")).await.unwrap();
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn order_item_total_is_derived_from_unit_price() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(4)).await;
        let orders = CrudService::new(db.clone(), OrderResource);
        let items = CrudService::new(db, OrderItemResource);

        let order = orders
            .create(OrderUpsertRequest {
                total_amount: Decimal::from(12),
                user_id: user.id,
                is_active: true,
            })
            .await
            .unwrap();
        let line = OrderItemUpsertRequest {
            quantity: 3,
            unit_price: Decimal::from(4),
            order_id: order.id,
            product_id: gel.id,
        };
        let created = items.create(line.clone()).await.unwrap();
        assert_eq!(created.total_price, Decimal::from(12));

        let updated = items
            .update(created.id, OrderItemUpsertRequest { quantity: 5, ..line })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.total_price, Decimal::from(20));
    }

    #[tokio::test]
    async fn order_items_filter_by_user() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let other = create_user(&db, "other").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let orders = CrudService::new(db.clone(), OrderResource);
        let items = CrudService::new(db, OrderItemResource);

        for owner in [user.id, other.id] {
            let order = orders
                .create(OrderUpsertRequest {
                    total_amount: Decimal::from(10),
                    user_id: owner,
                    is_active: true,
                })
                .await
                .unwrap();
            items
                .create(OrderItemUpsertRequest {
                    quantity: 1,
                    unit_price: Decimal::from(10),
                    order_id: order.id,
                    product_id: gel.id,
                })
                .await
                .unwrap();
        }

        let mine = items
            .search(&OrderItemSearch {
                user_id: Some(user.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].product_name, "Gel");
    }
}
