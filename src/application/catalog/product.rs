use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, QueryFilter, Select, Set,
};

use crate::application::crud::{ensure_exists, ensure_unique, load_map, Resource};
use crate::domain::catalog::{ProductResponse, ProductSearch, ProductUpsertRequest};
use crate::infrastructure::database::entities::{category, manufacturer, product};
use crate::shared::DomainResult;

const DUPLICATE_NAME: &str = "A product with this name already exists.";

pub struct ProductResource;

impl ProductResource {
    async fn check_references(
        &self,
        txn: &DatabaseTransaction,
        request: &ProductUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<category::Entity, _>(txn, "Category", request.category_id).await?;
        ensure_exists::<manufacturer::Entity, _>(txn, "Manufacturer", request.manufacturer_id).await?;
        Ok(())
    }
}

/// Resolves category and manufacturer names for a batch of products
pub async fn product_views(
    db: &DatabaseConnection,
    models: Vec<product::Model>,
) -> DomainResult<Vec<ProductResponse>> {
    let categories = load_map::<category::Entity, _>(
        db,
        category::Column::Id,
        models.iter().map(|p| p.category_id).collect(),
        |c| c.id,
    )
    .await?;
    let manufacturers = load_map::<manufacturer::Entity, _>(
        db,
        manufacturer::Column::Id,
        models.iter().map(|p| p.manufacturer_id).collect(),
        |m| m.id,
    )
    .await?;

    Ok(models
        .into_iter()
        .map(|p| ProductResponse {
            category_name: categories
                .get(&p.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            manufacturer_name: manufacturers
                .get(&p.manufacturer_id)
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            id: p.id,
            name: p.name,
            price: p.price,
            picture: p.picture,
            is_active: p.is_active,
            created_at: p.created_at,
            category_id: p.category_id,
            manufacturer_id: p.manufacturer_id,
        })
        .collect())
}

#[async_trait]
impl Resource for ProductResource {
    type Entity = product::Entity;
    type Model = product::Model;
    type ActiveModel = product::ActiveModel;
    type Search = ProductSearch;
    type Insert = ProductUpsertRequest;
    type Update = ProductUpsertRequest;
    type Response = ProductResponse;

    const NAME: &'static str = "Product";

    fn apply_filter(&self, mut query: Select<product::Entity>, search: &ProductSearch) -> Select<product::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(product::Column::Name.contains(name));
        }
        if let Some(min) = search.min_price {
            query = query.filter(product::Column::Price.gte(min));
        }
        if let Some(max) = search.max_price {
            query = query.filter(product::Column::Price.lte(max));
        }
        if let Some(active) = search.is_active {
            query = query.filter(product::Column::IsActive.eq(active));
        }
        if let Some(category_id) = search.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(manufacturer_id) = search.manufacturer_id {
            query = query.filter(product::Column::ManufacturerId.eq(manufacturer_id));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(Condition::all().add(product::Column::Name.contains(token)))
    }

    fn new_active_model(&self, request: &ProductUpsertRequest) -> product::ActiveModel {
        product::ActiveModel {
            name: Set(request.name.clone()),
            price: Set(request.price),
            picture: Set(request.picture.clone()),
            is_active: Set(request.is_active),
            category_id: Set(request.category_id),
            manufacturer_id: Set(request.manufacturer_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut product::ActiveModel, request: &ProductUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.price = Set(request.price);
        entity.picture = Set(request.picture.clone());
        entity.is_active = Set(request.is_active);
        entity.category_id = Set(request.category_id);
        entity.manufacturer_id = Set(request.manufacturer_id);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut product::ActiveModel,
        request: &ProductUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<product::Entity, _>(
            txn,
            product::Column::Name,
            product::Column::Id,
            &request.name,
            None,
            DUPLICATE_NAME,
        )
        .await?;
        self.check_references(txn, request).await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &product::Model,
        _entity: &mut product::ActiveModel,
        request: &ProductUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<product::Entity, _>(
            txn,
            product::Column::Name,
            product::Column::Id,
            &request.name,
            Some(current.id),
            DUPLICATE_NAME,
        )
        .await?;
        self.check_references(txn, request).await
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<product::Model>,
    ) -> DomainResult<Vec<ProductResponse>> {
        product_views(db, models).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::application::crud::CrudService;
    use crate::shared::DomainError;
    use crate::test_utils::{create_category, create_manufacturer, test_db};

    fn request(name: &str, price: Decimal, category_id: i32, manufacturer_id: i32) -> ProductUpsertRequest {
        ProductUpsertRequest {
            name: name.into(),
            price,
            picture: None,
            is_active: true,
            category_id,
            manufacturer_id,
        }
    }

    #[tokio::test]
    async fn response_carries_reference_names() {
        let db = test_db().await;
        let category = create_category(&db, "Hair care").await;
        let maker = create_manufacturer(&db, "Wella").await;
        let service = CrudService::new(db, ProductResource);

        let created = service
            .create(request("Shampoo", Decimal::new(1250, 2), category.id, maker.id))
            .await
            .unwrap();
        assert_eq!(created.category_name, "Hair care");
        assert_eq!(created.manufacturer_name, "Wella");
        assert_eq!(created.price, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn price_range_filter() {
        let db = test_db().await;
        let category = create_category(&db, "Care").await;
        let maker = create_manufacturer(&db, "Acme").await;
        let service = CrudService::new(db, ProductResource);
        for (name, price) in [("Cheap", 5), ("Mid", 15), ("Premium", 40)] {
            service
                .create(request(name, Decimal::from(price), category.id, maker.id))
                .await
                .unwrap();
        }

        let found = service
            .search(&ProductSearch {
                min_price: Some(Decimal::from(10)),
                max_price: Some(Decimal::from(20)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].name, "Mid");
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let db = test_db().await;
        let maker = create_manufacturer(&db, "Acme").await;
        let service = CrudService::new(db, ProductResource);

        let err = service
            .create(request("Gel", Decimal::from(8), 999, maker.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Category", .. }));
    }

    #[tokio::test]
    async fn out_of_range_price_fails_validation() {
        let db = test_db().await;
        let category = create_category(&db, "Care").await;
        let maker = create_manufacturer(&db, "Acme").await;
        let service = CrudService::new(db, ProductResource);

        let err = service
            .create(request("Gold", Decimal::from(5000), category.id, maker.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
