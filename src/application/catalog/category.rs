use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, QueryFilter, Select, Set,
};

use crate::application::crud::{ensure_unique, Resource};
use crate::domain::catalog::{CategoryResponse, CategorySearch, CategoryUpsertRequest};
use crate::infrastructure::database::entities::category;
use crate::shared::DomainResult;

const DUPLICATE_NAME: &str = "A category with this name already exists.";

pub struct CategoryResource;

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[async_trait]
impl Resource for CategoryResource {
    type Entity = category::Entity;
    type Model = category::Model;
    type ActiveModel = category::ActiveModel;
    type Search = CategorySearch;
    type Insert = CategoryUpsertRequest;
    type Update = CategoryUpsertRequest;
    type Response = CategoryResponse;

    const NAME: &'static str = "Category";

    fn apply_filter(&self, mut query: Select<category::Entity>, search: &CategorySearch) -> Select<category::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(category::Column::Name.contains(name));
        }
        if let Some(active) = search.is_active {
            query = query.filter(category::Column::IsActive.eq(active));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(
            Condition::any()
                .add(category::Column::Name.contains(token))
                .add(category::Column::Description.contains(token)),
        )
    }

    fn new_active_model(&self, request: &CategoryUpsertRequest) -> category::ActiveModel {
        category::ActiveModel {
            name: Set(request.name.clone()),
            description: Set(request.description.clone()),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut category::ActiveModel, request: &CategoryUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.description = Set(request.description.clone());
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut category::ActiveModel,
        request: &CategoryUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<category::Entity, _>(
            txn,
            category::Column::Name,
            category::Column::Id,
            &request.name,
            None,
            DUPLICATE_NAME,
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &category::Model,
        _entity: &mut category::ActiveModel,
        request: &CategoryUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<category::Entity, _>(
            txn,
            category::Column::Name,
            category::Column::Id,
            &request.name,
            Some(current.id),
            DUPLICATE_NAME,
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<category::Model>,
    ) -> DomainResult<Vec<CategoryResponse>> {
        Ok(models.into_iter().map(CategoryResponse::from).collect())
    }
}
