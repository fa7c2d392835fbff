use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, QueryFilter, Select, Set,
};

use crate::application::crud::{ensure_unique, Resource};
use crate::domain::catalog::{ManufacturerResponse, ManufacturerSearch, ManufacturerUpsertRequest};
use crate::infrastructure::database::entities::manufacturer;
use crate::shared::DomainResult;

const DUPLICATE_NAME: &str = "A manufacturer with this name already exists.";

pub struct ManufacturerResource;

#[async_trait]
impl Resource for ManufacturerResource {
    type Entity = manufacturer::Entity;
    type Model = manufacturer::Model;
    type ActiveModel = manufacturer::ActiveModel;
    type Search = ManufacturerSearch;
    type Insert = ManufacturerUpsertRequest;
    type Update = ManufacturerUpsertRequest;
    type Response = ManufacturerResponse;

    const NAME: &'static str = "Manufacturer";

    fn apply_filter(
        &self,
        mut query: Select<manufacturer::Entity>,
        search: &ManufacturerSearch,
    ) -> Select<manufacturer::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(manufacturer::Column::Name.contains(name));
        }
        if let Some(active) = search.is_active {
            query = query.filter(manufacturer::Column::IsActive.eq(active));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(
            Condition::any()
                .add(manufacturer::Column::Name.contains(token))
                .add(manufacturer::Column::Description.contains(token)),
        )
    }

    fn new_active_model(&self, request: &ManufacturerUpsertRequest) -> manufacturer::ActiveModel {
        manufacturer::ActiveModel {
            name: Set(request.name.clone()),
            description: Set(request.description.clone()),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut manufacturer::ActiveModel, request: &ManufacturerUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.description = Set(request.description.clone());
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut manufacturer::ActiveModel,
        request: &ManufacturerUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<manufacturer::Entity, _>(
            txn,
            manufacturer::Column::Name,
            manufacturer::Column::Id,
            &request.name,
            None,
            DUPLICATE_NAME,
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &manufacturer::Model,
        _entity: &mut manufacturer::ActiveModel,
        request: &ManufacturerUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<manufacturer::Entity, _>(
            txn,
            manufacturer::Column::Name,
            manufacturer::Column::Id,
            &request.name,
            Some(current.id),
            DUPLICATE_NAME,
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<manufacturer::Model>,
    ) -> DomainResult<Vec<ManufacturerResponse>> {
        Ok(models
            .into_iter()
            .map(|m| ManufacturerResponse {
                id: m.id,
                name: m.name,
                description: m.description,
                is_active: m.is_active,
                created_at: m.created_at,
            })
            .collect())
    }
}
