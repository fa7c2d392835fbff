//! Status, length and city resources: named rows with a uniqueness rule

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, QueryFilter, Select, Set,
};

use crate::application::crud::{ensure_unique, Resource};
use crate::domain::catalog::{
    CityResponse, CitySearch, CityUpsertRequest, LengthResponse, LengthSearch,
    LengthUpsertRequest, StatusResponse, StatusSearch, StatusUpsertRequest,
};
use crate::infrastructure::database::entities::{city, length, status};
use crate::shared::DomainResult;

// ── Status ──────────────────────────────────────────────────────

pub struct StatusResource;

#[async_trait]
impl Resource for StatusResource {
    type Entity = status::Entity;
    type Model = status::Model;
    type ActiveModel = status::ActiveModel;
    type Search = StatusSearch;
    type Insert = StatusUpsertRequest;
    type Update = StatusUpsertRequest;
    type Response = StatusResponse;

    const NAME: &'static str = "Status";

    fn apply_filter(&self, mut query: Select<status::Entity>, search: &StatusSearch) -> Select<status::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(status::Column::Name.contains(name));
        }
        if let Some(active) = search.is_active {
            query = query.filter(status::Column::IsActive.eq(active));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(Condition::all().add(status::Column::Name.contains(token)))
    }

    fn new_active_model(&self, request: &StatusUpsertRequest) -> status::ActiveModel {
        status::ActiveModel {
            name: Set(request.name.clone()),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut status::ActiveModel, request: &StatusUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut status::ActiveModel,
        request: &StatusUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<status::Entity, _>(
            txn,
            status::Column::Name,
            status::Column::Id,
            &request.name,
            None,
            "A status with this name already exists.",
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &status::Model,
        _entity: &mut status::ActiveModel,
        request: &StatusUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<status::Entity, _>(
            txn,
            status::Column::Name,
            status::Column::Id,
            &request.name,
            Some(current.id),
            "A status with this name already exists.",
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<status::Model>,
    ) -> DomainResult<Vec<StatusResponse>> {
        Ok(models
            .into_iter()
            .map(|m| StatusResponse {
                id: m.id,
                name: m.name,
                is_active: m.is_active,
                created_at: m.created_at,
            })
            .collect())
    }
}

// ── Length ──────────────────────────────────────────────────────

pub struct LengthResource;

#[async_trait]
impl Resource for LengthResource {
    type Entity = length::Entity;
    type Model = length::Model;
    type ActiveModel = length::ActiveModel;
    type Search = LengthSearch;
    type Insert = LengthUpsertRequest;
    type Update = LengthUpsertRequest;
    type Response = LengthResponse;

    const NAME: &'static str = "Length";

    fn apply_filter(&self, mut query: Select<length::Entity>, search: &LengthSearch) -> Select<length::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(length::Column::Name.contains(name));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(Condition::all().add(length::Column::Name.contains(token)))
    }

    fn new_active_model(&self, request: &LengthUpsertRequest) -> length::ActiveModel {
        length::ActiveModel {
            name: Set(request.name.clone()),
            image: Set(request.image.clone()),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut length::ActiveModel, request: &LengthUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.image = Set(request.image.clone());
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut length::ActiveModel,
        request: &LengthUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<length::Entity, _>(
            txn,
            length::Column::Name,
            length::Column::Id,
            &request.name,
            None,
            "A length with this name already exists.",
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &length::Model,
        _entity: &mut length::ActiveModel,
        request: &LengthUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<length::Entity, _>(
            txn,
            length::Column::Name,
            length::Column::Id,
            &request.name,
            Some(current.id),
            "A length with this name already exists.",
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<length::Model>,
    ) -> DomainResult<Vec<LengthResponse>> {
        Ok(models
            .into_iter()
            .map(|m| LengthResponse {
                id: m.id,
                name: m.name,
                image: m.image,
                is_active: m.is_active,
            })
            .collect())
    }
}

// ── City ────────────────────────────────────────────────────────

pub struct CityResource;

#[async_trait]
impl Resource for CityResource {
    type Entity = city::Entity;
    type Model = city::Model;
    type ActiveModel = city::ActiveModel;
    type Search = CitySearch;
    type Insert = CityUpsertRequest;
    type Update = CityUpsertRequest;
    type Response = CityResponse;

    const NAME: &'static str = "City";

    fn apply_filter(&self, mut query: Select<city::Entity>, search: &CitySearch) -> Select<city::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(city::Column::Name.contains(name));
        }
        query
    }

    fn new_active_model(&self, request: &CityUpsertRequest) -> city::ActiveModel {
        city::ActiveModel {
            name: Set(request.name.clone()),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut city::ActiveModel, request: &CityUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut city::ActiveModel,
        request: &CityUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<city::Entity, _>(
            txn,
            city::Column::Name,
            city::Column::Id,
            &request.name,
            None,
            "A city with this name already exists.",
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &city::Model,
        _entity: &mut city::ActiveModel,
        request: &CityUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<city::Entity, _>(
            txn,
            city::Column::Name,
            city::Column::Id,
            &request.name,
            Some(current.id),
            "A city with this name already exists.",
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<city::Model>,
    ) -> DomainResult<Vec<CityResponse>> {
        Ok(models
            .into_iter()
            .map(|m| CityResponse {
                id: m.id,
                name: m.name,
                is_active: m.is_active,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::crud::CrudService;
    use crate::shared::DomainError;
    use crate::test_utils::test_db;

    #[tokio::test]
    async fn seeded_statuses_are_searchable() {
        let service = CrudService::new(test_db().await, StatusResource);
        let all = service.search(&StatusSearch::default()).await.unwrap();
        let names: Vec<_> = all.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Reserved", "Cancelled", "Completed"]);

        let err = service
            .create(StatusUpsertRequest {
                name: "Reserved".into(),
                is_active: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn city_name_filter_is_substring() {
        let service = CrudService::new(test_db().await, CityResource);
        for name in ["Sarajevo", "Mostar", "Tuzla"] {
            service
                .create(CityUpsertRequest {
                    name: name.into(),
                    is_active: true,
                })
                .await
                .unwrap();
        }
        let found = service
            .search(&CitySearch {
                name: Some("ar".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.items.len(), 2);
    }

    #[tokio::test]
    async fn length_rename_conflict() {
        let service = CrudService::new(test_db().await, LengthResource);
        let short = service
            .create(LengthUpsertRequest {
                name: "Short".into(),
                image: None,
                is_active: true,
            })
            .await
            .unwrap();
        service
            .create(LengthUpsertRequest {
                name: "Long".into(),
                image: None,
                is_active: true,
            })
            .await
            .unwrap();

        let err = service
            .update(
                short.id,
                LengthUpsertRequest {
                    name: "Long".into(),
                    image: None,
                    is_active: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
