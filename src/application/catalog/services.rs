//! Hairstyle, facial hair and dye colour resources

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, QueryFilter, Select, Set,
};

use crate::application::crud::{ensure_exists, ensure_unique, load_map, Resource};
use crate::domain::catalog::{
    DyingResponse, DyingSearch, DyingUpsertRequest, FacialHairResponse, FacialHairSearch,
    FacialHairUpsertRequest, HairstyleResponse, HairstyleSearch, HairstyleUpsertRequest,
};
use crate::infrastructure::database::entities::{dying, facial_hair, hairstyle, length};
use crate::shared::DomainResult;

// ── Hairstyle ───────────────────────────────────────────────────

pub struct HairstyleResource;

#[async_trait]
impl Resource for HairstyleResource {
    type Entity = hairstyle::Entity;
    type Model = hairstyle::Model;
    type ActiveModel = hairstyle::ActiveModel;
    type Search = HairstyleSearch;
    type Insert = HairstyleUpsertRequest;
    type Update = HairstyleUpsertRequest;
    type Response = HairstyleResponse;

    const NAME: &'static str = "Hairstyle";

    fn apply_filter(&self, mut query: Select<hairstyle::Entity>, search: &HairstyleSearch) -> Select<hairstyle::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(hairstyle::Column::Name.contains(name));
        }
        if let Some(min) = search.min_price {
            query = query.filter(hairstyle::Column::Price.gte(min));
        }
        if let Some(max) = search.max_price {
            query = query.filter(hairstyle::Column::Price.lte(max));
        }
        if let Some(active) = search.is_active {
            query = query.filter(hairstyle::Column::IsActive.eq(active));
        }
        if let Some(length_id) = search.length_id {
            query = query.filter(hairstyle::Column::LengthId.eq(length_id));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(Condition::all().add(hairstyle::Column::Name.contains(token)))
    }

    fn new_active_model(&self, request: &HairstyleUpsertRequest) -> hairstyle::ActiveModel {
        hairstyle::ActiveModel {
            name: Set(request.name.clone()),
            image: Set(request.image.clone()),
            price: Set(request.price),
            is_active: Set(request.is_active),
            length_id: Set(request.length_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut hairstyle::ActiveModel, request: &HairstyleUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.image = Set(request.image.clone());
        entity.price = Set(request.price);
        entity.is_active = Set(request.is_active);
        entity.length_id = Set(request.length_id);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut hairstyle::ActiveModel,
        request: &HairstyleUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<length::Entity, _>(txn, "Length", request.length_id).await?;
        Ok(())
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        _current: &hairstyle::Model,
        _entity: &mut hairstyle::ActiveModel,
        request: &HairstyleUpsertRequest,
    ) -> DomainResult<()> {
        ensure_exists::<length::Entity, _>(txn, "Length", request.length_id).await?;
        Ok(())
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<hairstyle::Model>,
    ) -> DomainResult<Vec<HairstyleResponse>> {
        let lengths = load_map::<length::Entity, _>(
            db,
            length::Column::Id,
            models.iter().map(|h| h.length_id).collect(),
            |l| l.id,
        )
        .await?;

        Ok(models
            .into_iter()
            .map(|h| HairstyleResponse {
                length_name: lengths
                    .get(&h.length_id)
                    .map(|l| l.name.clone())
                    .unwrap_or_default(),
                id: h.id,
                name: h.name,
                image: h.image,
                price: h.price,
                is_active: h.is_active,
                created_at: h.created_at,
                length_id: h.length_id,
            })
            .collect())
    }
}

// ── Facial hair ─────────────────────────────────────────────────

pub struct FacialHairResource;

#[async_trait]
impl Resource for FacialHairResource {
    type Entity = facial_hair::Entity;
    type Model = facial_hair::Model;
    type ActiveModel = facial_hair::ActiveModel;
    type Search = FacialHairSearch;
    type Insert = FacialHairUpsertRequest;
    type Update = FacialHairUpsertRequest;
    type Response = FacialHairResponse;

    const NAME: &'static str = "FacialHair";

    fn apply_filter(
        &self,
        mut query: Select<facial_hair::Entity>,
        search: &FacialHairSearch,
    ) -> Select<facial_hair::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(facial_hair::Column::Name.contains(name));
        }
        if let Some(min) = search.min_price {
            query = query.filter(facial_hair::Column::Price.gte(min));
        }
        if let Some(max) = search.max_price {
            query = query.filter(facial_hair::Column::Price.lte(max));
        }
        if let Some(active) = search.is_active {
            query = query.filter(facial_hair::Column::IsActive.eq(active));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(Condition::all().add(facial_hair::Column::Name.contains(token)))
    }

    fn new_active_model(&self, request: &FacialHairUpsertRequest) -> facial_hair::ActiveModel {
        facial_hair::ActiveModel {
            name: Set(request.name.clone()),
            image: Set(request.image.clone()),
            price: Set(request.price),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut facial_hair::ActiveModel, request: &FacialHairUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.image = Set(request.image.clone());
        entity.price = Set(request.price);
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut facial_hair::ActiveModel,
        request: &FacialHairUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<facial_hair::Entity, _>(
            txn,
            facial_hair::Column::Name,
            facial_hair::Column::Id,
            &request.name,
            None,
            "A facial hair style with this name already exists.",
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &facial_hair::Model,
        _entity: &mut facial_hair::ActiveModel,
        request: &FacialHairUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<facial_hair::Entity, _>(
            txn,
            facial_hair::Column::Name,
            facial_hair::Column::Id,
            &request.name,
            Some(current.id),
            "A facial hair style with this name already exists.",
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<facial_hair::Model>,
    ) -> DomainResult<Vec<FacialHairResponse>> {
        Ok(models
            .into_iter()
            .map(|f| FacialHairResponse {
                id: f.id,
                name: f.name,
                image: f.image,
                price: f.price,
                is_active: f.is_active,
                created_at: f.created_at,
            })
            .collect())
    }
}

// ── Dye colour ──────────────────────────────────────────────────

pub struct DyingResource;

#[async_trait]
impl Resource for DyingResource {
    type Entity = dying::Entity;
    type Model = dying::Model;
    type ActiveModel = dying::ActiveModel;
    type Search = DyingSearch;
    type Insert = DyingUpsertRequest;
    type Update = DyingUpsertRequest;
    type Response = DyingResponse;

    const NAME: &'static str = "Dying";

    fn apply_filter(&self, mut query: Select<dying::Entity>, search: &DyingSearch) -> Select<dying::Entity> {
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(dying::Column::Name.contains(name));
        }
        if let Some(hex) = search.hex_code.as_deref().filter(|h| !h.is_empty()) {
            query = query.filter(dying::Column::HexCode.contains(hex));
        }
        if let Some(active) = search.is_active {
            query = query.filter(dying::Column::IsActive.eq(active));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(
            Condition::any()
                .add(dying::Column::Name.contains(token))
                .add(dying::Column::HexCode.contains(token)),
        )
    }

    fn new_active_model(&self, request: &DyingUpsertRequest) -> dying::ActiveModel {
        dying::ActiveModel {
            name: Set(request.name.clone()),
            hex_code: Set(request.hex_code.clone()),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut dying::ActiveModel, request: &DyingUpsertRequest) {
        entity.name = Set(request.name.clone());
        entity.hex_code = Set(request.hex_code.clone());
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut dying::ActiveModel,
        request: &DyingUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<dying::Entity, _>(
            txn,
            dying::Column::Name,
            dying::Column::Id,
            &request.name,
            None,
            "A dye color with this name already exists.",
        )
        .await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &dying::Model,
        _entity: &mut dying::ActiveModel,
        request: &DyingUpsertRequest,
    ) -> DomainResult<()> {
        ensure_unique::<dying::Entity, _>(
            txn,
            dying::Column::Name,
            dying::Column::Id,
            &request.name,
            Some(current.id),
            "A dye color with this name already exists.",
        )
        .await
    }

    async fn to_responses(
        &self,
        _db: &DatabaseConnection,
        models: Vec<dying::Model>,
    ) -> DomainResult<Vec<DyingResponse>> {
        Ok(models
            .into_iter()
            .map(|d| DyingResponse {
                id: d.id,
                name: d.name,
                hex_code: d.hex_code,
                is_active: d.is_active,
                created_at: d.created_at,
            })
            .collect())
    }
}
