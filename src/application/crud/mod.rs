//! Generic search/create/update/delete engine shared by every resource.
//!
//! A resource describes its entity, request and response shapes plus
//! optional hooks; [`CrudService`] supplies the uniform behaviour.

mod service;

pub use service::CrudService;

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, FromQueryResult, IntoActiveModel,
    PaginatorTrait, QueryFilter, Select,
};
use validator::Validate;

use crate::shared::{DomainError, DomainResult, SearchCriteria};

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, ActiveModel = Self::ActiveModel>;
    type Model: IntoActiveModel<Self::ActiveModel> + FromQueryResult + Clone + Send + Sync + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Search: SearchCriteria + Send + Sync;
    type Insert: Validate + Send + Sync;
    type Update: Validate + Send + Sync;
    type Response: Send;

    /// Name used in logs and not-found errors
    const NAME: &'static str;

    /// Resource-specific predicates; present search fields AND-combine.
    fn apply_filter(&self, query: Select<Self::Entity>, _search: &Self::Search) -> Select<Self::Entity> {
        query
    }

    /// OR-condition over the resource's text fields for a full-text token
    fn full_text(&self, _token: &str) -> Option<Condition> {
        None
    }

    fn new_active_model(&self, request: &Self::Insert) -> Self::ActiveModel;

    fn apply_update(&self, entity: &mut Self::ActiveModel, request: &Self::Update);

    async fn before_insert(
        &self,
        _txn: &DatabaseTransaction,
        _entity: &mut Self::ActiveModel,
        _request: &Self::Insert,
    ) -> DomainResult<()> {
        Ok(())
    }

    /// Runs inside the insert transaction; may write follow-up rows and
    /// return a refreshed model.
    async fn after_insert(
        &self,
        _txn: &DatabaseTransaction,
        model: Self::Model,
        _request: &Self::Insert,
    ) -> DomainResult<Self::Model> {
        Ok(model)
    }

    async fn before_update(
        &self,
        _txn: &DatabaseTransaction,
        _current: &Self::Model,
        _entity: &mut Self::ActiveModel,
        _request: &Self::Update,
    ) -> DomainResult<()> {
        Ok(())
    }

    /// Runs inside the update transaction after the row is written.
    async fn after_update(
        &self,
        _txn: &DatabaseTransaction,
        _model: &Self::Model,
        _request: &Self::Update,
    ) -> DomainResult<()> {
        Ok(())
    }

    /// Maps persisted rows to responses, resolving referenced rows in batches.
    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<Self::Model>,
    ) -> DomainResult<Vec<Self::Response>>;
}

/// Fails with `Conflict` when another row already holds `value` in `column`.
/// Comparison is case-sensitive and exact; `exclude_id` skips the row being updated.
pub async fn ensure_unique<E, C>(
    db: &C,
    column: E::Column,
    id_column: E::Column,
    value: &str,
    exclude_id: Option<i32>,
    message: &str,
) -> DomainResult<()>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let mut query = E::find().filter(column.eq(value));
    if let Some(id) = exclude_id {
        query = query.filter(id_column.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(DomainError::Conflict(message.to_string()));
    }
    Ok(())
}

/// Fails with `NotFound` unless a row with `id` exists.
pub async fn ensure_exists<E, C>(db: &C, entity: &'static str, id: i32) -> DomainResult<E::Model>
where
    E: EntityTrait,
    <E::PrimaryKey as sea_orm::PrimaryKeyTrait>::ValueType: From<i32>,
    C: ConnectionTrait,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found(entity, id))
}

/// Loads the rows whose `id_column` is in `ids`, keyed by `key`.
/// Used by response mappers to resolve references in one query.
pub async fn load_map<E, C>(
    db: &C,
    id_column: E::Column,
    mut ids: Vec<i32>,
    key: fn(&E::Model) -> i32,
) -> DomainResult<HashMap<i32, E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = E::find().filter(id_column.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|m| (key(&m), m)).collect())
}
