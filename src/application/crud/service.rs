use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Iterable, PaginatorTrait,
    PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, info};
use validator::Validate;

use super::Resource;
use crate::shared::{DomainError, DomainResult, PagedResult, SearchCriteria};

pub struct CrudService<R: Resource> {
    db: DatabaseConnection,
    resource: R,
}

impl<R> CrudService<R>
where
    R: Resource,
    <<R::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    pub fn new(db: DatabaseConnection, resource: R) -> Self {
        Self { db, resource }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub async fn search(&self, search: &R::Search) -> DomainResult<PagedResult<R::Response>> {
        let paging = search.paging();

        let mut query = self.resource.apply_filter(R::Entity::find(), search);
        if let Some(condition) = paging.full_text_token().and_then(|t| self.resource.full_text(t)) {
            query = query.filter(condition);
        }

        let total_count = if paging.include_total_count {
            Some(query.clone().count(&self.db).await?)
        } else {
            None
        };

        for key in <<R::Entity as EntityTrait>::PrimaryKey as Iterable>::iter() {
            query = query.order_by_asc(key.into_column());
        }
        if let Some(offset) = paging.offset() {
            query = query.offset(offset);
        }
        if let Some(limit) = paging.limit() {
            query = query.limit(limit);
        }

        let models = query.all(&self.db).await?;
        debug!(resource = R::NAME, rows = models.len(), "Search executed");

        let items = self.resource.to_responses(&self.db, models).await?;
        Ok(PagedResult::new(items, total_count))
    }

    pub async fn get_by_id(&self, id: i32) -> DomainResult<Option<R::Response>> {
        match R::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(self.respond(model).await?)),
            None => Ok(None),
        }
    }

    /// Validates, runs the insert hooks and persists in one transaction.
    pub async fn create(&self, request: R::Insert) -> DomainResult<R::Response> {
        request.validate()?;

        let txn = self.db.begin().await?;
        let mut entity = self.resource.new_active_model(&request);
        self.resource.before_insert(&txn, &mut entity, &request).await?;
        let model = entity.insert(&txn).await?;
        let model = self.resource.after_insert(&txn, model, &request).await?;
        txn.commit().await?;

        info!(resource = R::NAME, "Record created");
        self.respond(model).await
    }

    pub async fn update(&self, id: i32, request: R::Update) -> DomainResult<Option<R::Response>> {
        let txn = self.db.begin().await?;
        let Some(current) = R::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        request.validate()?;

        let mut entity: R::ActiveModel = current.clone().into_active_model();
        self.resource.apply_update(&mut entity, &request);
        self.resource
            .before_update(&txn, &current, &mut entity, &request)
            .await?;
        let model = entity.update(&txn).await?;
        self.resource.after_update(&txn, &model, &request).await?;
        txn.commit().await?;

        info!(resource = R::NAME, id, "Record updated");
        Ok(Some(self.respond(model).await?))
    }

    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        let result = R::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            info!(resource = R::NAME, id, "Record deleted");
        }
        Ok(result.rows_affected > 0)
    }

    async fn respond(&self, model: R::Model) -> DomainResult<R::Response> {
        self.resource
            .to_responses(&self.db, vec![model])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Storage(format!("{} response mapping returned nothing", R::NAME)))
    }
}
