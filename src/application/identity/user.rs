use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait, Select, Set,
};
use tracing::debug;

use crate::application::crud::{ensure_exists, ensure_unique, load_map, Resource};
use crate::domain::identity::{RoleResponse, UserResponse, UserSearch, UserUpsertRequest};
use crate::infrastructure::database::entities::role::HAIRDRESSER_ROLE;
use crate::infrastructure::database::entities::{city, role, user, user_role};
use crate::shared::DomainResult;

const DUPLICATE_EMAIL: &str = "User with this email already exists.";
const DUPLICATE_USERNAME: &str = "User with this username already exists.";

/// True when the user holds the Hairdresser role
pub async fn is_hairdresser<C: ConnectionTrait>(db: &C, user_id: i32) -> DomainResult<bool> {
    let count = user_role::Entity::find()
        .join(JoinType::InnerJoin, user_role::Relation::Role.def())
        .filter(user_role::Column::UserId.eq(user_id))
        .filter(role::Column::Name.eq(HAIRDRESSER_ROLE))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub struct UserResource;

impl UserResource {
    async fn check_unique(
        &self,
        txn: &DatabaseTransaction,
        request: &UserUpsertRequest,
        exclude_id: Option<i32>,
    ) -> DomainResult<()> {
        ensure_unique::<user::Entity, _>(
            txn,
            user::Column::Email,
            user::Column::Id,
            &request.email,
            exclude_id,
            DUPLICATE_EMAIL,
        )
        .await?;
        ensure_unique::<user::Entity, _>(
            txn,
            user::Column::Username,
            user::Column::Id,
            &request.username,
            exclude_id,
            DUPLICATE_USERNAME,
        )
        .await
    }

    async fn assign_roles(
        &self,
        txn: &DatabaseTransaction,
        user_id: i32,
        role_ids: &[i32],
    ) -> DomainResult<()> {
        let mut role_ids = role_ids.to_vec();
        role_ids.sort_unstable();
        role_ids.dedup();

        for role_id in role_ids {
            ensure_exists::<role::Entity, _>(txn, "Role", role_id).await?;
            user_role::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(role_id),
                date_assigned: Set(Utc::now()),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for UserResource {
    type Entity = user::Entity;
    type Model = user::Model;
    type ActiveModel = user::ActiveModel;
    type Search = UserSearch;
    type Insert = UserUpsertRequest;
    type Update = UserUpsertRequest;
    type Response = UserResponse;

    const NAME: &'static str = "User";

    fn apply_filter(&self, mut query: Select<user::Entity>, search: &UserSearch) -> Select<user::Entity> {
        if let Some(username) = search.username.as_deref().filter(|u| !u.is_empty()) {
            query = query.filter(user::Column::Username.contains(username));
        }
        if let Some(email) = search.email.as_deref().filter(|e| !e.is_empty()) {
            query = query.filter(user::Column::Email.contains(email));
        }
        if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::FirstName.contains(name))
                    .add(user::Column::LastName.contains(name)),
            );
        }
        if let Some(city_id) = search.city_id {
            query = query.filter(user::Column::CityId.eq(city_id));
        }
        if let Some(active) = search.is_active {
            query = query.filter(user::Column::IsActive.eq(active));
        }
        if let Some(role_id) = search.role_id {
            query = query
                .join(JoinType::InnerJoin, user::Relation::UserRoles.def())
                .filter(user_role::Column::RoleId.eq(role_id));
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        Some(
            Condition::any()
                .add(user::Column::FirstName.contains(token))
                .add(user::Column::LastName.contains(token))
                .add(user::Column::Username.contains(token))
                .add(user::Column::Email.contains(token)),
        )
    }

    fn new_active_model(&self, request: &UserUpsertRequest) -> user::ActiveModel {
        user::ActiveModel {
            first_name: Set(request.first_name.clone()),
            last_name: Set(request.last_name.clone()),
            email: Set(request.email.clone()),
            username: Set(request.username.clone()),
            phone_number: Set(request.phone_number.clone()),
            city_id: Set(request.city_id),
            is_active: Set(request.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut user::ActiveModel, request: &UserUpsertRequest) {
        entity.first_name = Set(request.first_name.clone());
        entity.last_name = Set(request.last_name.clone());
        entity.email = Set(request.email.clone());
        entity.username = Set(request.username.clone());
        entity.phone_number = Set(request.phone_number.clone());
        entity.city_id = Set(request.city_id);
        entity.is_active = Set(request.is_active);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut user::ActiveModel,
        request: &UserUpsertRequest,
    ) -> DomainResult<()> {
        self.check_unique(txn, request, None).await?;
        if let Some(city_id) = request.city_id {
            ensure_exists::<city::Entity, _>(txn, "City", city_id).await?;
        }
        Ok(())
    }

    async fn after_insert(
        &self,
        txn: &DatabaseTransaction,
        model: user::Model,
        request: &UserUpsertRequest,
    ) -> DomainResult<user::Model> {
        if let Some(role_ids) = request.role_ids.as_deref() {
            self.assign_roles(txn, model.id, role_ids).await?;
        }
        Ok(model)
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &user::Model,
        _entity: &mut user::ActiveModel,
        request: &UserUpsertRequest,
    ) -> DomainResult<()> {
        self.check_unique(txn, request, Some(current.id)).await?;
        if let Some(city_id) = request.city_id {
            ensure_exists::<city::Entity, _>(txn, "City", city_id).await?;
        }
        Ok(())
    }

    async fn after_update(
        &self,
        txn: &DatabaseTransaction,
        model: &user::Model,
        request: &UserUpsertRequest,
    ) -> DomainResult<()> {
        let Some(role_ids) = request.role_ids.as_deref().filter(|ids| !ids.is_empty()) else {
            return Ok(());
        };
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(model.id))
            .exec(txn)
            .await?;
        self.assign_roles(txn, model.id, role_ids).await?;
        debug!(user_id = model.id, roles = role_ids.len(), "User roles replaced");
        Ok(())
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<user::Model>,
    ) -> DomainResult<Vec<UserResponse>> {
        let cities = load_map::<city::Entity, _>(
            db,
            city::Column::Id,
            models.iter().filter_map(|u| u.city_id).collect(),
            |c| c.id,
        )
        .await?;

        let user_ids: Vec<i32> = models.iter().map(|u| u.id).collect();
        let assignments = if user_ids.is_empty() {
            Vec::new()
        } else {
            user_role::Entity::find()
                .filter(user_role::Column::UserId.is_in(user_ids))
                .all(db)
                .await?
        };
        let roles = load_map::<role::Entity, _>(
            db,
            role::Column::Id,
            assignments.iter().map(|a| a.role_id).collect(),
            |r| r.id,
        )
        .await?;

        let mut roles_by_user: HashMap<i32, Vec<RoleResponse>> = HashMap::new();
        for assignment in &assignments {
            if let Some(role) = roles.get(&assignment.role_id) {
                roles_by_user
                    .entry(assignment.user_id)
                    .or_default()
                    .push(RoleResponse {
                        id: role.id,
                        name: role.name.clone(),
                        description: role.description.clone(),
                    });
            }
        }

        Ok(models
            .into_iter()
            .map(|u| UserResponse {
                city_name: u
                    .city_id
                    .and_then(|id| cities.get(&id))
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                roles: roles_by_user.remove(&u.id).unwrap_or_default(),
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                email: u.email,
                username: u.username,
                phone_number: u.phone_number,
                city_id: u.city_id,
                is_active: u.is_active,
                created_at: u.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::crud::CrudService;
    use crate::shared::DomainError;
    use crate::test_utils::{create_hairdresser, create_user, role_id, test_db};

    fn request(username: &str, email: &str) -> UserUpsertRequest {
        UserUpsertRequest {
            first_name: "Ana".into(),
            last_name: "Horvat".into(),
            email: email.into(),
            username: username.into(),
            phone_number: None,
            city_id: None,
            is_active: true,
            role_ids: None,
        }
    }

    #[tokio::test]
    async fn email_and_username_are_unique() {
        let service = CrudService::new(test_db().await, UserResource);
        service.create(request("ana", "ana@example.com")).await.unwrap();

        let err = service
            .create(request("ana2", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m.contains("email")));

        let err = service
            .create(request("ana", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m.contains("username")));
    }

    #[tokio::test]
    async fn invalid_email_fails_validation() {
        let service = CrudService::new(test_db().await, UserResource);
        let err = service.create(request("ana", "not-an-email")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn roles_are_assigned_and_replaced() {
        let db = test_db().await;
        let hairdresser = role_id(&db, HAIRDRESSER_ROLE).await;
        let admin = role_id(&db, "Admin").await;
        let service = CrudService::new(db.clone(), UserResource);

        let mut req = request("ivo", "ivo@example.com");
        req.role_ids = Some(vec![hairdresser]);
        let created = service.create(req.clone()).await.unwrap();
        assert_eq!(created.roles.len(), 1);
        assert!(is_hairdresser(&db, created.id).await.unwrap());

        req.role_ids = Some(vec![admin]);
        let updated = service.update(created.id, req).await.unwrap().unwrap();
        assert_eq!(updated.roles.len(), 1);
        assert_eq!(updated.roles[0].name, "Admin");
        assert!(!is_hairdresser(&db, created.id).await.unwrap());
    }

    #[tokio::test]
    async fn empty_role_list_keeps_roles_on_update() {
        let db = test_db().await;
        let stylist = create_hairdresser(&db, "maja").await;
        let service = CrudService::new(db.clone(), UserResource);

        let mut req = request("maja", &stylist.email);
        req.role_ids = Some(Vec::new());
        let updated = service.update(stylist.id, req).await.unwrap().unwrap();
        assert_eq!(updated.roles.len(), 1);
        assert!(is_hairdresser(&db, stylist.id).await.unwrap());
    }

    #[tokio::test]
    async fn role_filter_and_full_text() {
        let db = test_db().await;
        create_user(&db, "client").await;
        let stylist = create_hairdresser(&db, "stylist").await;
        let hairdresser = role_id(&db, HAIRDRESSER_ROLE).await;
        let service = CrudService::new(db, UserResource);

        let found = service
            .search(&UserSearch {
                role_id: Some(hairdresser),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].id, stylist.id);

        let mut search = UserSearch::default();
        search.paging.fts = Some("client".into());
        let found = service.search(&search).await.unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].username, "client");
    }
}
