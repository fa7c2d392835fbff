use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    Select, Set,
};

use super::views::appointment_views;
use crate::application::crud::{ensure_exists, load_map, Resource};
use crate::domain::booking::{ReviewResponse, ReviewSearch, ReviewUpsertRequest};
use crate::infrastructure::database::entities::{appointment, review, user};
use crate::shared::{DomainError, DomainResult};

pub struct ReviewResource;

impl ReviewResource {
    async fn check_review(
        &self,
        txn: &DatabaseTransaction,
        request: &ReviewUpsertRequest,
        exclude_id: Option<i32>,
    ) -> DomainResult<()> {
        ensure_exists::<user::Entity, _>(txn, "User", request.user_id).await?;
        ensure_exists::<appointment::Entity, _>(txn, "Appointment", request.appointment_id).await?;

        let mut duplicate = review::Entity::find()
            .filter(review::Column::UserId.eq(request.user_id))
            .filter(review::Column::AppointmentId.eq(request.appointment_id));
        if let Some(id) = exclude_id {
            duplicate = duplicate.filter(review::Column::Id.ne(id));
        }
        if duplicate.one(txn).await?.is_some() {
            return Err(DomainError::Conflict(
                "You have already reviewed this appointment.".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for ReviewResource {
    type Entity = review::Entity;
    type Model = review::Model;
    type ActiveModel = review::ActiveModel;
    type Search = ReviewSearch;
    type Insert = ReviewUpsertRequest;
    type Update = ReviewUpsertRequest;
    type Response = ReviewResponse;

    const NAME: &'static str = "Review";

    fn apply_filter(&self, mut query: Select<review::Entity>, search: &ReviewSearch) -> Select<review::Entity> {
        if let Some(user_id) = search.user_id {
            query = query.filter(review::Column::UserId.eq(user_id));
        }
        if let Some(appointment_id) = search.appointment_id {
            query = query.filter(review::Column::AppointmentId.eq(appointment_id));
        }
        if let Some(rating) = search.rating {
            query = query.filter(review::Column::Rating.eq(rating));
        }
        if let Some(active) = search.is_active {
            query = query.filter(review::Column::IsActive.eq(active));
        }
        if let Some(hairdresser_id) = search.hairdresser_id {
            query = query.filter(
                review::Column::AppointmentId.in_subquery(
                    Query::select()
                        .column(appointment::Column::Id)
                        .from(appointment::Entity)
                        .and_where(appointment::Column::HairdresserId.eq(hairdresser_id))
                        .to_owned(),
                ),
            );
        }
        query
    }

    fn full_text(&self, token: &str) -> Option<Condition> {
        let authors = Query::select()
            .column(user::Column::Id)
            .from(user::Entity)
            .cond_where(
                Condition::any()
                    .add(user::Column::FirstName.contains(token))
                    .add(user::Column::LastName.contains(token)),
            )
            .to_owned();
        Some(
            Condition::any()
                .add(review::Column::Comment.contains(token))
                .add(review::Column::UserId.in_subquery(authors)),
        )
    }

    fn new_active_model(&self, request: &ReviewUpsertRequest) -> review::ActiveModel {
        review::ActiveModel {
            rating: Set(request.rating),
            comment: Set(request.comment.clone()),
            is_active: Set(request.is_active),
            user_id: Set(request.user_id),
            appointment_id: Set(request.appointment_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut review::ActiveModel, request: &ReviewUpsertRequest) {
        entity.rating = Set(request.rating);
        entity.comment = Set(request.comment.clone());
        entity.is_active = Set(request.is_active);
        entity.user_id = Set(request.user_id);
        entity.appointment_id = Set(request.appointment_id);
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        _entity: &mut review::ActiveModel,
        request: &ReviewUpsertRequest,
    ) -> DomainResult<()> {
        self.check_review(txn, request, None).await
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        current: &review::Model,
        _entity: &mut review::ActiveModel,
        request: &ReviewUpsertRequest,
    ) -> DomainResult<()> {
        self.check_review(txn, request, Some(current.id)).await
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<review::Model>,
    ) -> DomainResult<Vec<ReviewResponse>> {
        let users = load_map::<user::Entity, _>(
            db,
            user::Column::Id,
            models.iter().map(|r| r.user_id).collect(),
            |u| u.id,
        )
        .await?;
        let appointments = load_map::<appointment::Entity, _>(
            db,
            appointment::Column::Id,
            models.iter().map(|r| r.appointment_id).collect(),
            |a| a.id,
        )
        .await?;
        let views = appointment_views(db, appointments.into_values().collect()).await?;

        Ok(models
            .into_iter()
            .map(|r| {
                let appointment = views.iter().find(|a| a.id == r.appointment_id).cloned();
                ReviewResponse {
                    user_full_name: users
                        .get(&r.user_id)
                        .map(user::Model::full_name)
                        .unwrap_or_default(),
                    hairdresser_full_name: appointment
                        .as_ref()
                        .map(|a| a.hairdresser_name.clone())
                        .unwrap_or_default(),
                    appointment,
                    id: r.id,
                    rating: r.rating,
                    comment: r.comment,
                    created_at: r.created_at,
                    is_active: r.is_active,
                    user_id: r.user_id,
                    appointment_id: r.appointment_id,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::application::booking::BookingService;
    use crate::application::crud::CrudService;
    use crate::domain::booking::AppointmentUpsertRequest;
    use crate::test_utils::{create_hairdresser, create_hairstyle, create_user, test_db};

    async fn booked(db: &DatabaseConnection) -> (i32, i32, i32) {
        let client = create_user(db, "client").await;
        let stylist = create_hairdresser(db, "stylist").await;
        let hairstyle = create_hairstyle(db, "Bob", Decimal::from(18)).await;
        let appointment = BookingService::new(db.clone())
            .appointments()
            .create(AppointmentUpsertRequest {
                user_id: client.id,
                hairdresser_id: stylist.id,
                status_id: None,
                appointment_date: Utc::now(),
                hairstyle_id: Some(hairstyle.id),
                facial_hair_id: None,
                dying_id: None,
                is_active: true,
            })
            .await
            .unwrap();
        (client.id, stylist.id, appointment.id)
    }

    fn request(user_id: i32, appointment_id: i32, rating: i32) -> ReviewUpsertRequest {
        ReviewUpsertRequest {
            rating,
            comment: Some("Great cut".into()),
            user_id,
            appointment_id,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn one_review_per_user_and_appointment() {
        let db = test_db().await;
        let (client, _, appointment) = booked(&db).await;
        let service = CrudService::new(db, ReviewResource);

        let created = service.create(request(client, appointment, 5)).await.unwrap();
        assert_eq!(created.user_full_name, "client Tester");
        assert_eq!(created.hairdresser_full_name, "stylist Tester");
        assert!(created.appointment.is_some());

        let err = service.create(request(client, appointment, 4)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Editing the same review is not a duplicate
        let updated = service
            .update(created.id, request(client, appointment, 4))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.rating, 4);
    }

    #[tokio::test]
    async fn rating_out_of_range_is_rejected() {
        let db = test_db().await;
        let (client, _, appointment) = booked(&db).await;
        let service = CrudService::new(db, ReviewResource);

        let err = service.create(request(client, appointment, 6)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn filter_by_hairdresser() {
        let db = test_db().await;
        let (client, stylist, appointment) = booked(&db).await;
        let service = CrudService::new(db, ReviewResource);
        service.create(request(client, appointment, 5)).await.unwrap();

        let found = service
            .search(&ReviewSearch {
                hairdresser_id: Some(stylist),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);

        let none = service
            .search(&ReviewSearch {
                hairdresser_id: Some(stylist + 100),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn unknown_appointment_is_not_found() {
        let db = test_db().await;
        let client = create_user(&db, "client").await;
        let service = CrudService::new(db, ReviewResource);

        let err = service.create(request(client.id, 42, 5)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Appointment", .. }));
    }
}
