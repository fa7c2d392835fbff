use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter,
    Select, Set,
};
use tracing::debug;

use super::views::{appointment_views, AppointmentRefs};
use crate::application::crud::{ensure_exists, Resource};
use crate::application::identity::is_hairdresser;
use crate::application::notifications::outbox;
use crate::domain::booking::{
    final_price, AppointmentResponse, AppointmentSearch, AppointmentStatus, AppointmentUpsertRequest,
};
use crate::domain::events::NotificationEvent;
use crate::infrastructure::database::entities::{appointment, facial_hair, hairstyle, user};
use crate::shared::{DomainError, DomainResult};

/// Which booking notification to record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    Created,
    Cancelled,
}

/// Queues the notification for `model` in the caller's transaction.
/// Appointments whose hairdresser has no email are skipped.
pub(crate) async fn record_booking_event(
    txn: &DatabaseTransaction,
    kind: BookingEvent,
    model: &appointment::Model,
) -> DomainResult<()> {
    let refs = AppointmentRefs::load(txn, std::slice::from_ref(model)).await?;
    let Some(notification) = refs.notification(model) else {
        debug!(appointment_id = model.id, "Hairdresser has no email, notification skipped");
        return Ok(());
    };

    let event = match kind {
        BookingEvent::Created => NotificationEvent::AppointmentCreated(notification),
        BookingEvent::Cancelled => NotificationEvent::AppointmentCancelled(notification),
    };
    outbox::enqueue(txn, event).await?;
    Ok(())
}

pub struct AppointmentResource;

impl AppointmentResource {
    /// Booking rules shared by create and update. Returns the derived price.
    async fn check_booking(
        &self,
        txn: &DatabaseTransaction,
        request: &AppointmentUpsertRequest,
    ) -> DomainResult<Decimal> {
        let services = request.services();
        if !services.has_any() {
            return Err(DomainError::DomainRule(
                "At least one service (hairstyle, facial hair or dye) must be selected.".to_string(),
            ));
        }

        ensure_exists::<user::Entity, _>(txn, "User", request.user_id).await?;

        if user::Entity::find_by_id(request.hairdresser_id)
            .one(txn)
            .await?
            .is_none()
        {
            return Err(DomainError::DomainRule(format!(
                "Hairdresser {} does not exist.",
                request.hairdresser_id
            )));
        }
        if !is_hairdresser(txn, request.hairdresser_id).await? {
            return Err(DomainError::DomainRule(format!(
                "User {} is not a hairdresser.",
                request.hairdresser_id
            )));
        }

        let hairstyle_price = match services.hairstyle_id {
            Some(id) => hairstyle::Entity::find_by_id(id).one(txn).await?.map(|h| h.price),
            None => None,
        };
        let facial_hair_price = match services.facial_hair_id {
            Some(id) => facial_hair::Entity::find_by_id(id).one(txn).await?.map(|f| f.price),
            None => None,
        };

        Ok(final_price(
            hairstyle_price,
            facial_hair_price,
            services.dying_id.is_some(),
        ))
    }
}

#[async_trait]
impl Resource for AppointmentResource {
    type Entity = appointment::Entity;
    type Model = appointment::Model;
    type ActiveModel = appointment::ActiveModel;
    type Search = AppointmentSearch;
    type Insert = AppointmentUpsertRequest;
    type Update = AppointmentUpsertRequest;
    type Response = AppointmentResponse;

    const NAME: &'static str = "Appointment";

    fn apply_filter(
        &self,
        mut query: Select<appointment::Entity>,
        search: &AppointmentSearch,
    ) -> Select<appointment::Entity> {
        if let Some(user_id) = search.user_id {
            query = query.filter(appointment::Column::UserId.eq(user_id));
        }
        if let Some(hairdresser_id) = search.hairdresser_id {
            query = query.filter(appointment::Column::HairdresserId.eq(hairdresser_id));
        }
        if let Some(status_id) = search.status_id {
            query = query.filter(appointment::Column::StatusId.eq(status_id));
        }
        if let Some(id) = search.hairstyle_id {
            query = query.filter(appointment::Column::HairstyleId.eq(id));
        }
        if let Some(id) = search.facial_hair_id {
            query = query.filter(appointment::Column::FacialHairId.eq(id));
        }
        if let Some(id) = search.dying_id {
            query = query.filter(appointment::Column::DyingId.eq(id));
        }
        if let Some(active) = search.is_active {
            query = query.filter(appointment::Column::IsActive.eq(active));
        }
        if let Some(min) = search.min_price {
            query = query.filter(appointment::Column::FinalPrice.gte(min));
        }
        if let Some(max) = search.max_price {
            query = query.filter(appointment::Column::FinalPrice.lte(max));
        }
        if let Some(from) = search.appointment_date_from {
            query = query.filter(appointment::Column::AppointmentDate.gte(from));
        }
        if let Some(to) = search.appointment_date_to {
            query = query.filter(appointment::Column::AppointmentDate.lte(to));
        }
        query
    }

    /// Client or hairdresser first/last name
    fn full_text(&self, token: &str) -> Option<Condition> {
        let named = Query::select()
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
                .add(appointment::Column::UserId.in_subquery(named.clone()))
                .add(appointment::Column::HairdresserId.in_subquery(named)),
        )
    }

    fn new_active_model(&self, request: &AppointmentUpsertRequest) -> appointment::ActiveModel {
        appointment::ActiveModel {
            final_price: Set(Decimal::ZERO),
            appointment_date: Set(request.appointment_date),
            created_at: Set(Utc::now()),
            is_active: Set(request.is_active),
            user_id: Set(request.user_id),
            hairdresser_id: Set(request.hairdresser_id),
            status_id: Set(AppointmentStatus::Reserved.id()),
            hairstyle_id: Set(request.hairstyle_id),
            facial_hair_id: Set(request.facial_hair_id),
            dying_id: Set(request.dying_id),
            ..Default::default()
        }
    }

    fn apply_update(&self, entity: &mut appointment::ActiveModel, request: &AppointmentUpsertRequest) {
        entity.appointment_date = Set(request.appointment_date);
        entity.is_active = Set(request.is_active);
        entity.user_id = Set(request.user_id);
        entity.hairdresser_id = Set(request.hairdresser_id);
        entity.hairstyle_id = Set(request.hairstyle_id);
        entity.facial_hair_id = Set(request.facial_hair_id);
        entity.dying_id = Set(request.dying_id);
        // No transition guard on this path
        if let Some(status_id) = request.status_id {
            entity.status_id = Set(status_id);
        }
    }

    async fn before_insert(
        &self,
        txn: &DatabaseTransaction,
        entity: &mut appointment::ActiveModel,
        request: &AppointmentUpsertRequest,
    ) -> DomainResult<()> {
        let price = self.check_booking(txn, request).await?;
        entity.final_price = Set(price);
        entity.status_id = Set(AppointmentStatus::Reserved.id());
        Ok(())
    }

    async fn after_insert(
        &self,
        txn: &DatabaseTransaction,
        model: appointment::Model,
        _request: &AppointmentUpsertRequest,
    ) -> DomainResult<appointment::Model> {
        record_booking_event(txn, BookingEvent::Created, &model).await?;
        Ok(model)
    }

    async fn before_update(
        &self,
        txn: &DatabaseTransaction,
        _current: &appointment::Model,
        entity: &mut appointment::ActiveModel,
        request: &AppointmentUpsertRequest,
    ) -> DomainResult<()> {
        let price = self.check_booking(txn, request).await?;
        entity.final_price = Set(price);
        Ok(())
    }

    async fn to_responses(
        &self,
        db: &DatabaseConnection,
        models: Vec<appointment::Model>,
    ) -> DomainResult<Vec<AppointmentResponse>> {
        appointment_views(db, models).await
    }
}
