//! Appointment booking and status actions

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, TransactionTrait};
use tracing::info;

use super::appointment::{record_booking_event, AppointmentResource, BookingEvent};
use super::views::appointment_views;
use crate::application::crud::CrudService;
use crate::domain::booking::{AppointmentResponse, AppointmentStatus};
use crate::infrastructure::database::entities::appointment;
use crate::shared::{DomainError, DomainResult};

/// Booking engine: generic appointment access plus the cancel/complete actions
pub struct BookingService {
    appointments: CrudService<AppointmentResource>,
}

impl BookingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            appointments: CrudService::new(db, AppointmentResource),
        }
    }

    /// Search, create, update and delete for appointments
    pub fn appointments(&self) -> &CrudService<AppointmentResource> {
        &self.appointments
    }

    /// Cancel an active appointment and queue the cancellation notice
    pub async fn cancel(&self, appointment_id: i32) -> DomainResult<AppointmentResponse> {
        self.transition(appointment_id, AppointmentStatus::Cancelled)
            .await
    }

    /// Mark an active appointment as completed
    pub async fn complete(&self, appointment_id: i32) -> DomainResult<AppointmentResponse> {
        self.transition(appointment_id, AppointmentStatus::Completed)
            .await
    }

    async fn transition(
        &self,
        appointment_id: i32,
        status: AppointmentStatus,
    ) -> DomainResult<AppointmentResponse> {
        let db = self.appointments.db();
        let txn = db.begin().await?;

        // Load the appointment
        let current = appointment::Entity::find_by_id(appointment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", appointment_id))?;

        if !current.is_active {
            return Err(DomainError::DomainRule(format!(
                "Appointment {} is not active.",
                appointment_id
            )));
        }

        let mut entity = current.into_active_model();
        entity.status_id = Set(status.id());
        let model = entity.update(&txn).await?;

        if status == AppointmentStatus::Cancelled {
            record_booking_event(&txn, BookingEvent::Cancelled, &model).await?;
        }
        txn.commit().await?;

        info!(appointment_id, status = %status, "Appointment status changed");

        appointment_views(db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Storage("Appointment view mapping returned nothing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use sea_orm::{EntityTrait, PaginatorTrait};

    use crate::domain::booking::{AppointmentSearch, AppointmentUpsertRequest};
    use crate::shared::SearchPaging;
    use crate::domain::events::EventMessage;
    use crate::infrastructure::database::entities::notification_outbox;
    use crate::test_utils::{
        create_dying, create_facial_hair, create_hairdresser, create_hairstyle, create_user, test_db,
    };

    struct Fixture {
        service: BookingService,
        db: DatabaseConnection,
        client_id: i32,
        hairdresser_id: i32,
        hairstyle_id: i32,
        facial_hair_id: i32,
        dying_id: i32,
    }

    async fn fixture() -> Fixture {
        let db = test_db().await;
        let client = create_user(&db, "client").await;
        let hairdresser = create_hairdresser(&db, "stylist").await;
        let hairstyle = create_hairstyle(&db, "Bob", Decimal::from(18)).await;
        let facial_hair = create_facial_hair(&db, "Goatee", Decimal::from(10)).await;
        let dying = create_dying(&db, "Copper", Some("#B87333")).await;
        Fixture {
            service: BookingService::new(db.clone()),
            db,
            client_id: client.id,
            hairdresser_id: hairdresser.id,
            hairstyle_id: hairstyle.id,
            facial_hair_id: facial_hair.id,
            dying_id: dying.id,
        }
    }

    fn booking(f: &Fixture) -> AppointmentUpsertRequest {
        AppointmentUpsertRequest {
            user_id: f.client_id,
            hairdresser_id: f.hairdresser_id,
            status_id: None,
            appointment_date: Utc.with_ymd_and_hms(2024, 5, 10, 14, 0, 0).unwrap(),
            hairstyle_id: None,
            facial_hair_id: None,
            dying_id: None,
            is_active: true,
        }
    }

    async fn outbox_rows(db: &DatabaseConnection) -> Vec<notification_outbox::Model> {
        notification_outbox::Entity::find().all(db).await.unwrap()
    }

    #[tokio::test]
    async fn price_is_derived_and_status_forced_to_reserved() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        request.facial_hair_id = Some(f.facial_hair_id);
        request.status_id = Some(AppointmentStatus::Completed.id());

        let created = f.service.appointments().create(request).await.unwrap();
        assert_eq!(created.final_price, Decimal::from(28));
        assert_eq!(created.status_id, AppointmentStatus::Reserved.id());
        assert_eq!(created.status_name, "Reserved");
        assert_eq!(created.hairstyle_name.as_deref(), Some("Bob"));
        assert_eq!(created.hairdresser_name, "stylist Tester");
    }

    #[tokio::test]
    async fn dye_adds_surcharge() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        request.dying_id = Some(f.dying_id);

        let created = f.service.appointments().create(request).await.unwrap();
        assert_eq!(created.final_price, Decimal::from(28));
        assert_eq!(created.dying_hex_code.as_deref(), Some("#B87333"));
    }

    #[tokio::test]
    async fn booking_without_service_is_rejected() {
        let f = fixture().await;
        let err = f.service.appointments().create(booking(&f)).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));
        assert!(outbox_rows(&f.db).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.user_id = 999;
        request.dying_id = Some(f.dying_id);

        let err = f.service.appointments().create(request).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn hairdresser_must_hold_role() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairdresser_id = f.client_id;
        request.dying_id = Some(f.dying_id);
        let err = f.service.appointments().create(request.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));

        request.hairdresser_id = 999;
        let err = f.service.appointments().create(request).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));

        let count = appointment::Entity::find().count(&f.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn booking_and_cancel_queue_one_notification_each() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        let created = f.service.appointments().create(request).await.unwrap();

        let rows = outbox_rows(&f.db).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_type, "appointment_created");

        let cancelled = f.service.cancel(created.id).await.unwrap();
        assert_eq!(cancelled.status_id, AppointmentStatus::Cancelled.id());
        assert_eq!(cancelled.status_name, "Cancelled");

        let rows = outbox_rows(&f.db).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].event_type, "appointment_cancelled");
        let message: EventMessage = serde_json::from_str(&rows[1].payload).unwrap();
        let payload = message.event.appointment();
        assert_eq!(payload.appointment_id, created.id);
        assert_eq!(payload.hairdresser_email, "stylist@salon.test");
        assert_eq!(payload.status_name, "Cancelled");
    }

    #[tokio::test]
    async fn complete_queues_nothing() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.facial_hair_id = Some(f.facial_hair_id);
        let created = f.service.appointments().create(request).await.unwrap();

        let completed = f.service.complete(created.id).await.unwrap();
        assert_eq!(completed.status_id, AppointmentStatus::Completed.id());
        assert_eq!(outbox_rows(&f.db).await.len(), 1);
    }

    #[tokio::test]
    async fn actions_require_active_appointment() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        request.is_active = false;
        let created = f.service.appointments().create(request).await.unwrap();

        let err = f.service.cancel(created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));
        let err = f.service.complete(created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::DomainRule(_)));

        let err = f.service.cancel(999).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_recomputes_price_and_applies_status() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        let created = f.service.appointments().create(request.clone()).await.unwrap();

        request.hairstyle_id = None;
        request.dying_id = Some(f.dying_id);
        request.status_id = Some(AppointmentStatus::Completed.id());
        let updated = f
            .service
            .appointments()
            .update(created.id, request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.final_price, Decimal::from(10));
        assert_eq!(updated.status_id, AppointmentStatus::Completed.id());
    }

    #[tokio::test]
    async fn full_text_matches_client_or_hairdresser_name() {
        let f = fixture().await;
        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        let created = f.service.appointments().create(request).await.unwrap();

        let search = |token: &str| AppointmentSearch {
            paging: SearchPaging {
                fts: Some(token.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        for token in ["clie", "styl", "Tester"] {
            let found = f.service.appointments().search(&search(token)).await.unwrap();
            assert_eq!(found.items.len(), 1, "token {token}");
            assert_eq!(found.items[0].id, created.id);
        }

        let none = f
            .service
            .appointments()
            .search(&search("zzz-no-such-name"))
            .await
            .unwrap();
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn hairdresser_without_email_is_not_notified() {
        let f = fixture().await;
        let stylist = crate::infrastructure::database::entities::user::Entity::find_by_id(f.hairdresser_id)
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        let mut stylist = stylist.into_active_model();
        stylist.email = Set(String::new());
        stylist.update(&f.db).await.unwrap();

        let mut request = booking(&f);
        request.hairstyle_id = Some(f.hairstyle_id);
        f.service.appointments().create(request).await.unwrap();
        assert!(outbox_rows(&f.db).await.is_empty());
    }
}
