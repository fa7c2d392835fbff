//! Reference resolution shared by appointment responses and notifications

use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use crate::application::crud::load_map;
use crate::domain::booking::AppointmentResponse;
use crate::domain::events::AppointmentNotification;
use crate::infrastructure::database::entities::{
    appointment, dying, facial_hair, hairstyle, status, user,
};
use crate::shared::DomainResult;

/// Rows referenced by a batch of appointments, loaded one query per table
pub(crate) struct AppointmentRefs {
    users: HashMap<i32, user::Model>,
    statuses: HashMap<i32, status::Model>,
    hairstyles: HashMap<i32, hairstyle::Model>,
    facial_hairs: HashMap<i32, facial_hair::Model>,
    dyings: HashMap<i32, dying::Model>,
}

impl AppointmentRefs {
    pub(crate) async fn load<C: ConnectionTrait>(
        db: &C,
        appointments: &[appointment::Model],
    ) -> DomainResult<Self> {
        let users = load_map::<user::Entity, _>(
            db,
            user::Column::Id,
            appointments
                .iter()
                .flat_map(|a| [a.user_id, a.hairdresser_id])
                .collect(),
            |u| u.id,
        )
        .await?;
        let statuses = load_map::<status::Entity, _>(
            db,
            status::Column::Id,
            appointments.iter().map(|a| a.status_id).collect(),
            |s| s.id,
        )
        .await?;
        let hairstyles = load_map::<hairstyle::Entity, _>(
            db,
            hairstyle::Column::Id,
            appointments.iter().filter_map(|a| a.hairstyle_id).collect(),
            |h| h.id,
        )
        .await?;
        let facial_hairs = load_map::<facial_hair::Entity, _>(
            db,
            facial_hair::Column::Id,
            appointments.iter().filter_map(|a| a.facial_hair_id).collect(),
            |f| f.id,
        )
        .await?;
        let dyings = load_map::<dying::Entity, _>(
            db,
            dying::Column::Id,
            appointments.iter().filter_map(|a| a.dying_id).collect(),
            |d| d.id,
        )
        .await?;

        Ok(Self {
            users,
            statuses,
            hairstyles,
            facial_hairs,
            dyings,
        })
    }

    fn full_name(&self, user_id: i32) -> String {
        self.users
            .get(&user_id)
            .map(user::Model::full_name)
            .unwrap_or_default()
    }

    fn status_name(&self, status_id: i32) -> String {
        self.statuses
            .get(&status_id)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    pub(crate) fn view(&self, a: appointment::Model) -> AppointmentResponse {
        let hairstyle = a.hairstyle_id.and_then(|id| self.hairstyles.get(&id));
        let facial_hair = a.facial_hair_id.and_then(|id| self.facial_hairs.get(&id));
        let dying = a.dying_id.and_then(|id| self.dyings.get(&id));

        AppointmentResponse {
            id: a.id,
            final_price: a.final_price,
            appointment_date: a.appointment_date,
            created_at: a.created_at,
            is_active: a.is_active,
            user_id: a.user_id,
            user_name: self.full_name(a.user_id),
            hairdresser_id: a.hairdresser_id,
            hairdresser_name: self.full_name(a.hairdresser_id),
            status_id: a.status_id,
            status_name: self.status_name(a.status_id),
            hairstyle_id: a.hairstyle_id,
            hairstyle_name: hairstyle.map(|h| h.name.clone()),
            hairstyle_price: hairstyle.map(|h| h.price),
            hairstyle_image: hairstyle.and_then(|h| h.image.clone()),
            facial_hair_id: a.facial_hair_id,
            facial_hair_name: facial_hair.map(|f| f.name.clone()),
            facial_hair_price: facial_hair.map(|f| f.price),
            facial_hair_image: facial_hair.and_then(|f| f.image.clone()),
            dying_id: a.dying_id,
            dying_name: dying.map(|d| d.name.clone()),
            dying_hex_code: dying.and_then(|d| d.hex_code.clone()),
        }
    }

    /// `None` when the hairdresser has no email to notify
    pub(crate) fn notification(&self, a: &appointment::Model) -> Option<AppointmentNotification> {
        let hairdresser = self
            .users
            .get(&a.hairdresser_id)
            .filter(|h| !h.email.trim().is_empty())?;
        let client = self.users.get(&a.user_id);
        let hairstyle = a.hairstyle_id.and_then(|id| self.hairstyles.get(&id));
        let facial_hair = a.facial_hair_id.and_then(|id| self.facial_hairs.get(&id));
        let dying = a.dying_id.and_then(|id| self.dyings.get(&id));

        Some(AppointmentNotification {
            appointment_id: a.id,
            hairdresser_email: hairdresser.email.clone(),
            hairdresser_name: hairdresser.full_name(),
            user_full_name: self.full_name(a.user_id),
            user_email: client.map(|c| c.email.clone()).unwrap_or_default(),
            user_phone_number: client.and_then(|c| c.phone_number.clone()),
            appointment_date: a.appointment_date,
            final_price: a.final_price,
            status_name: self.status_name(a.status_id),
            hairstyle_name: hairstyle.map(|h| h.name.clone()),
            hairstyle_price: hairstyle.map(|h| h.price),
            facial_hair_name: facial_hair.map(|f| f.name.clone()),
            facial_hair_price: facial_hair.map(|f| f.price),
            dying_name: dying.map(|d| d.name.clone()),
            dying_hex_code: dying.and_then(|d| d.hex_code.clone()),
        })
    }
}

/// Denormalised responses for a batch of appointments
pub async fn appointment_views<C: ConnectionTrait>(
    db: &C,
    appointments: Vec<appointment::Model>,
) -> DomainResult<Vec<AppointmentResponse>> {
    let refs = AppointmentRefs::load(db, &appointments).await?;
    Ok(appointments.into_iter().map(|a| refs.view(a)).collect())
}
