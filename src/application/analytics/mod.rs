//! Read-only rollups over orders and appointments

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{Datelike, Months, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::application::crud::load_map;
use crate::domain::analytics::{
    AnalyticsResponse, DailyAnalytics, HairdresserAnalytics, TopDying, TopFacialHair, TopHairstyle,
    TopProduct,
};
use crate::domain::booking::DYE_SURCHARGE;
use crate::infrastructure::database::entities::{
    appointment, dying, facial_hair, hairstyle, order, order_item, product,
};
use crate::shared::{DomainError, DomainResult};

const TOP_N: usize = 3;

/// Sums `(count, amount)` per key, keeping keys in first-seen order
fn tally<K: Copy + Eq + Hash>(rows: impl IntoIterator<Item = (K, i64, Decimal)>) -> Vec<(K, i64, Decimal)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, i64, Decimal)> = Vec::new();
    for (key, count, amount) in rows {
        match index.get(&key) {
            Some(&i) => {
                totals[i].1 += count;
                totals[i].2 += amount;
            }
            None => {
                index.insert(key, totals.len());
                totals.push((key, count, amount));
            }
        }
    }
    totals
}

/// Highest counts first; equal counts keep their first-seen order
fn top(mut totals: Vec<(i32, i64, Decimal)>) -> Vec<(i32, i64, Decimal)> {
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(TOP_N);
    totals
}

pub struct AnalyticsService {
    db: DatabaseConnection,
}

impl AnalyticsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Top three products, hairstyles, facial hair styles and dye colours
    pub async fn top3(&self) -> DomainResult<AnalyticsResponse> {
        let appointments = appointment::Entity::find()
            .filter(appointment::Column::IsActive.eq(true))
            .order_by_asc(appointment::Column::Id)
            .all(&self.db)
            .await?;

        let response = AnalyticsResponse {
            top3_products: self.top_products().await?,
            top3_hairstyles: self.top_hairstyles(&appointments).await?,
            top3_facial_hairs: self.top_facial_hairs(&appointments).await?,
            top3_dying_colors: self.top_dyings(&appointments).await?,
        };
        debug!(appointments = appointments.len(), "Analytics computed");
        Ok(response)
    }

    async fn top_products(&self) -> DomainResult<Vec<TopProduct>> {
        let active_orders: Vec<i32> = order::Entity::find()
            .filter(order::Column::IsActive.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        if active_orders.is_empty() {
            return Ok(Vec::new());
        }

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(active_orders))
            .order_by_asc(order_item::Column::Id)
            .all(&self.db)
            .await?;
        let products = load_map::<product::Entity, _>(
            &self.db,
            product::Column::Id,
            items.iter().map(|i| i.product_id).collect(),
            |p| p.id,
        )
        .await?;

        let totals = tally(
            items
                .iter()
                .filter(|i| products.contains_key(&i.product_id))
                .map(|i| (i.product_id, i64::from(i.quantity), i.total_price)),
        );

        Ok(top(totals)
            .into_iter()
            .filter_map(|(id, quantity, revenue)| {
                products.get(&id).map(|p| TopProduct {
                    product_id: id,
                    product_name: p.name.clone(),
                    product_image: p.picture.clone(),
                    total_quantity_sold: quantity,
                    total_revenue: revenue,
                })
            })
            .collect())
    }

    async fn top_hairstyles(&self, appointments: &[appointment::Model]) -> DomainResult<Vec<TopHairstyle>> {
        let hairstyles = load_map::<hairstyle::Entity, _>(
            &self.db,
            hairstyle::Column::Id,
            appointments.iter().filter_map(|a| a.hairstyle_id).collect(),
            |h| h.id,
        )
        .await?;

        let totals = tally(
            appointments
                .iter()
                .filter_map(|a| a.hairstyle_id)
                .filter_map(|id| hairstyles.get(&id).map(|h| (id, 1, h.price))),
        );

        Ok(top(totals)
            .into_iter()
            .filter_map(|(id, count, revenue)| {
                hairstyles.get(&id).map(|h| TopHairstyle {
                    hairstyle_id: id,
                    hairstyle_name: h.name.clone(),
                    hairstyle_image: h.image.clone(),
                    total_appointments: count,
                    total_revenue: revenue,
                })
            })
            .collect())
    }

    async fn top_facial_hairs(&self, appointments: &[appointment::Model]) -> DomainResult<Vec<TopFacialHair>> {
        let facial_hairs = load_map::<facial_hair::Entity, _>(
            &self.db,
            facial_hair::Column::Id,
            appointments.iter().filter_map(|a| a.facial_hair_id).collect(),
            |f| f.id,
        )
        .await?;

        let totals = tally(
            appointments
                .iter()
                .filter_map(|a| a.facial_hair_id)
                .filter_map(|id| facial_hairs.get(&id).map(|f| (id, 1, f.price))),
        );

        Ok(top(totals)
            .into_iter()
            .filter_map(|(id, count, revenue)| {
                facial_hairs.get(&id).map(|f| TopFacialHair {
                    facial_hair_id: id,
                    facial_hair_name: f.name.clone(),
                    facial_hair_image: f.image.clone(),
                    total_appointments: count,
                    total_revenue: revenue,
                })
            })
            .collect())
    }

    async fn top_dyings(&self, appointments: &[appointment::Model]) -> DomainResult<Vec<TopDying>> {
        let dyings = load_map::<dying::Entity, _>(
            &self.db,
            dying::Column::Id,
            appointments.iter().filter_map(|a| a.dying_id).collect(),
            |d| d.id,
        )
        .await?;

        let totals = tally(
            appointments
                .iter()
                .filter_map(|a| a.dying_id)
                .filter(|id| dyings.contains_key(id))
                .map(|id| (id, 1, DYE_SURCHARGE)),
        );

        Ok(top(totals)
            .into_iter()
            .filter_map(|(id, count, revenue)| {
                dyings.get(&id).map(|d| TopDying {
                    dying_id: id,
                    dying_name: d.name.clone(),
                    dying_hex_code: d.hex_code.clone(),
                    total_appointments: count,
                    total_revenue: revenue,
                })
            })
            .collect())
    }

    /// Per-day appointment counts and revenue for one hairdresser and month.
    /// Every calendar day gets a bucket, including empty ones.
    pub async fn hairdresser_monthly(
        &self,
        hairdresser_id: i32,
        year: i32,
        month: u32,
    ) -> DomainResult<HairdresserAnalytics> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::Validation(
                "Month must be between 1 and 12.".to_string(),
            ));
        }
        if !(2000..=2100).contains(&year) {
            return Err(DomainError::Validation(
                "Year must be between 2000 and 2100.".to_string(),
            ));
        }

        let invalid = || DomainError::Validation(format!("Invalid month {}-{}", year, month));
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_month = first_day
            .checked_add_months(Months::new(1))
            .ok_or_else(invalid)?;

        let start = Utc.from_utc_datetime(&first_day.and_hms_opt(0, 0, 0).ok_or_else(invalid)?);
        let end = Utc.from_utc_datetime(&next_month.and_hms_opt(0, 0, 0).ok_or_else(invalid)?);

        let appointments = appointment::Entity::find()
            .filter(appointment::Column::HairdresserId.eq(hairdresser_id))
            .filter(appointment::Column::IsActive.eq(true))
            .filter(appointment::Column::AppointmentDate.gte(start))
            .filter(appointment::Column::AppointmentDate.lt(end))
            .all(&self.db)
            .await?;

        let mut daily_data: Vec<DailyAnalytics> = first_day
            .iter_days()
            .take_while(|d| *d < next_month)
            .map(|date| DailyAnalytics {
                date,
                day_number: date.day(),
                appointment_count: 0,
                revenue: Decimal::ZERO,
            })
            .collect();

        let mut total_revenue = Decimal::ZERO;
        for a in &appointments {
            let day = a.appointment_date.date_naive().day() as usize;
            if let Some(bucket) = daily_data.get_mut(day - 1) {
                bucket.appointment_count += 1;
                bucket.revenue += a.final_price;
            }
            total_revenue += a.final_price;
        }

        Ok(HairdresserAnalytics {
            hairdresser_id,
            year,
            month,
            total_appointments: appointments.len() as i64,
            total_revenue,
            daily_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveModelTrait, Set};

    use crate::application::commerce::{CartService, OrderService};
    use crate::domain::booking::AppointmentStatus;
    use crate::test_utils::{
        create_dying, create_facial_hair, create_hairdresser, create_hairstyle, create_product,
        create_user, test_db,
    };

    async fn appointment_at(
        db: &DatabaseConnection,
        hairdresser_id: i32,
        user_id: i32,
        at: chrono::DateTime<Utc>,
        services: (Option<i32>, Option<i32>, Option<i32>),
        price: Decimal,
        active: bool,
    ) {
        appointment::ActiveModel {
            final_price: Set(price),
            appointment_date: Set(at),
            created_at: Set(Utc::now()),
            is_active: Set(active),
            user_id: Set(user_id),
            hairdresser_id: Set(hairdresser_id),
            status_id: Set(AppointmentStatus::Reserved.id()),
            hairstyle_id: Set(services.0),
            facial_hair_id: Set(services.1),
            dying_id: Set(services.2),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[test]
    fn tally_keeps_first_seen_order_for_ties() {
        let totals = tally([
            (7, 1, Decimal::ONE),
            (3, 1, Decimal::ONE),
            (7, 1, Decimal::ONE),
            (5, 2, Decimal::TWO),
            (3, 1, Decimal::ONE),
            (9, 1, Decimal::ONE),
        ]);
        let ranked = top(totals);
        let ids: Vec<i32> = ranked.iter().map(|t| t.0).collect();
        assert_eq!(ids, vec![7, 3, 5]);
        assert_eq!(ranked[0].2, Decimal::TWO);
    }

    #[tokio::test]
    async fn top_products_from_active_orders() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let a = create_product(&db, "A", Decimal::from(10)).await;
        let b = create_product(&db, "B", Decimal::from(12)).await;
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db.clone());

        carts.add_item(user.id, a.id, 1).await.unwrap();
        carts.add_item(user.id, b.id, 3).await.unwrap();
        orders.create_order_from_cart(user.id).await.unwrap();

        let analytics = AnalyticsService::new(db).top3().await.unwrap();
        assert_eq!(analytics.top3_products.len(), 2);
        assert_eq!(analytics.top3_products[0].product_name, "B");
        assert_eq!(analytics.top3_products[0].total_quantity_sold, 3);
        assert_eq!(analytics.top3_products[0].total_revenue, Decimal::from(36));
        assert!(analytics.top3_hairstyles.is_empty());
    }

    #[tokio::test]
    async fn service_rankings_use_catalog_price_and_surcharge() {
        let db = test_db().await;
        let client = create_user(&db, "client").await;
        let stylist = create_hairdresser(&db, "stylist").await;
        let bob = create_hairstyle(&db, "Bob", Decimal::from(18)).await;
        let pixie = create_hairstyle(&db, "Pixie", Decimal::from(20)).await;
        let goatee = create_facial_hair(&db, "Goatee", Decimal::from(10)).await;
        let copper = create_dying(&db, "Copper", None).await;
        let now = Utc::now();

        for services in [
            (Some(pixie.id), None, Some(copper.id)),
            (Some(bob.id), Some(goatee.id), None),
            (Some(bob.id), None, Some(copper.id)),
        ] {
            appointment_at(&db, stylist.id, client.id, now, services, Decimal::ZERO, true).await;
        }
        // Inactive appointments are ignored
        appointment_at(&db, stylist.id, client.id, now, (Some(pixie.id), None, None), Decimal::ZERO, false).await;

        let analytics = AnalyticsService::new(db).top3().await.unwrap();
        let hairstyles = &analytics.top3_hairstyles;
        assert_eq!(hairstyles.len(), 2);
        assert_eq!(hairstyles[0].hairstyle_name, "Bob");
        assert_eq!(hairstyles[0].total_appointments, 2);
        assert_eq!(hairstyles[0].total_revenue, Decimal::from(36));
        assert_eq!(hairstyles[1].total_appointments, 1);

        assert_eq!(analytics.top3_facial_hairs[0].total_revenue, Decimal::from(10));
        assert_eq!(analytics.top3_dying_colors[0].total_appointments, 2);
        assert_eq!(analytics.top3_dying_colors[0].total_revenue, Decimal::from(20));
    }

    #[tokio::test]
    async fn monthly_dashboard_has_bucket_per_day() {
        let db = test_db().await;
        let client = create_user(&db, "client").await;
        let stylist = create_hairdresser(&db, "stylist").await;
        let other = create_hairdresser(&db, "other").await;

        let feb = |day, hour| Utc.with_ymd_and_hms(2024, 2, day, hour, 0, 0).unwrap();
        let none = (None, None, None);
        appointment_at(&db, stylist.id, client.id, feb(3, 9), none, Decimal::from(28), true).await;
        appointment_at(&db, stylist.id, client.id, feb(3, 15), none, Decimal::from(10), true).await;
        appointment_at(&db, stylist.id, client.id, feb(29, 23), none, Decimal::from(18), true).await;
        appointment_at(&db, stylist.id, client.id, feb(10, 9), none, Decimal::from(99), false).await;
        appointment_at(&db, other.id, client.id, feb(10, 9), none, Decimal::from(50), true).await;
        appointment_at(
            &db,
            stylist.id,
            client.id,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            none,
            Decimal::from(40),
            true,
        )
        .await;

        let dashboard = AnalyticsService::new(db)
            .hairdresser_monthly(stylist.id, 2024, 2)
            .await
            .unwrap();
        assert_eq!(dashboard.daily_data.len(), 29);
        assert_eq!(dashboard.total_appointments, 3);
        assert_eq!(dashboard.total_revenue, Decimal::from(56));
        assert_eq!(dashboard.daily_data[2].appointment_count, 2);
        assert_eq!(dashboard.daily_data[2].revenue, Decimal::from(38));
        assert_eq!(dashboard.daily_data[28].day_number, 29);
        assert_eq!(dashboard.daily_data[28].appointment_count, 1);
        assert_eq!(dashboard.daily_data[0].appointment_count, 0);
    }

    #[tokio::test]
    async fn month_and_year_are_validated() {
        let service = AnalyticsService::new(test_db().await);
        assert!(matches!(
            service.hairdresser_monthly(1, 2024, 13).await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            service.hairdresser_monthly(1, 2024, 0).await.unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            service.hairdresser_monthly(1, 1999, 5).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }
}
