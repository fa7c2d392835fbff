//! Background training of the recommender model

use std::collections::HashMap;
use std::time::Duration;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use super::model::{normalize, FeedbackEntry, MatrixFactorization};
use super::store::SharedModelStore;
use crate::config::RecommenderSection;
use crate::infrastructure::database::entities::{order, order_item};
use crate::shared::{DomainError, ShutdownSignal};

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Training task failed: {0}")]
    Join(#[from] JoinError),
}

/// Total quantity per (user, product) over active orders
pub async fn load_feedback(db: &DatabaseConnection) -> Result<Vec<FeedbackEntry>, DomainError> {
    let buyers: HashMap<i32, i32> = order::Entity::find()
        .filter(order::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|o| (o.id, o.user_id))
        .collect();
    if buyers.is_empty() {
        return Ok(Vec::new());
    }

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(buyers.keys().copied().collect::<Vec<_>>()))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    let mut index: HashMap<(i32, i32), usize> = HashMap::new();
    let mut entries: Vec<FeedbackEntry> = Vec::new();
    for item in items {
        let Some(&user_id) = buyers.get(&item.order_id) else {
            continue;
        };
        let key = (user_id, item.product_id);
        match index.get(&key) {
            Some(&i) => entries[i].label += f64::from(item.quantity),
            None => {
                index.insert(key, entries.len());
                entries.push(FeedbackEntry {
                    user_id,
                    product_id: item.product_id,
                    label: f64::from(item.quantity),
                });
            }
        }
    }
    Ok(entries)
}

/// Runs one training pass and publishes the result. Returns whether a
/// model was produced; with no purchase data the store is left empty.
pub async fn train_model(
    db: &DatabaseConnection,
    store: &SharedModelStore,
    params: &RecommenderSection,
) -> Result<bool, TrainingError> {
    let _guard = store.lock_training().await;

    let entries = normalize(load_feedback(db).await?);
    if entries.is_empty() {
        store.publish(None);
        info!("🧠 No purchase history, recommender left untrained");
        return Ok(false);
    }

    let triples = entries.len();
    let params = params.clone();
    let model = tokio::task::spawn_blocking(move || MatrixFactorization::train(&entries, &params)).await?;

    let trained = model.is_some();
    if let Some(m) = &model {
        info!(
            triples,
            users = m.user_count(),
            products = m.product_count(),
            "🧠 Recommender model trained"
        );
    }
    store.publish(model);
    Ok(trained)
}

/// Trains the model once, a fixed delay after start-up
pub struct RecommenderTrainer {
    db: DatabaseConnection,
    store: SharedModelStore,
    config: RecommenderSection,
}

impl RecommenderTrainer {
    pub fn new(db: DatabaseConnection, store: SharedModelStore, config: RecommenderSection) -> Self {
        Self { db, store, config }
    }

    pub fn start(self, shutdown: ShutdownSignal) -> JoinHandle<()> {
        tokio::spawn(async move {
            let delay = Duration::from_secs(self.config.training_delay_secs);
            info!("🧠 Recommender training scheduled in {}s", delay.as_secs());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.notified().wait() => {
                    warn!("🧠 Shutdown before recommender training, skipped");
                    return;
                }
            }

            if let Err(e) = train_model(&self.db, &self.store, &self.config).await {
                error!(error = %e, "Recommender training failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::application::commerce::{CartService, OrderService};
    use crate::application::recommendation::ModelStore;
    use crate::test_utils::{create_product, create_user, test_db};

    #[tokio::test]
    async fn no_orders_means_no_model() {
        let db = test_db().await;
        let store = ModelStore::shared();
        let trained = train_model(&db, &store, &RecommenderSection::default()).await.unwrap();
        assert!(!trained);
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn feedback_sums_quantities_per_user_and_product() {
        let db = test_db().await;
        let user = create_user(&db, "client").await;
        let gel = create_product(&db, "Gel", Decimal::from(10)).await;
        let wax = create_product(&db, "Wax", Decimal::from(12)).await;
        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db.clone());

        carts.add_item(user.id, gel.id, 2).await.unwrap();
        orders.create_order_from_cart(user.id).await.unwrap();
        carts.add_item(user.id, gel.id, 2).await.unwrap();
        carts.add_item(user.id, wax.id, 1).await.unwrap();
        orders.create_order_from_cart(user.id).await.unwrap();

        let feedback = load_feedback(&db).await.unwrap();
        assert_eq!(feedback.len(), 2);
        assert_eq!(feedback[0].product_id, gel.id);
        assert_eq!(feedback[0].label, 4.0);
        assert_eq!(feedback[1].label, 1.0);

        let store = ModelStore::shared();
        assert!(train_model(&db, &store, &RecommenderSection::default()).await.unwrap());
        assert!(store.current().is_some());
    }

    #[tokio::test]
    async fn trainer_stops_on_shutdown() {
        let db = test_db().await;
        let store = ModelStore::shared();
        let shutdown = ShutdownSignal::new();
        let config = RecommenderSection {
            training_delay_secs: 3600,
            ..Default::default()
        };

        let handle = RecommenderTrainer::new(db, store.clone(), config).start(shutdown.clone());
        shutdown.trigger();
        handle.await.unwrap();
        assert!(store.current().is_none());
    }
}
