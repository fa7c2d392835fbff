use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::store::SharedModelStore;
use crate::application::catalog::product_views;
use crate::domain::catalog::ProductResponse;
use crate::infrastructure::database::entities::{order, order_item, product};
use crate::shared::{DomainError, DomainResult};

/// Boost for a candidate sharing a manufacturer or category with past purchases
const PREFERENCE_BOOST: f64 = 0.3;

#[derive(Debug, Default)]
struct PurchaseHistory {
    purchased: HashSet<i32>,
    manufacturers: HashSet<i32>,
    categories: HashSet<i32>,
}

impl PurchaseHistory {
    fn heuristic_score(&self, p: &product::Model) -> u32 {
        let mut score = 0;
        if self.manufacturers.contains(&p.manufacturer_id) {
            score += 2;
        }
        if self.categories.contains(&p.category_id) {
            score += 2;
        }
        score
    }

    fn boost(&self, p: &product::Model) -> f64 {
        let mut boost = 0.0;
        if self.manufacturers.contains(&p.manufacturer_id) {
            boost += PREFERENCE_BOOST;
        }
        if self.categories.contains(&p.category_id) {
            boost += PREFERENCE_BOOST;
        }
        boost
    }
}

/// Picks `count` products by preference score with a random tie-break
fn rank_heuristic<R: Rng>(
    history: &PurchaseHistory,
    active: Vec<product::Model>,
    count: usize,
    rng: &mut R,
) -> Vec<product::Model> {
    if history.purchased.is_empty() {
        let mut shuffled = active;
        shuffled.shuffle(rng);
        shuffled.truncate(count);
        return shuffled;
    }

    let unseen: Vec<product::Model> = active
        .iter()
        .filter(|p| !history.purchased.contains(&p.id))
        .cloned()
        .collect();
    let preferred: Vec<product::Model> = unseen
        .iter()
        .filter(|p| history.heuristic_score(p) > 0)
        .cloned()
        .collect();
    // Preferred unseen, then any unseen, then everything active
    let candidates = if !preferred.is_empty() {
        preferred
    } else if !unseen.is_empty() {
        unseen
    } else {
        active
    };

    let mut ranked: Vec<(u32, u64, product::Model)> = candidates
        .into_iter()
        .map(|p| (history.heuristic_score(&p), rng.gen(), p))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.into_iter().take(count).map(|(_, _, p)| p).collect()
}

/// Hybrid product recommender: model scores when a model is published,
/// preference heuristic otherwise.
pub struct RecommendationService {
    db: DatabaseConnection,
    store: SharedModelStore,
    top_n: usize,
}

impl RecommendationService {
    pub fn new(db: DatabaseConnection, store: SharedModelStore, top_n: usize) -> Self {
        Self { db, store, top_n }
    }

    async fn history(&self, user_id: i32) -> DomainResult<PurchaseHistory> {
        let order_ids: Vec<i32> = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::IsActive.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        if order_ids.is_empty() {
            return Ok(PurchaseHistory::default());
        }

        let purchased: HashSet<i32> = order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| i.product_id)
            .collect();

        let bought = product::Entity::find()
            .filter(product::Column::Id.is_in(purchased.iter().copied().collect::<Vec<_>>()))
            .all(&self.db)
            .await?;

        Ok(PurchaseHistory {
            manufacturers: bought.iter().map(|p| p.manufacturer_id).collect(),
            categories: bought.iter().map(|p| p.category_id).collect(),
            purchased,
        })
    }

    async fn active_products(&self) -> DomainResult<Vec<product::Model>> {
        Ok(product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Up to `top_n` products for the user
    pub async fn recommend(&self, user_id: i32) -> DomainResult<Vec<ProductResponse>> {
        let Some(model) = self.store.current() else {
            debug!(user_id, "No recommender model, using heuristic");
            return self.recommend_heuristic(user_id, self.top_n).await;
        };

        let history = self.history(user_id).await?;
        let active = self.active_products().await?;

        let unseen: Vec<product::Model> = active
            .iter()
            .filter(|p| !history.purchased.contains(&p.id))
            .cloned()
            .collect();
        let candidates = if unseen.is_empty() { active } else { unseen };
        if candidates.is_empty() {
            return self.recommend_heuristic(user_id, self.top_n).await;
        }

        let mut scored: Vec<(f64, product::Model)> = candidates
            .into_iter()
            .map(|p| (model.score(user_id, p.id) + history.boost(&p), p))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        let chosen: Vec<product::Model> = scored
            .into_iter()
            .take(self.top_n)
            .map(|(_, p)| p)
            .collect();

        product_views(&self.db, chosen).await
    }

    /// Preference-based picks used before a model exists.
    /// Fails only when there are no active products at all.
    pub async fn recommend_heuristic(&self, user_id: i32, count: usize) -> DomainResult<Vec<ProductResponse>> {
        let history = self.history(user_id).await?;
        let active = self.active_products().await?;
        if active.is_empty() {
            return Err(DomainError::DomainRule(
                "No products available for recommendation.".to_string(),
            ));
        }

        let chosen = rank_heuristic(&history, active, count, &mut rand::thread_rng());
        product_views(&self.db, chosen).await
    }
}
