//! One-class matrix factorisation over implicit purchase feedback
//!
//! Observed (user, product) cells are fitted to their normalised label with
//! weight 1. Each epoch also samples `negative_samples` unobserved cells per
//! observed one and fits them to the small constant `c` with weight `alpha`,
//! which keeps the model from scoring everything as bought. Work per epoch
//! grows with the number of purchases, not with users times products.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::RecommenderSection;

/// One training triple; `label` is in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackEntry {
    pub user_id: i32,
    pub product_id: i32,
    pub label: f64,
}

/// Scales labels by the largest one so they land in `[0, 1]`
pub fn normalize(mut entries: Vec<FeedbackEntry>) -> Vec<FeedbackEntry> {
    let max = entries.iter().map(|e| e.label).fold(0.0_f64, f64::max);
    if max > 0.0 {
        for entry in &mut entries {
            entry.label = (entry.label / max).min(1.0);
        }
    }
    entries
}

#[derive(Debug, Clone)]
pub struct MatrixFactorization {
    user_index: HashMap<i32, usize>,
    product_index: HashMap<i32, usize>,
    user_factors: Vec<Vec<f64>>,
    product_factors: Vec<Vec<f64>>,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl MatrixFactorization {
    /// Fits the model with SGD. `None` when there is nothing to learn from.
    pub fn train(entries: &[FeedbackEntry], params: &RecommenderSection) -> Option<Self> {
        if entries.is_empty() || params.factors == 0 {
            return None;
        }

        let mut user_index = HashMap::new();
        let mut product_index = HashMap::new();
        for entry in entries {
            let next = user_index.len();
            user_index.entry(entry.user_id).or_insert(next);
            let next = product_index.len();
            product_index.entry(entry.product_id).or_insert(next);
        }

        let mut observed: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for entry in entries {
            observed.insert(
                (user_index[&entry.user_id], product_index[&entry.product_id]),
                entry.label,
            );
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let scale = 1.0 / (params.factors as f64).sqrt();
        let mut init = |rows: usize| -> Vec<Vec<f64>> {
            (0..rows)
                .map(|_| (0..params.factors).map(|_| rng.gen::<f64>() * scale).collect())
                .collect()
        };
        let mut user_factors = init(user_index.len());
        let mut product_factors = init(product_index.len());

        let users = user_index.len();
        let products = product_index.len();
        let unobserved = users * products - observed.len();
        let negatives = (observed.len() * params.negative_samples).min(unobserved);

        // Observed cells every epoch plus a fresh sample of unobserved ones
        let mut cells: Vec<(usize, usize, f64, f64)> = Vec::with_capacity(observed.len() + negatives);
        for _ in 0..params.iterations {
            cells.clear();
            cells.extend(observed.iter().map(|(&(u, p), &label)| (u, p, label, 1.0)));
            let mut drawn = 0;
            let mut attempts = 0;
            while drawn < negatives && attempts < negatives * 10 {
                attempts += 1;
                let cell = (rng.gen_range(0..users), rng.gen_range(0..products));
                if !observed.contains_key(&cell) {
                    cells.push((cell.0, cell.1, params.c, params.alpha));
                    drawn += 1;
                }
            }
            cells.shuffle(&mut rng);

            for &(u, p, target, weight) in &cells {
                let error = target - dot(&user_factors[u], &product_factors[p]);
                for k in 0..params.factors {
                    let uk = user_factors[u][k];
                    let pk = product_factors[p][k];
                    user_factors[u][k] +=
                        params.learning_rate * (weight * error * pk - params.lambda * uk);
                    product_factors[p][k] +=
                        params.learning_rate * (weight * error * uk - params.lambda * pk);
                }
            }
        }

        Some(Self {
            user_index,
            product_index,
            user_factors,
            product_factors,
        })
    }

    /// Predicted affinity; 0 for users or products the model never saw
    pub fn score(&self, user_id: i32, product_id: i32) -> f64 {
        match (self.user_index.get(&user_id), self.product_index.get(&product_id)) {
            (Some(&u), Some(&p)) => dot(&self.user_factors[u], &self.product_factors[p]),
            _ => 0.0,
        }
    }

    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    pub fn product_count(&self) -> usize {
        self.product_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: i32, product_id: i32, label: f64) -> FeedbackEntry {
        FeedbackEntry {
            user_id,
            product_id,
            label,
        }
    }

    #[test]
    fn labels_scaled_by_maximum() {
        let normalized = normalize(vec![entry(1, 1, 4.0), entry(1, 2, 2.0), entry(2, 1, 1.0)]);
        let labels: Vec<f64> = normalized.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![1.0, 0.5, 0.25]);
    }

    #[test]
    fn empty_feedback_trains_nothing() {
        assert!(MatrixFactorization::train(&[], &RecommenderSection::default()).is_none());
    }

    #[test]
    fn bought_items_outscore_unseen_ones() {
        let entries = normalize(vec![
            entry(1, 10, 3.0),
            entry(1, 11, 3.0),
            entry(2, 10, 2.0),
            entry(2, 11, 3.0),
            entry(3, 12, 3.0),
        ]);
        let params = RecommenderSection {
            iterations: 500,
            alpha: 0.5,
            ..Default::default()
        };
        let model = MatrixFactorization::train(&entries, &params).unwrap();

        assert_eq!(model.user_count(), 3);
        assert_eq!(model.product_count(), 3);
        assert!(model.score(1, 10) > model.score(1, 12));
        assert!(model.score(3, 12) > model.score(3, 10));
        assert_eq!(model.score(99, 10), 0.0);
    }

    #[test]
    fn sparse_catalog_trains_without_dense_sweep() {
        let entries: Vec<FeedbackEntry> = (0..3000).map(|i| entry(i, 10_000 + i, 1.0)).collect();
        let params = RecommenderSection {
            iterations: 3,
            ..Default::default()
        };
        let model = MatrixFactorization::train(&entries, &params).unwrap();
        assert_eq!(model.user_count(), 3000);
        assert_eq!(model.product_count(), 3000);
    }

    #[test]
    fn fully_observed_matrix_draws_no_negatives() {
        let entries = vec![entry(1, 1, 1.0), entry(1, 2, 1.0), entry(2, 1, 1.0), entry(2, 2, 1.0)];
        let model = MatrixFactorization::train(&entries, &RecommenderSection::default()).unwrap();
        assert!(model.score(1, 1) > 0.0);
    }

    #[test]
    fn same_seed_same_model() {
        let entries = normalize(vec![entry(1, 1, 1.0), entry(2, 2, 1.0), entry(1, 2, 0.5)]);
        let params = RecommenderSection::default();
        let a = MatrixFactorization::train(&entries, &params).unwrap();
        let b = MatrixFactorization::train(&entries, &params).unwrap();
        assert_eq!(a.score(1, 2), b.score(1, 2));
    }
}
