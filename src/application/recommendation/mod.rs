//! Product recommendation
//!
//! A matrix factorisation model trained once in the background on purchase
//! history, blended with manufacturer and category preferences. Until a
//! model is published, recommendations come from the preference heuristic.

pub mod model;
mod service;
mod store;
mod trainer;

pub use model::{FeedbackEntry, MatrixFactorization};
pub use service::RecommendationService;
pub use store::{ModelStore, SharedModelStore};
pub use trainer::{load_feedback, train_model, RecommenderTrainer, TrainingError};
