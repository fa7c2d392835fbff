//! Salon Core
//!
//! Runs migrations and hosts the background workers: the one-shot
//! recommender trainer and the booking notification relay.
//! Reads configuration from TOML file (~/.config/salon-core/config.toml).
//!
//! The binary has no request surface. It only warms the recommender model;
//! an embedding server hands the same `SharedModelStore` to
//! `RecommendationService::new` to serve model-backed picks.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use salon_core::application::notifications::NotificationRelay;
use salon_core::application::recommendation::{ModelStore, RecommenderTrainer};
use salon_core::config::AppConfig;
use salon_core::domain::ports::NotificationDispatcher;
use salon_core::infrastructure::database::migrator::Migrator;
use salon_core::infrastructure::notifications::LogDispatcher;
use salon_core::{default_config_path, init_database, DatabaseConfig, ShutdownCoordinator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("SALON_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Salon Core...");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── Background workers ─────────────────────────────────────
    let model_store = ModelStore::shared();
    let trainer = RecommenderTrainer::new(db.clone(), model_store.clone(), app_cfg.recommender.clone())
        .start(shutdown_signal.clone());

    let mut published = model_store.subscribe();
    tokio::spawn(async move {
        while published.changed().await.is_ok() {
            if let Some(model) = published.borrow_and_update().clone() {
                info!(
                    users = model.user_count(),
                    products = model.product_count(),
                    "🧠 Recommender model available"
                );
            }
        }
    });

    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(LogDispatcher);
    let relay = NotificationRelay::new(db.clone(), dispatcher, app_cfg.notifications.clone())
        .start(shutdown_signal.clone());

    info!("🚀 Workers started. Press Ctrl+C to shutdown gracefully.");

    shutdown
        .shutdown_with_cleanup(move || async move {
            if let Err(e) = trainer.await {
                warn!("Recommender trainer task failed: {}", e);
            }
            if let Err(e) = relay.await {
                warn!("Notification relay task failed: {}", e);
            }
        })
        .await;

    if let Err(e) = db.close().await {
        warn!("Failed to close database: {}", e);
    }
    info!("👋 Salon Core stopped");
    Ok(())
}
