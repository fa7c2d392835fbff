//! Application configuration
//!
//! Loaded from a TOML file (`~/.config/salon-core/config.toml` by default,
//! or the path in `SALON_CONFIG`). Every section falls back to defaults
//! so a partial file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub recommender: RecommenderSection,
    pub notifications: NotificationSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./salon.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseSection {
    /// `DATABASE_URL` wins over the file value
    pub fn connection_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Hyper-parameters for the one-class matrix factorisation model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderSection {
    /// Delay between start-up and the single training pass
    pub training_delay_secs: u64,
    pub factors: usize,
    pub iterations: usize,
    pub learning_rate: f64,
    pub lambda: f64,
    pub alpha: f64,
    pub c: f64,
    /// Unobserved cells sampled per observed cell in each epoch
    pub negative_samples: usize,
    pub seed: u64,
    /// Candidates returned by `recommend`
    pub top_n: usize,
}

impl Default for RecommenderSection {
    fn default() -> Self {
        Self {
            training_delay_secs: 5,
            factors: 8,
            iterations: 50,
            learning_rate: 0.05,
            lambda: 0.025,
            alpha: 0.01,
            c: 0.00001,
            negative_samples: 4,
            seed: 42,
            top_n: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSection {
    pub relay_interval_secs: u64,
    pub batch_size: u64,
    /// Rows that failed this many times are no longer picked up
    pub max_attempts: i32,
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            relay_interval_secs: 10,
            batch_size: 50,
            max_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            shutdown_timeout: 30,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("salon-core")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [logging]
            level = "debug"

            [recommender]
            iterations = 10
            "#,
        )
        .unwrap();

        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.recommender.iterations, 10);
        assert_eq!(cfg.recommender.lambda, 0.025);
        assert_eq!(cfg.notifications.max_attempts, 5);
        assert_eq!(cfg.server.shutdown_timeout, 30);
    }

    #[test]
    fn empty_file_is_default() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.database.url, DatabaseSection::default().url);
        assert_eq!(cfg.recommender.top_n, 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn default_path_ends_with_crate_dir() {
        let path = default_config_path();
        assert!(path.ends_with("salon-core/config.toml"));
    }
}
