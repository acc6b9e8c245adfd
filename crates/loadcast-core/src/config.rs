//! loadcast.toml configuration parser.
//!
//! Every section and field is optional; missing values take the
//! defaults below, which reproduce the service's documented behavior.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadcastConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `loadcast.redb`.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/loadcast"),
        }
    }
}

impl StorageConfig {
    pub const DB_FILE: &'static str = "loadcast.redb";

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(Self::DB_FILE)
    }
}

/// Where retraining runs relative to the prediction request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    /// Retrain on the request path before predicting.
    #[default]
    Inline,
    /// Hand retraining to a worker thread and predict from the current model.
    Background,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Samples needed before a request triggers a refit.
    pub min_training_samples: usize,
    /// Distance of the forecast point past the last sample.
    pub horizon_minutes: i64,
    pub training: TrainingMode,
    /// Jobs the background trainer may hold before dropping new ones.
    pub training_queue: usize,
    pub load_min: f64,
    pub load_max: f64,
    pub confidence_base: f64,
    pub confidence_cap: f64,
    pub confidence_divisor: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            min_training_samples: 12,
            horizon_minutes: 5,
            training: TrainingMode::Inline,
            training_queue: 4,
            load_min: 0.0,
            load_max: 100.0,
            confidence_base: 0.5,
            confidence_cap: 0.9,
            confidence_divisor: 300.0,
        }
    }
}

/// Answer given when no model is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub predicted_load: f64,
    pub confidence: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            predicted_load: 30.0,
            confidence: 0.1,
        }
    }
}

impl LoadcastConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: LoadcastConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings that would break the prediction bounds.
    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.model;
        if m.load_min > m.load_max {
            anyhow::bail!("model.load_min ({}) exceeds model.load_max ({})", m.load_min, m.load_max);
        }
        if m.confidence_divisor <= 0.0 {
            anyhow::bail!("model.confidence_divisor must be positive");
        }
        if !(0.0..=1.0).contains(&m.confidence_cap) || !(0.0..=1.0).contains(&self.fallback.confidence) {
            anyhow::bail!("confidence values must lie in [0, 1]");
        }
        if m.horizon_minutes < 0 {
            anyhow::bail!("model.horizon_minutes must not be negative");
        }
        Ok(())
    }
}
