//! # Game Configuration
//!
//! Every tuning constant of the trainer lives here instead of being scattered
//! through the controllers.
//!
//! ## Usage
//! ```rust
//! use reflex_core::config::GameConfig;
//!
//! let config = GameConfig::default();
//! let lenient = GameConfig::lenient();
//! assert!(lenient.calibration.hold_tolerance > config.calibration.hold_tolerance);
//! ```
//!
//! ## Environment Variables
//!
//! - `REFLEX_PROFILE`: Select preset (lenient, strict, default)

mod calibration_config;
mod play_config;

pub use calibration_config::CalibrationConfig;
pub use play_config::{PlayConfig, DEFAULT_COMBO};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the persisted zone record
pub const DEFAULT_SETTINGS_FILE: &str = "game.settings.txt";

/// Where and how zone geometry is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Extra save attempts after a failed write at calibration completion
    pub save_retry_limit: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_SETTINGS_FILE), save_retry_limit: 3 }
    }
}

/// Full trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub calibration: CalibrationConfig,
    pub play: PlayConfig,
    pub store: StoreConfig,
    /// Upper bound on a single frame capture (ms)
    pub capture_timeout_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            play: PlayConfig::default(),
            store: StoreConfig::default(),
            capture_timeout_ms: 1_000,
        }
    }
}

impl GameConfig {
    /// Looser tolerances and a shorter hold, for noisy cameras or first-time players
    pub fn lenient() -> Self {
        let mut cfg = Self::default();
        cfg.calibration.confidence_threshold = 0.45;
        cfg.calibration.max_consecutive_misses = 10;
        cfg.calibration.min_hold_ms = 2_000;
        cfg.calibration.hold_tolerance = 25.0;
        cfg.play.hit_tolerance = 8.0;
        cfg
    }

    /// Tighter hit box and a longer hold
    pub fn strict() -> Self {
        let mut cfg = Self::default();
        cfg.calibration.confidence_threshold = 0.75;
        cfg.calibration.max_consecutive_misses = 3;
        cfg.calibration.min_hold_ms = 4_000;
        cfg.calibration.hold_tolerance = 10.0;
        cfg.play.hit_tolerance = 0.0;
        cfg
    }

    pub fn from_profile(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "lenient" => Self::lenient(),
            "strict" => Self::strict(),
            _ => Self::default(),
        }
    }

    pub fn from_env_or_default() -> Self {
        Self::from_profile(&env::var("REFLEX_PROFILE").unwrap_or_default())
    }

    /// Parse YAML; absent fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_yaml_str(&text)?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(cfg)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cal = &self.calibration;
        if !(0.0..=1.0).contains(&cal.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold must be within [0, 1], got {}",
                cal.confidence_threshold
            )));
        }
        if cal.max_consecutive_misses == 0 {
            return Err(ConfigError::Invalid("max_consecutive_misses must be at least 1".into()));
        }
        for (name, value) in
            [("hold_tolerance", cal.hold_tolerance), ("hit_tolerance", self.play.hit_tolerance)]
        {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.play.combo.is_empty() {
            return Err(ConfigError::Invalid("combo must contain at least one step".into()));
        }
        if let Some(idx) = self.play.invalid_combo_index() {
            return Err(ConfigError::Invalid(format!("combo zone index {idx} is out of range")));
        }
        Ok(())
    }
}
