use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Zone acquisition tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Detections at or below this confidence count as misses
    pub confidence_threshold: f32,
    /// Consecutive misses that throw away the current hold
    pub max_consecutive_misses: u32,
    /// How long the glove must stay put before the zone commits (ms)
    pub min_hold_ms: u64,
    /// Per-coordinate drift allowed between consecutive frames (px)
    pub hold_tolerance: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            max_consecutive_misses: 5,
            min_hold_ms: 3_000,
            hold_tolerance: 15.0,
        }
    }
}

impl CalibrationConfig {
    pub fn min_hold(&self) -> Duration {
        Duration::from_millis(self.min_hold_ms)
    }

    /// Whole seconds shown in the "HOLD FOR" prompt.
    pub fn min_hold_secs(&self) -> u64 {
        self.min_hold_ms / 1000
    }
}
