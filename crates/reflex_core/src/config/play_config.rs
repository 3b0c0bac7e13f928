use crate::geometry::ZONE_COUNT;
use serde::{Deserialize, Serialize};

/// Zone indices of the default drill: jab, cross, jab, jab, cross, jab, cross, left hook.
pub const DEFAULT_COMBO: [usize; 8] = [0, 1, 0, 0, 1, 0, 1, 2];

/// Play session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Slack added on every side of a zone for the hit test (px)
    pub hit_tolerance: f32,
    /// Zone indices the player works through, repeated forever
    pub combo: Vec<usize>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self { hit_tolerance: 2.0, combo: DEFAULT_COMBO.to_vec() }
    }
}

impl PlayConfig {
    pub(crate) fn invalid_combo_index(&self) -> Option<usize> {
        self.combo.iter().copied().find(|idx| *idx >= ZONE_COUNT)
    }
}
