//! Rectangle matching policies.
//!
//! | Policy | Passes when | Used by |
//! |--------|-------------|---------|
//! | `Hold` | at least one corner coordinate moved by `<= threshold` | calibration drift check |
//! | `Tight` | every corner coordinate moved by `< threshold` | strict near-equality |
//! | `Contained` | observed box fits in the zone grown by `threshold` | play hit test |

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// Rejects only when all four coordinates drifted past the threshold.
    Hold,
    /// "Donut" region: all four coordinates within the threshold.
    Tight,
    /// "Cake" region: observed inside the zone inflated on every side.
    Contained,
}

/// Absolute per-coordinate differences in persisted order.
fn coord_diffs(zone: &Rect, observed: &Rect) -> [f32; 4] {
    let z = zone.coords();
    let o = observed.coords();
    [(z[0] - o[0]).abs(), (z[1] - o[1]).abs(), (z[2] - o[2]).abs(), (z[3] - o[3]).abs()]
}

pub fn matches(policy: MatchPolicy, zone: &Rect, observed: &Rect, threshold: f32) -> bool {
    match policy {
        MatchPolicy::Hold => !coord_diffs(zone, observed).iter().all(|d| *d > threshold),
        MatchPolicy::Tight => coord_diffs(zone, observed).iter().all(|d| *d < threshold),
        MatchPolicy::Contained => {
            let top_left_inside = observed.pt1.x >= zone.pt1.x - threshold
                && observed.pt1.y >= zone.pt1.y - threshold;
            let bottom_right_inside = observed.pt2.x <= zone.pt2.x + threshold
                && observed.pt2.y <= zone.pt2.y + threshold;
            top_left_inside && bottom_right_inside
        }
    }
}
