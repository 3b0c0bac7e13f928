//! What the renderer should draw on top of the current frame.
//!
//! The core never draws. It decides which boxes, which target and which text
//! lines are shown, and hands that to the renderer as an [`Overlay`].

use crate::geometry::{Detection, Rect, ZoneId};
use serde::Serialize;
use std::time::Duration;

/// Screen anchor of the zone name line.
pub const TITLE_POS: (u32, u32) = (10, 10);
/// Screen anchor of the best pass line in play.
pub const BEST_PASS_POS: (u32, u32) = (10, 30);
/// Screen anchor of the hold countdown during calibration.
pub const HOLD_POS: (u32, u32) = (10, 40);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub x: u32,
    pub y: u32,
}

impl TextLine {
    pub fn at(text: impl Into<String>, (x, y): (u32, u32)) -> Self {
        Self { text: text.into(), x, y }
    }
}

/// Consecutive detector boxes sharing one class, drawn in a single call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub class_id: u32,
    pub boxes: Vec<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetBox {
    pub zone: ZoneId,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overlay {
    pub boxes: Vec<BoxGroup>,
    pub target: Option<TargetBox>,
    pub texts: Vec<TextLine>,
}

impl Overlay {
    pub fn text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(|t| t.text.as_str())
    }
}

/// Split detections into runs of equal `class_id`, preserving detector order.
pub fn group_by_class(detections: &[Detection]) -> Vec<BoxGroup> {
    let mut groups: Vec<BoxGroup> = Vec::new();
    for det in detections {
        match groups.last_mut() {
            Some(group) if group.class_id == det.class_id => group.boxes.push(det.rect),
            _ => groups.push(BoxGroup { class_id: det.class_id, boxes: vec![det.rect] }),
        }
    }
    groups
}

pub fn calibrate_title(zone: ZoneId) -> String {
    format!("CALIBRATE: {}", zone.label())
}

/// Countdown text. The shown second counts from 1 and stops at the target.
pub fn hold_prompt(min_hold_secs: u64, held: Duration) -> String {
    let shown = (1 + held.as_secs()).min(min_hold_secs);
    format!("HOLD FOR {min_hold_secs}s ({shown}s)")
}

pub fn best_pass_text(best: Duration) -> String {
    format!("FASTEST SESSION: {:.2}s", best.as_secs_f64())
}
