use crate::calibration::HoldResetReason;
use crate::geometry::{Rect, ZoneId};
use crate::overlay::Overlay;
use serde::Serialize;
use std::time::Duration;

/// Something observable that happened during a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FrameEvent {
    HoldReset { zone: ZoneId, reason: HoldResetReason },
    ZoneCommitted { zone: ZoneId, rect: Rect },
    /// All zones acquired; `persisted` is false when the record could not be written
    CalibrationComplete { persisted: bool },
    /// A save that failed at completion went through on a later frame
    GeometrySaved,
    Hit { zone: ZoneId, step: usize, elapsed: Duration },
    PassComplete { elapsed: Duration, best: Duration, new_best: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub overlay: Overlay,
    pub events: Vec<FrameEvent>,
}
