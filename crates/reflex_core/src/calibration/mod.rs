//! Zone calibration
//!
//! Learns the six zone rectangles by watching the player hold the glove still
//! inside each zone in turn. A zone commits only after a continuous hold of
//! the configured length; a run of missed detections or a drifted box starts
//! the hold over.

pub mod controller;

pub use controller::{
    CalibrationController, CalibrationCursor, CalibrationEvent, CalibrationUpdate, HoldResetReason,
};
