//! # reflex_core - Speed Reflex Trainer Engine
//!
//! Decision logic of the reflex trainer: a detector watches a glove, the
//! player first calibrates six punch zones by holding the glove still in each,
//! then hits those zones in a scripted combo as fast as possible.
//!
//! ## Features
//! - Zone calibration with hold timing, drift and miss resets
//! - Combo play with per-hit and per-pass timing and a best-pass record
//! - One-line persisted zone geometry, written atomically
//! - Injected clock, so every timing path is deterministic under test
//!
//! Capture, detection and drawing are collaborators behind the traits in
//! [`runtime`]; the core only decides what happens and what to show.

pub mod calibration;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod matcher;
pub mod overlay;
pub mod play;
pub mod runtime;
pub mod save;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::GameConfig;
pub use error::{ConfigError, FrameError};
pub use geometry::{Detection, Point, Rect, ZoneId, ZoneSet, ZONE_COUNT};
pub use matcher::{matches, MatchPolicy};
pub use overlay::Overlay;
pub use runtime::{CancelFlag, Detector, FrameLoop, FrameSource, LoopStats, Renderer};
pub use save::{GeometryError, GeometryStore};
pub use state::{FrameEvent, FrameOutcome, GamePhase, GameStateMachine};
