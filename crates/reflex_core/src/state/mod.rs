//! Game State Machine
//!
//! Owns the current phase and routes every frame to the matching controller.
//! The phase is a tagged variant, so calibration progress and the play cursor
//! can never be reached from the wrong phase. The only transition is
//! Calibration → Play, taken when the last zone commits.

mod events;

pub use events::{FrameEvent, FrameOutcome};

use crate::calibration::{CalibrationController, CalibrationEvent};
use crate::clock::Timestamp;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::geometry::{Detection, ZoneSet};
use crate::play::{ComboScript, PlaySession};
use crate::save::GeometryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Calibration,
    Play,
}

#[derive(Debug, Clone)]
enum PhaseState {
    Calibration(CalibrationController),
    Play(PlaySession),
}

#[derive(Debug)]
pub struct GameStateMachine {
    state: PhaseState,
    store: GeometryStore,
    combo: ComboScript,
    hit_tolerance: f32,
    /// Remaining save attempts for geometry that failed to persist
    unsaved_retries: Option<u32>,
    retry_limit: u32,
}

impl GameStateMachine {
    /// Start from the persisted record when it loads, otherwise calibrate.
    pub fn start(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_store(config, GeometryStore::new(&config.store.path))
    }

    pub fn with_store(config: &GameConfig, store: GeometryStore) -> Result<Self, ConfigError> {
        config.validate()?;
        let combo = ComboScript::from_indices(&config.play.combo)?;

        let state = match store.load() {
            Ok(zones) => {
                log::info!("Retrieved all zones, entering play mode");
                PhaseState::Play(PlaySession::new(zones, combo.clone(), config.play.hit_tolerance))
            }
            Err(err) => {
                log::info!("Unable to use stored zones ({err}), entering calibration mode");
                PhaseState::Calibration(CalibrationController::new(config.calibration.clone()))
            }
        };

        Ok(Self {
            state,
            store,
            combo,
            hit_tolerance: config.play.hit_tolerance,
            unsaved_retries: None,
            retry_limit: config.store.save_retry_limit,
        })
    }

    pub fn phase(&self) -> GamePhase {
        match self.state {
            PhaseState::Calibration(_) => GamePhase::Calibration,
            PhaseState::Play(_) => GamePhase::Play,
        }
    }

    /// Complete geometry, available once in play.
    pub fn zones(&self) -> Option<&ZoneSet> {
        match &self.state {
            PhaseState::Calibration(_) => None,
            PhaseState::Play(session) => Some(session.zones()),
        }
    }

    pub fn calibration(&self) -> Option<&CalibrationController> {
        match &self.state {
            PhaseState::Calibration(ctrl) => Some(ctrl),
            PhaseState::Play(_) => None,
        }
    }

    pub fn session(&self) -> Option<&PlaySession> {
        match &self.state {
            PhaseState::Calibration(_) => None,
            PhaseState::Play(session) => Some(session),
        }
    }

    /// Geometry is in memory but not yet on disk.
    pub fn has_unsaved_geometry(&self) -> bool {
        self.unsaved_retries.is_some()
    }

    /// Run one frame of game logic. Only the first detection is tracked.
    pub fn on_frame(&mut self, now: Timestamp, detections: &[Detection]) -> FrameOutcome {
        let mut events = Vec::new();
        let primary = detections.first();
        self.retry_pending_save(&mut events);

        let (overlay, completed) = match &mut self.state {
            PhaseState::Calibration(ctrl) => {
                let update = ctrl.on_frame(now, primary);
                events.extend(update.event.map(|event| match event {
                    CalibrationEvent::HoldReset { zone, reason } => {
                        FrameEvent::HoldReset { zone, reason }
                    }
                    CalibrationEvent::ZoneCommitted { zone, rect } => {
                        FrameEvent::ZoneCommitted { zone, rect }
                    }
                }));
                (ctrl.overlay(now, update.accepted), update.completed)
            }
            PhaseState::Play(session) => {
                let update = session.on_frame(now, primary.map(|d| &d.rect));
                if let Some(hit) = update.hit {
                    events.push(FrameEvent::Hit {
                        zone: hit.zone,
                        step: hit.step,
                        elapsed: hit.elapsed,
                    });
                }
                if let Some(pass) = update.pass {
                    events.push(FrameEvent::PassComplete {
                        elapsed: pass.elapsed,
                        best: pass.best,
                        new_best: pass.new_best,
                    });
                }
                (session.overlay(detections), None)
            }
        };

        if let Some(zones) = completed {
            events.push(self.finish_calibration(zones));
        }

        FrameOutcome { overlay, events }
    }

    fn finish_calibration(&mut self, zones: ZoneSet) -> FrameEvent {
        log::info!("Writing zone geometry to {:?}", self.store.path());
        let persisted = match self.store.save(&zones) {
            Ok(()) => true,
            Err(err) => {
                log::error!(
                    "Failed to save zone geometry ({err}); playing with unsaved zones, {} retries left",
                    self.retry_limit
                );
                self.unsaved_retries = Some(self.retry_limit);
                false
            }
        };

        self.state =
            PhaseState::Play(PlaySession::new(zones, self.combo.clone(), self.hit_tolerance));
        log::info!("Calibration complete, entering play mode");
        FrameEvent::CalibrationComplete { persisted }
    }

    fn retry_pending_save(&mut self, events: &mut Vec<FrameEvent>) {
        let Some(remaining) = self.unsaved_retries else {
            return;
        };
        let Some(zones) = self.zones().copied() else {
            return;
        };
        if remaining == 0 {
            log::error!("Giving up on saving zone geometry; recalibration will be needed next start");
            self.unsaved_retries = None;
            return;
        }

        match self.store.save(&zones) {
            Ok(()) => {
                self.unsaved_retries = None;
                events.push(FrameEvent::GeometrySaved);
            }
            Err(err) => {
                log::warn!("Retrying zone geometry save failed: {err}");
                self.unsaved_retries = Some(remaining - 1);
            }
        }
    }
}
