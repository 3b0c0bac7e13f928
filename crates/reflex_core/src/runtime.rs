//! Frame loop and the collaborators it drives.
//!
//! One iteration per captured frame, run to completion before the next
//! capture. A failed capture, conversion or detection skips game logic for
//! that frame and the loop carries on. Cancellation is cooperative: the flag
//! is checked at the top of every iteration.

use crate::clock::Clock;
use crate::error::FrameError;
use crate::geometry::Detection;
use crate::overlay::Overlay;
use crate::state::{FrameEvent, GameStateMachine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Camera (or any other frame producer).
pub trait FrameSource {
    type Frame;

    fn capture(&mut self, timeout: Duration) -> Result<Self::Frame, FrameError>;

    /// Colorspace conversion into what the detector and renderer consume.
    fn convert_to_display(&mut self, frame: Self::Frame) -> Result<Self::Frame, FrameError>;
}

/// Object detector. Boxes come back ordered by class partition.
pub trait Detector<F> {
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>, FrameError>;

    fn max_bounding_boxes(&self) -> usize;

    fn num_classes(&self) -> usize;
}

pub trait Renderer<F> {
    fn render(&mut self, frame: &mut F, overlay: &Overlay);
}

/// Shared stop request, set from outside (e.g. an interrupt handler).
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub skipped: u64,
    pub hits: u64,
    pub passes: u64,
    pub zones_committed: u64,
}

impl LoopStats {
    fn record(&mut self, events: &[FrameEvent]) {
        for event in events {
            match event {
                FrameEvent::Hit { .. } => self.hits += 1,
                FrameEvent::PassComplete { .. } => self.passes += 1,
                FrameEvent::ZoneCommitted { .. } => self.zones_committed += 1,
                _ => {}
            }
        }
    }
}

pub struct FrameLoop<'a, S, D, R, C> {
    pub source: &'a mut S,
    pub detector: &'a mut D,
    pub renderer: &'a mut R,
    pub clock: &'a C,
    pub capture_timeout: Duration,
}

impl<'a, S, D, R, C> FrameLoop<'a, S, D, R, C>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    R: Renderer<S::Frame>,
    C: Clock,
{
    /// Run until `cancel` is set.
    pub fn run(&mut self, game: &mut GameStateMachine, cancel: &CancelFlag) -> LoopStats {
        self.run_with(game, cancel, |_| {})
    }

    /// Run until `cancel` is set, handing every frame's events to `on_events`.
    pub fn run_with(
        &mut self,
        game: &mut GameStateMachine,
        cancel: &CancelFlag,
        mut on_events: impl FnMut(&[FrameEvent]),
    ) -> LoopStats {
        log::info!(
            "Detector reports up to {} boxes across {} classes",
            self.detector.max_bounding_boxes(),
            self.detector.num_classes()
        );

        let mut stats = LoopStats::default();
        while !cancel.is_cancelled() {
            stats.frames += 1;
            match self.step(game) {
                Ok(events) => {
                    stats.record(&events);
                    on_events(&events);
                }
                Err(err) => {
                    log::warn!("Skipping frame {}: {err}", stats.frames);
                    stats.skipped += 1;
                }
            }
        }
        log::info!("Frame loop stopped after {} frames", stats.frames);
        stats
    }

    fn step(&mut self, game: &mut GameStateMachine) -> Result<Vec<FrameEvent>, FrameError> {
        let raw = self.source.capture(self.capture_timeout)?;
        let mut frame = self.source.convert_to_display(raw)?;
        let detections = self.detector.detect(&frame)?;

        let outcome = game.on_frame(self.clock.now(), &detections);
        self.renderer.render(&mut frame, &outcome.overlay);
        Ok(outcome.events)
    }
}
