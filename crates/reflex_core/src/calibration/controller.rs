use crate::clock::Timestamp;
use crate::config::CalibrationConfig;
use crate::geometry::{Detection, Rect, ZoneId, ZoneSet, ZONE_COUNT};
use crate::matcher::{matches, MatchPolicy};
use crate::overlay::{self, BoxGroup, Overlay, TextLine};
use serde::Serialize;
use std::time::Duration;

/// Acquisition progress for the zone currently being calibrated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationCursor {
    /// Index of the zone being acquired, `0..ZONE_COUNT`
    pub zone_index: usize,
    /// Box accepted on the previous detecting frame
    pub last_observed: Option<Rect>,
    /// Consecutive frames without an acceptable detection
    pub misses: u32,
    /// When the current hold began; `None` while not holding
    pub hold_start: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HoldResetReason {
    /// Too many frames in a row without a confident detection
    Misses,
    /// The box moved away from where it was on the previous frame
    Drift,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CalibrationEvent {
    HoldReset { zone: ZoneId, reason: HoldResetReason },
    ZoneCommitted { zone: ZoneId, rect: Rect },
}

/// Result of one calibration frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationUpdate {
    pub event: Option<CalibrationEvent>,
    /// Box accepted this frame, to be drawn
    pub accepted: Option<Rect>,
    /// Full geometry, present only on the frame the last zone commits
    pub completed: Option<ZoneSet>,
}

#[derive(Debug, Clone)]
pub struct CalibrationController {
    config: CalibrationConfig,
    cursor: CalibrationCursor,
    acquired: [Rect; ZONE_COUNT],
}

impl CalibrationController {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config, cursor: CalibrationCursor::default(), acquired: [Rect::default(); ZONE_COUNT] }
    }

    pub fn cursor(&self) -> &CalibrationCursor {
        &self.cursor
    }

    /// Zone awaiting acquisition, `None` once all six have committed.
    pub fn current_zone(&self) -> Option<ZoneId> {
        ZoneId::from_index(self.cursor.zone_index)
    }

    pub fn is_complete(&self) -> bool {
        self.cursor.zone_index >= ZONE_COUNT
    }

    /// How long the current hold has lasted at `now`.
    pub fn held_for(&self, now: Timestamp) -> Option<Duration> {
        self.cursor.hold_start.map(|start| now.since(start))
    }

    /// Feed the primary detection of a frame (if any).
    pub fn on_frame(&mut self, now: Timestamp, detection: Option<&Detection>) -> CalibrationUpdate {
        let mut update = CalibrationUpdate::default();
        let Some(zone) = self.current_zone() else {
            return update;
        };

        let accepted =
            detection.filter(|d| d.confidence > self.config.confidence_threshold).map(|d| d.rect);

        let Some(observed) = accepted else {
            self.cursor.misses += 1;
            if self.cursor.misses >= self.config.max_consecutive_misses {
                log::debug!("{}: {} misses in a row, restarting hold", zone, self.cursor.misses);
                self.cursor.hold_start = None;
                self.cursor.misses = 0;
                self.cursor.last_observed = None;
                update.event = Some(CalibrationEvent::HoldReset { zone, reason: HoldResetReason::Misses });
            }
            return update;
        };

        update.accepted = Some(observed);
        self.cursor.misses = 0;
        let hold_start = *self.cursor.hold_start.get_or_insert(now);

        let drifted = self.cursor.last_observed.is_some_and(|previous| {
            !matches(MatchPolicy::Hold, &previous, &observed, self.config.hold_tolerance)
        });

        if drifted {
            log::debug!("{}: box drifted, restarting hold", zone);
            self.cursor.hold_start = None;
            update.event = Some(CalibrationEvent::HoldReset { zone, reason: HoldResetReason::Drift });
        } else if now.since(hold_start) >= self.config.min_hold() {
            self.acquired[zone.index()] = observed;
            self.cursor.zone_index += 1;
            self.cursor.hold_start = None;
            log::info!("Zone {} calibrated: {}", zone, observed);
            update.event = Some(CalibrationEvent::ZoneCommitted { zone, rect: observed });

            if self.is_complete() {
                update.completed = Some(ZoneSet::new(self.acquired));
            }
        }

        self.cursor.last_observed = Some(observed);
        update
    }

    /// Prompt and countdown for the zone in progress plus the accepted box.
    pub fn overlay(&self, now: Timestamp, accepted: Option<Rect>) -> Overlay {
        let mut out = Overlay::default();
        if let Some(rect) = accepted {
            out.boxes.push(BoxGroup { class_id: 0, boxes: vec![rect] });
        }
        let Some(zone) = self.current_zone() else {
            return out;
        };

        out.texts.push(TextLine::at(overlay::calibrate_title(zone), overlay::TITLE_POS));
        if let Some(held) = self.held_for(now) {
            out.texts.push(TextLine::at(
                overlay::hold_prompt(self.config.min_hold_secs(), held),
                overlay::HOLD_POS,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: u64 = 100;

    fn det(x: f32, y: f32) -> Detection {
        Detection::new(Rect::new(x, y, x + 50.0, y + 60.0), 0.9)
    }

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    /// Feed `frames` identical detections, one every `FRAME_MS`, starting at `start_ms`.
    fn hold(
        ctrl: &mut CalibrationController,
        d: &Detection,
        start_ms: u64,
        frames: u64,
    ) -> Vec<CalibrationUpdate> {
        (0..frames).map(|i| ctrl.on_frame(at(start_ms + i * FRAME_MS), Some(d))).collect()
    }

    #[test]
    fn test_commit_after_min_hold() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        let d = det(100.0, 100.0);

        // Frames at 0..=3000ms: the 31st frame reaches exactly three seconds
        let updates = hold(&mut ctrl, &d, 0, 31);

        let commits: Vec<_> = updates
            .iter()
            .filter(|u| matches!(u.event, Some(CalibrationEvent::ZoneCommitted { .. })))
            .collect();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            updates[30].event,
            Some(CalibrationEvent::ZoneCommitted { zone: ZoneId::Jab, rect: d.rect })
        );
        assert_eq!(ctrl.current_zone(), Some(ZoneId::Cross));
        assert_eq!(ctrl.cursor().hold_start, None);
        assert_eq!(ctrl.cursor().last_observed, Some(d.rect));
    }

    #[test]
    fn test_short_hold_commits_nothing() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        let updates = hold(&mut ctrl, &det(100.0, 100.0), 0, 30);

        assert!(updates.iter().all(|u| u.event.is_none()));
        assert_eq!(ctrl.current_zone(), Some(ZoneId::Jab));
        assert_eq!(ctrl.cursor().hold_start, Some(at(0)));
    }

    #[test]
    fn test_small_jitter_keeps_hold() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        for i in 0..=30u64 {
            let jitter = if i % 2 == 0 { 0.0 } else { 10.0 };
            ctrl.on_frame(at(i * FRAME_MS), Some(&det(100.0 + jitter, 100.0 - jitter)));
        }
        assert_eq!(ctrl.current_zone(), Some(ZoneId::Cross));
    }

    #[test]
    fn test_drift_restarts_hold() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        hold(&mut ctrl, &det(100.0, 100.0), 0, 20);

        let moved = det(200.0, 200.0);
        let update = ctrl.on_frame(at(2000), Some(&moved));
        assert_eq!(
            update.event,
            Some(CalibrationEvent::HoldReset { zone: ZoneId::Jab, reason: HoldResetReason::Drift })
        );
        assert_eq!(ctrl.cursor().hold_start, None);
        assert_eq!(ctrl.cursor().last_observed, Some(moved.rect));

        // Hold restarts from the next frame; 3s later it commits at the new spot
        ctrl.on_frame(at(2100), Some(&moved));
        assert_eq!(ctrl.cursor().hold_start, Some(at(2100)));
        let update = ctrl.on_frame(at(5100), Some(&moved));
        assert_eq!(
            update.event,
            Some(CalibrationEvent::ZoneCommitted { zone: ZoneId::Jab, rect: moved.rect })
        );
    }

    #[test]
    fn test_miss_limit_resets_hold() {
        let config = CalibrationConfig::default();
        let max = config.max_consecutive_misses as u64;
        let mut ctrl = CalibrationController::new(config);
        ctrl.on_frame(at(0), Some(&det(100.0, 100.0)));

        for i in 1..max {
            let update = ctrl.on_frame(at(i * FRAME_MS), None);
            assert!(update.event.is_none());
        }
        // One short of the limit: nothing reset yet
        assert_eq!(ctrl.cursor().misses as u64, max - 1);
        assert_eq!(ctrl.cursor().hold_start, Some(at(0)));
        assert!(ctrl.cursor().last_observed.is_some());

        let update = ctrl.on_frame(at(max * FRAME_MS), None);
        assert_eq!(
            update.event,
            Some(CalibrationEvent::HoldReset { zone: ZoneId::Jab, reason: HoldResetReason::Misses })
        );
        assert_eq!(ctrl.cursor(), &CalibrationCursor::default());
    }

    #[test]
    fn test_low_confidence_counts_as_miss() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        let weak = Detection::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0.6);

        let update = ctrl.on_frame(at(0), Some(&weak));
        assert_eq!(update.accepted, None);
        assert_eq!(ctrl.cursor().misses, 1);
        assert_eq!(ctrl.cursor().hold_start, None);
    }

    #[test]
    fn test_detection_resets_miss_counter() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        ctrl.on_frame(at(0), None);
        ctrl.on_frame(at(100), None);
        ctrl.on_frame(at(200), Some(&det(1.0, 1.0)));
        assert_eq!(ctrl.cursor().misses, 0);
        assert_eq!(ctrl.cursor().hold_start, Some(at(200)));
    }

    #[test]
    fn test_full_calibration_produces_zone_set() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        let mut t = 0;
        let mut completed = None;

        for i in 0..ZONE_COUNT {
            let d = det(100.0 * i as f32 + 50.0, 80.0);
            // Start each zone fresh so the previous box never counts as drift
            for _ in 0..5 {
                ctrl.on_frame(at(t), None);
                t += FRAME_MS;
            }
            for u in hold(&mut ctrl, &d, t, 31) {
                if let Some(zones) = u.completed {
                    completed = Some(zones);
                }
            }
            t += 31 * FRAME_MS;
        }

        assert!(ctrl.is_complete());
        let zones = completed.unwrap();
        assert_eq!(zones[ZoneId::RightUppercut], det(550.0, 80.0).rect);
        assert_eq!(zones[ZoneId::Jab], det(50.0, 80.0).rect);

        // Further frames are ignored
        let update = ctrl.on_frame(at(t), Some(&det(0.0, 0.0)));
        assert_eq!(update, CalibrationUpdate::default());
    }

    #[test]
    fn test_overlay_texts() {
        let mut ctrl = CalibrationController::new(CalibrationConfig::default());
        let idle = ctrl.overlay(at(0), None);
        assert_eq!(idle.text(0), Some("CALIBRATE: JAB"));
        assert_eq!(idle.texts.len(), 1);

        let d = det(10.0, 10.0);
        let update = ctrl.on_frame(at(0), Some(&d));
        let holding = ctrl.overlay(at(1500), update.accepted);
        assert_eq!(holding.text(1), Some("HOLD FOR 3s (2s)"));
        assert_eq!(holding.boxes[0].boxes, vec![d.rect]);
    }
}
