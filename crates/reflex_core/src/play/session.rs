use super::combo::ComboScript;
use crate::clock::Timestamp;
use crate::geometry::{Detection, Rect, ZoneId, ZoneSet};
use crate::matcher::{matches, MatchPolicy};
use crate::overlay::{self, Overlay, TargetBox, TextLine};
use serde::Serialize;
use std::time::Duration;

/// Progress through the combo script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionCursor {
    /// Current step, always `< combo.len()`
    pub step: usize,
    /// When the current step started waiting for its hit
    pub hit_start: Option<Timestamp>,
    /// When the current pass started
    pub pass_start: Option<Timestamp>,
    /// Fastest completed pass this run
    pub best_pass: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub zone: ZoneId,
    pub step: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassResult {
    pub elapsed: Duration,
    pub best: Duration,
    pub new_best: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayUpdate {
    pub hit: Option<Hit>,
    pub pass: Option<PassResult>,
}

#[derive(Debug, Clone)]
pub struct PlaySession {
    zones: ZoneSet,
    combo: ComboScript,
    hit_tolerance: f32,
    cursor: SessionCursor,
}

impl PlaySession {
    pub fn new(zones: ZoneSet, combo: ComboScript, hit_tolerance: f32) -> Self {
        Self { zones, combo, hit_tolerance, cursor: SessionCursor::default() }
    }

    pub fn cursor(&self) -> &SessionCursor {
        &self.cursor
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn best_pass(&self) -> Option<Duration> {
        self.cursor.best_pass
    }

    pub fn target_zone(&self) -> ZoneId {
        self.combo.zone_at(self.cursor.step)
    }

    pub fn target_rect(&self) -> &Rect {
        self.zones.get(self.target_zone())
    }

    /// Check the tracked box against the current step's zone.
    pub fn on_frame(&mut self, now: Timestamp, observed: Option<&Rect>) -> PlayUpdate {
        let mut update = PlayUpdate::default();
        let hit_start = *self.cursor.hit_start.get_or_insert(now);
        let pass_start = *self.cursor.pass_start.get_or_insert(now);

        let zone = self.target_zone();
        let Some(observed) = observed else {
            return update;
        };
        if !matches(MatchPolicy::Contained, self.zones.get(zone), observed, self.hit_tolerance) {
            return update;
        }

        let hit = Hit { zone, step: self.cursor.step, elapsed: now.since(hit_start) };
        log::info!("Time to hit {}: {:.2}s", zone, hit.elapsed.as_secs_f64());
        update.hit = Some(hit);
        self.cursor.hit_start = None;
        self.cursor.step += 1;

        if self.cursor.step >= self.combo.len() {
            let elapsed = now.since(pass_start);
            let new_best = self.cursor.best_pass.map_or(true, |best| elapsed < best);
            if new_best {
                self.cursor.best_pass = Some(elapsed);
            }
            let best = self.cursor.best_pass.unwrap_or(elapsed);
            log::info!("Total session time: {:.2}s", elapsed.as_secs_f64());
            update.pass = Some(PassResult { elapsed, best, new_best });

            self.cursor.pass_start = None;
            self.cursor.step = 0;
        }
        update
    }

    /// Target box and labels, plus every detection grouped by class.
    pub fn overlay(&self, detections: &[Detection]) -> Overlay {
        let zone = self.target_zone();
        let mut out = Overlay {
            boxes: overlay::group_by_class(detections),
            target: Some(TargetBox { zone, rect: *self.zones.get(zone) }),
            texts: vec![TextLine::at(zone.label(), overlay::TITLE_POS)],
        };
        if let Some(best) = self.cursor.best_pass {
            out.texts.push(TextLine::at(overlay::best_pass_text(best), overlay::BEST_PASS_POS));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ZONE_COUNT;

    /// Six 1x1 squares on a row, 100px apart.
    fn unit_squares() -> ZoneSet {
        let mut zones = [Rect::default(); ZONE_COUNT];
        for (i, zone) in zones.iter_mut().enumerate() {
            let x = 100.0 * i as f32;
            *zone = Rect::new(x, 50.0, x + 1.0, 51.0);
        }
        ZoneSet::new(zones)
    }

    fn session() -> PlaySession {
        PlaySession::new(unit_squares(), ComboScript::default(), 2.0)
    }

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_first_frame_starts_timers() {
        let mut s = session();
        let update = s.on_frame(at(40), None);

        assert_eq!(update, PlayUpdate::default());
        assert_eq!(s.cursor().hit_start, Some(at(40)));
        assert_eq!(s.cursor().pass_start, Some(at(40)));
        assert_eq!(s.cursor().step, 0);
    }

    #[test]
    fn test_miss_does_not_advance() {
        let mut s = session();
        let wrong = *unit_squares().get(ZoneId::Cross);
        s.on_frame(at(0), Some(&wrong));
        assert_eq!(s.cursor().step, 0);
        assert_eq!(s.cursor().hit_start, Some(at(0)));
    }

    #[test]
    fn test_hit_advances_and_times() {
        let mut s = session();
        s.on_frame(at(0), None);
        let jab = *unit_squares().get(ZoneId::Jab);

        let update = s.on_frame(at(750), Some(&jab));
        assert_eq!(
            update.hit,
            Some(Hit { zone: ZoneId::Jab, step: 0, elapsed: Duration::from_millis(750) })
        );
        assert_eq!(s.cursor().step, 1);
        assert_eq!(s.cursor().hit_start, None);
        assert_eq!(s.target_zone(), ZoneId::Cross);

        // Next step's timer starts on the following frame
        s.on_frame(at(800), None);
        assert_eq!(s.cursor().hit_start, Some(at(800)));
        assert_eq!(s.cursor().pass_start, Some(at(0)));
    }

    #[test]
    fn test_hit_inside_inflated_zone() {
        let mut s = session();
        let glove = Rect::new(-1.5, 49.0, 2.5, 52.0);
        assert!(s.on_frame(at(0), Some(&glove)).hit.is_some());
    }

    #[test]
    fn test_full_pass_wraps_and_records_best() {
        let zones = unit_squares();
        let mut s = session();
        let mut t = 0;
        let mut steps = Vec::new();
        let mut pass = None;

        for &zone in ComboScript::default().steps() {
            steps.push(s.cursor().step);
            t += 100;
            pass = s.on_frame(at(t), Some(zones.get(zone))).pass;
        }

        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(s.cursor().step, 0);
        assert_eq!(s.cursor().pass_start, None);
        // Timers started on the first hit frame, so the pass spans 7 gaps
        let expected = Duration::from_millis(700);
        assert_eq!(pass, Some(PassResult { elapsed: expected, best: expected, new_best: true }));
        assert_eq!(s.best_pass(), Some(expected));
    }

    #[test]
    fn test_best_pass_only_improves() {
        let zones = unit_squares();
        let mut s = session();
        let mut t = 0;
        let mut run_pass = |s: &mut PlaySession, gap: u64| {
            s.on_frame(at(t), None);
            let mut last = None;
            for &zone in ComboScript::default().steps() {
                t += gap;
                last = s.on_frame(at(t), Some(zones.get(zone))).pass;
            }
            last.unwrap()
        };

        let first = run_pass(&mut s, 500);
        assert!(first.new_best);
        let slower = run_pass(&mut s, 900);
        assert!(!slower.new_best);
        assert_eq!(slower.best, Duration::from_millis(4000));
        let faster = run_pass(&mut s, 200);
        assert!(faster.new_best);
        assert_eq!(s.best_pass(), Some(Duration::from_millis(1600)));
    }

    #[test]
    fn test_overlay_shows_target_and_best() {
        let zones = unit_squares();
        let mut s = session();
        let o = s.overlay(&[]);
        assert_eq!(o.text(0), Some("JAB"));
        assert_eq!(o.target.map(|t| t.rect), Some(*zones.get(ZoneId::Jab)));
        assert_eq!(o.texts.len(), 1);

        s.on_frame(at(0), None);
        for (i, &zone) in ComboScript::default().steps().iter().enumerate() {
            s.on_frame(at(250 * (i as u64 + 1)), Some(zones.get(zone)));
        }
        let o = s.overlay(&[Detection::new(Rect::default(), 0.9)]);
        assert_eq!(o.text(1), Some("FASTEST SESSION: 2.00s"));
        assert_eq!(o.boxes.len(), 1);
    }
}
