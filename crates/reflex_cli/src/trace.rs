//! Recorded detection traces.
//!
//! One JSON object per line:
//! `{"t_ms": 1200, "detections": [{"rect": [x1, y1, x2, y2], "confidence": 0.9}]}`
//! or `{"t_ms": 1300, "error": "timeout"}` for a frame the camera failed to deliver.
//! Blank lines and lines starting with `#` are ignored.

use anyhow::{bail, Context, Result};
use reflex_core::{
    CancelFlag, Detection, Detector, FrameError, FrameSource, ManualClock, Overlay, Rect,
    Renderer, Timestamp,
};
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TraceLine {
    t_ms: u64,
    #[serde(default)]
    detections: Vec<TraceDetection>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TraceDetection {
    rect: [f32; 4],
    confidence: f32,
    #[serde(default)]
    class_id: u32,
}

impl TraceDetection {
    fn into_detection(self) -> Detection {
        Detection::new(Rect::from_coords(self.rect), self.confidence).with_class(self.class_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub t_ms: u64,
    pub result: Result<Vec<Detection>, FrameError>,
}

pub fn parse_trace(text: &str) -> Result<Vec<TraceFrame>> {
    let mut frames: Vec<TraceFrame> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: TraceLine = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid trace record", idx + 1))?;

        if let Some(prev) = frames.last() {
            if parsed.t_ms < prev.t_ms {
                bail!("line {}: timestamp {} goes backwards", idx + 1, parsed.t_ms);
            }
        }

        let result = match parsed.error.as_deref() {
            None => Ok(parsed.detections.into_iter().map(TraceDetection::into_detection).collect()),
            Some("timeout") => Err(FrameError::Timeout),
            Some(other) => Err(FrameError::Capture(other.to_string())),
        };
        frames.push(TraceFrame { t_ms: parsed.t_ms, result });
    }
    Ok(frames)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceFrame>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    parse_trace(&text)
}

/// Plays trace frames back as if captured live, moving the clock to each
/// frame's timestamp. Requests cancellation once the last frame is handed out.
pub struct TraceSource {
    frames: VecDeque<TraceFrame>,
    clock: ManualClock,
    cancel: CancelFlag,
}

impl TraceSource {
    pub fn new(frames: Vec<TraceFrame>, clock: ManualClock, cancel: CancelFlag) -> Self {
        if frames.is_empty() {
            cancel.cancel();
        }
        Self { frames: frames.into(), clock, cancel }
    }
}

impl FrameSource for TraceSource {
    type Frame = Vec<Detection>;

    fn capture(&mut self, _timeout: Duration) -> Result<Self::Frame, FrameError> {
        let Some(frame) = self.frames.pop_front() else {
            self.cancel.cancel();
            return Err(FrameError::Timeout);
        };
        self.clock.set(Timestamp::from_millis(frame.t_ms));
        if self.frames.is_empty() {
            self.cancel.cancel();
        }
        frame.result
    }

    fn convert_to_display(&mut self, frame: Self::Frame) -> Result<Self::Frame, FrameError> {
        Ok(frame)
    }
}

/// The recorded boxes already are the detector output.
pub struct RecordedDetector;

impl Detector<Vec<Detection>> for RecordedDetector {
    fn detect(&mut self, frame: &Vec<Detection>) -> Result<Vec<Detection>, FrameError> {
        Ok(frame.clone())
    }

    fn max_bounding_boxes(&self) -> usize {
        usize::MAX
    }

    fn num_classes(&self) -> usize {
        1
    }
}

/// Logs overlay text instead of drawing it.
#[derive(Default)]
pub struct LogRenderer {
    last_texts: Vec<String>,
}

impl Renderer<Vec<Detection>> for LogRenderer {
    fn render(&mut self, _frame: &mut Vec<Detection>, overlay: &Overlay) {
        let texts: Vec<String> = overlay.texts.iter().map(|t| t.text.clone()).collect();
        if texts != self.last_texts {
            log::debug!("overlay: {}", texts.join(" | "));
            self.last_texts = texts;
        }
    }
}
