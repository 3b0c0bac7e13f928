//! Pixel-space geometry shared by every phase of the game.
//!
//! Coordinates live in the detector's frame space. A [`Rect`] is stored exactly
//! as the detector reports it: `pt1` is the top-left-ish corner and `pt2` the
//! bottom-right-ish corner. No ordering between the two is enforced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of target zones the player calibrates and hits.
pub const ZONE_COUNT: usize = 6;

/// A point in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pt1: Point,
    pub pt2: Point,
}

impl Rect {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { pt1: Point::new(x1, y1), pt2: Point::new(x2, y2) }
    }

    /// Corners flattened in persisted order: `pt1.x, pt1.y, pt2.x, pt2.y`.
    pub fn coords(&self) -> [f32; 4] {
        [self.pt1.x, self.pt1.y, self.pt2.x, self.pt2.y]
    }

    pub fn from_coords(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    pub fn width(&self) -> f32 {
        self.pt2.x - self.pt1.x
    }

    pub fn height(&self) -> f32 {
        self.pt2.y - self.pt1.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.1},{:.1}), ({:.1},{:.1})", self.pt1.x, self.pt1.y, self.pt2.x, self.pt2.y)
    }
}

/// The six punch targets. Identity is positional; the label is display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    Jab,
    Cross,
    LeftHook,
    RightHook,
    LeftUppercut,
    RightUppercut,
}

impl ZoneId {
    pub const ALL: [ZoneId; ZONE_COUNT] = [
        ZoneId::Jab,
        ZoneId::Cross,
        ZoneId::LeftHook,
        ZoneId::RightHook,
        ZoneId::LeftUppercut,
        ZoneId::RightUppercut,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoneId::Jab => "JAB",
            ZoneId::Cross => "CROSS",
            ZoneId::LeftHook => "LEFT HOOK",
            ZoneId::RightHook => "RIGHT HOOK",
            ZoneId::LeftUppercut => "LEFT UPPERCUT",
            ZoneId::RightUppercut => "RIGHT UPPERCUT",
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete geometry for all six zones.
///
/// Only ever constructed whole: either loaded from the settings record or
/// assembled by calibration once the last zone commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
    zones: [Rect; ZONE_COUNT],
}

impl ZoneSet {
    pub fn new(zones: [Rect; ZONE_COUNT]) -> Self {
        Self { zones }
    }

    pub fn get(&self, zone: ZoneId) -> &Rect {
        &self.zones[zone.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &Rect)> {
        ZoneId::ALL.iter().copied().zip(self.zones.iter())
    }

    pub fn as_array(&self) -> &[Rect; ZONE_COUNT] {
        &self.zones
    }
}

impl Index<ZoneId> for ZoneSet {
    type Output = Rect;

    fn index(&self, zone: ZoneId) -> &Rect {
        &self.zones[zone.index()]
    }
}

impl IndexMut<ZoneId> for ZoneSet {
    fn index_mut(&mut self, zone: ZoneId) -> &mut Rect {
        &mut self.zones[zone.index()]
    }
}

/// One detector output box.
///
/// Class and confidence are kept apart; the play overlay groups boxes by
/// `class_id` and never derives a class from the confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub rect: Rect,
    pub confidence: f32,
    #[serde(default)]
    pub class_id: u32,
}

impl Detection {
    pub fn new(rect: Rect, confidence: f32) -> Self {
        Self { rect, confidence, class_id: 0 }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }
}
