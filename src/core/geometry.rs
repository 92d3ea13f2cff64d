//! Continuous 2-D geometry: points, axis-aligned rectangles, segment sampling.

use serde::{Deserialize, Serialize};

/// Number of evenly spaced parameters used when sampling a segment.
/// The two endpoints are skipped, leaving 23 interior probes.
pub const SEGMENT_SAMPLES: usize = 25;

/// A point or vector in arena coordinates. Serialises as `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    /// Point at parameter `t` on the segment from `self` to `other`.
    #[must_use]
    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        self + (other - self).scale(t)
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        (len > 0.0).then(|| self.scale(1.0 / len))
    }

    /// Clamp both axes into `[0, limit]`.
    #[must_use]
    pub fn clamp_to(self, limit: f64) -> Vec2 {
        Vec2::new(self.x.clamp(0.0, limit), self.y.clamp(0.0, limit))
    }

    /// True if both axes differ by at most `tolerance`.
    #[must_use]
    pub fn approx_eq(self, other: Vec2, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Vec2::new(x, y)
    }
}

impl From<Vec2> for [f64; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle. Containment is inclusive on every edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        self.x_min <= p.x && p.x <= self.x_max && self.y_min <= p.y && p.y <= self.y_max
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }

    /// True if the rectangle is well-formed (min <= max on both axes).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x_min <= self.x_max && self.y_min <= self.y_max
    }
}

/// Interior sample points of the segment `from -> to`.
///
/// Endpoints are excluded so an agent standing next to a wall is not
/// blocked by its own tile.
pub fn segment_samples(from: Vec2, to: Vec2) -> impl Iterator<Item = Vec2> {
    let last = (SEGMENT_SAMPLES - 1) as f64;
    (1..SEGMENT_SAMPLES - 1).map(move |i| from.lerp(to, i as f64 / last))
}
