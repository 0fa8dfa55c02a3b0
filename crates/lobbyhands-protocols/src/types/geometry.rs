//! Screen geometry and color primitives.

use serde::{Deserialize, Serialize};

/// A point on screen, in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True if either axis differs from `other` by more than `tolerance` pixels.
    pub fn is_far_from(&self, other: Position, tolerance: i32) -> bool {
        (self.x - other.x).abs() > tolerance || (self.y - other.y).abs() > tolerance
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A rectangular screen region in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Translate a point relative to the region origin into absolute coordinates.
    pub fn to_absolute(&self, rel_x: u32, rel_y: u32) -> Position {
        Position::new(self.x + rel_x as i32, self.y + rel_y as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A region expressed as percentages of the screen size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PercentRegion {
    /// Resolve against a concrete screen size.
    pub fn resolve(&self, screen_width: u32, screen_height: u32) -> Region {
        let pct = |value: f32, total: u32| ((value / 100.0) * total as f32) as u32;
        Region::new(
            pct(self.left, screen_width) as i32,
            pct(self.top, screen_height) as i32,
            pct(self.width, screen_width),
            pct(self.height, screen_height),
        )
    }
}

/// Insets from each screen edge, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentInsets {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl PercentInsets {
    /// Resolve to the region left over after cutting the insets.
    pub fn resolve(&self, screen_width: u32, screen_height: u32) -> Region {
        let pct = |value: f32, total: u32| ((value / 100.0) * total as f32) as u32;
        let top = pct(self.top, screen_height);
        let bottom = pct(self.bottom, screen_height);
        let left = pct(self.left, screen_width);
        let right = pct(self.right, screen_width);
        Region::new(
            left as i32,
            top as i32,
            screen_width.saturating_sub(left + right),
            screen_height.saturating_sub(top + bottom),
        )
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Per-channel comparison with an absolute tolerance.
    pub fn matches(&self, other: Rgb, tolerance: u8) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a.abs_diff(*b) <= tolerance)
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
