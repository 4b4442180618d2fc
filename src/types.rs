use serde::{Deserialize, Serialize};

/// Display color of a breed, resolved once at entity construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Simulation rectangle. Growth keeps one unit of margin from every edge:
/// tips are clamped into `[1, width-1] x [1, height-1]` and a tip touching
/// that margin is no longer "in bounds".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a tip position componentwise into the playable area.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(1.0, self.width - 1.0),
            y.clamp(1.0, self.height - 1.0),
        )
    }

    /// True while the point keeps strictly more than one unit of clearance
    /// from every edge.
    pub fn interior(&self, x: f32, y: f32) -> bool {
        x > 1.0 && x < self.width - 1.0 && y > 1.0 && y < self.height - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_pins_to_margin() {
        let bounds = Bounds::new(800.0, 600.0);
        assert_eq!(bounds.clamp(803.0, 300.0), (799.0, 300.0));
        assert_eq!(bounds.clamp(-5.0, 700.0), (1.0, 599.0));
        assert_eq!(bounds.clamp(400.0, 300.0), (400.0, 300.0));
    }

    #[test]
    fn interior_excludes_the_margin_itself() {
        let bounds = Bounds::new(800.0, 600.0);
        assert!(bounds.interior(400.0, 300.0));
        assert!(!bounds.interior(1.0, 300.0));
        assert!(!bounds.interior(799.0, 300.0));
        assert!(!bounds.interior(400.0, 1.0));
        assert!(!bounds.interior(400.0, 599.0));
        assert!(bounds.interior(1.5, 1.5));
    }
}
