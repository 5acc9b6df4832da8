//! Pick results returned by hover resolution.

use glam::Vec3;

/// Draw-space bounds of a picked bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinBounds {
    pub x1: f32,
    pub x2: f32,
    pub y1: f32,
    pub y2: f32,
    pub z1: f32,
    pub z2: f32,
}

impl BinBounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub fn from_corners(lo: Vec3, hi: Vec3) -> Self {
        Self {
            x1: lo.x,
            x2: hi.x,
            y1: lo.y,
            y2: hi.y,
            z1: lo.z,
            z2: hi.z,
        }
    }

    /// Lower corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x1, self.y1, self.z1)
    }

    /// Upper corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x2, self.y2, self.z2)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        0.5 * (self.min() + self.max())
    }

    /// Grows every side by `delta`.
    #[must_use]
    pub fn grown(&self, delta: f32) -> Self {
        Self {
            x1: self.x1 - delta,
            x2: self.x2 + delta,
            y1: self.y1 - delta,
            y2: self.y2 + delta,
            z1: self.z1 - delta,
            z2: self.z2 + delta,
        }
    }

    /// Whether any lower bound lies above its upper bound.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2 || self.z1 > self.z2
    }
}

/// What a hovered intersection resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Flat bin id, or point index for markers.
    pub bin_id: usize,
    /// Bin indices along x, y and z.
    pub bin: [usize; 3],
    /// Bounds for the highlight box.
    pub bounds: BinBounds,
    /// Bin content.
    pub value: f64,
    /// Highlight color.
    pub color: Vec3,
    /// Highlight by recoloring the hit node instead of drawing a box.
    pub use_itself: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_and_center() {
        let b = BinBounds::from_corners(Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0));
        let g = b.grown(0.5);
        assert!((g.x1 + 0.5).abs() < 1e-6);
        assert!((g.z2 - 6.5).abs() < 1e-6);
        assert!(!g.is_inverted());
        assert!(BinBounds::from_corners(Vec3::ONE, Vec3::ZERO).is_inverted());
    }
}
