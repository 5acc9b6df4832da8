//! Hover highlight geometry.

use histoscope_core::{BinBounds, GeometryBuffer, PickResult};
use histoscope_render::Material;

use crate::output::Primitive;
use crate::topology::box_triangles;

/// Bounds grow by this fraction of the draw-box half-width so the highlight
/// never z-fights with the bin it covers.
pub const HIGHLIGHT_GROWTH: f32 = 1e-4;

/// Height given to a highlight with no z extent.
const MIN_HEIGHT: f32 = 0.0001;

/// Highlight bounds of a pick result.
///
/// Self-highlighting results keep their bounds unchanged; the others grow by
/// [`HIGHLIGHT_GROWTH`] times `extent` on every side.
#[must_use]
pub fn tip_bounds(result: &PickResult, extent: f32) -> BinBounds {
    if result.use_itself {
        return result.bounds;
    }
    if result.bounds.is_inverted() {
        log::warn!("inverted tooltip bounds for bin {}: {:?}", result.bin_id, result.bounds);
    }
    result.bounds.grown(HIGHLIGHT_GROWTH * extent)
}

/// A 36-vertex box covering `bounds`, drawn in `color`.
#[must_use]
pub fn highlight_box(bounds: &BinBounds, color: glam::Vec3) -> Primitive {
    let mut bounds = *bounds;
    if bounds.x1 == bounds.x2 {
        log::warn!("highlight has no x extent at {}", bounds.x1);
    }
    if bounds.y1 == bounds.y2 {
        log::warn!("highlight has no y extent at {}", bounds.y1);
    }
    if bounds.z1 == bounds.z2 {
        bounds.z2 = bounds.z1 + MIN_HEIGHT;
    }
    let (positions, normals) = box_triangles(bounds.min(), bounds.max());
    let buffer = GeometryBuffer {
        normals: Some(normals),
        ..GeometryBuffer::from_positions(positions)
    };
    Primitive::mesh("tooltip_box", buffer, Material::flat(color))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use histoscope_core::TIP_GREEN;

    use super::*;

    fn result(bounds: BinBounds, use_itself: bool) -> PickResult {
        PickResult {
            bin_id: 3,
            bin: [3, 0, 0],
            bounds,
            value: 1.0,
            color: TIP_GREEN,
            use_itself,
        }
    }

    #[test]
    fn test_bounds_grow() {
        let bounds = BinBounds::from_corners(Vec3::ZERO, Vec3::new(10.0, 10.0, 20.0));
        let grown = tip_bounds(&result(bounds, false), 100.0);
        assert!((grown.x1 + 0.01).abs() < 1e-6);
        assert!((grown.z2 - 20.01).abs() < 1e-5);
        assert_eq!(tip_bounds(&result(bounds, true), 100.0), bounds);
    }

    #[test]
    fn test_box_covers_bounds() {
        let bounds = BinBounds::from_corners(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 2.0, 8.0));
        let tip = highlight_box(&bounds, TIP_GREEN);
        let mesh = tip.mesh_buffer().unwrap();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.bounds(), Some((bounds.min(), bounds.max())));
        assert_eq!(tip.material.color, TIP_GREEN);
    }

    #[test]
    fn test_flat_bounds_get_height() {
        let bounds = BinBounds::from_corners(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let tip = highlight_box(&bounds, TIP_GREEN);
        let (lo, hi) = tip.mesh_buffer().unwrap().bounds().unwrap();
        assert!(hi.z > lo.z);
        assert!(tip.mesh_buffer().unwrap().normals.is_some());
    }
}
