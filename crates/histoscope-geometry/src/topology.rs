//! Unit box and sphere topology shared by the builders.
//!
//! The box spans `[0, 1]^3`. Faces come in runs of six indices (two triangles) in
//! the order +x, -x, +y, -y, +z, -z.

use glam::Vec3;

/// Box corners.
pub const BOX_VERTICES: [Vec3; 8] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
];

/// Triangle corner indices into [`BOX_VERTICES`].
pub const BOX_INDICES: [usize; 36] = [
    0, 2, 1, 2, 3, 1, // +x
    4, 6, 5, 6, 7, 5, // -x
    4, 5, 1, 5, 0, 1, // +y
    7, 6, 2, 6, 3, 2, // -y
    5, 7, 0, 7, 2, 0, // +z
    1, 3, 4, 3, 6, 4, // -z
];

/// One normal per face.
pub const BOX_NORMALS: [Vec3; 6] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// Index of the first top-face corner in [`BOX_INDICES`].
pub const TOP_FACE_START: usize = 24;

/// Twelve box edges as pairs of [`BOX_VERTICES`] indices.
pub const BOX_SEGMENTS: [usize; 24] = [
    0, 2, 2, 7, 7, 5, 5, 0, 1, 3, 3, 6, 6, 4, 4, 1, 1, 0, 3, 2, 6, 7, 4, 5,
];

/// Box edges expressed as positions within the 36-vertex expanded mesh.
pub const BOX_MESH_SEGMENTS: [usize; 24] = mesh_segments();

/// Corners of a flat box, used for bins sitting at the value minimum.
pub const FLAT_VERTICES: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
];

/// Outline of a flat box.
pub const FLAT_SEGMENTS: [usize; 8] = [0, 1, 1, 2, 2, 3, 3, 0];

const fn mesh_segments() -> [usize; 24] {
    let mut out = [0; 24];
    let mut n = 0;
    while n < BOX_SEGMENTS.len() {
        let mut k = 0;
        while k < BOX_INDICES.len() {
            if BOX_INDICES[k] == BOX_SEGMENTS[n] {
                out[n] = k;
                break;
            }
            k += 1;
        }
        n += 1;
    }
    out
}

/// Corner `k` of the expanded box mesh.
#[must_use]
pub fn box_corner(k: usize) -> Vec3 {
    BOX_VERTICES[BOX_INDICES[k]]
}

/// Normal of expanded corner `k`.
#[must_use]
pub fn box_normal(k: usize) -> Vec3 {
    BOX_NORMALS[k / 6]
}

/// Maps a unit-box point into the box `[lo, hi]`.
#[must_use]
pub fn place(unit: Vec3, lo: Vec3, hi: Vec3) -> Vec3 {
    lo + unit * (hi - lo)
}

/// A 36-vertex box spanning `[lo, hi]` with flat normals.
#[must_use]
pub fn box_triangles(lo: Vec3, hi: Vec3) -> (Vec<Vec3>, Vec<Vec3>) {
    (0..BOX_INDICES.len())
        .map(|k| (place(box_corner(k), lo, hi), box_normal(k)))
        .unzip()
}

/// Expanded triangle list of a UV sphere of the given radius with poles on the z axis.
///
/// Returns positions and smooth normals, three per face.
#[must_use]
pub fn sphere_triangles(radius: f32, width_segments: usize, height_segments: usize) -> (Vec<Vec3>, Vec<Vec3>) {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut grid = Vec::with_capacity(hs + 1);
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let theta = v * std::f32::consts::PI;
        let row: Vec<Vec3> = (0..=ws)
            .map(|ix| {
                let u = ix as f32 / ws as f32;
                let phi = u * std::f32::consts::TAU;
                // y-up sphere turned a quarter around x
                let y_up = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
                Vec3::new(y_up.x, -y_up.z, y_up.y)
            })
            .collect();
        grid.push(row);
    }

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut push = |n: Vec3| {
        positions.push(n * radius);
        normals.push(n);
    };
    for iy in 0..hs {
        for ix in 0..ws {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                push(a);
                push(b);
                push(d);
            }
            if iy != hs - 1 {
                push(b);
                push(c);
                push(d);
            }
        }
    }
    (positions, normals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_segments_point_at_same_corner() {
        for (n, &v) in BOX_SEGMENTS.iter().enumerate() {
            assert_eq!(BOX_INDICES[BOX_MESH_SEGMENTS[n]], v);
        }
    }

    #[test]
    fn test_face_normals_match_corners() {
        for k in 0..36 {
            let n = box_normal(k);
            let c = box_corner(k);
            // every corner of a face lies on the face plane
            let on_plane = if n.x > 0.0 {
                c.x == 1.0
            } else if n.x < 0.0 {
                c.x == 0.0
            } else if n.y > 0.0 {
                c.y == 1.0
            } else if n.y < 0.0 {
                c.y == 0.0
            } else if n.z > 0.0 {
                c.z == 1.0
            } else {
                c.z == 0.0
            };
            assert!(on_plane, "corner {k}");
        }
        assert_eq!(box_normal(TOP_FACE_START), Vec3::Z);
    }

    #[test]
    fn test_sphere_size() {
        let (positions, normals) = sphere_triangles(0.5, 16, 12);
        assert_eq!(positions.len(), 352 * 3);
        assert_eq!(normals.len(), positions.len());
        for p in &positions {
            assert!((p.length() - 0.5).abs() < 1e-5);
        }
        let top = positions.iter().map(|p| p.z).fold(f32::MIN, f32::max);
        assert!((top - 0.5).abs() < 1e-5);
    }
}
