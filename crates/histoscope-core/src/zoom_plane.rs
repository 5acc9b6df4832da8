//! Invisible interaction planes along the axes.
//!
//! A zoom plane is a quad lying next to an axis. Dragging across it selects a
//! range on that axis; the wheel zooms around the point under the cursor.

use glam::{Mat4, Vec3};

use crate::axis::AxisId;
use crate::ray::{Plane, Ray};

/// Face order of the zoom quad.
pub const ZOOM_FACES: [[usize; 3]; 2] = [[0, 2, 1], [0, 3, 2]];

/// A hit-testable quad attached to an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomPlane {
    axis: AxisId,
    container: Mat4,
    extent: f32,
    tick_length: f32,
}

impl ZoomPlane {
    /// Creates a plane for `axis`, placed by the `container` transform.
    pub fn new(axis: AxisId, container: Mat4, extent: f32, tick_length: f32) -> Self {
        Self {
            axis,
            container,
            extent,
            tick_length,
        }
    }

    /// The axis this plane zooms.
    #[must_use]
    pub fn axis(&self) -> AxisId {
        self.axis
    }

    /// Container transform.
    #[must_use]
    pub fn container(&self) -> Mat4 {
        self.container
    }

    /// Full local-to-world transform including the mesh rotation.
    #[must_use]
    pub fn world_transform(&self) -> Mat4 {
        match self.axis {
            AxisId::Y => {
                self.container
                    * Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2)
                    * Mat4::from_rotation_x(std::f32::consts::PI)
            }
            AxisId::X | AxisId::Z => self.container,
        }
    }

    /// Quad corners in mesh-local coordinates.
    #[must_use]
    pub fn local_vertices(&self) -> [Vec3; 4] {
        let s = self.extent;
        let tl = self.tick_length * 4.0;
        match self.axis {
            AxisId::Z => [
                Vec3::ZERO,
                Vec3::new(tl, 0.0, 0.0),
                Vec3::new(tl, 0.0, 2.0 * s),
                Vec3::new(0.0, 0.0, 2.0 * s),
            ],
            AxisId::X | AxisId::Y => [
                Vec3::new(-s, 0.0, 0.0),
                Vec3::new(s, 0.0, 0.0),
                Vec3::new(s, -tl, 0.0),
                Vec3::new(-s, -tl, 0.0),
            ],
        }
    }

    /// Quad corners in world coordinates.
    #[must_use]
    pub fn world_vertices(&self) -> [Vec3; 4] {
        let m = self.world_transform();
        self.local_vertices().map(|v| m.transform_point3(v))
    }

    /// Valid world range of the axis coordinate.
    #[must_use]
    pub fn axis_range(&self) -> (f32, f32) {
        match self.axis {
            AxisId::Z => (0.0, 2.0 * self.extent),
            AxisId::X | AxisId::Y => (-self.extent, self.extent),
        }
    }

    /// World-space hit of `ray` with the quad itself.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let v = self.world_vertices();
        ZOOM_FACES
            .iter()
            .filter_map(|f| ray.intersect_triangle(v[f[0]], v[f[1]], v[f[2]]))
            .min_by(f32::total_cmp)
            .map(|t| ray.at(t))
    }

    /// Hit of `ray` with the infinite plane of the quad, with the axis
    /// coordinate clamped to the axis range.
    #[must_use]
    pub fn global_intersect(&self, ray: &Ray) -> Option<Vec3> {
        let v = self.world_vertices();
        let plane = Plane::from_coplanar_points(v[0], v[1], v[2])?;
        let mut point = plane.intersect_ray(ray)?;
        let (lo, hi) = self.axis_range();
        let i = self.axis.index();
        point[i] = point[i].clamp(lo, hi);
        Some(point)
    }

    /// Point used while dragging: the bounded hit when there is one,
    /// otherwise the clamped plane hit.
    #[must_use]
    pub fn drag_point(&self, ray: &Ray) -> Option<Vec3> {
        self.intersect(ray).or_else(|| self.global_intersect(ray))
    }

    /// Position of `point` along the axis as a fraction of the axis range.
    #[must_use]
    pub fn fraction_of(&self, point: Vec3) -> f64 {
        let (lo, hi) = self.axis_range();
        f64::from((point[self.axis.index()] - lo) / (hi - lo))
    }

    /// Local corners of the selection band between two axis coordinates.
    #[must_use]
    pub fn selection_vertices(&self, p1: f32, p2: f32) -> [Vec3; 4] {
        let mut v = self.local_vertices();
        match self.axis {
            AxisId::Z => {
                v[1].x = self.tick_length;
                v[2].x = self.tick_length;
                v[0].z = p1;
                v[1].z = p1;
                v[2].z = p2;
                v[3].z = p2;
            }
            AxisId::X | AxisId::Y => {
                v[2].y = -self.tick_length;
                v[3].y = -self.tick_length;
                v[0].x = p1;
                v[3].x = p1;
                v[1].x = p2;
                v[2].x = p2;
            }
        }
        v
    }

    /// Selection band as a world-space triangle list.
    #[must_use]
    pub fn selection_triangles(&self, p1: f32, p2: f32) -> Vec<Vec3> {
        let m = self.world_transform();
        let v = self.selection_vertices(p1, p2).map(|p| m.transform_point3(p));
        ZOOM_FACES
            .iter()
            .flat_map(|f| [v[f[0]], v[f[1]], v[f[2]]])
            .collect()
    }
}
