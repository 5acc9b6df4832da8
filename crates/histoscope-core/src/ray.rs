//! Rays, triangles and planes in draw space.

use glam::Vec3;

/// Length of the segment used when a ray is intersected as a finite line.
pub const FAR_DISTANCE: f32 = 1e10;

/// A ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Creates a ray; the direction is normalized.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Möller–Trumbore intersection; returns the ray parameter of the hit.
    ///
    /// Both windings are hit.
    #[must_use]
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let eps = 1e-6;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.dir.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < eps {
            return None;
        }
        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * self.dir.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        if t > eps { Some(t) } else { None }
    }
}

/// An infinite plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// Plane through three points, oriented by their winding.
    ///
    /// Returns `None` for collinear points.
    #[must_use]
    pub fn from_coplanar_points(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let normal = (c - b).cross(a - b).normalize_or_zero();
        if normal == Vec3::ZERO {
            return None;
        }
        Some(Self {
            normal,
            constant: -normal.dot(a),
        })
    }

    /// Signed distance of `p` from the plane.
    #[must_use]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.constant
    }

    /// Intersection with the segment from `start` to `end`.
    #[must_use]
    pub fn intersect_segment(&self, start: Vec3, end: Vec3) -> Option<Vec3> {
        let dir = end - start;
        let denom = self.normal.dot(dir);
        if denom.abs() < f32::EPSILON {
            return (self.signed_distance(start).abs() < 1e-6).then_some(start);
        }
        let t = -(start.dot(self.normal) + self.constant) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(start + dir * t)
    }

    /// Intersection with the forward half of `ray`, treated as a long segment.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        self.intersect_segment(ray.origin, ray.at(FAR_DISTANCE))
    }
}
