//! Camera and view management.

use glam::{Mat4, Vec2, Vec3, Vec4};
use histoscope_core::Ray;

/// A perspective camera with a z-up convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates a camera looking at the origin.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, -3.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// Default view of a draw box of half-width `extent`.
    #[must_use]
    pub fn for_extent(extent: f32, aspect_ratio: f32) -> Self {
        let mut camera = Self::new(aspect_ratio);
        camera.reset(extent);
        camera
    }

    /// Restores the default view of a draw box of half-width `extent`.
    pub fn reset(&mut self, extent: f32) {
        self.position = Vec3::new(-1.6 * extent, -3.5 * extent, 1.4 * extent);
        self.target = Vec3::new(0.0, 0.0, 0.8 * extent);
        self.up = Vec3::Z;
        self.fov = 45f32.to_radians();
        self.near = 1.0;
        self.far = 40.0 * extent;
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray through a pixel of a `width` x `height` viewport.
    #[must_use]
    pub fn screen_ray(&self, pixel: Vec2, width: u32, height: u32) -> Option<Ray> {
        if width == 0 || height == 0 {
            return None;
        }

        let half_width = width as f32 / 2.0;
        let half_height = height as f32 / 2.0;
        let ndc_x = (pixel.x / half_width) - 1.0;
        let ndc_y = 1.0 - (pixel.y / half_height);

        let inv_view_proj = self.view_projection_matrix().inverse();

        // NDC depth runs over [0, 1]
        let near = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
            return None;
        }

        let origin = near.truncate() / near.w;
        let dir = (far.truncate() / far.w - origin).normalize_or_zero();
        if dir.length_squared() < 1e-12 {
            return None;
        }

        Some(Ray::new(origin, dir))
    }

    /// Pixel position of a world point, or `None` when it is behind the camera.
    #[must_use]
    pub fn project(&self, point: Vec3, width: u32, height: u32) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        ))
    }

    /// Orbits the camera around the target, keeping z up.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }
        let mut theta = offset.y.atan2(offset.x);
        let mut phi = (offset.z / radius).clamp(-1.0, 1.0).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            );
    }

}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
