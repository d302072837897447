/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::bounds_of;

/// Radius assumed when the visible parts collapse to a point
pub const FALLBACK_RADIUS: f32 = 0.5;
/// Smallest radius the camera frames
pub const MIN_FRAMED_RADIUS: f32 = 0.35;

/// Sphere enclosing every visible part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere around the axis-aligned box of `points`
    pub fn enclosing(points: impl Iterator<Item = Point3<f32>>) -> Option<Self> {
        let (lo, hi) = bounds_of(points)?;
        let center = nalgebra::center(&lo, &hi);
        let radius = (hi - lo).norm() * 0.5;
        if !center.coords.iter().all(|c| c.is_finite()) {
            return None;
        }
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            FALLBACK_RADIUS
        };
        Some(Self { center, radius })
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Look at `sphere` from the front, far enough to keep it in view.
    ///
    /// Returns the camera distance used.
    pub fn frame(&mut self, sphere: &BoundingSphere) -> f32 {
        let radius = sphere.radius.max(MIN_FRAMED_RADIUS);
        let distance = (radius * 2.8).max(1.45);
        let y_bias = radius * 0.15;

        self.target = sphere.center;
        self.position = sphere.center + Vector3::new(0.0, y_bias, distance);

        let d = distance.max(1.0);
        self.near = (d / 120.0).max(0.01);
        self.far = (d * 22.0).max(40.0);
        distance
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a model-space point to screen space with a precomputed MVP.
    ///
    /// Returns `(x, y, depth)` with depth in NDC, or `None` when the point is
    /// behind the camera or outside the viewport.
    pub fn project_with(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Clip test
        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::new(80, 40);
        let (x, y, depth) =
            Camera::project_with(&camera.view_projection(), &Point3::origin(), 80, 40).unwrap();
        assert_relative_eq!(x, 40.0, epsilon = 1e-4);
        assert_relative_eq!(y, 20.0, epsilon = 1e-4);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_point_behind_camera_is_clipped() {
        let camera = Camera::new(80, 40);
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(Camera::project_with(&camera.view_projection(), &behind, 80, 40).is_none());
    }

    #[test]
    fn test_enclosing_sphere() {
        let pts = [Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        let sphere = BoundingSphere::enclosing(pts.into_iter()).unwrap();
        assert_relative_eq!(sphere.center.x, 0.0);
        assert_relative_eq!(sphere.center.y, 1.0);
        assert_relative_eq!(sphere.radius, 8.0f32.sqrt() * 0.5);

        let single = BoundingSphere::enclosing(std::iter::once(Point3::new(3.0, 3.0, 3.0))).unwrap();
        assert_eq!(single.radius, FALLBACK_RADIUS);
        assert!(BoundingSphere::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_frame_distance() {
        let mut camera = Camera::default();
        let small = BoundingSphere {
            center: Point3::new(0.0, 1.0, 0.0),
            radius: 0.1,
        };
        assert_relative_eq!(camera.frame(&small), 1.45);
        assert_eq!(camera.target, small.center);

        let large = BoundingSphere {
            center: Point3::origin(),
            radius: 2.0,
        };
        assert_relative_eq!(camera.frame(&large), 5.6);
        assert_relative_eq!(camera.position.z, 5.6);
    }
}
