//! Camera utilities for 3D visualization

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// Smallest aspect ratio and depth range accepted by the projection
const MIN_PROJECTION_EXTENT: f32 = 1e-6;

/// A perspective camera for viewing meshes
///
/// `fov` is the vertical field of view in degrees. The projection matrix is
/// cached: after changing `fov`, `aspect_ratio`, `near` or `far`, call
/// [`Camera::update_projection_matrix`].
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    projection: Matrix4<f32>,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
            projection: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Vertical field of view in radians
    pub fn fov_radians(&self) -> f32 {
        self.fov * (std::f32::consts::PI / 180.0)
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix as of the last update
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    /// Combined projection * view matrix
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }

    /// Recompute the projection from fov, aspect ratio, near and far
    pub fn update_projection_matrix(&mut self) {
        let aspect = self.aspect_ratio.max(MIN_PROJECTION_EXTENT);
        let near = self.near.max(MIN_PROJECTION_EXTENT);
        let far = self.far.max(near + MIN_PROJECTION_EXTENT);
        self.projection = Perspective3::new(aspect, self.fov_radians(), near, far).into_inner();
    }

    /// Orient the camera towards `target`
    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    /// Set the aspect ratio from a viewport size and refresh the projection
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
            self.update_projection_matrix();
        }
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::z())
    }

    /// Unit vector pointing to the right of the view
    pub fn right(&self) -> Vector3<f32> {
        self.forward()
            .cross(&self.up)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::x)
    }

    /// Unit vector pointing up in screen space
    pub fn screen_up(&self) -> Vector3<f32> {
        self.right().cross(&self.forward())
    }
}

impl Default for Camera {
    /// The initial view before any model is loaded
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            75.0,
            16.0 / 9.0,
            0.1,
            1000.0,
        )
    }
}
