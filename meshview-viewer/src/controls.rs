//! Orbit camera controls
//!
//! The camera orbits `target` on a sphere with Y up. Input handlers only
//! accumulate deltas; [`OrbitControls::update`] applies them once per frame.
//! The spherical coordinates are re-derived from the camera on every update,
//! so other code may move the camera directly (fitting, zoom buttons) and
//! the controls continue from wherever it ends up.

use crate::camera::Camera;
use meshview_core::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Keeps the polar angle off the poles where the view basis flips
const POLE_EPSILON: f32 = 1e-6;

/// Movement below this is reported as no change
const MOVE_EPSILON: f32 = 1e-6;

/// Tunables for [`OrbitControls`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per frame when damping
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians from +Y
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Pan in the screen plane instead of the ground plane
    pub screen_space_panning: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::MAX,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            screen_space_panning: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Orbit, dolly and pan around a target point
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3f,
    pub config: ControlsConfig,
    delta: SphericalDelta,
    scale: f32,
    pan_offset: Vector3f,
}

impl OrbitControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            target: Point3f::origin(),
            config,
            delta: SphericalDelta::default(),
            scale: 1.0,
            pan_offset: Vector3f::zeros(),
        }
    }

    /// Rotate around the vertical axis by `angle` radians
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    /// Tilt towards the top pole by `angle` radians
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// Move closer; `factor` > 1 shrinks the distance by that ratio
    pub fn dolly_in(&mut self, factor: f32) {
        if factor > 0.0 {
            self.scale /= factor;
        }
    }

    /// Move away; `factor` > 1 grows the distance by that ratio
    pub fn dolly_out(&mut self, factor: f32) {
        if factor > 0.0 {
            self.scale *= factor;
        }
    }

    /// Shift the target by a world-space offset
    pub fn pan(&mut self, offset: Vector3f) {
        self.pan_offset += offset;
    }

    /// Orbit by a pointer drag of `dx`, `dy` pixels
    pub fn drag_rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let speed = 2.0 * PI * self.config.rotate_speed / viewport_height;
        self.rotate_left(dx * speed);
        self.rotate_up(dy * speed);
    }

    /// Pan by a pointer drag of `dx`, `dy` pixels
    ///
    /// The target moves so that a point at the target depth follows the
    /// pointer.
    pub fn drag_pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &Camera) {
        if viewport_height <= 0.0 {
            return;
        }
        let target_distance = (camera.position - self.target).norm() * (camera.fov_radians() / 2.0).tan();
        let per_pixel = 2.0 * target_distance / viewport_height * self.config.pan_speed;

        let right = camera.right();
        let up = if self.config.screen_space_panning {
            camera.screen_up()
        } else {
            camera.up.cross(&right)
        };
        self.pan(-right * (dx * per_pixel) + up * (dy * per_pixel));
    }

    /// Dolly for a wheel step; negative `delta` zooms in
    pub fn wheel(&mut self, delta: f32) {
        let factor = 0.95_f32.powf(self.config.zoom_speed);
        if delta < 0.0 {
            self.dolly_in(1.0 / factor);
        } else if delta > 0.0 {
            self.dolly_out(1.0 / factor);
        }
    }

    /// Apply pending motion to `camera`; returns true if the camera moved
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.position;
        let offset = camera.position - self.target;

        let mut radius = offset.norm();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        let config = self.config;
        let damping = if config.enable_damping {
            config.damping_factor
        } else {
            1.0
        };

        theta += self.delta.theta * damping;
        phi += self.delta.phi * damping;
        phi = phi
            .clamp(config.min_polar_angle, config.max_polar_angle)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);

        radius = (radius * self.scale).clamp(config.min_distance, config.max_distance);
        self.target += self.pan_offset * damping;

        let sin_phi_radius = phi.sin() * radius;
        let offset = Vector3f::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if config.enable_damping {
            self.delta.theta *= 1.0 - config.damping_factor;
            self.delta.phi *= 1.0 - config.damping_factor;
            self.pan_offset *= 1.0 - config.damping_factor;
        } else {
            self.delta = SphericalDelta::default();
            self.pan_offset = Vector3f::zeros();
        }
        self.scale = 1.0;

        (camera.position - before).norm_squared() > MOVE_EPSILON * MOVE_EPSILON
    }

    /// Drop any pending motion
    pub fn stop(&mut self) {
        self.delta = SphericalDelta::default();
        self.scale = 1.0;
        self.pan_offset = Vector3f::zeros();
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(ControlsConfig::default())
    }
}
