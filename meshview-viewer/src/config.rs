//! Viewer configuration
//!
//! Every field has a default, so a JSON file only needs the values it wants
//! to change:
//!
//! ```json
//! { "camera": { "fov": 60.0 }, "render": { "background": [0, 0, 0] } }
//! ```

use crate::controls::ControlsConfig;
use crate::fit::FitConfig;
use meshview_core::{Error, Point3f, Result};
use meshview_gpu::{MeshLightingParams, MeshRenderConfig, MeshStyle};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    /// Initial logical size
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "meshview".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Initial camera before any model is fitted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub position: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 75.0,
            position: [0.0, 0.0, 5.0],
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraSettings {
    pub fn position(&self) -> Point3f {
        Point3f::from(self.position)
    }
}

/// Factors applied to the camera position by the zoom buttons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub in_factor: f32,
    pub out_factor: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            in_factor: 0.9,
            out_factor: 1.1,
        }
    }
}

/// Colors and lighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Background color RGB
    pub background: [u8; 3],
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    /// Direction towards the light
    pub light_direction: [f32; 3],
    /// Base color RGB of unselected parts
    pub base_color: [u8; 3],
    /// Color RGB of the selected part
    pub selection_tint: [u8; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: [0x33, 0x33, 0x33],
            ambient_intensity: 0.5,
            directional_intensity: 0.8,
            light_direction: [1.0, 1.0, 1.0],
            base_color: [204, 204, 204],
            selection_tint: [255, 153, 51],
        }
    }
}

fn unit_rgb(rgb: [u8; 3]) -> [f32; 3] {
    rgb.map(|c| f32::from(c) / 255.0)
}

impl RenderSettings {
    /// Renderer configuration for these settings
    pub fn to_render_config(&self) -> MeshRenderConfig {
        let [r, g, b] = unit_rgb(self.background);
        MeshRenderConfig {
            lighting_params: MeshLightingParams {
                direction: self.light_direction,
                ambient: self.ambient_intensity,
                directional: self.directional_intensity,
                ..MeshLightingParams::default()
            },
            background_color: [f64::from(r), f64::from(g), f64::from(b), 1.0],
            style: MeshStyle {
                base_color: unit_rgb(self.base_color),
                selection_tint: unit_rgb(self.selection_tint),
            },
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub controls: ControlsConfig,
    pub fit: FitConfig,
    pub zoom: ZoomSettings,
    pub render: RenderSettings,
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject values the viewer cannot work with
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, message: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::Config(message.to_string()))
            }
        }

        check(self.window.width > 0 && self.window.height > 0, "window size must be non-zero")?;

        let camera = &self.camera;
        check(camera.fov > 0.0 && camera.fov < 180.0, "camera.fov must be in (0, 180) degrees")?;
        check(camera.position.iter().all(|v| v.is_finite()), "camera.position must be finite")?;
        check(camera.near > 0.0 && camera.far > camera.near, "camera planes need 0 < near < far")?;

        let controls = &self.controls;
        check(
            controls.damping_factor > 0.0 && controls.damping_factor <= 1.0,
            "controls.damping_factor must be in (0, 1]",
        )?;
        check(
            controls.min_distance >= 0.0 && controls.min_distance <= controls.max_distance,
            "controls distances need 0 <= min <= max",
        )?;
        check(
            controls.min_polar_angle >= 0.0
                && controls.min_polar_angle <= controls.max_polar_angle
                && controls.max_polar_angle <= PI,
            "controls polar angles need 0 <= min <= max <= pi",
        )?;
        check(
            [controls.rotate_speed, controls.zoom_speed, controls.pan_speed]
                .iter()
                .all(|s| s.is_finite() && *s >= 0.0),
            "controls speeds must be non-negative",
        )?;

        let fit = &self.fit;
        check(fit.margin > 0.0, "fit.margin must be positive")?;
        check(
            fit.near_divisor > 1.0 && fit.far_multiplier > 1.0,
            "fit.near_divisor and fit.far_multiplier must exceed 1",
        )?;
        check(fit.min_distance > 0.0, "fit.min_distance must be positive")?;

        check(
            self.zoom.in_factor > 0.0 && self.zoom.out_factor > 0.0,
            "zoom factors must be positive",
        )?;
        check(
            self.render.light_direction.iter().any(|v| *v != 0.0),
            "render.light_direction must be non-zero",
        )?;
        Ok(())
    }
}
