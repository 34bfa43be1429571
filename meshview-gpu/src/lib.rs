//! # meshview GPU
//!
//! wgpu rendering for meshview: a device/surface context and a flat-lit
//! mesh renderer that draws the visible parts of a model.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meshview_gpu::{MeshRenderer, MeshRenderConfig, scene_vertices};
//!
//! async fn draw(window: Arc<winit::window::Window>, model: &meshview_core::Model) -> meshview_core::Result<()> {
//!     let config = MeshRenderConfig::default();
//!     let style = config.style;
//!     let mut renderer = MeshRenderer::new(window, config).await?;
//!     renderer.upload(&scene_vertices(model, None, &style));
//!     renderer.render()
//! }
//! ```

pub mod device;
pub mod mesh;

pub use device::GpuContext;
pub use mesh::{
    scene_vertices, MeshCameraUniform, MeshLightingParams, MeshRenderConfig, MeshRenderer,
    MeshStyle, MeshVertex,
};
