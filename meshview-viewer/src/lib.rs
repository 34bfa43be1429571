//! Interactive mesh viewer
//!
//! This crate holds the viewer logic on top of `meshview-core`:
//! - [`fit`]: frame a model in the camera view
//! - [`picking`]: find the model part under the cursor
//! - [`visibility`]: hide and unhide parts
//! - [`loader`]: background loading where the latest request wins
//! - [`Viewer`]: the state behind one window, driven by user actions
//! - [`InteractiveViewer`]: the winit window and wgpu renderer around it
//!
//! ```rust,no_run
//! use meshview_viewer::{InteractiveViewer, ViewerConfig};
//! use meshview_io::ModelSource;
//!
//! fn main() -> meshview_core::Result<()> {
//!     let mut app = InteractiveViewer::new(ViewerConfig::default())?;
//!     app.open(ModelSource::Path("model.obj".into()));
//!     app.run()
//! }
//! ```

pub mod camera;
pub mod config;
pub mod controls;
pub mod fit;
pub mod interactive_viewer;
pub mod loader;
pub mod picking;
pub mod viewer;
pub mod visibility;

pub use camera::Camera;
pub use config::{CameraSettings, RenderSettings, ViewerConfig, WindowSettings, ZoomSettings};
pub use controls::{ControlsConfig, OrbitControls};
pub use fit::{fit, CameraFit, FitConfig};
pub use interactive_viewer::{InteractiveViewer, KeyAction};
pub use loader::{LoadResult, LoadStatus, LoadTicket, LoadTracker, ModelLoader};
pub use picking::{camera_ray, intersect, pick, pick_with, pointer_to_ndc, Hit, PickOptions};
pub use viewer::{LoadOutcome, Viewer};
pub use visibility::{ToggleOutcome, VisibilitySet};
