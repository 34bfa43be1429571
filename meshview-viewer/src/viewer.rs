//! Viewer state and the actions the user can trigger
//!
//! [`Viewer`] owns everything the window shows: the current model, the
//! camera and its orbit controls, the selected part and the set of hidden
//! parts. It knows nothing about windows or GPUs; the event loop in
//! [`crate::interactive_viewer`] translates input into calls on it and asks
//! it for the data to draw.

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::fit::{fit, CameraFit};
use crate::loader::{LoadResult, LoadStatus, LoadTicket, LoadTracker};
use crate::picking::pick;
use crate::visibility::{ToggleOutcome, VisibilitySet};
use meshview_core::{Model, NodeId, Point3f, Result};
use tracing::{debug, info, warn};

/// What happened to a finished load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The model replaced the previous one
    Applied(Option<CameraFit>),
    /// A newer load was requested meanwhile; the result was dropped
    Stale,
    /// Reading failed; the previous model is still shown
    Failed(String),
}

/// Interactive viewer state
pub struct Viewer {
    config: ViewerConfig,
    camera: Camera,
    controls: OrbitControls,
    model: Option<Model>,
    selection: Option<NodeId>,
    hidden: VisibilitySet,
    loads: LoadTracker,
    status: LoadStatus,
    viewport: (u32, u32),
    revision: u64,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let (width, height) = (config.window.width, config.window.height);
        let camera = Camera::new(
            config.camera.position(),
            Point3f::origin(),
            nalgebra::Vector3::y(),
            config.camera.fov,
            width as f32 / height.max(1) as f32,
            config.camera.near,
            config.camera.far,
        );
        let controls = OrbitControls::new(config.controls);
        Self {
            config,
            camera,
            controls,
            model: None,
            selection: None,
            hidden: VisibilitySet::new(),
            loads: LoadTracker::new(),
            status: LoadStatus::Idle,
            viewport: (width, height),
            revision: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Controls for feeding pointer input, along with the camera they drive
    pub fn controls_mut(&mut self) -> (&mut OrbitControls, &Camera) {
        (&mut self.controls, &self.camera)
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn hidden(&self) -> &VisibilitySet {
        &self.hidden
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Counter bumped whenever what gets drawn changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Register a new load request; earlier requests become stale
    pub fn begin_load(&mut self, label: impl Into<String>) -> LoadTicket {
        let label = label.into();
        let ticket = self.loads.begin();
        info!(generation = ticket.generation(), model = %label, "loading model");
        self.status = LoadStatus::Loading { label };
        ticket
    }

    /// Apply the result of a load started with [`begin_load`](Self::begin_load)
    ///
    /// Results for superseded tickets, or for a ticket that was already
    /// finished, are dropped as [`LoadOutcome::Stale`].
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Model>) -> LoadOutcome {
        if !self.loads.finish(ticket) {
            warn!(generation = ticket.generation(), "discarding stale load");
            return LoadOutcome::Stale;
        }
        let label = match &self.status {
            LoadStatus::Loading { label } => label.clone(),
            _ => String::new(),
        };

        match result {
            Ok(mut model) => {
                let fitted = fit(&mut model, &mut self.camera, &self.config.fit);
                self.controls.stop();
                self.controls.target = Point3f::origin();
                self.controls.update(&mut self.camera);

                info!(
                    model = model.name(),
                    parts = model.len().saturating_sub(1),
                    vertices = model.vertex_count(),
                    faces = model.face_count(),
                    "model loaded"
                );
                self.model = Some(model);
                self.selection = None;
                self.hidden.clear();
                self.status = LoadStatus::Loaded { label };
                self.touch();
                LoadOutcome::Applied(fitted)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(model = %label, error = %message, "model load failed");
                self.status = LoadStatus::Failed {
                    label,
                    message: message.clone(),
                };
                LoadOutcome::Failed(message)
            }
        }
    }

    /// [`finish_load`](Self::finish_load) for a result from the background loader
    pub fn apply(&mut self, done: LoadResult) -> LoadOutcome {
        debug!(generation = done.ticket.generation(), model = %done.label, "load finished");
        self.finish_load(done.ticket, done.result)
    }

    /// Show `model` immediately, as if loaded
    pub fn set_model(&mut self, model: Model) -> LoadOutcome {
        let ticket = self.begin_load(model.name().to_string());
        self.finish_load(ticket, Ok(model))
    }

    /// Select the part under the pointer
    ///
    /// A click that hits nothing keeps the current selection.
    pub fn click(&mut self, x: f32, y: f32) -> Option<NodeId> {
        let model = self.model.as_ref()?;
        let (width, height) = self.viewport;
        let hit = pick(x, y, width as f32, height as f32, &self.camera, model)?;
        if self.selection != Some(hit) {
            self.selection = Some(hit);
            self.touch();
        }
        debug!(node = %hit, "selected");
        Some(hit)
    }

    /// Change the selection directly
    pub fn select(&mut self, node: Option<NodeId>) {
        if self.selection != node {
            self.selection = node;
            self.touch();
        }
    }

    /// Hide the selected part, or show it again if hidden
    pub fn toggle_selected(&mut self) -> ToggleOutcome {
        let outcome = match self.model.as_mut() {
            Some(model) => self.hidden.toggle(model, self.selection),
            None => ToggleOutcome::NothingSelected,
        };
        if outcome.changed() {
            self.touch();
        }
        outcome
    }

    /// Make every part visible
    pub fn unhide_all(&mut self) {
        if let Some(model) = self.model.as_mut() {
            self.hidden.unhide_all(model);
            debug!("all parts visible");
            self.touch();
        }
    }

    /// Reframe the model and point the controls at the origin
    pub fn reset_camera(&mut self) -> Option<CameraFit> {
        let fitted = match self.model.as_mut() {
            Some(model) => fit(model, &mut self.camera, &self.config.fit),
            None => None,
        };
        self.controls.stop();
        self.controls.target = Point3f::origin();
        self.controls.update(&mut self.camera);
        fitted
    }

    /// Move the camera towards the world origin
    pub fn zoom_in(&mut self) {
        self.scale_camera(self.config.zoom.in_factor);
    }

    /// Move the camera away from the world origin
    pub fn zoom_out(&mut self) {
        self.scale_camera(self.config.zoom.out_factor);
    }

    fn scale_camera(&mut self, factor: f32) {
        self.camera.position.coords *= factor;
        self.controls.update(&mut self.camera);
    }

    /// Track a new viewport size in physical pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_viewport(width, height);
    }

    /// Label for the hide/unhide action given the current selection
    pub fn toggle_label(&self) -> &'static str {
        match self.selection {
            Some(id) if self.hidden.contains(id) => "Unhide Selected",
            _ => "Hide Selected",
        }
    }

    /// Advance per-frame animation; returns true if the camera moved
    pub fn update(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }

    /// Window title summarizing the current state
    pub fn title(&self) -> String {
        let base = &self.config.window.title;
        match (&self.status, &self.model) {
            (LoadStatus::Loading { label }, _) => format!("{} - loading {}", base, label),
            (LoadStatus::Failed { label, message }, _) => {
                format!("{} - failed to load {}: {}", base, label, message)
            }
            (_, Some(model)) => {
                let selected = self
                    .selection
                    .and_then(|id| model.node(id))
                    .map(|node| format!(" - {} [{}]", node.name, self.toggle_label()))
                    .unwrap_or_default();
                format!("{} - {}{}", base, model.name(), selected)
            }
            (_, None) => base.clone(),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
