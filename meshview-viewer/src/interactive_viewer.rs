//! Interactive window for a [`Viewer`]
//!
//! Mouse:
//! - left click: select the part under the cursor
//! - left drag: orbit
//! - right drag: pan
//! - wheel: dolly
//!
//! Keys: `R` reset camera, `+`/`=` zoom in, `-` zoom out, `H` hide or unhide
//! the selection, `U` unhide everything, `O` open a file, `Esc` quit. Files
//! dropped onto the window are loaded.

use std::sync::Arc;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use crate::config::ViewerConfig;
use crate::loader::ModelLoader;
use crate::viewer::{LoadOutcome, Viewer};
use meshview_core::{Error, Result};
use meshview_gpu::{scene_vertices, MeshRenderer};
use meshview_io::ModelSource;
use tracing::{debug, info, warn};

/// Pointer travel in pixels below which a press and release count as a click
const CLICK_SLOP: f64 = 4.0;

/// User actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ResetCamera,
    ZoomIn,
    ZoomOut,
    ToggleSelected,
    UnhideAll,
    OpenFile,
    Quit,
}

impl KeyAction {
    /// Action bound to a logical key, if any
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::Escape) => Some(Self::Quit),
            Key::Character(c) => Self::from_char(c.as_str()),
            _ => None,
        }
    }

    fn from_char(c: &str) -> Option<Self> {
        match c {
            "r" | "R" => Some(Self::ResetCamera),
            "+" | "=" => Some(Self::ZoomIn),
            "-" | "_" => Some(Self::ZoomOut),
            "h" | "H" => Some(Self::ToggleSelected),
            "u" | "U" => Some(Self::UnhideAll),
            "o" | "O" => Some(Self::OpenFile),
            _ => None,
        }
    }
}

/// Mouse button state, telling clicks apart from drags
#[derive(Debug, Default)]
struct PointerState {
    position: Option<PhysicalPosition<f64>>,
    left: bool,
    right: bool,
    /// Distance moved since the left button went down
    travel: f64,
}

/// What a pointer event asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerAction {
    Click(f32, f32),
    Rotate(f32, f32),
    Pan(f32, f32),
}

impl PointerState {
    fn moved(&mut self, position: PhysicalPosition<f64>) -> Option<PointerAction> {
        let last = self.position.replace(position)?;
        let (dx, dy) = (position.x - last.x, position.y - last.y);
        if self.left {
            self.travel += dx.hypot(dy);
            if self.travel >= CLICK_SLOP {
                return Some(PointerAction::Rotate(dx as f32, dy as f32));
            }
        } else if self.right {
            return Some(PointerAction::Pan(dx as f32, dy as f32));
        }
        None
    }

    fn button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerAction> {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => {
                let was_down = std::mem::replace(&mut self.left, pressed);
                if pressed {
                    self.travel = 0.0;
                    None
                } else if was_down && self.travel < CLICK_SLOP {
                    self.position
                        .map(|p| PointerAction::Click(p.x as f32, p.y as f32))
                } else {
                    None
                }
            }
            MouseButton::Right => {
                self.right = pressed;
                None
            }
            _ => None,
        }
    }
}

/// A window showing one [`Viewer`]
pub struct InteractiveViewer {
    viewer: Viewer,
    loader: ModelLoader,
    pointer: PointerState,
    uploaded_revision: Option<u64>,
    title: String,
}

impl InteractiveViewer {
    /// Create a viewer window; nothing is shown until [`run`](Self::run)
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            viewer: Viewer::new(config),
            loader: ModelLoader::new()?,
            pointer: PointerState::default(),
            uploaded_revision: None,
            title: String::new(),
        })
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Start loading a model in the background
    pub fn open(&mut self, source: ModelSource) {
        let ticket = self.viewer.begin_load(source.label());
        self.loader.spawn(ticket, source);
    }

    /// Run the event loop until the window closes
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let settings = &self.viewer.config().window;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(settings.title.clone())
                .with_inner_size(LogicalSize::new(settings.width, settings.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let render_config = self.viewer.config().render.to_render_config();
        let mut renderer = pollster::block_on(MeshRenderer::new(window.clone(), render_config))?;

        let size = window.inner_size();
        self.viewer.resize(size.width, size.height);
        info!(width = size.width, height = size.height, "viewer window ready");

        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Poll);
                match event {
                    Event::WindowEvent { event, .. } => {
                        self.handle_window_event(event, target, &window, &mut renderer)
                    }
                    Event::AboutToWait => {
                        self.drain_loads();
                        window.request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))
    }

    fn handle_window_event(
        &mut self,
        event: WindowEvent,
        target: &EventLoopWindowTarget<()>,
        window: &Window,
        renderer: &mut MeshRenderer,
    ) {
        match event {
            WindowEvent::CloseRequested => target.exit(),
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                self.viewer.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(action) = self.pointer.moved(position) {
                    self.pointer_action(action);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(action) = self.pointer.button(button, state) {
                    self.pointer_action(action);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                // scrolling up moves closer
                let (controls, _) = self.viewer.controls_mut();
                controls.wheel(-scroll);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Some(action) = KeyAction::from_key(&event.logical_key) {
                    self.key_action(action, target);
                }
            }
            WindowEvent::DroppedFile(path) => {
                info!(path = %path.display(), "file dropped");
                self.open(ModelSource::Path(path));
            }
            WindowEvent::RedrawRequested => self.redraw(window, renderer),
            _ => {}
        }
    }

    fn pointer_action(&mut self, action: PointerAction) {
        let height = self.viewer.viewport().1 as f32;
        match action {
            PointerAction::Click(x, y) => {
                self.viewer.click(x, y);
            }
            PointerAction::Rotate(dx, dy) => {
                let (controls, _) = self.viewer.controls_mut();
                controls.drag_rotate(dx, dy, height);
            }
            PointerAction::Pan(dx, dy) => {
                let (controls, camera) = self.viewer.controls_mut();
                controls.drag_pan(dx, dy, height, camera);
            }
        }
    }

    fn key_action(&mut self, action: KeyAction, target: &EventLoopWindowTarget<()>) {
        debug!(?action, "key");
        match action {
            KeyAction::ResetCamera => {
                self.viewer.reset_camera();
            }
            KeyAction::ZoomIn => self.viewer.zoom_in(),
            KeyAction::ZoomOut => self.viewer.zoom_out(),
            KeyAction::ToggleSelected => {
                self.viewer.toggle_selected();
            }
            KeyAction::UnhideAll => self.viewer.unhide_all(),
            KeyAction::OpenFile => {
                let picked = rfd::FileDialog::new()
                    .add_filter("Wavefront OBJ", &["obj", "OBJ"])
                    .pick_file();
                if let Some(path) = picked {
                    self.open(ModelSource::Path(path));
                }
            }
            KeyAction::Quit => target.exit(),
        }
    }

    fn drain_loads(&mut self) {
        for done in self.loader.poll() {
            if let LoadOutcome::Failed(message) = self.viewer.apply(done) {
                warn!(error = %message, "keeping previous model");
            }
        }
    }

    fn redraw(&mut self, window: &Window, renderer: &mut MeshRenderer) {
        self.viewer.update();

        let revision = self.viewer.revision();
        if self.uploaded_revision != Some(revision) {
            let vertices = match self.viewer.model() {
                Some(model) => scene_vertices(model, self.viewer.selection(), renderer.style()),
                None => Vec::new(),
            };
            renderer.upload(&vertices);
            self.uploaded_revision = Some(revision);
        }

        let title = self.viewer.title();
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }

        let camera = self.viewer.camera();
        renderer.update_camera(camera.view_matrix(), camera.projection_matrix(), camera.position);
        if let Err(e) = renderer.render() {
            warn!(error = %e, "render failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PhysicalPosition<f64> {
        PhysicalPosition::new(x, y)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyAction::from_key(&Key::Named(NamedKey::Escape)), Some(KeyAction::Quit));
        assert_eq!(KeyAction::from_key(&Key::Character("=".into())), Some(KeyAction::ZoomIn));
        assert_eq!(KeyAction::from_key(&Key::Character("+".into())), Some(KeyAction::ZoomIn));
        assert_eq!(KeyAction::from_key(&Key::Character("-".into())), Some(KeyAction::ZoomOut));
        assert_eq!(KeyAction::from_key(&Key::Character("H".into())), Some(KeyAction::ToggleSelected));
        assert_eq!(KeyAction::from_key(&Key::Character("u".into())), Some(KeyAction::UnhideAll));
        assert_eq!(KeyAction::from_key(&Key::Character("x".into())), None);
    }

    #[test]
    fn test_press_release_in_place_is_click() {
        let mut pointer = PointerState::default();
        pointer.moved(at(10.0, 20.0));
        assert_eq!(pointer.button(MouseButton::Left, ElementState::Pressed), None);
        assert_eq!(pointer.moved(at(11.0, 20.0)), None);
        assert_eq!(
            pointer.button(MouseButton::Left, ElementState::Released),
            Some(PointerAction::Click(11.0, 20.0))
        );
    }

    #[test]
    fn test_drag_is_not_click() {
        let mut pointer = PointerState::default();
        pointer.moved(at(0.0, 0.0));
        pointer.button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(pointer.moved(at(10.0, 0.0)), Some(PointerAction::Rotate(10.0, 0.0)));
        assert_eq!(pointer.button(MouseButton::Left, ElementState::Released), None);
    }

    #[test]
    fn test_right_drag_pans() {
        let mut pointer = PointerState::default();
        pointer.moved(at(0.0, 0.0));
        pointer.button(MouseButton::Right, ElementState::Pressed);
        assert_eq!(pointer.moved(at(3.0, 4.0)), Some(PointerAction::Pan(3.0, 4.0)));
        pointer.button(MouseButton::Right, ElementState::Released);
        assert_eq!(pointer.moved(at(5.0, 5.0)), None);
    }
}
