//! Shader widget hosting the interactive shape viewport.
//!
//! The widget state owns the whole interaction core. iced events are routed
//! into it as they arrive, and every `RedrawRequested` runs one frame pass:
//! resolve the pending hit test, dispatch the drag to a transform channel,
//! apply the transform to the active shape, then request the next frame.

use iced::widget::shader::{self, wgpu};
use iced::{Rectangle, Size, event, keyboard, mouse, window};
use nalgebra::Matrix4;

use crate::Message;
use crate::camera::{Camera, Projection};
use crate::config::ViewerConfig;
use crate::interaction::{Gesture, MouseButton, TransformChannel, dispatch};
use crate::pointer::PointerTracker;
use crate::ray_casting::pointer_hits_scene;
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::selection::SelectionRegistry;
use crate::shapes::ShapeKind;
use crate::transform::TransformState;

/// Viewport size assumed until the first layout arrives
const INITIAL_SIZE: Size = Size::new(800.0, 600.0);

/// Keyboard commands understood by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    NextShape,
    ToggleWireframe,
}

impl Command {
    pub(crate) fn from_key(key: &keyboard::Key) -> Option<Self> {
        match key {
            keyboard::Key::Named(keyboard::key::Named::Space) => Some(Command::NextShape),
            keyboard::Key::Character(c) if c.as_str() == "w" => Some(Command::ToggleWireframe),
            _ => None,
        }
    }
}

/// Snapshot of the active shape handed to the GPU
#[derive(Debug, Clone)]
pub(crate) struct ShapePrimitive {
    pub(crate) kind: ShapeKind,
    pub(crate) model: Matrix4<f32>,
    pub(crate) normal_matrix: Matrix4<f32>,
    pub(crate) wireframe: bool,
    pub(crate) camera: Camera,
    pub(crate) projection: Projection,
    pub(crate) config: ViewerConfig,
}

impl shader::Primitive for ShapePrimitive {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        storage: &mut shader::Storage,
        bounds: &Rectangle,
        viewport: &shader::Viewport,
    ) {
        let scale = viewport.scale_factor() as f32;
        let physical_bounds = Rectangle {
            x: bounds.x * scale,
            y: bounds.y * scale,
            width: bounds.width * scale,
            height: bounds.height * scale,
        };

        if !storage.has::<Renderer>() {
            let renderer = pollster::block_on(Renderer::new(
                device,
                format,
                physical_bounds,
                viewport.physical_size(),
                &self.config,
            ));
            storage.store(renderer);
        }
        let Some(renderer) = storage.get_mut::<Renderer>() else {
            return;
        };
        renderer.resize(device, physical_bounds, viewport.physical_size());
        renderer.update_shape(
            queue,
            &self.camera,
            &self.projection,
            self.kind,
            &self.model,
            &self.normal_matrix,
            self.wireframe,
        );
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        storage: &shader::Storage,
        target: &wgpu::TextureView,
        _clip_bounds: &Rectangle<u32>,
    ) {
        if let Some(renderer) = storage.get::<Renderer>() {
            renderer.render(encoder, target);
        }
    }
}

/// Interaction core plus the scene it manipulates
pub(crate) struct ViewerState {
    config: ViewerConfig,
    selection: SelectionRegistry<ShapeKind>,
    scene: Scene,
    pointer: PointerTracker,
    gesture: Gesture,
    transform: TransformState,
    camera: Camera,
    projection: Projection,
    size: Size,
}

impl ViewerState {
    pub(crate) fn new(config: ViewerConfig) -> Self {
        let selection = SelectionRegistry::from(ShapeKind::ALL);
        let mut scene = Scene::new(&ShapeKind::ALL);
        selection.activate_initial(&mut scene);

        let mut state = Self {
            config,
            selection,
            scene,
            pointer: PointerTracker::new(INITIAL_SIZE.width, INITIAL_SIZE.height),
            gesture: Gesture::Idle,
            transform: TransformState::new(),
            camera: Camera::looking_at_origin(config.camera_distance),
            projection: Projection::new(&config, INITIAL_SIZE.width, INITIAL_SIZE.height),
            size: INITIAL_SIZE,
        };
        state.apply_transform();
        state
    }

    pub(crate) fn active_shape(&self) -> ShapeKind {
        self.selection.active()
    }

    #[cfg(test)]
    pub(crate) fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub(crate) fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Rescale normalized coordinates and the projection for a new viewport size.
    pub(crate) fn resize(&mut self, size: Size) {
        if size == self.size || size.width <= 0.0 || size.height <= 0.0 {
            return;
        }
        log::debug!("viewport resized to {}x{}", size.width, size.height);
        self.size = size;
        self.pointer.resize(size.width, size.height);
        self.projection.resize(size.width, size.height);
    }

    pub(crate) fn cursor_moved(&mut self, x: f32, y: f32) {
        self.pointer.on_move(x, y);
    }

    pub(crate) fn button_pressed(&mut self, button: MouseButton) {
        self.gesture.on_press(button);
    }

    pub(crate) fn button_released(&mut self) {
        self.gesture.on_release();
    }

    /// Run a keyboard command, returning the message that reports its effect.
    pub(crate) fn command(&mut self, command: Command) -> Message {
        match command {
            Command::NextShape => {
                let next = self.selection.advance(&mut self.scene);
                self.apply_transform();
                log::info!("showing {next}");
                Message::ShapeChanged(next)
            }
            Command::ToggleWireframe => {
                self.transform.toggle_wireframe();
                log::debug!("wireframe {}", self.transform.wireframe);
                Message::WireframeToggled(self.transform.wireframe)
            }
        }
    }

    /// One frame of interaction: hit test, drag dispatch, apply.
    pub(crate) fn frame(&mut self, sensitivity: f32) -> Option<TransformChannel> {
        self.gesture.resolve_pending_hit(|| {
            pointer_hits_scene(
                self.pointer.normalized(),
                &self.camera,
                &self.projection,
                &self.scene,
            )
        });
        let channel = dispatch(&self.gesture, &self.pointer, &mut self.transform, sensitivity);
        self.apply_transform();
        self.pointer.settle();
        channel
    }

    fn apply_transform(&mut self) {
        if let Some(shape) = self.scene.shape_mut(self.selection.active()) {
            self.transform.apply_to(shape);
        }
    }

    /// Snapshot of the active shape; an empty model matrix if it is missing from the scene.
    fn primitive(&self) -> ShapePrimitive {
        let kind = self.active_shape();
        let (model, normal_matrix, wireframe) = match self.scene.shape(kind) {
            Some(shape) => (shape.model_matrix(), shape.normal_matrix(), shape.wireframe()),
            None => {
                log::warn!("active shape {kind} is missing from the scene, drawing nothing");
                (Matrix4::zeros(), Matrix4::identity(), false)
            }
        };
        ShapePrimitive {
            kind,
            model,
            normal_matrix,
            wireframe,
            camera: self.camera,
            projection: self.projection,
            config: self.config,
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

/// The shader program that routes iced events into the viewer state
pub(crate) struct ViewerProgram {
    sensitivity: f32,
}

impl ViewerProgram {
    pub(crate) fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }
}

impl shader::Program<Message> for ViewerProgram {
    type State = ViewerState;
    type Primitive = ShapePrimitive;

    fn update(
        &self,
        state: &mut Self::State,
        event: shader::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
        shell: &mut iced::advanced::Shell<'_, Message>,
    ) -> (event::Status, Option<Message>) {
        state.resize(bounds.size());

        match event {
            shader::Event::Mouse(mouse_event) => {
                (self.handle_mouse_event(state, mouse_event, bounds, cursor), None)
            }
            shader::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => {
                match Command::from_key(&key) {
                    Some(command) => (event::Status::Captured, Some(state.command(command))),
                    None => (event::Status::Ignored, None),
                }
            }
            shader::Event::RedrawRequested(_) => {
                state.frame(self.sensitivity);
                shell.request_redraw(window::RedrawRequest::NextFrame);
                (event::Status::Ignored, None)
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        _cursor: mouse::Cursor,
        _bounds: Rectangle,
    ) -> Self::Primitive {
        state.primitive()
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.gesture().hit_active() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

impl ViewerProgram {
    /// Handle mouse events for shape manipulation
    fn handle_mouse_event(
        &self,
        state: &mut ViewerState,
        mouse_event: mouse::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> event::Status {
        match mouse_event {
            mouse::Event::CursorMoved { position } => {
                // Tracked outside the bounds too so drags keep going past the edge
                state.cursor_moved(position.x - bounds.x, position.y - bounds.y);
                if state.gesture().pressed() {
                    return event::Status::Captured;
                }
            }
            mouse::Event::ButtonPressed(button) => {
                if cursor.position_in(bounds).is_some() {
                    state.button_pressed(button.into());
                    return event::Status::Captured;
                }
            }
            mouse::Event::ButtonReleased(_) => {
                if state.gesture().pressed() {
                    state.button_released();
                    return event::Status::Captured;
                }
            }
            mouse::Event::WheelScrolled { .. }
            | mouse::Event::CursorEntered
            | mouse::Event::CursorLeft => {}
        }

        event::Status::Ignored
    }
}
