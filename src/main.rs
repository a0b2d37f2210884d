//! Interactive shape viewer with iced UI.
//!
//! Drag a shape with the left button to rotate it, the right button to scale
//! it and the middle button to move it. Space cycles through the predefined
//! shapes and `w` toggles wireframe rendering. Uses iced for UI and wgpu for
//! GPU rendering.

use iced::widget::{Column, Row, Shader, Slider, text};
use iced::{Element, Length, Settings, Task};

mod camera;
mod config;
mod interaction;
mod pointer;
mod ray_casting;
mod renderer;
mod scene;
mod selection;
mod shapes;
mod teapot;
mod transform;
mod viewer;

use config::ViewerConfig;
use shapes::ShapeKind;
use viewer::ViewerProgram;

const HELP: &str = "Left drag: rotate\nRight drag: scale\nMiddle drag: move\nSpace: next shape\nW: wireframe";

/// Main application state - handles UI controls only
#[derive(Debug)]
pub(crate) struct ShapeViewerApp {
    sensitivity: f32,
    shape: ShapeKind,
    wireframe: bool,
}

/// Messages that the application can receive
#[derive(Debug, Clone)]
pub(crate) enum Message {
    Sensitivity(f32),
    /// Reported by the viewport after a "next shape" command
    ShapeChanged(ShapeKind),
    WireframeToggled(bool),
}

impl ShapeViewerApp {
    pub(crate) fn new() -> Self {
        Self {
            sensitivity: ViewerConfig::default().sensitivity,
            shape: ShapeKind::ALL[0],
            wireframe: false,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        "Shape Viewer"
    }

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Sensitivity(value) => {
                self.sensitivity = value;
            }
            Message::ShapeChanged(shape) => {
                self.shape = shape;
            }
            Message::WireframeToggled(wireframe) => {
                self.wireframe = wireframe;
            }
        }

        Task::none()
    }

    pub(crate) fn view(&self) -> Element<Message> {
        // Left pane with help and controls
        let controls = Column::new()
            .spacing(20)
            .push(text(HELP))
            .push(
                Column::new()
                    .spacing(5)
                    .push(text(format!("Shape: {}", self.shape)))
                    .push(text(format!(
                        "Wireframe: {}",
                        if self.wireframe { "on" } else { "off" }
                    ))),
            )
            .push(
                Column::new()
                    .spacing(5)
                    .push(text(format!("Drag Sensitivity: {:.3}", self.sensitivity)))
                    .push(
                        Slider::new(0.001..=0.05, self.sensitivity, Message::Sensitivity)
                            .step(0.001)
                            .width(250),
                    ),
            );

        // Right pane with 3D viewport
        let viewport = Shader::new(ViewerProgram::new(self.sensitivity))
            .width(Length::Fill)
            .height(Length::Fill);

        Row::new()
            .spacing(10)
            .padding(10)
            .push(
                iced::widget::container(controls)
                    .width(Length::Shrink)
                    .height(Length::Fill),
            )
            .push(viewport)
            .into()
    }
}

fn main() -> iced::Result {
    env_logger::builder().format_timestamp(None).init();

    let app = ShapeViewerApp::new();
    iced::application(app.title(), ShapeViewerApp::update, ShapeViewerApp::view)
        .settings(Settings {
            antialiasing: true,
            ..Settings::default()
        })
        .run_with(move || (app, Task::none()))
}
