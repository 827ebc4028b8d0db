//! Windowed viewer driven by a winit event loop
//!
//! Window events are translated into [`ViewerShell`] calls by
//! [`handle_window_event`], which the native loop here and the browser entry
//! point share. Cursor positions arrive in physical pixels relative to the
//! surface, so the whole surface is the canvas and no offset applies.

use std::sync::Arc;

use pointpick_core::{PointDataset, Result};
use pointpick_gpu::{PointCloudRenderer, RenderConfig};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::Key;
use winit::window::Window;

use crate::config::{RenderSettings, ViewerConfig};
use crate::viewer::{CanvasBounds, ViewerShell, ViewerState};

/// What a pointer event asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Rotate { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    Click { x: f32, y: f32 },
}

/// Tells clicks from drags.
///
/// A left press released within `click_tolerance` pixels of where it went
/// down is a click; once the pointer strays further the gesture stays a drag.
#[derive(Debug, Clone)]
pub struct PointerInput {
    click_tolerance: f32,
    position: Option<(f32, f32)>,
    press: Option<(f32, f32)>,
    dragging: bool,
    left_pressed: bool,
    right_pressed: bool,
}

impl PointerInput {
    pub fn new(click_tolerance: f32) -> Self {
        Self {
            click_tolerance: click_tolerance.max(0.0),
            position: None,
            press: None,
            dragging: false,
            left_pressed: false,
            right_pressed: false,
        }
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    pub fn moved(&mut self, x: f32, y: f32) -> Option<PointerAction> {
        let previous = self.position.replace((x, y));

        if let Some((px, py)) = self.press {
            let travel = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            if travel > self.click_tolerance {
                self.dragging = true;
            }
        }

        let (lx, ly) = previous?;
        let (dx, dy) = (x - lx, y - ly);
        if self.left_pressed {
            Some(PointerAction::Rotate { dx, dy })
        } else if self.right_pressed {
            Some(PointerAction::Pan { dx, dy })
        } else {
            None
        }
    }

    pub fn button(&mut self, button: MouseButton, state: ElementState) -> Option<PointerAction> {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left if pressed => {
                self.left_pressed = true;
                self.press = self.position;
                self.dragging = false;
                None
            }
            MouseButton::Left => {
                self.left_pressed = false;
                let press = self.press.take();
                let click = press.is_some() && !self.dragging;
                self.dragging = false;
                let (x, y) = self.position?;
                click.then_some(PointerAction::Click { x, y })
            }
            MouseButton::Right => {
                self.right_pressed = pressed;
                None
            }
            _ => None,
        }
    }

    /// Forget the pointer, e.g. when it leaves the window
    pub fn cancel(&mut self) {
        self.position = None;
        self.press = None;
        self.dragging = false;
        self.left_pressed = false;
        self.right_pressed = false;
    }
}

/// Whether the event loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// One wheel event as a signed step; positive zooms in
pub fn wheel_step(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
    }
}

/// Create a renderer for `window` with the configured strategy
pub async fn create_renderer(window: Arc<Window>, settings: RenderSettings) -> Result<PointCloudRenderer> {
    let config = RenderConfig {
        background_color: settings.background_rgba(),
        pixel_ratio: window.scale_factor() as f32,
    };
    log::info!("Rendering points with the {} strategy", settings.strategy);
    PointCloudRenderer::new(window, settings.strategy.create(), config).await
}

/// Apply one window event to the viewer
pub fn handle_window_event(
    shell: &mut ViewerShell<PointCloudRenderer>,
    pointer: &mut PointerInput,
    window: &Window,
    event: &WindowEvent,
) -> LoopControl {
    match event {
        WindowEvent::CloseRequested => {
            shell.teardown();
            return LoopControl::Exit;
        }
        WindowEvent::Resized(size) => shell.resize(size.width, size.height),
        WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
            if let Some(renderer) = shell.renderer_mut() {
                renderer.set_pixel_ratio(*scale_factor as f32);
            }
        }
        WindowEvent::CursorMoved { position, .. } => {
            match pointer.moved(position.x as f32, position.y as f32) {
                Some(PointerAction::Rotate { dx, dy }) => shell.on_pointer_drag(dx, dy),
                Some(PointerAction::Pan { dx, dy }) => shell.on_pan_drag(dx, dy),
                _ => {}
            }
        }
        WindowEvent::CursorLeft { .. } => pointer.cancel(),
        WindowEvent::MouseInput { state, button, .. } => {
            if let Some(PointerAction::Click { x, y }) = pointer.button(*button, *state) {
                let size = window.inner_size();
                let bounds = CanvasBounds::full(size.width as f32, size.height as f32);
                match shell.on_pointer_click(x, y, &bounds) {
                    Some(pick) => log::info!("Picked point {} at distance {:.3}", pick.point_index, pick.distance),
                    None => log::debug!("Click at ({}, {}) hit nothing", x, y),
                }
            }
        }
        WindowEvent::MouseWheel { delta, .. } => shell.on_wheel(wheel_step(delta)),
        WindowEvent::KeyboardInput { event, .. } => {
            if event.state == ElementState::Pressed {
                if let Key::Character(c) = &event.logical_key {
                    if c.as_str().eq_ignore_ascii_case("r") {
                        shell.reset_camera();
                    }
                }
            }
        }
        WindowEvent::RedrawRequested => {
            if let Err(e) = shell.render_frame() {
                log::error!("Frame failed: {}", e);
            }
        }
        _ => {}
    }
    LoopControl::Continue
}

/// Native viewer window around one point cloud
pub struct InteractiveViewer {
    shell: ViewerShell<PointCloudRenderer>,
}

impl InteractiveViewer {
    pub fn new(dataset: PointDataset, config: ViewerConfig) -> Self {
        Self {
            shell: ViewerShell::new(ViewerState::new(dataset, config)),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.shell.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.shell.state
    }

    /// Open the window and block until it is closed
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run(self) -> Result<()> {
        use pointpick_core::Error;
        use winit::dpi::LogicalSize;
        use winit::event::Event;
        use winit::event_loop::{ControlFlow, EventLoop};
        use winit::window::WindowBuilder;

        let mut shell = self.shell;
        let config = shell.state.config.clone();

        let event_loop =
            EventLoop::new().map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.render.title.as_str())
                .with_inner_size(LogicalSize::new(config.render.window_width, config.render.window_height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let renderer = pollster::block_on(create_renderer(window.clone(), config.render.clone()))?;
        let size = window.inner_size();
        shell.attach_renderer(renderer, size.width, size.height);
        log::info!("Viewer window open; drag to orbit, scroll to zoom, click to pick, R to reset");

        let mut pointer = PointerInput::new(config.controls.click_tolerance);
        event_loop
            .run(move |event, elwt| {
                elwt.set_control_flow(ControlFlow::Poll);
                match event {
                    Event::WindowEvent { event, window_id } if window_id == window.id() => {
                        if handle_window_event(&mut shell, &mut pointer, &window, &event) == LoopControl::Exit {
                            elwt.exit();
                        }
                    }
                    Event::AboutToWait => window.request_redraw(),
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop failed: {}", e)))
    }
}
