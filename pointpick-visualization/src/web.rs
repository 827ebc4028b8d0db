//! Browser entry point
//!
//! The viewer attaches to an existing `<canvas>`. Creating the GPU device is
//! asynchronous in the browser, so the renderer is built on the JS task
//! queue and handed to the event loop once ready; until then input is
//! ignored by the shell.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use pointpick_core::PointDataset;
use pointpick_gpu::PointCloudRenderer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::web::{EventLoopExtWebSys, WindowBuilderExtWebSys};
use winit::window::WindowBuilder;

use crate::config::ViewerConfig;
use crate::interactive_viewer::{create_renderer, handle_window_event, LoopControl, PointerInput};
use crate::viewer::{ViewerShell, ViewerState};

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(canvas_id))
        .ok_or_else(|| js_error(format!("No element with id '{}'", canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error(format!("Element '{}' is not a canvas", canvas_id)))
}

/// Show `positions` (flat xyz triplets) in the canvas `canvas_id`
#[wasm_bindgen]
pub fn start_viewer(canvas_id: &str, positions: Vec<f32>) -> Result<(), JsValue> {
    init_logging();
    start(canvas_id, positions, ViewerConfig::default())
}

/// Like [`start_viewer`], with settings from a TOML document
#[wasm_bindgen]
pub fn start_viewer_with_config(canvas_id: &str, positions: Vec<f32>, config_toml: &str) -> Result<(), JsValue> {
    init_logging();
    let config = ViewerConfig::from_toml_str(config_toml).map_err(js_error)?;
    start(canvas_id, positions, config)
}

fn start(canvas_id: &str, positions: Vec<f32>, config: ViewerConfig) -> Result<(), JsValue> {
    let dataset = PointDataset::load(positions).map_err(js_error)?;
    let canvas = find_canvas(canvas_id)?;

    let event_loop = EventLoop::new().map_err(js_error)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_canvas(Some(canvas))
            .build(&event_loop)
            .map_err(js_error)?,
    );

    let ready: Rc<RefCell<Option<PointCloudRenderer>>> = Rc::default();
    {
        let ready = ready.clone();
        let window = window.clone();
        let settings = config.render.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match create_renderer(window, settings).await {
                Ok(renderer) => *ready.borrow_mut() = Some(renderer),
                Err(e) => log::error!("Failed to create renderer: {}", e),
            }
        });
    }

    let mut pointer = PointerInput::new(config.controls.click_tolerance);
    let mut shell = ViewerShell::new(ViewerState::new(dataset, config));

    event_loop.spawn(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        if !shell.is_ready() {
            if let Some(renderer) = ready.borrow_mut().take() {
                let size = window.inner_size();
                shell.attach_renderer(renderer, size.width, size.height);
                log::info!("Renderer ready");
            }
        }

        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => {
                if handle_window_event(&mut shell, &mut pointer, &window, &event) == LoopControl::Exit {
                    elwt.exit();
                }
            }
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    });

    Ok(())
}
