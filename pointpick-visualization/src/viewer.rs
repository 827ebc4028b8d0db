//! Viewer state and the handlers that drive it
//!
//! All mutable viewer data lives in one [`ViewerState`] that handlers take
//! by reference. GPU work is never done from input handlers: they only queue
//! uploads and releases, which [`draw_frame`] hands to the renderer before
//! drawing. That keeps clicks usable (and testable) without a device.

use pointpick_core::{PerspectiveCamera, Point3f, PointDataset, Ray, Result, Rgb, TriangleMesh};
use pointpick_picking::{
    ArrowHelper, ObjectId, ObjectKind, PickResult, PickingEngine, PixelPosition, Scene, SceneObject,
    SelectionState, SelectionStateMachine, Viewport,
};

use crate::config::ViewerConfig;
use crate::orbit::OrbitControls;

/// Placement of the drawing surface in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasBounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// A surface covering the whole client area
    pub fn full(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Client position relative to the surface's top-left corner
    pub fn to_local(&self, client_x: f32, client_y: f32) -> PixelPosition {
        PixelPosition::new(client_x - self.left, client_y - self.top)
    }

    /// Size of the surface as seen by the pointer
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

/// The rasterizer as seen by the viewer
pub trait FrameRenderer {
    /// Upload (or replace) the GPU copy of a scene object
    fn upload_object(&mut self, object: &SceneObject) -> Result<()>;

    /// Rewrite the color buffer of an uploaded point cloud
    fn update_point_colors(&mut self, id: ObjectId, colors: &[f32]) -> Result<()>;

    /// Free everything uploaded for `id`
    fn release_object(&mut self, id: ObjectId);

    fn resize(&mut self, width: u32, height: u32);

    fn draw(&mut self, camera: &PerspectiveCamera) -> Result<()>;
}

/// Everything the viewer knows, passed explicitly to every handler
#[derive(Debug)]
pub struct ViewerState {
    pub config: ViewerConfig,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub picking: PickingEngine,
    pub selection: SelectionStateMachine,
    /// The pickable point cloud
    pub point_cloud: ObjectId,
    pub planet: Option<ObjectId>,
    /// Arrow showing the most recent pick ray
    pub debug_ray: Option<ObjectId>,
    /// Surface size in pixels; unknown until the first resize
    pub viewport: Option<Viewport>,
    pub last_pick: Option<PickResult>,
    pending_uploads: Vec<ObjectId>,
    pending_releases: Vec<ObjectId>,
}

impl ViewerState {
    /// Build the scene around `dataset`: the point cloud plus, if enabled,
    /// the planet sphere
    pub fn new(mut dataset: PointDataset, config: ViewerConfig) -> Self {
        let selection = SelectionStateMachine::with_colors(config.picking.selection_colors());
        dataset.set_uniform_size(config.render.point_size);
        dataset.reset_colors(selection.colors().default_color);
        dataset.mark_colors_dirty();

        let mut scene = Scene::new();
        let planet = config.planet.enabled.then(|| {
            let planet = &config.planet;
            scene.add(
                "planet",
                ObjectKind::Mesh {
                    mesh: TriangleMesh::uv_sphere(planet.radius, planet.width_segments, planet.height_segments),
                    color: Rgb::from_hex(planet.color),
                },
            )
        });

        log::info!("Viewer scene holds {} points", dataset.len());
        let point_cloud = scene.add("points", ObjectKind::Points(dataset));

        let mut controls = OrbitControls::new(&config.controls);
        controls.target = Point3f::from(config.camera.target);

        Self {
            camera: config.camera.build(1.0),
            controls,
            picking: PickingEngine::with_threshold(config.picking.threshold),
            selection,
            point_cloud,
            planet,
            debug_ray: None,
            viewport: None,
            last_pick: None,
            pending_uploads: scene.ids(),
            pending_releases: Vec::new(),
            scene,
            config,
        }
    }

    pub fn dataset(&self) -> Option<&PointDataset> {
        self.scene.points(self.point_cloud)
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.current()
    }

    /// Objects waiting to be uploaded on the next frame
    pub fn pending_uploads(&self) -> &[ObjectId] {
        &self.pending_uploads
    }

    /// Objects whose GPU copies will be freed on the next frame
    pub fn pending_releases(&self) -> &[ObjectId] {
        &self.pending_releases
    }

    /// Queue every scene object for upload, e.g. after a new renderer attached
    pub fn queue_full_upload(&mut self) {
        self.pending_releases.clear();
        self.pending_uploads = self.scene.ids();
    }

    fn queue_release(&mut self, id: ObjectId) {
        // Objects that never reached the GPU have nothing to free
        if let Some(position) = self.pending_uploads.iter().position(|&queued| queued == id) {
            self.pending_uploads.remove(position);
        } else {
            self.pending_releases.push(id);
        }
    }

    /// Remove the debug arrow, if any, and queue its release
    pub fn clear_debug_ray(&mut self) {
        if let Some(id) = self.debug_ray.take() {
            if self.scene.remove(id).is_some() {
                self.queue_release(id);
            }
        }
    }

    fn replace_debug_ray(&mut self, ray: &Ray) {
        self.clear_debug_ray();

        let picking = &self.config.picking;
        if !picking.show_debug_ray {
            return;
        }

        let arrow = ArrowHelper::new(ray, picking.debug_ray_length, Rgb::from_hex(picking.debug_ray_color))
            .with_head_width(picking.debug_ray_head_width);
        let id = self.scene.add("debug ray", ObjectKind::Arrow(arrow));
        self.pending_uploads.push(id);
        self.debug_ray = Some(id);
    }

    /// Put camera and controls back to their configured start
    pub fn reset_camera(&mut self) {
        let aspect_ratio = self.camera.aspect_ratio;
        self.camera = self.config.camera.build(aspect_ratio);
        self.controls = OrbitControls::new(&self.config.controls);
        self.controls.target = Point3f::from(self.config.camera.target);
    }
}

/// Pick the point under the pointer and highlight it.
///
/// The pointer is normalized against the size of `bounds`. Clicks that
/// arrive before the viewport size is known are ignored.
pub fn handle_click(
    state: &mut ViewerState,
    client_x: f32,
    client_y: f32,
    bounds: &CanvasBounds,
) -> Option<PickResult> {
    if state.viewport.is_none() {
        log::debug!("Ignoring click before the viewport is known");
        return None;
    }

    let pointer = bounds.to_local(client_x, client_y);
    let cast = state.picking.cast(pointer, bounds.viewport(), &state.camera, &state.scene);

    if let Some(cast) = &cast {
        log::debug!(
            "Ray from {:?} along {:?} crossed {} objects",
            cast.ray.origin,
            cast.ray.direction,
            cast.candidates.len()
        );
        state.replace_debug_ray(&cast.ray);
    }

    let pick = cast
        .as_ref()
        .and_then(|cast| state.picking.resolve(cast, state.point_cloud));

    match state.scene.points_mut(state.point_cloud) {
        Some(dataset) => {
            if let Ok(selection) = state.selection.apply(dataset, pick.as_ref()) {
                log::debug!("Click at {:?} -> {:?}", pointer, selection);
            }
        }
        None => log::warn!("Point cloud {:?} is missing from the scene", state.point_cloud),
    }

    state.last_pick = pick;
    pick
}

/// Push queued GPU work to `renderer`
pub fn sync_renderer<R: FrameRenderer>(state: &mut ViewerState, renderer: &mut R) -> Result<()> {
    for id in state.pending_releases.drain(..) {
        renderer.release_object(id);
    }

    while let Some(&id) = state.pending_uploads.first() {
        if let Some(object) = state.scene.get(id) {
            renderer.upload_object(object)?;
        }
        state.pending_uploads.remove(0);

        // A fresh upload carries the current colors
        if let Some(dataset) = state.scene.points_mut(id) {
            dataset.take_colors_dirty();
        }
    }

    let id = state.point_cloud;
    if let Some(dataset) = state.scene.points_mut(id) {
        if dataset.take_colors_dirty() {
            if let Err(e) = renderer.update_point_colors(id, dataset.color_buffer()) {
                dataset.mark_colors_dirty();
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Advance the controls, sync the renderer and draw one frame
pub fn draw_frame<R: FrameRenderer>(state: &mut ViewerState, renderer: &mut R) -> Result<()> {
    state.controls.update(&mut state.camera);
    sync_renderer(state, renderer)?;
    renderer.draw(&state.camera)
}

/// Viewer state plus an optional renderer; input and frames are no-ops
/// until a renderer is attached
pub struct ViewerShell<R: FrameRenderer> {
    pub state: ViewerState,
    renderer: Option<R>,
}

impl<R: FrameRenderer> ViewerShell<R> {
    pub fn new(state: ViewerState) -> Self {
        Self { state, renderer: None }
    }

    /// Start rendering into a `width × height` surface
    pub fn attach_renderer(&mut self, renderer: R, width: u32, height: u32) {
        self.renderer = Some(renderer);
        self.state.queue_full_upload();
        self.resize(width, height);
    }

    pub fn is_ready(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn on_pointer_click(&mut self, client_x: f32, client_y: f32, bounds: &CanvasBounds) -> Option<PickResult> {
        if self.renderer.is_none() {
            return None;
        }
        handle_click(&mut self.state, client_x, client_y, bounds)
    }

    /// Orbit by a drag of `dx, dy` pixels
    pub fn on_pointer_drag(&mut self, dx: f32, dy: f32) {
        if let Some(viewport) = self.state.viewport {
            self.state.controls.rotate(dx, dy, viewport.height);
        }
    }

    /// Pan by a drag of `dx, dy` pixels; ignored unless panning is enabled
    pub fn on_pan_drag(&mut self, dx: f32, dy: f32) {
        if let Some(viewport) = self.state.viewport {
            let state = &mut self.state;
            state.controls.pan(dx, dy, &state.camera, viewport.height);
        }
    }

    /// One wheel step; positive values zoom in
    pub fn on_wheel(&mut self, delta: f32) {
        self.state.controls.dolly(delta);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.state.viewport = Some(Viewport::new(width as f32, height as f32));
        self.state.camera.set_aspect_ratio(width, height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }

    pub fn reset_camera(&mut self) {
        self.state.reset_camera();
        log::info!("Camera reset");
    }

    /// Draw one frame; does nothing before a renderer is attached
    pub fn render_frame(&mut self) -> Result<()> {
        match self.renderer.as_mut() {
            Some(renderer) => draw_frame(&mut self.state, renderer),
            None => Ok(()),
        }
    }

    /// Free all GPU resources and detach the renderer
    pub fn teardown(&mut self) -> Option<R> {
        self.state.clear_debug_ray();
        let mut renderer = self.renderer.take()?;

        for id in self.state.pending_releases.drain(..) {
            renderer.release_object(id);
        }
        for id in self.state.scene.ids() {
            renderer.release_object(id);
        }
        self.state.pending_uploads.clear();

        log::info!("Viewer torn down");
        Some(renderer)
    }
}
