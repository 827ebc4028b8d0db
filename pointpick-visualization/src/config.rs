//! Viewer configuration
//!
//! Every section uses `#[serde(default)]`, so a TOML file only needs the
//! values it overrides. Colors are packed `0xRRGGBB` integers, which TOML
//! accepts as hex literals.

use std::path::Path;

use pointpick_core::{Error, PerspectiveCamera, Point3f, Result, Rgb};
use pointpick_gpu::StrategyKind;
use pointpick_picking::SelectionColors;
use serde::{Deserialize, Serialize};

/// Top-level viewer settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub picking: PickingConfig,
    pub planet: PlanetConfig,
    pub render: RenderSettings,
}

impl ViewerConfig {
    /// Parse a TOML document; missing fields keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded viewer configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject settings no viewer can run with
    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(Error::Config(format!("camera.fov must be in (0, 180), got {}", camera.fov)));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(Error::Config(format!(
                "camera clip planes must satisfy 0 < near < far, got {} and {}",
                camera.near, camera.far
            )));
        }
        if camera.zoom <= 0.0 {
            return Err(Error::Config(format!("camera.zoom must be positive, got {}", camera.zoom)));
        }

        let controls = &self.controls;
        if controls.min_distance < 0.0 || controls.min_distance > controls.max_distance {
            return Err(Error::Config(format!(
                "controls distance range [{}, {}] is empty",
                controls.min_distance, controls.max_distance
            )));
        }
        if !(0.0..=1.0).contains(&controls.damping_factor) {
            return Err(Error::Config(format!(
                "controls.damping_factor must be in [0, 1], got {}",
                controls.damping_factor
            )));
        }

        if self.picking.threshold < 0.0 {
            return Err(Error::Config(format!(
                "picking.threshold must not be negative, got {}",
                self.picking.threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            position: [15.0, 42.0, -100.0],
            target: [0.0, 0.0, 0.0],
            zoom: 5.0,
        }
    }
}

impl CameraConfig {
    pub fn build(&self, aspect_ratio: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(self.fov, aspect_ratio, self.near, self.far);
        camera.position = Point3f::from(self.position);
        camera.target = Point3f::from(self.target);
        camera.zoom = self.zoom;
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Pointer travel in pixels below which a press and release is a click
    pub click_tolerance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.1,
            pan_speed: 1.0,
            min_distance: 4.0,
            max_distance: 100.0,
            enable_pan: false,
            enable_damping: true,
            damping_factor: 0.05,
            click_tolerance: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Ray-to-point proximity in world units
    pub threshold: f32,
    pub default_color: u32,
    pub highlight_color: u32,
    pub show_debug_ray: bool,
    pub debug_ray_length: f32,
    pub debug_ray_color: u32,
    pub debug_ray_head_width: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            default_color: 0xffffff,
            highlight_color: 0xff0000,
            show_debug_ray: true,
            debug_ray_length: 300.0,
            debug_ray_color: 0xffff00,
            debug_ray_head_width: 1.0,
        }
    }
}

impl PickingConfig {
    pub fn selection_colors(&self) -> SelectionColors {
        SelectionColors {
            default_color: Rgb::from_hex(self.default_color),
            highlight: Rgb::from_hex(self.highlight_color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub enabled: bool,
    pub radius: f32,
    pub width_segments: usize,
    pub height_segments: usize,
    pub color: u32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 2.0,
            width_segments: 32,
            height_segments: 32,
            color: 0x3322ff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub strategy: StrategyKind,
    /// Pixel size used by the fixed-size strategy
    pub point_size: f32,
    pub background_color: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Fixed,
            point_size: pointpick_core::DEFAULT_POINT_SIZE,
            background_color: 0x000000,
            window_width: 1280,
            window_height: 800,
            title: "pointpick".to_string(),
        }
    }
}

impl RenderSettings {
    pub fn background_rgba(&self) -> [f64; 4] {
        let rgb = Rgb::from_hex(self.background_color);
        [rgb.r as f64, rgb.g as f64, rgb.b as f64, 1.0]
    }
}
