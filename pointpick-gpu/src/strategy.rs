//! How points are rasterized
//!
//! Every point is drawn as a screen-aligned quad. A strategy decides the
//! quad's size in pixels and the alpha of each of its fragments; both
//! strategies blend additively and test against the depth buffer.
//!
//! The CPU functions [`PointRenderingStrategy::screen_size`] and
//! [`PointRenderingStrategy::fragment_alpha`] mirror the WGSL so the shading
//! rules can be checked without a device.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `src * alpha + dst`
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Strategy selector used by configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Fixed,
    DepthScaled,
}

impl StrategyKind {
    /// Build the strategy with its default parameters
    pub fn create(self) -> Box<dyn PointRenderingStrategy> {
        match self {
            StrategyKind::Fixed => Box::new(FixedSizePoints),
            StrategyKind::DepthScaled => Box::new(DepthScaledShaderPoints::default()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Fixed => write!(f, "fixed"),
            StrategyKind::DepthScaled => write!(f, "depth_scaled"),
        }
    }
}

/// Rasterization rules for point quads
pub trait PointRenderingStrategy: fmt::Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// WGSL module with `vs_main` and `fs_main`
    fn shader_source(&self) -> &'static str;

    /// Parameters handed to the shader through the point style uniform
    fn shader_params(&self) -> [f32; 4];

    fn blend_state(&self) -> wgpu::BlendState {
        ADDITIVE_BLENDING
    }

    fn depth_write_enabled(&self) -> bool {
        true
    }

    /// Quad edge length in pixels for a point with the given size attribute
    /// and clip-space `w`
    fn screen_size(&self, size_attribute: f32, clip_w: f32) -> f32;

    /// Fragment alpha at `coord`, the position inside the quad in `[-1, 1]²`
    fn fragment_alpha(&self, coord: [f32; 2]) -> f32;
}

/// Squares of a constant pixel size taken from the size attribute
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSizePoints;

impl PointRenderingStrategy for FixedSizePoints {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fixed
    }

    fn shader_source(&self) -> &'static str {
        include_str!("shaders/fixed_points.wgsl")
    }

    fn shader_params(&self) -> [f32; 4] {
        [0.0; 4]
    }

    fn screen_size(&self, size_attribute: f32, _clip_w: f32) -> f32 {
        size_attribute
    }

    fn fragment_alpha(&self, _coord: [f32; 2]) -> f32 {
        1.0
    }
}

/// Soft round sprites that shrink with distance between two pixel bounds
#[derive(Debug, Clone, Copy)]
pub struct DepthScaledShaderPoints {
    /// Pixel size at clip `w == 1`
    pub scale: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for DepthScaledShaderPoints {
    fn default() -> Self {
        Self {
            scale: 320_000.0,
            min_size: 7.5,
            max_size: 20.0,
        }
    }
}

impl PointRenderingStrategy for DepthScaledShaderPoints {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DepthScaled
    }

    fn shader_source(&self) -> &'static str {
        include_str!("shaders/depth_scaled_points.wgsl")
    }

    fn shader_params(&self) -> [f32; 4] {
        [self.scale, self.min_size, self.max_size, 0.0]
    }

    fn screen_size(&self, _size_attribute: f32, clip_w: f32) -> f32 {
        (self.scale / clip_w).clamp(self.min_size, self.max_size)
    }

    fn fragment_alpha(&self, coord: [f32; 2]) -> f32 {
        let radius = (coord[0] * coord[0] + coord[1] * coord[1]).sqrt();
        let falloff = 1.0 - radius.min(1.0);
        (falloff + 0.1).min(1.0).powi(3).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_size_ignores_depth() {
        let strategy = FixedSizePoints;
        assert_eq!(strategy.screen_size(3.0, 1.0), 3.0);
        assert_eq!(strategy.screen_size(3.0, 500.0), 3.0);
        assert_eq!(strategy.fragment_alpha([0.9, -0.9]), 1.0);
    }

    #[test]
    fn test_depth_scaled_size_is_clamped() {
        let strategy = DepthScaledShaderPoints::default();
        assert_relative_eq!(strategy.screen_size(10.0, 100.0), 20.0);
        assert_relative_eq!(strategy.screen_size(10.0, 100_000.0), 7.5);
        assert_relative_eq!(strategy.screen_size(10.0, 20_000.0), 16.0);
    }

    #[test]
    fn test_depth_scaled_alpha_falloff() {
        let strategy = DepthScaledShaderPoints::default();

        // Center saturates
        assert_relative_eq!(strategy.fragment_alpha([0.0, 0.0]), 1.0);
        // Halfway out: (0.5 + 0.1)^3
        assert_relative_eq!(strategy.fragment_alpha([0.5, 0.0]), 0.216, epsilon = 1e-6);
        // Rim and beyond keep the 0.1 floor
        assert_relative_eq!(strategy.fragment_alpha([1.0, 0.0]), 0.001, epsilon = 1e-6);
        assert_relative_eq!(strategy.fragment_alpha([1.0, 1.0]), 0.001, epsilon = 1e-6);

        let mut previous = f32::INFINITY;
        for step in 0..=10 {
            let alpha = strategy.fragment_alpha([step as f32 / 10.0, 0.0]);
            assert!(alpha <= previous);
            assert!((0.0..=1.0).contains(&alpha));
            previous = alpha;
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [StrategyKind::Fixed, StrategyKind::DepthScaled] {
            assert_eq!(kind.create().kind(), kind);
        }
        assert_eq!(StrategyKind::DepthScaled.to_string(), "depth_scaled");
    }

    #[test]
    fn test_blending_is_additive() {
        let blend = FixedSizePoints.blend_state();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(DepthScaledShaderPoints::default().blend_state(), blend);
    }
}
