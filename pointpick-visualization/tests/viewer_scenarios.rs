//! Viewer behavior with the stock camera and configuration files

use approx::assert_relative_eq;
use pointpick_core::{Point3f, PointDataset, Rgb};
use pointpick_gpu::StrategyKind;
use pointpick_picking::{SelectionState, Viewport};
use pointpick_visualization::{handle_click, CanvasBounds, ViewerConfig, ViewerState};

fn core_and_moons() -> PointDataset {
    PointDataset::from_points(&[
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(6.0, 0.0, 0.0),
        Point3f::new(0.0, 6.0, 0.0),
    ])
}

#[test]
fn test_toml_overrides_keep_other_defaults() {
    let config = ViewerConfig::from_toml_str(
        r#"
        [picking]
        threshold = 0.25
        highlight_color = 0x00ff00

        [render]
        strategy = "depth_scaled"
        "#,
    )
    .unwrap();

    assert_relative_eq!(config.picking.threshold, 0.25);
    assert_eq!(config.render.strategy, StrategyKind::DepthScaled);
    assert_eq!(config.camera, ViewerConfig::default().camera);
    assert!(config.planet.enabled);
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let err = ViewerConfig::from_toml_str("[camera]\nfov = -5.0\n").unwrap_err();
    assert!(matches!(err, pointpick_core::Error::Config(_)));
}

#[test]
fn test_center_click_picks_the_core() {
    let mut state = ViewerState::new(core_and_moons(), ViewerConfig::default());
    state.viewport = Some(Viewport::new(800.0, 600.0));
    state.camera.set_aspect_ratio(800, 600);

    // The default camera looks straight at the origin through the planet
    let pick = handle_click(&mut state, 400.0, 300.0, &CanvasBounds::full(800.0, 600.0)).unwrap();
    assert_eq!(pick.point_index, 0);
    assert_relative_eq!(pick.distance, Point3f::new(15.0, 42.0, -100.0).coords.norm(), epsilon = 1e-2);

    let dataset = state.dataset().unwrap();
    assert_eq!(dataset.color(0), Some(Rgb::RED));
    assert_eq!(dataset.color(1), Some(Rgb::WHITE));
    assert_eq!(state.scene.arrow_count(), 1);
}

#[test]
fn test_custom_colors_flow_into_selection() {
    let config = ViewerConfig::from_toml_str(
        r#"
        [picking]
        default_color = 0x000000
        highlight_color = 0xffff00
        "#,
    )
    .unwrap();
    let mut state = ViewerState::new(core_and_moons(), config);
    assert!(state.dataset().unwrap().color_buffer().iter().all(|&c| c == 0.0));

    state.viewport = Some(Viewport::new(800.0, 600.0));
    state.camera.set_aspect_ratio(800, 600);
    handle_click(&mut state, 400.0, 300.0, &CanvasBounds::full(800.0, 600.0)).unwrap();

    assert_eq!(state.selection_state(), SelectionState::Highlighted(0));
    assert_eq!(state.dataset().unwrap().color(0), Some(Rgb::YELLOW));
}
