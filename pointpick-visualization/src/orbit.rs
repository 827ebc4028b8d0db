//! Orbit camera controls
//!
//! The camera circles `target` on a sphere, Y up. Input accumulates deltas
//! (azimuth, polar angle, dolly scale, pan offset) which [`OrbitControls::update`]
//! folds into the camera once per frame. With damping on, only a fraction of
//! the pending rotation is applied per update and the rest decays, so the
//! camera glides to rest.

use std::f32::consts::PI;

use pointpick_core::{PerspectiveCamera, Point3f, Vector3f};

use crate::config::ControlsConfig;

const EPS: f32 = 1e-6;

/// Spherical coordinates: `phi` is the polar angle from +Y, `theta` the
/// azimuth around Y measured from +Z toward +X
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3f) -> Self {
        let radius = offset.norm();
        if radius == 0.0 {
            return Self { radius, phi: 0.0, theta: 0.0 };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3f {
        let ring = self.radius * self.phi.sin();
        Vector3f::new(ring * self.theta.sin(), self.radius * self.phi.cos(), ring * self.theta.cos())
    }
}

/// Drag-to-rotate, wheel-to-dolly camera controller
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3f,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3f,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            target: Point3f::origin(),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_pan: config.enable_pan,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3f::zeros(),
        }
    }

    /// Rotate by a pointer drag of `dx, dy` pixels in a viewport `height` pixels tall
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.theta_delta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.phi_delta -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Dolly by one wheel step; positive `delta` moves toward the target
    pub fn dolly(&mut self, delta: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        if delta > 0.0 {
            self.scale *= step;
        } else if delta < 0.0 {
            self.scale /= step;
        }
    }

    /// Shift camera and target by a drag of `dx, dy` pixels
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &PerspectiveCamera, height: f32) {
        if !self.enable_pan || height <= 0.0 {
            return;
        }

        // Scale pixels to world units at the target's depth
        let target_distance = (camera.position - self.target).norm() * (camera.effective_fov() * 0.5).tan();
        let view = camera.view_matrix();
        let right = Vector3f::new(view[(0, 0)], view[(0, 1)], view[(0, 2)]);
        let up = Vector3f::new(view[(1, 0)], view[(1, 1)], view[(1, 2)]);

        let scale = 2.0 * target_distance / height * self.pan_speed;
        self.pan_offset += -right * dx * scale + up * dy * scale;
    }

    /// Apply pending input to `camera`; returns whether it moved
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(&offset);

        if self.enable_damping {
            spherical.theta += self.theta_delta * self.damping_factor;
            spherical.phi += self.phi_delta * self.damping_factor;
        } else {
            spherical.theta += self.theta_delta;
            spherical.phi += self.phi_delta;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3f::zeros();
        }
        self.scale = 1.0;

        (camera.position - previous).norm_squared() > EPS
    }

    /// Drop any motion still pending
    pub fn stop(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3f::zeros();
    }

    /// Whether input is still waiting to be applied
    pub fn is_moving(&self) -> bool {
        self.theta_delta.abs() > EPS
            || self.phi_delta.abs() > EPS
            || (self.scale - 1.0).abs() > EPS
            || self.pan_offset.norm_squared() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_at(position: Point3f) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = position;
        camera
    }

    fn undamped() -> OrbitControls {
        OrbitControls::new(&ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        })
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vector3f::new(15.0, 42.0, -100.0);
        let back = Spherical::from_offset(&offset).to_offset();
        assert_relative_eq!(back, offset, epsilon = 1e-3);
    }

    #[test]
    fn test_distance_clamped() {
        let mut controls = undamped();

        // Starts beyond the maximum distance
        let mut camera = camera_at(Point3f::new(15.0, 42.0, -100.0));
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance_to_target(), 100.0, epsilon = 1e-3);

        let mut camera = camera_at(Point3f::new(0.0, 0.0, 5.0));
        for _ in 0..1000 {
            controls.dolly(1.0);
            controls.update(&mut camera);
        }
        assert_relative_eq!(camera.distance_to_target(), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_dolly_step() {
        let mut controls = undamped();
        let mut camera = camera_at(Point3f::new(0.0, 0.0, 50.0));

        controls.dolly(1.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance_to_target(), 50.0 * 0.95f32.powf(0.1), epsilon = 1e-4);

        controls.dolly(-1.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.distance_to_target(), 50.0, epsilon = 1e-3);
    }

    #[test]
    fn test_drag_half_turn() {
        let mut controls = undamped();
        let mut camera = camera_at(Point3f::new(0.0, 0.0, 10.0));

        // Half the viewport height of horizontal travel is half a turn
        controls.rotate(300.0, 0.0, 600.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.position, Point3f::new(0.0, 0.0, -10.0), epsilon = 1e-3);
    }

    #[test]
    fn test_polar_angle_stays_off_the_pole() {
        let mut controls = undamped();
        let mut camera = camera_at(Point3f::new(0.0, 0.0, 10.0));

        controls.rotate(0.0, 10_000.0, 600.0);
        controls.update(&mut camera);
        assert!(camera.position.y > 9.9);
        assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
        assert_relative_eq!(camera.distance_to_target(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_damping_decays_to_rest() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera_at(Point3f::new(0.0, 0.0, 10.0));

        controls.rotate(100.0, 0.0, 600.0);
        assert!(controls.is_moving());

        let mut steps = 0;
        while controls.update(&mut camera) {
            steps += 1;
            assert!(steps < 2000, "damped rotation never settled");
        }
        assert!(steps > 10);
        assert_relative_eq!(camera.distance_to_target(), 10.0, epsilon = 1e-3);

        controls.stop();
        assert!(!controls.is_moving());
    }

    #[test]
    fn test_pan_disabled() {
        let mut controls = undamped();
        let camera = camera_at(Point3f::new(0.0, 0.0, 10.0));
        controls.pan(50.0, 50.0, &camera, 600.0);
        assert!(!controls.is_moving());

        controls.enable_pan = true;
        let mut camera = camera;
        controls.pan(50.0, 0.0, &camera, 600.0);
        controls.update(&mut camera);
        // Dragging right moves the scene right, so the camera slides left
        assert!(controls.target.x < 0.0);
        assert_relative_eq!(camera.target, controls.target);
    }
}
