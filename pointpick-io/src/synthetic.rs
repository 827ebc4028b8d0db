//! Synthetic point sets for demos and benchmarks

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Flat positions of `count` points spread evenly over a spherical shell.
///
/// Points follow a Fibonacci spiral so the density is uniform; each one is
/// pushed radially by a random offset in `[-jitter, jitter]`, reproducible
/// through `seed`.
pub fn planet_shell(count: usize, radius: f32, jitter: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let golden_angle = PI * (3.0 - 5.0f32.sqrt());
    let mut positions = Vec::with_capacity(count * 3);

    for i in 0..count {
        let y = if count > 1 {
            1.0 - 2.0 * i as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let ring = (1.0 - y * y).max(0.0).sqrt();
        let theta = golden_angle * i as f32;

        let r = if jitter > 0.0 {
            radius + rng.gen_range(-jitter..=jitter)
        } else {
            radius
        };

        positions.extend_from_slice(&[r * ring * theta.cos(), r * y, r * ring * theta.sin()]);
    }

    positions
}
