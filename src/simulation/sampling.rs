//! Random samplers used by the generator and the stepper
//!
//! All of them take the random stream explicitly so draw order is a visible
//! part of every caller's contract. Each sampler documents how many uniforms
//! it consumes.

use std::f64::consts::PI;

use rand::Rng;

/// Uniform in `(0, 1]`, safe to feed into `ln`
fn open_unit<R: Rng>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Gaussian N(mean, std_dev²) via Box-Muller (two uniforms per sample)
pub fn sample_gaussian<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1 = open_unit(rng);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Exponential with the given scale (mean), one uniform per sample
pub fn sample_exponential<R: Rng>(rng: &mut R, scale: f64) -> f64 {
    -scale * open_unit(rng).ln()
}

/// Lomax (Pareto II) sample with shape `a`, i.e. `(1 - u)^(-1/a) - 1`
///
/// Shifting by one and scaling by `x_min` turns it into a classic Pareto
/// with minimum `x_min`, which is how the mass function uses it.
pub fn sample_lomax<R: Rng>(rng: &mut R, shape: f64) -> f64 {
    open_unit(rng).powf(-1.0 / shape) - 1.0
}

/// Uniform in `[low, high)`
pub fn sample_uniform<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.random::<f64>()
}

/// Draw `n` Gaussian samples in one batch, in order
pub fn sample_gaussian_batch<R: Rng>(rng: &mut R, n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
    (0..n).map(|_| sample_gaussian(rng, mean, std_dev)).collect()
}
