//! Initial conditions: a thin exponential stellar disk on a flat rotation
//! curve plus a clumpy exponential gas disk
//!
//! Everything is drawn from ChaCha streams keyed on one seed, so a given
//! seed reproduces the same population and field bit for bit. Stars and gas
//! use separate streams (`STAR_STREAM`, `GAS_STREAM`), so changing the star
//! count leaves the gas field alone.

use std::f64::consts::TAU;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use super::constants::*;
use super::error::{SimError, SimResult};
use super::gas::GasField;
use super::sampling::{sample_exponential, sample_gaussian, sample_lomax, sample_uniform};
use super::states::StarPopulation;

/// Generator settings
#[derive(Debug, Clone, PartialEq)]
pub struct InitialConditions {
    pub n_stars: usize,
    pub grid_resolution: usize,
    pub size_kpc: f64,
    pub seed: Option<u64>,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            n_stars: 40_000,
            grid_resolution: 1024,
            size_kpc: DEFAULT_SIZE_KPC,
            seed: None,
        }
    }
}

impl InitialConditions {
    pub fn new(n_stars: usize, grid_resolution: usize, seed: Option<u64>) -> Self {
        Self {
            n_stars,
            grid_resolution,
            seed,
            ..Self::default()
        }
    }

    pub fn with_size_kpc(mut self, size_kpc: f64) -> Self {
        self.size_kpc = size_kpc;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.n_stars == 0 {
            return Err(SimError::InvalidConfiguration("n_stars must be > 0".into()));
        }
        if self.grid_resolution == 0 {
            return Err(SimError::InvalidConfiguration("grid_resolution must be > 0".into()));
        }
        if !(self.size_kpc > 0.0 && self.size_kpc.is_finite()) {
            return Err(SimError::InvalidConfiguration(format!(
                "size_kpc must be finite and > 0, got {}",
                self.size_kpc
            )));
        }
        Ok(())
    }

    /// Build the stars and the gas field
    pub fn generate(&self) -> SimResult<(StarPopulation, GasField)> {
        self.validate()?;

        let seed = match self.seed {
            Some(s) => s,
            None => {
                let s = rand::random::<u64>();
                debug!("no seed given, drew {s}");
                s
            }
        };

        let stars = generate_stars(self.n_stars, &mut stream_rng(seed, STAR_STREAM));
        let gas = generate_gas(
            self.grid_resolution,
            self.size_kpc,
            &mut stream_rng(seed, GAS_STREAM),
        )?;

        let massive = stars.armed_indices().len();
        info!(
            "generated {} stars ({} armed for supernova), gas grid {}x{} over {} kpc, seed {}",
            stars.len(),
            massive,
            gas.resolution(),
            gas.resolution(),
            gas.size_kpc(),
            seed
        );

        Ok((stars, gas))
    }
}

/// `generate_initial_conditions(n_stars, grid_resolution, seed)` on the
/// default 30 kpc domain
pub fn generate_initial_conditions(
    n_stars: usize,
    grid_resolution: usize,
    seed: Option<u64>,
) -> SimResult<(StarPopulation, GasField)> {
    InitialConditions::new(n_stars, grid_resolution, seed).generate()
}

/// ChaCha generator for `seed` positioned on `stream`
pub fn stream_rng(seed: u64, stream: u64) -> ChaChaRng {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Sample the stellar disk
///
/// Draw order: all radii, all azimuths, all heights, all vertical
/// velocities, all masses, all ages. Each block draws one value per star.
pub fn generate_stars(n: usize, rng: &mut ChaChaRng) -> StarPopulation {
    let mut stars = StarPopulation::with_len(n);

    let r: Vec<f64> = (0..n).map(|_| sample_exponential(rng, DISK_SCALE_LENGTH_KPC)).collect();
    let phi: Vec<f64> = (0..n).map(|_| sample_uniform(rng, 0.0, TAU)).collect();

    {
        let f = stars.fields_mut();

        for i in 0..n {
            let (sin, cos) = phi[i].sin_cos();
            f.x[i] = r[i] * cos;
            f.y[i] = r[i] * sin;
            // tangential velocity of a flat rotation curve, counter-clockwise
            f.vx[i] = -V_CIRC * sin;
            f.vy[i] = V_CIRC * cos;
        }

        for z in f.z.iter_mut() {
            *z = sample_gaussian(rng, 0.0, DISK_SCALE_HEIGHT_KPC);
        }
        for vz in f.vz.iter_mut() {
            *vz = sample_gaussian(rng, 0.0, VERTICAL_VELOCITY_SIGMA);
        }

        // Kroupa-like: Pareto tail above IMF_MIN_MASS, clipped
        for m in f.mass.iter_mut() {
            let raw = (sample_lomax(rng, IMF_PARETO_SHAPE) + 1.0) * IMF_MIN_MASS;
            *m = raw.clamp(IMF_MIN_MASS, IMF_MAX_MASS);
        }

        for a in f.age.iter_mut() {
            *a = sample_uniform(rng, 0.0, MAX_INITIAL_AGE_MYR);
        }

        for ((t, m), a) in f.sn_timer.iter_mut().zip(f.mass.iter()).zip(f.age.iter()) {
            *t = supernova_timer(*m, *a);
        }
    }

    stars
}

/// Time left until a star of this mass and age explodes, or the dormant
/// sentinel for stars that never will
///
/// A massive star already older than `SN_AGE_MYR` gets a negative timer and
/// is inert.
pub fn supernova_timer(mass: f64, age: f64) -> f64 {
    if mass > SN_MASS_THRESHOLD {
        SN_AGE_MYR - age
    } else {
        DORMANT_TIMER
    }
}

/// Exponential surface-density profile with multiplicative clump noise
///
/// Each cell gets `Σ0 exp(-r / h) (1 + 0.4 N(0,1))`, the noise factor floored
/// at zero. One Gaussian per cell, drawn in column-major order.
pub fn generate_gas(resolution: usize, size_kpc: f64, rng: &mut ChaChaRng) -> SimResult<GasField> {
    let mut gas = GasField::zeros(resolution, size_kpc)?;

    let centers: Vec<f64> = (0..resolution)
        .map(|i| gas.cell_center(i, 0).x)
        .collect();

    let density = gas.density_mut();
    for col in 0..resolution {
        for row in 0..resolution {
            let r = centers[col].hypot(centers[row]);
            let profile = GAS_CENTRAL_DENSITY * (-r / GAS_SCALE_LENGTH_KPC).exp();
            let clump = (1.0 + GAS_CLUMP_AMPLITUDE * sample_gaussian(rng, 0.0, 1.0)).max(0.0);
            density[(row, col)] = profile * clump;
        }
    }

    Ok(gas)
}
