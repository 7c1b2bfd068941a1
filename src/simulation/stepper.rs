//! Per-frame state transition
//!
//! `step` advances the stars and the gas by one frame in place and reports
//! where supernovae went off. Order inside a step:
//!
//! 1. drift positions in the disk plane
//! 2. age every star by `dt`
//! 3. count down armed supernova timers
//! 4. collect stars whose timer crossed zero in this frame (edge trigger)
//! 5. turn those into 1 M☉ remnants and kick them
//! 6. rotate the gas field by `V_CIRC dt / size_kpc`
//!
//! A step either completes or leaves the caller's state as it was. Inputs are
//! checked for non-finite values first, then the gas is resampled into its
//! scratch grid while the star drift is checked for overflow (the two run
//! under `rayon::join`). Only when both come back clean are the stars
//! advanced and the resampled gas published. A kick is bounded by a few
//! sigma, so it cannot push a finite velocity out of range.
//!
//! Random draws: one Gaussian (σ = `SN_KICK_SIGMA`) per flashing star,
//! drawn as one batch in ascending star index, and nothing else. A frame with
//! no flash draws nothing.

use log::{debug, warn};
use rand::Rng;

use super::constants::{SN_KICK_SIGMA, V_CIRC};
use super::error::{SimError, SimResult};
use super::gas::GasField;
use super::sampling::sample_gaussian_batch;
use super::states::StarPopulation;

/// One supernova going off: which star, and where (x, y) it was
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub star: usize,
    pub x: f64,
    pub y: f64,
}

/// Gas rotation angle for one frame
pub fn gas_rotation_angle(dt: f64, size_kpc: f64) -> f64 {
    V_CIRC * dt / size_kpc
}

/// Advance `stars` and `gas` by `dt` Myr
///
/// Returns `Ok(None)` when nothing exploded, otherwise the flashes in
/// ascending star order. Fails with `InvalidTimestep` if `dt` is not a
/// finite positive number, and with `NumericAnomaly` if a position,
/// velocity or density is non-finite on entry or would become so. On any
/// error `stars`, `gas` and `rng` are left untouched.
pub fn step<R: Rng + Send>(
    stars: &mut StarPopulation,
    gas: &mut GasField,
    dt: f64,
    rng: &mut R,
) -> SimResult<Option<Vec<Flash>>> {
    if !(dt > 0.0 && dt.is_finite()) {
        return Err(SimError::InvalidTimestep(dt));
    }
    check_finite(stars, gas)?;

    let angle = gas_rotation_angle(dt, gas.size_kpc());

    let (bad_cell, bad_drift) = rayon::join(
        || gas.resample_rotated(angle),
        || stars.first_non_finite_drift(dt),
    );
    if let Some((field, index)) = bad_drift {
        warn!("star {field} at index {index} would overflow this step");
        return Err(SimError::NumericAnomaly { field, index });
    }
    if let Some(index) = bad_cell {
        warn!("gas density at cell {index} would overflow this step");
        return Err(SimError::NumericAnomaly { field: "density", index });
    }

    let flashes = advance_stars(stars, dt, rng);
    gas.commit_resample();

    if flashes.is_empty() {
        Ok(None)
    } else {
        debug!("{} supernova flash(es) this frame", flashes.len());
        Ok(Some(flashes))
    }
}

/// Star half of a step (items 1-5)
fn advance_stars<R: Rng>(stars: &mut StarPopulation, dt: f64, rng: &mut R) -> Vec<Flash> {
    let all = 0..stars.len();

    stars.advance_positions(all.clone(), dt);
    stars.age_all(all.clone(), dt);
    let flashed = stars.decrement_timers(all, dt);

    let flashes: Vec<Flash> = flashed
        .iter()
        .map(|&i| Flash {
            star: i,
            x: stars.x()[i],
            y: stars.y()[i],
        })
        .collect();

    if !flashed.is_empty() {
        let kicks = sample_gaussian_batch(rng, flashed.len(), 0.0, SN_KICK_SIGMA);
        stars.apply_kicks(&flashed, &kicks);
    }

    flashes
}

/// Reject state that is already corrupted
fn check_finite(stars: &StarPopulation, gas: &GasField) -> SimResult<()> {
    if let Some((field, index)) = stars.first_non_finite() {
        warn!("non-finite star {field} at index {index}");
        return Err(SimError::NumericAnomaly { field, index });
    }
    if let Some(index) = gas.first_non_finite() {
        warn!("non-finite gas density at cell {index}");
        return Err(SimError::NumericAnomaly { field: "density", index });
    }
    Ok(())
}
