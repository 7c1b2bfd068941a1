//! Gas surface-density grid
//!
//! A square `n x n` grid of densities (M☉/kpc²) covering a square domain of
//! side `size_kpc`, centred on the origin. Row index runs along +y and column
//! index along +x, so `density[(row, col)]` is the cell whose centre is
//! `cell_center(col, row)`.
//!
//! The only dynamics is a rigid rotation about the domain centre, resampled
//! back onto the grid with bilinear interpolation and wrap-around edges.

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::error::{SimError, SimResult};
use super::states::NVec2;

#[derive(Debug, Clone)]
pub struct GasField {
    density: DMatrix<f64>,
    // resample target, swapped with `density` after each rotation so the
    // grid is never reallocated
    scratch: DMatrix<f64>,
    size_kpc: f64,
}

impl PartialEq for GasField {
    fn eq(&self, other: &Self) -> bool {
        self.size_kpc == other.size_kpc && self.density == other.density
    }
}

impl GasField {
    /// Empty (all-zero) field
    pub fn zeros(resolution: usize, size_kpc: f64) -> SimResult<Self> {
        Self::from_density(DMatrix::zeros(resolution, resolution), size_kpc)
    }

    /// Wrap an existing density grid; it must be square, non-empty, finite
    /// and non-negative
    pub fn from_density(density: DMatrix<f64>, size_kpc: f64) -> SimResult<Self> {
        if density.nrows() == 0 || density.nrows() != density.ncols() {
            return Err(SimError::InvalidConfiguration(format!(
                "gas grid must be square and non-empty, got {}x{}",
                density.nrows(),
                density.ncols()
            )));
        }
        if !(size_kpc > 0.0 && size_kpc.is_finite()) {
            return Err(SimError::InvalidConfiguration(format!(
                "domain size must be finite and > 0, got {size_kpc}"
            )));
        }
        if let Some(bad) = density.iter().find(|d| !(d.is_finite() && **d >= 0.0)) {
            return Err(SimError::InvalidConfiguration(format!(
                "gas density must be finite and >= 0, found {bad}"
            )));
        }

        let scratch = DMatrix::zeros(density.nrows(), density.ncols());
        Ok(Self { density, scratch, size_kpc })
    }

    pub fn resolution(&self) -> usize {
        self.density.nrows()
    }

    pub fn size_kpc(&self) -> f64 {
        self.size_kpc
    }

    /// Side length of one cell, kpc
    pub fn cell_size(&self) -> f64 {
        self.size_kpc / self.resolution() as f64
    }

    /// Physical centre of cell (`col`, `row`)
    pub fn cell_center(&self, col: usize, row: usize) -> NVec2 {
        let h = self.cell_size();
        let half = 0.5 * self.size_kpc;
        NVec2::new(-half + (col as f64 + 0.5) * h, -half + (row as f64 + 0.5) * h)
    }

    pub fn density(&self) -> &DMatrix<f64> {
        &self.density
    }

    pub(crate) fn density_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.density
    }

    /// Nearest-cell density at a physical point, `None` outside the domain
    pub fn density_at(&self, x: f64, y: f64) -> Option<f64> {
        let half = 0.5 * self.size_kpc;
        if !(x >= -half && x < half && y >= -half && y < half) {
            return None;
        }
        let n = self.resolution();
        let h = self.cell_size();
        let col = (((x + half) / h) as usize).min(n - 1);
        let row = (((y + half) / h) as usize).min(n - 1);
        Some(self.density[(row, col)])
    }

    /// Plain sum over cells
    pub fn density_sum(&self) -> f64 {
        self.density.sum()
    }

    /// Gas mass in M☉: density sum times cell area
    pub fn total_mass(&self) -> f64 {
        let h = self.cell_size();
        self.density_sum() * h * h
    }

    /// First non-finite cell as a column-major linear index
    pub fn first_non_finite(&self) -> Option<usize> {
        self.density.iter().position(|d| !d.is_finite())
    }

    /// Rigidly rotate the field counter-clockwise by `angle_rad` about the
    /// domain centre, in place
    ///
    /// Each destination cell pulls from the source point obtained by rotating
    /// it back by `-angle_rad`, interpolated bilinearly from the four
    /// surrounding cells. Source indices wrap around the grid edges, and any
    /// negative interpolation artifact is clamped to zero.
    pub fn rotate(&mut self, angle_rad: f64) {
        self.resample_rotated(angle_rad);
        self.commit_resample();
    }

    /// Write the rotated field into the scratch grid without publishing it
    ///
    /// Returns the first non-finite resampled cell, if any. `density` is not
    /// touched until [`commit_resample`](Self::commit_resample).
    pub(crate) fn resample_rotated(&mut self, angle_rad: f64) -> Option<usize> {
        let n = self.resolution();
        let (sin, cos) = angle_rad.sin_cos();
        let c = 0.5 * (n as f64 - 1.0); // centre in index units
        let ni = n as i64;

        let src = self.density.as_slice();

        // column-major: linear index k = col * n + row
        self.scratch
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(k, out)| {
                let col = (k / n) as f64 - c;
                let row = (k % n) as f64 - c;

                // R(-angle) applied to (col, row)
                let sx = cos * col + sin * row + c;
                let sy = -sin * col + cos * row + c;

                let x0 = sx.floor();
                let y0 = sy.floor();
                let fx = sx - x0;
                let fy = sy - y0;

                let c0 = (x0 as i64).rem_euclid(ni) as usize;
                let c1 = (x0 as i64 + 1).rem_euclid(ni) as usize;
                let r0 = (y0 as i64).rem_euclid(ni) as usize;
                let r1 = (y0 as i64 + 1).rem_euclid(ni) as usize;

                let v = (1.0 - fx) * (1.0 - fy) * src[c0 * n + r0]
                    + fx * (1.0 - fy) * src[c1 * n + r0]
                    + (1.0 - fx) * fy * src[c0 * n + r1]
                    + fx * fy * src[c1 * n + r1];

                *out = v.max(0.0);
            });

        self.scratch.iter().position(|d| !d.is_finite())
    }

    /// Publish the last resample
    pub(crate) fn commit_resample(&mut self) {
        std::mem::swap(&mut self.density, &mut self.scratch);
    }
}
