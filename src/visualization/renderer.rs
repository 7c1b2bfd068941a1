//! Renderer collaborator contract and the colour mapping shared by the
//! PNG writer and the interactive viewer
//!
//! A renderer receives a [`FrameView`], which only holds shared borrows of
//! the simulation state, so it cannot feed anything back into the kernel.

use thiserror::Error;

use crate::simulation::gas::GasField;
use crate::simulation::states::StarPopulation;
use crate::simulation::stepper::Flash;

/// Everything a renderer gets to see for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub index: usize,
    pub stars: &'a StarPopulation,
    pub gas: &'a GasField,
    pub flashes: Option<&'a [Flash]>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub trait FrameRenderer {
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;
}

/// Renderer that draws nothing; used for headless runs and benchmarks
#[derive(Debug, Default)]
pub struct NullRenderer;

impl FrameRenderer for NullRenderer {
    fn render(&mut self, _frame: &FrameView<'_>) -> Result<(), RenderError> {
        Ok(())
    }
}

// ========================================================================================
// Colour mapping
// ========================================================================================

/// Log-scale limits for gas density, M☉/kpc²
pub const GAS_LOG_MIN: f64 = 6.0;
pub const GAS_LOG_MAX: f64 = 8.0;
/// Opacity of the gas layer over the black background
pub const GAS_ALPHA: f64 = 0.9;

pub const STAR_COLOR: [u8; 3] = [255, 255, 255];
pub const FLASH_COLOR: [u8; 3] = [255, 255, 0];
pub const BACKGROUND: [u8; 3] = [0, 0, 0];

// reversed "blues" ramp: dense gas is pale, thin gas deep blue
const BLUES_R: [[f64; 3]; 9] = [
    [8.0, 48.0, 107.0],
    [8.0, 81.0, 156.0],
    [33.0, 113.0, 181.0],
    [66.0, 146.0, 198.0],
    [107.0, 174.0, 214.0],
    [158.0, 202.0, 225.0],
    [198.0, 219.0, 239.0],
    [222.0, 235.0, 247.0],
    [247.0, 251.0, 255.0],
];

/// Colour of a gas cell, already blended over the background
pub fn gas_color(density: f64) -> [u8; 3] {
    if !(density > 0.0) {
        return BACKGROUND;
    }
    let t = ((density.log10() - GAS_LOG_MIN) / (GAS_LOG_MAX - GAS_LOG_MIN)).clamp(0.0, 1.0);

    let pos = t * (BLUES_R.len() - 1) as f64;
    let lo = (pos.floor() as usize).min(BLUES_R.len() - 2);
    let f = pos - lo as f64;

    let mut rgb = [0u8; 3];
    for (k, c) in rgb.iter_mut().enumerate() {
        let v = BLUES_R[lo][k] + f * (BLUES_R[lo + 1][k] - BLUES_R[lo][k]);
        *c = (GAS_ALPHA * v).round().clamp(0.0, 255.0) as u8;
    }
    rgb
}

/// Map a physical point to pixel (col, row) on a `size x size` image whose
/// row 0 is the top edge; `None` outside the domain
pub fn world_to_pixel(x: f64, y: f64, size_kpc: f64, size: u32) -> Option<(u32, u32)> {
    let half = 0.5 * size_kpc;
    let u = (x + half) / size_kpc;
    let v = (y + half) / size_kpc;
    if !(u >= 0.0 && u < 1.0 && v >= 0.0 && v < 1.0) {
        return None;
    }
    let col = ((u * size as f64) as u32).min(size - 1);
    let row_up = ((v * size as f64) as u32).min(size - 1);
    Some((col, size - 1 - row_up))
}

/// Byte length of a `size x size` RGBA8 buffer
pub fn rgba_len(size: u32) -> usize {
    size as usize * size as usize * 4
}

/// Gas layer as tightly packed RGBA8, row 0 at the top (+y edge)
pub fn gas_rgba(gas: &GasField, size: u32) -> Vec<u8> {
    let size_kpc = gas.size_kpc();
    let px = size_kpc / size as f64;
    let half = 0.5 * size_kpc;

    let mut data = Vec::with_capacity(rgba_len(size));
    for row in 0..size {
        let y = half - (row as f64 + 0.5) * px;
        for col in 0..size {
            let x = -half + (col as f64 + 0.5) * px;
            let [r, g, b] = gas.density_at(x, y).map_or(BACKGROUND, gas_color);
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    data
}
