//! PNG frame writer
//!
//! One square image per frame, `frame_0000.png`, `frame_0001.png`, ... in the
//! output directory: gas underneath, stars as white pixels, supernovae as
//! yellow crosses. Physical origin at the image centre, +y up.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use super::renderer::{gas_rgba, world_to_pixel, FrameRenderer, FrameView, RenderError, FLASH_COLOR, STAR_COLOR};

// half-length of a flash cross arm, pixels
const FLASH_ARM: i64 = 2;

pub struct PngFrameRenderer {
    dir: PathBuf,
    size: u32,
}

impl PngFrameRenderer {
    /// Create the output directory if needed
    pub fn new(dir: impl AsRef<Path>, size: u32) -> Result<Self, RenderError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, size: size.max(1) })
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:04}.png"))
    }

    /// Rasterize a frame without writing it
    pub fn draw(&self, frame: &FrameView<'_>) -> RgbaImage {
        let size = self.size;
        let size_kpc = frame.gas.size_kpc();

        let mut img = match RgbaImage::from_raw(size, size, gas_rgba(frame.gas, size)) {
            Some(img) => img,
            None => RgbaImage::new(size, size),
        };

        let star = Rgba([STAR_COLOR[0], STAR_COLOR[1], STAR_COLOR[2], 255]);
        for (x, y) in frame.stars.x().iter().zip(frame.stars.y()) {
            if let Some((c, r)) = world_to_pixel(*x, *y, size_kpc, size) {
                img.put_pixel(c, r, star);
            }
        }

        let flash = Rgba([FLASH_COLOR[0], FLASH_COLOR[1], FLASH_COLOR[2], 255]);
        for f in frame.flashes.unwrap_or(&[]) {
            if let Some((c, r)) = world_to_pixel(f.x, f.y, size_kpc, size) {
                for d in -FLASH_ARM..=FLASH_ARM {
                    put_clipped(&mut img, c as i64 + d, r as i64, flash);
                    put_clipped(&mut img, c as i64, r as i64 + d, flash);
                }
            }
        }

        img
    }
}

fn put_clipped(img: &mut RgbaImage, col: i64, row: i64, px: Rgba<u8>) {
    if col >= 0 && row >= 0 && (col as u32) < img.width() && (row as u32) < img.height() {
        img.put_pixel(col as u32, row as u32, px);
    }
}

impl FrameRenderer for PngFrameRenderer {
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let img = self.draw(frame);
        img.save(self.frame_path(frame.index))?;
        Ok(())
    }
}
