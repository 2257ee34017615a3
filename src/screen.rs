//! In-memory matrix frame buffer

use crate::{MATRIX_HEIGHT, MATRIX_WIDTH, PixelSurface};

const PIXEL_COUNT: usize = MATRIX_WIDTH as usize * MATRIX_HEIGHT as usize;

/// 16x16 frame buffer, one brightness byte per pixel in row-major order
///
/// A pixel that is off always reads as `0`.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: [u8; PIXEL_COUNT],
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pixels: [0; PIXEL_COUNT],
        }
    }

    /// Brightness of the pixel at `(x, y)`, `None` when out of range
    pub fn pixel(&self, x: u8, y: u8) -> Option<u8> {
        Self::index(x, y).map(|index| self.pixels[index])
    }

    /// Number of pixels that are on
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&value| value > 0).count()
    }

    fn index(x: u8, y: u8) -> Option<usize> {
        if x >= MATRIX_WIDTH || y >= MATRIX_HEIGHT {
            return None;
        }
        Some(usize::from(y) * usize::from(MATRIX_WIDTH) + usize::from(x))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelSurface for FrameBuffer {
    fn set_pixel(&mut self, x: u8, y: u8, on: bool, brightness: u8) {
        if let Some(index) = Self::index(x, y) {
            self.pixels[index] = if on { brightness } else { 0 };
        }
    }

    fn clear(&mut self) {
        self.pixels = [0; PIXEL_COUNT];
    }

    fn render_buffer(&self) -> &[u8] {
        &self.pixels
    }
}
