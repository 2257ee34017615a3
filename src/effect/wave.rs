//! Sine wave effect
//!
//! Each column lights up to the height of a travelling sine wave.
//! The phase is derived from the frame time, so the effect keeps no
//! per-frame state besides its configuration.

use core::f32::consts::TAU;

use embassy_time::{Duration, Instant};

use super::Effect;
use crate::{MATRIX_HEIGHT, MATRIX_WIDTH, MAX_BRIGHTNESS, PixelSurface};

const EFFECT_NAME_WAVE: &str = "Wave";
const DEFAULT_CYCLE_MS: u64 = 2_000;
/// Wave periods visible across the matrix width
const WAVELENGTHS: f32 = 1.0;

/// Travelling sine wave
#[derive(Debug, Clone)]
pub struct WaveEffect {
    /// Duration of one full phase rotation
    cycle_duration: Duration,
    brightness: u8,
}

impl Default for WaveEffect {
    fn default() -> Self {
        Self {
            cycle_duration: Duration::from_millis(DEFAULT_CYCLE_MS),
            brightness: MAX_BRIGHTNESS,
        }
    }
}

impl WaveEffect {
    /// Set the cycle duration
    #[must_use]
    pub fn with_cycle_duration(mut self, duration: Duration) -> Self {
        self.cycle_duration = duration;
        self
    }

    /// Set the brightness value
    #[must_use]
    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    /// Height of the wave in column `x` at `now`, in `1..=MATRIX_HEIGHT`
    pub fn column_height(&self, now: Instant, x: u8) -> u8 {
        let cycle_ms = self.cycle_duration.as_millis().max(1);
        #[allow(clippy::cast_precision_loss)]
        let phase = (now.as_millis() % cycle_ms) as f32 / cycle_ms as f32;
        let position = f32::from(x) / f32::from(MATRIX_WIDTH) * WAVELENGTHS;
        let sample = libm::sinf((position + phase) * TAU);
        let half = f32::from(MATRIX_HEIGHT) / 2.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let height = libm::roundf(half + sample * (half - 1.0)) as u8;
        height.clamp(1, MATRIX_HEIGHT)
    }
}

impl Effect for WaveEffect {
    fn name(&self) -> &str {
        EFFECT_NAME_WAVE
    }

    fn setup(&mut self, surface: &mut dyn PixelSurface) {
        surface.clear();
    }

    fn run(&mut self, now: Instant, surface: &mut dyn PixelSurface) {
        for x in 0..MATRIX_WIDTH {
            let height = self.column_height(now, x);
            for y in 0..MATRIX_HEIGHT {
                let lit = MATRIX_HEIGHT - y <= height;
                surface.set_pixel(x, y, lit, self.brightness);
            }
        }
    }
}
