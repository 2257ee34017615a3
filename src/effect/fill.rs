//! Solid fill effect
//!
//! Lights every pixel at one brightness level.
//! The level can be changed at runtime with a `{"brightness": n}` event.

use embassy_time::Instant;
use serde_json::Value;

use super::Effect;
use crate::{MATRIX_HEIGHT, MATRIX_WIDTH, PixelSurface};

const EFFECT_NAME_FILL: &str = "Fill";

/// Fill effect - lights the whole matrix
#[derive(Debug, Clone)]
pub struct FillEffect {
    brightness: u8,
    dirty: bool,
}

impl FillEffect {
    pub const fn new(brightness: u8) -> Self {
        Self {
            brightness,
            dirty: true,
        }
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    fn draw(&mut self, surface: &mut dyn PixelSurface) {
        let on = self.brightness > 0;
        for y in 0..MATRIX_HEIGHT {
            for x in 0..MATRIX_WIDTH {
                surface.set_pixel(x, y, on, self.brightness);
            }
        }
        self.dirty = false;
    }
}

impl Effect for FillEffect {
    fn name(&self) -> &str {
        EFFECT_NAME_FILL
    }

    fn setup(&mut self, surface: &mut dyn PixelSurface) {
        self.draw(surface);
    }

    fn run(&mut self, _now: Instant, surface: &mut dyn PixelSurface) {
        if self.dirty {
            self.draw(surface);
        }
    }

    fn handle_event(&mut self, event: &Value) {
        let Some(level) = event.get("brightness").and_then(Value::as_u64) else {
            return;
        };
        self.brightness = u8::try_from(level).unwrap_or(u8::MAX);
        self.dirty = true;
    }
}
