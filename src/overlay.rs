//! Transient "activating effect N" overlay

use heapless::Vec;

use crate::config::CoreConfig;
use crate::effect::EffectId;
use crate::{MAX_BRIGHTNESS, PixelSurface, TaskYield};

/// Glyph width in pixels
pub const DIGIT_WIDTH: u8 = 4;
/// Glyph height in pixels
pub const DIGIT_HEIGHT: u8 = 6;
/// Horizontal distance between the left edges of two digits
pub const DIGIT_ADVANCE: u8 = DIGIT_WIDTH + 1;

/// Row the overlay digits start at
const OVERLAY_Y: u8 = 6;

// One row per byte, bit 3 is the leftmost column
const DIGITS: [[u8; DIGIT_HEIGHT as usize]; 10] = [
    [0b0110, 0b1001, 0b1001, 0b1001, 0b1001, 0b0110],
    [0b0010, 0b0110, 0b0010, 0b0010, 0b0010, 0b0111],
    [0b0110, 0b1001, 0b0001, 0b0010, 0b0100, 0b1111],
    [0b1110, 0b0001, 0b0110, 0b0001, 0b0001, 0b1110],
    [0b1001, 0b1001, 0b1111, 0b0001, 0b0001, 0b0001],
    [0b1111, 0b1000, 0b1110, 0b0001, 0b0001, 0b1110],
    [0b0110, 0b1000, 0b1110, 0b1001, 0b1001, 0b0110],
    [0b1111, 0b0001, 0b0010, 0b0100, 0b0100, 0b0100],
    [0b0110, 0b1001, 0b0110, 0b1001, 0b1001, 0b0110],
    [0b0110, 0b1001, 0b1001, 0b0111, 0b0001, 0b0110],
];

/// Decimal digits of `value`, most significant first
pub fn decimal_digits(value: u16) -> Vec<u8, 5> {
    let mut digits = Vec::new();
    let mut rest = value;
    loop {
        // u16 has at most five decimal digits
        let _ = digits.push(u8::try_from(rest % 10).unwrap_or(0));
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

/// Draw `digits` left to right starting at `(x, y)`
pub fn draw_numbers(surface: &mut dyn PixelSurface, x: u8, y: u8, digits: &[u8], brightness: u8) {
    let mut left = x;
    for &digit in digits {
        let Some(glyph) = DIGITS.get(usize::from(digit)) else {
            continue;
        };
        for (dy, row) in (0..DIGIT_HEIGHT).zip(glyph.iter()) {
            for dx in 0..DIGIT_WIDTH {
                if row & (0b1000 >> dx) != 0 {
                    surface.set_pixel(left.saturating_add(dx), y.saturating_add(dy), true, brightness);
                }
            }
        }
        left = left.saturating_add(DIGIT_ADVANCE);
    }
}

/// Left edge for a number with `count` digits
const fn overlay_x(count: usize) -> u8 {
    match count {
        0 | 1 => 6,
        2 => 3,
        _ => 1,
    }
}

/// Show `id` on the matrix and hold it for the configured overlay duration
///
/// The wait is split into `overlay_slice` steps, each handed to `pacer`, so
/// the platform scheduler keeps running while the number is visible.
pub fn show_effect_id<Y: TaskYield + ?Sized>(
    surface: &mut dyn PixelSurface,
    pacer: &mut Y,
    config: &CoreConfig,
    id: EffectId,
) {
    surface.clear();
    let digits = decimal_digits(id.get());
    draw_numbers(surface, overlay_x(digits.len()), OVERLAY_Y, &digits, MAX_BRIGHTNESS);

    for _ in 0..config.overlay_slices() {
        pacer.yield_for(config.overlay_slice);
    }
}
