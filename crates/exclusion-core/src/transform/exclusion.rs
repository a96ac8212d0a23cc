//! The exclusion blend: remaps each channel of a single pixel.
//!
//! For a channel value `c` and a mixing value `m`:
//!
//! ```text
//! c' = factor − ((factor − c)² / factor + m × c / factor)
//! ```
//!
//! with `factor = 175` and truncating integer division. Red mixes with
//! green; green and blue mix with themselves. That asymmetry is part of
//! the effect's established output and is kept as is.

use crate::pixel::Pixel;

/// Blend constant used throughout the exclusion formula.
pub const FACTOR: i32 = 175;

/// Restrict `value` to `[min, max]`.
pub fn gate(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Exclusion of one channel against a mixing value, before gating.
///
/// Inputs are bytes, so every intermediate stays small and non-negative
/// where it is divided; the result is in `[-232, 175]`.
pub fn exclude_channel(channel: u8, mix: u8) -> i32 {
    let c = i32::from(channel);
    let m = i32::from(mix);
    let d = FACTOR - c;
    FACTOR - ((d * d) / FACTOR + (m * c) / FACTOR)
}

/// Apply the exclusion blend to one packed pixel.
///
/// The output padding byte is always zero.
pub fn transform_pixel(pixel: Pixel) -> Pixel {
    let (r, g, b) = (pixel.red(), pixel.green(), pixel.blue());

    let red = gate(exclude_channel(r, g), 0, 255);
    let green = gate(exclude_channel(g, g), 0, 255);
    let blue = gate(exclude_channel(b, b), 0, 255);

    Pixel::from_rgb(red as u8, green as u8, blue as u8)
}
