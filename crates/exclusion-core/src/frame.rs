//! Frame processing: applies the exclusion transform to every pixel.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::ExclusionError;
use crate::pixel::Pixel;
use crate::transform::exclusion::transform_pixel;

/// Minimum number of pixels handed to one rayon task.
#[cfg(feature = "parallel")]
const PAR_MIN_PIXELS: usize = 4096;

/// A row-major frame of packed pixels with no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel data, `width * height` entries.
    pub pixels: Vec<Pixel>,
}

impl Frame {
    /// Wrap pixel data, checking it matches `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, ExclusionError> {
        check_dimensions(pixels.len(), width, height)?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Pixel data as native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

fn check_dimensions(len: usize, width: u32, height: u32) -> Result<(), ExclusionError> {
    let expected = (width as usize).checked_mul(height as usize);
    if expected != Some(len) {
        return Err(ExclusionError::InvalidDimensions {
            width,
            height,
            pixels: len,
        });
    }
    Ok(())
}

/// Transform `input` into a newly allocated frame of the same size.
///
/// `width * height` must equal `input.len()`; a mismatch fails with
/// [`ExclusionError::InvalidDimensions`] instead of reading past the buffer.
/// The input is left untouched.
pub fn process_frame(input: &[Pixel], width: u32, height: u32) -> Result<Frame, ExclusionError> {
    check_dimensions(input.len(), width, height)?;

    let mut pixels = vec![Pixel::default(); input.len()];
    map_pixels(input, &mut pixels);

    Ok(Frame {
        width,
        height,
        pixels,
    })
}

/// Transform `input` into a caller-supplied buffer of equal length.
pub fn process_frame_into(input: &[Pixel], output: &mut [Pixel]) -> Result<(), ExclusionError> {
    if input.len() != output.len() {
        return Err(ExclusionError::LengthMismatch {
            input: input.len(),
            output: output.len(),
        });
    }
    map_pixels(input, output);
    Ok(())
}

#[cfg(feature = "parallel")]
fn map_pixels(input: &[Pixel], output: &mut [Pixel]) {
    output
        .par_iter_mut()
        .zip(input.par_iter())
        .with_min_len(PAR_MIN_PIXELS)
        .for_each(|(dst, src)| *dst = transform_pixel(*src));
}

#[cfg(not(feature = "parallel"))]
fn map_pixels(input: &[Pixel], output: &mut [Pixel]) {
    for (dst, src) in output.iter_mut().zip(input) {
        *dst = transform_pixel(*src);
    }
}
