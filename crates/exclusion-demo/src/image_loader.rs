//! Image loading and packing for the demo application.

use std::path::Path;

use exclusion_core::{Dimensions, ExclusionError, PixelLayout};
use image::RgbImage;

/// Load an image from disk and pack it into `layout`, native byte order.
///
/// Supports common formats via the `image` crate. Alpha is discarded;
/// the padding byte of every pixel is zero.
pub fn load_frame(path: &Path, layout: PixelLayout) -> Result<(Dimensions, Vec<u8>), ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let dims = Dimensions::new(width, height)?;

    let data = rgb.pixels().flat_map(|p| layout.pack(p.0)).collect();
    Ok((dims, data))
}

/// Unpack a frame from `layout` and write it as an RGB image.
///
/// The output format is chosen from the file extension.
pub fn save_frame(
    path: &Path,
    dims: Dimensions,
    layout: PixelLayout,
    data: &[u8],
) -> Result<(), ImageLoadError> {
    let rgb: Vec<u8> = data
        .chunks_exact(4)
        .flat_map(|c| layout.unpack([c[0], c[1], c[2], c[3]]))
        .collect();
    let img = RgbImage::from_raw(dims.width, dims.height, rgb).ok_or(ImageLoadError::Size {
        width: dims.width,
        height: dims.height,
        len: data.len(),
    })?;
    img.save(path).map_err(ImageLoadError::Encode)
}

/// Errors that can occur during image loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("image has no pixels: {0}")]
    Empty(#[from] ExclusionError),
    #[error("{len} bytes do not hold a {width}x{height} frame")]
    Size { width: u32, height: u32, len: usize },
}
