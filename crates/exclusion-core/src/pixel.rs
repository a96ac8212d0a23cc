//! Packed 32-bit pixel representation and the byte layouts it travels in.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::ExclusionError;

/// Size of one packed pixel in bytes.
pub const BYTES_PER_PIXEL: usize = 4;

/// One packed pixel, read as a native-endian 32-bit word.
///
/// Channels are unpacked with shifts: red in bits 16..24, green in 8..16,
/// blue in 0..8. The top byte is padding and carries no color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Pixel(pub u32);

impl Pixel {
    /// Pack three channels with a zeroed padding byte.
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    pub const fn red(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl From<u32> for Pixel {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

impl From<Pixel> for u32 {
    fn from(pixel: Pixel) -> Self {
        pixel.0
    }
}

/// The packed 32-bit RGB layouts a frame can arrive in.
///
/// Named by byte order in memory, so `Bgrx` stores blue first. Only the two
/// layouts returned by [`PixelLayout::native`] put red in bits 16..24 (or
/// blue there, for the second one) when read as a native word; the
/// transform itself never looks at memory order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelLayout {
    /// Blue, green, red, padding.
    Bgrx,
    /// Red, green, blue, padding.
    Rgbx,
    /// Padding, red, green, blue.
    Xrgb,
    /// Padding, blue, green, red.
    Xbgr,
}

impl PixelLayout {
    /// Layouts accepted on this target's byte order, preferred first.
    pub const fn native() -> [Self; 2] {
        if cfg!(target_endian = "little") {
            [Self::Bgrx, Self::Rgbx]
        } else {
            [Self::Xrgb, Self::Xbgr]
        }
    }

    pub fn is_native(self) -> bool {
        Self::native().contains(&self)
    }

    /// Caps `format` name.
    pub const fn format_name(self) -> &'static str {
        match self {
            Self::Bgrx => "BGRx",
            Self::Rgbx => "RGBx",
            Self::Xrgb => "xRGB",
            Self::Xbgr => "xBGR",
        }
    }

    /// Memory offsets of the red, green and blue bytes.
    const fn rgb_offsets(self) -> [usize; 3] {
        match self {
            Self::Bgrx => [2, 1, 0],
            Self::Rgbx => [0, 1, 2],
            Self::Xrgb => [1, 2, 3],
            Self::Xbgr => [3, 2, 1],
        }
    }

    /// Write one RGB triple into its memory representation.
    pub fn pack(self, rgb: [u8; 3]) -> [u8; BYTES_PER_PIXEL] {
        let mut bytes = [0u8; BYTES_PER_PIXEL];
        for (offset, value) in self.rgb_offsets().into_iter().zip(rgb) {
            bytes[offset] = value;
        }
        bytes
    }

    /// Read one RGB triple back out of memory.
    pub fn unpack(self, bytes: [u8; BYTES_PER_PIXEL]) -> [u8; 3] {
        let [r, g, b] = self.rgb_offsets();
        [bytes[r], bytes[g], bytes[b]]
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_name())
    }
}

/// Error returned when a caps format name is not a packed 32-bit RGB layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pixel layout: {0}")]
pub struct UnknownLayout(pub String);

impl FromStr for PixelLayout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BGRx" => Ok(Self::Bgrx),
            "RGBx" => Ok(Self::Rgbx),
            "xRGB" => Ok(Self::Xrgb),
            "xBGR" => Ok(Self::Xbgr),
            other => Err(UnknownLayout(other.to_string())),
        }
    }
}

/// View a native-endian byte buffer as pixels.
///
/// Borrows when the buffer is suitably aligned and copies otherwise.
pub fn pixels_from_bytes(bytes: &[u8]) -> Result<Cow<'_, [Pixel]>, ExclusionError> {
    if bytes.len() % BYTES_PER_PIXEL != 0 {
        return Err(ExclusionError::BufferLength { len: bytes.len() });
    }

    match bytemuck::try_cast_slice::<u8, Pixel>(bytes) {
        Ok(pixels) => Ok(Cow::Borrowed(pixels)),
        Err(_) => Ok(Cow::Owned(
            bytes
                .chunks_exact(BYTES_PER_PIXEL)
                .map(|c| Pixel(u32::from_ne_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
        )),
    }
}
