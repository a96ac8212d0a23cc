//! Exclusion Core: domain layer for the exclusion video effect.
//!
//! This crate contains the per-pixel exclusion transform, frame processing,
//! and the negotiated filter state. No pipeline or host framework
//! dependencies.

pub mod error;
pub mod frame;
pub mod pixel;
pub mod state;
pub mod transform;

// Re-exports for convenience.
pub use error::ExclusionError;
pub use frame::{Frame, process_frame, process_frame_into};
pub use pixel::{Pixel, PixelLayout, pixels_from_bytes};
pub use state::{Dimensions, FilterState};
pub use transform::exclusion::{FACTOR, gate, transform_pixel};
