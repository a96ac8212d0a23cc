//! Negotiated filter state, the only mutable state the effect carries.

use serde::{Deserialize, Serialize};

use crate::error::ExclusionError;
use crate::frame::{Frame, process_frame};
use crate::pixel::{Pixel, PixelLayout};

/// Positive frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self, ExclusionError> {
        if width == 0 || height == 0 {
            return Err(ExclusionError::ZeroDimension { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Width, height and layout fixed by the last successful negotiation.
///
/// Starts unconfigured; frames cannot be processed until [`configure`]
/// has been called.
///
/// [`configure`]: FilterState::configure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    negotiated: Option<(Dimensions, PixelLayout)>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a negotiated format, replacing any previous one.
    pub fn configure(&mut self, dimensions: Dimensions, layout: PixelLayout) {
        if let Some((previous, _)) = self.negotiated.filter(|(prev, _)| *prev != dimensions) {
            tracing::debug!(
                "filter state renegotiated: {}x{} -> {}x{}",
                previous.width,
                previous.height,
                dimensions.width,
                dimensions.height
            );
        }
        self.negotiated = Some((dimensions, layout));
    }

    /// Forget the negotiated format.
    pub fn reset(&mut self) {
        self.negotiated = None;
    }

    pub fn is_configured(&self) -> bool {
        self.negotiated.is_some()
    }

    pub fn dimensions(&self) -> Result<Dimensions, ExclusionError> {
        self.negotiated
            .map(|(dims, _)| dims)
            .ok_or(ExclusionError::Unconfigured)
    }

    pub fn layout(&self) -> Option<PixelLayout> {
        self.negotiated.map(|(_, layout)| layout)
    }

    /// Process a frame at the negotiated size.
    pub fn process(&self, input: &[Pixel]) -> Result<Frame, ExclusionError> {
        let dims = self.dimensions()?;
        process_frame(input, dims.width, dims.height)
    }
}
