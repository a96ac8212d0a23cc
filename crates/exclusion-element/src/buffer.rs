//! Media buffers exchanged between pipeline stages.

use std::time::Duration;

/// One frame's worth of raw bytes plus its timing metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    /// Packed pixel bytes in native byte order.
    pub data: Vec<u8>,
    /// Presentation timestamp.
    pub pts: Option<Duration>,
    /// Frame duration.
    pub duration: Option<Duration>,
    /// Frame number within the stream.
    pub offset: Option<u64>,
}

impl Buffer {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_pts(mut self, pts: Duration) -> Self {
        self.pts = Some(pts);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// A new buffer carrying `data` and this buffer's metadata.
    pub fn with_data(&self, data: Vec<u8>) -> Self {
        Self {
            data,
            pts: self.pts,
            duration: self.duration,
            offset: self.offset,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
