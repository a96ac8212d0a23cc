//! Pads, pad templates, and the downstream peer interface.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::Buffer;
use crate::caps::{Caps, template_caps};
use crate::error::{FlowError, NegotiationError};

/// Direction data flows through a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadDirection {
    Sink,
    Src,
}

/// When a pad from a template exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadPresence {
    Always,
    Sometimes,
    Request,
}

/// Static description of a pad an element exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadTemplate {
    pub name: &'static str,
    pub direction: PadDirection,
    pub presence: PadPresence,
    pub caps: Vec<Caps>,
}

impl PadTemplate {
    /// An always-present pad accepting the native packed RGB layouts.
    pub fn always(name: &'static str, direction: PadDirection) -> Self {
        Self {
            name,
            direction,
            presence: PadPresence::Always,
            caps: template_caps(),
        }
    }
}

/// The peer linked to an element's src pad.
///
/// Receives the negotiated caps before any buffer and then every
/// transformed buffer in stream order.
pub trait Downstream: Send {
    /// Accept or refuse a format. Refusal aborts the upstream negotiation.
    fn set_caps(&mut self, caps: &Caps) -> Result<(), NegotiationError>;

    /// Take ownership of one buffer.
    fn push(&mut self, buffer: Buffer) -> Result<(), FlowError>;
}

#[derive(Debug, Default)]
struct SinkState {
    caps: Option<Caps>,
    buffers: Vec<Buffer>,
    refuse_caps: bool,
    flow_error: Option<FlowError>,
}

/// In-memory sink that records caps and buffers.
///
/// Clones share the same storage, so one clone can be linked into an
/// element while another is kept to inspect what arrived.
#[derive(Debug, Clone, Default)]
pub struct CollectSink {
    inner: Arc<Mutex<SinkState>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every format.
    pub fn refusing() -> Self {
        let sink = Self::default();
        sink.inner.lock().refuse_caps = true;
        sink
    }

    /// Make subsequent pushes fail with `error`, or succeed again with `None`.
    pub fn set_flow_error(&self, error: Option<FlowError>) {
        self.inner.lock().flow_error = error;
    }

    pub fn caps(&self) -> Option<Caps> {
        self.inner.lock().caps.clone()
    }

    pub fn buffer_count(&self) -> usize {
        self.inner.lock().buffers.len()
    }

    /// Drain every buffer received so far.
    pub fn take_buffers(&self) -> Vec<Buffer> {
        std::mem::take(&mut self.inner.lock().buffers)
    }
}

impl Downstream for CollectSink {
    fn set_caps(&mut self, caps: &Caps) -> Result<(), NegotiationError> {
        let mut state = self.inner.lock();
        if state.refuse_caps {
            return Err(NegotiationError::Refused(caps.to_string()));
        }
        state.caps = Some(caps.clone());
        Ok(())
    }

    fn push(&mut self, buffer: Buffer) -> Result<(), FlowError> {
        let mut state = self.inner.lock();
        if let Some(err) = state.flow_error.clone() {
            return Err(err);
        }
        if state.caps.is_none() {
            return Err(FlowError::NotNegotiated);
        }
        state.buffers.push(buffer);
        Ok(())
    }
}
