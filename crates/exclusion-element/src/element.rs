//! The exclusion element: negotiation, per-buffer processing, and properties.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use exclusion_core::{Dimensions, FilterState, PixelLayout, pixels_from_bytes};
use parking_lot::{Mutex, RwLock};

use crate::buffer::Buffer;
use crate::caps::{Caps, VIDEO_RAW};
use crate::error::{ElementError, NegotiationError};
use crate::pad::{Downstream, PadDirection, PadTemplate};
use crate::properties::{ElementSettings, PROP_SILENT, PROPERTIES, PropertySpec, PropertyValue};
use crate::registry::ElementMetadata;

/// A one-in, one-out pipeline stage.
///
/// Upstream calls [`set_caps`](Element::set_caps) once the format is known
/// and then [`chain`](Element::chain) for every buffer. Output goes to the
/// peer attached with [`link`](Element::link).
pub trait Element: Send + Sync {
    fn metadata(&self) -> ElementMetadata;

    fn pad_templates(&self) -> Vec<PadTemplate>;

    fn properties(&self) -> &'static [PropertySpec];

    /// Attach the src pad's downstream peer, replacing any previous one.
    ///
    /// If a format is already negotiated the new peer must accept it.
    fn link(&self, peer: Box<dyn Downstream>) -> Result<(), NegotiationError>;

    /// Detach and return the downstream peer.
    fn unlink(&self) -> Option<Box<dyn Downstream>>;

    /// Sink-pad format negotiation.
    fn set_caps(&self, caps: &Caps) -> Result<(), NegotiationError>;

    /// Sink-pad buffer arrival.
    fn chain(&self, buffer: Buffer) -> Result<(), ElementError>;

    /// Drop the negotiated format, e.g. when the pipeline stops.
    fn stop(&self);

    fn set_property(&self, name: &str, value: PropertyValue) -> Result<(), ElementError>;

    fn property(&self, name: &str) -> Result<PropertyValue, ElementError>;
}

#[derive(Default)]
struct SrcPad {
    peer: Option<Box<dyn Downstream>>,
    caps: Option<Caps>,
}

/// Remaps the colors of every frame through the exclusion blend.
///
/// The negotiated size lives behind a read-mostly lock, and the src pad
/// behind a mutex. Every path that needs both takes the src pad first:
/// a frame holds it from the transform through the push, so a format
/// change never lands mid-frame and never overtakes a frame sized for
/// the previous format.
pub struct Exclusion {
    state: RwLock<FilterState>,
    src: Mutex<SrcPad>,
    silent: AtomicBool,
    frames: AtomicU64,
}

impl Exclusion {
    /// Factory name the element registers under.
    pub const NAME: &'static str = "exclusion";

    pub fn new() -> Self {
        Self::with_settings(ElementSettings::default())
    }

    pub fn with_settings(settings: ElementSettings) -> Self {
        Self {
            state: RwLock::new(FilterState::new()),
            src: Mutex::new(SrcPad::default()),
            silent: AtomicBool::new(settings.silent),
            frames: AtomicU64::new(0),
        }
    }

    /// Build from a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, ElementError> {
        Ok(Self::with_settings(ElementSettings::from_json(json)?))
    }

    pub fn settings(&self) -> ElementSettings {
        ElementSettings {
            silent: self.silent.load(Ordering::Relaxed),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.silent.load(Ordering::Relaxed)
    }

    /// Frames processed since creation.
    pub fn frames_processed(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Currently negotiated size and layout, if any.
    pub fn negotiated(&self) -> Option<(Dimensions, PixelLayout)> {
        let state = self.state.read();
        Some((state.dimensions().ok()?, state.layout()?))
    }

    /// The caps most recently forwarded downstream.
    pub fn src_caps(&self) -> Option<Caps> {
        self.src.lock().caps.clone()
    }
}

impl Default for Exclusion {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a proposed format against what the element can handle.
fn parse_format(caps: &Caps) -> Result<(Dimensions, PixelLayout), NegotiationError> {
    if caps.media_type() != VIDEO_RAW {
        return Err(NegotiationError::MediaType(caps.media_type().to_string()));
    }

    let width = caps
        .get_int("width")
        .ok_or(NegotiationError::MissingField("width"))?;
    let height = caps
        .get_int("height")
        .ok_or(NegotiationError::MissingField("height"))?;

    let dims = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Dimensions::new(w, h).ok(),
        _ => None,
    }
    .ok_or(NegotiationError::InvalidDimension { width, height })?;

    let layout = match caps.get("format") {
        None => PixelLayout::native()[0],
        Some(_) => {
            let name = caps
                .get_str("format")
                .ok_or_else(|| NegotiationError::UnsupportedFormat(format!("{caps}")))?;
            name.parse::<PixelLayout>()
                .ok()
                .filter(|l| l.is_native())
                .ok_or_else(|| NegotiationError::UnsupportedFormat(name.to_string()))?
        }
    };

    Ok((dims, layout))
}

impl Element for Exclusion {
    fn metadata(&self) -> ElementMetadata {
        ElementMetadata::exclusion()
    }

    fn pad_templates(&self) -> Vec<PadTemplate> {
        vec![
            PadTemplate::always("src", PadDirection::Src),
            PadTemplate::always("sink", PadDirection::Sink),
        ]
    }

    fn properties(&self) -> &'static [PropertySpec] {
        &PROPERTIES
    }

    fn link(&self, mut peer: Box<dyn Downstream>) -> Result<(), NegotiationError> {
        let mut src = self.src.lock();
        if let Some(caps) = &src.caps {
            peer.set_caps(caps)?;
        }
        src.peer = Some(peer);
        Ok(())
    }

    fn unlink(&self) -> Option<Box<dyn Downstream>> {
        self.src.lock().peer.take()
    }

    fn set_caps(&self, caps: &Caps) -> Result<(), NegotiationError> {
        let (dims, layout) = parse_format(caps).inspect_err(|e| {
            tracing::warn!("rejecting caps {caps}: {e}");
        })?;

        // The peer sees the format first; nothing is committed if it refuses.
        let mut src = self.src.lock();
        if let Some(peer) = src.peer.as_mut() {
            peer.set_caps(caps).inspect_err(|e| {
                tracing::warn!("downstream refused caps {caps}: {e}");
            })?;
        }

        self.state.write().configure(dims, layout);
        src.caps = Some(caps.clone());

        tracing::info!(
            "negotiated {layout} {}x{}",
            dims.width,
            dims.height
        );
        Ok(())
    }

    fn chain(&self, buffer: Buffer) -> Result<(), ElementError> {
        // src before state, the same order set_caps takes them, so new caps
        // cannot reach the peer between this frame's transform and its push.
        let mut src = self.src.lock();
        let frame = {
            let state = self.state.read();
            state.dimensions()?;
            let pixels = pixels_from_bytes(&buffer.data)?;
            state.process(&pixels)?
        };

        let count = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.is_silent() {
            tracing::debug!(
                "frame {count}: {}x{} pts={:?}",
                frame.width,
                frame.height,
                buffer.pts
            );
        }

        let out = buffer.with_data(frame.as_bytes().to_vec());
        let peer = src.peer.as_mut().ok_or(ElementError::NotLinked)?;
        peer.push(out)?;
        Ok(())
    }

    fn stop(&self) {
        let mut src = self.src.lock();
        self.state.write().reset();
        src.caps = None;
        drop(src);
        tracing::debug!("exclusion stopped after {} frames", self.frames_processed());
    }

    fn set_property(&self, name: &str, value: PropertyValue) -> Result<(), ElementError> {
        match name {
            PROP_SILENT => {
                let silent = value.as_bool().ok_or(ElementError::PropertyType {
                    name: PROP_SILENT,
                    expected: "boolean",
                })?;
                self.silent.store(silent, Ordering::Relaxed);
                Ok(())
            }
            other => Err(ElementError::UnknownProperty(other.to_string())),
        }
    }

    fn property(&self, name: &str) -> Result<PropertyValue, ElementError> {
        match name {
            PROP_SILENT => Ok(PropertyValue::Bool(self.is_silent())),
            other => Err(ElementError::UnknownProperty(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use exclusion_core::{ExclusionError, Pixel};

    use super::*;
    use crate::error::FlowError;
    use crate::pad::CollectSink;

    fn native_caps(width: i32, height: i32) -> Caps {
        Caps::new(VIDEO_RAW)
            .field("format", PixelLayout::native()[0].format_name())
            .field("width", width)
            .field("height", height)
    }

    fn solid_buffer(pixel: Pixel, count: usize) -> Buffer {
        Buffer::from_vec(pixel.0.to_ne_bytes().repeat(count))
    }

    fn linked() -> (Exclusion, CollectSink) {
        let element = Exclusion::new();
        let sink = CollectSink::new();
        element.link(Box::new(sink.clone())).unwrap();
        (element, sink)
    }

    #[test]
    fn test_set_caps_configures_and_propagates() {
        let (element, sink) = linked();
        let caps = native_caps(4, 2);
        element.set_caps(&caps).unwrap();

        let (dims, layout) = element.negotiated().unwrap();
        assert_eq!((dims.width, dims.height), (4, 2));
        assert_eq!(layout, PixelLayout::native()[0]);
        assert_eq!(sink.caps(), Some(caps.clone()));
        assert_eq!(element.src_caps(), Some(caps));
    }

    #[test]
    fn test_missing_dimensions_fail_without_mutation() {
        let (element, sink) = linked();
        let caps = Caps::new(VIDEO_RAW).field("width", 4);
        assert_eq!(
            element.set_caps(&caps),
            Err(NegotiationError::MissingField("height"))
        );
        assert!(element.negotiated().is_none());
        assert!(sink.caps().is_none());
    }

    #[test]
    fn test_non_integer_width_is_missing() {
        let element = Exclusion::new();
        let caps = Caps::new(VIDEO_RAW).field("width", "wide").field("height", 2);
        assert_eq!(
            element.set_caps(&caps),
            Err(NegotiationError::MissingField("width"))
        );
    }

    #[test]
    fn test_failed_renegotiation_keeps_previous_format() {
        let (element, _sink) = linked();
        element.set_caps(&native_caps(4, 2)).unwrap();
        assert!(element.set_caps(&native_caps(0, 2)).is_err());
        assert!(element.set_caps(&native_caps(-3, 2)).is_err());
        let (dims, _) = element.negotiated().unwrap();
        assert_eq!((dims.width, dims.height), (4, 2));
    }

    #[test]
    fn test_foreign_layout_and_media_type_rejected() {
        let element = Exclusion::new();
        let foreign = if cfg!(target_endian = "little") { "xRGB" } else { "BGRx" };
        let caps = native_caps(2, 2).field("format", foreign);
        assert_eq!(
            element.set_caps(&caps),
            Err(NegotiationError::UnsupportedFormat(foreign.to_string()))
        );

        let audio = Caps::new("audio/x-raw").field("width", 2).field("height", 2);
        assert!(matches!(
            element.set_caps(&audio),
            Err(NegotiationError::MediaType(_))
        ));
    }

    #[test]
    fn test_format_defaults_to_preferred_layout() {
        let element = Exclusion::new();
        let caps = Caps::new(VIDEO_RAW).field("width", 1).field("height", 1);
        element.set_caps(&caps).unwrap();
        assert_eq!(element.negotiated().unwrap().1, PixelLayout::native()[0]);
    }

    #[test]
    fn test_refused_caps_leave_element_unconfigured() {
        let element = Exclusion::new();
        element.link(Box::new(CollectSink::refusing())).unwrap();
        assert!(matches!(
            element.set_caps(&native_caps(2, 2)),
            Err(NegotiationError::Refused(_))
        ));
        assert!(element.negotiated().is_none());
    }

    #[test]
    fn test_chain_before_negotiation_is_unconfigured() {
        let (element, sink) = linked();
        let err = element
            .chain(solid_buffer(Pixel::from_rgb(1, 2, 3), 4))
            .unwrap_err();
        assert!(matches!(
            err,
            ElementError::Processing(ExclusionError::Unconfigured)
        ));
        assert_eq!(sink.buffer_count(), 0);
    }

    #[test]
    fn test_unaligned_buffer_before_negotiation_is_unconfigured() {
        let element = Exclusion::new();
        assert!(matches!(
            element.chain(Buffer::from_vec(vec![0; 15])),
            Err(ElementError::Processing(ExclusionError::Unconfigured))
        ));
        assert_eq!(element.frames_processed(), 0);
    }

    #[test]
    fn test_chain_transforms_and_pushes() {
        let (element, sink) = linked();
        element.set_caps(&native_caps(2, 2)).unwrap();
        element
            .chain(solid_buffer(Pixel::from_rgb(100, 100, 100), 4))
            .unwrap();

        let out = sink.take_buffers();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, Pixel::from_rgb(86, 86, 86).0.to_ne_bytes().repeat(4));
        assert_eq!(element.frames_processed(), 1);
    }

    #[test]
    fn test_chain_rejects_wrong_size() {
        let (element, _sink) = linked();
        element.set_caps(&native_caps(2, 2)).unwrap();
        assert!(matches!(
            element.chain(solid_buffer(Pixel(0), 3)),
            Err(ElementError::Processing(ExclusionError::InvalidDimensions { .. }))
        ));
        assert!(matches!(
            element.chain(Buffer::from_vec(vec![0; 15])),
            Err(ElementError::Processing(ExclusionError::BufferLength { len: 15 }))
        ));
    }

    #[test]
    fn test_chain_without_peer_is_not_linked() {
        let element = Exclusion::new();
        element.set_caps(&native_caps(1, 1)).unwrap();
        assert!(matches!(
            element.chain(solid_buffer(Pixel(0), 1)),
            Err(ElementError::NotLinked)
        ));
    }

    #[test]
    fn test_flow_error_is_returned() {
        let (element, sink) = linked();
        element.set_caps(&native_caps(1, 1)).unwrap();
        sink.set_flow_error(Some(FlowError::Flushing));
        assert!(matches!(
            element.chain(solid_buffer(Pixel(0), 1)),
            Err(ElementError::Flow(FlowError::Flushing))
        ));
    }

    #[test]
    fn test_late_link_receives_current_caps() {
        let element = Exclusion::new();
        element.set_caps(&native_caps(3, 1)).unwrap();

        let sink = CollectSink::new();
        element.link(Box::new(sink.clone())).unwrap();
        assert_eq!(sink.caps().and_then(|c| c.get_int("width")), Some(3));

        assert!(element.link(Box::new(CollectSink::refusing())).is_err());
    }

    #[test]
    fn test_stop_resets_negotiation() {
        let (element, _sink) = linked();
        element.set_caps(&native_caps(1, 1)).unwrap();
        element.stop();
        assert!(element.negotiated().is_none());
        assert!(matches!(
            element.chain(solid_buffer(Pixel(0), 1)),
            Err(ElementError::Processing(ExclusionError::Unconfigured))
        ));
    }

    #[test]
    fn test_silent_property() {
        let element = Exclusion::new();
        assert_eq!(element.property("silent").unwrap(), PropertyValue::Bool(false));
        element.set_property("silent", true.into()).unwrap();
        assert_eq!(element.property("silent").unwrap(), PropertyValue::Bool(true));
        assert!(element.settings().silent);

        assert!(matches!(
            element.set_property("silent", 1i64.into()),
            Err(ElementError::PropertyType { name: "silent", .. })
        ));
        assert!(matches!(
            element.property("factor"),
            Err(ElementError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_silent_does_not_change_output() {
        let loud = linked();
        let quiet = linked();
        quiet.0.set_property("silent", true.into()).unwrap();

        for (element, _) in [&loud, &quiet] {
            element.set_caps(&native_caps(2, 1)).unwrap();
            element
                .chain(solid_buffer(Pixel::from_rgb(200, 30, 250), 2))
                .unwrap();
        }
        assert_eq!(loud.1.take_buffers(), quiet.1.take_buffers());
    }

    #[test]
    fn test_from_json_settings() {
        let element = Exclusion::from_json(r#"{"silent": true}"#).unwrap();
        assert!(element.is_silent());
        assert!(matches!(
            Exclusion::from_json("not json"),
            Err(ElementError::Settings(_))
        ));
    }

    #[test]
    fn test_pad_templates() {
        let templates = Exclusion::new().pad_templates();
        let names: Vec<_> = templates.iter().map(|t| t.name).collect();
        assert_eq!(names, ["src", "sink"]);
    }
}
