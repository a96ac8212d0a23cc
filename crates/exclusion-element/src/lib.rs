//! Exclusion Element: hosts the exclusion effect as a one-in, one-out
//! pipeline stage.
//!
//! The element negotiates a packed 32-bit RGB format on its sink side,
//! forwards the same caps to its downstream peer, and transforms each
//! incoming buffer with [`exclusion_core`] before pushing it on.

pub mod buffer;
pub mod caps;
pub mod element;
pub mod error;
pub mod pad;
pub mod properties;
pub mod registry;

pub use buffer::Buffer;
pub use caps::{Caps, CapsValue, template_caps};
pub use element::{Element, Exclusion};
pub use error::{CapsParseError, ElementError, FlowError, NegotiationError, RegistryError};
pub use pad::{CollectSink, Downstream, PadDirection, PadPresence, PadTemplate};
pub use properties::{ElementSettings, PropertySpec, PropertyValue};
pub use registry::{ElementMetadata, Rank, Registry, plugin_init};
