use exclusion_core::ExclusionError;

/// Errors produced while parsing a textual caps description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapsParseError {
    #[error("caps string is empty")]
    Empty,
    #[error("field `{0}` is not of the form key=value")]
    MalformedField(String),
    #[error("field `{field}` has an invalid {kind} value: {value}")]
    InvalidValue {
        field: String,
        kind: &'static str,
        value: String,
    },
    #[error("unknown value type `{0}`")]
    UnknownType(String),
}

/// Reasons a proposed format is refused. No element state changes on any of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    #[error("unsupported media type: {0}")]
    MediaType(String),
    #[error("caps lack an integer `{0}` field")]
    MissingField(&'static str),
    #[error("caps dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),
    #[error("downstream refused caps: {0}")]
    Refused(String),
}

/// Flow results a downstream peer can return from a push.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("downstream is flushing")]
    Flushing,
    #[error("downstream reached end of stream")]
    Eos,
    #[error("downstream has not negotiated a format")]
    NotNegotiated,
    #[error("downstream error: {0}")]
    Error(String),
}

/// Errors surfaced by the element to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    #[error(transparent)]
    Processing(#[from] ExclusionError),

    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("push failed: {0}")]
    Flow(#[from] FlowError),

    #[error("src pad is not linked")]
    NotLinked,

    #[error("unknown property: {0}")]
    UnknownProperty(String),

    #[error("property `{name}` expects a {expected} value")]
    PropertyType {
        name: &'static str,
        expected: &'static str,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Errors from element registration and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("element `{0}` is already registered")]
    Duplicate(String),
    #[error("no element named `{0}`")]
    NotFound(String),
}
