//! Caps: the format description two pipeline stages agree on.
//!
//! A caps structure is a media type followed by typed fields, written as
//!
//! ```text
//! video/x-raw, format=(string)BGRx, width=(int)320, height=(int)240, framerate=(fraction)30/1
//! ```
//!
//! Type annotations are optional when parsing: bare integers are ints,
//! `a/b` is a fraction and anything else is a string.

use std::fmt;
use std::str::FromStr;

use exclusion_core::{Dimensions, PixelLayout};
use serde::{Deserialize, Serialize};

use crate::error::CapsParseError;

/// Media type of raw video frames.
pub const VIDEO_RAW: &str = "video/x-raw";

/// A typed caps field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapsValue {
    Int(i32),
    Str(String),
    Fraction(i32, i32),
}

impl From<i32> for CapsValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for CapsValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for CapsValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl fmt::Display for CapsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "(int){v}"),
            Self::Str(v) => write!(f, "(string){v}"),
            Self::Fraction(n, d) => write!(f, "(fraction){n}/{d}"),
        }
    }
}

/// A single caps structure: media type plus ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caps {
    media_type: String,
    fields: Vec<(String, CapsValue)>,
}

impl Caps {
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            fields: Vec::new(),
        }
    }

    /// Raw video caps for a fixed layout and size.
    pub fn video(layout: PixelLayout, dims: Dimensions) -> Self {
        Self::new(VIDEO_RAW)
            .field("format", layout.format_name())
            .field("width", i32::try_from(dims.width).unwrap_or(i32::MAX))
            .field("height", i32::try_from(dims.height).unwrap_or(i32::MAX))
    }

    /// Builder-style [`set`](Self::set).
    pub fn field(mut self, name: &str, value: impl Into<CapsValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing an existing one of the same name.
    pub fn set(&mut self, name: &str, value: impl Into<CapsValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn get(&self, name: &str) -> Option<&CapsValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            CapsValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            CapsValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_fraction(&self, name: &str) -> Option<(i32, i32)> {
        match self.get(name)? {
            CapsValue::Fraction(n, d) => Some((*n, *d)),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CapsValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        for (name, value) in &self.fields {
            write!(f, ", {name}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for Caps {
    type Err = CapsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let media_type = match parts.next() {
            Some(m) if !m.is_empty() => m,
            _ => return Err(CapsParseError::Empty),
        };

        let mut caps = Caps::new(media_type);
        for part in parts.filter(|p| !p.is_empty()) {
            let (name, raw) = part
                .split_once('=')
                .ok_or_else(|| CapsParseError::MalformedField(part.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(CapsParseError::MalformedField(part.to_string()));
            }
            caps.set(name, parse_value(name, raw.trim())?);
        }
        Ok(caps)
    }
}

fn parse_value(field: &str, raw: &str) -> Result<CapsValue, CapsParseError> {
    let invalid = |kind: &'static str| CapsParseError::InvalidValue {
        field: field.to_string(),
        kind,
        value: raw.to_string(),
    };

    let (kind, body) = match raw.strip_prefix('(').and_then(|r| r.split_once(')')) {
        Some((kind, body)) => (Some(kind.trim()), body.trim()),
        None => (None, raw),
    };

    match kind {
        Some("int" | "i") => body.parse().map(CapsValue::Int).map_err(|_| invalid("int")),
        Some("string" | "s") => Ok(CapsValue::Str(body.to_string())),
        Some("fraction") => parse_fraction(body).ok_or_else(|| invalid("fraction")),
        Some(other) => Err(CapsParseError::UnknownType(other.to_string())),
        None => Ok(body
            .parse()
            .map(CapsValue::Int)
            .ok()
            .or_else(|| parse_fraction(body))
            .unwrap_or_else(|| CapsValue::Str(body.to_string()))),
    }
}

fn parse_fraction(body: &str) -> Option<CapsValue> {
    let (n, d) = body.split_once('/')?;
    Some(CapsValue::Fraction(n.trim().parse().ok()?, d.trim().parse().ok()?))
}

/// Caps accepted on both pads: raw video in either native packed layout.
pub fn template_caps() -> Vec<Caps> {
    PixelLayout::native()
        .into_iter()
        .map(|layout| Caps::new(VIDEO_RAW).field("format", layout.format_name()))
        .collect()
}

/// [`template_caps`] rendered as a `;`-separated caps string.
pub fn template_caps_string() -> String {
    template_caps()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_caps() {
        let caps: Caps =
            "video/x-raw, format=(string)BGRx, width=(int)320, height=(int)240, framerate=(fraction)30/1"
                .parse()
                .unwrap();
        assert_eq!(caps.media_type(), VIDEO_RAW);
        assert_eq!(caps.get_str("format"), Some("BGRx"));
        assert_eq!(caps.get_int("width"), Some(320));
        assert_eq!(caps.get_int("height"), Some(240));
        assert_eq!(caps.get_fraction("framerate"), Some((30, 1)));
    }

    #[test]
    fn test_parse_untyped_caps() {
        let caps: Caps = "video/x-raw,format=RGBx,width=8,height=2,framerate=25/1"
            .parse()
            .unwrap();
        assert_eq!(caps.get_str("format"), Some("RGBx"));
        assert_eq!(caps.get_int("width"), Some(8));
        assert_eq!(caps.get_fraction("framerate"), Some((25, 1)));
    }

    #[test]
    fn test_string_width_is_not_an_int() {
        let caps: Caps = "video/x-raw, width=(string)320".parse().unwrap();
        assert_eq!(caps.get_int("width"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Caps>(), Err(CapsParseError::Empty));
        assert!(matches!(
            "video/x-raw, width".parse::<Caps>(),
            Err(CapsParseError::MalformedField(_))
        ));
        assert!(matches!(
            "video/x-raw, width=(int)wide".parse::<Caps>(),
            Err(CapsParseError::InvalidValue { kind: "int", .. })
        ));
        assert_eq!(
            "video/x-raw, width=(double)1.0".parse::<Caps>(),
            Err(CapsParseError::UnknownType("double".to_string()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let caps = Caps::video(PixelLayout::Bgrx, Dimensions::new(64, 48).unwrap())
            .field("framerate", CapsValue::Fraction(30000, 1001));
        let text = caps.to_string();
        assert_eq!(
            text,
            "video/x-raw, format=(string)BGRx, width=(int)64, height=(int)48, framerate=(fraction)30000/1001"
        );
        assert_eq!(text.parse::<Caps>().unwrap(), caps);
    }

    #[test]
    fn test_set_replaces_field() {
        let mut caps = Caps::new(VIDEO_RAW).field("width", 4);
        caps.set("width", 8);
        assert_eq!(caps.get_int("width"), Some(8));
        assert_eq!(caps.fields().count(), 1);
    }

    #[test]
    fn test_template_caps_list_native_layouts() {
        let templates = template_caps();
        assert_eq!(templates.len(), 2);
        for (caps, layout) in templates.iter().zip(PixelLayout::native()) {
            assert_eq!(caps.get_str("format"), Some(layout.format_name()));
        }
        assert!(template_caps_string().contains("; "));
    }
}
