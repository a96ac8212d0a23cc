//! Element properties and their serialisable settings.

use serde::{Deserialize, Serialize};

/// Name of the only property the element exposes.
pub const PROP_SILENT: &str = "silent";

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PropertyValue {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// Static description of one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub nick: &'static str,
    pub blurb: &'static str,
    pub default: PropertyValue,
    pub writable: bool,
}

/// Properties of the exclusion element.
pub static PROPERTIES: [PropertySpec; 1] = [PropertySpec {
    name: PROP_SILENT,
    nick: "Silent",
    blurb: "Suppress per-frame diagnostic output",
    default: PropertyValue::Bool(false),
    writable: true,
}];

/// Element configuration that can be loaded from JSON.
///
/// Settings are diagnostic only and never change the transformed pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSettings {
    /// Suppress per-frame debug logging.
    pub silent: bool,
}

impl ElementSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_json() {
        let s = ElementSettings::from_json(r#"{"silent": true}"#).unwrap();
        assert!(s.silent);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let s = ElementSettings::from_json("{}").unwrap();
        assert_eq!(s, ElementSettings::default());
        assert!(!s.silent);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let s = ElementSettings { silent: true };
        let json = s.to_json().unwrap();
        assert_eq!(ElementSettings::from_json(&json).unwrap(), s);
    }

    #[test]
    fn test_untagged_values() {
        let v: PropertyValue = serde_json::from_str("true").unwrap();
        assert_eq!(v.as_bool(), Some(true));
        let v: PropertyValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, PropertyValue::Int(3));
        assert_eq!(v.as_bool(), None);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(ElementSettings::from_json(r#"{"silent": "yes"}"#).is_err());
    }

    #[test]
    fn test_silent_spec_default() {
        let spec = &PROPERTIES[0];
        assert_eq!(spec.name, "silent");
        assert_eq!(spec.default, PropertyValue::Bool(false));
        assert_eq!(spec.default.type_name(), "boolean");
    }
}
