// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-node parameter bags.
//!
//! Every node kind advertises a static schema table. Values coming from
//! the host or from a saved file are checked against that table before
//! the node sees them, so node implementations only convert, never guess.

use crate::value::Transform;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque handle to an externally owned resource (texture, cube map).
///
/// The graph records the handle and hands it back in uniform bindings; it
/// never loads or owns the resource behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    /// Create a handle from a resource path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The resource path
    pub fn path(&self) -> &str {
        &self.0
    }
}

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// Boolean
    Bool(bool),
    /// 3D vector
    Vector3([f32; 3]),
    /// RGBA color
    Color([f32; 4]),
    /// Transform
    Transform(Transform),
    /// Free text (names, GLSL code)
    Text(String),
    /// Index into the schema's variant list
    Enum(usize),
    /// Optional resource
    Resource(Option<ResourceHandle>),
}

/// Expected shape of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// [`ParamValue::Int`]
    Int,
    /// [`ParamValue::Float`]
    Float,
    /// [`ParamValue::Bool`]
    Bool,
    /// [`ParamValue::Vector3`]
    Vector3,
    /// [`ParamValue::Color`]
    Color,
    /// [`ParamValue::Transform`]
    Transform,
    /// [`ParamValue::Text`]
    Text,
    /// [`ParamValue::Enum`] with the variant names
    Enum(&'static [&'static str]),
    /// [`ParamValue::Resource`]
    Resource,
}

impl ParamKind {
    /// Human readable name used in errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Vector3 => "vector3",
            Self::Color => "color",
            Self::Transform => "transform",
            Self::Text => "text",
            Self::Enum(_) => "enum",
            Self::Resource => "resource",
        }
    }

    fn matches(&self, value: &ParamValue) -> bool {
        matches!(
            (self, value),
            (Self::Int, ParamValue::Int(_))
                | (Self::Float, ParamValue::Float(_))
                | (Self::Bool, ParamValue::Bool(_))
                | (Self::Vector3, ParamValue::Vector3(_))
                | (Self::Color, ParamValue::Color(_))
                | (Self::Transform, ParamValue::Transform(_))
                | (Self::Text, ParamValue::Text(_))
                | (Self::Enum(_), ParamValue::Enum(_))
                | (Self::Resource, ParamValue::Resource(_))
        )
    }
}

/// One row of a node kind's parameter schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Property name
    pub name: &'static str,
    /// Expected shape
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Create a schema row
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind }
    }
}

/// Named parameters passed to node construction
pub type ParamBag = IndexMap<String, ParamValue>;

/// Parameter validation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// The node kind has no such parameter
    #[error("node kind `{kind}` has no parameter `{name}`")]
    Unknown {
        /// Node kind key
        kind: &'static str,
        /// Requested parameter
        name: String,
    },

    /// Value of the wrong shape
    #[error("parameter `{name}` expects a {expected} value")]
    WrongType {
        /// Parameter name
        name: String,
        /// Expected shape
        expected: &'static str,
    },

    /// Enum index past the variant list
    #[error("parameter `{name}` has no variant #{index}")]
    OutOfRange {
        /// Parameter name
        name: String,
        /// Offending index
        index: usize,
    },

    /// Value rejected by the node itself
    #[error("invalid value for `{name}`: {reason}")]
    Invalid {
        /// Parameter name
        name: String,
        /// Why the node refused it
        reason: String,
    },
}

/// Check a value against a schema table.
pub fn validate(
    schema: &[ParamSpec],
    kind: &'static str,
    name: &str,
    value: &ParamValue,
) -> Result<(), ParamError> {
    let Some(entry) = schema.iter().find(|s| s.name == name) else {
        return Err(ParamError::Unknown {
            kind,
            name: name.to_string(),
        });
    };
    if !entry.kind.matches(value) {
        return Err(ParamError::WrongType {
            name: name.to_string(),
            expected: entry.kind.name(),
        });
    }
    if let (ParamKind::Enum(variants), ParamValue::Enum(index)) = (entry.kind, value) {
        if *index >= variants.len() {
            return Err(ParamError::OutOfRange {
                name: name.to_string(),
                index: *index,
            });
        }
    }
    Ok(())
}

/// Selector enums stored as [`ParamValue::Enum`].
pub trait ParamEnum: Copy + PartialEq + 'static {
    /// Every variant, in persisted order
    const ALL: &'static [Self];
    /// Variant names, parallel to [`ParamEnum::ALL`]
    const NAMES: &'static [&'static str];

    /// Index of this variant
    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// Variant at `index`
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parameter value for this variant
    fn to_param(self) -> ParamValue {
        ParamValue::Enum(self.index())
    }

    /// Convert a validated parameter value
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Enum(index) => Self::from_index(*index).ok_or(ParamError::OutOfRange {
                name: name.to_string(),
                index: *index,
            }),
            _ => Err(wrong_type(name, "enum")),
        }
    }
}

pub(crate) fn wrong_type(name: &str, expected: &'static str) -> ParamError {
    ParamError::WrongType {
        name: name.to_string(),
        expected,
    }
}

pub(crate) fn as_float(name: &str, value: &ParamValue) -> Result<f32, ParamError> {
    match value {
        ParamValue::Float(v) => Ok(*v),
        _ => Err(wrong_type(name, "float")),
    }
}

pub(crate) fn as_bool(name: &str, value: &ParamValue) -> Result<bool, ParamError> {
    match value {
        ParamValue::Bool(v) => Ok(*v),
        _ => Err(wrong_type(name, "bool")),
    }
}

pub(crate) fn as_vector3(name: &str, value: &ParamValue) -> Result<[f32; 3], ParamError> {
    match value {
        ParamValue::Vector3(v) => Ok(*v),
        _ => Err(wrong_type(name, "vector3")),
    }
}

pub(crate) fn as_color(name: &str, value: &ParamValue) -> Result<[f32; 4], ParamError> {
    match value {
        ParamValue::Color(v) => Ok(*v),
        _ => Err(wrong_type(name, "color")),
    }
}

pub(crate) fn as_transform(name: &str, value: &ParamValue) -> Result<Transform, ParamError> {
    match value {
        ParamValue::Transform(v) => Ok(*v),
        _ => Err(wrong_type(name, "transform")),
    }
}

pub(crate) fn as_text<'a>(name: &str, value: &'a ParamValue) -> Result<&'a str, ParamError> {
    match value {
        ParamValue::Text(v) => Ok(v),
        _ => Err(wrong_type(name, "text")),
    }
}

pub(crate) fn as_resource(
    name: &str,
    value: &ParamValue,
) -> Result<Option<ResourceHandle>, ParamError> {
    match value {
        ParamValue::Resource(v) => Ok(v.clone()),
        _ => Err(wrong_type(name, "resource")),
    }
}

pub(crate) fn unknown(kind: &'static str, name: &str) -> ParamError {
    ParamError::Unknown {
        kind,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Shade {
        Flat,
        Smooth,
    }

    impl ParamEnum for Shade {
        const ALL: &'static [Self] = &[Self::Flat, Self::Smooth];
        const NAMES: &'static [&'static str] = &["Flat", "Smooth"];
    }

    const SCHEMA: &[ParamSpec] = &[
        ParamSpec::new("shade", ParamKind::Enum(Shade::NAMES)),
        ParamSpec::new("value", ParamKind::Float),
    ];

    #[test]
    fn test_validate_against_schema() {
        assert!(validate(SCHEMA, "Test", "value", &ParamValue::Float(1.0)).is_ok());
        assert!(validate(SCHEMA, "Test", "shade", &ParamValue::Enum(1)).is_ok());

        assert!(matches!(
            validate(SCHEMA, "Test", "missing", &ParamValue::Float(1.0)),
            Err(ParamError::Unknown { .. })
        ));
        assert!(matches!(
            validate(SCHEMA, "Test", "value", &ParamValue::Bool(true)),
            Err(ParamError::WrongType { expected: "float", .. })
        ));
        assert!(matches!(
            validate(SCHEMA, "Test", "shade", &ParamValue::Enum(2)),
            Err(ParamError::OutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_enum_conversion() {
        assert_eq!(Shade::Smooth.index(), 1);
        assert_eq!(Shade::from_index(0), Some(Shade::Flat));
        assert_eq!(Shade::from_index(5), None);
        assert_eq!(
            Shade::from_param("shade", &Shade::Smooth.to_param()).unwrap(),
            Shade::Smooth
        );
    }
}
