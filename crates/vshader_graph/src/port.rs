// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::mode::Stage;
use crate::value::DefaultValue;
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type that can flow through ports.
///
/// The set is closed: node kinds declare one of these per port and the
/// compiler never infers types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// `float`
    Scalar,
    /// `vec3`
    Vector3,
    /// `bool`
    Boolean,
    /// `mat4`
    Transform,
    /// `sampler2D`
    Sampler2D,
    /// `samplerCube`
    SamplerCube,
}

impl PortType {
    /// All port types, in declaration order
    pub const ALL: [PortType; 6] = [
        Self::Scalar,
        Self::Vector3,
        Self::Boolean,
        Self::Transform,
        Self::Sampler2D,
        Self::SamplerCube,
    ];

    /// GLSL type keyword for this port type
    pub fn glsl_type(self) -> &'static str {
        match self {
            Self::Scalar => "float",
            Self::Vector3 => "vec3",
            Self::Boolean => "bool",
            Self::Transform => "mat4",
            Self::Sampler2D => "sampler2D",
            Self::SamplerCube => "samplerCube",
        }
    }

    /// Parse a GLSL type keyword
    pub fn from_glsl_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.glsl_type() == name)
    }

    /// Whether this is one of the sampler types
    pub fn is_sampler(self) -> bool {
        matches!(self, Self::Sampler2D | Self::SamplerCube)
    }

    /// Zero-valued literal used when a node has nothing better to write.
    ///
    /// Samplers have no literal and yield an empty string.
    pub fn zero_literal(self) -> &'static str {
        match self {
            Self::Scalar => "0.0",
            Self::Vector3 => "vec3(0.0)",
            Self::Boolean => "false",
            Self::Transform => "mat4(1.0)",
            Self::Sampler2D | Self::SamplerCube => "",
        }
    }

    /// Check if an output of this type may feed an input of `input` type.
    ///
    /// The only cross-type edge is SCALAR into VECTOR3; whether a given
    /// input port actually takes it is decided by [`Port::accepts`].
    pub fn can_connect_to(self, input: PortType) -> bool {
        self == input || matches!((self, input), (Self::Scalar, Self::Vector3))
    }
}

/// Compatibility relation of the port type lattice.
pub fn is_compatible(out_type: PortType, in_type: PortType) -> bool {
    out_type.can_connect_to(in_type)
}

/// Expression pasted in place of a disconnected input, restricted to stages
/// where the referenced built-ins exist.
#[derive(Debug, Clone, PartialEq)]
pub struct PortHint {
    /// GLSL expression, typed like the port it belongs to
    pub expr: String,
    /// Stages where the expression is valid
    pub stages: &'static [Stage],
}

impl PortHint {
    /// Check whether the hint may be used in a stage
    pub fn applies_to(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }
}

/// A port on a node
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub port_type: PortType,
    /// Default value (for non-sampler inputs)
    pub default_value: Option<DefaultValue>,
    /// Hint substituted when disconnected (for inputs)
    pub hint: Option<PortHint>,
    /// Whether a SCALAR output may be broadcast into this VECTOR3 input
    pub accepts_scalar: bool,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            port_type,
            default_value: None,
            hint: None,
            accepts_scalar: false,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            port_type,
            default_value: None,
            hint: None,
            accepts_scalar: false,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: DefaultValue) -> Self {
        debug_assert!(!self.port_type.is_sampler(), "sampler ports carry no default");
        self.default_value = Some(value);
        self
    }

    /// Set the hint used when the port is disconnected
    pub fn with_hint(mut self, expr: impl Into<String>, stages: &'static [Stage]) -> Self {
        self.hint = Some(PortHint {
            expr: expr.into(),
            stages,
        });
        self
    }

    /// Allow SCALAR outputs to be broadcast into this VECTOR3 input
    pub fn broadcast(mut self) -> Self {
        self.accepts_scalar = self.port_type == PortType::Vector3;
        self
    }

    /// Check whether an output of `from` type may connect to this input
    pub fn accepts(&self, from: PortType) -> bool {
        if self.direction != PortDirection::Input {
            return false;
        }
        from == self.port_type || (self.accepts_scalar && from == PortType::Scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice() {
        assert!(is_compatible(PortType::Scalar, PortType::Vector3));
        assert!(!is_compatible(PortType::Vector3, PortType::Scalar));
        assert!(!is_compatible(PortType::Boolean, PortType::Scalar));
        assert!(is_compatible(PortType::Sampler2D, PortType::Sampler2D));
        assert!(!is_compatible(PortType::Sampler2D, PortType::SamplerCube));
        for t in PortType::ALL {
            assert!(is_compatible(t, t));
        }
    }

    #[test]
    fn test_broadcast_is_opt_in() {
        let plain = Port::input("b", PortType::Vector3);
        assert!(!plain.accepts(PortType::Scalar));
        assert!(plain.accepts(PortType::Vector3));

        let wide = Port::input("b", PortType::Vector3).broadcast();
        assert!(wide.accepts(PortType::Scalar));

        // only vector ports can widen
        let scalar = Port::input("s", PortType::Scalar).broadcast();
        assert!(!scalar.accepts_scalar);
    }

    #[test]
    fn test_glsl_type_names() {
        for t in PortType::ALL {
            assert_eq!(PortType::from_glsl_type(t.glsl_type()), Some(t));
        }
        assert_eq!(PortType::from_glsl_type("vec4"), None);
    }
}
