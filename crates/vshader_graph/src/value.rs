// SPDX-License-Identifier: MIT OR Apache-2.0
//! Default values for disconnected inputs and their GLSL literal encoding.

use crate::port::PortType;
use serde::{Deserialize, Serialize};

/// Stand-in read for a sampler input that has nothing connected.
pub const SAMPLER_STANDIN: &str = "vec4(0.0)";

/// Affine 3D transform: a 3x3 basis stored by rows plus a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Basis rows
    pub basis: [[f32; 3]; 3],
    /// Translation
    pub origin: [f32; 3],
}

impl Transform {
    /// The identity transform
    pub const IDENTITY: Self = Self {
        basis: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        origin: [0.0, 0.0, 0.0],
    };

    /// Flatten to basis rows followed by the origin
    pub fn to_array(&self) -> [f32; 12] {
        let mut out = [0.0; 12];
        for (row, values) in self.basis.iter().enumerate() {
            out[row * 3..row * 3 + 3].copy_from_slice(values);
        }
        out[9..].copy_from_slice(&self.origin);
        out
    }

    /// Inverse of [`Transform::to_array`]
    pub fn from_array(values: [f32; 12]) -> Self {
        let mut t = Self::IDENTITY;
        for row in 0..3 {
            t.basis[row].copy_from_slice(&values[row * 3..row * 3 + 3]);
        }
        t.origin.copy_from_slice(&values[9..]);
        t
    }

    /// Basis column `index` (a row of the transposed basis)
    pub fn column(&self, index: usize) -> [f32; 3] {
        [
            self.basis[0][index],
            self.basis[1][index],
            self.basis[2][index],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Typed default of an input port
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Scalar
    Scalar(f32),
    /// 3D vector
    Vector3([f32; 3]),
    /// Boolean
    Boolean(bool),
    /// 4x4 transform
    Transform(Transform),
}

impl DefaultValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Scalar(_) => PortType::Scalar,
            Self::Vector3(_) => PortType::Vector3,
            Self::Boolean(_) => PortType::Boolean,
            Self::Transform(_) => PortType::Transform,
        }
    }

    /// Encode as a GLSL literal expression
    pub fn encode(&self) -> Result<String, EncodeError> {
        match self {
            Self::Scalar(v) => encode_scalar(*v),
            Self::Vector3(v) => encode_vector3(*v),
            Self::Boolean(b) => Ok(encode_bool(*b).to_string()),
            Self::Transform(t) => encode_transform(t),
        }
    }
}

/// A value that has no GLSL literal form
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot encode non-finite value {value} as a GLSL literal")]
pub struct EncodeError {
    /// The offending component
    pub value: f32,
}

fn finite(value: f32) -> Result<f32, EncodeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EncodeError { value })
    }
}

/// `3.5` -> `3.500000`
pub fn encode_scalar(value: f32) -> Result<String, EncodeError> {
    Ok(format!("{:.6}", finite(value)?))
}

/// `[1, 2, 3]` -> `vec3(1.000000, 2.000000, 3.000000)`
pub fn encode_vector3(value: [f32; 3]) -> Result<String, EncodeError> {
    Ok(format!("vec3({})", components(&value)?))
}

/// RGBA color as the pair of expressions written to a color node's
/// `rgb` and `alpha` outputs.
pub fn encode_color(rgba: [f32; 4]) -> Result<(String, String), EncodeError> {
    let rgb = encode_vector3([rgba[0], rgba[1], rgba[2]])?;
    let alpha = encode_scalar(rgba[3])?;
    Ok((rgb, alpha))
}

/// `true` / `false`
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Column-major `mat4(...)`: the basis is transposed so each `vec4` is a
/// basis column, and the origin fills the fourth column.
pub fn encode_transform(t: &Transform) -> Result<String, EncodeError> {
    let mut columns = Vec::with_capacity(4);
    for index in 0..3 {
        columns.push(format!("vec4({}, 0.0)", components(&t.column(index))?));
    }
    columns.push(format!("vec4({}, 1.0)", components(&t.origin)?));
    Ok(format!("mat4({})", columns.join(", ")))
}

fn components(values: &[f32]) -> Result<String, EncodeError> {
    let parts = values
        .iter()
        .map(|v| encode_scalar(*v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_literal() {
        assert_eq!(encode_scalar(3.5).unwrap(), "3.500000");
        assert_eq!(encode_scalar(-0.25).unwrap(), "-0.250000");
        assert_eq!(encode_scalar(0.0).unwrap(), "0.000000");
    }

    #[test]
    fn test_scalar_parses_back() {
        for s in [0.1_f32, 1.0 / 3.0, -123.456_78, 0.000_000_4, 4096.5, 1.0e6] {
            let text = encode_scalar(s).unwrap();
            let parsed: f64 = text.parse().unwrap();
            assert!((parsed - f64::from(s)).abs() <= 1e-6, "{s} -> {text}");
        }
    }

    #[test]
    fn test_non_finite_is_rejected() {
        assert!(encode_scalar(f32::NAN).is_err());
        assert!(encode_vector3([0.0, f32::INFINITY, 0.0]).is_err());
        let mut t = Transform::IDENTITY;
        t.origin[2] = f32::NEG_INFINITY;
        assert!(encode_transform(&t).is_err());
    }

    #[test]
    fn test_vector_and_color() {
        assert_eq!(
            encode_vector3([1.0, 2.0, 3.0]).unwrap(),
            "vec3(1.000000, 2.000000, 3.000000)"
        );
        let (rgb, a) = encode_color([1.0, 0.5, 0.0, 0.25]).unwrap();
        assert_eq!(rgb, "vec3(1.000000, 0.500000, 0.000000)");
        assert_eq!(a, "0.250000");
    }

    #[test]
    fn test_transform_columns() {
        let mut t = Transform::IDENTITY;
        t.basis[0][1] = 2.0; // row 0, column 1
        t.origin = [4.0, 5.0, 6.0];
        let text = encode_transform(&t).unwrap();
        assert_eq!(
            text,
            "mat4(vec4(1.000000, 0.000000, 0.000000, 0.0), \
             vec4(2.000000, 1.000000, 0.000000, 0.0), \
             vec4(0.000000, 0.000000, 1.000000, 0.0), \
             vec4(4.000000, 5.000000, 6.000000, 1.0))"
        );
    }

    #[test]
    fn test_transform_array_layout() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let t = Transform::from_array(values);
        assert_eq!(t.basis[1], [4.0, 5.0, 6.0]);
        assert_eq!(t.origin, [10.0, 11.0, 12.0]);
        assert_eq!(t.to_array(), values);
    }
}
