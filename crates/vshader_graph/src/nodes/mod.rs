// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node kinds.

use crate::port::{Port, PortType};
use crate::value::DefaultValue;

/// Declare a selector enum stored as [`crate::params::ParamValue::Enum`].
///
/// Each variant is paired with the name written to saved files.
macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::params::ParamEnum for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const NAMES: &'static [&'static str] = &[$($label),+];
        }
    };
}

pub mod builtins;
pub mod constant;
pub mod expression;
pub mod formula;
pub mod function;
pub mod input;
pub mod interp;
pub mod logic;
pub mod operator;
pub mod output;
pub mod texture;
pub mod uniform;

/// Scalar input with a default
pub(crate) fn scalar_in(name: &str, default: f32) -> Port {
    Port::input(name, PortType::Scalar).with_default(DefaultValue::Scalar(default))
}

/// Vector input with a default; scalars are broadcast into it
pub(crate) fn vector_in(name: &str, default: [f32; 3]) -> Port {
    Port::input(name, PortType::Vector3)
        .with_default(DefaultValue::Vector3(default))
        .broadcast()
}

/// Boolean input with a default
pub(crate) fn bool_in(name: &str, default: bool) -> Port {
    Port::input(name, PortType::Boolean).with_default(DefaultValue::Boolean(default))
}

/// Transform input defaulting to identity
pub(crate) fn transform_in(name: &str) -> Port {
    Port::input(name, PortType::Transform)
        .with_default(DefaultValue::Transform(Default::default()))
}

/// `out = expr;` line
pub(crate) fn assign(out: &str, expr: impl std::fmt::Display) -> String {
    format!("{out} = {expr};\n")
}
