// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constant nodes, one per value type.

use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamError, ParamKind, ParamSpec, ParamValue};
use crate::port::{Port, PortType};
use crate::value::{encode_bool, encode_color, encode_scalar, encode_transform, encode_vector3, Transform};

const PARAM: &str = "constant";

/// Scalar literal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScalarConstant {
    /// Value written to the output
    pub value: f32,
}

impl ScalarConstant {
    /// Create a scalar constant
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl ShaderNode for ScalarConstant {
    fn kind(&self) -> &'static str {
        "scalar_constant"
    }

    fn caption(&self) -> &str {
        "Scalar"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Constant
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", PortType::Scalar)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(format!("{} = {};\n", outputs[0], encode_scalar(self.value)?))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(PARAM, ParamKind::Float)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == PARAM).then_some(ParamValue::Float(self.value))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != PARAM {
            return Err(params::unknown(self.kind(), name));
        }
        self.value = params::as_float(name, value)?;
        Ok(())
    }
}

/// Boolean literal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BooleanConstant {
    /// Value written to the output
    pub value: bool,
}

impl BooleanConstant {
    /// Create a boolean constant
    pub fn new(value: bool) -> Self {
        Self { value }
    }
}

impl ShaderNode for BooleanConstant {
    fn kind(&self) -> &'static str {
        "boolean_constant"
    }

    fn caption(&self) -> &str {
        "Boolean"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Constant
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", PortType::Boolean)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(format!("{} = {};\n", outputs[0], encode_bool(self.value)))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(PARAM, ParamKind::Bool)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == PARAM).then_some(ParamValue::Bool(self.value))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != PARAM {
            return Err(params::unknown(self.kind(), name));
        }
        self.value = params::as_bool(name, value)?;
        Ok(())
    }
}

/// RGBA literal split into `rgb` and `alpha` outputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorConstant {
    /// RGBA components
    pub value: [f32; 4],
}

impl ColorConstant {
    /// Create a color constant
    pub fn new(value: [f32; 4]) -> Self {
        Self { value }
    }
}

impl Default for ColorConstant {
    fn default() -> Self {
        Self::new([1.0; 4])
    }
}

impl ShaderNode for ColorConstant {
    fn kind(&self) -> &'static str {
        "color_constant"
    }

    fn caption(&self) -> &str {
        "Color"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Constant
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![
            Port::output("", PortType::Vector3),
            Port::output("alpha", PortType::Scalar),
        ]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (rgb, alpha) = encode_color(self.value)?;
        Ok(format!("{} = {rgb};\n{} = {alpha};\n", outputs[0], outputs[1]))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(PARAM, ParamKind::Color)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == PARAM).then_some(ParamValue::Color(self.value))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != PARAM {
            return Err(params::unknown(self.kind(), name));
        }
        self.value = params::as_color(name, value)?;
        Ok(())
    }
}

/// Three-component vector literal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VectorConstant {
    /// Components
    pub value: [f32; 3],
}

impl VectorConstant {
    /// Create a vector constant
    pub fn new(value: [f32; 3]) -> Self {
        Self { value }
    }
}

impl ShaderNode for VectorConstant {
    fn kind(&self) -> &'static str {
        "vector_constant"
    }

    fn caption(&self) -> &str {
        "Vector"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Constant
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", PortType::Vector3)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(format!("{} = {};\n", outputs[0], encode_vector3(self.value)?))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(PARAM, ParamKind::Vector3)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == PARAM).then_some(ParamValue::Vector3(self.value))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != PARAM {
            return Err(params::unknown(self.kind(), name));
        }
        self.value = params::as_vector3(name, value)?;
        Ok(())
    }
}

/// Transform literal, identity by default
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformConstant {
    /// Transform written to the output
    pub value: Transform,
}

impl TransformConstant {
    /// Create a transform constant
    pub fn new(value: Transform) -> Self {
        Self { value }
    }
}

impl ShaderNode for TransformConstant {
    fn kind(&self) -> &'static str {
        "transform_constant"
    }

    fn caption(&self) -> &str {
        "Transform"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Constant
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", PortType::Transform)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(format!("{} = {};\n", outputs[0], encode_transform(&self.value)?))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(PARAM, ParamKind::Transform)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == PARAM).then_some(ParamValue::Transform(self.value))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != PARAM {
            return Err(params::unknown(self.kind(), name));
        }
        self.value = params::as_transform(name, value)?;
        Ok(())
    }
}
