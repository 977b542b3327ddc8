// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binary operator nodes.

use super::{assign, scalar_in, transform_in, vector_in};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamEnum, ParamError, ParamKind, ParamSpec, ParamValue};
use crate::port::{Port, PortType};

const OPERATOR: &str = "operator";

param_enum! {
    /// Operator of a [`ScalarOp`]
    pub enum ScalarOperator {
        /// `a + b`
        Add => "Add",
        /// `a - b`
        Sub => "Sub",
        /// `a * b`
        Mul => "Mul",
        /// `a / b`
        Div => "Div",
        /// `mod(a, b)`
        Mod => "Mod",
        /// `pow(a, b)`
        Pow => "Pow",
        /// `max(a, b)`
        Max => "Max",
        /// `min(a, b)`
        Min => "Min",
        /// `atan(a, b)`
        Atan2 => "Atan2",
        /// `step(a, b)`
        Step => "Step",
    }
}

param_enum! {
    /// Operator of a [`VectorOp`]
    pub enum VectorOperator {
        /// `a + b`
        Add => "Add",
        /// `a - b`
        Sub => "Sub",
        /// `a * b`
        Mul => "Mul",
        /// `a / b`
        Div => "Div",
        /// `mod(a, b)`
        Mod => "Mod",
        /// `pow(a, b)`
        Pow => "Pow",
        /// `max(a, b)`
        Max => "Max",
        /// `min(a, b)`
        Min => "Min",
        /// `cross(a, b)`
        Cross => "Cross",
        /// `atan(a, b)`
        Atan2 => "Atan2",
        /// `reflect(a, b)`
        Reflect => "Reflect",
        /// `step(a, b)`
        Step => "Step",
    }
}

param_enum! {
    /// Blend mode of a [`ColorOp`]
    pub enum ColorOperator {
        /// Screen
        Screen => "Screen",
        /// Absolute difference
        Difference => "Difference",
        /// Component minimum
        Darken => "Darken",
        /// Component maximum
        Lighten => "Lighten",
        /// Overlay
        Overlay => "Overlay",
        /// Color dodge
        Dodge => "Dodge",
        /// Color burn
        Burn => "Burn",
        /// Soft light
        SoftLight => "SoftLight",
        /// Hard light
        HardLight => "HardLight",
    }
}

param_enum! {
    /// Operand order of a [`TransformMult`]
    pub enum TransformMultOperator {
        /// `a * b`
        AxB => "AxB",
        /// `b * a`
        BxA => "BxA",
        /// Component-wise `a * b`
        AxBComp => "AxBComp",
        /// Component-wise `b * a`
        BxAComp => "BxAComp",
    }
}

param_enum! {
    /// Operand order and w component of a [`TransformVecMult`]
    pub enum TransformVecOperator {
        /// `a * vec4(b, 1.0)`
        AxB => "AxB",
        /// `vec4(b, 1.0) * a`
        BxA => "BxA",
        /// `a * vec4(b, 0.0)`
        AxB3x3 => "AxB3x3",
        /// `vec4(b, 0.0) * a`
        BxA3x3 => "BxA3x3",
    }
}

fn binary(out: &str, a: &str, b: &str, symbol: &str) -> String {
    assign(out, format_args!("{a} {symbol} {b}"))
}

fn call(out: &str, func: &str, a: &str, b: &str) -> String {
    assign(out, format_args!("{func}({a}, {b})"))
}

fn set_operator<E: ParamEnum>(
    kind: &'static str,
    name: &str,
    value: &ParamValue,
    slot: &mut E,
) -> Result<(), ParamError> {
    if name != OPERATOR {
        return Err(params::unknown(kind, name));
    }
    *slot = E::from_param(name, value)?;
    Ok(())
}

/// Scalar binary operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarOp {
    /// Selected operator
    pub op: ScalarOperator,
}

impl ScalarOp {
    /// Create a scalar operator node
    pub fn new(op: ScalarOperator) -> Self {
        Self { op }
    }
}

impl Default for ScalarOp {
    fn default() -> Self {
        Self::new(ScalarOperator::Add)
    }
}

impl ShaderNode for ScalarOp {
    fn kind(&self) -> &'static str {
        "scalar_op"
    }

    fn caption(&self) -> &str {
        "ScalarOp"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Operator
    }

    fn inputs(&self) -> Vec<Port> {
        vec![scalar_in("a", 0.0), scalar_in("b", 0.0)]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("op", PortType::Scalar)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (out, a, b) = (&outputs[0], &inputs[0], &inputs[1]);
        Ok(match self.op {
            ScalarOperator::Add => binary(out, a, b, "+"),
            ScalarOperator::Sub => binary(out, a, b, "-"),
            ScalarOperator::Mul => binary(out, a, b, "*"),
            ScalarOperator::Div => binary(out, a, b, "/"),
            ScalarOperator::Mod => call(out, "mod", a, b),
            ScalarOperator::Pow => call(out, "pow", a, b),
            ScalarOperator::Max => call(out, "max", a, b),
            ScalarOperator::Min => call(out, "min", a, b),
            ScalarOperator::Atan2 => call(out, "atan", a, b),
            ScalarOperator::Step => call(out, "step", a, b),
        })
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(OPERATOR, ParamKind::Enum(ScalarOperator::NAMES))];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == OPERATOR).then(|| self.op.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        set_operator(self.kind(), name, value, &mut self.op)
    }
}

/// Vector binary operator. Both operands take scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorOp {
    /// Selected operator
    pub op: VectorOperator,
}

impl VectorOp {
    /// Create a vector operator node
    pub fn new(op: VectorOperator) -> Self {
        Self { op }
    }
}

impl Default for VectorOp {
    fn default() -> Self {
        Self::new(VectorOperator::Add)
    }
}

impl ShaderNode for VectorOp {
    fn kind(&self) -> &'static str {
        "vector_op"
    }

    fn caption(&self) -> &str {
        "VectorOp"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Operator
    }

    fn inputs(&self) -> Vec<Port> {
        vec![vector_in("a", [0.0; 3]), vector_in("b", [0.0; 3])]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("op", PortType::Vector3)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (out, a, b) = (&outputs[0], &inputs[0], &inputs[1]);
        Ok(match self.op {
            VectorOperator::Add => binary(out, a, b, "+"),
            VectorOperator::Sub => binary(out, a, b, "-"),
            VectorOperator::Mul => binary(out, a, b, "*"),
            VectorOperator::Div => binary(out, a, b, "/"),
            VectorOperator::Mod => call(out, "mod", a, b),
            VectorOperator::Pow => call(out, "pow", a, b),
            VectorOperator::Max => call(out, "max", a, b),
            VectorOperator::Min => call(out, "min", a, b),
            VectorOperator::Cross => call(out, "cross", a, b),
            VectorOperator::Atan2 => call(out, "atan", a, b),
            VectorOperator::Reflect => call(out, "reflect", a, b),
            VectorOperator::Step => call(out, "step", a, b),
        })
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(OPERATOR, ParamKind::Enum(VectorOperator::NAMES))];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == OPERATOR).then(|| self.op.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        set_operator(self.kind(), name, value, &mut self.op)
    }
}

/// Photoshop-style color blend of two RGB vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorOp {
    /// Selected blend mode
    pub op: ColorOperator,
}

impl ColorOp {
    /// Create a color blend node
    pub fn new(op: ColorOperator) -> Self {
        Self { op }
    }

    /// Per-channel blend where the formula depends on `base < 0.5`
    fn per_channel(out: &str, a: &str, b: &str, low: &str, high: &str) -> String {
        let mut code = String::new();
        for axis in ["x", "y", "z"] {
            code.push_str("{\n");
            code.push_str(&format!("\tfloat base = {a}.{axis};\n"));
            code.push_str(&format!("\tfloat blend = {b}.{axis};\n"));
            code.push_str("\tif (base < 0.5) {\n");
            code.push_str(&format!("\t\t{out}.{axis} = {low};\n"));
            code.push_str("\t} else {\n");
            code.push_str(&format!("\t\t{out}.{axis} = {high};\n"));
            code.push_str("\t}\n");
            code.push_str("}\n");
        }
        code
    }
}

impl Default for ColorOp {
    fn default() -> Self {
        Self::new(ColorOperator::Screen)
    }
}

impl ShaderNode for ColorOp {
    fn kind(&self) -> &'static str {
        "color_op"
    }

    fn caption(&self) -> &str {
        "ColorOp"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Operator
    }

    fn inputs(&self) -> Vec<Port> {
        vec![vector_in("a", [0.0; 3]), vector_in("b", [0.0; 3])]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("op", PortType::Vector3)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (out, a, b) = (outputs[0].as_str(), inputs[0].as_str(), inputs[1].as_str());
        Ok(match self.op {
            ColorOperator::Screen => assign(
                out,
                format_args!("vec3(1.0) - (vec3(1.0) - {a}) * (vec3(1.0) - {b})"),
            ),
            ColorOperator::Difference => assign(out, format_args!("abs({a} - {b})")),
            ColorOperator::Darken => call(out, "min", a, b),
            ColorOperator::Lighten => call(out, "max", a, b),
            ColorOperator::Overlay => Self::per_channel(
                out,
                a,
                b,
                "2.0 * base * blend",
                "1.0 - 2.0 * (1.0 - blend) * (1.0 - base)",
            ),
            ColorOperator::Dodge => assign(out, format_args!("({a}) / (vec3(1.0) - {b})")),
            ColorOperator::Burn => {
                assign(out, format_args!("vec3(1.0) - (vec3(1.0) - {a}) / ({b})"))
            }
            ColorOperator::SoftLight => Self::per_channel(
                out,
                a,
                b,
                "base * (blend + 0.5)",
                "1.0 - (1.0 - base) * (1.0 - (blend - 0.5))",
            ),
            ColorOperator::HardLight => Self::per_channel(
                out,
                a,
                b,
                "base * (2.0 * blend)",
                "1.0 - (1.0 - base) * (1.0 - 2.0 * (blend - 0.5))",
            ),
        })
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(OPERATOR, ParamKind::Enum(ColorOperator::NAMES))];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == OPERATOR).then(|| self.op.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        set_operator(self.kind(), name, value, &mut self.op)
    }
}

/// Product of two transforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMult {
    /// Operand order
    pub op: TransformMultOperator,
}

impl TransformMult {
    /// Create a transform product node
    pub fn new(op: TransformMultOperator) -> Self {
        Self { op }
    }
}

impl Default for TransformMult {
    fn default() -> Self {
        Self::new(TransformMultOperator::AxB)
    }
}

impl ShaderNode for TransformMult {
    fn kind(&self) -> &'static str {
        "transform_mult"
    }

    fn caption(&self) -> &str {
        "TransformMult"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Operator
    }

    fn inputs(&self) -> Vec<Port> {
        vec![transform_in("a"), transform_in("b")]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("mult", PortType::Transform)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (out, a, b) = (&outputs[0], &inputs[0], &inputs[1]);
        Ok(match self.op {
            TransformMultOperator::AxB => binary(out, a, b, "*"),
            TransformMultOperator::BxA => binary(out, b, a, "*"),
            TransformMultOperator::AxBComp => call(out, "matrixCompMult", a, b),
            TransformMultOperator::BxAComp => call(out, "matrixCompMult", b, a),
        })
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] =
            &[ParamSpec::new(OPERATOR, ParamKind::Enum(TransformMultOperator::NAMES))];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == OPERATOR).then(|| self.op.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        set_operator(self.kind(), name, value, &mut self.op)
    }
}

/// Transform applied to a vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformVecMult {
    /// Operand order and w component
    pub op: TransformVecOperator,
}

impl TransformVecMult {
    /// Create a transform-vector product node
    pub fn new(op: TransformVecOperator) -> Self {
        Self { op }
    }
}

impl Default for TransformVecMult {
    fn default() -> Self {
        Self::new(TransformVecOperator::AxB)
    }
}

impl ShaderNode for TransformVecMult {
    fn kind(&self) -> &'static str {
        "transform_vec_mult"
    }

    fn caption(&self) -> &str {
        "TransformVectorMult"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Operator
    }

    fn inputs(&self) -> Vec<Port> {
        vec![transform_in("a"), vector_in("b", [0.0; 3])]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", PortType::Vector3)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (out, a, b) = (&outputs[0], &inputs[0], &inputs[1]);
        let expr = match self.op {
            TransformVecOperator::AxB => format!("({a} * vec4({b}, 1.0)).xyz"),
            TransformVecOperator::BxA => format!("(vec4({b}, 1.0) * {a}).xyz"),
            TransformVecOperator::AxB3x3 => format!("({a} * vec4({b}, 0.0)).xyz"),
            TransformVecOperator::BxA3x3 => format!("(vec4({b}, 0.0) * {a}).xyz"),
        };
        Ok(assign(out, expr))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] =
            &[ParamSpec::new(OPERATOR, ParamKind::Enum(TransformVecOperator::NAMES))];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == OPERATOR).then(|| self.op.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        set_operator(self.kind(), name, value, &mut self.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{ShaderMode, Stage};

    fn body(node: &dyn ShaderNode, a: &str, b: &str) -> String {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 4);
        node.generate_body(&ctx, &[a.to_string(), b.to_string()], &["n4_0".to_string()])
            .unwrap()
    }

    #[test]
    fn test_scalar_ops() {
        assert_eq!(body(&ScalarOp::new(ScalarOperator::Sub), "x", "y"), "n4_0 = x - y;\n");
        assert_eq!(body(&ScalarOp::new(ScalarOperator::Atan2), "x", "y"), "n4_0 = atan(x, y);\n");
    }

    #[test]
    fn test_vector_op_takes_scalars() {
        let node = VectorOp::new(VectorOperator::Mul);
        assert!(node.inputs().iter().all(|p| p.accepts(PortType::Scalar)));
        assert_eq!(body(&node, "vec3(n2_0)", "n3_0"), "n4_0 = vec3(n2_0) * n3_0;\n");
        assert_eq!(
            body(&VectorOp::new(VectorOperator::Cross), "p", "q"),
            "n4_0 = cross(p, q);\n"
        );
    }

    #[test]
    fn test_color_overlay_writes_each_channel() {
        let code = body(&ColorOp::new(ColorOperator::Overlay), "p", "q");
        assert_eq!(code.matches("if (base < 0.5)").count(), 3);
        assert!(code.contains("\t\tn4_0.z = 2.0 * base * blend;\n"));
    }

    #[test]
    fn test_transform_operand_order() {
        assert_eq!(
            body(&TransformMult::new(TransformMultOperator::BxA), "m", "k"),
            "n4_0 = k * m;\n"
        );
        assert_eq!(
            body(&TransformVecMult::new(TransformVecOperator::AxB3x3), "m", "v"),
            "n4_0 = (m * vec4(v, 0.0)).xyz;\n"
        );
    }

    #[test]
    fn test_operator_param() {
        let mut node = ScalarOp::default();
        crate::node::apply_param(&mut node, "operator", &ParamValue::Enum(2)).unwrap();
        assert_eq!(node.op, ScalarOperator::Mul);
        assert!(matches!(
            crate::node::apply_param(&mut node, "operator", &ParamValue::Enum(10)),
            Err(ParamError::OutOfRange { index: 10, .. })
        ));
    }
}
