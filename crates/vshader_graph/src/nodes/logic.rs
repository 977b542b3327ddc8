// SPDX-License-Identifier: MIT OR Apache-2.0
//! Comparisons, branching and selection.

use super::{assign, bool_in, scalar_in, transform_in, vector_in};
use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamEnum, ParamError, ParamKind, ParamSpec, ParamValue};
use crate::port::{Port, PortType};

/// Default tolerance of approximate equality
pub const CMP_EPSILON: f32 = 0.00001;

const FUNCTION: &str = "function";

// ============================================================================
// If
// ============================================================================

/// Three-way branch on a scalar comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IfNode;

impl ShaderNode for IfNode {
    fn kind(&self) -> &'static str {
        "if"
    }

    fn caption(&self) -> &str {
        "If"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Logic
    }

    fn inputs(&self) -> Vec<Port> {
        vec![
            scalar_in("a", 0.0),
            scalar_in("b", 0.0),
            scalar_in("tolerance", CMP_EPSILON),
            vector_in("a == b", [0.0; 3]),
            vector_in("a > b", [0.0; 3]),
            vector_in("a < b", [0.0; 3]),
        ]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("result", PortType::Vector3)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (a, b, tolerance) = (&inputs[0], &inputs[1], &inputs[2]);
        let out = &outputs[0];
        Ok(format!(
            "if (abs({a} - {b}) < {tolerance}) {{\n\
             \t{out} = {};\n\
             }} else if ({a} < {b}) {{\n\
             \t{out} = {};\n\
             }} else {{\n\
             \t{out} = {};\n\
             }}\n",
            inputs[3], inputs[5], inputs[4]
        ))
    }
}

// ============================================================================
// Switch
// ============================================================================

/// Select one of two values on a boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchNode {
    port_type: PortType,
}

impl SwitchNode {
    /// Switch between vectors
    pub fn vector() -> Self {
        Self {
            port_type: PortType::Vector3,
        }
    }

    /// Switch between scalars
    pub fn scalar() -> Self {
        Self {
            port_type: PortType::Scalar,
        }
    }
}

impl ShaderNode for SwitchNode {
    fn kind(&self) -> &'static str {
        match self.port_type {
            PortType::Scalar => "scalar_switch",
            _ => "vector_switch",
        }
    }

    fn caption(&self) -> &str {
        match self.port_type {
            PortType::Scalar => "ScalarSwitch",
            _ => "VectorSwitch",
        }
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Logic
    }

    fn inputs(&self) -> Vec<Port> {
        let (on_true, on_false) = match self.port_type {
            PortType::Scalar => (scalar_in("true", 1.0), scalar_in("false", 0.0)),
            _ => (vector_in("true", [1.0; 3]), vector_in("false", [0.0; 3])),
        };
        vec![bool_in("value", false), on_true, on_false]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("result", self.port_type)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let out = &outputs[0];
        Ok(format!(
            "if ({}) {{\n\t{out} = {};\n}} else {{\n\t{out} = {};\n}}\n",
            inputs[0], inputs[1], inputs[2]
        ))
    }
}

// ============================================================================
// Is
// ============================================================================

param_enum! {
    /// Special float classes
    pub enum IsFunction {
        /// Infinity
        Inf => "Inf",
        /// Not a number
        NaN => "NaN",
    }
}

/// Test a scalar for infinity or NaN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsNode {
    /// Class tested for
    pub func: IsFunction,
}

impl Default for IsNode {
    fn default() -> Self {
        Self {
            func: IsFunction::Inf,
        }
    }
}

impl ShaderNode for IsNode {
    fn kind(&self) -> &'static str {
        "is"
    }

    fn caption(&self) -> &str {
        "Is"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Logic
    }

    fn inputs(&self) -> Vec<Port> {
        vec![scalar_in("", 0.0)]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", PortType::Boolean)]
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let func = match self.func {
            IsFunction::Inf => "isinf",
            IsFunction::NaN => "isnan",
        };
        Ok(assign(&outputs[0], format_args!("{func}({})", inputs[0])))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(IsFunction::NAMES))];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == FUNCTION).then(|| self.func.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != FUNCTION {
            return Err(params::unknown(self.kind(), name));
        }
        self.func = IsFunction::from_param(name, value)?;
        Ok(())
    }
}

// ============================================================================
// Compare
// ============================================================================

param_enum! {
    /// Type of the compared operands
    pub enum ComparisonType {
        /// Scalars
        Scalar => "Scalar",
        /// Vectors
        Vector => "Vector",
        /// Booleans
        Boolean => "Boolean",
        /// Transforms
        Transform => "Transform",
    }
}

param_enum! {
    /// Comparison operator
    pub enum CompareFunction {
        /// `a == b`
        Equal => "a == b",
        /// `a != b`
        NotEqual => "a != b",
        /// `a > b`
        GreaterThan => "a > b",
        /// `a >= b`
        GreaterThanEqual => "a >= b",
        /// `a < b`
        LessThan => "a < b",
        /// `a <= b`
        LessThanEqual => "a <= b",
    }
}

param_enum! {
    /// Reduction of a component-wise vector comparison
    pub enum CompareCondition {
        /// Every component
        All => "All",
        /// At least one component
        Any => "Any",
    }
}

impl CompareFunction {
    fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
        }
    }

    fn vector_func(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanEqual => "greaterThanEqual",
            Self::LessThan => "lessThan",
            Self::LessThanEqual => "lessThanEqual",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }
}

/// Compare two values of a selectable type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareNode {
    /// Operand type
    pub ctype: ComparisonType,
    /// Operator
    pub func: CompareFunction,
    /// Vector reduction
    pub condition: CompareCondition,
}

impl Default for CompareNode {
    fn default() -> Self {
        Self {
            ctype: ComparisonType::Scalar,
            func: CompareFunction::Equal,
            condition: CompareCondition::All,
        }
    }
}

impl CompareNode {
    fn has_tolerance(&self) -> bool {
        self.ctype == ComparisonType::Scalar && self.func.is_equality()
    }

    fn invalid_function(&self) -> bool {
        matches!(self.ctype, ComparisonType::Boolean | ComparisonType::Transform)
            && !self.func.is_equality()
    }
}

impl ShaderNode for CompareNode {
    fn kind(&self) -> &'static str {
        "compare"
    }

    fn caption(&self) -> &str {
        "Compare"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Logic
    }

    fn inputs(&self) -> Vec<Port> {
        let operand = |name: &str| match self.ctype {
            ComparisonType::Scalar => scalar_in(name, 0.0),
            ComparisonType::Vector => vector_in(name, [0.0; 3]),
            ComparisonType::Boolean => bool_in(name, false),
            ComparisonType::Transform => transform_in(name),
        };
        let mut ports = vec![operand("a"), operand("b")];
        if self.has_tolerance() {
            ports.push(scalar_in("tolerance", CMP_EPSILON));
        }
        ports
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("result", PortType::Boolean)]
    }

    fn warning(&self, _mode: ShaderMode, _stage: Stage) -> Option<String> {
        self.invalid_function()
            .then(|| "Invalid comparison function for that type.".to_string())
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let out = &outputs[0];
        if self.invalid_function() {
            return Ok(assign(out, "false"));
        }
        let (a, b) = (&inputs[0], &inputs[1]);
        let code = match self.ctype {
            ComparisonType::Vector => {
                let reduce = match self.condition {
                    CompareCondition::All => "all",
                    CompareCondition::Any => "any",
                };
                format!(
                    "{{\n\tbvec3 _bv = {}({a}, {b});\n\t{out} = {reduce}(_bv);\n}}\n",
                    self.func.vector_func()
                )
            }
            ComparisonType::Scalar if self.has_tolerance() => {
                let near = format!("abs({a} - {b}) < {}", inputs[2]);
                match self.func {
                    CompareFunction::Equal => assign(out, format_args!("({near})")),
                    _ => assign(out, format_args!("!({near})")),
                }
            }
            _ => assign(out, format_args!("{a} {} {b}", self.func.symbol())),
        };
        Ok(code)
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::new("type", ParamKind::Enum(ComparisonType::NAMES)),
            ParamSpec::new(FUNCTION, ParamKind::Enum(CompareFunction::NAMES)),
            ParamSpec::new("condition", ParamKind::Enum(CompareCondition::NAMES)),
        ];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "type" => Some(self.ctype.to_param()),
            FUNCTION => Some(self.func.to_param()),
            "condition" => Some(self.condition.to_param()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            "type" => self.ctype = ComparisonType::from_param(name, value)?,
            FUNCTION => self.func = CompareFunction::from_param(name, value)?,
            "condition" => self.condition = CompareCondition::from_param(name, value)?,
            _ => return Err(params::unknown(self.kind(), name)),
        }
        Ok(())
    }
}

// ============================================================================
// Fresnel
// ============================================================================

/// Fresnel falloff between a normal and a view direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FresnelNode;

impl ShaderNode for FresnelNode {
    fn kind(&self) -> &'static str {
        "fresnel"
    }

    fn caption(&self) -> &str {
        "Fresnel"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Logic
    }

    fn inputs(&self) -> Vec<Port> {
        vec![
            Port::input("normal", PortType::Vector3),
            Port::input("view", PortType::Vector3),
            bool_in("invert", false),
            scalar_in("power", 1.0),
        ]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("result", PortType::Scalar)]
    }

    fn is_permitted(&self, mode: ShaderMode, stage: Stage) -> bool {
        mode == ShaderMode::Spatial && matches!(stage, Stage::Fragment | Stage::Light)
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let or = |expr: &str, fallback: &'static str| -> String {
            if expr.is_empty() {
                fallback.to_string()
            } else {
                expr.to_string()
            }
        };
        let normal = or(&inputs[0], "NORMAL");
        let view = or(&inputs[1], "VIEW");
        let facing = format!("clamp(dot({normal}, {view}), 0.0, 1.0)");
        let power = &inputs[3];
        Ok(assign(
            &outputs[0],
            format_args!(
                "{} ? pow({facing}, {power}) : pow(1.0 - {facing}, {power})",
                inputs[2]
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DefaultValue;

    fn body(node: &dyn ShaderNode, inputs: &[&str]) -> String {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 5);
        let inputs: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        node.generate_body(&ctx, &inputs, &["n5_0".to_string()]).unwrap()
    }

    #[test]
    fn test_if_branches() {
        let code = body(&IfNode, &["x", "y", "0.1", "eq", "gt", "lt"]);
        assert_eq!(
            code,
            "if (abs(x - y) < 0.1) {\n\tn5_0 = eq;\n} else if (x < y) {\n\tn5_0 = lt;\n} else {\n\tn5_0 = gt;\n}\n"
        );
        assert_eq!(IfNode.input_default(2), Some(DefaultValue::Scalar(CMP_EPSILON)));
    }

    #[test]
    fn test_switch_kinds() {
        let scalar = SwitchNode::scalar();
        assert_eq!(scalar.kind(), "scalar_switch");
        assert_eq!(scalar.input_default(1), Some(DefaultValue::Scalar(1.0)));
        assert_eq!(SwitchNode::vector().outputs()[0].port_type, PortType::Vector3);
        assert_eq!(
            body(&scalar, &["c", "1.0", "0.0"]),
            "if (c) {\n\tn5_0 = 1.0;\n} else {\n\tn5_0 = 0.0;\n}\n"
        );
    }

    #[test]
    fn test_compare_ports_follow_params() {
        let mut node = CompareNode::default();
        assert_eq!(node.inputs().len(), 3);
        crate::node::apply_param(&mut node, "function", &CompareFunction::LessThan.to_param()).unwrap();
        assert_eq!(node.inputs().len(), 2);
        assert_eq!(body(&node, &["x", "y"]), "n5_0 = x < y;\n");

        crate::node::apply_param(&mut node, "type", &ComparisonType::Boolean.to_param()).unwrap();
        assert!(node.warning(ShaderMode::Spatial, Stage::Fragment).is_some());
        assert_eq!(body(&node, &["x", "y"]), "n5_0 = false;\n");
    }

    #[test]
    fn test_compare_vector_and_tolerance() {
        let node = CompareNode {
            ctype: ComparisonType::Vector,
            func: CompareFunction::Equal,
            condition: CompareCondition::Any,
        };
        assert_eq!(
            body(&node, &["a", "b"]),
            "{\n\tbvec3 _bv = equal(a, b);\n\tn5_0 = any(_bv);\n}\n"
        );
        let near = CompareNode {
            func: CompareFunction::NotEqual,
            ..CompareNode::default()
        };
        assert_eq!(body(&near, &["a", "b", "t"]), "n5_0 = !(abs(a - b) < t);\n");
    }

    #[test]
    fn test_fresnel_fallbacks() {
        let code = body(&FresnelNode, &["", "", "false", "1.000000"]);
        assert!(code.contains("dot(NORMAL, VIEW)"));
        assert!(!FresnelNode.is_permitted(ShaderMode::CanvasItem, Stage::Fragment));
        assert!(!FresnelNode.is_permitted(ShaderMode::Spatial, Stage::Vertex));
    }

    #[test]
    fn test_is() {
        let node = IsNode {
            func: IsFunction::NaN,
        };
        assert_eq!(body(&node, &["v"]), "n5_0 = isnan(v);\n");
    }
}
