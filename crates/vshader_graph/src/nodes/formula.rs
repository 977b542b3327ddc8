// SPDX-License-Identifier: MIT OR Apache-2.0
//! Nodes described entirely by a static table: fixed ports and one
//! expression template per output.

use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::port::{Port, PortType};
use crate::value::DefaultValue;

/// An input of a formula node. Every formula input has a default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaInput {
    /// Port name
    pub name: &'static str,
    /// Default value; its type is the port type
    pub default: DefaultValue,
}

impl FormulaInput {
    /// Scalar input
    pub const fn scalar(name: &'static str, value: f32) -> Self {
        Self {
            name,
            default: DefaultValue::Scalar(value),
        }
    }

    /// Vector input; scalars are broadcast into it
    pub const fn vector(name: &'static str, value: [f32; 3]) -> Self {
        Self {
            name,
            default: DefaultValue::Vector3(value),
        }
    }

    /// Transform input defaulting to identity
    pub const fn transform(name: &'static str) -> Self {
        Self {
            name,
            default: DefaultValue::Transform(crate::value::Transform::IDENTITY),
        }
    }

    fn port(&self) -> Port {
        Port::input(self.name, self.default.port_type())
            .with_default(self.default)
            .broadcast()
    }
}

/// An output of a formula node and the expression computing it.
///
/// `$0`, `$1`, ... in the template stand for the input expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaOutput {
    /// Port name
    pub name: &'static str,
    /// Port type
    pub port_type: PortType,
    /// Expression template
    pub template: &'static str,
}

impl FormulaOutput {
    /// Create an output
    pub const fn new(name: &'static str, port_type: PortType, template: &'static str) -> Self {
        Self {
            name,
            port_type,
            template,
        }
    }
}

/// Static description of a formula node kind
#[derive(Debug, PartialEq)]
pub struct Formula {
    /// Kind key
    pub kind: &'static str,
    /// Caption
    pub caption: &'static str,
    /// Category
    pub category: NodeCategory,
    /// Inputs
    pub inputs: &'static [FormulaInput],
    /// Outputs
    pub outputs: &'static [FormulaOutput],
    /// Stages where the node may be used; `None` means all
    pub stages: Option<&'static [Stage]>,
}

/// Fill a template with input expressions
pub(crate) fn substitute(template: &str, inputs: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().and_then(|d| d.to_digit(10)) {
            Some(index) => {
                chars.next();
                out.push_str(inputs.get(index as usize).map_or("", String::as_str));
            }
            None => out.push(c),
        }
    }
    out
}

/// A node instance backed by a [`Formula`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaNode {
    formula: &'static Formula,
}

impl FormulaNode {
    /// Instantiate a formula
    pub fn new(formula: &'static Formula) -> Self {
        Self { formula }
    }

    /// The backing table
    pub fn formula(&self) -> &'static Formula {
        self.formula
    }
}

impl ShaderNode for FormulaNode {
    fn kind(&self) -> &'static str {
        self.formula.kind
    }

    fn caption(&self) -> &str {
        self.formula.caption
    }

    fn category(&self) -> NodeCategory {
        self.formula.category
    }

    fn inputs(&self) -> Vec<Port> {
        self.formula.inputs.iter().map(FormulaInput::port).collect()
    }

    fn outputs(&self) -> Vec<Port> {
        self.formula
            .outputs
            .iter()
            .map(|o| Port::output(o.name, o.port_type))
            .collect()
    }

    fn is_permitted(&self, _mode: ShaderMode, stage: Stage) -> bool {
        self.formula.stages.map_or(true, |s| s.contains(&stage))
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let mut code = String::new();
        for (output, var) in self.formula.outputs.iter().zip(outputs) {
            code.push_str(&super::assign(var, substitute(output.template, inputs)));
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let inputs = vec!["a".to_string(), "n3_0".to_string()];
        assert_eq!(substitute("mix($0, $1, 0.5)", &inputs), "mix(a, n3_0, 0.5)");
        assert_eq!(substitute("$1.x", &inputs), "n3_0.x");
        assert_eq!(substitute("$x $9", &inputs), "$x ");
    }

    #[test]
    fn test_formula_node() {
        const SPLIT: Formula = Formula {
            kind: "split",
            caption: "Split",
            category: NodeCategory::Function,
            inputs: &[FormulaInput::vector("v", [0.0; 3])],
            outputs: &[
                FormulaOutput::new("x", PortType::Scalar, "$0.x"),
                FormulaOutput::new("y", PortType::Scalar, "$0.y"),
            ],
            stages: Some(&[Stage::Fragment]),
        };
        let node = FormulaNode::new(&SPLIT);
        assert!(node.inputs()[0].accepts(PortType::Scalar));
        assert!(!node.is_permitted(ShaderMode::Spatial, Stage::Vertex));

        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 2);
        let body = node
            .generate_body(&ctx, &["p".to_string()], &["n2_0".to_string(), "n2_1".to_string()])
            .unwrap();
        assert_eq!(body, "n2_0 = p.x;\nn2_1 = p.y;\n");
    }
}
