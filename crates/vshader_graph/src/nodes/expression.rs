// SPDX-License-Identifier: MIT OR Apache-2.0
//! User-written GLSL: expression nodes in a stage body and global
//! expressions at file scope.

use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamError, ParamKind, ParamSpec, ParamValue};
use crate::port::{Port, PortType};
use crate::value::DefaultValue;
use std::collections::HashSet;

const EXPRESSION: &str = "expression";

/// A declared port of an expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionPort {
    /// Value type; never a sampler
    pub port_type: PortType,
    /// Local variable name inside the user code
    pub name: String,
}

impl ExpressionPort {
    /// Create a port declaration
    pub fn new(port_type: PortType, name: impl Into<String>) -> Self {
        Self {
            port_type,
            name: name.into(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a port list such as `float a, vec3 b`
pub fn parse_ports(text: &str) -> Result<Vec<ExpressionPort>, String> {
    let mut ports = Vec::new();
    for decl in text.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let mut words = decl.split_whitespace();
        let (Some(ty), Some(name), None) = (words.next(), words.next(), words.next()) else {
            return Err(format!("`{decl}` is not a `<type> <name>` pair"));
        };
        let port_type = PortType::from_glsl_type(ty)
            .filter(|t| !t.is_sampler())
            .ok_or_else(|| format!("`{ty}` is not a port type"))?;
        if !is_identifier(name) {
            return Err(format!("`{name}` is not an identifier"));
        }
        ports.push(ExpressionPort::new(port_type, name));
    }
    Ok(ports)
}

/// Inverse of [`parse_ports`]
pub fn format_ports(ports: &[ExpressionPort]) -> String {
    ports
        .iter()
        .map(|p| format!("{} {}", p.port_type.glsl_type(), p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn zero_default(port_type: PortType) -> Option<DefaultValue> {
    match port_type {
        PortType::Scalar => Some(DefaultValue::Scalar(0.0)),
        PortType::Vector3 => Some(DefaultValue::Vector3([0.0; 3])),
        PortType::Boolean => Some(DefaultValue::Boolean(false)),
        PortType::Transform => Some(DefaultValue::Transform(Default::default())),
        PortType::Sampler2D | PortType::SamplerCube => None,
    }
}

/// A GLSL block with declared inputs and outputs.
///
/// Inputs become locals initialised from the materialised expressions,
/// outputs become zero-initialised locals copied out after the block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpressionNode {
    inputs: Vec<ExpressionPort>,
    outputs: Vec<ExpressionPort>,
    expression: String,
}

impl ExpressionNode {
    /// Create an expression node. Port names must be distinct identifiers.
    pub fn new(
        inputs: Vec<ExpressionPort>,
        outputs: Vec<ExpressionPort>,
        expression: impl Into<String>,
    ) -> Result<Self, ParamError> {
        let node = Self {
            inputs,
            outputs,
            expression: expression.into(),
        };
        node.check_names("inputs")?;
        Ok(node)
    }

    /// The user code
    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn check_names(&self, param: &str) -> Result<(), ParamError> {
        let mut seen = HashSet::new();
        for port in self.inputs.iter().chain(&self.outputs) {
            if port.port_type.is_sampler() || !is_identifier(&port.name) {
                return Err(ParamError::Invalid {
                    name: param.to_string(),
                    reason: format!("`{}` cannot be used as a port", port.name),
                });
            }
            if !seen.insert(port.name.as_str()) {
                return Err(ParamError::Invalid {
                    name: param.to_string(),
                    reason: format!("port name `{}` is used twice", port.name),
                });
            }
        }
        Ok(())
    }

    fn set_ports(&mut self, param: &str, value: &ParamValue) -> Result<(), ParamError> {
        let ports = parse_ports(params::as_text(param, value)?).map_err(|reason| ParamError::Invalid {
            name: param.to_string(),
            reason,
        })?;
        let mut next = self.clone();
        if param == "inputs" {
            next.inputs = ports;
        } else {
            next.outputs = ports;
        }
        next.check_names(param)?;
        *self = next;
        Ok(())
    }
}

impl ShaderNode for ExpressionNode {
    fn kind(&self) -> &'static str {
        "expression"
    }

    fn caption(&self) -> &str {
        "Expression"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Expression
    }

    fn inputs(&self) -> Vec<Port> {
        self.inputs
            .iter()
            .map(|p| {
                let port = Port::input(p.name.clone(), p.port_type);
                match zero_default(p.port_type) {
                    Some(default) => port.with_default(default),
                    None => port,
                }
            })
            .collect()
    }

    fn outputs(&self) -> Vec<Port> {
        self.outputs
            .iter()
            .map(|p| Port::output(p.name.clone(), p.port_type))
            .collect()
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let mut code = String::new();
        for (port, expr) in self.inputs.iter().zip(inputs) {
            let value = if expr.is_empty() {
                port.port_type.zero_literal()
            } else {
                expr.as_str()
            };
            code.push_str(&format!("{} {} = {value};\n", port.port_type.glsl_type(), port.name));
        }
        for port in &self.outputs {
            code.push_str(&format!(
                "{} {} = {};\n",
                port.port_type.glsl_type(),
                port.name,
                port.port_type.zero_literal()
            ));
        }
        code.push_str("{\n");
        for line in self.expression.lines() {
            if !line.trim().is_empty() {
                code.push('\t');
                code.push_str(line);
            }
            code.push('\n');
        }
        code.push_str("}\n");
        for (port, var) in self.outputs.iter().zip(outputs) {
            code.push_str(&super::assign(var, &port.name));
        }
        Ok(code)
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::new("inputs", ParamKind::Text),
            ParamSpec::new("outputs", ParamKind::Text),
            ParamSpec::new(EXPRESSION, ParamKind::Text),
        ];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "inputs" => Some(ParamValue::Text(format_ports(&self.inputs))),
            "outputs" => Some(ParamValue::Text(format_ports(&self.outputs))),
            EXPRESSION => Some(ParamValue::Text(self.expression.clone())),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            "inputs" | "outputs" => self.set_ports(name, value),
            EXPRESSION => {
                self.expression = params::as_text(name, value)?.to_string();
                Ok(())
            }
            _ => Err(params::unknown(self.kind(), name)),
        }
    }
}

/// File-scope GLSL (functions, constants) with no ports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalExpressionNode {
    expression: String,
}

impl GlobalExpressionNode {
    /// Create a global expression
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// The user code
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl ShaderNode for GlobalExpressionNode {
    fn kind(&self) -> &'static str {
        "global_expression"
    }

    fn caption(&self) -> &str {
        "GlobalExpression"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Expression
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn is_global_only(&self) -> bool {
        true
    }

    fn global_declarations(&self, _ctx: &NodeContext) -> String {
        let mut text = self.expression.clone();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        _outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(String::new())
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(EXPRESSION, ParamKind::Text)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == EXPRESSION).then(|| ParamValue::Text(self.expression.clone()))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != EXPRESSION {
            return Err(params::unknown(self.kind(), name));
        }
        self.expression = params::as_text(name, value)?.to_string();
        Ok(())
    }
}
