// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input node: reads one stage built-in.

use super::builtins::{self, Builtin};
use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamError, ParamKind, ParamSpec, ParamValue};
use crate::port::{Port, PortType};

const SCHEMA: &[ParamSpec] = &[ParamSpec::new("input_name", ParamKind::Text)];

/// Exposes a built-in such as `UV`, `NORMAL` or `TIME` as an output port.
///
/// The port type comes from the built-in table of the bound mode and stage;
/// names missing from the table read as a scalar zero.
#[derive(Debug, Clone)]
pub struct InputNode {
    input_name: String,
    mode: ShaderMode,
    stage: Stage,
}

impl InputNode {
    /// Create an input node reading `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            input_name: name.into(),
            mode: ShaderMode::default(),
            stage: Stage::Fragment,
        }
    }

    /// Selected built-in name
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    fn builtin(&self) -> Option<&'static Builtin> {
        builtins::find(builtins::inputs(self.mode, self.stage), &self.input_name)
    }

    fn output_type(&self) -> PortType {
        self.builtin().map_or(PortType::Scalar, |b| b.port_type)
    }

    /// Sampler built-ins that exist inside a canvas-item fragment
    fn available_in_preview(expr: &str) -> bool {
        builtins::inputs(ShaderMode::CanvasItem, Stage::Fragment)
            .iter()
            .any(|b| b.port_type.is_sampler() && b.expr == expr)
    }
}

impl Default for InputNode {
    fn default() -> Self {
        Self::new("time")
    }
}

impl ShaderNode for InputNode {
    fn kind(&self) -> &'static str {
        "input"
    }

    fn caption(&self) -> &str {
        "Input"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Input
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output(self.input_name.clone(), self.output_type())]
    }

    fn bind(&mut self, mode: ShaderMode, stage: Stage) {
        self.mode = mode;
        self.stage = stage;
    }

    fn generate_body(
        &self,
        ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let port_type = self.output_type();
        if port_type.is_sampler() {
            return Ok(String::new());
        }

        let expr = if ctx.preview {
            builtins::find(builtins::preview_inputs(self.mode, self.stage), &self.input_name)
                .map_or(port_type.zero_literal(), |b| b.expr)
        } else {
            self.builtin().map_or(port_type.zero_literal(), |b| b.expr)
        };
        Ok(format!("{} = {};\n", outputs[0], expr))
    }

    fn sampler_name(&self, ctx: &NodeContext, _port: usize) -> Option<String> {
        let builtin = self.builtin().filter(|b| b.port_type.is_sampler())?;
        if ctx.preview && !Self::available_in_preview(builtin.expr) {
            return Some(String::new());
        }
        Some(builtin.expr.to_string())
    }

    fn warning(&self, mode: ShaderMode, stage: Stage) -> Option<String> {
        let known = builtins::find(builtins::inputs(mode, stage), &self.input_name).is_some();
        (!known).then(|| {
            format!(
                "input `{}` does not exist in the {stage} stage of {mode} shaders",
                self.input_name
            )
        })
    }

    fn stage_restriction(&self, ctx: &NodeContext) -> Option<String> {
        let builtin = self.builtin()?;
        if ctx.preview && builtin.port_type.is_sampler() && !Self::available_in_preview(builtin.expr) {
            return Some(format!("{} is not available in previews", builtin.expr));
        }
        None
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == "input_name").then(|| ParamValue::Text(self.input_name.clone()))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            "input_name" => {
                self.input_name = params::as_text(name, value)?.to_string();
                Ok(())
            }
            _ => Err(params::unknown(self.kind(), name)),
        }
    }
}
