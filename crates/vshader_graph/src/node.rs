// SPDX-License-Identifier: MIT OR Apache-2.0
//! The node model: what every node kind must provide to the compiler.

use crate::mode::{ShaderMode, Stage};
use crate::params::{self, ParamBag, ParamError, ParamSpec, ParamValue};
use crate::port::{Port, PortDirection, PortHint, PortType};
use crate::uniforms::UniformBinding;
use crate::value::{DefaultValue, EncodeError};
use std::fmt;

/// Identifier of a node, unique within its stage
pub type NodeId = u32;

/// Id of the output node present in every stage
pub const OUTPUT_NODE_ID: NodeId = 0;

/// Lowest id that may be given to a user node
pub const FIRST_USER_NODE_ID: NodeId = 2;

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Stage built-ins read
    Input,
    /// Stage built-ins written
    Output,
    /// Constant values
    Constant,
    /// Binary operators
    Operator,
    /// Element-wise functions
    Function,
    /// Clamp, mix, step, smoothstep
    Interpolation,
    /// Comparisons and selection
    Logic,
    /// Host-supplied parameters
    Uniform,
    /// Texture and cube map reads
    Texture,
    /// User-written GLSL
    Expression,
}

/// Where and how a node is being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeContext {
    /// Shader mode
    pub mode: ShaderMode,
    /// Stage the node lives in
    pub stage: Stage,
    /// Node id
    pub id: NodeId,
    /// Whether this is a preview compile
    pub preview: bool,
}

impl NodeContext {
    /// Create a context for a regular compile
    pub fn new(mode: ShaderMode, stage: Stage, id: NodeId) -> Self {
        Self {
            mode,
            stage,
            id,
            preview: false,
        }
    }

    /// Same context with the preview flag set
    pub fn for_preview(mut self) -> Self {
        self.preview = true;
        self
    }

    /// Identifier unique to this node: `<base>_<stage tag>_<id>`
    pub fn unique_name(&self, base: &str) -> String {
        format!("{}_{}_{}", base, self.stage.tag(), self.id)
    }
}

/// Node refused to produce code
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NodeError {
    /// A literal could not be written as GLSL
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Node-specific failure
    #[error("{0}")]
    Message(String),
}

impl NodeError {
    /// Node-specific failure with a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// A node kind.
///
/// Port schema may depend on parameters (and for input/output nodes on the
/// bound mode and stage), so every query goes through the instance.
pub trait ShaderNode: fmt::Debug + Send + Sync {
    /// Stable kind key used by the registry and saved files
    fn kind(&self) -> &'static str;

    /// Caption used in generated comments and diagnostics
    fn caption(&self) -> &str;

    /// Node category
    fn category(&self) -> NodeCategory;

    /// Input port schema
    fn inputs(&self) -> Vec<Port>;

    /// Output port schema
    fn outputs(&self) -> Vec<Port>;

    /// Produce the node's body. `inputs` holds one expression per input port
    /// (empty when disconnected without hint or default), `outputs` the
    /// variable name of each output port (empty for sampler outputs).
    fn generate_body(
        &self,
        ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError>;

    /// Number of ports in a direction
    fn port_count(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => self.inputs().len(),
            PortDirection::Output => self.outputs().len(),
        }
    }

    /// Port schema entry
    fn port(&self, direction: PortDirection, index: usize) -> Option<Port> {
        let mut ports = match direction {
            PortDirection::Input => self.inputs(),
            PortDirection::Output => self.outputs(),
        };
        (index < ports.len()).then(|| ports.swap_remove(index))
    }

    /// Type of a port
    fn port_type(&self, direction: PortDirection, index: usize) -> Option<PortType> {
        self.port(direction, index).map(|p| p.port_type)
    }

    /// Name of a port
    fn port_name(&self, direction: PortDirection, index: usize) -> Option<String> {
        self.port(direction, index).map(|p| p.name)
    }

    /// Default of an input port
    fn input_default(&self, index: usize) -> Option<DefaultValue> {
        self.port(PortDirection::Input, index)
            .and_then(|p| p.default_value)
    }

    /// Hint of an input port
    fn input_default_hint(&self, index: usize) -> Option<PortHint> {
        self.port(PortDirection::Input, index).and_then(|p| p.hint)
    }

    /// Called when the node enters a graph and whenever the mode changes
    fn bind(&mut self, _mode: ShaderMode, _stage: Stage) {}

    /// Whether the kind may be used in this mode and stage
    fn is_permitted(&self, _mode: ShaderMode, _stage: Stage) -> bool {
        true
    }

    /// Node contributes only file-scope code and is emitted without being
    /// reachable from the output.
    fn is_global_only(&self) -> bool {
        false
    }

    /// File-scope declarations (uniforms, varyings)
    fn global_declarations(&self, _ctx: &NodeContext) -> String {
        String::new()
    }

    /// File-scope helper code (functions)
    fn per_node_globals(&self, _ctx: &NodeContext) -> String {
        String::new()
    }

    /// Code placed at the start of `function`, once per node kind
    fn per_function_prologue(&self, _ctx: &NodeContext, _function: Stage) -> String {
        String::new()
    }

    /// Name passed along an edge leaving sampler output `port`
    fn sampler_name(&self, _ctx: &NodeContext, _port: usize) -> Option<String> {
        None
    }

    /// Declared uniform name, for uniform nodes
    fn uniform_name(&self) -> Option<&str> {
        None
    }

    /// Textures and cube maps to bind at draw time
    fn uniform_bindings(&self, _ctx: &NodeContext) -> Vec<UniformBinding> {
        Vec::new()
    }

    /// Warning shown by the editor
    fn warning(&self, _mode: ShaderMode, _stage: Stage) -> Option<String> {
        None
    }

    /// Reason the node will emit a placeholder in this context
    fn stage_restriction(&self, _ctx: &NodeContext) -> Option<String> {
        None
    }

    /// Parameter schema
    fn param_schema(&self) -> &'static [ParamSpec] {
        &[]
    }

    /// Current value of a parameter
    fn param(&self, _name: &str) -> Option<ParamValue> {
        None
    }

    /// Set a parameter. Values are checked against [`ShaderNode::param_schema`]
    /// before this is called.
    fn set_param(&mut self, name: &str, _value: &ParamValue) -> Result<(), ParamError> {
        Err(params::unknown(self.kind(), name))
    }

    /// All parameters, in schema order
    fn params(&self) -> ParamBag {
        self.param_schema()
            .iter()
            .filter_map(|entry| self.param(entry.name).map(|v| (entry.name.to_string(), v)))
            .collect()
    }
}

/// Validate then apply a parameter
pub fn apply_param(
    node: &mut dyn ShaderNode,
    name: &str,
    value: &ParamValue,
) -> Result<(), ParamError> {
    params::validate(node.param_schema(), node.kind(), name, value)?;
    node.set_param(name, value)
}

/// Name of the variable holding output `port` of node `id`
pub fn output_var(id: NodeId, port: usize) -> String {
    format!("n{id}_{port}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name() {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 5);
        assert_eq!(ctx.unique_name("tex"), "tex_frg_5");
        assert!(!ctx.preview);
        assert!(ctx.for_preview().preview);
    }

    #[test]
    fn test_output_var() {
        assert_eq!(output_var(1, 0), "n1_0");
        assert_eq!(output_var(12, 3), "n12_3");
    }
}
