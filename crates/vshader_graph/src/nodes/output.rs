// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output node: the root of every stage graph.

use super::builtins;
use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::port::Port;

/// Writes its connected inputs to the stage's built-in outputs.
///
/// Ports come from the output table of the bound mode and stage. Vector
/// ports take scalars. Disconnected ports emit nothing.
#[derive(Debug, Clone)]
pub struct OutputNode {
    mode: ShaderMode,
    stage: Stage,
}

impl OutputNode {
    /// Create an output node; ports follow the mode and stage it is bound to
    pub fn new() -> Self {
        Self {
            mode: ShaderMode::default(),
            stage: Stage::Fragment,
        }
    }
}

impl Default for OutputNode {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderNode for OutputNode {
    fn kind(&self) -> &'static str {
        "output"
    }

    fn caption(&self) -> &str {
        "Output"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Output
    }

    fn inputs(&self) -> Vec<Port> {
        builtins::outputs(self.mode, self.stage)
            .iter()
            .map(|b| Port::input(b.name, b.port_type).broadcast())
            .collect()
    }

    fn outputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn bind(&mut self, mode: ShaderMode, stage: Stage) {
        self.mode = mode;
        self.stage = stage;
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        _outputs: &[String],
    ) -> Result<String, NodeError> {
        let mut code = String::new();
        for (builtin, expr) in builtins::outputs(self.mode, self.stage).iter().zip(inputs) {
            if expr.is_empty() {
                continue;
            }
            match builtin.expr.split_once(':') {
                Some((target, swizzle)) => code.push_str(&format!("{target} = {expr}.{swizzle};\n")),
                None => code.push_str(&format!("{} = {expr};\n", builtin.expr)),
            }
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortType;

    #[test]
    fn test_ports_follow_mode() {
        let mut node = OutputNode::new();
        node.bind(ShaderMode::Spatial, Stage::Fragment);
        let ports = node.inputs();
        assert_eq!(ports[0].name, "albedo");
        assert!(ports[0].accepts(PortType::Scalar));
        assert_eq!(ports[1].port_type, PortType::Scalar);

        node.bind(ShaderMode::Particles, Stage::Light);
        assert!(node.inputs().is_empty());
    }

    #[test]
    fn test_assignments() {
        let mut node = OutputNode::new();
        node.bind(ShaderMode::CanvasItem, Stage::Vertex);
        let ctx = NodeContext::new(ShaderMode::CanvasItem, Stage::Vertex, 0);
        let inputs = vec![
            "n2_0".to_string(),
            String::new(),
            "vec3(n3_0)".to_string(),
            String::new(),
        ];
        assert_eq!(
            node.generate_body(&ctx, &inputs, &[]).unwrap(),
            "VERTEX = n2_0.xy;\nCOLOR.rgb = vec3(n3_0);\n"
        );
    }
}
