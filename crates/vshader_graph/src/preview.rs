// SPDX-License-Identifier: MIT OR Apache-2.0
//! Single-port previews rendered as a canvas-item fragment shader.

use crate::compiler::{CompiledShader, Session};
use crate::graph::ShaderGraph;
use crate::mode::Stage;
use crate::node::{output_var, NodeId};
use crate::port::{PortDirection, PortType};

const PREVIEW_HEADER: &str = "shader_type canvas_item;\n\n";

/// `COLOR.rgb` expression for a previewed value, if the type can be shown
fn color_expr(port_type: PortType, var: &str) -> Option<String> {
    match port_type {
        PortType::Scalar => Some(format!("vec3({var})")),
        PortType::Boolean => Some(format!("vec3({var} ? 1.0 : 0.0)")),
        PortType::Vector3 => Some(var.to_string()),
        PortType::Transform | PortType::Sampler2D | PortType::SamplerCube => None,
    }
}

/// Compile the closure of `(stage, id)` so that output `port` lands in
/// `COLOR.rgb` of a canvas-item fragment.
///
/// Stage-restricted nodes emit placeholders and per-function prologues are
/// left out. Returns `None` when the node or port does not exist or the
/// port type cannot be shown as a color.
pub fn generate_preview(graph: &ShaderGraph, stage: Stage, id: NodeId, port: usize) -> Option<CompiledShader> {
    let node = graph.node(stage, id)?;
    let port_type = node.port_type(PortDirection::Output, port)?;
    let color = color_expr(port_type, &output_var(id, port))?;

    let mut session = Session::new(graph, true);
    let body = session.emit_stage(stage, id);

    let mut source = String::from(PREVIEW_HEADER);
    source.push_str(&session.file_scope());
    source.push_str("\nvoid fragment() {\n");
    if let Some(body) = body {
        source.push_str(&body);
        source.push_str(&format!("\tCOLOR.rgb = {color};\n"));
    }
    source.push_str("}\n");

    tracing::debug!(%stage, id, port, "Generated preview");
    Some(session.finish(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ShaderMode;
    use crate::nodes::constant::{BooleanConstant, ScalarConstant, TransformConstant};
    use crate::nodes::operator::{ScalarOp, ScalarOperator};

    #[test]
    fn test_scalar_preview() {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        graph
            .add_node(Stage::Fragment, Box::new(ScalarConstant::new(0.25)), 2, [0.0, 0.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(ScalarOp::new(ScalarOperator::Add)), 3, [0.0, 0.0])
            .unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();

        let preview = graph.generate_preview(Stage::Fragment, 3, 0).unwrap();
        assert!(preview.is_ok());
        assert!(preview.source.starts_with("shader_type canvas_item;\n\n"));
        assert!(preview.source.contains("n2_0 = 0.250000;"));
        assert!(preview.source.ends_with("\tCOLOR.rgb = vec3(n3_0);\n}\n"));
        assert!(!preview.source.contains("void vertex()"));
    }

    #[test]
    fn test_preview_slices_closure() {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        graph
            .add_node(Stage::Fragment, Box::new(ScalarConstant::new(1.0)), 2, [0.0, 0.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(ScalarConstant::new(2.0)), 3, [0.0, 0.0])
            .unwrap();
        let preview = graph.generate_preview(Stage::Fragment, 2, 0).unwrap();
        assert!(preview.source.contains("n2_0"));
        assert!(!preview.source.contains("n3_0"));
    }

    #[test]
    fn test_unpreviewable_ports() {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        graph
            .add_node(Stage::Fragment, Box::new(TransformConstant::default()), 2, [0.0, 0.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(BooleanConstant::new(true)), 3, [0.0, 0.0])
            .unwrap();
        assert!(graph.generate_preview(Stage::Fragment, 2, 0).is_none());
        assert!(graph.generate_preview(Stage::Fragment, 3, 1).is_none());
        assert!(graph.generate_preview(Stage::Fragment, 9, 0).is_none());

        let preview = graph.generate_preview(Stage::Fragment, 3, 0).unwrap();
        assert!(preview.source.contains("COLOR.rgb = vec3(n3_0 ? 1.0 : 0.0);"));
    }
}
