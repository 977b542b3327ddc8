// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end compiles of small graphs.

use vshader_graph::nodes::constant::ScalarConstant;
use vshader_graph::nodes::operator::{ScalarOp, ScalarOperator, VectorOp, VectorOperator};
use vshader_graph::nodes::texture::{TextureNode, TextureSource};
use vshader_graph::nodes::uniform::TextureUniform;
use vshader_graph::{
    load, DefaultValue, DiagnosticKind, GraphError, NodeRegistry, ParamBag, ParamValue, ShaderGraph, ShaderMode,
    Stage, OUTPUT_NODE_ID,
};

const ORIGIN: [f32; 2] = [0.0, 0.0];

#[test]
fn constant_passthrough() {
    let registry = NodeRegistry::default();
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    let mut params = ParamBag::new();
    params.insert("constant".to_string(), ParamValue::Float(3.5));
    graph
        .add_node_of_kind(&registry, Stage::Fragment, "scalar_constant", &params, 2, ORIGIN)
        .unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 0, OUTPUT_NODE_ID, 0).unwrap();

    let compiled = graph.rebuild();
    assert!(compiled.is_ok());
    assert!(compiled.source.contains("n2_0 = 3.500000;"));
    assert!(compiled.source.contains("ALBEDO = vec3(n2_0);"));
}

#[test]
fn cycle_rejection() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    for id in 2..=4 {
        graph
            .add_node(Stage::Fragment, Box::new(ScalarOp::new(ScalarOperator::Add)), id, ORIGIN)
            .unwrap();
    }
    graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
    graph.connect_nodes(Stage::Fragment, 3, 0, 4, 0).unwrap();
    let before = graph.node_connections(Stage::Fragment).to_vec();

    let err = graph.connect_nodes(Stage::Fragment, 4, 0, 2, 0).unwrap_err();
    assert!(matches!(err, GraphError::Cycle { .. }));
    assert_eq!(graph.node_connections(Stage::Fragment), before.as_slice());
    assert!(!graph.can_connect_nodes(Stage::Fragment, 4, 0, 2, 0));
}

#[test]
fn loaded_cycle_is_reported_on_its_nodes() {
    let text = "\
mode = spatial
nodes/fragment/2 = scalar_op
nodes/fragment/3 = scalar_op
node_connections/fragment = [2, 0, 3, 0; 3, 0, 2, 0; 3, 0, 0, 1]
";
    let mut graph = load(text, &NodeRegistry::default()).unwrap();
    let compiled = graph.rebuild();

    let error = compiled.errors().next().unwrap();
    assert_eq!(error.kind, DiagnosticKind::Cycle);
    assert!(matches!(error.node, Some(2 | 3)), "blamed {:?}", error.node);
    assert!(!graph.node_warnings(Stage::Fragment, 2).is_empty());
    assert!(graph.node_warnings(Stage::Fragment, OUTPUT_NODE_ID).is_empty());
}

#[test]
fn disconnected_sampler() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(TextureNode::new(TextureSource::SamplerPort)), 2, ORIGIN)
        .unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 0, OUTPUT_NODE_ID, 0).unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 1, OUTPUT_NODE_ID, 1).unwrap();

    let compiled = graph.rebuild();
    assert!(compiled.is_ok());
    assert!(compiled.source.contains("n2_0 = vec3(0.0);\n"));
    assert!(compiled.source.contains("n2_1 = 1.0;\n"));
    assert!(!compiled.source.contains("texture("));
    assert!(compiled.uniforms.is_empty());
}

#[test]
fn uniform_aggregation() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(TextureUniform::new("mask")), 2, ORIGIN)
        .unwrap();
    graph
        .add_node(Stage::Fragment, Box::new(TextureUniform::new("albedo")), 3, ORIGIN)
        .unwrap();
    graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 0).unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 1, OUTPUT_NODE_ID, 1).unwrap();

    let compiled = graph.rebuild();
    assert!(compiled.is_ok());
    assert_eq!(compiled.source.matches("uniform sampler2D ").count(), 2);
    assert!(compiled.source.contains("uniform sampler2D mask"));
    assert!(compiled.source.contains("uniform sampler2D albedo"));

    let names: Vec<&str> = compiled.uniforms.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"mask"));
    assert!(names.contains(&"albedo"));
}

#[test]
fn duplicate_uniform_names_are_renamed() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(TextureUniform::new("mask")), 2, ORIGIN)
        .unwrap();
    graph
        .add_node(Stage::Vertex, Box::new(TextureUniform::new("mask")), 2, ORIGIN)
        .unwrap();
    assert_eq!(
        graph.node_param(Stage::Vertex, 2, "uniform_name"),
        Some(ParamValue::Text("mask2".to_string()))
    );
}

#[test]
fn scalar_to_vector_broadcast() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(ScalarConstant::new(0.25)), 2, ORIGIN)
        .unwrap();
    graph
        .add_node(Stage::Fragment, Box::new(VectorOp::new(VectorOperator::Mul)), 3, ORIGIN)
        .unwrap();
    graph
        .set_input_default(Stage::Fragment, 3, 1, DefaultValue::Vector3([1.0, 2.0, 3.0]))
        .unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
    graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 0).unwrap();

    let compiled = graph.rebuild();
    assert!(compiled.is_ok());
    assert!(compiled
        .source
        .contains("vec3(n2_0) * vec3(1.000000, 2.000000, 3.000000)"));
}

#[test]
fn depth_preview_uses_placeholder() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(TextureNode::new(TextureSource::Depth)), 2, ORIGIN)
        .unwrap();

    let full = graph.rebuild();
    assert!(full.source.contains("void fragment() {\n}\n"));

    let preview = graph.generate_preview(Stage::Fragment, 2, 0).unwrap();
    assert!(preview.source.starts_with("shader_type canvas_item;"));
    assert!(!preview.source.contains("DEPTH_TEXTURE"));
    assert!(preview.source.contains("n2_0 = 0.0;"));
    assert!(preview.is_ok());
    let warning = preview.warnings().next().unwrap();
    assert_eq!(warning.kind, DiagnosticKind::StageRestriction);
    assert_eq!(warning.node, Some(2));
}

#[test]
fn depth_preview_in_canvas_mode() {
    let mut graph = ShaderGraph::new(ShaderMode::CanvasItem);
    graph
        .add_node(Stage::Fragment, Box::new(TextureNode::new(TextureSource::Depth)), 2, ORIGIN)
        .unwrap();

    let preview = graph.generate_preview(Stage::Fragment, 2, 0).unwrap();
    assert!(preview.is_ok());
    assert!(!preview.source.contains("DEPTH_TEXTURE"));
    assert!(preview.source.contains("n2_0 = 0.0;"));
    assert!(preview.source.contains("COLOR.rgb = vec3(n2_0);"));

    let kinds: Vec<DiagnosticKind> = preview.diagnostics_for(Stage::Fragment, 2).map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::StageRestriction));
    assert!(kinds.contains(&DiagnosticKind::NodeWarning));
    assert_eq!(kinds.len(), 2);
}

#[test]
fn depth_read_in_full_compile() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(TextureNode::new(TextureSource::Depth)), 2, ORIGIN)
        .unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 0, OUTPUT_NODE_ID, 1).unwrap();

    let compiled = graph.rebuild();
    assert!(compiled.source.contains("texture(DEPTH_TEXTURE, vec3(UV, 0.0).xy).r"));
    assert!(compiled.source.contains("ALPHA = n2_0;"));
}

#[test]
fn mode_change_drops_io_edges() {
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    graph
        .add_node(Stage::Fragment, Box::new(ScalarConstant::new(1.0)), 2, ORIGIN)
        .unwrap();
    graph
        .add_node(Stage::Fragment, Box::new(ScalarOp::new(ScalarOperator::Add)), 3, ORIGIN)
        .unwrap();
    graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
    graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 1).unwrap();
    graph.set_flag("unshaded", true).unwrap();

    graph.set_mode(ShaderMode::CanvasItem);
    assert_eq!(graph.node_connections(Stage::Fragment).len(), 1);
    assert!(graph.flags().is_empty());
    assert!(graph.rebuild().source.starts_with("shader_type canvas_item;\n"));
}
