// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-oriented text format for saved shader graphs.
//!
//! ```text
//! mode = spatial
//! render_modes = cull:2
//! flags = unshaded
//! graph_offset = 0, 0
//! nodes/fragment/0/position = 400, 150
//! nodes/fragment/2 = scalar_constant
//! nodes/fragment/2/position = 0, 0
//! nodes/fragment/2/constant = 3.5
//! nodes/fragment/3/input_default/1 = 1, 2, 3
//! node_connections/fragment = [2, 0, 0, 1; 3, 0, 0, 0]
//! ```
//!
//! Parameter values are written according to the node kind's schema.
//! Loading goes through the registry, and edges are restored with the
//! forced connect so files saved by older versions still open.

use crate::error::GraphError;
use crate::graph::ShaderGraph;
use crate::mode::{ShaderMode, Stage};
use crate::node::{self, NodeId, OUTPUT_NODE_ID};
use crate::params::{ParamKind, ParamValue, ResourceHandle};
use crate::port::{PortDirection, PortType};
use crate::registry::NodeRegistry;
use crate::value::{DefaultValue, Transform};
use indexmap::IndexMap;

const INPUT_DEFAULT: &str = "input_default";

/// Failure to load a saved graph
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Malformed line
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// The graph refused an edit described by the file
    #[error("line {line}: {source}")]
    Graph {
        /// 1-based line number
        line: usize,
        /// Underlying error
        #[source]
        source: GraphError,
    },
}

impl LoadError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    fn graph(line: usize, source: impl Into<GraphError>) -> Self {
        Self::Graph {
            line,
            source: source.into(),
        }
    }

    /// Line the error was found on
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. } | Self::Graph { line, .. } => *line,
        }
    }
}

// ============================================================================
// Value text
// ============================================================================

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .filter(|_| text.len() >= 2)
        .ok_or_else(|| format!("expected a quoted string, found `{text}`"))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(format!("unknown escape `\\{other}`")),
            None => return Err("dangling `\\` at end of string".to_string()),
        }
    }
    Ok(out)
}

fn numbers(values: &[f32]) -> String {
    values
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_numbers<const N: usize>(text: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} numbers, found {}", parts.len()));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("`{part}` is not a number"))?;
    }
    Ok(out)
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("`{text}` is not a boolean")),
    }
}

fn write_param(kind: ParamKind, value: &ParamValue) -> String {
    match value {
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => v.to_string(),
        ParamValue::Bool(v) => v.to_string(),
        ParamValue::Vector3(v) => numbers(v),
        ParamValue::Color(v) => numbers(v),
        ParamValue::Transform(t) => numbers(&t.to_array()),
        ParamValue::Text(text) => quote(text),
        ParamValue::Enum(index) => match kind {
            ParamKind::Enum(names) => names.get(*index).map_or_else(|| index.to_string(), |n| n.to_string()),
            _ => index.to_string(),
        },
        ParamValue::Resource(Some(handle)) => format!("res({})", quote(handle.path())),
        ParamValue::Resource(None) => "null".to_string(),
    }
}

fn parse_param(kind: ParamKind, text: &str) -> Result<ParamValue, String> {
    Ok(match kind {
        ParamKind::Int => ParamValue::Int(text.parse().map_err(|_| format!("`{text}` is not an integer"))?),
        ParamKind::Float => ParamValue::Float(parse_numbers::<1>(text)?[0]),
        ParamKind::Bool => ParamValue::Bool(parse_bool(text)?),
        ParamKind::Vector3 => ParamValue::Vector3(parse_numbers(text)?),
        ParamKind::Color => ParamValue::Color(parse_numbers(text)?),
        ParamKind::Transform => ParamValue::Transform(Transform::from_array(parse_numbers(text)?)),
        ParamKind::Text => ParamValue::Text(unquote(text)?),
        ParamKind::Enum(names) => {
            let index = names
                .iter()
                .position(|n| *n == text)
                .or_else(|| text.parse().ok())
                .ok_or_else(|| format!("`{text}` is not one of {}", names.join(", ")))?;
            ParamValue::Enum(index)
        }
        ParamKind::Resource => {
            if text == "null" {
                ParamValue::Resource(None)
            } else {
                let path = text
                    .strip_prefix("res(")
                    .and_then(|t| t.strip_suffix(')'))
                    .ok_or_else(|| format!("expected `res(\"...\")` or `null`, found `{text}`"))?;
                ParamValue::Resource(Some(ResourceHandle::new(unquote(path.trim())?)))
            }
        }
    })
}

fn write_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Scalar(v) => v.to_string(),
        DefaultValue::Vector3(v) => numbers(v),
        DefaultValue::Boolean(v) => v.to_string(),
        DefaultValue::Transform(t) => numbers(&t.to_array()),
    }
}

fn parse_default(port_type: PortType, text: &str) -> Result<DefaultValue, String> {
    Ok(match port_type {
        PortType::Scalar => DefaultValue::Scalar(parse_numbers::<1>(text)?[0]),
        PortType::Vector3 => DefaultValue::Vector3(parse_numbers(text)?),
        PortType::Boolean => DefaultValue::Boolean(parse_bool(text)?),
        PortType::Transform => DefaultValue::Transform(Transform::from_array(parse_numbers(text)?)),
        PortType::Sampler2D | PortType::SamplerCube => {
            return Err("sampler inputs have no default".to_string());
        }
    })
}

fn parse_list(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

// ============================================================================
// Save
// ============================================================================

/// Serialize a graph to the saved text format
pub fn save(graph: &ShaderGraph) -> String {
    let mut out = String::new();
    out.push_str(&format!("mode = {}\n", graph.mode().persisted_name()));
    let modes: Vec<String> = graph
        .render_modes()
        .iter()
        .map(|(group, option)| format!("{group}:{option}"))
        .collect();
    out.push_str(&format!("render_modes = {}\n", modes.join(", ")));
    let flags: Vec<&str> = graph.flags().iter().map(String::as_str).collect();
    out.push_str(&format!("flags = {}\n", flags.join(", ")));
    out.push_str(&format!("graph_offset = {}\n", numbers(&graph.graph_offset())));

    for stage in Stage::ALL {
        let stage_graph = graph.stage(stage);
        let name = stage.name();
        for id in stage_graph.node_ids() {
            let Some(entry) = stage_graph.graph_node(id) else { continue };
            let prefix = format!("nodes/{name}/{id}");
            if id == OUTPUT_NODE_ID {
                out.push_str(&format!("{prefix}/position = {}\n", numbers(&entry.position)));
                continue;
            }
            let node = entry.node();
            out.push_str(&format!("{prefix} = {}\n", node.kind()));
            out.push_str(&format!("{prefix}/position = {}\n", numbers(&entry.position)));
            for param in node.param_schema() {
                if let Some(value) = node.param(param.name) {
                    out.push_str(&format!("{prefix}/{} = {}\n", param.name, write_param(param.kind, &value)));
                }
            }
            for (port, value) in entry.input_default_overrides() {
                out.push_str(&format!("{prefix}/{INPUT_DEFAULT}/{port} = {}\n", write_default(value)));
            }
        }

        let edges: Vec<String> = stage_graph
            .connections()
            .iter()
            .map(|c| format!("{}, {}, {}, {}", c.from_node, c.from_port, c.to_node, c.to_port))
            .collect();
        if !edges.is_empty() {
            out.push_str(&format!("node_connections/{name} = [{}]\n", edges.join("; ")));
        }
    }
    out
}

// ============================================================================
// Load
// ============================================================================

#[derive(Debug, Default)]
struct NodeRecord<'a> {
    kind: Option<(usize, &'a str)>,
    position: Option<(usize, [f32; 2])>,
    params: Vec<(usize, &'a str, &'a str)>,
    defaults: Vec<(usize, usize, &'a str)>,
}

#[derive(Debug, Default)]
struct Document<'a> {
    mode: Option<(usize, ShaderMode)>,
    render_modes: Vec<(usize, &'a str, usize)>,
    flags: Vec<(usize, &'a str)>,
    graph_offset: [f32; 2],
    nodes: IndexMap<(Stage, NodeId), NodeRecord<'a>>,
    edges: Vec<(usize, Stage, [usize; 4])>,
}

fn parse_stage(line: usize, name: &str) -> Result<Stage, LoadError> {
    Stage::from_name(name).ok_or_else(|| LoadError::syntax(line, format!("unknown stage `{name}`")))
}

fn parse_edges(line: usize, text: &str) -> Result<Vec<[usize; 4]>, LoadError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| LoadError::syntax(line, "connection list must be enclosed in `[...]`"))?;
    let mut edges = Vec::new();
    for group in inner.split(';').map(str::trim).filter(|g| !g.is_empty()) {
        let parts: Vec<&str> = group.split(',').map(str::trim).collect();
        let mut edge = [0usize; 4];
        if parts.len() != edge.len() {
            return Err(LoadError::syntax(line, format!("`{group}` is not `from, port, to, port`")));
        }
        for (slot, part) in edge.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| LoadError::syntax(line, format!("`{part}` is not an index")))?;
        }
        edges.push(edge);
    }
    Ok(edges)
}

fn parse_document(text: &str) -> Result<Document<'_>, LoadError> {
    let mut doc = Document::default();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(LoadError::syntax(line, "expected `key = value`"));
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "mode" => {
                let mode = ShaderMode::from_persisted_name(value)
                    .ok_or_else(|| LoadError::syntax(line, format!("unknown shader mode `{value}`")))?;
                doc.mode = Some((line, mode));
                continue;
            }
            "render_modes" => {
                for item in parse_list(value) {
                    let (group, option) = item
                        .split_once(':')
                        .and_then(|(g, o)| Some((g.trim(), o.trim().parse().ok()?)))
                        .ok_or_else(|| LoadError::syntax(line, format!("`{item}` is not `group:index`")))?;
                    doc.render_modes.push((line, group, option));
                }
                continue;
            }
            "flags" => {
                doc.flags.extend(parse_list(value).into_iter().map(|f| (line, f)));
                continue;
            }
            "graph_offset" => {
                doc.graph_offset = parse_numbers(value).map_err(|e| LoadError::syntax(line, e))?;
                continue;
            }
            _ => {}
        }

        let parts: Vec<&str> = key.split('/').collect();
        match parts.as_slice() {
            ["node_connections", stage] => {
                let stage = parse_stage(line, stage)?;
                for edge in parse_edges(line, value)? {
                    doc.edges.push((line, stage, edge));
                }
            }
            ["nodes", stage, id, rest @ ..] => {
                let stage = parse_stage(line, stage)?;
                let id: NodeId = id
                    .parse()
                    .map_err(|_| LoadError::syntax(line, format!("`{id}` is not a node id")))?;
                let record = doc.nodes.entry((stage, id)).or_default();
                match rest {
                    [] => record.kind = Some((line, value)),
                    ["position"] => {
                        let position = parse_numbers(value).map_err(|e| LoadError::syntax(line, e))?;
                        record.position = Some((line, position));
                    }
                    [INPUT_DEFAULT, port] => {
                        let port = port
                            .parse()
                            .map_err(|_| LoadError::syntax(line, format!("`{port}` is not a port index")))?;
                        record.defaults.push((line, port, value));
                    }
                    [name] => record.params.push((line, *name, value)),
                    _ => return Err(LoadError::syntax(line, format!("unknown key `{key}`"))),
                }
            }
            _ => return Err(LoadError::syntax(line, format!("unknown key `{key}`"))),
        }
    }
    Ok(doc)
}

/// Rebuild a graph from the saved text format.
///
/// Node kinds are resolved through `registry`. Edges are restored without
/// cycle or type checks; the compiler reports any that are invalid.
pub fn load(text: &str, registry: &NodeRegistry) -> Result<ShaderGraph, LoadError> {
    let doc = parse_document(text)?;
    let mode = doc.mode.map_or(ShaderMode::default(), |(_, mode)| mode);
    let mut graph = ShaderGraph::new(mode);
    graph.set_graph_offset(doc.graph_offset);

    for (line, group, option) in doc.render_modes {
        graph
            .set_render_mode(group, option)
            .map_err(|e| LoadError::graph(line, e))?;
    }
    for (line, flag) in doc.flags {
        graph.set_flag(flag, true).map_err(|e| LoadError::graph(line, e))?;
    }

    for ((stage, id), record) in doc.nodes {
        if id == OUTPUT_NODE_ID {
            if let Some((line, position)) = record.position {
                graph
                    .set_node_position(stage, id, position)
                    .map_err(|e| LoadError::graph(line, e))?;
            }
            continue;
        }

        let Some((kind_line, kind)) = record.kind else {
            let line = record
                .position
                .map(|(l, _)| l)
                .or_else(|| record.params.first().map(|p| p.0))
                .or_else(|| record.defaults.first().map(|d| d.0))
                .unwrap_or(0);
            return Err(LoadError::syntax(line, format!("node {id} of the {stage} stage has no kind")));
        };

        let mut node = registry
            .instantiate(kind, &Default::default())
            .map_err(|e| LoadError::graph(kind_line, e))?;
        for (line, name, value) in record.params {
            let entry = node
                .param_schema()
                .iter()
                .find(|s| s.name == name)
                .copied()
                .ok_or_else(|| LoadError::syntax(line, format!("node kind `{kind}` has no parameter `{name}`")))?;
            let value = parse_param(entry.kind, value).map_err(|e| LoadError::syntax(line, e))?;
            node::apply_param(node.as_mut(), name, &value).map_err(|e| LoadError::graph(line, e))?;
        }

        let position = record.position.map_or([0.0, 0.0], |(_, p)| p);
        graph
            .add_node(stage, node, id, position)
            .map_err(|e| LoadError::graph(kind_line, e))?;

        for (line, port, value) in record.defaults {
            let port_type = graph
                .node(stage, id)
                .and_then(|n| n.port_type(PortDirection::Input, port))
                .ok_or_else(|| LoadError::syntax(line, format!("node {id} has no input port {port}")))?;
            let value = parse_default(port_type, value).map_err(|e| LoadError::syntax(line, e))?;
            graph
                .set_input_default(stage, id, port, value)
                .map_err(|e| LoadError::graph(line, e))?;
        }
    }

    for (line, stage, [from, from_port, to, to_port]) in doc.edges {
        let (from, to) = (node_id(line, from)?, node_id(line, to)?);
        graph
            .connect_nodes_forced(stage, from, from_port, to, to_port)
            .map_err(|e| LoadError::graph(line, e))?;
    }

    tracing::debug!(%mode, "Loaded shader graph");
    Ok(graph)
}

fn node_id(line: usize, value: usize) -> Result<NodeId, LoadError> {
    NodeId::try_from(value).map_err(|_| LoadError::syntax(line, format!("node id {value} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ShaderNode;
    use crate::nodes::constant::ScalarConstant;
    use crate::nodes::expression::{ExpressionNode, ExpressionPort};
    use crate::nodes::operator::{VectorOp, VectorOperator};
    use crate::nodes::uniform::TextureUniform;

    fn sample_graph() -> ShaderGraph {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        graph.set_flag("unshaded", true).unwrap();
        graph.set_render_mode("cull", 2).unwrap();
        graph.set_graph_offset([12.0, -4.5]);
        graph
            .add_node(Stage::Fragment, Box::new(ScalarConstant::new(0.25)), 2, [10.0, 20.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(VectorOp::new(VectorOperator::Mul)), 3, [200.0, 20.0])
            .unwrap();
        graph
            .set_input_default(Stage::Fragment, 3, 1, DefaultValue::Vector3([1.0, 2.0, 3.0]))
            .unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 0).unwrap();
        let mut texture = TextureUniform::new("albedo_map");
        texture
            .set_param("texture", &ParamValue::Resource(Some(ResourceHandle::new("res://a \"b\".png"))))
            .unwrap();
        graph.add_node(Stage::Fragment, Box::new(texture), 4, [0.0, 200.0]).unwrap();
        let expression = ExpressionNode::new(
            vec![ExpressionPort::new(PortType::Scalar, "x")],
            vec![ExpressionPort::new(PortType::Vector3, "v")],
            "v = vec3(x);\n\tv.y = 1.0;",
        )
        .unwrap();
        graph.add_node(Stage::Vertex, Box::new(expression), 5, [0.0, 0.0]).unwrap();
        graph.set_node_position(Stage::Light, OUTPUT_NODE_ID, [300.0, 0.0]).unwrap();
        graph
    }

    #[test]
    fn test_round_trip() {
        let registry = NodeRegistry::default();
        let graph = sample_graph();
        let text = save(&graph);
        assert!(text.starts_with("mode = spatial\nrender_modes = cull:2\nflags = unshaded\n"));
        assert!(text.contains("node_connections/fragment = [2, 0, 3, 0; 3, 0, 0, 0]"));
        assert!(text.contains("nodes/fragment/3/input_default/1 = 1, 2, 3"));

        let loaded = load(&text, &registry).unwrap();
        assert_eq!(loaded, graph);
        assert_eq!(save(&loaded), text);
    }

    #[test]
    fn test_string_escapes() {
        let text = "a \"quoted\"\\ line\nnext\tcol";
        assert_eq!(unquote(&quote(text)).unwrap(), text);
        assert!(unquote("\"bad\\q\"").is_err());
        assert!(unquote("\"").is_err());
        assert!(unquote("plain").is_err());
    }

    #[test]
    fn test_comments_and_defaults() {
        let registry = NodeRegistry::default();
        let text = "# saved by hand\n\nnodes/fragment/2 = scalar_constant\nnodes/fragment/2/constant = 3.5\n";
        let graph = load(text, &registry).unwrap();
        assert_eq!(graph.mode(), ShaderMode::Spatial);
        assert_eq!(graph.node_param(Stage::Fragment, 2, "constant"), Some(ParamValue::Float(3.5)));
        assert_eq!(graph.node_position(Stage::Fragment, 2), Some([0.0, 0.0]));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let registry = NodeRegistry::default();

        let err = load("mode = spatial\nnodes/fragment/2 = no_such_kind\n", &registry).unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(err, LoadError::Graph { .. }));

        let err = load("mode = spatial\n\nbogus line\n", &registry).unwrap_err();
        assert_eq!(err.line(), 3);

        let err = load("nodes/fragment/2 = scalar_constant\nnodes/fragment/2/constant = abc\n", &registry)
            .unwrap_err();
        assert_eq!(err.line(), 2);

        let err = load("flags = not_a_flag\n", &registry).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Graph {
                line: 1,
                source: GraphError::InvalidMode { .. }
            }
        ));

        let err = load("nodes/sky/2 = scalar_constant\n", &registry).unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 1, .. }));

        let err = load("nodes/fragment/2/position = 1, 2\n", &registry).unwrap_err();
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_forced_edges_survive_load() {
        let registry = NodeRegistry::default();
        let text = "\
nodes/fragment/2 = scalar_op
nodes/fragment/3 = scalar_op
node_connections/fragment = [2, 0, 3, 0; 3, 0, 2, 0; 3, 0, 0, 1]
";
        let mut graph = load(text, &registry).unwrap();
        assert_eq!(graph.node_connections(Stage::Fragment).len(), 3);
        let compiled = graph.rebuild();
        assert!(!compiled.is_ok());
    }
}
