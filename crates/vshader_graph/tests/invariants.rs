// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph invariants under sequences of edits.

use std::collections::{HashMap, HashSet};
use vshader_graph::value::encode_scalar;
use vshader_graph::{
    compile, load, save, NodeId, NodeRegistry, ParamBag, ParamValue, PortDirection, ShaderGraph, ShaderMode,
    Stage, OUTPUT_NODE_ID,
};

/// Deterministic xorshift so failures reproduce
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const KINDS: &[&str] = &[
    "scalar_constant",
    "vector_constant",
    "boolean_constant",
    "scalar_op",
    "vector_op",
    "scalar_func",
    "vector_func",
    "dot_product",
    "vector_compose",
    "vector_decompose",
    "scalar_interp",
    "vector_switch",
    "compare",
    "if",
];

fn has_cycle(graph: &ShaderGraph, stage: Stage) -> bool {
    let mut readers: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for c in graph.node_connections(stage) {
        readers.entry(c.from_node).or_default().push(c.to_node);
    }
    // iterative three-colour DFS
    let mut done: HashSet<NodeId> = HashSet::new();
    for start in graph.node_list(stage) {
        if done.contains(&start) {
            continue;
        }
        let mut on_path: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![(start, 0usize)];
        on_path.insert(start);
        while let Some((id, next)) = stack.pop() {
            let children = readers.get(&id).map_or(&[][..], Vec::as_slice);
            if let Some(&child) = children.get(next) {
                stack.push((id, next + 1));
                if on_path.contains(&child) {
                    return true;
                }
                if !done.contains(&child) {
                    on_path.insert(child);
                    stack.push((child, 0));
                }
            } else {
                on_path.remove(&id);
                done.insert(id);
            }
        }
    }
    false
}

fn assert_sound(graph: &ShaderGraph, stage: Stage) {
    let mut fed = HashSet::new();
    for c in graph.node_connections(stage) {
        let from = graph.node(stage, c.from_node).expect("edge source exists");
        let to = graph.node(stage, c.to_node).expect("edge target exists");
        let out_type = from
            .port_type(PortDirection::Output, c.from_port)
            .expect("source port exists");
        let input = to.port(PortDirection::Input, c.to_port).expect("target port exists");
        assert!(input.accepts(out_type), "{c:?} is not type sound");
        assert!(fed.insert((c.to_node, c.to_port)), "{c:?} feeds an already fed input");
    }
    assert!(!has_cycle(graph, stage));
}

fn random_graph(seed: u64, steps: usize) -> ShaderGraph {
    let registry = NodeRegistry::default();
    let mut rng = Rng(seed);
    let mut graph = ShaderGraph::new(ShaderMode::Spatial);
    let stage = Stage::Fragment;

    for _ in 0..steps {
        let ids = graph.node_list(stage);
        match rng.below(10) {
            0..=2 => {
                let kind = KINDS[rng.below(KINDS.len())];
                let id = graph.find_valid_id(stage);
                graph
                    .add_node_of_kind(&registry, stage, kind, &ParamBag::new(), id, [0.0, 0.0])
                    .unwrap();
            }
            3 if ids.len() > 1 => {
                let id = ids[rng.below(ids.len())];
                let result = graph.remove_node(stage, id);
                assert_eq!(result.is_ok(), id != OUTPUT_NODE_ID);
            }
            4 => {
                let edges = graph.node_connections(stage).to_vec();
                if !edges.is_empty() {
                    let c = edges[rng.below(edges.len())];
                    graph
                        .disconnect_nodes(stage, c.from_node, c.from_port, c.to_node, c.to_port)
                        .unwrap();
                }
            }
            _ => {
                let from = ids[rng.below(ids.len())];
                let to = ids[rng.below(ids.len())];
                let outputs = graph.node(stage, from).map_or(0, |n| n.outputs().len());
                let inputs = graph.node(stage, to).map_or(0, |n| n.inputs().len());
                if outputs == 0 || inputs == 0 {
                    continue;
                }
                let (from_port, to_port) = (rng.below(outputs), rng.below(inputs));
                let before = graph.node_connections(stage).to_vec();
                let allowed = graph.can_connect_nodes(stage, from, from_port, to, to_port);
                let result = graph.connect_nodes(stage, from, from_port, to, to_port);
                assert_eq!(allowed, result.is_ok());
                if result.is_err() {
                    assert_eq!(graph.node_connections(stage), before.as_slice());
                }
            }
        }
        assert_sound(&graph, stage);
    }
    graph
}

#[test]
fn edits_keep_graph_sound() {
    for seed in 1..=20 {
        random_graph(seed * 7919, 200);
    }
}

#[test]
fn compile_is_deterministic() {
    for seed in 1..=10 {
        let graph = random_graph(seed * 104_729, 120);
        assert_eq!(compile(&graph), compile(&graph));
    }
}

#[test]
fn rebuild_is_idempotent() {
    let mut graph = random_graph(42, 150);
    let first = graph.rebuild();
    let second = graph.rebuild();
    assert_eq!(first, second);
    assert!(!graph.is_dirty());
    assert_eq!(graph.code(), &second);
}

#[test]
fn save_load_round_trip() {
    let registry = NodeRegistry::default();
    for seed in 1..=10 {
        let mut graph = random_graph(seed * 15_485_863, 150);
        let id = graph.find_valid_id(Stage::Vertex);
        let mut params = ParamBag::new();
        params.insert("uniform_name".to_string(), ParamValue::Text("tint color".to_string()));
        graph
            .add_node_of_kind(&registry, Stage::Vertex, "color_uniform", &params, id, [5.0, 6.0])
            .unwrap();

        let text = save(&graph);
        let mut loaded = load(&text, &registry).unwrap();
        assert_eq!(loaded, graph);
        assert_eq!(loaded.rebuild(), graph.rebuild());
        assert_eq!(save(&loaded), text);
    }
}

#[test]
fn scalar_encoding_is_accurate() {
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    let mut values = vec![0.0, -0.0, 1.0, -1.0, 0.5, 1e-7, 123_456.79, -3.25, f32::MAX, f32::MIN_POSITIVE];
    for _ in 0..500 {
        let bits = (rng.next() >> 32) as u32;
        let value = f32::from_bits(bits);
        if value.is_finite() && value.abs() < 1e9 {
            values.push(value);
        }
    }
    for value in values {
        let text = encode_scalar(value).unwrap();
        let parsed: f64 = text.parse().unwrap();
        let error = (parsed - f64::from(value)).abs();
        let tolerance = 1e-6_f64.max(f64::from(value.abs()) * 1e-7);
        assert!(error <= tolerance, "{value} encoded as {text}");
    }
    assert!(encode_scalar(f32::NAN).is_err());
    assert!(encode_scalar(f32::INFINITY).is_err());
}
