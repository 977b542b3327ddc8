// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store: three per-stage graphs of nodes and connections.

use crate::compiler::{self, CompiledShader};
use crate::connection::Connection;
use crate::error::{Diagnostic, GraphError, Missing};
use crate::mode::{ShaderMode, Stage};
use crate::node::{self, NodeCategory, NodeId, ShaderNode, FIRST_USER_NODE_ID, OUTPUT_NODE_ID};
use crate::nodes::output::OutputNode;
use crate::params::{ParamBag, ParamValue};
use crate::port::PortDirection;
use crate::preview;
use crate::registry::NodeRegistry;
use crate::uniforms::{sanitize_uniform_name, unique_uniform_name};
use crate::validation;
use crate::value::DefaultValue;
use indexmap::{IndexMap, IndexSet};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Parameter holding a uniform node's name
pub const UNIFORM_NAME_PARAM: &str = "uniform_name";

/// A node stored in a stage graph
#[derive(Debug)]
pub struct GraphNode {
    pub(crate) node: Box<dyn ShaderNode>,
    /// Position in the editor (opaque to the core)
    pub position: [f32; 2],
    input_defaults: IndexMap<usize, DefaultValue>,
}

impl GraphNode {
    fn new(node: Box<dyn ShaderNode>, position: [f32; 2]) -> Self {
        Self {
            node,
            position,
            input_defaults: IndexMap::new(),
        }
    }

    /// The node model
    pub fn node(&self) -> &dyn ShaderNode {
        self.node.as_ref()
    }

    /// Default of an input port: the per-instance override if one was set,
    /// otherwise the kind's default
    pub fn input_default(&self, port: usize) -> Option<DefaultValue> {
        self.input_defaults
            .get(&port)
            .copied()
            .or_else(|| self.node.input_default(port))
    }

    /// Per-instance default overrides, by input port
    pub fn input_default_overrides(&self) -> &IndexMap<usize, DefaultValue> {
        &self.input_defaults
    }

    /// Drop overrides whose port vanished or changed type
    fn prune_defaults(&mut self) {
        let inputs = self.node.inputs();
        self.input_defaults.retain(|port, value| {
            inputs
                .get(*port)
                .is_some_and(|p| p.port_type == value.port_type())
        });
    }
}

/// Error when ordering a stage for emission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// A cycle runs through the node
    #[error("graph contains a cycle through node {0}")]
    Cycle(NodeId),

    /// An edge references a missing node or port
    #[error("connection {}:{} -> {}:{} references a missing node or port",
        .0.from_node, .0.from_port, .0.to_node, .0.to_port)]
    Dangling(Connection),
}

/// Nodes and connections of a single stage
#[derive(Debug)]
pub struct StageGraph {
    stage: Stage,
    nodes: IndexMap<NodeId, GraphNode>,
    connections: Vec<Connection>,
    last_id: NodeId,
}

impl StageGraph {
    fn new(stage: Stage, mode: ShaderMode) -> Self {
        let mut output: Box<dyn ShaderNode> = Box::new(OutputNode::new());
        output.bind(mode, stage);
        let mut nodes = IndexMap::new();
        nodes.insert(OUTPUT_NODE_ID, GraphNode::new(output, [400.0, 150.0]));
        Self {
            stage,
            nodes,
            connections: Vec::new(),
            last_id: OUTPUT_NODE_ID,
        }
    }

    /// Stage this graph belongs to
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&dyn ShaderNode> {
        self.nodes.get(&id).map(GraphNode::node)
    }

    /// Get a stored node (model plus position) by ID
    pub fn graph_node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Check whether a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes, output node included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All connections in insertion order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The edge feeding an input port, if any
    pub fn incoming(&self, id: NodeId, port: usize) -> Option<&Connection> {
        self.connections.iter().find(|c| c.feeds(id, port))
    }

    /// Next id that [`ShaderGraph::add_node`] will accept
    ///
    /// Once the largest id has been used, falls back to the lowest free id.
    pub fn find_valid_id(&self) -> NodeId {
        match self.last_id.checked_add(1) {
            Some(next) => FIRST_USER_NODE_ID.max(next),
            None => (FIRST_USER_NODE_ID..=NodeId::MAX)
                .find(|id| !self.has_node(*id))
                .unwrap_or(NodeId::MAX),
        }
    }

    /// Check that an edge references extant nodes and in-range ports
    pub fn edge_in_range(&self, c: &Connection) -> bool {
        let (Some(from), Some(to)) = (self.node(c.from_node), self.node(c.to_node)) else {
            return false;
        };
        c.from_port < from.port_count(PortDirection::Output)
            && c.to_port < to.port_count(PortDirection::Input)
    }

    /// Nodes reachable from `root` through input edges, `root` included
    pub fn reachable_from(&self, root: NodeId) -> Result<HashSet<NodeId>, OrderError> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        if self.has_node(root) {
            seen.insert(root);
            queue.push_back(root);
        }
        while let Some(id) = queue.pop_front() {
            for c in self.connections.iter().filter(|c| c.to_node == id) {
                if !self.edge_in_range(c) {
                    return Err(OrderError::Dangling(*c));
                }
                if seen.insert(c.from_node) {
                    queue.push_back(c.from_node);
                }
            }
        }
        Ok(seen)
    }

    /// Reachable nodes ordered so that every node follows the nodes it
    /// reads from. Ties are broken by ascending id.
    pub fn topological_order_from(&self, root: NodeId) -> Result<Vec<NodeId>, OrderError> {
        let reachable = self.reachable_from(root)?;

        let mut indegree: HashMap<NodeId, usize> = reachable.iter().map(|id| (*id, 0)).collect();
        let mut readers: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for c in &self.connections {
            if reachable.contains(&c.to_node) && reachable.contains(&c.from_node) {
                *indegree.entry(c.to_node).or_default() += 1;
                readers.entry(c.from_node).or_default().push(c.to_node);
            }
        }

        let mut ready: BinaryHeap<Reverse<NodeId>> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| Reverse(*id))
            .collect();

        let mut order = Vec::with_capacity(reachable.len());
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            for reader in readers.get(&id).into_iter().flatten() {
                if let Some(degree) = indegree.get_mut(reader) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(*reader));
                    }
                }
            }
        }

        if order.len() < reachable.len() {
            let placed: HashSet<NodeId> = order.iter().copied().collect();
            let stuck: HashSet<NodeId> = reachable.difference(&placed).copied().collect();
            return Err(OrderError::Cycle(Self::lowest_on_cycle(&stuck, &readers).unwrap_or(root)));
        }
        Ok(order)
    }

    /// Smallest id among `stuck` that can reach itself through `readers`.
    ///
    /// `stuck` holds every node the ordering could not place, which includes
    /// nodes merely downstream of a cycle.
    fn lowest_on_cycle(stuck: &HashSet<NodeId>, readers: &HashMap<NodeId, Vec<NodeId>>) -> Option<NodeId> {
        let mut candidates: Vec<NodeId> = stuck.iter().copied().collect();
        candidates.sort_unstable();
        candidates.into_iter().find(|&start| {
            let mut seen = HashSet::new();
            let mut stack: Vec<NodeId> = readers.get(&start).into_iter().flatten().copied().collect();
            while let Some(id) = stack.pop() {
                if id == start {
                    return true;
                }
                if stuck.contains(&id) && seen.insert(id) {
                    stack.extend(readers.get(&id).into_iter().flatten().copied());
                }
            }
            false
        })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut GraphNode, GraphError> {
        let stage = self.stage;
        self.nodes
            .get_mut(&id)
            .ok_or(GraphError::Missing(Missing::Node { stage, id }))
    }

    fn missing(&self, id: NodeId) -> GraphError {
        GraphError::Missing(Missing::Node {
            stage: self.stage,
            id,
        })
    }

    /// Drop edges of `id` whose ports vanished or changed type
    fn prune_edges_of(&mut self, id: NodeId) -> usize {
        let before = self.connections.len();
        let kept: Vec<Connection> = self
            .connections
            .iter()
            .copied()
            .filter(|c| !c.involves_node(id) || validation::edge_is_sound(self, c))
            .collect();
        self.connections = kept;
        before - self.connections.len()
    }
}

/// A visual shader: mode, render settings and three stage graphs.
#[derive(Debug)]
pub struct ShaderGraph {
    mode: ShaderMode,
    render_modes: IndexMap<String, usize>,
    flags: IndexSet<String>,
    graph_offset: [f32; 2],
    stages: [StageGraph; 3],
    dirty: bool,
    cache: Option<CompiledShader>,
}

impl ShaderGraph {
    /// Create an empty shader with an output node in every stage
    pub fn new(mode: ShaderMode) -> Self {
        Self {
            mode,
            render_modes: IndexMap::new(),
            flags: IndexSet::new(),
            graph_offset: [0.0, 0.0],
            stages: Stage::ALL.map(|stage| StageGraph::new(stage, mode)),
            dirty: true,
            cache: None,
        }
    }

    /// Current shader mode
    pub fn mode(&self) -> ShaderMode {
        self.mode
    }

    /// Change the shader mode.
    ///
    /// Render modes and flags are cleared, and every edge touching an input
    /// or output node is removed since their port sets depend on the mode.
    pub fn set_mode(&mut self, mode: ShaderMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.render_modes.clear();
        self.flags.clear();

        let mut dropped = 0;
        for graph in &mut self.stages {
            let io: HashSet<NodeId> = graph
                .nodes
                .iter()
                .filter(|(_, n)| {
                    matches!(n.node.category(), NodeCategory::Input | NodeCategory::Output)
                })
                .map(|(id, _)| *id)
                .collect();
            let before = graph.connections.len();
            graph
                .connections
                .retain(|c| !io.contains(&c.from_node) && !io.contains(&c.to_node));
            dropped += before - graph.connections.len();

            let stage = graph.stage;
            for n in graph.nodes.values_mut() {
                n.node.bind(mode, stage);
            }
        }
        tracing::debug!(%mode, dropped, "Shader mode changed");
        self.mark_dirty();
    }

    /// Stage graph
    pub fn stage(&self, stage: Stage) -> &StageGraph {
        &self.stages[stage.index()]
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut StageGraph {
        &mut self.stages[stage.index()]
    }

    /// Get a node
    pub fn node(&self, stage: Stage, id: NodeId) -> Option<&dyn ShaderNode> {
        self.stage(stage).node(id)
    }

    /// Node IDs of a stage in insertion order, output node included
    pub fn node_list(&self, stage: Stage) -> Vec<NodeId> {
        self.stage(stage).node_ids().collect()
    }

    /// Smallest id greater than any id ever used in the stage (at least 2)
    pub fn find_valid_id(&self, stage: Stage) -> NodeId {
        self.stage(stage).find_valid_id()
    }

    /// Insert a node under a caller-chosen id
    pub fn add_node(
        &mut self,
        stage: Stage,
        mut node: Box<dyn ShaderNode>,
        id: NodeId,
        position: [f32; 2],
    ) -> Result<(), GraphError> {
        if id < FIRST_USER_NODE_ID {
            return Err(GraphError::ProtectedNode(id));
        }
        if self.stage(stage).has_node(id) {
            return Err(GraphError::IdInUse { stage, id });
        }
        if !node.is_permitted(self.mode, stage) {
            return Err(GraphError::InvalidMode {
                what: node.kind().to_string(),
                mode: self.mode,
            });
        }

        node.bind(self.mode, stage);
        if let Some(current) = node.uniform_name().map(str::to_string) {
            let taken = self.uniform_names(None);
            let wanted = unique_uniform_name(
                &sanitize_uniform_name(&current),
                taken.iter().map(String::as_str),
            );
            if wanted != current {
                node::apply_param(node.as_mut(), UNIFORM_NAME_PARAM, &ParamValue::Text(wanted))?;
            }
        }

        tracing::debug!(%stage, id, kind = node.kind(), "Added node");
        let graph = self.stage_mut(stage);
        graph.nodes.insert(id, GraphNode::new(node, position));
        graph.last_id = graph.last_id.max(id);
        self.mark_dirty();
        Ok(())
    }

    /// Create a node through the registry and insert it
    pub fn add_node_of_kind(
        &mut self,
        registry: &NodeRegistry,
        stage: Stage,
        kind: &str,
        params: &ParamBag,
        id: NodeId,
        position: [f32; 2],
    ) -> Result<(), GraphError> {
        let node = registry.instantiate(kind, params)?;
        self.add_node(stage, node, id, position)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, stage: Stage, id: NodeId) -> Result<Box<dyn ShaderNode>, GraphError> {
        if id == OUTPUT_NODE_ID {
            return Err(GraphError::ProtectedNode(id));
        }
        let graph = self.stage_mut(stage);
        let Some(removed) = graph.nodes.shift_remove(&id) else {
            return Err(graph.missing(id));
        };
        graph.connections.retain(|c| !c.involves_node(id));
        tracing::debug!(%stage, id, "Removed node");
        self.mark_dirty();
        Ok(removed.node)
    }

    /// Set a node's editor position
    pub fn set_node_position(
        &mut self,
        stage: Stage,
        id: NodeId,
        position: [f32; 2],
    ) -> Result<(), GraphError> {
        self.stage_mut(stage).node_mut(id)?.position = position;
        Ok(())
    }

    /// Get a node's editor position
    pub fn node_position(&self, stage: Stage, id: NodeId) -> Option<[f32; 2]> {
        self.stage(stage).graph_node(id).map(|n| n.position)
    }

    /// Current value of a node parameter
    pub fn node_param(&self, stage: Stage, id: NodeId, name: &str) -> Option<ParamValue> {
        self.node(stage, id).and_then(|n| n.param(name))
    }

    /// Change a node parameter.
    ///
    /// Uniform names are sanitised and made unique. Edges whose ports no
    /// longer exist or no longer type-check are dropped.
    pub fn set_node_param(
        &mut self,
        stage: Stage,
        id: NodeId,
        name: &str,
        value: ParamValue,
    ) -> Result<(), GraphError> {
        if !self.stage(stage).has_node(id) {
            return Err(self.stage(stage).missing(id));
        }
        let value = match value {
            ParamValue::Text(text) if name == UNIFORM_NAME_PARAM => {
                let taken = self.uniform_names(Some((stage, id)));
                ParamValue::Text(unique_uniform_name(
                    &sanitize_uniform_name(&text),
                    taken.iter().map(String::as_str),
                ))
            }
            other => other,
        };

        let mode = self.mode;
        let graph = self.stage_mut(stage);
        let entry = graph.node_mut(id)?;
        node::apply_param(entry.node.as_mut(), name, &value)?;
        entry.node.bind(mode, stage);
        entry.prune_defaults();
        let dropped = graph.prune_edges_of(id);
        if dropped > 0 {
            tracing::debug!(%stage, id, dropped, "Dropped edges after parameter change");
        }
        self.mark_dirty();
        Ok(())
    }

    /// Override the default of one input port of a node
    pub fn set_input_default(
        &mut self,
        stage: Stage,
        id: NodeId,
        port: usize,
        value: DefaultValue,
    ) -> Result<(), GraphError> {
        let entry = self.stage_mut(stage).node_mut(id)?;
        let Some(schema) = entry.node.port(PortDirection::Input, port) else {
            return Err(GraphError::Missing(Missing::Port {
                id,
                direction: PortDirection::Input,
                port,
            }));
        };
        if schema.port_type != value.port_type() {
            return Err(GraphError::TypeMismatch {
                from: value.port_type(),
                to: schema.port_type,
            });
        }
        value.encode()?;
        entry.input_defaults.insert(port, value);
        self.mark_dirty();
        Ok(())
    }

    /// Remove an input default override
    pub fn clear_input_default(&mut self, stage: Stage, id: NodeId, port: usize) {
        let removed = self
            .stage_mut(stage)
            .nodes
            .get_mut(&id)
            .and_then(|n| n.input_defaults.shift_remove(&port));
        if removed.is_some() {
            self.mark_dirty();
        }
    }

    /// Effective default of an input port
    pub fn input_default(&self, stage: Stage, id: NodeId, port: usize) -> Option<DefaultValue> {
        self.stage(stage).graph_node(id)?.input_default(port)
    }

    /// Connect two ports through the validator
    pub fn connect_nodes(
        &mut self,
        stage: Stage,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> Result<(), GraphError> {
        let c = Connection::new(from, from_port, to, to_port);
        if let Err(e) = validation::validate_connection(self.stage(stage), &c) {
            tracing::warn!(%stage, from, from_port, to, to_port, "Rejected connection: {e}");
            return Err(e);
        }
        self.stage_mut(stage).connections.push(c);
        tracing::debug!(%stage, from, from_port, to, to_port, "Connected");
        self.mark_dirty();
        Ok(())
    }

    /// Dry-run of [`ShaderGraph::connect_nodes`]
    pub fn can_connect_nodes(
        &self,
        stage: Stage,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> bool {
        let c = Connection::new(from, from_port, to, to_port);
        validation::validate_connection(self.stage(stage), &c).is_ok()
    }

    /// Check whether exactly this edge exists
    pub fn is_node_connection(
        &self,
        stage: Stage,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> bool {
        let c = Connection::new(from, from_port, to, to_port);
        self.stage(stage).connections.contains(&c)
    }

    /// Remove an edge, returning it when it existed
    pub fn disconnect_nodes(
        &mut self,
        stage: Stage,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> Option<Connection> {
        let c = Connection::new(from, from_port, to, to_port);
        let graph = self.stage_mut(stage);
        let index = graph.connections.iter().position(|e| *e == c)?;
        let removed = graph.connections.remove(index);
        tracing::debug!(%stage, from, from_port, to, to_port, "Disconnected");
        self.mark_dirty();
        Some(removed)
    }

    /// Connect without type or cycle checks.
    ///
    /// Only the loader uses this, to bring back files saved by older
    /// versions whose edges no longer pass validation. Nodes and port
    /// indices must still exist; an existing edge into the same input is
    /// replaced. Problems left behind surface as compile diagnostics.
    pub(crate) fn connect_nodes_forced(
        &mut self,
        stage: Stage,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> Result<(), GraphError> {
        let c = Connection::new(from, from_port, to, to_port);
        validation::check_endpoints(self.stage(stage), &c)?;
        let graph = self.stage_mut(stage);
        graph.connections.retain(|e| !e.feeds(to, to_port));
        graph.connections.push(c);
        if let Err(e) = validation::validate_types(self.stage(stage), &c) {
            tracing::warn!(%stage, from, from_port, to, to_port, "Forced connection does not validate: {e}");
        }
        self.mark_dirty();
        Ok(())
    }

    /// All edges of a stage
    pub fn node_connections(&self, stage: Stage) -> &[Connection] {
        self.stage(stage).connections()
    }

    /// Chosen enumerated render modes (group name to option index)
    pub fn render_modes(&self) -> &IndexMap<String, usize> {
        &self.render_modes
    }

    /// Choose an option of an enumerated render mode
    pub fn set_render_mode(&mut self, group: &str, option: usize) -> Result<(), GraphError> {
        let valid = self
            .mode
            .render_mode_enum(group)
            .is_some_and(|e| option < e.options.len());
        if !valid {
            return Err(GraphError::InvalidMode {
                what: format!("{group}[{option}]"),
                mode: self.mode,
            });
        }
        self.render_modes.insert(group.to_string(), option);
        self.mark_dirty();
        Ok(())
    }

    /// Forget an enumerated render mode choice
    pub fn clear_render_mode(&mut self, group: &str) {
        if self.render_modes.shift_remove(group).is_some() {
            self.mark_dirty();
        }
    }

    /// Enabled render flags
    pub fn flags(&self) -> &IndexSet<String> {
        &self.flags
    }

    /// Enable or disable a render flag
    pub fn set_flag(&mut self, flag: &str, enabled: bool) -> Result<(), GraphError> {
        if !self.mode.render_flags().contains(&flag) {
            return Err(GraphError::InvalidMode {
                what: flag.to_string(),
                mode: self.mode,
            });
        }
        let changed = if enabled {
            self.flags.insert(flag.to_string())
        } else {
            self.flags.shift_remove(flag)
        };
        if changed {
            self.mark_dirty();
        }
        Ok(())
    }

    /// Editor scroll offset (opaque to the core)
    pub fn graph_offset(&self) -> [f32; 2] {
        self.graph_offset
    }

    /// Set the editor scroll offset
    pub fn set_graph_offset(&mut self, offset: [f32; 2]) {
        self.graph_offset = offset;
    }

    /// Whether the cached compile is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Compiled shader, recompiled first when the graph changed
    pub fn code(&mut self) -> &CompiledShader {
        if self.dirty || self.cache.is_none() {
            self.cache = Some(compiler::compile(self));
            self.dirty = false;
        }
        // populated just above
        self.cache.get_or_insert_with(CompiledShader::default)
    }

    /// Compile from scratch and return the result
    pub fn rebuild(&mut self) -> CompiledShader {
        self.dirty = true;
        self.code().clone()
    }

    /// Compile a preview of one output port
    pub fn generate_preview(&self, stage: Stage, id: NodeId, port: usize) -> Option<CompiledShader> {
        preview::generate_preview(self, stage, id, port)
    }

    /// Diagnostics of the last compile located at a node
    pub fn node_warnings(&self, stage: Stage, id: NodeId) -> Vec<Diagnostic> {
        self.cache
            .as_ref()
            .map(|c| c.diagnostics_for(stage, id).cloned().collect())
            .unwrap_or_default()
    }

    /// Uniform names in use across all stages, optionally skipping one node
    fn uniform_names(&self, skip: Option<(Stage, NodeId)>) -> Vec<String> {
        let mut names = Vec::new();
        for graph in &self.stages {
            for (id, n) in &graph.nodes {
                if skip == Some((graph.stage, *id)) {
                    continue;
                }
                if let Some(name) = n.node.uniform_name() {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

impl Default for ShaderGraph {
    fn default() -> Self {
        Self::new(ShaderMode::default())
    }
}

impl PartialEq for ShaderGraph {
    /// Structural equality: mode, render settings, offset, and per stage the
    /// nodes (kind, parameters, position, in id order) and the edge set.
    fn eq(&self, other: &Self) -> bool {
        if self.mode != other.mode
            || self.render_modes != other.render_modes
            || self.flags != other.flags
            || self.graph_offset != other.graph_offset
        {
            return false;
        }
        self.stages.iter().zip(&other.stages).all(|(a, b)| {
            let mut ids_a: Vec<NodeId> = a.node_ids().collect();
            let mut ids_b: Vec<NodeId> = b.node_ids().collect();
            ids_a.sort_unstable();
            ids_b.sort_unstable();
            if ids_a != ids_b {
                return false;
            }
            let nodes_equal = ids_a.iter().all(|id| match (a.graph_node(*id), b.graph_node(*id)) {
                (Some(x), Some(y)) => {
                    x.node.kind() == y.node.kind()
                        && x.node.params() == y.node.params()
                        && x.position == y.position
                        && x.input_defaults == y.input_defaults
                }
                _ => false,
            });
            let mut edges_a = a.connections.clone();
            let mut edges_b = b.connections.clone();
            edges_a.sort_unstable();
            edges_b.sort_unstable();
            nodes_equal && edges_a == edges_b
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::constant::ScalarConstant;
    use crate::nodes::operator::{ScalarOp, ScalarOperator};

    fn scalar(value: f32) -> Box<dyn ShaderNode> {
        Box::new(ScalarConstant::new(value))
    }

    fn add() -> Box<dyn ShaderNode> {
        Box::new(ScalarOp::new(ScalarOperator::Add))
    }

    #[test]
    fn test_output_node_exists() {
        let graph = ShaderGraph::new(ShaderMode::Spatial);
        for stage in Stage::ALL {
            assert_eq!(graph.node_list(stage), vec![OUTPUT_NODE_ID]);
            assert_eq!(graph.find_valid_id(stage), 2);
        }
    }

    #[test]
    fn test_add_and_remove() {
        let mut graph = ShaderGraph::default();
        graph.add_node(Stage::Fragment, scalar(1.0), 2, [0.0, 0.0]).unwrap();
        graph.add_node(Stage::Fragment, add(), 7, [10.0, 0.0]).unwrap();
        assert_eq!(graph.find_valid_id(Stage::Fragment), 8);

        assert!(matches!(
            graph.add_node(Stage::Fragment, scalar(1.0), 2, [0.0, 0.0]),
            Err(GraphError::IdInUse { id: 2, .. })
        ));
        assert!(matches!(
            graph.add_node(Stage::Fragment, scalar(1.0), 1, [0.0, 0.0]),
            Err(GraphError::ProtectedNode(1))
        ));

        graph.connect_nodes(Stage::Fragment, 2, 0, 7, 0).unwrap();
        graph.remove_node(Stage::Fragment, 2).unwrap();
        assert!(graph.node_connections(Stage::Fragment).is_empty());
        // ids are not recycled
        assert_eq!(graph.find_valid_id(Stage::Fragment), 8);
    }

    #[test]
    fn test_output_node_is_protected() {
        let mut graph = ShaderGraph::default();
        assert!(matches!(
            graph.remove_node(Stage::Vertex, OUTPUT_NODE_ID),
            Err(GraphError::ProtectedNode(0))
        ));
        assert!(graph.node(Stage::Vertex, OUTPUT_NODE_ID).is_some());
    }

    #[test]
    fn test_disconnect() {
        let mut graph = ShaderGraph::default();
        graph.add_node(Stage::Fragment, scalar(1.0), 2, [0.0, 0.0]).unwrap();
        graph.add_node(Stage::Fragment, add(), 3, [0.0, 0.0]).unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 1).unwrap();
        assert!(graph.is_node_connection(Stage::Fragment, 2, 0, 3, 1));
        assert!(graph.disconnect_nodes(Stage::Fragment, 2, 0, 3, 1).is_some());
        assert!(graph.disconnect_nodes(Stage::Fragment, 2, 0, 3, 1).is_none());
    }

    #[test]
    fn test_topological_tie_break() {
        let mut graph = ShaderGraph::default();
        for id in [5, 3, 4] {
            graph.add_node(Stage::Fragment, scalar(1.0), id, [0.0, 0.0]).unwrap();
        }
        graph.add_node(Stage::Fragment, add(), 2, [0.0, 0.0]).unwrap();
        graph.connect_nodes(Stage::Fragment, 5, 0, 2, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, 2, 1).unwrap();
        // alpha port of the spatial fragment output
        graph.connect_nodes(Stage::Fragment, 2, 0, OUTPUT_NODE_ID, 1).unwrap();
        graph.connect_nodes(Stage::Fragment, 4, 0, OUTPUT_NODE_ID, 2).unwrap();

        let order = graph
            .stage(Stage::Fragment)
            .topological_order_from(OUTPUT_NODE_ID)
            .unwrap();
        assert_eq!(order, vec![3, 4, 5, 2, 0]);
    }

    #[test]
    fn test_forced_cycle_is_reported_by_ordering() {
        let mut graph = ShaderGraph::default();
        graph.add_node(Stage::Fragment, add(), 2, [0.0, 0.0]).unwrap();
        graph.add_node(Stage::Fragment, add(), 3, [0.0, 0.0]).unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
        graph.connect_nodes_forced(Stage::Fragment, 3, 0, 2, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 1).unwrap();

        let err = graph
            .stage(Stage::Fragment)
            .topological_order_from(OUTPUT_NODE_ID)
            .unwrap_err();
        assert_eq!(err, OrderError::Cycle(2));
    }

    #[test]
    fn test_cycle_blames_a_node_on_the_cycle() {
        let mut graph = ShaderGraph::default();
        for id in [2, 5, 6] {
            graph.add_node(Stage::Fragment, add(), id, [0.0, 0.0]).unwrap();
        }
        graph.connect_nodes(Stage::Fragment, 5, 0, 6, 0).unwrap();
        graph.connect_nodes_forced(Stage::Fragment, 6, 0, 5, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 6, 0, 2, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, OUTPUT_NODE_ID, 1).unwrap();

        // 0 and 2 are only downstream of the loop
        let err = graph
            .stage(Stage::Fragment)
            .topological_order_from(OUTPUT_NODE_ID)
            .unwrap_err();
        assert_eq!(err, OrderError::Cycle(5));
    }

    #[test]
    fn test_find_valid_id_after_largest_id() {
        let mut graph = ShaderGraph::default();
        graph.add_node(Stage::Fragment, scalar(1.0), 2, [0.0, 0.0]).unwrap();
        graph
            .add_node(Stage::Fragment, scalar(1.0), NodeId::MAX, [0.0, 0.0])
            .unwrap();
        assert_eq!(graph.find_valid_id(Stage::Fragment), 3);

        graph.add_node(Stage::Fragment, scalar(1.0), 3, [0.0, 0.0]).unwrap();
        assert_eq!(graph.find_valid_id(Stage::Fragment), 4);
        assert_eq!(graph.find_valid_id(Stage::Vertex), 2);
    }

    #[test]
    fn test_set_mode_drops_io_edges() {
        let mut graph = ShaderGraph::default();
        graph.add_node(Stage::Fragment, scalar(1.0), 2, [0.0, 0.0]).unwrap();
        graph.add_node(Stage::Fragment, add(), 3, [0.0, 0.0]).unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 1).unwrap();
        graph.set_flag("unshaded", true).unwrap();

        graph.set_mode(ShaderMode::CanvasItem);
        assert_eq!(
            graph.node_connections(Stage::Fragment),
            &[Connection::new(2, 0, 3, 0)]
        );
        assert!(graph.flags().is_empty());
        // canvas output ports are bound
        let output = graph.node(Stage::Fragment, OUTPUT_NODE_ID).unwrap();
        assert_eq!(output.port_name(PortDirection::Input, 0).as_deref(), Some("color"));
    }

    #[test]
    fn test_render_settings_validation() {
        let mut graph = ShaderGraph::new(ShaderMode::CanvasItem);
        assert!(graph.set_flag("light_only", true).is_ok());
        assert!(matches!(
            graph.set_flag("vertex_lighting", true),
            Err(GraphError::InvalidMode { .. })
        ));
        assert!(graph.set_render_mode("blend", 4).is_ok());
        assert!(graph.set_render_mode("blend", 6).is_err());
        assert!(graph.set_render_mode("cull", 0).is_err());
    }

    #[test]
    fn test_input_default_override() {
        let mut graph = ShaderGraph::default();
        graph.add_node(Stage::Fragment, add(), 2, [0.0, 0.0]).unwrap();
        assert_eq!(
            graph.input_default(Stage::Fragment, 2, 1),
            Some(DefaultValue::Scalar(0.0))
        );
        graph
            .set_input_default(Stage::Fragment, 2, 1, DefaultValue::Scalar(2.0))
            .unwrap();
        assert_eq!(
            graph.input_default(Stage::Fragment, 2, 1),
            Some(DefaultValue::Scalar(2.0))
        );
        assert!(matches!(
            graph.set_input_default(Stage::Fragment, 2, 1, DefaultValue::Boolean(true)),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            graph.set_input_default(Stage::Fragment, 2, 5, DefaultValue::Scalar(1.0)),
            Err(GraphError::Missing(Missing::Port { port: 5, .. }))
        ));
        assert!(matches!(
            graph.set_input_default(Stage::Fragment, 2, 0, DefaultValue::Scalar(f32::NAN)),
            Err(GraphError::Encode(_))
        ));
        graph.clear_input_default(Stage::Fragment, 2, 1);
        assert_eq!(
            graph.input_default(Stage::Fragment, 2, 1),
            Some(DefaultValue::Scalar(0.0))
        );
    }

    #[test]
    fn test_dirty_cache() {
        let mut graph = ShaderGraph::default();
        assert!(graph.is_dirty());
        let first = graph.code().source.clone();
        assert!(!graph.is_dirty());
        graph.add_node(Stage::Fragment, scalar(1.0), 2, [0.0, 0.0]).unwrap();
        assert!(graph.is_dirty());
        assert_eq!(graph.code().source, first); // unreachable node changes nothing
        assert!(!graph.is_dirty());
    }
}
