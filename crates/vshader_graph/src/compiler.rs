// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph compilation into shader text.
//!
//! Each stage is walked from its root in topological order. Every node gets
//! its inputs materialised as expressions (connected output variable, hint,
//! encoded default or empty) and its outputs declared as `n<id>_<port>`
//! before its body is pasted into a brace scope. File-scope code is collected
//! into shared, text-deduplicated buffers.
//!
//! A stage is staged in a [`StageDraft`] and committed only when every node
//! emitted; a failing stage contributes an empty body and an error
//! diagnostic, and never aborts the other stages.

use crate::connection::Connection;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::graph::{OrderError, ShaderGraph, StageGraph};
use crate::mode::{shader_header, Stage};
use crate::node::{output_var, NodeContext, NodeError, NodeId, OUTPUT_NODE_ID};
use crate::port::{PortDirection, PortType};
use crate::uniforms::{UniformBinding, UniformCollector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Result of a compile: the shader text plus what the host must bind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledShader {
    /// Complete shader text
    pub source: String,
    /// Textures and cube maps to bind, in emission order
    pub uniforms: Vec<UniformBinding>,
    /// Errors and warnings found while compiling
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledShader {
    /// True when no error diagnostic was produced
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Error diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Warning diagnostics
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Diagnostics located at a node
    pub fn diagnostics_for(&self, stage: Stage, id: NodeId) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.stage == Some(stage) && d.node == Some(id))
    }
}

/// Append-only text buffer that drops exact repeats
#[derive(Debug, Default)]
struct DedupBuffer {
    text: String,
    seen: HashSet<String>,
}

impl DedupBuffer {
    fn push(&mut self, chunk: String) {
        if !chunk.is_empty() && !self.seen.contains(&chunk) {
            self.text.push_str(&chunk);
            self.seen.insert(chunk);
        }
    }
}

/// Everything one stage would contribute, held back until it succeeds
#[derive(Debug, Default)]
struct StageDraft {
    body: String,
    declarations: Vec<String>,
    helpers: Vec<String>,
    prologues: Vec<(Stage, String)>,
    prologue_kinds: Vec<&'static str>,
    declared: Vec<(String, NodeId)>,
    bindings: Vec<(UniformBinding, NodeId)>,
    warnings: Vec<Diagnostic>,
}

/// One compilation pass over a graph
pub(crate) struct Session<'g> {
    graph: &'g ShaderGraph,
    preview: bool,
    declarations: DedupBuffer,
    helpers: DedupBuffer,
    prologues: [String; 3],
    prologue_kinds: HashSet<&'static str>,
    uniforms: UniformCollector,
    clashes: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> Session<'g> {
    pub(crate) fn new(graph: &'g ShaderGraph, preview: bool) -> Self {
        Self {
            graph,
            preview,
            declarations: DedupBuffer::default(),
            helpers: DedupBuffer::default(),
            prologues: Default::default(),
            prologue_kinds: HashSet::new(),
            uniforms: UniformCollector::default(),
            clashes: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    fn context(&self, stage: Stage, id: NodeId) -> NodeContext {
        let ctx = NodeContext::new(self.graph.mode(), stage, id);
        if self.preview {
            ctx.for_preview()
        } else {
            ctx
        }
    }

    /// Emit the closure of `root` in `stage`. Returns the body, or `None`
    /// after recording an error diagnostic.
    pub(crate) fn emit_stage(&mut self, stage: Stage, root: NodeId) -> Option<String> {
        match self.draft_stage(stage, root) {
            Ok(draft) => Some(self.commit(stage, draft)),
            Err(diagnostic) => {
                tracing::warn!(%stage, node = ?diagnostic.node, "Stage not emitted: {}", diagnostic.message);
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    fn draft_stage(&self, stage: Stage, root: NodeId) -> Result<StageDraft, Diagnostic> {
        let graph = self.graph.stage(stage);
        let order = graph
            .topological_order_from(root)
            .map_err(|e| order_diagnostic(stage, &e))?;

        let incoming: HashMap<(NodeId, usize), Connection> = graph
            .connections()
            .iter()
            .map(|c| ((c.to_node, c.to_port), *c))
            .collect();

        let mut draft = StageDraft::default();
        for id in order {
            self.emit_node(graph, stage, id, &incoming, &mut draft)?;
        }
        Ok(draft)
    }

    fn emit_node(
        &self,
        graph: &StageGraph,
        stage: Stage,
        id: NodeId,
        incoming: &HashMap<(NodeId, usize), Connection>,
        draft: &mut StageDraft,
    ) -> Result<(), Diagnostic> {
        let Some(node) = graph.node(id) else {
            return Err(Diagnostic::new(
                DiagnosticKind::DanglingEdge,
                format!("node {id} does not exist"),
            )
            .at(stage, Some(id)));
        };
        let mode = self.graph.mode();
        let ctx = self.context(stage, id);

        if !node.is_permitted(mode, stage) {
            return Err(Diagnostic::new(
                DiagnosticKind::InvalidMode,
                format!("{} is not available in the {stage} stage of {mode} shaders", node.caption()),
            )
            .at(stage, Some(id)));
        }
        if node.is_global_only() {
            return Ok(());
        }

        let inputs = self.materialize_inputs(graph, &ctx, incoming)?;

        // file scope
        draft.declarations.push(node.global_declarations(&ctx));
        draft.helpers.push(node.per_node_globals(&ctx));
        if !self.preview
            && !self.prologue_kinds.contains(node.kind())
            && !draft.prologue_kinds.contains(&node.kind())
        {
            for function in Stage::ALL {
                draft
                    .prologues
                    .push((function, node.per_function_prologue(&ctx, function)));
            }
            draft.prologue_kinds.push(node.kind());
        }
        if let Some(name) = node.uniform_name() {
            draft.declared.push((name.to_string(), id));
        }
        for binding in node.uniform_bindings(&ctx) {
            draft.bindings.push((binding, id));
        }

        if let Some(warning) = node.warning(mode, stage) {
            draft
                .warnings
                .push(Diagnostic::new(DiagnosticKind::NodeWarning, warning).at(stage, Some(id)));
        }
        if let Some(reason) = node.stage_restriction(&ctx) {
            tracing::warn!(%stage, id, "Placeholder emitted: {reason}");
            draft
                .warnings
                .push(Diagnostic::new(DiagnosticKind::StageRestriction, reason).at(stage, Some(id)));
        }

        // locals
        let mut locals = String::new();
        let mut outputs = Vec::new();
        for (k, port) in node.outputs().iter().enumerate() {
            if port.port_type.is_sampler() {
                outputs.push(String::new());
                continue;
            }
            let var = output_var(id, k);
            locals.push_str(&format!("\t{} {};\n", port.port_type.glsl_type(), var));
            outputs.push(var);
        }

        let code = node.generate_body(&ctx, &inputs, &outputs).map_err(|e| {
            let kind = match e {
                NodeError::Encode(_) => DiagnosticKind::Encode,
                NodeError::Message(_) => DiagnosticKind::NodeError,
            };
            Diagnostic::new(kind, format!("{}: {}", node.caption(), e)).at(stage, Some(id))
        })?;
        if locals.is_empty() && code.is_empty() {
            return Ok(());
        }

        let body = &mut draft.body;
        body.push_str(&format!("\t// {}:{}\n", node.caption(), id));
        body.push_str(&locals);
        if !code.is_empty() {
            body.push_str("\t{\n");
            for line in code.lines() {
                if line.is_empty() {
                    body.push('\n');
                } else {
                    body.push_str("\t\t");
                    body.push_str(line);
                    body.push('\n');
                }
            }
            body.push_str("\t}\n");
        }

        tracing::trace!(%stage, id, kind = node.kind(), "Emitted node");
        Ok(())
    }

    /// One expression per input port
    fn materialize_inputs(
        &self,
        graph: &StageGraph,
        ctx: &NodeContext,
        incoming: &HashMap<(NodeId, usize), Connection>,
    ) -> Result<Vec<String>, Diagnostic> {
        let stage = ctx.stage;
        let mut exprs = Vec::new();
        let Some(entry) = graph.graph_node(ctx.id) else {
            return Ok(exprs);
        };
        let node = entry.node();

        for (i, port) in node.inputs().into_iter().enumerate() {
            if let Some(c) = incoming.get(&(ctx.id, i)) {
                let source = graph.node(c.from_node);
                let from_type = source.and_then(|n| n.port_type(PortDirection::Output, c.from_port));
                let (Some(source), Some(from_type)) = (source, from_type) else {
                    return Err(Diagnostic::new(
                        DiagnosticKind::DanglingEdge,
                        format!("input {} reads from a missing node or port", port.name),
                    )
                    .at(stage, Some(ctx.id)));
                };
                if !port.accepts(from_type) {
                    return Err(Diagnostic::new(
                        DiagnosticKind::TypeMismatch,
                        format!(
                            "input {} cannot read a {} from node {}",
                            port.name,
                            from_type.glsl_type(),
                            c.from_node
                        ),
                    )
                    .at(stage, Some(ctx.id)));
                }

                let expr = if from_type.is_sampler() {
                    let source_ctx = self.context(stage, c.from_node);
                    source
                        .sampler_name(&source_ctx, c.from_port)
                        .unwrap_or_default()
                } else {
                    let var = output_var(c.from_node, c.from_port);
                    if from_type == PortType::Scalar && port.port_type == PortType::Vector3 {
                        format!("vec3({var})")
                    } else {
                        var
                    }
                };
                exprs.push(expr);
            } else if let Some(hint) = port.hint.as_ref().filter(|h| h.applies_to(stage)) {
                exprs.push(hint.expr.clone());
            } else if let Some(default) = entry.input_default(i) {
                let literal = default.encode().map_err(|e| {
                    Diagnostic::new(DiagnosticKind::Encode, format!("input {}: {e}", port.name))
                        .at(stage, Some(ctx.id))
                })?;
                exprs.push(literal);
            } else {
                exprs.push(String::new());
            }
        }
        Ok(exprs)
    }

    fn commit(&mut self, stage: Stage, draft: StageDraft) -> String {
        for chunk in draft.declarations {
            self.declarations.push(chunk);
        }
        for chunk in draft.helpers {
            self.helpers.push(chunk);
        }
        for (function, chunk) in draft.prologues {
            self.prologues[function.index()].push_str(&chunk);
        }
        self.prologue_kinds.extend(draft.prologue_kinds);

        for (name, id) in draft.declared {
            if let Err((owner_stage, owner)) = self.uniforms.declare(&name, stage, id) {
                self.report_clash(&name, stage, id, owner_stage, owner);
            }
        }
        for (binding, id) in draft.bindings {
            let name = binding.name.clone();
            if let Err((owner_stage, owner)) = self.uniforms.bind(binding, stage, id) {
                self.report_clash(&name, stage, id, owner_stage, owner);
            }
        }
        self.diagnostics.extend(draft.warnings);
        draft.body
    }

    fn report_clash(&mut self, name: &str, stage: Stage, id: NodeId, owner_stage: Stage, owner: NodeId) {
        if !self.clashes.insert(format!("{name}@{stage}:{id}")) {
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::DuplicateUniform,
                format!("uniform `{name}` is already declared by node {owner} in the {owner_stage} stage"),
            )
            .at(stage, Some(id)),
        );
    }

    /// Global expression nodes of every stage, in stage then id order
    pub(crate) fn global_expressions(&self) -> String {
        let mut out = String::new();
        for stage in Stage::ALL {
            let graph = self.graph.stage(stage);
            let mut ids: Vec<NodeId> = graph
                .node_ids()
                .filter(|id| graph.node(*id).is_some_and(|n| n.is_global_only()))
                .collect();
            ids.sort_unstable();
            for id in ids {
                let Some(node) = graph.node(id) else { continue };
                let ctx = self.context(stage, id);
                out.push_str(&format!("// {}:{}\n", node.caption(), id));
                out.push_str(&node.global_declarations(&ctx));
                out.push('\n');
            }
        }
        out
    }

    /// File-scope section: declarations, helpers, global expressions
    pub(crate) fn file_scope(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.declarations.text);
        out.push_str(&self.helpers.text);
        out.push_str(&self.global_expressions());
        out
    }

    pub(crate) fn prologue(&self, function: Stage) -> &str {
        &self.prologues[function.index()]
    }

    pub(crate) fn finish(self, source: String) -> CompiledShader {
        CompiledShader {
            source,
            uniforms: self.uniforms.finish(),
            diagnostics: self.diagnostics,
        }
    }
}

fn order_diagnostic(stage: Stage, error: &OrderError) -> Diagnostic {
    match error {
        OrderError::Cycle(id) => {
            Diagnostic::new(DiagnosticKind::Cycle, error.to_string()).at(stage, Some(*id))
        }
        OrderError::Dangling(c) => {
            Diagnostic::new(DiagnosticKind::DanglingEdge, error.to_string()).at(stage, Some(c.to_node))
        }
    }
}

/// Compile every stage of a graph
pub fn compile(graph: &ShaderGraph) -> CompiledShader {
    let mut session = Session::new(graph, false);
    let bodies = Stage::ALL.map(|stage| session.emit_stage(stage, OUTPUT_NODE_ID).unwrap_or_default());

    let mut source = shader_header(graph.mode(), graph.render_modes(), graph.flags());
    source.push_str(&session.file_scope());
    for (stage, body) in Stage::ALL.into_iter().zip(bodies) {
        source.push_str(&format!("\nvoid {}() {{\n", stage.name()));
        source.push_str(session.prologue(stage));
        source.push_str(&body);
        source.push_str("}\n");
    }

    let compiled = session.finish(source);
    tracing::info!(
        bytes = compiled.source.len(),
        uniforms = compiled.uniforms.len(),
        errors = compiled.errors().count(),
        "Compiled shader"
    );
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ShaderMode;
    use crate::nodes::constant::ScalarConstant;
    use crate::nodes::operator::{ScalarOp, ScalarOperator};

    #[test]
    fn test_empty_graph() {
        let graph = ShaderGraph::new(ShaderMode::Spatial);
        let compiled = compile(&graph);
        assert_eq!(
            compiled.source,
            "shader_type spatial;\n\n\nvoid vertex() {\n}\n\nvoid fragment() {\n}\n\nvoid light() {\n}\n"
        );
        assert!(compiled.is_ok());
        assert!(compiled.uniforms.is_empty());
    }

    #[test]
    fn test_node_block_layout() {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        graph
            .add_node(Stage::Fragment, Box::new(ScalarConstant::new(0.5)), 2, [0.0, 0.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(ScalarOp::new(ScalarOperator::Mul)), 3, [0.0, 0.0])
            .unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 1).unwrap();

        let source = compile(&graph).source;
        assert!(source.contains(
            "\t// ScalarOp:3\n\tfloat n3_0;\n\t{\n\t\tn3_0 = n2_0 * 0.000000;\n\t}\n"
        ));
        let constant = source.find("n2_0 = 0.500000;").unwrap();
        let op = source.find("n3_0 = n2_0").unwrap();
        assert!(constant < op);
    }

    #[test]
    fn test_failing_stage_is_isolated() {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        graph
            .add_node(Stage::Fragment, Box::new(ScalarOp::new(ScalarOperator::Add)), 2, [0.0, 0.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(ScalarOp::new(ScalarOperator::Add)), 3, [0.0, 0.0])
            .unwrap();
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
        graph.connect_nodes_forced(Stage::Fragment, 3, 0, 2, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, OUTPUT_NODE_ID, 1).unwrap();
        graph
            .add_node(Stage::Vertex, Box::new(ScalarConstant::new(1.0)), 2, [0.0, 0.0])
            .unwrap();
        graph.connect_nodes(Stage::Vertex, 2, 0, OUTPUT_NODE_ID, 3).unwrap();

        let compiled = compile(&graph);
        assert!(!compiled.is_ok());
        let error = compiled.errors().next().unwrap();
        assert_eq!(error.kind, DiagnosticKind::Cycle);
        assert_eq!(error.stage, Some(Stage::Fragment));
        assert!(compiled.source.contains("void fragment() {\n}\n"));
        assert!(compiled.source.contains("n2_0 = 1.000000;"));
    }
}
