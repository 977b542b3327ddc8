// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error and diagnostic types.

use crate::mode::{ShaderMode, Stage};
use crate::node::NodeId;
use crate::params::ParamError;
use crate::port::{PortDirection, PortType};
use crate::value::EncodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something an edit referred to that does not exist
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Missing {
    /// Node id not present in the stage
    #[error("node {id} does not exist in the {stage} stage")]
    Node {
        /// Stage searched
        stage: Stage,
        /// Requested id
        id: NodeId,
    },

    /// Port index out of range
    #[error("node {id} has no {direction:?} port {port}")]
    Port {
        /// Node id
        id: NodeId,
        /// Port direction
        direction: PortDirection,
        /// Requested index
        port: usize,
    },

    /// No such connection
    #[error("no connection {from}:{from_port} -> {to}:{to_port}")]
    Connection {
        /// Source node
        from: NodeId,
        /// Source port
        from_port: usize,
        /// Target node
        to: NodeId,
        /// Target port
        to_port: usize,
    },

    /// Registry has no such node kind
    #[error("unknown node kind `{0}`")]
    Kind(String),
}

/// Error returned by graph edits. A failed edit leaves the graph unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Connect would create a cycle
    #[error("connecting {from} -> {to} would create a cycle")]
    Cycle {
        /// Source node
        from: NodeId,
        /// Target node
        to: NodeId,
    },

    /// Port types are incompatible
    #[error("cannot connect a {from:?} output to a {to:?} input")]
    TypeMismatch {
        /// Output type
        from: PortType,
        /// Input type
        to: PortType,
    },

    /// Target input already has an incoming edge
    #[error("input port {port} of node {id} is already connected")]
    AlreadyConnected {
        /// Target node
        id: NodeId,
        /// Target port
        port: usize,
    },

    /// Node, port, connection or kind does not exist
    #[error(transparent)]
    Missing(#[from] Missing),

    /// Node kind, render mode or flag not permitted in the current mode
    #[error("`{what}` is not permitted in {mode} mode")]
    InvalidMode {
        /// What was rejected
        what: String,
        /// Current mode
        mode: ShaderMode,
    },

    /// Default value could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Two uniforms share a name
    #[error("uniform `{0}` is declared more than once")]
    DuplicateUniform(String),

    /// The output node or a reserved id was targeted
    #[error("node id {0} is reserved")]
    ProtectedNode(NodeId),

    /// Id already taken in the stage
    #[error("node id {id} is already used in the {stage} stage")]
    IdInUse {
        /// Stage
        stage: Stage,
        /// Id
        id: NodeId,
    },

    /// Parameter bag rejected
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Severity of a compile diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The affected stage was not emitted
    Error,
    /// Output was produced, possibly with placeholders
    Warning,
}

/// Category of a compile diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// The stage graph contains a cycle
    Cycle,
    /// An edge references a missing node or port
    DanglingEdge,
    /// An edge joins incompatible ports
    TypeMismatch,
    /// Two uniforms share a name
    DuplicateUniform,
    /// Node kind not permitted in the current mode or stage
    InvalidMode,
    /// A default value could not be encoded
    Encode,
    /// A node refused to generate code
    NodeError,
    /// A node emitted a placeholder instead of an unavailable built-in
    StageRestriction,
    /// Informational warning reported by a node
    NodeWarning,
}

impl DiagnosticKind {
    /// Severity attached to this kind
    pub fn severity(self) -> Severity {
        match self {
            Self::StageRestriction | Self::NodeWarning => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A compile diagnostic, optionally located at a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Category
    pub kind: DiagnosticKind,
    /// Stage, when known
    pub stage: Option<Stage>,
    /// Node, when known
    pub node: Option<NodeId>,
    /// Human readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with the severity implied by `kind`
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            stage: None,
            node: None,
            message: message.into(),
        }
    }

    /// Attach a location
    pub fn at(mut self, stage: Stage, node: Option<NodeId>) -> Self {
        self.stage = Some(stage);
        self.node = node;
        self
    }

    /// Whether this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stage, self.node) {
            (Some(stage), Some(node)) => write!(f, "[{stage} node {node}] ")?,
            (Some(stage), None) => write!(f, "[{stage}] ")?,
            _ => {}
        }
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_kind() {
        assert!(Diagnostic::new(DiagnosticKind::Cycle, "loop").is_error());
        assert!(!Diagnostic::new(DiagnosticKind::StageRestriction, "depth").is_error());
        assert_eq!(DiagnosticKind::NodeWarning.severity(), Severity::Warning);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(DiagnosticKind::NodeError, "bad").at(Stage::Light, Some(4));
        assert_eq!(d.to_string(), "[light node 4] NodeError: bad");
        assert_eq!(Diagnostic::new(DiagnosticKind::Cycle, "x").to_string(), "Cycle: x");
    }
}
