// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual shader graphs compiled to GLSL-style shader text.
//!
//! A [`ShaderGraph`] holds one directed acyclic node graph per shader stage
//! (vertex, fragment, light). Nodes expose typed ports and generate code
//! fragments; the compiler walks each stage from its output node and stitches
//! those fragments into a single shader source plus a list of texture
//! uniforms the host must bind.
//!
//! ## Architecture
//!
//! - Typed ports with scalar to vector broadcast
//! - Connection validation (types, single incoming edge, acyclicity)
//! - Per-stage compilation with file-scope deduplication
//! - Single-port previews and a line-oriented save format

pub mod compiler;
pub mod connection;
pub mod error;
pub mod graph;
pub mod mode;
pub mod node;
pub mod nodes;
pub mod params;
pub mod persistence;
pub mod port;
pub mod preview;
pub mod registry;
pub mod uniforms;
pub mod validation;
pub mod value;

pub use compiler::{compile, CompiledShader};
pub use connection::Connection;
pub use error::{Diagnostic, DiagnosticKind, GraphError, Missing, Severity};
pub use graph::{ShaderGraph, StageGraph};
pub use mode::{ShaderMode, Stage};
pub use node::{NodeCategory, NodeContext, NodeError, NodeId, ShaderNode, OUTPUT_NODE_ID};
pub use params::{ParamBag, ParamError, ParamValue, ResourceHandle};
pub use persistence::{load, save, LoadError};
pub use port::{Port, PortDirection, PortType};
pub use registry::{create_shader_registry, NodeRegistry, NodeType};
pub use uniforms::UniformBinding;
pub use value::{DefaultValue, EncodeError, Transform};
