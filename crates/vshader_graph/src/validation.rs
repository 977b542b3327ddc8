// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection validation.

use crate::connection::Connection;
use crate::error::{GraphError, Missing};
use crate::graph::StageGraph;
use crate::node::NodeId;
use crate::port::PortDirection;
use std::collections::HashSet;

/// Check that both nodes exist and both port indices are in range
pub fn check_endpoints(graph: &StageGraph, c: &Connection) -> Result<(), GraphError> {
    let stage = graph.stage();
    let source = graph.node(c.from_node).ok_or(Missing::Node {
        stage,
        id: c.from_node,
    })?;
    let target = graph.node(c.to_node).ok_or(Missing::Node {
        stage,
        id: c.to_node,
    })?;

    if c.from_port >= source.port_count(PortDirection::Output) {
        return Err(Missing::Port {
            id: c.from_node,
            direction: PortDirection::Output,
            port: c.from_port,
        }
        .into());
    }
    if c.to_port >= target.port_count(PortDirection::Input) {
        return Err(Missing::Port {
            id: c.to_node,
            direction: PortDirection::Input,
            port: c.to_port,
        }
        .into());
    }
    Ok(())
}

/// Check that the input port accepts the output's type.
///
/// Endpoints must already have passed [`check_endpoints`].
pub fn validate_types(graph: &StageGraph, c: &Connection) -> Result<(), GraphError> {
    let from_type = graph
        .node(c.from_node)
        .and_then(|n| n.port_type(PortDirection::Output, c.from_port));
    let to_port = graph
        .node(c.to_node)
        .and_then(|n| n.port(PortDirection::Input, c.to_port));

    match (from_type, to_port) {
        (Some(from), Some(port)) if port.accepts(from) => Ok(()),
        (Some(from), Some(port)) => Err(GraphError::TypeMismatch {
            from,
            to: port.port_type,
        }),
        _ => Err(GraphError::Missing(Missing::Connection {
            from: c.from_node,
            from_port: c.from_port,
            to: c.to_node,
            to_port: c.to_port,
        })),
    }
}

/// Whether an existing edge still references valid ports of matching types
pub fn edge_is_sound(graph: &StageGraph, c: &Connection) -> bool {
    check_endpoints(graph, c).is_ok() && validate_types(graph, c).is_ok()
}

/// Whether adding `from -> to` would close a cycle.
///
/// Searches depth-first from `to` along outgoing edges; a self-loop counts.
pub fn would_create_cycle(graph: &StageGraph, from: NodeId, to: NodeId) -> bool {
    if from == to {
        return true;
    }
    let mut visited = HashSet::new();
    let mut stack = vec![to];
    while let Some(id) = stack.pop() {
        if id == from {
            return true;
        }
        if !visited.insert(id) {
            continue;
        }
        stack.extend(
            graph
                .connections()
                .iter()
                .filter(|c| c.from_node == id)
                .map(|c| c.to_node),
        );
    }
    false
}

/// Run every check required before accepting a connection.
///
/// Order: endpoints, types, existing incoming edge, cycle.
pub fn validate_connection(graph: &StageGraph, c: &Connection) -> Result<(), GraphError> {
    check_endpoints(graph, c)?;
    validate_types(graph, c)?;

    if graph.incoming(c.to_node, c.to_port).is_some() {
        return Err(GraphError::AlreadyConnected {
            id: c.to_node,
            port: c.to_port,
        });
    }

    if would_create_cycle(graph, c.from_node, c.to_node) {
        return Err(GraphError::Cycle {
            from: c.from_node,
            to: c.to_node,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ShaderGraph;
    use crate::mode::{ShaderMode, Stage};
    use crate::nodes::constant::{BooleanConstant, ScalarConstant};
    use crate::nodes::operator::{ScalarOp, ScalarOperator};

    fn chain() -> ShaderGraph {
        let mut graph = ShaderGraph::new(ShaderMode::Spatial);
        for id in [2, 3, 4] {
            graph
                .add_node(
                    Stage::Fragment,
                    Box::new(ScalarOp::new(ScalarOperator::Add)),
                    id,
                    [0.0, 0.0],
                )
                .unwrap();
        }
        graph.connect_nodes(Stage::Fragment, 2, 0, 3, 0).unwrap();
        graph.connect_nodes(Stage::Fragment, 3, 0, 4, 0).unwrap();
        graph
    }

    #[test]
    fn test_cycle_detection() {
        let graph = chain();
        let stage = graph.stage(Stage::Fragment);
        assert!(would_create_cycle(stage, 4, 2));
        assert!(would_create_cycle(stage, 3, 3));
        assert!(!would_create_cycle(stage, 2, 4));
    }

    #[test]
    fn test_check_order() {
        let mut graph = chain();
        graph
            .add_node(Stage::Fragment, Box::new(BooleanConstant::new(true)), 5, [0.0, 0.0])
            .unwrap();
        graph
            .add_node(Stage::Fragment, Box::new(ScalarConstant::new(1.0)), 6, [0.0, 0.0])
            .unwrap();
        let stage = graph.stage(Stage::Fragment);

        let missing = Connection::new(9, 0, 2, 0);
        assert!(matches!(
            validate_connection(stage, &missing),
            Err(GraphError::Missing(Missing::Node { id: 9, .. }))
        ));

        let bad_port = Connection::new(2, 4, 3, 1);
        assert!(matches!(
            validate_connection(stage, &bad_port),
            Err(GraphError::Missing(Missing::Port { .. }))
        ));

        let mismatch = Connection::new(5, 0, 2, 1);
        assert!(matches!(
            validate_connection(stage, &mismatch),
            Err(GraphError::TypeMismatch { .. })
        ));

        let taken = Connection::new(6, 0, 3, 0);
        assert!(matches!(
            validate_connection(stage, &taken),
            Err(GraphError::AlreadyConnected { id: 3, port: 0 })
        ));

        let cycle = Connection::new(4, 0, 2, 0);
        assert!(matches!(
            validate_connection(stage, &cycle),
            Err(GraphError::Cycle { from: 4, to: 2 })
        ));

        assert!(validate_connection(stage, &Connection::new(6, 0, 2, 1)).is_ok());
    }
}
