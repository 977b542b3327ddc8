// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clamp, step, smoothstep and mix.

use super::formula::{Formula, FormulaInput, FormulaOutput};
use crate::node::NodeCategory;
use crate::port::PortType;

const CAT: NodeCategory = NodeCategory::Interpolation;

// ============================================================================
// Clamp
// ============================================================================

/// `clamp(x, min, max)` on scalars
pub static SCALAR_CLAMP: Formula = Formula {
    kind: "scalar_clamp",
    caption: "ScalarClamp",
    category: CAT,
    inputs: &[
        FormulaInput::scalar("", 0.0),
        FormulaInput::scalar("min", 0.0),
        FormulaInput::scalar("max", 1.0),
    ],
    outputs: &[FormulaOutput::new("", PortType::Scalar, "clamp($0, $1, $2)")],
    stages: None,
};

/// `clamp(x, min, max)` on vectors
pub static VECTOR_CLAMP: Formula = Formula {
    kind: "vector_clamp",
    caption: "VectorClamp",
    category: CAT,
    inputs: &[
        FormulaInput::vector("", [0.0; 3]),
        FormulaInput::vector("min", [0.0; 3]),
        FormulaInput::vector("max", [1.0; 3]),
    ],
    outputs: &[FormulaOutput::new("", PortType::Vector3, "clamp($0, $1, $2)")],
    stages: None,
};

// ============================================================================
// Step
// ============================================================================

/// `step(edge, x)` with a scalar edge
pub static VECTOR_SCALAR_STEP: Formula = Formula {
    kind: "vector_scalar_step",
    caption: "VectorScalarStep",
    category: CAT,
    inputs: &[
        FormulaInput::scalar("edge", 0.0),
        FormulaInput::vector("x", [0.0; 3]),
    ],
    outputs: &[FormulaOutput::new("", PortType::Vector3, "step($0, $1)")],
    stages: None,
};

/// `smoothstep(edge0, edge1, x)` on scalars
pub static SCALAR_SMOOTH_STEP: Formula = Formula {
    kind: "scalar_smooth_step",
    caption: "ScalarSmoothStep",
    category: CAT,
    inputs: &[
        FormulaInput::scalar("edge0", 0.0),
        FormulaInput::scalar("edge1", 0.0),
        FormulaInput::scalar("x", 0.0),
    ],
    outputs: &[FormulaOutput::new("", PortType::Scalar, "smoothstep($0, $1, $2)")],
    stages: None,
};

/// `smoothstep(edge0, edge1, x)` on vectors
pub static VECTOR_SMOOTH_STEP: Formula = Formula {
    kind: "vector_smooth_step",
    caption: "VectorSmoothStep",
    category: CAT,
    inputs: &[
        FormulaInput::vector("edge0", [0.0; 3]),
        FormulaInput::vector("edge1", [0.0; 3]),
        FormulaInput::vector("x", [0.0; 3]),
    ],
    outputs: &[FormulaOutput::new("", PortType::Vector3, "smoothstep($0, $1, $2)")],
    stages: None,
};

/// `smoothstep(edge0, edge1, x)` with scalar edges
pub static VECTOR_SCALAR_SMOOTH_STEP: Formula = Formula {
    kind: "vector_scalar_smooth_step",
    caption: "VectorScalarSmoothStep",
    category: CAT,
    inputs: &[
        FormulaInput::scalar("edge0", 0.0),
        FormulaInput::scalar("edge1", 0.0),
        FormulaInput::vector("x", [0.0; 3]),
    ],
    outputs: &[FormulaOutput::new("", PortType::Vector3, "smoothstep($0, $1, $2)")],
    stages: None,
};

// ============================================================================
// Mix
// ============================================================================

/// `mix(a, b, weight)` on scalars
pub static SCALAR_INTERP: Formula = Formula {
    kind: "scalar_interp",
    caption: "ScalarMix",
    category: CAT,
    inputs: &[
        FormulaInput::scalar("a", 0.0),
        FormulaInput::scalar("b", 1.0),
        FormulaInput::scalar("weight", 0.5),
    ],
    outputs: &[FormulaOutput::new("mix", PortType::Scalar, "mix($0, $1, $2)")],
    stages: None,
};

/// `mix(a, b, weight)` on vectors
pub static VECTOR_INTERP: Formula = Formula {
    kind: "vector_interp",
    caption: "VectorMix",
    category: CAT,
    inputs: &[
        FormulaInput::vector("a", [0.0; 3]),
        FormulaInput::vector("b", [1.0; 3]),
        FormulaInput::vector("weight", [0.5; 3]),
    ],
    outputs: &[FormulaOutput::new("mix", PortType::Vector3, "mix($0, $1, $2)")],
    stages: None,
};

/// `mix(a, b, weight)` with a scalar weight
pub static VECTOR_SCALAR_MIX: Formula = Formula {
    kind: "vector_scalar_mix",
    caption: "VectorScalarMix",
    category: CAT,
    inputs: &[
        FormulaInput::vector("a", [0.0; 3]),
        FormulaInput::vector("b", [1.0; 3]),
        FormulaInput::scalar("weight", 0.5),
    ],
    outputs: &[FormulaOutput::new("mix", PortType::Vector3, "mix($0, $1, $2)")],
    stages: None,
};

/// Every interpolation formula
pub static FORMULAS: &[&Formula] = &[
    &SCALAR_CLAMP,
    &VECTOR_CLAMP,
    &VECTOR_SCALAR_STEP,
    &SCALAR_SMOOTH_STEP,
    &VECTOR_SMOOTH_STEP,
    &VECTOR_SCALAR_SMOOTH_STEP,
    &SCALAR_INTERP,
    &VECTOR_INTERP,
    &VECTOR_SCALAR_MIX,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{ShaderMode, Stage};
    use crate::node::{NodeContext, ShaderNode};
    use crate::nodes::formula::FormulaNode;
    use crate::value::DefaultValue;

    #[test]
    fn test_mix_defaults() {
        let node = FormulaNode::new(&SCALAR_INTERP);
        assert_eq!(node.caption(), "ScalarMix");
        assert_eq!(node.input_default(1), Some(DefaultValue::Scalar(1.0)));
        assert_eq!(node.input_default(2), Some(DefaultValue::Scalar(0.5)));
    }

    #[test]
    fn test_scalar_edge_step() {
        let node = FormulaNode::new(&VECTOR_SCALAR_STEP);
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 4);
        let body = node
            .generate_body(
                &ctx,
                &["0.500000".to_string(), "n2_0".to_string()],
                &["n4_0".to_string()],
            )
            .unwrap();
        assert_eq!(body, "n4_0 = step(0.500000, n2_0);\n");
    }
}
