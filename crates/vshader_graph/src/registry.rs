// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node kind registry: maps stable kind keys to constructors.

use crate::error::{GraphError, Missing};
use crate::mode::{ShaderMode, Stage};
use crate::node::{self, NodeCategory, ShaderNode};
use crate::nodes::constant::{BooleanConstant, ColorConstant, ScalarConstant, TransformConstant, VectorConstant};
use crate::nodes::expression::{ExpressionNode, GlobalExpressionNode};
use crate::nodes::formula::{Formula, FormulaNode};
use crate::nodes::function::{
    self, ColorFunc, ScalarDerivativeFunc, ScalarFunc, TransformFunc, VectorDerivativeFunc, VectorFunc,
};
use crate::nodes::input::InputNode;
use crate::nodes::interp;
use crate::nodes::logic::{CompareNode, FresnelNode, IfNode, IsNode, SwitchNode};
use crate::nodes::operator::{ColorOp, ScalarOp, TransformMult, TransformVecMult, VectorOp};
use crate::nodes::texture::{CubeMapNode, TextureNode};
use crate::nodes::uniform::{CubeMapUniform, TextureUniform, UniformKind, ValueUniform};
use crate::params::ParamBag;
use crate::uniforms::FALLBACK_UNIFORM_NAME;
use indexmap::IndexMap;

/// How a registered kind is built
#[derive(Debug, Clone, Copy)]
pub enum NodeFactory {
    /// Plain constructor
    Function(fn() -> Box<dyn ShaderNode>),
    /// Table-driven formula
    Formula(&'static Formula),
}

impl NodeFactory {
    /// Build a fresh node with default parameters
    pub fn create(&self) -> Box<dyn ShaderNode> {
        match self {
            Self::Function(f) => f(),
            Self::Formula(formula) => Box::new(FormulaNode::new(formula)),
        }
    }
}

/// A registered node kind
#[derive(Debug, Clone, Copy)]
pub struct NodeType {
    /// Stable kind key
    pub kind: &'static str,
    /// Display name
    pub name: &'static str,
    /// Category for menus
    pub category: NodeCategory,
    /// Constructor
    pub factory: NodeFactory,
}

/// Registry of node kinds
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    types: IndexMap<&'static str, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node kind, replacing any previous entry under the same key
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.kind, node_type);
    }

    /// Get a node kind by key
    pub fn get(&self, kind: &str) -> Option<&NodeType> {
        self.types.get(kind)
    }

    /// All registered kinds, in registration order
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Kinds in one category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Kinds whose default instance may be added in a mode and stage
    pub fn types_for(&self, mode: ShaderMode, stage: Stage) -> impl Iterator<Item = &NodeType> {
        self.types
            .values()
            .filter(move |t| t.factory.create().is_permitted(mode, stage))
    }

    /// Build a node of `kind` and apply `params` in bag order.
    pub fn instantiate(&self, kind: &str, params: &ParamBag) -> Result<Box<dyn ShaderNode>, GraphError> {
        let node_type = self
            .get(kind)
            .ok_or_else(|| Missing::Kind(kind.to_string()))?;
        let mut node = node_type.factory.create();
        for (name, value) in params {
            node::apply_param(node.as_mut(), name, value)?;
        }
        Ok(node)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        create_shader_registry()
    }
}

/// Create the registry holding every built-in node kind
pub fn create_shader_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Input
    // ========================================================================

    registry.register(NodeType {
        kind: "input",
        name: "Input",
        category: NodeCategory::Input,
        factory: NodeFactory::Function(|| Box::new(InputNode::default())),
    });

    // ========================================================================
    // Constants
    // ========================================================================

    registry.register(NodeType {
        kind: "scalar_constant",
        name: "Scalar",
        category: NodeCategory::Constant,
        factory: NodeFactory::Function(|| Box::new(ScalarConstant::default())),
    });
    registry.register(NodeType {
        kind: "boolean_constant",
        name: "Boolean",
        category: NodeCategory::Constant,
        factory: NodeFactory::Function(|| Box::new(BooleanConstant::default())),
    });
    registry.register(NodeType {
        kind: "color_constant",
        name: "Color",
        category: NodeCategory::Constant,
        factory: NodeFactory::Function(|| Box::new(ColorConstant::default())),
    });
    registry.register(NodeType {
        kind: "vector_constant",
        name: "Vector",
        category: NodeCategory::Constant,
        factory: NodeFactory::Function(|| Box::new(VectorConstant::default())),
    });
    registry.register(NodeType {
        kind: "transform_constant",
        name: "Transform",
        category: NodeCategory::Constant,
        factory: NodeFactory::Function(|| Box::new(TransformConstant::default())),
    });

    // ========================================================================
    // Operators
    // ========================================================================

    registry.register(NodeType {
        kind: "scalar_op",
        name: "ScalarOp",
        category: NodeCategory::Operator,
        factory: NodeFactory::Function(|| Box::new(ScalarOp::default())),
    });
    registry.register(NodeType {
        kind: "vector_op",
        name: "VectorOp",
        category: NodeCategory::Operator,
        factory: NodeFactory::Function(|| Box::new(VectorOp::default())),
    });
    registry.register(NodeType {
        kind: "color_op",
        name: "ColorOp",
        category: NodeCategory::Operator,
        factory: NodeFactory::Function(|| Box::new(ColorOp::default())),
    });
    registry.register(NodeType {
        kind: "transform_mult",
        name: "TransformMult",
        category: NodeCategory::Operator,
        factory: NodeFactory::Function(|| Box::new(TransformMult::default())),
    });
    registry.register(NodeType {
        kind: "transform_vec_mult",
        name: "TransformVectorMult",
        category: NodeCategory::Operator,
        factory: NodeFactory::Function(|| Box::new(TransformVecMult::default())),
    });

    // ========================================================================
    // Functions
    // ========================================================================

    registry.register(NodeType {
        kind: "scalar_func",
        name: "ScalarFunc",
        category: NodeCategory::Function,
        factory: NodeFactory::Function(|| Box::new(ScalarFunc::default())),
    });
    registry.register(NodeType {
        kind: "vector_func",
        name: "VectorFunc",
        category: NodeCategory::Function,
        factory: NodeFactory::Function(|| Box::new(VectorFunc::default())),
    });
    registry.register(NodeType {
        kind: "color_func",
        name: "ColorFunc",
        category: NodeCategory::Function,
        factory: NodeFactory::Function(|| Box::new(ColorFunc::default())),
    });
    registry.register(NodeType {
        kind: "transform_func",
        name: "TransformFunc",
        category: NodeCategory::Function,
        factory: NodeFactory::Function(|| Box::new(TransformFunc::default())),
    });
    registry.register(NodeType {
        kind: "scalar_derivative_func",
        name: "ScalarDerivativeFunc",
        category: NodeCategory::Function,
        factory: NodeFactory::Function(|| Box::new(ScalarDerivativeFunc::default())),
    });
    registry.register(NodeType {
        kind: "vector_derivative_func",
        name: "VectorDerivativeFunc",
        category: NodeCategory::Function,
        factory: NodeFactory::Function(|| Box::new(VectorDerivativeFunc::default())),
    });

    // Fixed formulas: products, compose/decompose, clamp, step, mix
    for formula in function::FORMULAS.iter().chain(interp::FORMULAS) {
        registry.register(NodeType {
            kind: formula.kind,
            name: formula.caption,
            category: formula.category,
            factory: NodeFactory::Formula(formula),
        });
    }

    // ========================================================================
    // Logic
    // ========================================================================

    registry.register(NodeType {
        kind: "if",
        name: "If",
        category: NodeCategory::Logic,
        factory: NodeFactory::Function(|| Box::new(IfNode)),
    });
    registry.register(NodeType {
        kind: "vector_switch",
        name: "VectorSwitch",
        category: NodeCategory::Logic,
        factory: NodeFactory::Function(|| Box::new(SwitchNode::vector())),
    });
    registry.register(NodeType {
        kind: "scalar_switch",
        name: "ScalarSwitch",
        category: NodeCategory::Logic,
        factory: NodeFactory::Function(|| Box::new(SwitchNode::scalar())),
    });
    registry.register(NodeType {
        kind: "is",
        name: "Is",
        category: NodeCategory::Logic,
        factory: NodeFactory::Function(|| Box::new(IsNode::default())),
    });
    registry.register(NodeType {
        kind: "compare",
        name: "Compare",
        category: NodeCategory::Logic,
        factory: NodeFactory::Function(|| Box::new(CompareNode::default())),
    });
    registry.register(NodeType {
        kind: "fresnel",
        name: "Fresnel",
        category: NodeCategory::Logic,
        factory: NodeFactory::Function(|| Box::new(FresnelNode)),
    });

    // ========================================================================
    // Uniforms
    // ========================================================================

    registry.register(NodeType {
        kind: "scalar_uniform",
        name: "ScalarUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| {
            Box::new(ValueUniform::new(UniformKind::Scalar, FALLBACK_UNIFORM_NAME))
        }),
    });
    registry.register(NodeType {
        kind: "boolean_uniform",
        name: "BooleanUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| {
            Box::new(ValueUniform::new(UniformKind::Boolean, FALLBACK_UNIFORM_NAME))
        }),
    });
    registry.register(NodeType {
        kind: "color_uniform",
        name: "ColorUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| {
            Box::new(ValueUniform::new(UniformKind::Color, FALLBACK_UNIFORM_NAME))
        }),
    });
    registry.register(NodeType {
        kind: "vector_uniform",
        name: "VectorUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| {
            Box::new(ValueUniform::new(UniformKind::Vector, FALLBACK_UNIFORM_NAME))
        }),
    });
    registry.register(NodeType {
        kind: "transform_uniform",
        name: "TransformUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| {
            Box::new(ValueUniform::new(UniformKind::Transform, FALLBACK_UNIFORM_NAME))
        }),
    });
    registry.register(NodeType {
        kind: "texture_uniform",
        name: "TextureUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| Box::new(TextureUniform::default())),
    });
    registry.register(NodeType {
        kind: "texture_uniform_triplanar",
        name: "TextureUniformTriplanar",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| Box::new(TextureUniform::triplanar(FALLBACK_UNIFORM_NAME))),
    });
    registry.register(NodeType {
        kind: "cubemap_uniform",
        name: "CubeMapUniform",
        category: NodeCategory::Uniform,
        factory: NodeFactory::Function(|| Box::new(CubeMapUniform::default())),
    });

    // ========================================================================
    // Textures
    // ========================================================================

    registry.register(NodeType {
        kind: "texture",
        name: "Texture",
        category: NodeCategory::Texture,
        factory: NodeFactory::Function(|| Box::new(TextureNode::default())),
    });
    registry.register(NodeType {
        kind: "cubemap",
        name: "CubeMap",
        category: NodeCategory::Texture,
        factory: NodeFactory::Function(|| Box::new(CubeMapNode::default())),
    });

    // ========================================================================
    // Expressions
    // ========================================================================

    registry.register(NodeType {
        kind: "expression",
        name: "Expression",
        category: NodeCategory::Expression,
        factory: NodeFactory::Function(|| Box::new(ExpressionNode::default())),
    });
    registry.register(NodeType {
        kind: "global_expression",
        name: "GlobalExpression",
        category: NodeCategory::Expression,
        factory: NodeFactory::Function(|| Box::new(GlobalExpressionNode::default())),
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn test_kind_keys_match_instances() {
        let registry = create_shader_registry();
        for node_type in registry.types() {
            let node = node_type.factory.create();
            assert_eq!(node.kind(), node_type.kind);
            assert_eq!(node.caption(), node_type.name);
        }
    }

    #[test]
    fn test_instantiate_with_params() {
        let registry = create_shader_registry();
        let mut params = ParamBag::new();
        params.insert("constant".to_string(), ParamValue::Float(3.5));
        let node = registry.instantiate("scalar_constant", &params).unwrap();
        assert_eq!(node.param("constant"), Some(ParamValue::Float(3.5)));

        assert!(matches!(
            registry.instantiate("no_such_kind", &ParamBag::new()),
            Err(GraphError::Missing(Missing::Kind(_)))
        ));
        params.insert("bogus".to_string(), ParamValue::Bool(true));
        assert!(matches!(
            registry.instantiate("scalar_constant", &params),
            Err(GraphError::Param(_))
        ));
    }

    #[test]
    fn test_types_for_mode() {
        let registry = create_shader_registry();
        let canvas: Vec<&str> = registry
            .types_for(ShaderMode::CanvasItem, Stage::Fragment)
            .map(|t| t.kind)
            .collect();
        assert!(!canvas.contains(&"fresnel"));
        assert!(!canvas.contains(&"texture_uniform_triplanar"));
        assert!(canvas.contains(&"texture"));

        let vertex: Vec<&str> = registry
            .types_for(ShaderMode::Spatial, Stage::Vertex)
            .map(|t| t.kind)
            .collect();
        assert!(!vertex.contains(&"scalar_derivative_func"));
        assert_eq!(registry.types_in_category(NodeCategory::Constant).count(), 5);
    }
}
