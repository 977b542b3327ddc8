// SPDX-License-Identifier: MIT OR Apache-2.0
//! Element-wise functions and fixed vector/transform formulas.

use super::formula::{substitute, Formula, FormulaInput, FormulaOutput};
use super::{assign, scalar_in, transform_in, vector_in};
use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamEnum, ParamError, ParamKind, ParamSpec, ParamValue};
use crate::port::{Port, PortType};
use std::fmt;

const FUNCTION: &str = "function";

/// A selectable one-input function family
pub trait UnaryFunction: ParamEnum + fmt::Debug + Send + Sync {
    /// Kind key of nodes using this family
    const KIND: &'static str;
    /// Caption of nodes using this family
    const CAPTION: &'static str;
    /// Type of the input and the output
    const PORT_TYPE: PortType;
    /// Variant selected on creation
    const DEFAULT: Self;
    /// Parameter schema
    const SCHEMA: &'static [ParamSpec];

    /// Stages where the family may be used
    fn permitted_in(_stage: Stage) -> bool {
        true
    }

    /// Body computing `output` from `input`
    fn code(self, input: &str, output: &str) -> String;
}

/// Node applying one function of family `F`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionNode<F> {
    /// Selected function
    pub func: F,
}

impl<F: UnaryFunction> FunctionNode<F> {
    /// Create a function node
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F: UnaryFunction> Default for FunctionNode<F> {
    fn default() -> Self {
        Self::new(F::DEFAULT)
    }
}

impl<F: UnaryFunction> ShaderNode for FunctionNode<F> {
    fn kind(&self) -> &'static str {
        F::KIND
    }

    fn caption(&self) -> &str {
        F::CAPTION
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Function
    }

    fn inputs(&self) -> Vec<Port> {
        let port = match F::PORT_TYPE {
            PortType::Scalar => scalar_in("", 0.0),
            PortType::Vector3 => vector_in("", [0.0; 3]),
            PortType::Transform => transform_in(""),
            other => Port::input("", other),
        };
        vec![port]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("", F::PORT_TYPE)]
    }

    fn is_permitted(&self, _mode: ShaderMode, stage: Stage) -> bool {
        F::permitted_in(stage)
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(self.func.code(&inputs[0], &outputs[0]))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        F::SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == FUNCTION).then(|| self.func.to_param())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != FUNCTION {
            return Err(params::unknown(F::KIND, name));
        }
        self.func = F::from_param(name, value)?;
        Ok(())
    }
}

fn template(out: &str, template: &str, input: &str) -> String {
    assign(out, substitute(template, &[input.to_string()]))
}

param_enum! {
    /// Functions of a scalar
    pub enum ScalarFunction {
        /// Sine
        Sin => "Sin",
        /// Cosine
        Cos => "Cos",
        /// Tangent
        Tan => "Tan",
        /// Arcsine
        ASin => "ASin",
        /// Arccosine
        ACos => "ACos",
        /// Arctangent
        ATan => "ATan",
        /// Hyperbolic sine
        SinH => "SinH",
        /// Hyperbolic cosine
        CosH => "CosH",
        /// Hyperbolic tangent
        TanH => "TanH",
        /// Natural logarithm
        Log => "Log",
        /// Natural exponent
        Exp => "Exp",
        /// Square root
        Sqrt => "Sqrt",
        /// Absolute value
        Abs => "Abs",
        /// Sign
        Sign => "Sign",
        /// Floor
        Floor => "Floor",
        /// Round
        Round => "Round",
        /// Ceiling
        Ceil => "Ceil",
        /// Fractional part
        Frac => "Frac",
        /// Clamp to `[0, 1]`
        Saturate => "Saturate",
        /// Negation
        Negate => "Negate",
        /// Hyperbolic arccosine
        ACosH => "ACosH",
        /// Hyperbolic arcsine
        ASinH => "ASinH",
        /// Hyperbolic arctangent
        ATanH => "ATanH",
        /// Radians to degrees
        Degrees => "Degrees",
        /// Base-2 exponent
        Exp2 => "Exp2",
        /// Inverse square root
        InverseSqrt => "InverseSqrt",
        /// Base-2 logarithm
        Log2 => "Log2",
        /// Degrees to radians
        Radians => "Radians",
        /// `1 / x`
        Reciprocal => "Reciprocal",
        /// Round half to even
        RoundEven => "RoundEven",
        /// Truncate
        Trunc => "Trunc",
        /// `1 - x`
        OneMinus => "OneMinus",
    }
}

impl ScalarFunction {
    fn template(self) -> &'static str {
        match self {
            Self::Sin => "sin($0)",
            Self::Cos => "cos($0)",
            Self::Tan => "tan($0)",
            Self::ASin => "asin($0)",
            Self::ACos => "acos($0)",
            Self::ATan => "atan($0)",
            Self::SinH => "sinh($0)",
            Self::CosH => "cosh($0)",
            Self::TanH => "tanh($0)",
            Self::Log => "log($0)",
            Self::Exp => "exp($0)",
            Self::Sqrt => "sqrt($0)",
            Self::Abs => "abs($0)",
            Self::Sign => "sign($0)",
            Self::Floor => "floor($0)",
            Self::Round => "round($0)",
            Self::Ceil => "ceil($0)",
            Self::Frac => "fract($0)",
            Self::Saturate => "min(max($0, 0.0), 1.0)",
            Self::Negate => "-($0)",
            Self::ACosH => "acosh($0)",
            Self::ASinH => "asinh($0)",
            Self::ATanH => "atanh($0)",
            Self::Degrees => "degrees($0)",
            Self::Exp2 => "exp2($0)",
            Self::InverseSqrt => "inversesqrt($0)",
            Self::Log2 => "log2($0)",
            Self::Radians => "radians($0)",
            Self::Reciprocal => "1.0 / ($0)",
            Self::RoundEven => "roundEven($0)",
            Self::Trunc => "trunc($0)",
            Self::OneMinus => "1.0 - $0",
        }
    }
}

impl UnaryFunction for ScalarFunction {
    const KIND: &'static str = "scalar_func";
    const CAPTION: &'static str = "ScalarFunc";
    const PORT_TYPE: PortType = PortType::Scalar;
    const DEFAULT: Self = Self::Sign;
    const SCHEMA: &'static [ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(Self::NAMES))];

    fn code(self, input: &str, output: &str) -> String {
        template(output, self.template(), input)
    }
}

param_enum! {
    /// Functions of a vector
    pub enum VectorFunction {
        /// Unit vector
        Normalize => "Normalize",
        /// Clamp each component to `[0, 1]`
        Saturate => "Saturate",
        /// Negation
        Negate => "Negate",
        /// `1 / x`
        Reciprocal => "Reciprocal",
        /// RGB to HSV
        Rgb2Hsv => "RGB2HSV",
        /// HSV to RGB
        Hsv2Rgb => "HSV2RGB",
        /// Absolute value
        Abs => "Abs",
        /// Arccosine
        ACos => "ACos",
        /// Hyperbolic arccosine
        ACosH => "ACosH",
        /// Arcsine
        ASin => "ASin",
        /// Hyperbolic arcsine
        ASinH => "ASinH",
        /// Arctangent
        ATan => "ATan",
        /// Hyperbolic arctangent
        ATanH => "ATanH",
        /// Ceiling
        Ceil => "Ceil",
        /// Cosine
        Cos => "Cos",
        /// Hyperbolic cosine
        CosH => "CosH",
        /// Radians to degrees
        Degrees => "Degrees",
        /// Natural exponent
        Exp => "Exp",
        /// Base-2 exponent
        Exp2 => "Exp2",
        /// Floor
        Floor => "Floor",
        /// Fractional part
        Frac => "Frac",
        /// Inverse square root
        InverseSqrt => "InverseSqrt",
        /// Natural logarithm
        Log => "Log",
        /// Base-2 logarithm
        Log2 => "Log2",
        /// Degrees to radians
        Radians => "Radians",
        /// Round
        Round => "Round",
        /// Round half to even
        RoundEven => "RoundEven",
        /// Sign
        Sign => "Sign",
        /// Sine
        Sin => "Sin",
        /// Hyperbolic sine
        SinH => "SinH",
        /// Square root
        Sqrt => "Sqrt",
        /// Tangent
        Tan => "Tan",
        /// Hyperbolic tangent
        TanH => "TanH",
        /// Truncate
        Trunc => "Trunc",
        /// `1 - x`
        OneMinus => "OneMinus",
    }
}

impl VectorFunction {
    fn template(self) -> &'static str {
        match self {
            Self::Normalize => "normalize($0)",
            Self::Saturate => "max(min($0, vec3(1.0)), vec3(0.0))",
            Self::Negate => "-($0)",
            Self::Reciprocal => "1.0 / ($0)",
            // multi-line bodies, see `code`
            Self::Rgb2Hsv | Self::Hsv2Rgb => "$0",
            Self::Abs => "abs($0)",
            Self::ACos => "acos($0)",
            Self::ACosH => "acosh($0)",
            Self::ASin => "asin($0)",
            Self::ASinH => "asinh($0)",
            Self::ATan => "atan($0)",
            Self::ATanH => "atanh($0)",
            Self::Ceil => "ceil($0)",
            Self::Cos => "cos($0)",
            Self::CosH => "cosh($0)",
            Self::Degrees => "degrees($0)",
            Self::Exp => "exp($0)",
            Self::Exp2 => "exp2($0)",
            Self::Floor => "floor($0)",
            Self::Frac => "fract($0)",
            Self::InverseSqrt => "inversesqrt($0)",
            Self::Log => "log($0)",
            Self::Log2 => "log2($0)",
            Self::Radians => "radians($0)",
            Self::Round => "round($0)",
            Self::RoundEven => "roundEven($0)",
            Self::Sign => "sign($0)",
            Self::Sin => "sin($0)",
            Self::SinH => "sinh($0)",
            Self::Sqrt => "sqrt($0)",
            Self::Tan => "tan($0)",
            Self::TanH => "tanh($0)",
            Self::Trunc => "trunc($0)",
            Self::OneMinus => "vec3(1.0) - $0",
        }
    }
}

impl UnaryFunction for VectorFunction {
    const KIND: &'static str = "vector_func";
    const CAPTION: &'static str = "VectorFunc";
    const PORT_TYPE: PortType = PortType::Vector3;
    const DEFAULT: Self = Self::Normalize;
    const SCHEMA: &'static [ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(Self::NAMES))];

    fn code(self, input: &str, output: &str) -> String {
        match self {
            Self::Rgb2Hsv => format!(
                "{{\n\
                 \tvec3 c = {input};\n\
                 \tvec4 K = vec4(0.0, -1.0 / 3.0, 2.0 / 3.0, -1.0);\n\
                 \tvec4 p = mix(vec4(c.bg, K.wz), vec4(c.gb, K.xy), step(c.b, c.g));\n\
                 \tvec4 q = mix(vec4(p.xyw, c.r), vec4(c.r, p.yzx), step(p.x, c.r));\n\
                 \tfloat d = q.x - min(q.w, q.y);\n\
                 \tfloat e = 1.0e-10;\n\
                 \t{output} = vec3(abs(q.z + (q.w - q.y) / (6.0 * d + e)), d / (q.x + e), q.x);\n\
                 }}\n"
            ),
            Self::Hsv2Rgb => format!(
                "{{\n\
                 \tvec3 c = {input};\n\
                 \tvec4 K = vec4(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);\n\
                 \tvec3 p = abs(fract(c.xxx + K.xyz) * 6.0 - K.www);\n\
                 \t{output} = c.z * mix(K.xxx, clamp(p - K.xxx, 0.0, 1.0), c.y);\n\
                 }}\n"
            ),
            _ => template(output, self.template(), input),
        }
    }
}

param_enum! {
    /// Color filters
    pub enum ColorFunction {
        /// Brightest channel on all channels
        Grayscale => "Grayscale",
        /// Sepia tone
        Sepia => "Sepia",
    }
}

impl UnaryFunction for ColorFunction {
    const KIND: &'static str = "color_func";
    const CAPTION: &'static str = "ColorFunc";
    const PORT_TYPE: PortType = PortType::Vector3;
    const DEFAULT: Self = Self::Grayscale;
    const SCHEMA: &'static [ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(Self::NAMES))];

    fn code(self, input: &str, output: &str) -> String {
        match self {
            Self::Grayscale => format!(
                "{{\n\
                 \tvec3 c = {input};\n\
                 \tfloat max1 = max(c.r, c.g);\n\
                 \tfloat max2 = max(max1, c.b);\n\
                 \t{output} = vec3(max2, max2, max2);\n\
                 }}\n"
            ),
            Self::Sepia => format!(
                "{{\n\
                 \tvec3 c = {input};\n\
                 \tfloat r = (c.r * 0.393) + (c.g * 0.769) + (c.b * 0.189);\n\
                 \tfloat g = (c.r * 0.349) + (c.g * 0.686) + (c.b * 0.168);\n\
                 \tfloat b = (c.r * 0.272) + (c.g * 0.534) + (c.b * 0.131);\n\
                 \t{output} = vec3(r, g, b);\n\
                 }}\n"
            ),
        }
    }
}

param_enum! {
    /// Functions of a transform
    pub enum TransformFunction {
        /// Matrix inverse
        Inverse => "Inverse",
        /// Matrix transpose
        Transpose => "Transpose",
    }
}

impl UnaryFunction for TransformFunction {
    const KIND: &'static str = "transform_func";
    const CAPTION: &'static str = "TransformFunc";
    const PORT_TYPE: PortType = PortType::Transform;
    const DEFAULT: Self = Self::Inverse;
    const SCHEMA: &'static [ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(Self::NAMES))];

    fn code(self, input: &str, output: &str) -> String {
        match self {
            Self::Inverse => assign(output, format_args!("inverse({input})")),
            Self::Transpose => assign(output, format_args!("transpose({input})")),
        }
    }
}

param_enum! {
    /// Screen-space derivatives
    pub enum DerivativeFunction {
        /// `abs(dFdx) + abs(dFdy)`
        Sum => "Sum",
        /// Derivative along x
        X => "X",
        /// Derivative along y
        Y => "Y",
    }
}

impl DerivativeFunction {
    fn code(self, input: &str, output: &str) -> String {
        let func = match self {
            Self::Sum => "fwidth",
            Self::X => "dFdx",
            Self::Y => "dFdy",
        };
        assign(output, format_args!("{func}({input})"))
    }
}

/// Derivative of a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarDerivative(pub DerivativeFunction);

/// Derivative of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorDerivative(pub DerivativeFunction);

impl ParamEnum for ScalarDerivative {
    const ALL: &'static [Self] = &[
        Self(DerivativeFunction::Sum),
        Self(DerivativeFunction::X),
        Self(DerivativeFunction::Y),
    ];
    const NAMES: &'static [&'static str] = DerivativeFunction::NAMES;
}

impl ParamEnum for VectorDerivative {
    const ALL: &'static [Self] = &[
        Self(DerivativeFunction::Sum),
        Self(DerivativeFunction::X),
        Self(DerivativeFunction::Y),
    ];
    const NAMES: &'static [&'static str] = DerivativeFunction::NAMES;
}

impl UnaryFunction for ScalarDerivative {
    const KIND: &'static str = "scalar_derivative_func";
    const CAPTION: &'static str = "ScalarDerivativeFunc";
    const PORT_TYPE: PortType = PortType::Scalar;
    const DEFAULT: Self = Self(DerivativeFunction::Sum);
    const SCHEMA: &'static [ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(Self::NAMES))];

    fn permitted_in(stage: Stage) -> bool {
        stage != Stage::Vertex
    }

    fn code(self, input: &str, output: &str) -> String {
        self.0.code(input, output)
    }
}

impl UnaryFunction for VectorDerivative {
    const KIND: &'static str = "vector_derivative_func";
    const CAPTION: &'static str = "VectorDerivativeFunc";
    const PORT_TYPE: PortType = PortType::Vector3;
    const DEFAULT: Self = Self(DerivativeFunction::Sum);
    const SCHEMA: &'static [ParamSpec] = &[ParamSpec::new(FUNCTION, ParamKind::Enum(Self::NAMES))];

    fn permitted_in(stage: Stage) -> bool {
        stage != Stage::Vertex
    }

    fn code(self, input: &str, output: &str) -> String {
        self.0.code(input, output)
    }
}

/// Scalar function node
pub type ScalarFunc = FunctionNode<ScalarFunction>;
/// Vector function node
pub type VectorFunc = FunctionNode<VectorFunction>;
/// Color filter node
pub type ColorFunc = FunctionNode<ColorFunction>;
/// Transform function node
pub type TransformFunc = FunctionNode<TransformFunction>;
/// Scalar derivative node
pub type ScalarDerivativeFunc = FunctionNode<ScalarDerivative>;
/// Vector derivative node
pub type VectorDerivativeFunc = FunctionNode<VectorDerivative>;

// ============================================================================
// Fixed formulas
// ============================================================================

const ZERO: [f32; 3] = [0.0; 3];

/// `dot(a, b)`
pub static DOT_PRODUCT: Formula = Formula {
    kind: "dot_product",
    caption: "DotProduct",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::vector("a", ZERO), FormulaInput::vector("b", ZERO)],
    outputs: &[FormulaOutput::new("dot", PortType::Scalar, "dot($0, $1)")],
    stages: None,
};

/// `length(v)`
pub static VECTOR_LEN: Formula = Formula {
    kind: "vector_len",
    caption: "VectorLen",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::vector("", ZERO)],
    outputs: &[FormulaOutput::new("length", PortType::Scalar, "length($0)")],
    stages: None,
};

/// `determinant(m)`
pub static DETERMINANT: Formula = Formula {
    kind: "determinant",
    caption: "Determinant",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::transform("")],
    outputs: &[FormulaOutput::new("", PortType::Scalar, "determinant($0)")],
    stages: None,
};

/// `distance(p0, p1)`
pub static DISTANCE: Formula = Formula {
    kind: "vector_distance",
    caption: "Distance",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::vector("p0", ZERO), FormulaInput::vector("p1", ZERO)],
    outputs: &[FormulaOutput::new("", PortType::Scalar, "distance($0, $1)")],
    stages: None,
};

/// `refract(I, N, eta)`
pub static REFRACT: Formula = Formula {
    kind: "vector_refract",
    caption: "Refract",
    category: NodeCategory::Function,
    inputs: &[
        FormulaInput::vector("I", ZERO),
        FormulaInput::vector("N", ZERO),
        FormulaInput::scalar("eta", 0.0),
    ],
    outputs: &[FormulaOutput::new("", PortType::Vector3, "refract($0, $1, $2)")],
    stages: None,
};

/// `faceforward(N, I, Nref)`
pub static FACE_FORWARD: Formula = Formula {
    kind: "face_forward",
    caption: "FaceForward",
    category: NodeCategory::Function,
    inputs: &[
        FormulaInput::vector("N", ZERO),
        FormulaInput::vector("I", ZERO),
        FormulaInput::vector("Nref", ZERO),
    ],
    outputs: &[FormulaOutput::new("", PortType::Vector3, "faceforward($0, $1, $2)")],
    stages: None,
};

/// Column vector times row vector
pub static OUTER_PRODUCT: Formula = Formula {
    kind: "outer_product",
    caption: "OuterProduct",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::vector("c", ZERO), FormulaInput::vector("r", ZERO)],
    outputs: &[FormulaOutput::new(
        "",
        PortType::Transform,
        "outerProduct(vec4($0, 0.0), vec4($1, 0.0))",
    )],
    stages: None,
};

/// Three scalars into a vector
pub static VECTOR_COMPOSE: Formula = Formula {
    kind: "vector_compose",
    caption: "VectorCompose",
    category: NodeCategory::Function,
    inputs: &[
        FormulaInput::scalar("x", 0.0),
        FormulaInput::scalar("y", 0.0),
        FormulaInput::scalar("z", 0.0),
    ],
    outputs: &[FormulaOutput::new("vec", PortType::Vector3, "vec3($0, $1, $2)")],
    stages: None,
};

/// Three basis vectors and an origin into a transform
pub static TRANSFORM_COMPOSE: Formula = Formula {
    kind: "transform_compose",
    caption: "TransformCompose",
    category: NodeCategory::Function,
    inputs: &[
        FormulaInput::vector("x", ZERO),
        FormulaInput::vector("y", ZERO),
        FormulaInput::vector("z", ZERO),
        FormulaInput::vector("origin", ZERO),
    ],
    outputs: &[FormulaOutput::new(
        "xform",
        PortType::Transform,
        "mat4(vec4($0, 0.0), vec4($1, 0.0), vec4($2, 0.0), vec4($3, 1.0))",
    )],
    stages: None,
};

/// A vector split into components
pub static VECTOR_DECOMPOSE: Formula = Formula {
    kind: "vector_decompose",
    caption: "VectorDecompose",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::vector("vec", ZERO)],
    outputs: &[
        FormulaOutput::new("x", PortType::Scalar, "$0.x"),
        FormulaOutput::new("y", PortType::Scalar, "$0.y"),
        FormulaOutput::new("z", PortType::Scalar, "$0.z"),
    ],
    stages: None,
};

/// A transform split into basis vectors and origin
pub static TRANSFORM_DECOMPOSE: Formula = Formula {
    kind: "transform_decompose",
    caption: "TransformDecompose",
    category: NodeCategory::Function,
    inputs: &[FormulaInput::transform("xform")],
    outputs: &[
        FormulaOutput::new("x", PortType::Vector3, "$0[0].xyz"),
        FormulaOutput::new("y", PortType::Vector3, "$0[1].xyz"),
        FormulaOutput::new("z", PortType::Vector3, "$0[2].xyz"),
        FormulaOutput::new("origin", PortType::Vector3, "$0[3].xyz"),
    ],
    stages: None,
};

/// Every fixed formula of this module
pub static FORMULAS: &[&Formula] = &[
    &DOT_PRODUCT,
    &VECTOR_LEN,
    &DETERMINANT,
    &DISTANCE,
    &REFRACT,
    &FACE_FORWARD,
    &OUTER_PRODUCT,
    &VECTOR_COMPOSE,
    &TRANSFORM_COMPOSE,
    &VECTOR_DECOMPOSE,
    &TRANSFORM_DECOMPOSE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::formula::FormulaNode;

    fn body(node: &dyn ShaderNode, inputs: &[&str], outputs: &[&str]) -> String {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 3);
        let inputs: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        let outputs: Vec<String> = outputs.iter().map(|s| s.to_string()).collect();
        node.generate_body(&ctx, &inputs, &outputs).unwrap()
    }

    #[test]
    fn test_scalar_func() {
        let node = ScalarFunc::new(ScalarFunction::OneMinus);
        assert_eq!(body(&node, &["n2_0"], &["n3_0"]), "n3_0 = 1.0 - n2_0;\n");
        assert_eq!(ScalarFunc::default().func, ScalarFunction::Sign);
        assert_eq!(node.kind(), "scalar_func");
    }

    #[test]
    fn test_vector_func_blocks() {
        let code = body(&VectorFunc::new(VectorFunction::Hsv2Rgb), &["n2_0"], &["n3_0"]);
        assert!(code.starts_with("{\n\tvec3 c = n2_0;\n"));
        assert!(code.ends_with("}\n"));
        assert_eq!(
            body(&VectorFunc::default(), &["n2_0"], &["n3_0"]),
            "n3_0 = normalize(n2_0);\n"
        );
    }

    #[test]
    fn test_derivatives_are_fragment_only() {
        let node = ScalarDerivativeFunc::default();
        assert!(!node.is_permitted(ShaderMode::Spatial, Stage::Vertex));
        assert!(node.is_permitted(ShaderMode::Spatial, Stage::Fragment));
        assert_eq!(
            body(&VectorDerivativeFunc::new(VectorDerivative(DerivativeFunction::Y)), &["v"], &["n3_0"]),
            "n3_0 = dFdy(v);\n"
        );
    }

    #[test]
    fn test_function_param() {
        let mut node = TransformFunc::default();
        crate::node::apply_param(&mut node, "function", &ParamValue::Enum(1)).unwrap();
        assert_eq!(node.func, TransformFunction::Transpose);
        assert_eq!(node.params().get("function"), Some(&ParamValue::Enum(1)));
    }

    #[test]
    fn test_formulas() {
        let decompose = FormulaNode::new(&TRANSFORM_DECOMPOSE);
        assert_eq!(decompose.outputs().len(), 4);
        assert_eq!(
            body(&decompose, &["m"], &["n3_0", "n3_1", "n3_2", "n3_3"]),
            "n3_0 = m[0].xyz;\nn3_1 = m[1].xyz;\nn3_2 = m[2].xyz;\nn3_3 = m[3].xyz;\n"
        );
        let mut kinds: Vec<&str> = FORMULAS.iter().map(|f| f.kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), FORMULAS.len());
    }
}
