// SPDX-License-Identifier: MIT OR Apache-2.0
//! Uniform nodes: host-supplied values, textures and cube maps.
//!
//! Every uniform node owns a sanitised name. Declarations go to file scope;
//! texture and cube map uniforms additionally report a [`UniformBinding`]
//! so the host knows what to bind, even when no default resource is set.

use crate::graph::UNIFORM_NAME_PARAM;
use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamEnum, ParamError, ParamKind, ParamSpec, ParamValue, ResourceHandle};
use crate::port::{Port, PortType};
use crate::uniforms::{sanitize_uniform_name, UniformBinding, FALLBACK_UNIFORM_NAME};

/// Stages where `UV` can stand in for a disconnected coordinate
pub(crate) const UV_STAGES: &[Stage] = &[Stage::Vertex, Stage::Fragment];

/// Hint pasted into a disconnected `uv` input
pub(crate) const UV_HINT: &str = "vec3(UV, 0.0)";

/// Coordinate used when `uv` has neither an edge nor an applicable hint
pub(crate) const UV_FALLBACK: &str = "vec2(0.0)";

param_enum! {
    /// How the sampled data is interpreted
    pub enum TextureType {
        /// Raw data
        Data => "Data",
        /// sRGB color
        Color => "Color",
        /// Normal map
        NormalMap => "NormalMap",
        /// Anisotropy flow map
        Aniso => "Aniso",
    }
}

param_enum! {
    /// Value read when no texture is bound
    pub enum ColorDefault {
        /// Opaque white
        White => "White",
        /// Opaque black
        Black => "Black",
    }
}

/// Declaration hint suffix for a texture uniform
pub(crate) fn texture_hint(texture_type: TextureType, color_default: ColorDefault) -> &'static str {
    match (texture_type, color_default) {
        (TextureType::Data, ColorDefault::White) => "",
        (TextureType::Data, ColorDefault::Black) => " : hint_black",
        (TextureType::Color, ColorDefault::White) => " : hint_albedo",
        (TextureType::Color, ColorDefault::Black) => " : hint_black_albedo",
        (TextureType::NormalMap, _) => " : hint_normal",
        (TextureType::Aniso, _) => " : hint_aniso",
    }
}

/// Texture coordinate expression from a materialised `uv` input
pub(crate) fn uv_expr(uv: &str) -> String {
    if uv.is_empty() {
        UV_FALLBACK.to_string()
    } else {
        format!("{uv}.xy")
    }
}

/// `texture(...)` or `textureLod(...)` depending on whether a lod is given
pub(crate) fn sample(sampler: &str, coord: &str, lod: &str) -> String {
    if lod.is_empty() {
        format!("texture({sampler}, {coord})")
    } else {
        format!("textureLod({sampler}, {coord}, {lod})")
    }
}

fn set_name(name: &mut String, param: &str, value: &ParamValue) -> Result<(), ParamError> {
    *name = sanitize_uniform_name(params::as_text(param, value)?);
    Ok(())
}

// ============================================================================
// Value uniforms
// ============================================================================

/// Value type of a [`ValueUniform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// `float`
    Scalar,
    /// `bool`
    Boolean,
    /// `vec4` split into color and alpha
    Color,
    /// `vec3`
    Vector,
    /// `mat4`
    Transform,
}

/// A plain value uniform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueUniform {
    kind: UniformKind,
    name: String,
}

impl ValueUniform {
    /// Create a value uniform
    pub fn new(kind: UniformKind, name: &str) -> Self {
        Self {
            kind,
            name: sanitize_uniform_name(name),
        }
    }

    /// Value type
    pub fn uniform_kind(&self) -> UniformKind {
        self.kind
    }
}

impl ShaderNode for ValueUniform {
    fn kind(&self) -> &'static str {
        match self.kind {
            UniformKind::Scalar => "scalar_uniform",
            UniformKind::Boolean => "boolean_uniform",
            UniformKind::Color => "color_uniform",
            UniformKind::Vector => "vector_uniform",
            UniformKind::Transform => "transform_uniform",
        }
    }

    fn caption(&self) -> &str {
        match self.kind {
            UniformKind::Scalar => "ScalarUniform",
            UniformKind::Boolean => "BooleanUniform",
            UniformKind::Color => "ColorUniform",
            UniformKind::Vector => "VectorUniform",
            UniformKind::Transform => "TransformUniform",
        }
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Uniform
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        match self.kind {
            UniformKind::Scalar => vec![Port::output("", PortType::Scalar)],
            UniformKind::Boolean => vec![Port::output("", PortType::Boolean)],
            UniformKind::Color => vec![
                Port::output("color", PortType::Vector3),
                Port::output("alpha", PortType::Scalar),
            ],
            UniformKind::Vector => vec![Port::output("", PortType::Vector3)],
            UniformKind::Transform => vec![Port::output("", PortType::Transform)],
        }
    }

    fn global_declarations(&self, _ctx: &NodeContext) -> String {
        let name = &self.name;
        match self.kind {
            UniformKind::Scalar => format!("uniform float {name};\n"),
            UniformKind::Boolean => format!("uniform bool {name};\n"),
            UniformKind::Color => format!("uniform vec4 {name} : hint_color;\n"),
            UniformKind::Vector => format!("uniform vec3 {name};\n"),
            UniformKind::Transform => format!("uniform mat4 {name};\n"),
        }
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let name = &self.name;
        Ok(match self.kind {
            UniformKind::Color => format!(
                "{} = {name}.rgb;\n{} = {name}.a;\n",
                outputs[0], outputs[1]
            ),
            _ => super::assign(&outputs[0], name),
        })
    }

    fn uniform_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::new(UNIFORM_NAME_PARAM, ParamKind::Text)];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == UNIFORM_NAME_PARAM).then(|| ParamValue::Text(self.name.clone()))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if name != UNIFORM_NAME_PARAM {
            return Err(params::unknown(self.kind(), name));
        }
        set_name(&mut self.name, name, value)
    }
}

// ============================================================================
// Texture uniforms
// ============================================================================

/// A `sampler2D` uniform read at a coordinate, optionally triplanar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureUniform {
    name: String,
    triplanar: bool,
    /// Data interpretation
    pub texture_type: TextureType,
    /// Value read when unbound
    pub color_default: ColorDefault,
    /// Default resource reported in the binding
    pub texture: Option<ResourceHandle>,
}

impl TextureUniform {
    /// Texture uniform sampled at `uv`
    pub fn new(name: &str) -> Self {
        Self {
            name: sanitize_uniform_name(name),
            triplanar: false,
            texture_type: TextureType::Data,
            color_default: ColorDefault::White,
            texture: None,
        }
    }

    /// Texture uniform projected along the three axes
    pub fn triplanar(name: &str) -> Self {
        Self {
            triplanar: true,
            ..Self::new(name)
        }
    }

    /// Whether this is the triplanar variant
    pub fn is_triplanar(&self) -> bool {
        self.triplanar
    }
}

impl Default for TextureUniform {
    fn default() -> Self {
        Self::new(FALLBACK_UNIFORM_NAME)
    }
}

const TEXTURE_SCHEMA: &[ParamSpec] = &[
    ParamSpec::new(UNIFORM_NAME_PARAM, ParamKind::Text),
    ParamSpec::new("texture_type", ParamKind::Enum(TextureType::NAMES)),
    ParamSpec::new("color_default", ParamKind::Enum(ColorDefault::NAMES)),
    ParamSpec::new("texture", ParamKind::Resource),
];

const TRIPLANAR_GLOBALS: &str = "\
// triplanar
vec4 triplanar_texture(sampler2D p_sampler, vec3 p_weights, vec3 p_triplanar_pos) {
\tvec4 samp = vec4(0.0);
\tsamp += texture(p_sampler, p_triplanar_pos.xy) * p_weights.z;
\tsamp += texture(p_sampler, p_triplanar_pos.xz) * p_weights.y;
\tsamp += texture(p_sampler, p_triplanar_pos.zy * vec2(-1.0, 1.0)) * p_weights.x;
\treturn samp;
}

uniform vec3 triplanar_scale = vec3(1.0, 1.0, 1.0);
uniform vec3 triplanar_offset;
uniform float triplanar_sharpness = 0.5;

varying vec3 triplanar_power_normal;
varying vec3 triplanar_pos;

";

const TRIPLANAR_VERTEX: &str = "\
\t// triplanar
\ttriplanar_power_normal = pow(abs(NORMAL), vec3(triplanar_sharpness));
\ttriplanar_power_normal /= dot(triplanar_power_normal, vec3(1.0));
\ttriplanar_pos = VERTEX * triplanar_scale + triplanar_offset;
\ttriplanar_pos *= vec3(1.0, -1.0, 1.0);
";

impl ShaderNode for TextureUniform {
    fn kind(&self) -> &'static str {
        if self.triplanar {
            "texture_uniform_triplanar"
        } else {
            "texture_uniform"
        }
    }

    fn caption(&self) -> &str {
        if self.triplanar {
            "TextureUniformTriplanar"
        } else {
            "TextureUniform"
        }
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Uniform
    }

    fn inputs(&self) -> Vec<Port> {
        if self.triplanar {
            vec![
                Port::input("weights", PortType::Vector3),
                Port::input("pos", PortType::Vector3),
            ]
        } else {
            vec![
                Port::input("uv", PortType::Vector3).with_hint(UV_HINT, UV_STAGES),
                Port::input("lod", PortType::Scalar),
            ]
        }
    }

    fn outputs(&self) -> Vec<Port> {
        vec![
            Port::output("rgb", PortType::Vector3),
            Port::output("alpha", PortType::Scalar),
            Port::output("sampler2D", PortType::Sampler2D),
        ]
    }

    fn is_permitted(&self, mode: ShaderMode, _stage: Stage) -> bool {
        !self.triplanar || mode == ShaderMode::Spatial
    }

    fn global_declarations(&self, _ctx: &NodeContext) -> String {
        format!(
            "uniform sampler2D {}{};\n",
            self.name,
            texture_hint(self.texture_type, self.color_default)
        )
    }

    fn per_node_globals(&self, _ctx: &NodeContext) -> String {
        if self.triplanar {
            TRIPLANAR_GLOBALS.to_string()
        } else {
            String::new()
        }
    }

    fn per_function_prologue(&self, _ctx: &NodeContext, function: Stage) -> String {
        if self.triplanar && function == Stage::Vertex {
            TRIPLANAR_VERTEX.to_string()
        } else {
            String::new()
        }
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let read = if self.triplanar {
            let or = |expr: &str, fallback: &str| {
                if expr.is_empty() {
                    fallback.to_string()
                } else {
                    expr.to_string()
                }
            };
            format!(
                "triplanar_texture({}, {}, {})",
                self.name,
                or(&inputs[0], "triplanar_power_normal"),
                or(&inputs[1], "triplanar_pos")
            )
        } else {
            sample(&self.name, &uv_expr(&inputs[0]), &inputs[1])
        };
        Ok(format!(
            "vec4 n_tex_read = {read};\n{} = n_tex_read.rgb;\n{} = n_tex_read.a;\n",
            outputs[0], outputs[1]
        ))
    }

    fn sampler_name(&self, _ctx: &NodeContext, port: usize) -> Option<String> {
        (port == 2).then(|| self.name.clone())
    }

    fn uniform_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn uniform_bindings(&self, _ctx: &NodeContext) -> Vec<UniformBinding> {
        vec![UniformBinding::new(self.name.clone(), self.texture.clone())]
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        TEXTURE_SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            UNIFORM_NAME_PARAM => Some(ParamValue::Text(self.name.clone())),
            "texture_type" => Some(self.texture_type.to_param()),
            "color_default" => Some(self.color_default.to_param()),
            "texture" => Some(ParamValue::Resource(self.texture.clone())),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            UNIFORM_NAME_PARAM => set_name(&mut self.name, name, value)?,
            "texture_type" => self.texture_type = TextureType::from_param(name, value)?,
            "color_default" => self.color_default = ColorDefault::from_param(name, value)?,
            "texture" => self.texture = params::as_resource(name, value)?,
            _ => return Err(params::unknown(self.kind(), name)),
        }
        Ok(())
    }
}

// ============================================================================
// Cube map uniform
// ============================================================================

/// A `samplerCube` uniform exposed through its sampler port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeMapUniform {
    name: String,
    /// Data interpretation
    pub texture_type: TextureType,
    /// Value read when unbound
    pub color_default: ColorDefault,
    /// Default resource reported in the binding
    pub cube_map: Option<ResourceHandle>,
}

impl CubeMapUniform {
    /// Create a cube map uniform
    pub fn new(name: &str) -> Self {
        Self {
            name: sanitize_uniform_name(name),
            texture_type: TextureType::Data,
            color_default: ColorDefault::White,
            cube_map: None,
        }
    }
}

impl Default for CubeMapUniform {
    fn default() -> Self {
        Self::new(FALLBACK_UNIFORM_NAME)
    }
}

impl ShaderNode for CubeMapUniform {
    fn kind(&self) -> &'static str {
        "cubemap_uniform"
    }

    fn caption(&self) -> &str {
        "CubeMapUniform"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Uniform
    }

    fn inputs(&self) -> Vec<Port> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Port> {
        vec![Port::output("samplerCube", PortType::SamplerCube)]
    }

    fn global_declarations(&self, _ctx: &NodeContext) -> String {
        format!(
            "uniform samplerCube {}{};\n",
            self.name,
            texture_hint(self.texture_type, self.color_default)
        )
    }

    fn generate_body(
        &self,
        _ctx: &NodeContext,
        _inputs: &[String],
        _outputs: &[String],
    ) -> Result<String, NodeError> {
        Ok(String::new())
    }

    fn sampler_name(&self, _ctx: &NodeContext, port: usize) -> Option<String> {
        (port == 0).then(|| self.name.clone())
    }

    fn uniform_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn uniform_bindings(&self, _ctx: &NodeContext) -> Vec<UniformBinding> {
        vec![UniformBinding::new(self.name.clone(), self.cube_map.clone())]
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::new(UNIFORM_NAME_PARAM, ParamKind::Text),
            ParamSpec::new("texture_type", ParamKind::Enum(TextureType::NAMES)),
            ParamSpec::new("color_default", ParamKind::Enum(ColorDefault::NAMES)),
            ParamSpec::new("cube_map", ParamKind::Resource),
        ];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            UNIFORM_NAME_PARAM => Some(ParamValue::Text(self.name.clone())),
            "texture_type" => Some(self.texture_type.to_param()),
            "color_default" => Some(self.color_default.to_param()),
            "cube_map" => Some(ParamValue::Resource(self.cube_map.clone())),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            UNIFORM_NAME_PARAM => set_name(&mut self.name, name, value)?,
            "texture_type" => self.texture_type = TextureType::from_param(name, value)?,
            "color_default" => self.color_default = ColorDefault::from_param(name, value)?,
            "cube_map" => self.cube_map = params::as_resource(name, value)?,
            _ => return Err(params::unknown(self.kind(), name)),
        }
        Ok(())
    }
}
