// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture and cube map reads from a selectable source.

use super::uniform::{sample, texture_hint, uv_expr, ColorDefault, TextureType, UV_HINT, UV_STAGES};
use crate::mode::{ShaderMode, Stage};
use crate::node::{NodeCategory, NodeContext, NodeError, ShaderNode};
use crate::params::{self, ParamEnum, ParamError, ParamKind, ParamSpec, ParamValue, ResourceHandle};
use crate::port::{Port, PortType};
use crate::uniforms::UniformBinding;
use crate::value::SAMPLER_STANDIN;

param_enum! {
    /// Where a [`TextureNode`] reads from
    pub enum TextureSource {
        /// Its own `sampler2D` uniform
        Texture => "Texture",
        /// `SCREEN_TEXTURE`
        Screen => "Screen",
        /// Canvas item `TEXTURE`
        Texture2D => "Texture2D",
        /// Canvas item `NORMAL_TEXTURE`
        NormalMap2D => "NormalMap2D",
        /// `DEPTH_TEXTURE`
        Depth => "Depth",
        /// Whatever is connected to the sampler input
        SamplerPort => "SamplerPort",
    }
}

/// Sample a 2D texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureNode {
    /// Read source
    pub source: TextureSource,
    /// Data interpretation of the owned uniform
    pub texture_type: TextureType,
    /// Default resource of the owned uniform
    pub texture: Option<ResourceHandle>,
}

impl TextureNode {
    /// Create a texture node reading from `source`
    pub fn new(source: TextureSource) -> Self {
        Self {
            source,
            texture_type: TextureType::Data,
            texture: None,
        }
    }

    /// Whether the source exists in this mode and stage
    fn source_available(&self, mode: ShaderMode, stage: Stage) -> bool {
        match self.source {
            TextureSource::Texture | TextureSource::SamplerPort => true,
            TextureSource::Screen => {
                matches!(mode, ShaderMode::Spatial | ShaderMode::CanvasItem) && stage == Stage::Fragment
            }
            TextureSource::Texture2D => mode == ShaderMode::CanvasItem && stage == Stage::Fragment,
            TextureSource::NormalMap2D => mode == ShaderMode::CanvasItem,
            TextureSource::Depth => mode == ShaderMode::Spatial && stage == Stage::Fragment,
        }
    }

    /// Outputs with nothing to read
    fn placeholder(&self, outputs: &[String]) -> String {
        let rgb = if self.source == TextureSource::Depth {
            "0.0"
        } else {
            "vec3(0.0)"
        };
        format!("{} = {rgb};\n{} = 1.0;\n", outputs[0], outputs[1])
    }

    fn read_into(read: &str, outputs: &[String]) -> String {
        format!(
            "vec4 _tex_read = {read};\n{} = _tex_read.rgb;\n{} = _tex_read.a;\n",
            outputs[0], outputs[1]
        )
    }
}

impl Default for TextureNode {
    fn default() -> Self {
        Self::new(TextureSource::Texture)
    }
}

impl ShaderNode for TextureNode {
    fn kind(&self) -> &'static str {
        "texture"
    }

    fn caption(&self) -> &str {
        "Texture"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Texture
    }

    fn inputs(&self) -> Vec<Port> {
        vec![
            Port::input("uv", PortType::Vector3).with_hint(UV_HINT, UV_STAGES),
            Port::input("lod", PortType::Scalar),
            Port::input("sampler2D", PortType::Sampler2D),
        ]
    }

    fn outputs(&self) -> Vec<Port> {
        let first = if self.source == TextureSource::Depth {
            Port::output("depth", PortType::Scalar)
        } else {
            Port::output("rgb", PortType::Vector3)
        };
        vec![first, Port::output("alpha", PortType::Scalar)]
    }

    fn global_declarations(&self, ctx: &NodeContext) -> String {
        if self.source != TextureSource::Texture {
            return String::new();
        }
        format!(
            "uniform sampler2D {}{};\n",
            ctx.unique_name("tex"),
            texture_hint(self.texture_type, ColorDefault::White)
        )
    }

    fn uniform_bindings(&self, ctx: &NodeContext) -> Vec<UniformBinding> {
        if self.source != TextureSource::Texture {
            return Vec::new();
        }
        vec![UniformBinding::new(ctx.unique_name("tex"), self.texture.clone())]
    }

    fn generate_body(
        &self,
        ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let (uv, lod, sampler) = (uv_expr(&inputs[0]), &inputs[1], &inputs[2]);
        if !self.source_available(ctx.mode, ctx.stage) {
            return Ok(self.placeholder(outputs));
        }
        let code = match self.source {
            TextureSource::Texture => {
                let id = ctx.unique_name("tex");
                format!(
                    "vec4 {id}_read = {};\n{} = {id}_read.rgb;\n{} = {id}_read.a;\n",
                    sample(&id, &uv, lod),
                    outputs[0],
                    outputs[1]
                )
            }
            TextureSource::SamplerPort if sampler.is_empty() => self.placeholder(outputs),
            TextureSource::SamplerPort => Self::read_into(&sample(sampler, &uv, lod), outputs),
            TextureSource::Screen => {
                let lod = if lod.is_empty() { "0.0" } else { lod.as_str() };
                Self::read_into(&sample("SCREEN_TEXTURE", &uv, lod), outputs)
            }
            TextureSource::Texture2D => Self::read_into(&sample("TEXTURE", &uv, lod), outputs),
            TextureSource::NormalMap2D => {
                Self::read_into(&sample("NORMAL_TEXTURE", &uv, lod), outputs)
            }
            TextureSource::Depth if ctx.preview => self.placeholder(outputs),
            TextureSource::Depth => format!(
                "float _depth = {}.r;\n{} = _depth;\n{} = 1.0;\n",
                sample("DEPTH_TEXTURE", &uv, lod),
                outputs[0],
                outputs[1]
            ),
        };
        Ok(code)
    }

    fn warning(&self, mode: ShaderMode, stage: Stage) -> Option<String> {
        (!self.source_available(mode, stage)).then(|| "Invalid source for shader.".to_string())
    }

    fn stage_restriction(&self, ctx: &NodeContext) -> Option<String> {
        (ctx.preview && self.source == TextureSource::Depth)
            .then(|| "DEPTH_TEXTURE is not available in previews".to_string())
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::new("source", ParamKind::Enum(TextureSource::NAMES)),
            ParamSpec::new("texture", ParamKind::Resource),
            ParamSpec::new("texture_type", ParamKind::Enum(TextureType::NAMES)),
        ];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "source" => Some(self.source.to_param()),
            "texture" => Some(ParamValue::Resource(self.texture.clone())),
            "texture_type" => Some(self.texture_type.to_param()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            "source" => self.source = TextureSource::from_param(name, value)?,
            "texture" => self.texture = params::as_resource(name, value)?,
            "texture_type" => self.texture_type = TextureType::from_param(name, value)?,
            _ => return Err(params::unknown(self.kind(), name)),
        }
        Ok(())
    }
}

param_enum! {
    /// Where a [`CubeMapNode`] reads from
    pub enum CubeMapSource {
        /// Its own `samplerCube` uniform
        Texture => "Texture",
        /// Whatever is connected to the sampler input
        SamplerPort => "SamplerPort",
    }
}

/// Sample a cube map along a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeMapNode {
    /// Read source
    pub source: CubeMapSource,
    /// Data interpretation of the owned uniform
    pub texture_type: TextureType,
    /// Default resource of the owned uniform
    pub cube_map: Option<ResourceHandle>,
}

impl CubeMapNode {
    /// Create a cube map node reading from `source`
    pub fn new(source: CubeMapSource) -> Self {
        Self {
            source,
            texture_type: TextureType::Data,
            cube_map: None,
        }
    }
}

impl Default for CubeMapNode {
    fn default() -> Self {
        Self::new(CubeMapSource::Texture)
    }
}

impl ShaderNode for CubeMapNode {
    fn kind(&self) -> &'static str {
        "cubemap"
    }

    fn caption(&self) -> &str {
        "CubeMap"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Texture
    }

    fn inputs(&self) -> Vec<Port> {
        vec![
            Port::input("uv", PortType::Vector3).with_hint(UV_HINT, UV_STAGES),
            Port::input("lod", PortType::Scalar),
            Port::input("samplerCube", PortType::SamplerCube),
        ]
    }

    fn outputs(&self) -> Vec<Port> {
        vec![
            Port::output("rgb", PortType::Vector3),
            Port::output("alpha", PortType::Scalar),
        ]
    }

    fn global_declarations(&self, ctx: &NodeContext) -> String {
        if self.source != CubeMapSource::Texture {
            return String::new();
        }
        format!(
            "uniform samplerCube {}{};\n",
            ctx.unique_name("cube"),
            texture_hint(self.texture_type, ColorDefault::White)
        )
    }

    fn uniform_bindings(&self, ctx: &NodeContext) -> Vec<UniformBinding> {
        if self.source != CubeMapSource::Texture {
            return Vec::new();
        }
        vec![UniformBinding::new(ctx.unique_name("cube"), self.cube_map.clone())]
    }

    fn generate_body(
        &self,
        ctx: &NodeContext,
        inputs: &[String],
        outputs: &[String],
    ) -> Result<String, NodeError> {
        let id = match self.source {
            CubeMapSource::Texture => ctx.unique_name("cube"),
            CubeMapSource::SamplerPort => inputs[2].clone(),
        };
        let read = if id.is_empty() {
            SAMPLER_STANDIN.to_string()
        } else {
            let coord = if inputs[0].is_empty() {
                "vec3(0.0)"
            } else {
                inputs[0].as_str()
            };
            sample(&id, coord, &inputs[1])
        };
        Ok(format!(
            "vec4 _cube_read = {read};\n{} = _cube_read.rgb;\n{} = _cube_read.a;\n",
            outputs[0], outputs[1]
        ))
    }

    fn param_schema(&self) -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::new("source", ParamKind::Enum(CubeMapSource::NAMES)),
            ParamSpec::new("cube_map", ParamKind::Resource),
            ParamSpec::new("texture_type", ParamKind::Enum(TextureType::NAMES)),
        ];
        SCHEMA
    }

    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "source" => Some(self.source.to_param()),
            "cube_map" => Some(ParamValue::Resource(self.cube_map.clone())),
            "texture_type" => Some(self.texture_type.to_param()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        match name {
            "source" => self.source = CubeMapSource::from_param(name, value)?,
            "cube_map" => self.cube_map = params::as_resource(name, value)?,
            "texture_type" => self.texture_type = TextureType::from_param(name, value)?,
            _ => return Err(params::unknown(self.kind(), name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> Vec<String> {
        vec!["n3_0".to_string(), "n3_1".to_string()]
    }

    fn inputs(uv: &str, lod: &str, sampler: &str) -> Vec<String> {
        vec![uv.to_string(), lod.to_string(), sampler.to_string()]
    }

    #[test]
    fn test_owned_uniform() {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 3);
        let node = TextureNode::default();
        assert_eq!(node.global_declarations(&ctx), "uniform sampler2D tex_frg_3;\n");
        assert_eq!(node.uniform_bindings(&ctx), vec![UniformBinding::new("tex_frg_3", None)]);
        let body = node.generate_body(&ctx, &inputs(UV_HINT, "", ""), &outputs()).unwrap();
        assert!(body.starts_with("vec4 tex_frg_3_read = texture(tex_frg_3, vec3(UV, 0.0).xy);\n"));
    }

    #[test]
    fn test_disconnected_sampler_port() {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 3);
        let node = TextureNode::new(TextureSource::SamplerPort);
        let body = node.generate_body(&ctx, &inputs("", "", ""), &outputs()).unwrap();
        assert_eq!(body, "n3_0 = vec3(0.0);\nn3_1 = 1.0;\n");
        assert!(node.uniform_bindings(&ctx).is_empty());

        let wired = node
            .generate_body(&ctx, &inputs("", "1.0", "SCREEN_TEXTURE"), &outputs())
            .unwrap();
        assert!(wired.starts_with("vec4 _tex_read = textureLod(SCREEN_TEXTURE, vec2(0.0), 1.0);\n"));
    }

    #[test]
    fn test_depth_source() {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Fragment, 3);
        let node = TextureNode::new(TextureSource::Depth);
        assert_eq!(node.outputs()[0].port_type, PortType::Scalar);

        let body = node.generate_body(&ctx, &inputs("", "", ""), &outputs()).unwrap();
        assert!(body.contains("DEPTH_TEXTURE"));

        let preview = ctx.for_preview();
        let body = node.generate_body(&preview, &inputs("", "", ""), &outputs()).unwrap();
        assert_eq!(body, "n3_0 = 0.0;\nn3_1 = 1.0;\n");
        assert!(node.stage_restriction(&preview).is_some());

        assert!(node.warning(ShaderMode::CanvasItem, Stage::Fragment).is_some());
        assert!(node.warning(ShaderMode::Spatial, Stage::Fragment).is_none());
    }

    #[test]
    fn test_cubemap() {
        let ctx = NodeContext::new(ShaderMode::Spatial, Stage::Light, 6);
        let node = CubeMapNode::default();
        assert_eq!(node.global_declarations(&ctx), "uniform samplerCube cube_lgt_6;\n");
        let body = node.generate_body(&ctx, &inputs("", "", ""), &outputs()).unwrap();
        assert!(body.starts_with("vec4 _cube_read = texture(cube_lgt_6, vec3(0.0));\n"));

        let port = CubeMapNode::new(CubeMapSource::SamplerPort);
        let body = port.generate_body(&ctx, &inputs("", "", ""), &outputs()).unwrap();
        assert!(body.starts_with("vec4 _cube_read = vec4(0.0);\n"));
    }
}
