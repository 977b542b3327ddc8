// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader stages, shader modes and render-mode tables.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three shader entry functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// `void vertex()`
    Vertex,
    /// `void fragment()`
    Fragment,
    /// `void light()`
    Light,
}

impl Stage {
    /// Stages in emission order
    pub const ALL: [Stage; 3] = [Self::Vertex, Self::Fragment, Self::Light];

    /// Position in [`Stage::ALL`]
    pub fn index(self) -> usize {
        match self {
            Self::Vertex => 0,
            Self::Fragment => 1,
            Self::Light => 2,
        }
    }

    /// Entry function name, also used as the persisted stage name
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Light => "light",
        }
    }

    /// Short tag used in generated identifiers (`tex_frg_5`)
    pub fn tag(self) -> &'static str {
        match self {
            Self::Vertex => "vtx",
            Self::Fragment => "frg",
            Self::Light => "lgt",
        }
    }

    /// Parse a persisted stage name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Family of built-ins and output ports a shader exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaderMode {
    /// 3D materials
    #[default]
    Spatial,
    /// 2D canvas items
    CanvasItem,
    /// GPU particle processing
    Particles,
}

/// An enumerated render mode: exactly one option may be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderModeEnum {
    /// Group name (`blend`, `cull`, ...)
    pub name: &'static str,
    /// Emitted option keywords
    pub options: &'static [&'static str],
}

const SPATIAL_MODES: &[RenderModeEnum] = &[
    RenderModeEnum {
        name: "blend",
        options: &["blend_mix", "blend_add", "blend_sub", "blend_mul"],
    },
    RenderModeEnum {
        name: "depth_draw",
        options: &[
            "depth_draw_opaque",
            "depth_draw_always",
            "depth_draw_never",
            "depth_draw_alpha_prepass",
        ],
    },
    RenderModeEnum {
        name: "cull",
        options: &["cull_front", "cull_back", "cull_disabled"],
    },
    RenderModeEnum {
        name: "diffuse",
        options: &[
            "diffuse_lambert",
            "diffuse_lambert_wrap",
            "diffuse_oren_nayar",
            "diffuse_burley",
            "diffuse_toon",
        ],
    },
    RenderModeEnum {
        name: "specular",
        options: &[
            "specular_schlick_ggx",
            "specular_blinn",
            "specular_phong",
            "specular_toon",
            "specular_disabled",
        ],
    },
    RenderModeEnum {
        name: "async",
        options: &["async_visible", "async_hidden"],
    },
];

const CANVAS_MODES: &[RenderModeEnum] = &[RenderModeEnum {
    name: "blend",
    options: &[
        "blend_mix",
        "blend_add",
        "blend_sub",
        "blend_mul",
        "blend_premul_alpha",
        "blend_disabled",
    ],
}];

const SPATIAL_FLAGS: &[&str] = &[
    "depth_test_disable",
    "unshaded",
    "skip_vertex_transform",
    "world_vertex_coords",
    "ensure_correct_normals",
    "shadows_disabled",
    "ambient_light_disabled",
    "shadow_to_opacity",
    "vertex_lighting",
];

const CANVAS_FLAGS: &[&str] = &["skip_vertex_transform", "unshaded", "light_only"];

const PARTICLES_FLAGS: &[&str] = &["keep_data", "disable_force", "disable_velocity"];

impl ShaderMode {
    /// All modes
    pub const ALL: [ShaderMode; 3] = [Self::Spatial, Self::CanvasItem, Self::Particles];

    /// Keyword written after `shader_type`
    pub fn shader_type(self) -> &'static str {
        match self {
            Self::Spatial => "spatial",
            Self::CanvasItem => "canvas_item",
            Self::Particles => "particles",
        }
    }

    /// Name used in saved graphs
    pub fn persisted_name(self) -> &'static str {
        match self {
            Self::Spatial => "spatial",
            Self::CanvasItem => "canvas",
            Self::Particles => "particles",
        }
    }

    /// Parse a saved mode name; the `shader_type` keyword is accepted too
    pub fn from_persisted_name(name: &str) -> Option<Self> {
        match name {
            "spatial" => Some(Self::Spatial),
            "canvas" | "canvas_item" => Some(Self::CanvasItem),
            "particles" => Some(Self::Particles),
            _ => None,
        }
    }

    /// Enumerated render modes available in this mode
    pub fn render_mode_enums(self) -> &'static [RenderModeEnum] {
        match self {
            Self::Spatial => SPATIAL_MODES,
            Self::CanvasItem => CANVAS_MODES,
            Self::Particles => &[],
        }
    }

    /// Boolean render flags available in this mode
    pub fn render_flags(self) -> &'static [&'static str] {
        match self {
            Self::Spatial => SPATIAL_FLAGS,
            Self::CanvasItem => CANVAS_FLAGS,
            Self::Particles => PARTICLES_FLAGS,
        }
    }

    /// Look up an enumerated render mode group
    pub fn render_mode_enum(self, name: &str) -> Option<&'static RenderModeEnum> {
        self.render_mode_enums().iter().find(|e| e.name == name)
    }
}

impl fmt::Display for ShaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shader_type())
    }
}

/// Build the `shader_type` / `render_mode` header.
///
/// Enumerated modes come first in table order, then flags in table order.
/// Entries not valid for `mode` are skipped.
pub fn shader_header(
    mode: ShaderMode,
    render_modes: &IndexMap<String, usize>,
    flags: &IndexSet<String>,
) -> String {
    let mut out = format!("shader_type {};\n", mode.shader_type());

    let mut keywords: Vec<&str> = Vec::new();
    for group in mode.render_mode_enums() {
        if let Some(option) = render_modes
            .get(group.name)
            .and_then(|index| group.options.get(*index))
        {
            keywords.push(option);
        }
    }
    for flag in mode.render_flags() {
        if flags.contains(*flag) {
            keywords.push(flag);
        }
    }

    if !keywords.is_empty() {
        out.push_str("render_mode ");
        out.push_str(&keywords.join(", "));
        out.push_str(";\n");
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_name(stage.name()), Some(stage));
            assert_eq!(Stage::ALL[stage.index()], stage);
        }
        assert_eq!(Stage::Fragment.tag(), "frg");
    }

    #[test]
    fn test_mode_names() {
        for mode in ShaderMode::ALL {
            assert_eq!(ShaderMode::from_persisted_name(mode.persisted_name()), Some(mode));
        }
        assert_eq!(
            ShaderMode::from_persisted_name("canvas_item"),
            Some(ShaderMode::CanvasItem)
        );
    }

    #[test]
    fn test_header_ordering() {
        let mut modes = IndexMap::new();
        modes.insert("cull".to_string(), 2);
        modes.insert("blend".to_string(), 1);
        let mut flags = IndexSet::new();
        flags.insert("vertex_lighting".to_string());
        flags.insert("unshaded".to_string());
        flags.insert("light_only".to_string()); // canvas only, ignored

        let header = shader_header(ShaderMode::Spatial, &modes, &flags);
        assert_eq!(
            header,
            "shader_type spatial;\nrender_mode blend_add, cull_disabled, unshaded, vertex_lighting;\n\n"
        );
    }

    #[test]
    fn test_header_without_modes() {
        let header = shader_header(ShaderMode::Particles, &IndexMap::new(), &IndexSet::new());
        assert_eq!(header, "shader_type particles;\n\n");
    }
}
