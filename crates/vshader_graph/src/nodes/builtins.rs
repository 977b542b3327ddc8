// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stage built-ins read by input nodes and written by output nodes.

use crate::mode::{ShaderMode, Stage};
use crate::port::PortType;

/// A named built-in of one (mode, stage)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    /// Port type
    pub port_type: PortType,
    /// Name shown to the user and stored in files
    pub name: &'static str,
    /// GLSL expression (inputs) or target, optionally `NAME:swizzle` (outputs)
    pub expr: &'static str,
}

const fn scalar(name: &'static str, expr: &'static str) -> Builtin {
    Builtin {
        port_type: PortType::Scalar,
        name,
        expr,
    }
}

const fn vector(name: &'static str, expr: &'static str) -> Builtin {
    Builtin {
        port_type: PortType::Vector3,
        name,
        expr,
    }
}

const fn boolean(name: &'static str, expr: &'static str) -> Builtin {
    Builtin {
        port_type: PortType::Boolean,
        name,
        expr,
    }
}

const fn transform(name: &'static str, expr: &'static str) -> Builtin {
    Builtin {
        port_type: PortType::Transform,
        name,
        expr,
    }
}

const fn sampler(name: &'static str, expr: &'static str) -> Builtin {
    Builtin {
        port_type: PortType::Sampler2D,
        name,
        expr,
    }
}

const SPATIAL_VERTEX_IN: &[Builtin] = &[
    vector("vertex", "VERTEX"),
    vector("normal", "NORMAL"),
    vector("tangent", "TANGENT"),
    vector("binormal", "BINORMAL"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("uv2", "vec3(UV2, 0.0)"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    scalar("point_size", "POINT_SIZE"),
    transform("world", "WORLD_MATRIX"),
    transform("modelview", "MODELVIEW_MATRIX"),
    transform("camera", "CAMERA_MATRIX"),
    transform("inv_camera", "INV_CAMERA_MATRIX"),
    transform("projection", "PROJECTION_MATRIX"),
    transform("inv_projection", "INV_PROJECTION_MATRIX"),
    scalar("time", "TIME"),
    vector("viewport_size", "vec3(VIEWPORT_SIZE, 0.0)"),
    boolean("output_is_srgb", "OUTPUT_IS_SRGB"),
];

const SPATIAL_FRAGMENT_IN: &[Builtin] = &[
    vector("fragcoord", "FRAGCOORD.xyz"),
    vector("vertex", "VERTEX"),
    vector("normal", "NORMAL"),
    vector("tangent", "TANGENT"),
    vector("binormal", "BINORMAL"),
    vector("view", "VIEW"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("uv2", "vec3(UV2, 0.0)"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("point_coord", "vec3(POINT_COORD, 0.0)"),
    vector("screen_uv", "vec3(SCREEN_UV, 0.0)"),
    scalar("side", "float(FRONT_FACING ? 1.0 : 0.0)"),
    transform("world", "WORLD_MATRIX"),
    transform("inv_camera", "INV_CAMERA_MATRIX"),
    transform("camera", "CAMERA_MATRIX"),
    transform("projection", "PROJECTION_MATRIX"),
    transform("inv_projection", "INV_PROJECTION_MATRIX"),
    scalar("time", "TIME"),
    vector("viewport_size", "vec3(VIEWPORT_SIZE, 0.0)"),
    boolean("output_is_srgb", "OUTPUT_IS_SRGB"),
    boolean("front_facing", "FRONT_FACING"),
    sampler("screen_texture", "SCREEN_TEXTURE"),
    sampler("depth_texture", "DEPTH_TEXTURE"),
];

const SPATIAL_LIGHT_IN: &[Builtin] = &[
    vector("fragcoord", "FRAGCOORD.xyz"),
    vector("normal", "NORMAL"),
    vector("view", "VIEW"),
    vector("light", "LIGHT"),
    vector("light_color", "LIGHT_COLOR"),
    vector("attenuation", "ATTENUATION"),
    vector("albedo", "ALBEDO"),
    vector("transmission", "TRANSMISSION"),
    vector("diffuse", "DIFFUSE_LIGHT"),
    vector("specular", "SPECULAR_LIGHT"),
    scalar("roughness", "ROUGHNESS"),
    scalar("metallic", "METALLIC"),
    transform("world", "WORLD_MATRIX"),
    transform("inv_camera", "INV_CAMERA_MATRIX"),
    transform("camera", "CAMERA_MATRIX"),
    transform("projection", "PROJECTION_MATRIX"),
    transform("inv_projection", "INV_PROJECTION_MATRIX"),
    scalar("time", "TIME"),
    vector("viewport_size", "vec3(VIEWPORT_SIZE, 0.0)"),
    boolean("output_is_srgb", "OUTPUT_IS_SRGB"),
];

const CANVAS_VERTEX_IN: &[Builtin] = &[
    vector("vertex", "vec3(VERTEX, 0.0)"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("modulate_color", "MODULATE.rgb"),
    scalar("modulate_alpha", "MODULATE.a"),
    scalar("point_size", "POINT_SIZE"),
    vector("texture_pixel_size", "vec3(TEXTURE_PIXEL_SIZE, 1.0)"),
    transform("world", "WORLD_MATRIX"),
    transform("projection", "PROJECTION_MATRIX"),
    transform("extra", "EXTRA_MATRIX"),
    scalar("time", "TIME"),
    scalar("light_pass", "float(AT_LIGHT_PASS ? 1.0 : 0.0)"),
];

const CANVAS_FRAGMENT_IN: &[Builtin] = &[
    vector("fragcoord", "FRAGCOORD.xyz"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("modulate_color", "MODULATE.rgb"),
    scalar("modulate_alpha", "MODULATE.a"),
    vector("screen_uv", "vec3(SCREEN_UV, 0.0)"),
    vector("texture_pixel_size", "vec3(TEXTURE_PIXEL_SIZE, 1.0)"),
    vector("screen_pixel_size", "vec3(SCREEN_PIXEL_SIZE, 1.0)"),
    vector("point_coord", "vec3(POINT_COORD, 0.0)"),
    scalar("time", "TIME"),
    scalar("light_pass", "float(AT_LIGHT_PASS ? 1.0 : 0.0)"),
    sampler("texture", "TEXTURE"),
    sampler("normal_texture", "NORMAL_TEXTURE"),
    sampler("screen_texture", "SCREEN_TEXTURE"),
];

const CANVAS_LIGHT_IN: &[Builtin] = &[
    vector("fragcoord", "FRAGCOORD.xyz"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("normal", "NORMAL"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("modulate_color", "MODULATE.rgb"),
    scalar("modulate_alpha", "MODULATE.a"),
    vector("light_vec", "vec3(LIGHT_VEC, 0.0)"),
    scalar("light_height", "LIGHT_HEIGHT"),
    vector("light_color", "LIGHT_COLOR.rgb"),
    scalar("light_alpha", "LIGHT_COLOR.a"),
    vector("light_uv", "vec3(LIGHT_UV, 0.0)"),
    vector("shadow_color", "SHADOW_COLOR.rgb"),
    scalar("shadow_alpha", "SHADOW_COLOR.a"),
    vector("shadow_vec", "vec3(SHADOW_VEC, 0.0)"),
    vector("screen_uv", "vec3(SCREEN_UV, 0.0)"),
    vector("texture_pixel_size", "vec3(TEXTURE_PIXEL_SIZE, 1.0)"),
    vector("point_coord", "vec3(POINT_COORD, 0.0)"),
    scalar("time", "TIME"),
    sampler("texture", "TEXTURE"),
];

const PARTICLES_VERTEX_IN: &[Builtin] = &[
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("velocity", "VELOCITY"),
    scalar("restart", "float(RESTART ? 1.0 : 0.0)"),
    scalar("active", "float(ACTIVE ? 1.0 : 0.0)"),
    vector("custom", "CUSTOM.rgb"),
    scalar("custom_alpha", "CUSTOM.a"),
    transform("transform", "TRANSFORM"),
    scalar("delta", "DELTA"),
    scalar("lifetime", "LIFETIME"),
    scalar("index", "float(INDEX)"),
    transform("emission_transform", "EMISSION_TRANSFORM"),
    scalar("time", "TIME"),
];

/// Built-ins an input node may read in a mode and stage
pub fn inputs(mode: ShaderMode, stage: Stage) -> &'static [Builtin] {
    match (mode, stage) {
        (ShaderMode::Spatial, Stage::Vertex) => SPATIAL_VERTEX_IN,
        (ShaderMode::Spatial, Stage::Fragment) => SPATIAL_FRAGMENT_IN,
        (ShaderMode::Spatial, Stage::Light) => SPATIAL_LIGHT_IN,
        (ShaderMode::CanvasItem, Stage::Vertex) => CANVAS_VERTEX_IN,
        (ShaderMode::CanvasItem, Stage::Fragment) => CANVAS_FRAGMENT_IN,
        (ShaderMode::CanvasItem, Stage::Light) => CANVAS_LIGHT_IN,
        (ShaderMode::Particles, Stage::Vertex) => PARTICLES_VERTEX_IN,
        (ShaderMode::Particles, _) => &[],
    }
}

const SPATIAL_FRAGMENT_PREVIEW: &[Builtin] = &[
    vector("normal", "vec3(0.0, 0.0, 1.0)"),
    vector("tangent", "vec3(0.0, 1.0, 0.0)"),
    vector("binormal", "vec3(1.0, 0.0, 0.0)"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("uv2", "vec3(UV, 0.0)"),
    vector("color", "vec3(1.0)"),
    scalar("alpha", "1.0"),
    vector("screen_uv", "vec3(SCREEN_UV, 0.0)"),
    scalar("side", "1.0"),
    scalar("time", "TIME"),
    vector("viewport_size", "vec3(1.0, 1.0, 0.0)"),
];

const SPATIAL_LIGHT_PREVIEW: &[Builtin] = &[
    vector("normal", "vec3(0.0, 0.0, 1.0)"),
    scalar("time", "TIME"),
    vector("viewport_size", "vec3(1.0, 1.0, 0.0)"),
];

const CANVAS_VERTEX_PREVIEW: &[Builtin] = &[
    vector("vertex", "vec3(VERTEX, 0.0)"),
    vector("uv", "vec3(UV, 0.0)"),
    vector("color", "vec3(1.0)"),
    scalar("alpha", "1.0"),
    scalar("time", "TIME"),
];

const CANVAS_FRAGMENT_PREVIEW: &[Builtin] = &[
    vector("uv", "vec3(UV, 0.0)"),
    vector("color", "vec3(1.0)"),
    scalar("alpha", "1.0"),
    vector("screen_uv", "vec3(SCREEN_UV, 0.0)"),
    scalar("time", "TIME"),
];

const CANVAS_LIGHT_PREVIEW: &[Builtin] = &[
    vector("uv", "vec3(UV, 0.0)"),
    vector("normal", "vec3(0.0, 0.0, 1.0)"),
    vector("color", "vec3(1.0)"),
    scalar("alpha", "1.0"),
    vector("screen_uv", "vec3(SCREEN_UV, 0.0)"),
    scalar("time", "TIME"),
];

const PARTICLES_VERTEX_PREVIEW: &[Builtin] = &[
    vector("color", "vec3(1.0)"),
    scalar("alpha", "1.0"),
    vector("velocity", "vec3(0.0, 0.0, 1.0)"),
    scalar("time", "TIME"),
];

/// Substitutes valid inside a canvas-item preview
pub fn preview_inputs(mode: ShaderMode, stage: Stage) -> &'static [Builtin] {
    match (mode, stage) {
        (ShaderMode::Spatial, Stage::Vertex) => &[],
        (ShaderMode::Spatial, Stage::Fragment) => SPATIAL_FRAGMENT_PREVIEW,
        (ShaderMode::Spatial, Stage::Light) => SPATIAL_LIGHT_PREVIEW,
        (ShaderMode::CanvasItem, Stage::Vertex) => CANVAS_VERTEX_PREVIEW,
        (ShaderMode::CanvasItem, Stage::Fragment) => CANVAS_FRAGMENT_PREVIEW,
        (ShaderMode::CanvasItem, Stage::Light) => CANVAS_LIGHT_PREVIEW,
        (ShaderMode::Particles, Stage::Vertex) => PARTICLES_VERTEX_PREVIEW,
        (ShaderMode::Particles, _) => &[],
    }
}

const SPATIAL_VERTEX_OUT: &[Builtin] = &[
    vector("vertex", "VERTEX"),
    vector("normal", "NORMAL"),
    vector("tangent", "TANGENT"),
    vector("binormal", "BINORMAL"),
    vector("uv", "UV:xy"),
    vector("uv2", "UV2:xy"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    scalar("roughness", "ROUGHNESS"),
];

const SPATIAL_FRAGMENT_OUT: &[Builtin] = &[
    vector("albedo", "ALBEDO"),
    scalar("alpha", "ALPHA"),
    scalar("metallic", "METALLIC"),
    scalar("roughness", "ROUGHNESS"),
    scalar("specular", "SPECULAR"),
    vector("emission", "EMISSION"),
    scalar("ao", "AO"),
    vector("normal", "NORMAL"),
    vector("normalmap", "NORMALMAP"),
    scalar("normalmap_depth", "NORMALMAP_DEPTH"),
    scalar("rim", "RIM"),
    scalar("rim_tint", "RIM_TINT"),
    scalar("clearcoat", "CLEARCOAT"),
    scalar("clearcoat_gloss", "CLEARCOAT_GLOSS"),
    scalar("anisotropy", "ANISOTROPY"),
    vector("anisotropy_flow", "ANISOTROPY_FLOW:xy"),
    scalar("subsurf_scatter", "SSS_STRENGTH"),
    vector("transmission", "TRANSMISSION"),
    scalar("alpha_scissor", "ALPHA_SCISSOR"),
    scalar("ao_light_affect", "AO_LIGHT_AFFECT"),
];

const SPATIAL_LIGHT_OUT: &[Builtin] = &[
    vector("diffuse", "DIFFUSE_LIGHT"),
    vector("specular", "SPECULAR_LIGHT"),
];

const CANVAS_VERTEX_OUT: &[Builtin] = &[
    vector("vertex", "VERTEX:xy"),
    vector("uv", "UV:xy"),
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
];

const CANVAS_FRAGMENT_OUT: &[Builtin] = &[
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("normal", "NORMAL"),
    vector("normalmap", "NORMALMAP"),
    scalar("normalmap_depth", "NORMALMAP_DEPTH"),
];

const CANVAS_LIGHT_OUT: &[Builtin] = &[
    vector("light", "LIGHT.rgb"),
    scalar("light_alpha", "LIGHT.a"),
];

const PARTICLES_VERTEX_OUT: &[Builtin] = &[
    vector("color", "COLOR.rgb"),
    scalar("alpha", "COLOR.a"),
    vector("velocity", "VELOCITY"),
    vector("custom", "CUSTOM.rgb"),
    scalar("custom_alpha", "CUSTOM.a"),
    transform("transform", "TRANSFORM"),
];

/// Built-ins the output node writes in a mode and stage
pub fn outputs(mode: ShaderMode, stage: Stage) -> &'static [Builtin] {
    match (mode, stage) {
        (ShaderMode::Spatial, Stage::Vertex) => SPATIAL_VERTEX_OUT,
        (ShaderMode::Spatial, Stage::Fragment) => SPATIAL_FRAGMENT_OUT,
        (ShaderMode::Spatial, Stage::Light) => SPATIAL_LIGHT_OUT,
        (ShaderMode::CanvasItem, Stage::Vertex) => CANVAS_VERTEX_OUT,
        (ShaderMode::CanvasItem, Stage::Fragment) => CANVAS_FRAGMENT_OUT,
        (ShaderMode::CanvasItem, Stage::Light) => CANVAS_LIGHT_OUT,
        (ShaderMode::Particles, Stage::Vertex) => PARTICLES_VERTEX_OUT,
        (ShaderMode::Particles, _) => &[],
    }
}

/// Look up a built-in by name
pub fn find(table: &'static [Builtin], name: &str) -> Option<&'static Builtin> {
    table.iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_per_table() {
        for mode in ShaderMode::ALL {
            for stage in Stage::ALL {
                for table in [inputs(mode, stage), outputs(mode, stage), preview_inputs(mode, stage)] {
                    let mut names: Vec<&str> = table.iter().map(|b| b.name).collect();
                    names.sort_unstable();
                    names.dedup();
                    assert_eq!(names.len(), table.len(), "{mode} {stage}");
                }
            }
        }
    }

    #[test]
    fn test_preview_substitutes_keep_types() {
        for mode in ShaderMode::ALL {
            for stage in Stage::ALL {
                for sub in preview_inputs(mode, stage) {
                    let real = find(inputs(mode, stage), sub.name).unwrap();
                    assert_eq!(real.port_type, sub.port_type, "{}", sub.name);
                }
            }
        }
    }
}
