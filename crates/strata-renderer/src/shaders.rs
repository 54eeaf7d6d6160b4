// WGSL sources for every pipeline. All colors reaching the fragment stage
// are premultiplied; pipelines blend with PREMULTIPLIED_ALPHA_BLENDING.

use strata_core::ShaderKind;

/// Uniform block, coordinate conversion and the rounded-box SDF.
const PRELUDE: &str = r#"
struct Uniforms {
    screen_size: vec2<f32>,
    round: f32,
    rounding_power: f32,
    rect: vec4<f32>,
    color: vec4<f32>,
    alpha: f32,
    thickness: f32,
    range: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

// Pixel coords to NDC: x: [0, width] -> [-1, 1], y: [0, height] -> [1, -1]
fn to_clip(p: vec2<f32>) -> vec4<f32> {
    let ndc_x = (p.x / u.screen_size.x) * 2.0 - 1.0;
    let ndc_y = 1.0 - (p.y / u.screen_size.y) * 2.0;
    return vec4<f32>(ndc_x, ndc_y, 0.0, 1.0);
}

fn length_p(v: vec2<f32>, power: f32) -> f32 {
    return pow(pow(v.x, power) + pow(v.y, power), 1.0 / power);
}

// Superellipse corners: power 2 is a circle, larger powers approach a square.
fn sdf_rounded_rect(p: vec2<f32>, center: vec2<f32>, half: vec2<f32>, r: f32, power: f32) -> f32 {
    let radius = clamp(r, 0.0, min(half.x, half.y));
    let d = abs(p - center) - half + vec2<f32>(radius);
    let corner = length_p(max(d, vec2<f32>(0.0)), max(power, 1.0));
    return corner + min(max(d.x, d.y), 0.0) - radius;
}

fn coverage(dist: f32) -> f32 {
    return 1.0 - smoothstep(-0.5, 0.5, dist);
}
"#;

/// Quad, border, shadow and texture share one vertex stage driven by the
/// uniform rect, grown by thickness and range so outlines fit.
const SHAPE: &str = r#"
struct QuadInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct ShapeOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) pixel_pos: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_shape(in: QuadInput) -> ShapeOutput {
    var out: ShapeOutput;
    let grow = u.thickness + u.range + 1.0;
    let origin = u.rect.xy - vec2<f32>(grow);
    let size = u.rect.zw + vec2<f32>(grow * 2.0);
    let pixel = origin + in.position * size;
    out.clip_position = to_clip(pixel);
    out.pixel_pos = pixel;
    out.uv = (pixel - u.rect.xy) / max(u.rect.zw, vec2<f32>(1.0));
    return out;
}

fn shape_distance(p: vec2<f32>, grow: f32) -> f32 {
    let half = u.rect.zw * 0.5 + vec2<f32>(grow);
    let center = u.rect.xy + u.rect.zw * 0.5;
    return sdf_rounded_rect(p, center, half, u.round + grow, u.rounding_power);
}

@fragment
fn fs_quad(in: ShapeOutput) -> @location(0) vec4<f32> {
    let cov = coverage(shape_distance(in.pixel_pos, 0.0));
    if cov < 0.001 {
        discard;
    }
    return u.color * cov;
}

@fragment
fn fs_border(in: ShapeOutput) -> @location(0) vec4<f32> {
    let outer = coverage(shape_distance(in.pixel_pos, u.thickness));
    let inner = coverage(shape_distance(in.pixel_pos, 0.0));
    let cov = clamp(outer - inner, 0.0, 1.0);
    if cov < 0.001 {
        discard;
    }
    return u.color * cov * u.alpha;
}

@fragment
fn fs_shadow(in: ShapeOutput) -> @location(0) vec4<f32> {
    let dist = shape_distance(in.pixel_pos, 0.0);
    let falloff = 1.0 - smoothstep(0.0, max(u.range, 1.0), dist);
    return u.color * falloff * u.alpha;
}
"#;

const TEXTURE: &str = r#"
@group(1) @binding(0)
var surface_texture: texture_2d<f32>;
@group(1) @binding(1)
var surface_sampler: sampler;

@fragment
fn fs_texture(in: ShapeOutput) -> @location(0) vec4<f32> {
    let cov = coverage(shape_distance(in.pixel_pos, 0.0));
    let texel = textureSample(surface_texture, surface_sampler, clamp(in.uv, vec2<f32>(0.0), vec2<f32>(1.0)));
    return texel * u.alpha * cov;
}
"#;

/// Many rects per draw. Each rect's own size is recovered from the UV
/// derivatives, so round and rounding power are the only per-draw state.
const BATCHED: &str = r#"
struct BatchedInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct BatchedOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_batched(in: BatchedInput) -> BatchedOutput {
    var out: BatchedOutput;
    out.clip_position = to_clip(in.position);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_batched(in: BatchedOutput) -> @location(0) vec4<f32> {
    let size = 1.0 / max(fwidth(in.uv), vec2<f32>(0.000001));
    let half = size * 0.5;
    let cov = coverage(sdf_rounded_rect(in.uv * size, half, half, u.round, u.rounding_power));
    return in.color * cov;
}
"#;

const INSTANCED: &str = r#"
struct InstanceInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) rect: vec4<f32>,
    @location(3) color: vec4<f32>,
};

struct InstanceOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local: vec2<f32>,
    @location(1) half: vec2<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_instanced(in: InstanceInput) -> InstanceOutput {
    var out: InstanceOutput;
    let pixel = in.rect.xy + in.position * in.rect.zw;
    out.clip_position = to_clip(pixel);
    out.local = in.uv * in.rect.zw;
    out.half = in.rect.zw * 0.5;
    out.color = in.color;
    return out;
}

@fragment
fn fs_instanced(in: InstanceOutput) -> @location(0) vec4<f32> {
    let cov = coverage(sdf_rounded_rect(in.local, in.half, in.half, u.round, u.rounding_power));
    return in.color * cov;
}
"#;

/// Full-screen triangle; the scissor decides what gets cleared.
pub const CLEAR_SHADER: &str = r#"
struct Uniforms {
    screen_size: vec2<f32>,
    round: f32,
    rounding_power: f32,
    rect: vec4<f32>,
    color: vec4<f32>,
    alpha: f32,
    thickness: f32,
    range: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

@vertex
fn vs_clear(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(index & 1u) * 4 - 1);
    let y = f32(i32(index >> 1u) * 4 - 1);
    return vec4<f32>(x, y, 0.0, 1.0);
}

@fragment
fn fs_clear() -> @location(0) vec4<f32> {
    return u.color;
}
"#;

/// Entry points used to build the pipeline for `kind`.
pub struct ShaderEntry {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

pub fn entry_points(kind: ShaderKind) -> ShaderEntry {
    let (vertex, fragment) = match kind {
        ShaderKind::Quad => ("vs_shape", "fs_quad"),
        ShaderKind::Border => ("vs_shape", "fs_border"),
        ShaderKind::Shadow => ("vs_shape", "fs_shadow"),
        ShaderKind::Texture => ("vs_shape", "fs_texture"),
        ShaderKind::BatchedQuad => ("vs_batched", "fs_batched"),
        ShaderKind::InstancedQuad => ("vs_instanced", "fs_instanced"),
    };
    ShaderEntry { vertex, fragment }
}

/// Full WGSL source for `kind`.
pub fn source(kind: ShaderKind) -> String {
    match kind {
        ShaderKind::Quad | ShaderKind::Border | ShaderKind::Shadow => [PRELUDE, SHAPE].concat(),
        ShaderKind::Texture => [PRELUDE, SHAPE, TEXTURE].concat(),
        ShaderKind::BatchedQuad => [PRELUDE, BATCHED].concat(),
        ShaderKind::InstancedQuad => [PRELUDE, INSTANCED].concat(),
    }
}
