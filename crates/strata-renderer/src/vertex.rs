// GPU vertex and uniform types for the quad, batched and instanced pipelines.

use bytemuck::{Pod, Zeroable};

/// Corner order shared by every quad: top-left, top-right, bottom-right, bottom-left.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Unit quad corner. Positions and UVs span 0..1; the vertex shader maps
/// them onto the shape rect (uniform) or the instance rect.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

pub const UNIT_QUAD: [QuadVertex; 4] = [
    QuadVertex { position: [0.0, 0.0], uv: [0.0, 0.0] },
    QuadVertex { position: [1.0, 0.0], uv: [1.0, 0.0] },
    QuadVertex { position: [1.0, 1.0], uv: [1.0, 1.0] },
    QuadVertex { position: [0.0, 1.0], uv: [0.0, 1.0] },
];

impl QuadVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// One corner of a CPU-batched rect. 32 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BatchedRectVertex {
    pub position: [f32; 2], // px
    pub uv: [f32; 2],       // corner of the owning rect, 0..1
    pub color: [f32; 4],    // premultiplied RGBA
}

impl BatchedRectVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BatchedRectVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Per-instance data for the instanced rect pipeline.
/// 32 bytes per instance versus 128 bytes of batched vertices.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    pub rect: [f32; 4],  // x, y, width, height (px)
    pub color: [f32; 4], // premultiplied RGBA
}

impl RectInstance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<RectInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            // rect
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Uniform block shared by every pipeline. Layout matches `Uniforms` in
/// the WGSL sources.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub screen_size: [f32; 2],
    pub round: f32,
    pub rounding_power: f32,
    pub rect: [f32; 4],
    pub color: [f32; 4],
    pub alpha: f32,
    pub thickness: f32,
    pub range: f32,
    pub _pad: f32,
}

impl UniformBlock {
    pub fn new(screen_size: [f32; 2], uniforms: &strata_core::ShaderUniforms) -> Self {
        let r = uniforms.rect;
        Self {
            screen_size,
            round: uniforms.round,
            rounding_power: uniforms.rounding_power,
            rect: [r.x, r.y, r.width, r.height],
            color: uniforms.color,
            alpha: uniforms.alpha,
            thickness: uniforms.thickness,
            range: uniforms.range,
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 16);
        assert_eq!(std::mem::size_of::<BatchedRectVertex>(), 32);
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
        assert_eq!(std::mem::size_of::<UniformBlock>(), 64);
    }
}
