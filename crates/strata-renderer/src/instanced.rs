// Instanced rect drawing: one unit quad, one 32-byte record per rect.
// Batches larger than MAX_INSTANCES_PER_DRAW are split into several draws.

use strata_core::{BufferId, BufferUsage, Color, GraphicsDevice, Rect, ShaderKind, ShaderUniforms};

use crate::vertex::{RectInstance, QUAD_INDICES, UNIT_QUAD};

pub const MAX_INSTANCES_PER_DRAW: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct InstanceBuffers {
    quad_vertices: BufferId,
    quad_indices: BufferId,
    instances: BufferId,
}

pub struct InstancedRectRenderer {
    instances: Vec<RectInstance>,
    round: f32,
    rounding_power: f32,
    buffers: Option<InstanceBuffers>,
    supported: bool,
    /// Draws issued since `begin_batch`, including automatic splits.
    batch_draws: u32,
}

impl Default for InstancedRectRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl InstancedRectRenderer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(1024),
            round: 0.0,
            rounding_power: 2.0,
            buffers: None,
            supported: false,
            batch_draws: 0,
        }
    }

    /// Queries instancing support once and prepares the shared unit quad.
    /// Returns whether instanced drawing is available.
    pub fn init(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        if self.supported {
            return true;
        }
        if !device.capabilities().instancing {
            log::info!("instancing unavailable, rect batches use vertex batching");
            return false;
        }
        if let Err(e) = device.compile_shader(ShaderKind::InstancedQuad) {
            log::error!("instanced rect renderer disabled: {}", e);
            return false;
        }

        let mut created = Vec::with_capacity(3);
        for usage in [BufferUsage::Vertex, BufferUsage::Index, BufferUsage::Instance] {
            match device.create_buffer(usage) {
                Ok(id) => created.push(id),
                Err(e) => {
                    log::error!("instanced rect renderer disabled: {}", e);
                    for id in created {
                        device.destroy_buffer(id);
                    }
                    return false;
                }
            }
        }
        let buffers = InstanceBuffers {
            quad_vertices: created[0],
            quad_indices: created[1],
            instances: created[2],
        };
        device.upload_buffer(buffers.quad_vertices, bytemuck::cast_slice(&UNIT_QUAD));
        device.upload_buffer(buffers.quad_indices, bytemuck::cast_slice(&QUAD_INDICES));
        self.buffers = Some(buffers);
        self.supported = true;
        true
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(buffers) = self.buffers.take() {
            device.destroy_buffer(buffers.quad_vertices);
            device.destroy_buffer(buffers.quad_indices);
            device.destroy_buffer(buffers.instances);
        }
        self.supported = false;
        self.instances.clear();
    }

    pub fn is_instanced_rendering_supported(&self) -> bool {
        self.supported
    }

    pub fn begin_batch(&mut self, round: f32, rounding_power: f32) {
        self.instances.clear();
        self.round = round;
        self.rounding_power = rounding_power;
        self.batch_draws = 0;
    }

    /// Appends one rect (pixels). A full batch is drawn first, so the caller
    /// never sees the split.
    pub fn add_rect(&mut self, device: &mut dyn GraphicsDevice, rect: Rect, color: Color) {
        if self.instances.len() >= MAX_INSTANCES_PER_DRAW {
            self.draw_pending(device);
        }
        self.instances.push(RectInstance {
            rect: [rect.x, rect.y, rect.width, rect.height],
            color: color.premultiplied(),
        });
    }

    /// Draws the remainder. Returns every draw issued for this batch.
    pub fn end_batch(&mut self, device: &mut dyn GraphicsDevice) -> u32 {
        self.draw_pending(device);
        std::mem::take(&mut self.batch_draws)
    }

    pub fn pending(&self) -> usize {
        self.instances.len()
    }

    fn draw_pending(&mut self, device: &mut dyn GraphicsDevice) {
        let Some(buffers) = self.buffers.filter(|_| self.supported) else {
            self.instances.clear();
            return;
        };
        if self.instances.is_empty() {
            return;
        }

        device.upload_buffer(buffers.instances, bytemuck::cast_slice(&self.instances));
        device.bind_shader(ShaderKind::InstancedQuad);
        device.set_uniforms(&ShaderUniforms {
            round: self.round,
            rounding_power: self.rounding_power,
            alpha: 1.0,
            ..Default::default()
        });
        device.bind_vertex_buffers(&[buffers.quad_vertices, buffers.instances], buffers.quad_indices);
        device.draw_indexed_instanced(QUAD_INDICES.len() as u32, self.instances.len() as u32);
        self.batch_draws += 1;
        self.instances.clear();
    }
}

impl Drop for InstancedRectRenderer {
    fn drop(&mut self) {
        if self.buffers.is_some() {
            log::warn!("InstancedRectRenderer dropped without release; GPU buffers leaked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDevice;
    use strata_core::DeviceCapabilities;

    fn ready() -> (HeadlessDevice, InstancedRectRenderer) {
        let mut device = HeadlessDevice::new();
        let mut renderer = InstancedRectRenderer::new();
        assert!(renderer.init(&mut device));
        (device, renderer)
    }

    #[test]
    fn splits_at_instance_limit() {
        let (mut device, mut renderer) = ready();
        let log = device.log();

        renderer.begin_batch(0.0, 2.0);
        for i in 0..25_000 {
            renderer.add_rect(&mut device, Rect::new(i as f32, 0.0, 1.0, 1.0), Color::WHITE);
        }
        assert_eq!(renderer.end_batch(&mut device), 3);
        assert_eq!(log.instanced_draws(), vec![10_000, 10_000, 5_000]);
        renderer.release(&mut device);
    }

    #[test]
    fn exactly_at_limit_is_one_draw() {
        let (mut device, mut renderer) = ready();
        renderer.begin_batch(0.0, 2.0);
        for _ in 0..MAX_INSTANCES_PER_DRAW {
            renderer.add_rect(&mut device, Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        }
        assert_eq!(renderer.end_batch(&mut device), 1);
        renderer.release(&mut device);
    }

    #[test]
    fn instance_colors_are_premultiplied() {
        let (mut device, mut renderer) = ready();
        let log = device.log();
        renderer.begin_batch(0.0, 2.0);
        renderer.add_rect(&mut device, Rect::new(0.0, 0.0, 2.0, 2.0), Color::new(1.0, 1.0, 1.0, 0.25));
        assert_eq!(renderer.instances[0].color, [0.25, 0.25, 0.25, 0.25]);
        renderer.end_batch(&mut device);
        assert_eq!(log.instanced_draws(), vec![1]);
        renderer.release(&mut device);
    }

    #[test]
    fn unsupported_without_instancing_capability() {
        let mut device = HeadlessDevice::with_capabilities(DeviceCapabilities {
            instancing: false,
            live_blur: false,
        });
        let log = device.log();
        let mut renderer = InstancedRectRenderer::new();
        assert!(!renderer.init(&mut device));
        assert!(!renderer.is_instanced_rendering_supported());
        assert!(log.is_empty());
    }
}
