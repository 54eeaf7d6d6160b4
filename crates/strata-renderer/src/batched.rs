// CPU vertex batching: many rects sharing round and rounding power are
// expanded into one vertex/index buffer pair and drawn with a single call.

use strata_core::{BufferId, BufferUsage, Color, GraphicsDevice, Rect, ShaderKind, ShaderUniforms};

use crate::vertex::{BatchedRectVertex, QUAD_INDICES};

#[derive(Debug, Clone, Copy)]
struct BatchBuffers {
    vertices: BufferId,
    indices: BufferId,
}

pub struct BatchedRectRenderer {
    vertices: Vec<BatchedRectVertex>,
    indices: Vec<u32>,
    round: f32,
    rounding_power: f32,
    buffers: Option<BatchBuffers>,
    enabled: bool,
}

impl Default for BatchedRectRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchedRectRenderer {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(4096),
            indices: Vec::with_capacity(6144),
            round: 0.0,
            rounding_power: 2.0,
            buffers: None,
            enabled: false,
        }
    }

    /// Compiles the batched shader and allocates the streaming buffers.
    /// On failure the renderer stays disabled and callers fall back.
    pub fn init(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        if self.enabled {
            return true;
        }
        if let Err(e) = device.compile_shader(ShaderKind::BatchedQuad) {
            log::error!("batched rect renderer disabled: {}", e);
            return false;
        }
        let vertices = match device.create_buffer(BufferUsage::Vertex) {
            Ok(id) => id,
            Err(e) => {
                log::error!("batched rect renderer disabled: {}", e);
                return false;
            }
        };
        let indices = match device.create_buffer(BufferUsage::Index) {
            Ok(id) => id,
            Err(e) => {
                log::error!("batched rect renderer disabled: {}", e);
                device.destroy_buffer(vertices);
                return false;
            }
        };
        self.buffers = Some(BatchBuffers { vertices, indices });
        self.enabled = true;
        true
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(buffers) = self.buffers.take() {
            device.destroy_buffer(buffers.vertices);
            device.destroy_buffer(buffers.indices);
        }
        self.enabled = false;
        self.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Starts a new batch; anything pending is discarded.
    pub fn begin_batch(&mut self, round: f32, rounding_power: f32) {
        self.clear();
        self.round = round;
        self.rounding_power = rounding_power;
    }

    /// Appends one rect (pixels). `color` is premultiplied here.
    pub fn add_rect(&mut self, rect: Rect, color: Color) {
        let base = self.vertices.len() as u32;
        let c = color.premultiplied();
        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);

        self.vertices.push(BatchedRectVertex {
            position: [x, y],
            uv: [0.0, 0.0],
            color: c,
        });
        self.vertices.push(BatchedRectVertex {
            position: [x + w, y],
            uv: [1.0, 0.0],
            color: c,
        });
        self.vertices.push(BatchedRectVertex {
            position: [x + w, y + h],
            uv: [1.0, 1.0],
            color: c,
        });
        self.vertices.push(BatchedRectVertex {
            position: [x, y + h],
            uv: [0.0, 1.0],
            color: c,
        });

        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Uploads and draws everything added since `begin_batch`.
    /// Returns the number of draw calls issued (0 or 1).
    pub fn end_batch(&mut self, device: &mut dyn GraphicsDevice) -> u32 {
        let Some(buffers) = self.buffers.filter(|_| self.enabled) else {
            self.clear();
            return 0;
        };
        if self.indices.is_empty() {
            return 0;
        }

        device.upload_buffer(buffers.vertices, bytemuck::cast_slice(&self.vertices));
        device.upload_buffer(buffers.indices, bytemuck::cast_slice(&self.indices));
        device.bind_shader(ShaderKind::BatchedQuad);
        device.set_uniforms(&ShaderUniforms {
            round: self.round,
            rounding_power: self.rounding_power,
            alpha: 1.0,
            ..Default::default()
        });
        device.bind_vertex_buffers(&[buffers.vertices], buffers.indices);
        device.draw_indexed(self.indices.len() as u32);
        self.clear();
        1
    }

    pub fn rect_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn vertices(&self) -> &[BatchedRectVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

impl Drop for BatchedRectRenderer {
    fn drop(&mut self) {
        if self.buffers.is_some() {
            log::warn!("BatchedRectRenderer dropped without release; GPU buffers leaked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DeviceCommand, HeadlessDevice};

    #[test]
    fn rect_expands_to_four_vertices_and_six_indices() {
        let mut renderer = BatchedRectRenderer::new();
        renderer.begin_batch(0.0, 2.0);
        renderer.add_rect(Rect::new(10.0, 20.0, 30.0, 40.0), Color::new(1.0, 0.5, 0.0, 0.5));
        renderer.add_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);

        assert_eq!(renderer.rect_count(), 2);
        assert_eq!(renderer.indices(), &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);

        let v = renderer.vertices();
        assert_eq!(v[0].position, [10.0, 20.0]);
        assert_eq!(v[1].position, [40.0, 20.0]);
        assert_eq!(v[2].position, [40.0, 60.0]);
        assert_eq!(v[3].position, [10.0, 60.0]);
        assert_eq!(v[2].uv, [1.0, 1.0]);
        assert_eq!(v[0].color, [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn end_batch_issues_single_draw() {
        let mut device = HeadlessDevice::new();
        let log = device.log();
        let mut renderer = BatchedRectRenderer::new();
        assert!(renderer.init(&mut device));

        renderer.begin_batch(8.0, 2.0);
        for i in 0..50 {
            renderer.add_rect(Rect::new(i as f32, 0.0, 1.0, 1.0), Color::WHITE);
        }
        assert_eq!(renderer.end_batch(&mut device), 1);
        assert_eq!(log.draws_with(ShaderKind::BatchedQuad), 1);
        assert!(log.commands().contains(&DeviceCommand::Draw {
            shader: Some(ShaderKind::BatchedQuad),
            index_count: 300,
        }));
        assert_eq!(renderer.rect_count(), 0);
        renderer.release(&mut device);
    }

    #[test]
    fn empty_batch_draws_nothing() {
        let mut device = HeadlessDevice::new();
        let mut renderer = BatchedRectRenderer::new();
        renderer.init(&mut device);
        renderer.begin_batch(0.0, 2.0);
        assert_eq!(renderer.end_batch(&mut device), 0);
        renderer.release(&mut device);
    }

    #[test]
    fn compile_failure_leaves_renderer_disabled() {
        let mut device = HeadlessDevice::new().fail_shader(ShaderKind::BatchedQuad);
        let log = device.log();
        let mut renderer = BatchedRectRenderer::new();
        assert!(!renderer.init(&mut device));
        assert!(!renderer.is_enabled());
        assert!(log.live_buffers().is_empty());
    }
}
