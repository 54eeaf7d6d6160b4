// One draw per shape, positioned through uniforms over a shared unit quad.
// Used by pass elements and by the batch manager's fallback path.

use std::collections::HashSet;

use strata_core::{
    BufferId, BufferUsage, Color, DeviceError, GraphicsDevice, Rect, Region, ShaderKind,
    ShaderUniforms,
};

use crate::vertex::{QUAD_INDICES, UNIT_QUAD};

const IMMEDIATE_SHADERS: [ShaderKind; 4] = [
    ShaderKind::Quad,
    ShaderKind::Texture,
    ShaderKind::Border,
    ShaderKind::Shadow,
];

#[derive(Debug, Clone, Copy)]
struct QuadBuffers {
    vertices: BufferId,
    indices: BufferId,
}

/// Geometry shared by the rounded-shape draws.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    /// Pixel rect.
    pub rect: Rect,
    pub round: f32,
    pub rounding_power: f32,
}

impl Shape {
    pub fn new(rect: Rect, round: f32, rounding_power: f32) -> Self {
        Self { rect, round, rounding_power }
    }
}

#[derive(Default)]
pub struct ImmediateRenderer {
    buffers: Option<QuadBuffers>,
    available: HashSet<ShaderKind>,
}

impl ImmediateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the per-shape shaders and uploads the unit quad.
    /// A shader that fails to compile disables only its own kind; failing
    /// to allocate the quad buffers is an error.
    pub fn init(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), DeviceError> {
        if self.buffers.is_some() {
            return Ok(());
        }
        for kind in IMMEDIATE_SHADERS {
            match device.compile_shader(kind) {
                Ok(()) => {
                    self.available.insert(kind);
                }
                Err(e) => log::error!("{} draws disabled: {}", kind, e),
            }
        }

        let vertices = device.create_buffer(BufferUsage::Vertex)?;
        let indices = match device.create_buffer(BufferUsage::Index) {
            Ok(id) => id,
            Err(e) => {
                device.destroy_buffer(vertices);
                return Err(e);
            }
        };
        device.upload_buffer(vertices, bytemuck::cast_slice(&UNIT_QUAD));
        device.upload_buffer(indices, bytemuck::cast_slice(&QUAD_INDICES));
        self.buffers = Some(QuadBuffers { vertices, indices });
        Ok(())
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(buffers) = self.buffers.take() {
            device.destroy_buffer(buffers.vertices);
            device.destroy_buffer(buffers.indices);
        }
        self.available.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn supports(&self, kind: ShaderKind) -> bool {
        self.buffers.is_some() && self.available.contains(&kind)
    }

    pub fn render_rect(
        &self,
        device: &mut dyn GraphicsDevice,
        shape: Shape,
        color: Color,
        damage: Option<&Region>,
    ) -> u32 {
        let uniforms = ShaderUniforms {
            rect: shape.rect,
            color: color.premultiplied(),
            round: shape.round,
            rounding_power: shape.rounding_power,
            alpha: 1.0,
            ..Default::default()
        };
        self.draw(device, ShaderKind::Quad, shape.rect, &uniforms, damage)
    }

    /// Draws the currently bound texture into `shape`.
    pub fn render_texture(
        &self,
        device: &mut dyn GraphicsDevice,
        shape: Shape,
        alpha: f32,
        damage: Option<&Region>,
    ) -> u32 {
        let uniforms = ShaderUniforms {
            rect: shape.rect,
            color: [1.0; 4],
            round: shape.round,
            rounding_power: shape.rounding_power,
            alpha,
            ..Default::default()
        };
        self.draw(device, ShaderKind::Texture, shape.rect, &uniforms, damage)
    }

    /// Outline of `thickness` pixels drawn outside `shape`.
    pub fn render_border(
        &self,
        device: &mut dyn GraphicsDevice,
        shape: Shape,
        color: Color,
        thickness: f32,
        damage: Option<&Region>,
    ) -> u32 {
        let uniforms = ShaderUniforms {
            rect: shape.rect,
            color: color.premultiplied(),
            round: shape.round,
            rounding_power: shape.rounding_power,
            alpha: 1.0,
            thickness,
            ..Default::default()
        };
        let bounds = shape.rect.expand(thickness);
        self.draw(device, ShaderKind::Border, bounds, &uniforms, damage)
    }

    /// Soft shadow falling off over `range` pixels around `shape`.
    pub fn render_shadow(
        &self,
        device: &mut dyn GraphicsDevice,
        shape: Shape,
        color: Color,
        range: f32,
        damage: Option<&Region>,
    ) -> u32 {
        let uniforms = ShaderUniforms {
            rect: shape.rect,
            color: color.premultiplied(),
            round: shape.round,
            rounding_power: shape.rounding_power,
            alpha: 1.0,
            range,
            ..Default::default()
        };
        let bounds = shape.rect.expand(range);
        self.draw(device, ShaderKind::Shadow, bounds, &uniforms, damage)
    }

    /// Clears every damaged rect, or the current scissor when `damage` is None.
    pub fn render_clear(
        &self,
        device: &mut dyn GraphicsDevice,
        color: Color,
        damage: Option<&Region>,
    ) -> u32 {
        let Some(damage) = damage else {
            device.clear(color);
            return 1;
        };
        for rect in damage.rects() {
            device.set_scissor(Some(*rect));
            device.clear(color);
        }
        device.set_scissor(None);
        damage.rects().len() as u32
    }

    /// Issues the draw once per damage rect overlapping `bounds`, scissored
    /// to that rect. Without damage the draw happens once under the current
    /// scissor. Returns the number of draws issued.
    fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        kind: ShaderKind,
        bounds: Rect,
        uniforms: &ShaderUniforms,
        damage: Option<&Region>,
    ) -> u32 {
        let Some(buffers) = self.buffers else {
            return 0;
        };
        if !self.available.contains(&kind) {
            return 0;
        }

        let clip = bounds.round_out();
        if let Some(damage) = damage {
            if !damage.intersects_rect(&clip) {
                return 0;
            }
        }

        device.bind_shader(kind);
        device.set_uniforms(uniforms);
        device.bind_vertex_buffers(&[buffers.vertices], buffers.indices);

        let Some(damage) = damage else {
            device.draw_indexed(QUAD_INDICES.len() as u32);
            return 1;
        };
        let mut draws = 0;
        for rect in damage.rects() {
            if let Some(scissor) = rect.intersection(&clip) {
                device.set_scissor(Some(scissor));
                device.draw_indexed(QUAD_INDICES.len() as u32);
                draws += 1;
            }
        }
        device.set_scissor(None);
        draws
    }
}

impl Drop for ImmediateRenderer {
    fn drop(&mut self) {
        if self.buffers.is_some() {
            log::warn!("ImmediateRenderer dropped without release; quad buffers leaked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DeviceCommand, HeadlessDevice};
    use strata_core::IRect;

    fn ready() -> (HeadlessDevice, ImmediateRenderer) {
        let mut device = HeadlessDevice::new();
        let mut renderer = ImmediateRenderer::new();
        renderer.init(&mut device).unwrap();
        (device, renderer)
    }

    #[test]
    fn draws_once_per_overlapping_damage_rect() {
        let (mut device, mut renderer) = ready();
        let log = device.log();
        log.clear();

        let mut damage = Region::from(IRect::new(0, 0, 10, 10));
        damage.add_rect(IRect::new(50, 50, 60, 60));
        damage.add_rect(IRect::new(500, 500, 510, 510));
        let shape = Shape::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0, 2.0);

        let draws = renderer.render_rect(&mut device, shape, Color::WHITE, Some(&damage));
        assert_eq!(draws, 2);
        assert_eq!(log.draw_calls(), 2);
        assert!(log.commands().contains(&DeviceCommand::SetScissor(Some(IRect::new(50, 50, 60, 60)))));
        renderer.release(&mut device);
    }

    #[test]
    fn no_damage_draws_once_without_touching_scissor() {
        let (mut device, mut renderer) = ready();
        let log = device.log();
        log.clear();

        let shape = Shape::new(Rect::new(0.0, 0.0, 10.0, 10.0), 4.0, 2.0);
        assert_eq!(renderer.render_rect(&mut device, shape, Color::BLACK, None), 1);
        assert_eq!(log.count(|c| matches!(c, DeviceCommand::SetScissor(_))), 0);
        renderer.release(&mut device);
    }

    #[test]
    fn disjoint_damage_skips_draw() {
        let (mut device, mut renderer) = ready();
        let log = device.log();
        log.clear();

        let damage = Region::from(IRect::new(200, 200, 210, 210));
        let shape = Shape::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 2.0);
        assert_eq!(renderer.render_rect(&mut device, shape, Color::BLACK, Some(&damage)), 0);
        assert!(log.is_empty());
        renderer.release(&mut device);
    }

    #[test]
    fn border_bounds_include_thickness() {
        let (mut device, mut renderer) = ready();
        let damage = Region::from(IRect::new(100, 0, 104, 10));
        let shape = Shape::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0, 2.0);
        let draws = renderer.render_border(&mut device, shape, Color::WHITE, 3.0, Some(&damage));
        assert_eq!(draws, 1);
        renderer.release(&mut device);
    }

    #[test]
    fn failed_shader_disables_only_its_kind() {
        let mut device = HeadlessDevice::new().fail_shader(ShaderKind::Shadow);
        let mut renderer = ImmediateRenderer::new();
        renderer.init(&mut device).unwrap();
        assert!(!renderer.supports(ShaderKind::Shadow));
        assert!(renderer.supports(ShaderKind::Quad));

        let shape = Shape::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 2.0);
        assert_eq!(renderer.render_shadow(&mut device, shape, Color::BLACK, 8.0, None), 0);
        renderer.release(&mut device);
    }

    #[test]
    fn release_destroys_quad_buffers() {
        let (mut device, mut renderer) = ready();
        let log = device.log();
        assert_eq!(log.live_buffers().len(), 2);
        renderer.release(&mut device);
        assert!(log.live_buffers().is_empty());
    }
}
