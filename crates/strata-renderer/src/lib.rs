// Draw-call batching and immediate drawing over a GraphicsDevice, plus the
// headless and wgpu device implementations.

pub mod batch;
pub mod batched;
pub mod config;
pub mod headless;
pub mod immediate;
pub mod instanced;
pub mod shaders;
pub mod vertex;
pub mod wgpu_device;

mod init;

pub use batch::{BatchKey, BatchKind, BatchMetrics, RenderBatch, RenderBatchManager};
pub use batched::BatchedRectRenderer;
pub use config::{BatchConfig, BlurConfig};
pub use headless::{CommandLog, DeviceCommand, HeadlessDevice};
pub use immediate::{ImmediateRenderer, Shape};
pub use instanced::{InstancedRectRenderer, MAX_INSTANCES_PER_DRAW};
pub use wgpu_device::{WgpuDevice, WgpuInitError};

use strata_core::{
    BlurSource, Color, DeviceError, GraphicsDevice, Monitor, Region, TextureId,
};

/// Everything needed to draw one output: the device, the batch manager (which
/// owns the immediate renderer), the monitor and the blur settings.
///
/// Dropping the context releases every renderer buffer through the device
/// before the device itself is dropped.
pub struct RenderContext {
    batches: RenderBatchManager,
    monitor: Monitor,
    blur: BlurConfig,
    debug_pass: bool,
    device: Box<dyn GraphicsDevice>,
}

impl RenderContext {
    pub fn new(
        mut device: Box<dyn GraphicsDevice>,
        monitor: Monitor,
        batch: BatchConfig,
        blur: BlurConfig,
    ) -> Result<Self, DeviceError> {
        let mut batches = RenderBatchManager::new(batch);
        if let Err(e) = batches.init(device.as_mut()) {
            batches.release(device.as_mut());
            return Err(e);
        }
        Ok(Self {
            batches,
            monitor,
            blur,
            debug_pass: false,
            device,
        })
    }

    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn set_monitor(&mut self, monitor: Monitor) {
        self.monitor = monitor;
    }

    pub fn immediate(&self) -> &ImmediateRenderer {
        self.batches.immediate()
    }

    pub fn batches(&self) -> &RenderBatchManager {
        &self.batches
    }

    /// Disjoint borrows of the device and the batch manager.
    pub fn split(&mut self) -> (&mut dyn GraphicsDevice, &mut RenderBatchManager) {
        (self.device.as_mut(), &mut self.batches)
    }

    pub fn blur(&self) -> &BlurConfig {
        &self.blur
    }

    pub fn debug_pass(&self) -> bool {
        self.debug_pass
    }

    pub fn set_debug_pass(&mut self, enabled: bool) {
        self.debug_pass = enabled;
    }

    pub fn begin_frame(&mut self) {
        self.device.begin_frame(&self.monitor);
    }

    pub fn end_frame(&mut self) {
        self.device.end_frame();
    }

    // ── Immediate helpers used by pass elements ──

    pub fn render_rect(&mut self, shape: Shape, color: Color, damage: &Region) -> u32 {
        self.batches
            .immediate()
            .render_rect(self.device.as_mut(), shape, color, Some(damage))
    }

    pub fn render_texture(
        &mut self,
        texture: TextureId,
        shape: Shape,
        alpha: f32,
        damage: &Region,
    ) -> u32 {
        self.device.bind_texture(texture);
        self.batches
            .immediate()
            .render_texture(self.device.as_mut(), shape, alpha, Some(damage))
    }

    pub fn render_border(&mut self, shape: Shape, color: Color, thickness: f32, damage: &Region) -> u32 {
        self.batches
            .immediate()
            .render_border(self.device.as_mut(), shape, color, thickness, Some(damage))
    }

    pub fn render_shadow(&mut self, shape: Shape, color: Color, range: f32, damage: &Region) -> u32 {
        self.batches
            .immediate()
            .render_shadow(self.device.as_mut(), shape, color, range, Some(damage))
    }

    pub fn render_clear(&mut self, color: Color, damage: &Region) -> u32 {
        self.batches
            .immediate()
            .render_clear(self.device.as_mut(), color, Some(damage))
    }

    /// Blurs the background under `shape`, once per damage rect it overlaps.
    /// Skipped when blur is disabled, and for live blur on a device without it.
    pub fn blur_background(&mut self, shape: Shape, source: BlurSource, damage: &Region) {
        if !self.blur.enabled {
            return;
        }
        if source == BlurSource::Live && !self.device.capabilities().live_blur {
            log::trace!("device has no live blur, skipping");
            return;
        }
        let clip = shape.rect.round_out();
        for rect in damage.rects() {
            if let Some(scissor) = rect.intersection(&clip) {
                self.device.set_scissor(Some(scissor));
                self.device
                    .blur_background(shape.rect, shape.round, shape.rounding_power, source);
            }
        }
        self.device.set_scissor(None);
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.batches.release(self.device.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{IRect, Rect, Size};

    fn context() -> (CommandLog, RenderContext) {
        let device = HeadlessDevice::new();
        let log = device.log();
        let monitor = Monitor::new(Size::new(1920.0, 1080.0), 1.0);
        let ctx = RenderContext::new(Box::new(device), monitor, BatchConfig::default(), BlurConfig::default())
            .unwrap();
        (log, ctx)
    }

    #[test]
    fn dropping_context_releases_all_buffers() {
        let (log, ctx) = context();
        assert!(!log.live_buffers().is_empty());
        drop(ctx);
        assert!(log.live_buffers().is_empty());
    }

    #[test]
    fn failed_setup_releases_partial_buffers() {
        let device = HeadlessDevice::new().fail_buffers();
        let log = device.log();
        let monitor = Monitor::new(Size::new(800.0, 600.0), 1.0);
        let result = RenderContext::new(Box::new(device), monitor, BatchConfig::default(), BlurConfig::default());
        assert!(matches!(result, Err(DeviceError::BufferAllocation(_))));
        assert!(log.live_buffers().is_empty());
    }

    #[test]
    fn destroying_unknown_buffer_is_ignored() {
        let mut device = HeadlessDevice::new();
        let log = device.log();
        let buffer = device.create_buffer(strata_core::BufferUsage::Vertex).unwrap();
        device.destroy_buffer(buffer);
        device.destroy_buffer(buffer);
        device.destroy_buffer(strata_core::BufferId(99));
        assert_eq!(log.count(|c| matches!(c, DeviceCommand::DestroyBuffer(_))), 1);
        assert!(log.live_buffers().is_empty());
    }

    #[test]
    fn texture_helper_binds_before_drawing() {
        let (log, mut ctx) = context();
        log.clear();
        let damage = Region::from(IRect::new(0, 0, 100, 100));
        let shape = Shape::new(Rect::new(0.0, 0.0, 50.0, 50.0), 0.0, 2.0);
        assert_eq!(ctx.render_texture(TextureId(3), shape, 1.0, &damage), 1);
        assert_eq!(log.commands()[0], DeviceCommand::BindTexture(TextureId(3)));
    }

    #[test]
    fn live_blur_is_skipped_without_capability() {
        let device = HeadlessDevice::with_capabilities(strata_core::DeviceCapabilities {
            instancing: true,
            live_blur: false,
        });
        let log = device.log();
        let monitor = Monitor::new(Size::new(800.0, 600.0), 1.0);
        let mut ctx =
            RenderContext::new(Box::new(device), monitor, BatchConfig::default(), BlurConfig::default()).unwrap();
        let damage = Region::from(IRect::new(0, 0, 800, 600));
        let shape = Shape::new(Rect::new(0.0, 0.0, 50.0, 50.0), 0.0, 2.0);
        ctx.blur_background(shape, BlurSource::Live, &damage);
        assert_eq!(log.count(|c| matches!(c, DeviceCommand::BlurBackground { .. })), 0);
        ctx.blur_background(shape, BlurSource::Precomputed, &damage);
        assert_eq!(log.count(|c| matches!(c, DeviceCommand::BlurBackground { .. })), 1);
    }

    #[test]
    fn disabled_blur_issues_nothing() {
        let device = HeadlessDevice::new();
        let log = device.log();
        let monitor = Monitor::new(Size::new(800.0, 600.0), 1.0);
        let blur = BlurConfig {
            enabled: false,
            ..BlurConfig::default()
        };
        let mut ctx = RenderContext::new(Box::new(device), monitor, BatchConfig::default(), blur).unwrap();
        let damage = Region::from(IRect::new(0, 0, 800, 600));
        let shape = Shape::new(Rect::new(0.0, 0.0, 50.0, 50.0), 0.0, 2.0);
        ctx.blur_background(shape, BlurSource::Precomputed, &damage);
        assert_eq!(log.count(|c| matches!(c, DeviceCommand::BlurBackground { .. })), 0);
    }
}
