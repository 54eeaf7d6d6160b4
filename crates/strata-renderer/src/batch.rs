// Groups paint calls by pipeline state and dispatches each group to the
// cheapest renderer that can draw it.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use strata_core::{Color, DeviceError, GraphicsDevice, Rect, TextureId};

use crate::batched::BatchedRectRenderer;
use crate::config::BatchConfig;
use crate::immediate::{ImmediateRenderer, Shape};
use crate::instanced::InstancedRectRenderer;

/// Rect batches at or below this size are drawn one rect at a time.
const MIN_RECTS_FOR_OPTIMIZED_PATH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Rect,
    Texture,
    Border,
    Shadow,
}

/// Pipeline-state identity of a batch. `round` and `rounding_power` compare
/// and hash by their exact bits.
#[derive(Debug, Clone, Copy)]
pub struct BatchKey {
    pub kind: BatchKind,
    pub round: f32,
    pub rounding_power: f32,
    pub texture: TextureId,
}

impl BatchKey {
    pub fn new(kind: BatchKind, round: f32, rounding_power: f32, texture: TextureId) -> Self {
        Self { kind, round, rounding_power, texture }
    }

    fn bits(&self) -> (BatchKind, u32, u32, TextureId) {
        (self.kind, self.round.to_bits(), self.rounding_power.to_bits(), self.texture)
    }
}

impl PartialEq for BatchKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for BatchKey {}

impl Hash for BatchKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Pending entries for one key. Columns not used by the kind stay at their
/// neutral value (alpha 1, thickness/range 0).
#[derive(Debug, Clone)]
pub struct RenderBatch {
    key: BatchKey,
    pub rects: Vec<Rect>,
    pub colors: Vec<Color>,
    pub alphas: Vec<f32>,
    pub thicknesses: Vec<f32>,
    pub ranges: Vec<f32>,
}

impl RenderBatch {
    fn new(key: BatchKey) -> Self {
        Self {
            key,
            rects: Vec::new(),
            colors: Vec::new(),
            alphas: Vec::new(),
            thicknesses: Vec::new(),
            ranges: Vec::new(),
        }
    }

    fn push(&mut self, rect: Rect, color: Color, alpha: f32, thickness: f32, range: f32) {
        self.rects.push(rect);
        self.colors.push(color);
        self.alphas.push(alpha);
        self.thicknesses.push(thickness);
        self.ranges.push(range);
    }

    pub fn key(&self) -> &BatchKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchMetrics {
    pub draw_calls: u64,
    /// One per batch executed.
    pub state_changes: u64,
    pub texture_binds: u64,
    /// Entries waiting in pending batches.
    pub pending_operations: usize,
    /// Automatic flushes triggered by `max_batch_size`.
    pub flushes: u64,
}

pub struct RenderBatchManager {
    config: BatchConfig,
    batching: bool,
    batches: HashMap<BatchKey, RenderBatch>,
    order: Vec<BatchKey>,
    pending: usize,
    metrics: BatchMetrics,
    immediate: ImmediateRenderer,
    rect_renderer: BatchedRectRenderer,
    instanced_renderer: InstancedRectRenderer,
}

impl RenderBatchManager {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            batching: false,
            batches: HashMap::new(),
            order: Vec::new(),
            pending: 0,
            metrics: BatchMetrics::default(),
            immediate: ImmediateRenderer::new(),
            rect_renderer: BatchedRectRenderer::new(),
            instanced_renderer: InstancedRectRenderer::new(),
        }
    }

    /// Prepares the immediate path and both optimized renderers. Only a
    /// failure of the immediate path is returned; the optimized renderers
    /// disable themselves and leave the fallback in place.
    pub fn init(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), DeviceError> {
        self.immediate.init(device)?;
        self.rect_renderer.init(device);
        if self.config.instancing {
            self.instanced_renderer.init(device);
        }
        log::debug!(
            "batch manager ready: batched={} instanced={}",
            self.rect_renderer.is_enabled(),
            self.instanced_renderer.is_instanced_rendering_supported()
        );
        Ok(())
    }

    /// Destroys every GPU buffer held by the renderers. Pending batches are
    /// dropped.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.clear_batch();
        self.instanced_renderer.release(device);
        self.rect_renderer.release(device);
        self.immediate.release(device);
    }

    pub fn immediate(&self) -> &ImmediateRenderer {
        &self.immediate
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn is_batching(&self) -> bool {
        self.batching
    }

    /// Whether rect batches currently go to the instanced renderer.
    pub fn uses_instancing(&self) -> bool {
        self.config.optimized_rects
            && self.config.instancing
            && self.instanced_renderer.is_instanced_rendering_supported()
    }

    pub fn begin_batch(&mut self) {
        if self.batching {
            return;
        }
        self.batching = true;
    }

    pub fn end_batch(&mut self, device: &mut dyn GraphicsDevice) {
        if !self.batching {
            return;
        }
        self.flush_batch(device);
        self.batching = false;
    }

    pub fn add_rect(
        &mut self,
        device: &mut dyn GraphicsDevice,
        rect: Rect,
        color: Color,
        round: f32,
        rounding_power: f32,
    ) {
        let key = BatchKey::new(BatchKind::Rect, round, rounding_power, TextureId::NONE);
        self.push(device, key, rect, color, 1.0, 0.0, 0.0);
    }

    pub fn add_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        texture: TextureId,
        rect: Rect,
        alpha: f32,
        round: f32,
        rounding_power: f32,
    ) {
        let key = BatchKey::new(BatchKind::Texture, round, rounding_power, texture);
        self.push(device, key, rect, Color::WHITE, alpha, 0.0, 0.0);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_border(
        &mut self,
        device: &mut dyn GraphicsDevice,
        rect: Rect,
        color: Color,
        round: f32,
        rounding_power: f32,
        thickness: f32,
    ) {
        let key = BatchKey::new(BatchKind::Border, round, rounding_power, TextureId::NONE);
        self.push(device, key, rect, color, 1.0, thickness, 0.0);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_shadow(
        &mut self,
        device: &mut dyn GraphicsDevice,
        rect: Rect,
        color: Color,
        round: f32,
        rounding_power: f32,
        range: f32,
    ) {
        let key = BatchKey::new(BatchKind::Shadow, round, rounding_power, TextureId::NONE);
        self.push(device, key, rect, color, 1.0, 0.0, range);
    }

    /// Executes pending batches in first-seen key order, then clears them.
    pub fn flush_batch(&mut self, device: &mut dyn GraphicsDevice) {
        let order = std::mem::take(&mut self.order);
        let mut batches = std::mem::take(&mut self.batches);
        self.pending = 0;
        for key in order {
            if let Some(batch) = batches.remove(&key) {
                self.execute_batch(device, &batch);
            }
        }
    }

    /// Drops pending batches without drawing them.
    pub fn clear_batch(&mut self) {
        self.batches.clear();
        self.order.clear();
        self.pending = 0;
    }

    pub fn metrics(&self) -> BatchMetrics {
        BatchMetrics {
            pending_operations: self.pending,
            ..self.metrics
        }
    }

    /// Zeroes the counters; pending batches are kept.
    pub fn reset_metrics(&mut self) {
        self.metrics = BatchMetrics::default();
    }

    /// Pending batches in the order they will execute.
    pub fn pending_batches(&self) -> impl Iterator<Item = &RenderBatch> {
        self.order.iter().filter_map(|key| self.batches.get(key))
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        device: &mut dyn GraphicsDevice,
        key: BatchKey,
        rect: Rect,
        color: Color,
        alpha: f32,
        thickness: f32,
        range: f32,
    ) {
        if !self.batching {
            let mut single = RenderBatch::new(key);
            single.push(rect, color, alpha, thickness, range);
            self.execute_batch(device, &single);
            return;
        }

        let batch = self.batches.entry(key).or_insert_with(|| {
            self.order.push(key);
            RenderBatch::new(key)
        });
        batch.push(rect, color, alpha, thickness, range);
        self.pending += 1;

        if self.config.auto_flush && batch.len() >= self.config.max_batch_size {
            log::trace!("batch for {:?} reached {} entries, flushing", key.kind, batch.len());
            self.metrics.flushes += 1;
            self.flush_batch(device);
        }
    }

    fn execute_batch(&mut self, device: &mut dyn GraphicsDevice, batch: &RenderBatch) {
        if batch.is_empty() {
            return;
        }
        self.metrics.state_changes += 1;
        let key = batch.key;

        match key.kind {
            BatchKind::Rect => {
                let draws = self.execute_rects(device, batch);
                self.metrics.draw_calls += u64::from(draws);
            }
            BatchKind::Texture => {
                device.bind_texture(key.texture);
                self.metrics.texture_binds += 1;
                for (rect, alpha) in batch.rects.iter().zip(&batch.alphas) {
                    let shape = Shape::new(*rect, key.round, key.rounding_power);
                    let draws = self.immediate.render_texture(device, shape, *alpha, None);
                    self.metrics.draw_calls += u64::from(draws);
                }
            }
            BatchKind::Border => {
                for ((rect, color), thickness) in
                    batch.rects.iter().zip(&batch.colors).zip(&batch.thicknesses)
                {
                    let shape = Shape::new(*rect, key.round, key.rounding_power);
                    let draws = self.immediate.render_border(device, shape, *color, *thickness, None);
                    self.metrics.draw_calls += u64::from(draws);
                }
            }
            BatchKind::Shadow => {
                for ((rect, color), range) in batch.rects.iter().zip(&batch.colors).zip(&batch.ranges)
                {
                    let shape = Shape::new(*rect, key.round, key.rounding_power);
                    let draws = self.immediate.render_shadow(device, shape, *color, *range, None);
                    self.metrics.draw_calls += u64::from(draws);
                }
            }
        }
    }

    /// Returns the number of draws issued. Above the size threshold the
    /// instanced renderer is tried first, then the batched one; anything else
    /// falls back to one immediate draw per rect.
    fn execute_rects(&mut self, device: &mut dyn GraphicsDevice, batch: &RenderBatch) -> u32 {
        let key = batch.key;
        if batch.len() > MIN_RECTS_FOR_OPTIMIZED_PATH && self.config.optimized_rects {
            if self.uses_instancing() {
                let renderer = &mut self.instanced_renderer;
                renderer.begin_batch(key.round, key.rounding_power);
                for (rect, color) in batch.rects.iter().zip(&batch.colors) {
                    renderer.add_rect(device, *rect, *color);
                }
                return renderer.end_batch(device);
            }
            if self.rect_renderer.is_enabled() {
                let renderer = &mut self.rect_renderer;
                renderer.begin_batch(key.round, key.rounding_power);
                for (rect, color) in batch.rects.iter().zip(&batch.colors) {
                    renderer.add_rect(*rect, *color);
                }
                return renderer.end_batch(device);
            }
        }

        batch
            .rects
            .iter()
            .zip(&batch.colors)
            .map(|(rect, color)| {
                let shape = Shape::new(*rect, key.round, key.rounding_power);
                self.immediate.render_rect(device, shape, *color, None)
            })
            .sum()
    }
}
