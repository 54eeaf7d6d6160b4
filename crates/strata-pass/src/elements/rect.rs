use strata_core::{BlurSource, Color, Rect, Region, TextureId};
use strata_renderer::{BatchKind, RenderContext};

use super::{clipped_damage, inner_region, pixel_shape, rounded_inner_region, DEFAULT_ROUNDING_POWER};
use crate::{BatchRecord, ElementKind, PassElement};

/// Solid rounded rect, optionally over a blurred background.
#[derive(Debug, Clone)]
pub struct RectElement {
    pub rect: Rect,
    pub color: Color,
    pub round: f32,
    pub rounding_power: f32,
    pub blur: bool,
    /// Blur against the precomputed framebuffer instead of live content.
    pub xray: bool,
    pub clip: Option<Rect>,
}

impl RectElement {
    pub fn new(rect: Rect, color: Color) -> Self {
        Self {
            rect,
            color,
            round: 0.0,
            rounding_power: DEFAULT_ROUNDING_POWER,
            blur: false,
            xray: false,
            clip: None,
        }
    }

    pub fn rounded(mut self, round: f32, rounding_power: f32) -> Self {
        self.round = round;
        self.rounding_power = rounding_power;
        self
    }

    pub fn blurred(mut self, xray: bool) -> Self {
        self.blur = true;
        self.xray = xray;
        self
    }

    pub fn clipped(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    fn blurs(&self) -> bool {
        self.blur && self.color.a < 1.0
    }
}

impl PassElement for RectElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        let scale = ctx.monitor().scale;
        let shape = pixel_shape(self.rect, self.round, self.rounding_power, scale);
        let damage = clipped_damage(damage, self.clip, scale);
        if self.blurs() {
            let source = if self.xray { BlurSource::Precomputed } else { BlurSource::Live };
            ctx.blur_background(shape, source, &damage);
        }
        ctx.render_rect(shape, self.color, &damage);
    }

    fn needs_live_blur(&self) -> bool {
        self.blurs() && !self.xray
    }

    fn needs_precompute_blur(&self) -> bool {
        self.blurs() && self.xray
    }

    fn bounding_box(&self) -> Option<Rect> {
        Some(self.rect)
    }

    fn opaque_region(&self) -> Region {
        if !self.color.is_opaque() {
            return Region::new();
        }
        let mut opaque = rounded_inner_region(self.rect, self.round);
        if let Some(clip) = self.clip {
            opaque.intersect(&inner_region(clip));
        }
        opaque
    }

    fn pass_name(&self) -> &'static str {
        "RectElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Rect
    }

    fn batch_record(&self) -> Option<BatchRecord> {
        if self.blur || self.clip.is_some() {
            return None;
        }
        Some(BatchRecord {
            kind: BatchKind::Rect,
            rect: self.rect,
            color: self.color,
            round: self.round,
            rounding_power: self.rounding_power,
            texture: TextureId::NONE,
            alpha: 1.0,
            thickness: 0.0,
            range: 0.0,
        })
    }
}
