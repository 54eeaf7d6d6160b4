use strata_core::{Color, Rect, Region, TextureId};
use strata_renderer::{BatchKind, RenderContext};

use super::{pixel_shape, DEFAULT_ROUNDING_POWER};
use crate::{BatchRecord, ElementKind, PassElement};

/// Soft drop shadow around `rect`, fading out over `range`.
#[derive(Debug, Clone)]
pub struct ShadowElement {
    pub rect: Rect,
    pub color: Color,
    pub range: f32,
    pub round: f32,
    pub rounding_power: f32,
    pub alpha: f32,
}

impl ShadowElement {
    pub fn new(rect: Rect, color: Color, range: f32) -> Self {
        Self {
            rect,
            color,
            range,
            round: 0.0,
            rounding_power: DEFAULT_ROUNDING_POWER,
            alpha: 1.0,
        }
    }

    pub fn rounded(mut self, round: f32, rounding_power: f32) -> Self {
        self.round = round;
        self.rounding_power = rounding_power;
        self
    }

    fn faded_color(&self) -> Color {
        self.color.with_alpha(self.color.a * self.alpha)
    }
}

impl PassElement for ShadowElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        let scale = ctx.monitor().scale;
        let shape = pixel_shape(self.rect, self.round, self.rounding_power, scale);
        ctx.render_shadow(shape, self.faded_color(), self.range * scale, damage);
    }

    fn bounding_box(&self) -> Option<Rect> {
        Some(self.rect.expand(self.range))
    }

    fn pass_name(&self) -> &'static str {
        "ShadowElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Shadow
    }

    fn batch_record(&self) -> Option<BatchRecord> {
        Some(BatchRecord {
            kind: BatchKind::Shadow,
            rect: self.rect,
            color: self.faded_color(),
            round: self.round,
            rounding_power: self.rounding_power,
            texture: TextureId::NONE,
            alpha: 1.0,
            thickness: 0.0,
            range: self.range,
        })
    }
}
