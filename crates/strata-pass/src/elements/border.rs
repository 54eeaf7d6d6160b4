use strata_core::{Color, Rect, Region};
use strata_renderer::RenderContext;

use super::{pixel_shape, DEFAULT_ROUNDING_POWER};
use crate::{ElementKind, PassElement};

/// Outline drawn outside `rect`.
#[derive(Debug, Clone)]
pub struct BorderElement {
    pub rect: Rect,
    pub color: Color,
    pub thickness: f32,
    pub round: f32,
    pub rounding_power: f32,
    pub alpha: f32,
}

impl BorderElement {
    pub fn new(rect: Rect, color: Color, thickness: f32) -> Self {
        Self {
            rect,
            color,
            thickness,
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
}

impl PassElement for BorderElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        let scale = ctx.monitor().scale;
        let shape = pixel_shape(self.rect, self.round, self.rounding_power, scale);
        let color = self.color.with_alpha(self.color.a * self.alpha);
        ctx.render_border(shape, color, self.thickness * scale, damage);
    }

    fn bounding_box(&self) -> Option<Rect> {
        Some(self.rect.expand(self.thickness))
    }

    fn pass_name(&self) -> &'static str {
        "BorderElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Border
    }
}
