use strata_core::{Color, Rect, Region, TextureId};
use strata_renderer::{BatchKind, RenderContext};

use super::{clipped_damage, inner_region, pixel_shape, rounded_inner_region, DEFAULT_ROUNDING_POWER};
use crate::{BatchRecord, ElementKind, PassElement};

/// Texture drawn into a rounded rect.
#[derive(Debug, Clone)]
pub struct TextureElement {
    pub texture: TextureId,
    pub rect: Rect,
    pub alpha: f32,
    pub round: f32,
    pub rounding_power: f32,
    /// The texture has no transparent texels.
    pub opaque: bool,
    pub clip: Option<Rect>,
}

impl TextureElement {
    pub fn new(texture: TextureId, rect: Rect) -> Self {
        Self {
            texture,
            rect,
            alpha: 1.0,
            round: 0.0,
            rounding_power: DEFAULT_ROUNDING_POWER,
            opaque: false,
            clip: None,
        }
    }

    pub fn rounded(mut self, round: f32, rounding_power: f32) -> Self {
        self.round = round;
        self.rounding_power = rounding_power;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn opaque(mut self) -> Self {
        self.opaque = true;
        self
    }

    pub fn clipped(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }
}

impl PassElement for TextureElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        let scale = ctx.monitor().scale;
        let shape = pixel_shape(self.rect, self.round, self.rounding_power, scale);
        let damage = clipped_damage(damage, self.clip, scale);
        ctx.render_texture(self.texture, shape, self.alpha, &damage);
    }

    fn bounding_box(&self) -> Option<Rect> {
        Some(self.rect)
    }

    fn opaque_region(&self) -> Region {
        if !self.opaque || self.alpha < 1.0 {
            return Region::new();
        }
        let mut opaque = rounded_inner_region(self.rect, self.round);
        if let Some(clip) = self.clip {
            opaque.intersect(&inner_region(clip));
        }
        opaque
    }

    fn pass_name(&self) -> &'static str {
        "TextureElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Texture
    }

    fn batch_record(&self) -> Option<BatchRecord> {
        if self.clip.is_some() {
            return None;
        }
        Some(BatchRecord {
            kind: BatchKind::Texture,
            rect: self.rect,
            color: Color::WHITE,
            round: self.round,
            rounding_power: self.rounding_power,
            texture: self.texture,
            alpha: self.alpha,
            thickness: 0.0,
            range: 0.0,
        })
    }
}
