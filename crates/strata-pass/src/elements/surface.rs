use std::rc::Rc;

use strata_core::{BlurSource, Rect, Region, TextureId};
use strata_renderer::RenderContext;

use super::{inner_region, pixel_shape, rounded_inner_region, DEFAULT_ROUNDING_POWER};
use crate::{ElementKind, PassElement, PresentationFeedback};

/// A client surface: its buffer as a texture plus what the client declared
/// about its opacity.
pub struct SurfaceElement {
    pub texture: TextureId,
    pub rect: Rect,
    pub alpha: f32,
    pub round: f32,
    pub rounding_power: f32,
    /// Opaque area declared by the client, relative to the surface origin.
    pub opaque_region: Region,
    /// The buffer format has no alpha channel.
    pub texture_opaque: bool,
    pub blur: bool,
    pub xray: bool,
    pub feedback: Option<Rc<dyn PresentationFeedback>>,
}

impl SurfaceElement {
    pub fn new(texture: TextureId, rect: Rect) -> Self {
        Self {
            texture,
            rect,
            alpha: 1.0,
            round: 0.0,
            rounding_power: DEFAULT_ROUNDING_POWER,
            opaque_region: Region::new(),
            texture_opaque: false,
            blur: false,
            xray: false,
            feedback: None,
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

    pub fn with_opaque_region(mut self, region: Region) -> Self {
        self.opaque_region = region;
        self
    }

    pub fn opaque_texture(mut self) -> Self {
        self.texture_opaque = true;
        self
    }

    pub fn blurred(mut self, xray: bool) -> Self {
        self.blur = true;
        self.xray = xray;
        self
    }

    pub fn with_feedback(mut self, feedback: Rc<dyn PresentationFeedback>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Declared opaque area placed on screen, clipped to the rounded shape.
    fn placed_opaque(&self) -> Region {
        let mut placed = self.opaque_region.clone();
        placed
            .translate(self.rect.x.round() as i32, self.rect.y.round() as i32)
            .intersect(&rounded_inner_region(self.rect, self.round));
        placed
    }

    fn translucent(&self) -> bool {
        if self.alpha < 1.0 {
            return true;
        }
        if self.texture_opaque {
            return false;
        }
        let mut uncovered = inner_region(self.rect);
        uncovered.subtract(&self.placed_opaque());
        !uncovered.is_empty()
    }

    fn blurs(&self) -> bool {
        self.blur && self.translucent()
    }
}

impl PassElement for SurfaceElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        let scale = ctx.monitor().scale;
        let shape = pixel_shape(self.rect, self.round, self.rounding_power, scale);
        if self.blurs() {
            let source = if self.xray { BlurSource::Precomputed } else { BlurSource::Live };
            ctx.blur_background(shape, source, damage);
        }
        ctx.render_texture(self.texture, shape, self.alpha, damage);
        if let Some(feedback) = &self.feedback {
            feedback.presented();
        }
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
        if self.alpha < 1.0 {
            return Region::new();
        }
        if self.texture_opaque {
            return rounded_inner_region(self.rect, self.round);
        }
        self.placed_opaque()
    }

    fn discard(&mut self) {
        if let Some(feedback) = &self.feedback {
            feedback.discarded();
        }
    }

    fn pass_name(&self) -> &'static str {
        "SurfaceElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Surface
    }
}
