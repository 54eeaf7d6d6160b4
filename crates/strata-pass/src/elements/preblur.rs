use strata_core::{BlurSource, Rect, Region};
use strata_renderer::{RenderContext, Shape};

use super::DEFAULT_ROUNDING_POWER;
use crate::{ElementKind, PassElement};

/// Refreshes the precomputed blur of the whole output from what has been
/// drawn before it.
#[derive(Debug, Clone, Default)]
pub struct PreBlurElement;

impl PreBlurElement {
    pub fn new() -> Self {
        Self
    }
}

impl PassElement for PreBlurElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        let output = Rect::from_size(ctx.monitor().size);
        let shape = Shape::new(output, 0.0, DEFAULT_ROUNDING_POWER);
        ctx.blur_background(shape, BlurSource::Precomputed, damage);
    }

    fn needs_precompute_blur(&self) -> bool {
        true
    }

    fn undiscardable(&self) -> bool {
        true
    }

    fn disable_simplification(&self) -> bool {
        true
    }

    fn pass_name(&self) -> &'static str {
        "PreBlurElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::PreBlur
    }
}
