use strata_core::{Color, Region};
use strata_renderer::RenderContext;

use crate::{ElementKind, PassElement};

/// Clears the damaged area to a color.
#[derive(Debug, Clone)]
pub struct ClearElement {
    pub color: Color,
}

impl ClearElement {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl PassElement for ClearElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        ctx.render_clear(self.color, damage);
    }

    fn pass_name(&self) -> &'static str {
        "ClearElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Clear
    }
}
