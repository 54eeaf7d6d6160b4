use strata_core::{FramebufferId, Region};
use strata_renderer::RenderContext;

use crate::{ElementKind, PassElement};

/// Redirects the following elements to another framebuffer.
#[derive(Debug, Clone)]
pub struct FramebufferElement {
    pub target: FramebufferId,
    /// The target is read back as a whole, so nothing may be culled.
    pub capture: bool,
}

impl FramebufferElement {
    pub fn new(target: FramebufferId) -> Self {
        Self { target, capture: false }
    }

    pub fn capturing(target: FramebufferId) -> Self {
        Self { target, capture: true }
    }
}

impl PassElement for FramebufferElement {
    fn draw(&mut self, ctx: &mut RenderContext, _damage: &Region) {
        ctx.device().bind_framebuffer(self.target);
    }

    fn undiscardable(&self) -> bool {
        true
    }

    fn disable_simplification(&self) -> bool {
        self.capture
    }

    fn pass_name(&self) -> &'static str {
        "FramebufferElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::FramebufferSwitch
    }
}
