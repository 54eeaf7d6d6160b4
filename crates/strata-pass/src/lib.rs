// Paint elements and the render pass that culls, damages and draws them.

mod batched;
pub mod elements;
mod pass;
mod tests;

pub use batched::BatchedPassElement;
pub use elements::{
    BorderElement, ClearElement, FramebufferElement, PreBlurElement, RectElement, ShadowElement,
    SurfaceElement, TextureElement,
};
pub use pass::{ElementVerdict, PassEntry, RenderOutcome, RenderPass};

use strata_core::{Color, Rect, Region, TextureId};
use strata_renderer::{BatchKind, RenderContext};

/// Kinds of pass element, used to remove every element of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Rect,
    Texture,
    Border,
    Shadow,
    Surface,
    Clear,
    FramebufferSwitch,
    PreBlur,
    Batched,
}

/// Draw parameters of an element simple enough to go through the batch
/// manager. Geometry is logical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchRecord {
    pub kind: BatchKind,
    pub rect: Rect,
    pub color: Color,
    pub round: f32,
    pub rounding_power: f32,
    pub texture: TextureId,
    pub alpha: f32,
    pub thickness: f32,
    pub range: f32,
}

/// One paint operation in a render pass.
///
/// Boxes and opaque regions are in logical coordinates; the pass scales them
/// by the monitor scale. `draw` receives damage in pixels.
pub trait PassElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region);

    /// Needs the background blurred at draw time.
    fn needs_live_blur(&self) -> bool {
        false
    }

    /// Samples the precomputed blur framebuffer.
    fn needs_precompute_blur(&self) -> bool {
        false
    }

    fn bounding_box(&self) -> Option<Rect> {
        None
    }

    /// Pixels this element fully covers with opaque color.
    fn opaque_region(&self) -> Region {
        Region::new()
    }

    /// Called instead of `draw` when the element was culled.
    fn discard(&mut self) {}

    /// Always drawn, even when nothing is left to damage.
    fn undiscardable(&self) -> bool {
        false
    }

    /// Forces every element of the pass to draw with the full damage.
    fn disable_simplification(&self) -> bool {
        false
    }

    fn pass_name(&self) -> &'static str;

    fn element_kind(&self) -> ElementKind;

    fn batch_record(&self) -> Option<BatchRecord> {
        None
    }
}

/// Told whether a surface made it to screen this frame.
pub trait PresentationFeedback {
    fn presented(&self);
    fn discarded(&self);
}
