// The per-frame render pass: occlusion culling, damage accounting for live
// blur, and drawing of the surviving elements in order.

use strata_core::{Color, IRect, Monitor, Rect, Region};
use strata_renderer::{RenderContext, Shape};

use crate::{ElementKind, PassElement};

const DEBUG_OCCLUDED_COLOR: Color = Color::new(1.0, 0.0, 0.0, 0.1);
const DEBUG_BLUR_COLOR: Color = Color::new(0.0, 1.0, 0.0, 0.1);

/// What simplification decided for one element.
#[derive(Debug, Clone, Default)]
pub struct ElementVerdict {
    /// Pixels the element has to repaint.
    pub damage: Region,
    pub discard: bool,
}

impl ElementVerdict {
    fn discarded() -> Self {
        Self {
            damage: Region::new(),
            discard: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOutcome {
    /// Damage to present, grown by live-blur sampling.
    pub damage: Region,
    /// Some element samples the precomputed blur; the caller should
    /// refresh it.
    pub precompute_blur: bool,
}

/// An element plus the verdict of the last `render`.
pub struct PassEntry {
    element: Box<dyn PassElement>,
    damage: Region,
    discard: bool,
}

impl PassEntry {
    pub fn element(&self) -> &dyn PassElement {
        self.element.as_ref()
    }

    pub fn damage(&self) -> &Region {
        &self.damage
    }

    pub fn is_discarded(&self) -> bool {
        self.discard
    }
}

/// State threaded through the top-to-bottom occlusion walk.
struct Walk {
    remaining: Region,
    /// Scaled bounding boxes of live-blur elements above the current one.
    blur_above: Region,
    verdicts: Vec<ElementVerdict>,
    occluded: Vec<Region>,
}

/// Ordered paint elements for one frame, bottom-most first.
#[derive(Default)]
pub struct RenderPass {
    entries: Vec<PassEntry>,
}

impl RenderPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, element: Box<dyn PassElement>) {
        self.entries.push(PassEntry {
            element,
            damage: Region::new(),
            discard: false,
        });
    }

    pub fn add_element(&mut self, element: impl PassElement + 'static) {
        self.add(Box::new(element));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.entries.len() == 1
    }

    /// Whether the frame depends on what is behind its elements.
    pub fn needs_introspection(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.element.needs_live_blur() || e.element.needs_precompute_blur())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn remove_all_of_kind(&mut self, kind: ElementKind) {
        self.entries.retain(|e| e.element.element_kind() != kind);
    }

    pub fn entries(&self) -> &[PassEntry] {
        &self.entries
    }

    /// Walks the elements from the top down, handing each the damage not yet
    /// covered by opaque elements above it. `blur_radius` is the distance a
    /// live blur samples from; opaque pixels within it of a blurred element
    /// above stay damaged.
    ///
    /// # Panics
    ///
    /// If an element needs live blur but has no bounding box.
    pub fn simplify(&self, damage: &Region, monitor: &Monitor, blur_radius: f32) -> Vec<ElementVerdict> {
        self.walk(damage, monitor, blur_radius).verdicts
    }

    fn walk(&self, damage: &Region, monitor: &Monitor, blur_radius: f32) -> Walk {
        let scale = monitor.scale;
        let any_live_blur = self.entries.iter().any(|e| e.element.needs_live_blur());
        let mut remaining = damage.clone();
        remaining.intersect_rect(monitor.bounds());

        let start = Walk {
            remaining,
            blur_above: Region::new(),
            verdicts: Vec::with_capacity(self.entries.len()),
            occluded: Vec::new(),
        };
        let mut walk = self.entries.iter().rev().fold(start, |mut walk, entry| {
            let element = entry.element.as_ref();
            let verdict = walk.visit(element, scale, any_live_blur, blur_radius);
            if element.needs_live_blur() {
                walk.blur_above.add_rect(live_blur_box(element).scale(scale).round_out());
            }
            walk.verdicts.push(verdict);
            walk
        });
        walk.verdicts.reverse();
        walk
    }

    /// Draws the pass for `damage` (pixels).
    pub fn render(&mut self, ctx: &mut RenderContext, damage: &Region) -> RenderOutcome {
        if damage.is_empty() {
            log::trace!("render pass skipped, no damage");
            return RenderOutcome::default();
        }

        let monitor = *ctx.monitor();
        let blur_radius = ctx.blur().one_blur_radius();
        let sampling_radius = ctx.blur().sampling_radius();
        let mut damage = damage.clone();

        let mut blur_region = Region::new();
        for entry in self.entries.iter().filter(|e| e.element.needs_live_blur()) {
            blur_region.add_rect(live_blur_box(entry.element.as_ref()).scale(monitor.scale).round_out());
        }
        if !blur_region.is_empty() {
            blur_region.intersect(&damage).expand(blur_radius);
            damage.add(&blur_region);
        }

        let simplify = !self.entries.iter().any(|e| e.element.disable_simplification());
        let occluded = if simplify {
            let walk = self.walk(&damage, &monitor, sampling_radius);
            for (entry, verdict) in self.entries.iter_mut().zip(walk.verdicts) {
                entry.damage = verdict.damage;
                entry.discard = verdict.discard;
            }
            walk.occluded
        } else {
            for entry in &mut self.entries {
                entry.damage = damage.clone();
                entry.discard = false;
            }
            Vec::new()
        };

        let precompute_blur = self.entries.iter().any(|e| e.element.needs_precompute_blur());

        for entry in &mut self.entries {
            if entry.discard {
                entry.element.discard();
            } else {
                entry.element.draw(ctx, &entry.damage);
            }
        }

        if ctx.debug_pass() {
            self.draw_debug(ctx, &occluded, &blur_region);
        }

        RenderOutcome {
            damage,
            precompute_blur,
        }
    }

    /// Paints occluded areas red and live-blur areas green over the frame.
    fn draw_debug(&self, ctx: &mut RenderContext, occluded: &[Region], blur_region: &Region) {
        for entry in &self.entries {
            log::debug!(
                "pass: {} discard={} damage_area={}",
                entry.element.pass_name(),
                entry.discard,
                entry.damage.area()
            );
        }

        let everything = Region::from(ctx.monitor().bounds());
        let overlay = |ctx: &mut RenderContext, rect: &IRect, color: Color| {
            ctx.render_rect(Shape::new(rect.to_rect(), 0.0, 2.0), color, &everything);
        };
        for region in occluded {
            for rect in region.rects() {
                overlay(ctx, rect, DEBUG_OCCLUDED_COLOR);
            }
        }
        for rect in blur_region.rects() {
            overlay(ctx, rect, DEBUG_BLUR_COLOR);
        }
    }
}

impl Walk {
    fn visit(&mut self, element: &dyn PassElement, scale: f32, any_live_blur: bool, blur_radius: f32) -> ElementVerdict {
        if self.remaining.is_empty() && !element.undiscardable() {
            return ElementVerdict::discarded();
        }

        let damage = self.remaining.clone();

        if let Some(bbox) = element.bounding_box() {
            if !element.undiscardable() && !self.remaining.intersects_rect(&bbox.scale(scale).round_out()) {
                return ElementVerdict {
                    damage,
                    discard: true,
                };
            }
        }

        let mut opaque = element.opaque_region();
        if !opaque.is_empty() {
            opaque.scale(scale);
            if any_live_blur && !self.blur_above.is_empty() {
                let mut sampled = self.blur_above.clone();
                sampled.expand(blur_radius);
                opaque.subtract(&sampled);
            }
            self.remaining.subtract(&opaque);
            self.occluded.push(opaque);
        }

        ElementVerdict {
            damage,
            discard: false,
        }
    }
}

fn live_blur_box(element: &dyn PassElement) -> Rect {
    match element.bounding_box() {
        Some(bbox) => bbox,
        None => panic!("{} needs live blur but has no bounding box", element.pass_name()),
    }
}
