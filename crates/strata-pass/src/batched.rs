// Runs a group of elements through one batch manager session.

use strata_core::{GraphicsDevice, Rect, Region};
use strata_renderer::{BatchKind, RenderBatchManager, RenderContext};

use crate::{BatchRecord, ElementKind, PassElement};

/// Wraps a sequence of elements so that the simple ones are drawn through
/// the batch manager in a single session.
///
/// Every batched child is painted before every unbatched child, whatever
/// their original interleaving. Overlapping translucent children of both
/// kinds can therefore composite in a different order than they were added.
#[derive(Default)]
pub struct BatchedPassElement {
    batched: Vec<(BatchRecord, Box<dyn PassElement>)>,
    unbatched: Vec<Box<dyn PassElement>>,
}

impl BatchedPassElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: Box<dyn PassElement>) {
        match element.batch_record() {
            Some(record) => self.batched.push((record, element)),
            None => self.unbatched.push(element),
        }
    }

    pub fn batched_len(&self) -> usize {
        self.batched.len()
    }

    pub fn unbatched_len(&self) -> usize {
        self.unbatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batched.is_empty() && self.unbatched.is_empty()
    }

    fn children(&self) -> impl Iterator<Item = &dyn PassElement> {
        self.batched
            .iter()
            .map(|(_, element)| &**element)
            .chain(self.unbatched.iter().map(|element| &**element))
    }

    /// Replays the batched records once per damage rect they touch, with
    /// the scissor on that rect.
    fn replay(&self, ctx: &mut RenderContext, damage: &Region) {
        let scale = ctx.monitor().scale;
        let (device, batches) = ctx.split();
        let mut scissored = false;
        for clip in damage.rects() {
            let mut records = self
                .batched
                .iter()
                .filter(|(_, element)| {
                    element
                        .bounding_box()
                        .map_or(true, |bbox| bbox.scale(scale).round_out().intersects(clip))
                })
                .map(|(record, _)| record)
                .peekable();
            if records.peek().is_none() {
                continue;
            }

            device.set_scissor(Some(*clip));
            scissored = true;
            batches.begin_batch();
            for record in records {
                replay_record(device, batches, record, scale);
            }
            batches.end_batch(device);
        }
        if scissored {
            device.set_scissor(None);
        }
    }

    /// Some child has no box, so the group has none either.
    fn has_unbounded_child(&self) -> bool {
        self.children().any(|child| child.bounding_box().is_none())
    }
}

fn replay_record(
    device: &mut dyn GraphicsDevice,
    batches: &mut RenderBatchManager,
    record: &BatchRecord,
    scale: f32,
) {
    let rect = record.rect.scale(scale);
    let round = record.round * scale;
    match record.kind {
        BatchKind::Rect => batches.add_rect(device, rect, record.color, round, record.rounding_power),
        BatchKind::Texture => batches.add_texture(
            device,
            record.texture,
            rect,
            record.alpha,
            round,
            record.rounding_power,
        ),
        BatchKind::Border => batches.add_border(
            device,
            rect,
            record.color,
            round,
            record.rounding_power,
            record.thickness * scale,
        ),
        BatchKind::Shadow => batches.add_shadow(
            device,
            rect,
            record.color,
            round,
            record.rounding_power,
            record.range * scale,
        ),
    }
}

impl PassElement for BatchedPassElement {
    fn draw(&mut self, ctx: &mut RenderContext, damage: &Region) {
        if !self.batched.is_empty() {
            self.replay(ctx, damage);
        }
        for element in &mut self.unbatched {
            element.draw(ctx, damage);
        }
    }

    fn needs_live_blur(&self) -> bool {
        self.unbatched.iter().any(|e| e.needs_live_blur())
    }

    fn needs_precompute_blur(&self) -> bool {
        self.unbatched.iter().any(|e| e.needs_precompute_blur())
    }

    /// Union of the children's boxes. A child without a box makes the group
    /// unbounded, unless the group needs live blur: then the union of the
    /// bounded children is returned and the group becomes undiscardable.
    fn bounding_box(&self) -> Option<Rect> {
        if self.is_empty() || (self.has_unbounded_child() && !self.needs_live_blur()) {
            return None;
        }
        let bbox = self
            .children()
            .filter_map(|child| child.bounding_box())
            .fold(Rect::ZERO, Rect::union);
        Some(bbox)
    }

    fn opaque_region(&self) -> Region {
        let mut opaque = Region::new();
        for child in self.children() {
            opaque.add(&child.opaque_region());
        }
        opaque
    }

    fn discard(&mut self) {
        for (_, element) in &mut self.batched {
            element.discard();
        }
        for element in &mut self.unbatched {
            element.discard();
        }
    }

    fn undiscardable(&self) -> bool {
        self.children().any(|child| child.undiscardable())
            || (self.has_unbounded_child() && self.needs_live_blur())
    }

    fn disable_simplification(&self) -> bool {
        self.children().any(|child| child.disable_simplification())
    }

    fn pass_name(&self) -> &'static str {
        "BatchedPassElement"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Batched
    }
}
