// Pixel regions: sets of non-overlapping integer rects.
// Used for damage, opaque coverage and blur footprints.

use crate::Rect;

/// Half-open integer rect `[x1, x2) x [y1, y2)` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl IRect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        self.width() as i64 * self.height() as i64
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    pub fn intersection(&self, other: &IRect) -> Option<IRect> {
        let r = IRect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        (!r.is_empty()).then_some(r)
    }

    pub fn intersects(&self, other: &IRect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn translate(&self, dx: i32, dy: i32) -> IRect {
        IRect::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    pub fn expand(&self, amount: i32) -> IRect {
        IRect::new(
            self.x1 - amount,
            self.y1 - amount,
            self.x2 + amount,
            self.y2 + amount,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x1 as f32,
            self.y1 as f32,
            self.width() as f32,
            self.height() as f32,
        )
    }

    /// Pushes the parts of `self` not covered by `cut` into `out`:
    /// a full-width top band, a full-width bottom band, and the left and
    /// right pieces of the middle band.
    fn subtract_into(&self, cut: &IRect, out: &mut Vec<IRect>) {
        let Some(overlap) = self.intersection(cut) else {
            out.push(*self);
            return;
        };
        if self.y1 < overlap.y1 {
            out.push(IRect::new(self.x1, self.y1, self.x2, overlap.y1));
        }
        if overlap.y2 < self.y2 {
            out.push(IRect::new(self.x1, overlap.y2, self.x2, self.y2));
        }
        if self.x1 < overlap.x1 {
            out.push(IRect::new(self.x1, overlap.y1, overlap.x1, overlap.y2));
        }
        if overlap.x2 < self.x2 {
            out.push(IRect::new(overlap.x2, overlap.y1, self.x2, overlap.y2));
        }
    }
}

/// A set of pixels stored as non-overlapping rects.
///
/// Rect order carries no meaning: two regions compare equal when they cover
/// the same pixels. Mutating operations return `&mut Self` so they chain:
///
/// ```
/// use strata_core::{IRect, Region};
///
/// let mut damage = Region::from(IRect::from_xywh(0, 0, 100, 100));
/// damage
///     .subtract_rect(IRect::from_xywh(0, 0, 50, 100))
///     .expand(2.0);
/// assert_eq!(damage.extents(), IRect::new(48, -2, 102, 102));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Region {
    rects: Vec<IRect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[IRect] {
        &self.rects
    }

    pub fn clear(&mut self) -> &mut Self {
        self.rects.clear();
        self
    }

    /// Bounding rect of every pixel in the region; zero-sized when empty.
    pub fn extents(&self) -> IRect {
        let mut it = self.rects.iter();
        let Some(first) = it.next() else {
            return IRect::default();
        };
        it.fold(*first, |acc, r| {
            IRect::new(
                acc.x1.min(r.x1),
                acc.y1.min(r.y1),
                acc.x2.max(r.x2),
                acc.y2.max(r.y2),
            )
        })
    }

    pub fn area(&self) -> i64 {
        self.rects.iter().map(IRect::area).sum()
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    pub fn intersects_rect(&self, rect: &IRect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    /// True if both regions cover exactly the same pixels.
    pub fn same_pixels(&self, other: &Region) -> bool {
        self.area() == other.area() && self.clone().subtract(other).is_empty()
    }

    pub fn add_rect(&mut self, rect: IRect) -> &mut Self {
        if rect.is_empty() {
            return self;
        }
        let mut pieces = vec![rect];
        let mut scratch = Vec::new();
        for existing in &self.rects {
            scratch.clear();
            for piece in &pieces {
                piece.subtract_into(existing, &mut scratch);
            }
            std::mem::swap(&mut pieces, &mut scratch);
            if pieces.is_empty() {
                return self;
            }
        }
        self.rects.extend(pieces);
        self.coalesce();
        self
    }

    pub fn add(&mut self, other: &Region) -> &mut Self {
        for rect in &other.rects {
            self.add_rect(*rect);
        }
        self
    }

    pub fn subtract_rect(&mut self, cut: IRect) -> &mut Self {
        if cut.is_empty() || self.rects.is_empty() {
            return self;
        }
        let mut out = Vec::with_capacity(self.rects.len() + 4);
        for rect in &self.rects {
            rect.subtract_into(&cut, &mut out);
        }
        self.rects = out;
        self.coalesce();
        self
    }

    pub fn subtract(&mut self, other: &Region) -> &mut Self {
        for cut in &other.rects {
            if self.rects.is_empty() {
                break;
            }
            self.subtract_rect(*cut);
        }
        self
    }

    pub fn intersect_rect(&mut self, clip: IRect) -> &mut Self {
        self.rects = self
            .rects
            .iter()
            .filter_map(|r| r.intersection(&clip))
            .collect();
        self
    }

    /// Both operands are non-overlapping, so the pairwise intersections are too.
    pub fn intersect(&mut self, other: &Region) -> &mut Self {
        let mut out = Vec::new();
        for a in &self.rects {
            for b in &other.rects {
                if let Some(r) = a.intersection(b) {
                    out.push(r);
                }
            }
        }
        self.rects = out;
        self.coalesce();
        self
    }

    /// Grows every rect by `amount` pixels (rounded up) on each side.
    /// Only growing is supported; non-positive amounts leave the region as is.
    pub fn expand(&mut self, amount: f32) -> &mut Self {
        let amount = amount.ceil() as i32;
        if amount <= 0 || self.rects.is_empty() {
            return self;
        }
        let grown: Vec<IRect> = self.rects.iter().map(|r| r.expand(amount)).collect();
        self.rects.clear();
        for rect in grown {
            self.add_rect(rect);
        }
        self
    }

    /// Scales around the origin, rounding every rect outward.
    pub fn scale(&mut self, factor: f32) -> &mut Self {
        if factor == 1.0 || self.rects.is_empty() {
            return self;
        }
        let scaled: Vec<IRect> = self
            .rects
            .iter()
            .map(|r| r.to_rect().scale(factor).round_out())
            .collect();
        self.rects.clear();
        for rect in scaled {
            self.add_rect(rect);
        }
        self
    }

    pub fn translate(&mut self, dx: i32, dy: i32) -> &mut Self {
        for rect in &mut self.rects {
            *rect = rect.translate(dx, dy);
        }
        self
    }

    /// Merges rects sharing a full edge so repeated edits don't fragment
    /// the region without bound.
    fn coalesce(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.rects.len() {
                for j in (i + 1)..self.rects.len() {
                    let (a, b) = (self.rects[i], self.rects[j]);
                    let joined = if a.y1 == b.y1 && a.y2 == b.y2 && (a.x2 == b.x1 || b.x2 == a.x1) {
                        Some(IRect::new(a.x1.min(b.x1), a.y1, a.x2.max(b.x2), a.y2))
                    } else if a.x1 == b.x1 && a.x2 == b.x2 && (a.y2 == b.y1 || b.y2 == a.y1) {
                        Some(IRect::new(a.x1, a.y1.min(b.y1), a.x2, a.y2.max(b.y2)))
                    } else {
                        None
                    };
                    if let Some(r) = joined {
                        self.rects[i] = r;
                        self.rects.swap_remove(j);
                        merged = true;
                        break 'outer;
                    }
                }
            }
        }
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.same_pixels(other)
    }
}

impl From<IRect> for Region {
    fn from(rect: IRect) -> Self {
        let mut region = Region::new();
        region.add_rect(rect);
        region
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::from(rect.round_out())
    }
}

impl FromIterator<IRect> for Region {
    fn from_iter<T: IntoIterator<Item = IRect>>(iter: T) -> Self {
        let mut region = Region::new();
        for rect in iter {
            region.add_rect(rect);
        }
        region
    }
}
