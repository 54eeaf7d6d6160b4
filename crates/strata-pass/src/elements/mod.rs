// Concrete pass elements, one struct per paint kind.

mod border;
mod clear;
mod framebuffer;
mod preblur;
mod rect;
mod shadow;
mod surface;
mod texture;

pub use border::BorderElement;
pub use clear::ClearElement;
pub use framebuffer::FramebufferElement;
pub use preblur::PreBlurElement;
pub use rect::RectElement;
pub use shadow::ShadowElement;
pub use surface::SurfaceElement;
pub use texture::TextureElement;

use strata_core::{IRect, Rect, Region};
use strata_renderer::Shape;

/// Default superellipse exponent: circular corners.
pub const DEFAULT_ROUNDING_POWER: f32 = 2.0;

/// Logical geometry to the pixel shape the immediate renderer draws.
pub(crate) fn pixel_shape(rect: Rect, round: f32, rounding_power: f32, scale: f32) -> Shape {
    Shape::new(rect.scale(scale), round * scale, rounding_power)
}

/// Whole pixels lying fully inside `rect`.
pub(crate) fn inner_region(rect: Rect) -> Region {
    let inner = IRect::new(
        rect.x.ceil() as i32,
        rect.y.ceil() as i32,
        rect.right().floor() as i32,
        rect.bottom().floor() as i32,
    );
    Region::from(inner)
}

/// `rect` minus its rounded corners, as an opaque-safe region.
pub(crate) fn rounded_inner_region(rect: Rect, round: f32) -> Region {
    if round <= 0.0 {
        return inner_region(rect);
    }
    // A rounded rect fully covers the cross formed by insetting either axis.
    let mut region = inner_region(Rect::new(rect.x + round, rect.y, rect.width - round * 2.0, rect.height));
    region.add(&inner_region(Rect::new(rect.x, rect.y + round, rect.width, rect.height - round * 2.0)));
    region
}

/// Damage clipped to an optional logical clip box.
pub(crate) fn clipped_damage(damage: &Region, clip: Option<Rect>, scale: f32) -> Region {
    let mut clipped = damage.clone();
    if let Some(clip) = clip {
        clipped.intersect_rect(clip.scale(scale).round_out());
    }
    clipped
}
