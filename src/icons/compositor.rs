use cairo::{Context, Format, ImageSurface, Operator};
use tunglyph_data::geometry::Rectangle;

use super::scaler::paint_stretched;

/// How much of the logo the state badge covers, on each axis
const OVERLAY_FRACTION: f64 = 0.65;

/// Where the state badge goes on a `width`x`height` logo: the bottom-right corner, covering
/// `floor(0.65 * side)` pixels on each axis.
pub fn overlay_bounds(width: i32, height: i32) -> Rectangle {
    let w = (f64::from(width) * OVERLAY_FRACTION).floor() as i32;
    let h = (f64::from(height) * OVERLAY_FRACTION).floor() as i32;

    Rectangle::anchored_bottom_right(width, height, w, h)
}

/// Draws `base` over the whole `size`x`size` surface, then `overlay` inside `bounds`.
///
/// The overlay replaces whatever is beneath it inside `bounds`, transparent pixels included.
pub fn composite(
    base: &ImageSurface,
    overlay: &ImageSurface,
    size: i32,
    bounds: Rectangle,
) -> Result<ImageSurface, cairo::Error> {
    let target = ImageSurface::create(Format::ARgb32, size, size)?;

    {
        let cairo = Context::new(&target)?;
        paint_stretched(&cairo, base, 0, 0, size, size)?;

        if !bounds.is_empty() {
            cairo.set_operator(Operator::Source);
            let Rectangle { x, y, w, h } = bounds;
            paint_stretched(&cairo, overlay, x, y, w, h)?;
        }
    }
    target.flush();

    Ok(target)
}
