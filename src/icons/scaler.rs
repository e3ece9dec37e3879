use cairo::{Context, Extend, Format, ImageSurface};

/// Stretches `surface` so that it fills a `width`x`height` surface.
///
/// Each axis is scaled on its own, a non-square source gets distorted. Every caller asks for
/// square icons from square sources so that doesn't come up in practice.
///
/// If the surface already has the requested size, the very same surface is handed back.
pub fn stretch(
    surface: &ImageSurface,
    width: i32,
    height: i32,
) -> Result<ImageSurface, cairo::Error> {
    if surface.width() == width && surface.height() == height {
        return Ok(surface.clone());
    }

    let target = ImageSurface::create(Format::ARgb32, width, height)?;

    {
        let cairo = Context::new(&target)?;
        paint_stretched(&cairo, surface, 0, 0, width, height)?;
    }
    target.flush();

    Ok(target)
}

/// Paints `surface` onto `cairo` so that it exactly covers the given rectangle.
///
/// Nothing is drawn when either the source or the rectangle is degenerate.
pub(super) fn paint_stretched(
    cairo: &Context,
    surface: &ImageSurface,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
) -> Result<(), cairo::Error> {
    if surface.width() <= 0 || surface.height() <= 0 || width <= 0 || height <= 0 {
        return Ok(());
    }

    let sx = f64::from(width) / f64::from(surface.width());
    let sy = f64::from(height) / f64::from(surface.height());

    cairo.save()?;
    cairo.rectangle(
        f64::from(x),
        f64::from(y),
        f64::from(width),
        f64::from(height),
    );
    cairo.clip();
    cairo.translate(f64::from(x), f64::from(y));
    cairo.scale(sx, sy);
    cairo.set_source_surface(surface, 0.0, 0.0)?;
    // Without padding the edges would get blended with the transparent outside of the source
    cairo.source().set_extend(Extend::Pad);
    cairo.paint()?;
    cairo.restore()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use cairo::{Format, ImageSurface};

    use super::stretch;
    use crate::icons::tests::{pixel_at, solid};

    #[test]
    fn same_size_is_the_same_surface() {
        let source = solid(32, 32, 0xffff0000);
        let scaled = stretch(&source, 32, 32).unwrap();

        assert_eq!(source.to_raw_none(), scaled.to_raw_none());
    }

    #[test]
    fn stretches_each_axis() {
        let source = solid(16, 8, 0xff00ff00);
        let scaled = stretch(&source, 32, 32).unwrap();

        assert_eq!((scaled.width(), scaled.height()), (32, 32));
        for (x, y) in [(0, 0), (31, 0), (0, 31), (31, 31), (16, 16)] {
            assert_eq!(pixel_at(&scaled, x, y), 0xff00ff00);
        }
    }

    #[test]
    fn degenerate_source() {
        let source = ImageSurface::create(Format::ARgb32, 0, 0).unwrap();
        let scaled = stretch(&source, 16, 16).unwrap();

        assert_eq!((scaled.width(), scaled.height()), (16, 16));
        assert_eq!(pixel_at(&scaled, 8, 8), 0);
    }
}
