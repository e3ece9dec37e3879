/// An axis aligned rectangle in device pixels.
///
/// Icons are always rendered on whole pixels, so unlike a drawing canvas there is no need for
/// fractional coordinates here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle of `w`x`h` whose bottom-right corner touches the bottom-right corner of an
    /// `outer_w`x`outer_h` area that starts at the origin.
    #[must_use]
    pub const fn anchored_bottom_right(outer_w: i32, outer_h: i32, w: i32, h: i32) -> Self {
        Self {
            x: outer_w - w,
            y: outer_h - h,
            w,
            h,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}
