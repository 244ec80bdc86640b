/// An axis-aligned area to redact, in image pixel coordinates.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the bottom-right one.
/// Detector output may lie partly outside the image; every consumer that
/// touches pixels goes through [`Region::clamped`] or [`Region::padded`] first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Converts a relative bounding box (fractions of the image size) into
    /// absolute pixels, truncating toward zero, then clamps to the image.
    pub fn from_relative(
        xmin: f64,
        ymin: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let w = image_width as f64;
        let h = image_height as f64;
        Self {
            x1: (xmin * w) as i32,
            y1: (ymin * h) as i32,
            x2: ((xmin + width) * w) as i32,
            y2: ((ymin + height) * h) as i32,
        }
        .clamped(image_width, image_height)
    }

    /// Bounding box of a quad from its top-left and bottom-right corners.
    ///
    /// Skew is ignored: the other two corners do not contribute.
    pub fn from_quad(quad: &[(f32, f32); 4]) -> Self {
        let (tl, _tr, br, _bl) = (quad[0], quad[1], quad[2], quad[3]);
        Self {
            x1: tl.0 as i32,
            y1: tl.1 as i32,
            x2: br.0 as i32,
            y2: br.1 as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1).max(0)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Clamps every coordinate into `[0, width] x [0, height]`.
    pub fn clamped(&self, image_width: u32, image_height: u32) -> Self {
        let w = image_width as i32;
        let h = image_height as i32;
        Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }

    /// Grows the region by `pad` pixels on every side, then clamps.
    pub fn padded(&self, pad: i32, image_width: u32, image_height: u32) -> Self {
        Self {
            x1: self.x1.saturating_sub(pad),
            y1: self.y1.saturating_sub(pad),
            x2: self.x2.saturating_add(pad),
            y2: self.y2.saturating_add(pad),
        }
        .clamped(image_width, image_height)
    }
}
