use crate::shared::region::Region;

/// One OCR result.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedTextFragment {
    /// Corners in order: top-left, top-right, bottom-right, bottom-left.
    pub quad: [(f32, f32); 4],
    pub text: String,
    /// Recognition score in `[0, 1]`. Carried through, never used to filter.
    pub confidence: f32,
}

impl DetectedTextFragment {
    pub fn new(quad: [(f32, f32); 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned box spanned by the top-left and bottom-right corners.
    pub fn region(&self) -> Region {
        Region::from_quad(&self.quad)
    }
}
