use crate::detection::domain::region_detector::DetectError;
use crate::detection::domain::text_fragment::DetectedTextFragment;
use crate::shared::frame::Frame;

/// Domain interface for OCR.
///
/// Fragments come back in the reader's native scan order, which is not
/// guaranteed to be spatially sorted.
pub trait TextReader: Send {
    fn read(&mut self, frame: &Frame) -> Result<Vec<DetectedTextFragment>, DetectError>;
}
