use crate::detection::domain::region_detector::DetectError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Inference sessions need exclusive access while running, hence `&mut self`.
/// Returned regions are already clamped to the frame.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, DetectError>;
}
