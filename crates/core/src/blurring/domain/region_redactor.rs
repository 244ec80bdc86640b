use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for irreversibly obscuring regions of a frame.
///
/// The input frame is left untouched; the redacted copy is returned.
/// Regions are applied strictly in the given order.
pub trait RegionRedactor: Send {
    fn redact(&self, frame: &Frame, regions: &[Region]) -> Frame;
}
