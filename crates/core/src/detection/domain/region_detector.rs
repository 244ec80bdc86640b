use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::sensitive_text::matched_rules;
use crate::detection::domain::text_reader::TextReader;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Error type shared by detection traits. `Send + Sync` so failures can
/// travel back from worker threads.
pub type DetectError = Box<dyn std::error::Error + Send + Sync>;

/// Capability that locates every area of a frame that must be redacted.
///
/// The order of the returned regions is the order they will be redacted in.
pub trait RegionDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, DetectError>;
}

/// Runs face detection, then OCR, over the same frame.
///
/// Output is all face regions followed by one region per (sensitive text
/// fragment, matched rule) pair. Nothing is merged or deduplicated: a
/// fragment matching both the numeric and the keyword rule contributes its
/// box twice.
pub struct SensitiveRegionDetector {
    faces: Box<dyn FaceDetector>,
    text: Box<dyn TextReader>,
}

impl SensitiveRegionDetector {
    pub fn new(faces: Box<dyn FaceDetector>, text: Box<dyn TextReader>) -> Self {
        Self { faces, text }
    }
}

impl RegionDetector for SensitiveRegionDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, DetectError> {
        let mut regions = self.faces.detect(frame)?;
        let face_count = regions.len();

        let fragments = self.text.read(frame)?;
        for fragment in &fragments {
            let rules = matched_rules(&fragment.text);
            if !rules.is_empty() {
                log::debug!(
                    "Sensitive text {:?} (confidence {:.2}) matched {:?}",
                    fragment.text,
                    fragment.confidence,
                    rules
                );
            }
            regions.extend(rules.iter().map(|_| fragment.region()));
        }

        log::debug!(
            "Detected {} face region(s) and {} text region(s) from {} fragment(s)",
            face_count,
            regions.len() - face_count,
            fragments.len()
        );
        Ok(regions)
    }
}
