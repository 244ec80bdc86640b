use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::blurring::domain::region_redactor::RegionRedactor;
use crate::detection::infrastructure::detector_pool::DetectorPool;
use crate::imaging::domain::image_reader::{ImageReadError, ImageReader};
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::masking_error::MaskingError;
use crate::shared::frame::Frame;

/// Result of masking one photo.
#[derive(Debug)]
pub struct MaskedImage {
    /// Regions redacted, duplicates included.
    pub regions_count: usize,
    pub frame: Frame,
}

/// Single-photo masking pipeline: read → detect → redact → write.
///
/// One pipeline serves one request at a time. Detectors are borrowed from a
/// pool that may be shared with other pipelines on other threads.
pub struct MaskingPipeline {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    detectors: Arc<DetectorPool>,
    redactor: Box<dyn RegionRedactor>,
}

impl MaskingPipeline {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        detectors: Arc<DetectorPool>,
        redactor: Box<dyn RegionRedactor>,
    ) -> Self {
        Self {
            reader,
            writer,
            detectors,
            redactor,
        }
    }

    /// Decodes `source`, detects sensitive regions and returns the redacted
    /// image. Nothing is written.
    pub fn process(&self, source: &Path) -> Result<MaskedImage, MaskingError> {
        let start = Instant::now();
        let frame = self.reader.read(source).map_err(|e| match e {
            ImageReadError::NotFound(path) => MaskingError::SourceNotFound(path),
            other => MaskingError::Decode {
                path: source.to_path_buf(),
                source: other,
            },
        })?;
        log::debug!(
            "decode: {:.1}ms ({}x{})",
            start.elapsed().as_secs_f64() * 1000.0,
            frame.width(),
            frame.height()
        );

        if self.detectors.idle() == 0 {
            log::debug!("All detectors busy; waiting for one to free up");
        }
        let start = Instant::now();
        let regions = self
            .detectors
            .with_detector(|detector| detector.detect(&frame))
            .map_err(|e| MaskingError::Detection {
                path: source.to_path_buf(),
                source: e.into(),
            })?
            .map_err(|source_err| MaskingError::Detection {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        log::debug!(
            "detect: {:.1}ms ({} regions)",
            start.elapsed().as_secs_f64() * 1000.0,
            regions.len()
        );

        let start = Instant::now();
        let redacted = self.redactor.redact(&frame, &regions);
        log::debug!("redact: {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

        Ok(MaskedImage {
            regions_count: regions.len(),
            frame: redacted,
        })
    }

    /// Runs [`process`](Self::process) and writes the result to `dest`.
    ///
    /// `dest` is only touched after every earlier stage has succeeded.
    /// Returns the number of redacted regions.
    pub fn process_to(&self, source: &Path, dest: &Path) -> Result<usize, MaskingError> {
        let masked = self.process(source)?;

        let start = Instant::now();
        self.writer
            .write(dest, &masked.frame)
            .map_err(|e| MaskingError::Encode {
                path: dest.to_path_buf(),
                source: e,
            })?;
        log::debug!("encode: {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

        log::info!(
            "Masked {} → {} ({} regions)",
            source.display(),
            dest.display(),
            masked.regions_count
        );
        Ok(masked.regions_count)
    }
}
