use std::path::PathBuf;

use thiserror::Error;

use crate::detection::domain::region_detector::DetectError;
use crate::imaging::domain::image_reader::ImageReadError;
use crate::imaging::domain::image_writer::ImageWriteError;

/// Terminal failure of one masking request.
///
/// Nothing is retried and no output is persisted when any of these occur.
#[derive(Error, Debug)]
pub enum MaskingError {
    #[error("source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: ImageReadError,
    },
    #[error("detection failed on {}: {source}", .path.display())]
    Detection { path: PathBuf, source: DetectError },
    #[error("cannot write {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: ImageWriteError,
    },
}

impl MaskingError {
    /// Short machine-readable status for front ends.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceNotFound(_) => "source_not_found",
            Self::Decode { .. } => "decode_error",
            Self::Detection { .. } => "detection_failure",
            Self::Encode { .. } => "encode_failure",
        }
    }
}
