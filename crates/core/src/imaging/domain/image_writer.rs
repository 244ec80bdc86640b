use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ImageWriteError {
    #[error("frame data does not form a {width}x{height} RGB image")]
    InvalidFrame { width: u32, height: u32 },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Encodes a frame to an image file.
///
/// The destination either holds the complete encoded image or is left as it
/// was; a failed write never leaves a truncated file behind.
pub trait ImageWriter: Send + Sync {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), ImageWriteError>;
}
