use std::io::{Cursor, ErrorKind};
use std::path::Path;

use image::DynamicImage;

use crate::imaging::domain::image_reader::{ImageReadError, ImageReader};
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate.
///
/// The format is sniffed from the file contents, not the extension. EXIF
/// orientation is applied so detectors see the photo upright, and every
/// colour type is converted to 8-bit RGB.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    let mut decoder = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_decoder()?;
    let orientation = image::ImageDecoder::orientation(&mut decoder)?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, ImageReadError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ImageReadError::NotFound(path.to_path_buf()),
            _ => ImageReadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let img = decode(&bytes).map_err(|source| ImageReadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            path.display(),
            img.width(),
            img.height(),
            img.color()
        );
        Ok(Frame::from_rgb_image(img.to_rgb8()))
    }
}
