use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

use crate::imaging::domain::image_writer::{ImageWriteError, ImageWriter};
use crate::shared::frame::Frame;

const JPEG_QUALITY: u8 = 95;

/// Writes frames with the `image` crate, picking the format from the
/// destination's extension.
///
/// Encoding goes to a hidden `.part` sibling which is renamed over the
/// destination only once the encoder has finished.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn part_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

fn encode(img: &RgbImage, format: ImageFormat, dest: &Path) -> Result<(), ImageWriteError> {
    let io_err = |source| ImageWriteError::Io {
        path: dest.to_path_buf(),
        source,
    };
    let encode_err = |source| ImageWriteError::Encode {
        path: dest.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(dest).map_err(io_err)?);
    match format {
        ImageFormat::Jpeg => img
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))
            .map_err(encode_err)?,
        _ => img.write_to(&mut writer, format).map_err(encode_err)?,
    }
    writer.flush().map_err(io_err)
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), ImageWriteError> {
        let format = ImageFormat::from_path(path).map_err(|source| ImageWriteError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        let img = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or(ImageWriteError::InvalidFrame {
                width: frame.width(),
                height: frame.height(),
            })?;

        let part = part_path(path);
        if let Err(e) = encode(&img, format, &part) {
            let _ = fs::remove_file(&part);
            return Err(e);
        }
        fs::rename(&part, path).map_err(|source| {
            let _ = fs::remove_file(&part);
            ImageWriteError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::debug!("Wrote {} as {:?}", path.display(), format);
        Ok(())
    }
}
