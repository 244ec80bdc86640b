/// Two-stage OCR using ONNX Runtime via `ort`.
///
/// A DB-style detection model produces a text probability map, which
/// [`extract_boxes`] turns into word boxes; each box is cropped and passed
/// through a CTC recognition model. Fragments keep the detection scan order.
use std::path::Path;

use image::imageops::FilterType;

use crate::detection::domain::region_detector::DetectError;
use crate::detection::domain::text_fragment::DetectedTextFragment;
use crate::detection::domain::text_reader::TextReader;
use crate::shared::frame::Frame;

use super::ctc_decoder::CtcDecoder;
use super::execution_provider::build_session;
use super::text_box_extractor::{extract_boxes, ExtractorParams};

/// Longest side fed to the detection model.
const DET_MAX_SIDE: u32 = 960;

/// Detection input sides must be multiples of this.
const DET_ALIGN: u32 = 32;

const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

const REC_HEIGHT: u32 = 48;
const REC_MAX_WIDTH: u32 = 320;

pub struct OnnxTextReader {
    detection: ort::session::Session,
    recognition: ort::session::Session,
    decoder: CtcDecoder,
    params: ExtractorParams,
}

impl OnnxTextReader {
    pub fn new(
        detection_model: &Path,
        recognition_model: &Path,
        dictionary: &Path,
        pool_size: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            detection: build_session(detection_model, pool_size)?,
            recognition: build_session(recognition_model, pool_size)?,
            decoder: CtcDecoder::from_file(dictionary)?,
            params: ExtractorParams::default(),
        })
    }

    fn recognize(&mut self, crop: &Frame) -> Result<(String, f32), DetectError> {
        let input = preprocess_recognition(crop);
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.recognition.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Recognition model produced no outputs".into());
        }

        // [1, timesteps, classes]
        let scores = outputs[0].try_extract_array::<f32>()?;
        let shape = scores.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected recognition output shape: {shape:?}").into());
        }
        if shape[2] != self.decoder.num_classes() {
            log::warn!(
                "Recognition model has {} classes, dictionary provides {}",
                shape[2],
                self.decoder.num_classes()
            );
        }
        let data = scores.as_slice().ok_or("Cannot get recognition slice")?;
        Ok(self.decoder.decode(data, shape[1], shape[2]))
    }
}

impl TextReader for OnnxTextReader {
    fn read(&mut self, frame: &Frame) -> Result<Vec<DetectedTextFragment>, DetectError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }

        let (input, map_w, map_h) = preprocess_detection(frame)?;
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.detection.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Text detection model produced no outputs".into());
        }
        // [1, 1, map_h, map_w]
        let prob_map = outputs[0].try_extract_array::<f32>()?;
        let prob = prob_map.as_slice().ok_or("Cannot get probability map slice")?;
        let boxes = extract_boxes(
            prob,
            map_w as usize,
            map_h as usize,
            frame.width(),
            frame.height(),
            self.params,
        );
        drop(outputs);

        let mut fragments = Vec::with_capacity(boxes.len());
        for text_box in boxes {
            let (x1, y1) = text_box.quad[0];
            let (x2, y2) = text_box.quad[2];
            let crop = frame.crop(
                x1 as u32,
                y1 as u32,
                (x2 - x1).ceil() as u32,
                (y2 - y1).ceil() as u32,
            );
            if crop.width() == 0 || crop.height() == 0 {
                continue;
            }
            let (text, confidence) = self.recognize(&crop)?;
            fragments.push(DetectedTextFragment::new(text_box.quad, text, confidence));
        }
        Ok(fragments)
    }
}

fn to_rgb_image(frame: &Frame) -> Result<image::RgbImage, DetectError> {
    image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or_else(|| "Frame data does not form an RGB image".into())
}

/// Detection input dimensions: longer side capped, both sides aligned.
fn detection_size(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height).max(1);
    let ratio = if longest > DET_MAX_SIDE {
        DET_MAX_SIDE as f64 / longest as f64
    } else {
        1.0
    };
    let align = |side: u32| {
        let scaled = (side as f64 * ratio).round() as u32;
        (((scaled + DET_ALIGN / 2) / DET_ALIGN) * DET_ALIGN).max(DET_ALIGN)
    };
    (align(width), align(height))
}

fn preprocess_detection(frame: &Frame) -> Result<(ndarray::Array4<f32>, u32, u32), DetectError> {
    let (w, h) = detection_size(frame.width(), frame.height());
    let resized = image::imageops::resize(&to_rgb_image(frame)?, w, h, FilterType::Triangle);

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - DET_MEAN[c]) / DET_STD[c];
        }
    }
    Ok((tensor, w, h))
}

/// Width of a crop resized to the recognition height, keeping aspect ratio.
fn recognition_width(width: u32, height: u32) -> u32 {
    let scaled = (REC_HEIGHT as f64 * width as f64 / height.max(1) as f64).ceil() as u32;
    scaled.clamp(1, REC_MAX_WIDTH)
}

/// Resize to `REC_HEIGHT`, normalize to [-1, 1], right-pad with zeros to
/// `REC_MAX_WIDTH`.
fn preprocess_recognition(crop: &Frame) -> ndarray::Array4<f32> {
    let target_w = recognition_width(crop.width(), crop.height());
    let mut tensor =
        ndarray::Array4::<f32>::zeros((1, 3, REC_HEIGHT as usize, REC_MAX_WIDTH as usize));

    let Ok(rgb) = to_rgb_image(crop) else {
        return tensor;
    };
    let resized = image::imageops::resize(&rgb, target_w, REC_HEIGHT, FilterType::Triangle);
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 127.5 - 1.0;
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::small_is_aligned(100, 50, (96, 64))]
    #[case::exact_multiple(640, 480, (640, 480))]
    #[case::large_is_capped(1920, 1080, (960, 544))]
    #[case::portrait(1000, 3000, (320, 960))]
    #[case::tiny(3, 3, (32, 32))]
    fn test_detection_size(#[case] w: u32, #[case] h: u32, #[case] expected: (u32, u32)) {
        assert_eq!(detection_size(w, h), expected);
    }

    #[test]
    fn test_detection_size_is_aligned() {
        for (w, h) in [(4032, 3024), (517, 233), (1, 999)] {
            let (dw, dh) = detection_size(w, h);
            assert_eq!(dw % DET_ALIGN, 0);
            assert_eq!(dh % DET_ALIGN, 0);
            assert!(dw <= DET_MAX_SIDE + DET_ALIGN && dh <= DET_MAX_SIDE + DET_ALIGN);
        }
    }

    #[test]
    fn test_preprocess_detection_normalizes() {
        let frame = Frame::new(vec![255u8; 64 * 64 * 3], 64, 64, 3);
        let (tensor, w, h) = preprocess_detection(&frame).unwrap();
        assert_eq!((w, h), (64, 64));
        assert_eq!(tensor.shape(), &[1, 3, 64, 64]);
        assert_relative_eq!(tensor[[0, 0, 10, 10]], (1.0 - 0.485) / 0.229, epsilon = 1e-4);
    }

    #[rstest]
    #[case::wide(200, 20, 320)]
    #[case::proportional(100, 48, 100)]
    #[case::tall(10, 100, 5)]
    fn test_recognition_width(#[case] w: u32, #[case] h: u32, #[case] expected: u32) {
        assert_eq!(recognition_width(w, h), expected);
    }

    #[test]
    fn test_preprocess_recognition_pads_right() {
        let crop = Frame::new(vec![255u8; 48 * 48 * 3], 48, 48, 3);
        let tensor = preprocess_recognition(&crop);
        assert_eq!(tensor.shape(), &[1, 3, 48, 320]);
        assert_relative_eq!(tensor[[0, 0, 10, 10]], 1.0);
        assert_relative_eq!(tensor[[0, 0, 10, 200]], 0.0);
    }
}
