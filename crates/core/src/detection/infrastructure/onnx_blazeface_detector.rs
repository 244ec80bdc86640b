/// BlazeFace face detector using ONNX Runtime via `ort`.
///
/// Produces one clamped region per face scoring at or above the fixed
/// operating threshold. Boxes are decoded as fractions of the frame and
/// scaled by the frame size.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::region_detector::DetectError;
use crate::shared::constants::FACE_CONFIDENCE;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::execution_provider::build_session;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Overlap above which two anchors are treated as the same face.
const ANCHOR_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    pub fn new(model_path: &Path, pool_size: usize) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: build_session(model_path, pool_size)?,
            confidence: FACE_CONFIDENCE,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, DetectError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }

        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut candidates = decode_boxes(reg_data, score_data, &self.anchors, self.confidence);
        let faces = suppress_duplicate_anchors(&mut candidates, ANCHOR_IOU_THRESH);

        Ok(faces
            .iter()
            .map(|b| {
                Region::from_relative(
                    b.xmin as f64,
                    b.ymin as f64,
                    b.width as f64,
                    b.height as f64,
                    frame.width(),
                    frame.height(),
                )
            })
            .collect())
    }
}

/// Resize frame to `size × size` and normalize to [-1, 1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 127.5 - 1.0;
            }
        }
    }
    tensor
}

/// BlazeFace short-range anchors: a 16×16 grid with 2 anchors per cell
/// followed by an 8×8 grid with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }
    anchors
}

/// A decoded face box in fractions of the frame.
#[derive(Clone, Debug, PartialEq)]
struct RelativeBox {
    xmin: f32,
    ymin: f32,
    width: f32,
    height: f32,
    score: f32,
}

impl RelativeBox {
    fn iou(&self, other: &RelativeBox) -> f64 {
        let x1 = self.xmin.max(other.xmin) as f64;
        let y1 = self.ymin.max(other.ymin) as f64;
        let x2 = (self.xmin + self.width).min(other.xmin + other.width) as f64;
        let y2 = (self.ymin + self.height).min(other.ymin + other.height) as f64;

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }
}

fn decode_boxes(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    confidence: f64,
) -> Vec<RelativeBox> {
    let mut boxes = Vec::new();
    let num_anchors = anchors.len().min(NUM_ANCHORS);

    for (i, &raw_score) in score_data.iter().enumerate().take(num_anchors) {
        let score = sigmoid(raw_score);
        if (score as f64) < confidence {
            continue;
        }
        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = anchor[0] + reg_data[offset] / INPUT_SIZE as f32;
        let cy = anchor[1] + reg_data[offset + 1] / INPUT_SIZE as f32;
        let w = reg_data[offset + 2] / INPUT_SIZE as f32;
        let h = reg_data[offset + 3] / INPUT_SIZE as f32;

        boxes.push(RelativeBox {
            xmin: cx - w / 2.0,
            ymin: cy - h / 2.0,
            width: w,
            height: h,
            score,
        });
    }
    boxes
}

/// Collapses anchors firing on the same face into one detection.
///
/// Neighbouring anchors are not independent faces; distinct faces that merely
/// overlap stay separate as long as their IoU is below the threshold.
fn suppress_duplicate_anchors(boxes: &mut [RelativeBox], iou_thresh: f64) -> Vec<RelativeBox> {
    boxes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<RelativeBox> = Vec::new();
    for candidate in boxes.iter() {
        if keep.iter().all(|k| k.iou(candidate) <= iou_thresh) {
            keep.push(candidate.clone());
        }
    }
    keep
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
