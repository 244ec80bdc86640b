//! Turns a text-detection probability map into word boxes.
//!
//! Pixels above `binary_thresh` are grouped into 4-connected components,
//! components are kept when their mean probability reaches `box_thresh`, and
//! each kept box is grown by the unclip ratio to recover the full glyph
//! extent (the model predicts shrunken text kernels).

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

/// Default post-processing parameters for the DB text detector.
pub const DEFAULT_BINARY_THRESH: f32 = 0.3;
pub const DEFAULT_BOX_THRESH: f32 = 0.6;
pub const DEFAULT_UNCLIP_RATIO: f32 = 1.5;

/// Components thinner than this (in map pixels) are noise.
const MIN_SIDE: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct ExtractorParams {
    pub binary_thresh: f32,
    pub box_thresh: f32,
    pub unclip_ratio: f32,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            binary_thresh: DEFAULT_BINARY_THRESH,
            box_thresh: DEFAULT_BOX_THRESH,
            unclip_ratio: DEFAULT_UNCLIP_RATIO,
        }
    }
}

/// A detected text box in source-image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox {
    /// top-left, top-right, bottom-right, bottom-left
    pub quad: [(f32, f32); 4],
    pub score: f32,
}

struct Component {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    prob_sum: f32,
    pixels: usize,
}

/// Extracts boxes from a `map_w × map_h` probability map and rescales them
/// to a `src_w × src_h` image.
///
/// Boxes are returned in raster order of each component's first pixel.
pub fn extract_boxes(
    prob: &[f32],
    map_w: usize,
    map_h: usize,
    src_w: u32,
    src_h: u32,
    params: ExtractorParams,
) -> Vec<TextBox> {
    if map_w == 0 || map_h == 0 || prob.len() < map_w * map_h {
        return Vec::new();
    }

    let scale_x = src_w as f32 / map_w as f32;
    let scale_y = src_h as f32 / map_h as f32;

    find_components(prob, map_w, map_h, params.binary_thresh)
        .into_iter()
        .filter_map(|c| {
            let w = c.max_x - c.min_x + 1;
            let h = c.max_y - c.min_y + 1;
            if w < MIN_SIDE || h < MIN_SIDE {
                return None;
            }
            let score = c.prob_sum / c.pixels as f32;
            if score < params.box_thresh {
                return None;
            }

            let area = (w * h) as f32;
            let perimeter = 2.0 * (w + h) as f32;
            let offset = area * params.unclip_ratio / perimeter;

            let x1 = ((c.min_x as f32 - offset) * scale_x).clamp(0.0, src_w as f32);
            let y1 = ((c.min_y as f32 - offset) * scale_y).clamp(0.0, src_h as f32);
            let x2 = (((c.max_x + 1) as f32 + offset) * scale_x).clamp(0.0, src_w as f32);
            let y2 = (((c.max_y + 1) as f32 + offset) * scale_y).clamp(0.0, src_h as f32);

            Some(TextBox {
                quad: [(x1, y1), (x2, y1), (x2, y2), (x1, y2)],
                score,
            })
        })
        .collect()
}

fn find_components(prob: &[f32], w: usize, h: usize, thresh: f32) -> Vec<Component> {
    let mask = GrayImage::from_fn(w as u32, h as u32, |x, y| {
        Luma([if prob[y as usize * w + x as usize] > thresh { 255 } else { 0 }])
    });
    let labels = connected_components(&mask, Connectivity::Four, Luma([0u8]));

    // Indexed by label; `order` records labels as the raster scan first meets them.
    let mut components: Vec<Option<Component>> = Vec::new();
    let mut order = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        if components.len() <= label {
            components.resize_with(label + 1, || None);
        }
        let (x, y) = (x as usize, y as usize);
        if components[label].is_none() {
            order.push(label);
            components[label] = Some(Component {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                prob_sum: 0.0,
                pixels: 0,
            });
        }
        let Some(c) = components[label].as_mut() else {
            continue;
        };
        c.min_x = c.min_x.min(x);
        c.max_x = c.max_x.max(x);
        c.max_y = c.max_y.max(y);
        c.prob_sum += prob[y * w + x];
        c.pixels += 1;
    }

    order
        .into_iter()
        .filter_map(|label| components[label].take())
        .collect()
}
