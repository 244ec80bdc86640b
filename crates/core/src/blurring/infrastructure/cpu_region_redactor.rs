use std::cell::RefCell;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::blurring::domain::region_redactor::RegionRedactor;
use crate::shared::constants::{
    REDACTION_KERNEL_SIZE, REDACTION_OUTLINE_COLOR, REDACTION_PAD, REDACTION_SIGMA,
};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::gaussian::{self, RoiRect};

/// CPU redactor: pads each region, blurs it with a strong separable
/// Gaussian, then outlines the blurred rectangle with a 1px border.
///
/// The blur radius is large enough that nothing inside the rectangle can be
/// read back from the output.
pub struct CpuRegionRedactor {
    kernel: Vec<f32>,
    pad: i32,
    outline: Rgb<u8>,
    roi_buf: RefCell<Vec<u8>>,
    blur_temp: RefCell<Vec<f32>>,
}

impl CpuRegionRedactor {
    pub fn new(kernel_size: usize, sigma: f64, pad: i32) -> Self {
        Self {
            kernel: gaussian::gaussian_kernel_1d(kernel_size | 1, sigma),
            pad,
            outline: Rgb(REDACTION_OUTLINE_COLOR),
            roi_buf: RefCell::new(Vec::new()),
            blur_temp: RefCell::new(Vec::new()),
        }
    }

    fn blur_region(&self, data: &mut [u8], frame_width: usize, channels: usize, r: &Region) {
        let rect = RoiRect {
            x: r.x1 as usize,
            y: r.y1 as usize,
            w: r.width() as usize,
            h: r.height() as usize,
        };
        let mut roi = self.roi_buf.borrow_mut();
        let mut temp = self.blur_temp.borrow_mut();
        gaussian::extract_roi(data, frame_width, channels, rect, &mut roi);
        gaussian::separable_gaussian_blur(&mut roi, rect.w, rect.h, channels, &self.kernel, &mut temp);
        gaussian::write_roi_back(data, &roi, frame_width, channels, rect);
    }
}

impl Default for CpuRegionRedactor {
    fn default() -> Self {
        Self::new(REDACTION_KERNEL_SIZE, REDACTION_SIGMA, REDACTION_PAD)
    }
}

impl RegionRedactor for CpuRegionRedactor {
    fn redact(&self, frame: &Frame, regions: &[Region]) -> Frame {
        let (w, h) = (frame.width(), frame.height());
        let channels = frame.channels() as usize;

        let canvas = (channels == 3)
            .then(|| RgbImage::from_raw(w, h, frame.data().to_vec()))
            .flatten();
        let Some(mut canvas) = canvas else {
            log::warn!("Cannot outline a {channels}-channel frame; blurring only");
            let mut out = frame.clone();
            for region in regions {
                let r = region.padded(self.pad, w, h);
                if !r.is_empty() {
                    self.blur_region(out.data_mut(), w as usize, channels, &r);
                }
            }
            return out;
        };

        for region in regions {
            let r = region.padded(self.pad, w, h);
            if r.is_empty() {
                log::debug!("Skipping empty region {region:?}");
                continue;
            }
            self.blur_region(&mut canvas, w as usize, channels, &r);
            // Corners are inclusive, so the bottom/right edge may fall one
            // pixel outside the image; drawing clips it.
            let outline = Rect::at(r.x1, r.y1).of_size(r.width() as u32 + 1, r.height() as u32 + 1);
            draw_hollow_rect_mut(&mut canvas, outline, self.outline);
        }

        Frame::from_rgb_image(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(vec![value; (width * height * 3) as usize], width, height, 3)
    }

    /// Vertical stripes so that blurring visibly changes pixels.
    fn striped_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _y in 0..height {
            for x in 0..width {
                let v = if x % 2 == 0 { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, width, height, 3)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * frame.width() + x) * 3) as usize;
        let d = frame.data();
        [d[i], d[i + 1], d[i + 2]]
    }

    #[test]
    fn test_no_regions_returns_identical_copy() {
        let frame = striped_frame(20, 20);
        let out = CpuRegionRedactor::default().redact(&frame, &[]);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_input_frame_untouched() {
        let frame = striped_frame(40, 40);
        let before = frame.clone();
        let _ = CpuRegionRedactor::default().redact(&frame, &[Region::new(10, 10, 20, 20)]);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_pixels_outside_padded_region_unchanged() {
        let frame = striped_frame(60, 60);
        let out = CpuRegionRedactor::default().redact(&frame, &[Region::new(20, 20, 30, 30)]);
        // padded rectangle is [15, 35] inclusive of the outline
        for y in 0..60 {
            for x in 0..60 {
                let inside = (15..=35).contains(&x) && (15..=35).contains(&y);
                if !inside {
                    assert_eq!(pixel(&out, x, y), pixel(&frame, x, y), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_interior_is_blurred() {
        let frame = striped_frame(60, 60);
        let out = CpuRegionRedactor::default().redact(&frame, &[Region::new(20, 20, 40, 40)]);
        let v = pixel(&out, 30, 30)[0];
        assert!(v > 60 && v < 200, "stripe survived: {v}");
        assert_ne!(pixel(&out, 31, 30), pixel(&frame, 31, 30));
    }

    #[test]
    fn test_outline_is_black() {
        let frame = make_frame(50, 50, 200);
        let out = CpuRegionRedactor::default().redact(&frame, &[Region::new(20, 20, 30, 30)]);
        for (x, y) in [(15, 15), (35, 15), (15, 35), (35, 35), (25, 15), (15, 25)] {
            assert_eq!(pixel(&out, x, y), [0, 0, 0], "({x}, {y})");
        }
        // uniform interior stays uniform under blur
        assert_eq!(pixel(&out, 25, 25), [200, 200, 200]);
    }

    #[test]
    fn test_region_outside_image_is_safe() {
        let frame = make_frame(30, 30, 100);
        let regions = [
            Region::new(-50, -50, -10, -10),
            Region::new(100, 100, 200, 200),
            Region::new(-10, -10, 500, 500),
        ];
        let out = CpuRegionRedactor::default().redact(&frame, &regions);
        assert_eq!(out.width(), 30);
        assert_eq!(out.height(), 30);
        // The covering region's outline runs along the top/left edges
        assert_eq!(pixel(&out, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_degenerate_region_is_skipped() {
        let frame = make_frame(30, 30, 100);
        let redactor = CpuRegionRedactor::new(REDACTION_KERNEL_SIZE, REDACTION_SIGMA, 0);
        let out = redactor.redact(&frame, &[Region::new(10, 10, 10, 20)]);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_duplicate_regions_accepted() {
        let frame = striped_frame(60, 60);
        let r = Region::new(20, 20, 40, 40);
        let out = CpuRegionRedactor::default().redact(&frame, &[r, r]);
        assert_eq!(pixel(&out, 15, 15), [0, 0, 0]);
        assert_eq!(pixel(&out, 0, 0), pixel(&frame, 0, 0));
    }

    #[test]
    fn test_separated_regions_are_order_independent() {
        let frame = striped_frame(100, 40);
        let a = Region::new(10, 10, 20, 20);
        let b = Region::new(70, 10, 80, 20);
        let redactor = CpuRegionRedactor::default();
        assert_eq!(redactor.redact(&frame, &[a, b]), redactor.redact(&frame, &[b, a]));
    }
}
