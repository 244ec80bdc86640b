/// ROI rectangle within a frame, used to pass region coordinates without many arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// Precompute a normalized 1D Gaussian kernel.
///
/// `kernel_size` must be odd and >= 1.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    debug_assert!(sigma > 0.0);
    let half = (kernel_size / 2) as f64;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|&v| (v / sum) as f32).collect()
}

/// Apply a separable Gaussian blur using a pre-computed kernel, reusing `temp`.
///
/// Samples past the buffer edge replicate the nearest edge pixel, so only
/// pixels inside `data` ever contribute.
pub fn separable_gaussian_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size as isize / 2;

    temp.resize(width * height * channels, 0.0);

    // Horizontal pass: data → temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - half).clamp(0, width as isize - 1) as usize;
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp → data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy =
                        (y as isize + k as isize - half).clamp(0, height as isize - 1) as usize;
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Extract a rectangular ROI from frame data into a reusable buffer.
pub fn extract_roi(data: &[u8], frame_width: usize, channels: usize, rect: RoiRect, roi: &mut Vec<u8>) {
    roi.resize(rect.w * rect.h * channels, 0);
    let row_len = rect.w * channels;
    for row in 0..rect.h {
        let src = ((rect.y + row) * frame_width + rect.x) * channels;
        let dst = row * row_len;
        roi[dst..dst + row_len].copy_from_slice(&data[src..src + row_len]);
    }
}

/// Write a blurred ROI buffer back into frame data.
pub fn write_roi_back(data: &mut [u8], roi: &[u8], frame_width: usize, channels: usize, rect: RoiRect) {
    let row_len = rect.w * channels;
    for row in 0..rect.h {
        let dst = ((rect.y + row) * frame_width + rect.x) * channels;
        let src = row * row_len;
        data[dst..dst + row_len].copy_from_slice(&roi[src..src + row_len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn blur(data: &mut [u8], w: usize, h: usize, kernel_size: usize, sigma: f64) {
        let kernel = gaussian_kernel_1d(kernel_size, sigma);
        separable_gaussian_blur(data, w, h, 3, &kernel, &mut Vec::new());
    }

    #[test]
    fn test_kernel_sums_to_one() {
        let k = gaussian_kernel_1d(99, 30.0);
        assert_eq!(k.len(), 99);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_kernel_is_symmetric_and_peaked() {
        let k = gaussian_kernel_1d(7, 1.5);
        for i in 0..k.len() / 2 {
            assert_relative_eq!(k[i], k[k.len() - 1 - i]);
            assert!(k[3] > k[i]);
        }
    }

    #[test]
    fn test_wide_sigma_flattens_kernel() {
        // sigma 30 over 99 taps: the edge weight is still a sizeable
        // fraction of the centre weight
        let k = gaussian_kernel_1d(99, 30.0);
        assert!(k[0] / k[49] > 0.2);
    }

    #[test]
    fn test_blur_uniform_image_unchanged() {
        let mut data = vec![128u8; 10 * 10 * 3];
        blur(&mut data, 10, 10, 5, 1.0);
        assert!(data.iter().all(|&v| (v as i32 - 128).abs() <= 1));
    }

    #[test]
    fn test_blur_spreads_bright_pixel() {
        let mut data = vec![0u8; 10 * 10 * 3];
        let cx = (5 * 10 + 5) * 3;
        data[cx] = 255;
        blur(&mut data, 10, 10, 5, 1.0);
        assert!(data[cx] < 255);
        assert!(data[(5 * 10 + 6) * 3] > 0);
    }

    #[test]
    fn test_kernel_size_1_is_identity() {
        let mut data: Vec<u8> = (0..75).map(|i| i as u8).collect();
        let original = data.clone();
        blur(&mut data, 5, 5, 1, 1.0);
        assert_eq!(data, original);
    }

    #[test]
    fn test_strong_blur_erases_detail() {
        // Checkerboard stripes vanish under the redaction kernel
        let (w, h) = (40, 20);
        let mut data = vec![0u8; w * h * 3];
        for y in 0..h {
            for x in (0..w).step_by(2) {
                let i = (y * w + x) * 3;
                data[i..i + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        blur(&mut data, w, h, 99, 30.0);
        let (min, max) = data
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        assert!(max - min <= 8, "stripes survived: {min}..{max}");
    }

    #[test]
    fn test_extract_and_write_back_roundtrip() {
        let data: Vec<u8> = (0..4 * 4 * 3).map(|i| i as u8).collect();
        let rect = RoiRect { x: 1, y: 1, w: 2, h: 2 };
        let mut roi = Vec::new();
        extract_roi(&data, 4, 3, rect, &mut roi);
        assert_eq!(roi.len(), 12);
        assert_eq!(roi[0], ((1 * 4 + 1) * 3) as u8);

        let mut target = vec![0u8; 4 * 4 * 3];
        write_roi_back(&mut target, &roi, 4, 3, rect);
        assert_eq!(target[(1 * 4 + 1) * 3], data[(1 * 4 + 1) * 3]);
        assert_eq!(target[(2 * 4 + 2) * 3 + 2], data[(2 * 4 + 2) * 3 + 2]);
        assert_eq!(target[0], 0);
    }
}
