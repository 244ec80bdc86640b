use ndarray::ArrayView3;

/// A decoded photograph: contiguous RGB bytes in row-major order.
///
/// Each pipeline invocation owns its own `Frame`. Format conversion happens
/// at the I/O boundary only; detectors and redactors work on raw pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn from_rgb_image(image: image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Copies the rectangle `[x, x + w) x [y, y + h)` into a new frame.
    ///
    /// The rectangle is clipped to the frame; a fully clipped rectangle
    /// yields an empty frame.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Frame {
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        let cw = (x1 - x0) as usize;
        let ch = (y1 - y0) as usize;
        let channels = self.channels as usize;
        let stride = self.width as usize * channels;

        let mut out = Vec::with_capacity(cw * ch * channels);
        for row in y0 as usize..y1 as usize {
            let start = row * stride + x0 as usize * channels;
            out.extend_from_slice(&self.data[start..start + cw * channels]);
        }
        Frame::new(out, cw as u32, ch as u32, self.channels)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
