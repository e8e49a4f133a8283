use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{VizError, VizResult};

/// Packed 8-bit RGB pixels, row-major, 3 bytes per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// All-zero (black) frame.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.pixel_count() * Self::CHANNELS],
        }
    }

    pub fn filled(canvas: Canvas, color: Rgb8) -> Self {
        let mut f = Self::new(canvas);
        f.fill(color);
        f
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> VizResult<Self> {
        let expected = (width as usize) * (height as usize) * Self::CHANNELS;
        if data.len() != expected {
            return Err(VizError::validation(format!(
                "frame data length {} does not match {width}x{height}x3",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn stride(&self) -> usize {
        self.width as usize * Self::CHANNELS
    }

    pub fn fill(&mut self, color: Rgb8) {
        let px = color.to_array();
        for dst in self.data.chunks_exact_mut(Self::CHANNELS) {
            dst.copy_from_slice(&px);
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        Some(Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        self.data[i..i + Self::CHANNELS].copy_from_slice(&color.to_array());
    }

    /// `true` when every pixel equals `color`.
    pub fn is_uniform(&self, color: Rgb8) -> bool {
        let px = color.to_array();
        self.data.chunks_exact(Self::CHANNELS).all(|p| p == px)
    }
}
