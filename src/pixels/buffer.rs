//! Owned RGB raster with an explicit row stride.
//!
//! `PixelBuffer` is the exchange format between the decoder, every filter
//! (built-in or native plugin) and the encoder. Rows may carry trailing
//! padding; `stride_bytes` says how many bytes separate the start of two rows.

use image::RgbImage;
use thiserror::Error;

/// Bytes per pixel for the only supported channel order.
pub const BYTES_PER_PIXEL: usize = 3;

/// Channel order of the pixel bytes.
///
/// Only RGB is accepted at any boundary; the numeric value is what crosses
/// the plugin ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ChannelOrder {
    #[default]
    Rgb = 0,
}

impl ChannelOrder {
    /// Parse the ABI representation, rejecting anything that is not RGB.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ChannelOrder::Rgb),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// A buffer whose geometry does not match its byte length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("width and height must be non-zero (got {width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("stride of {stride} bytes is smaller than {min} bytes needed for width {width}")]
    StrideTooSmall { width: u32, stride: usize, min: usize },

    #[error("expected {expected} bytes for the layout, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{width}x{height} buffer size overflows")]
    Overflow { width: u32, height: u32 },
}

/// An owned, contiguous 8-bit RGB raster.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride_bytes: usize,
    channel_order: ChannelOrder,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a black, tightly packed buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, LayoutError> {
        let stride = min_stride(width, height)?;
        let len = checked_len(stride, width, height)?;
        Self::from_raw_parts(width, height, stride, vec![0; len])
    }

    /// Build a buffer from existing bytes, validating every layout invariant.
    pub fn from_raw_parts(
        width: u32,
        height: u32,
        stride_bytes: usize,
        data: Vec<u8>,
    ) -> Result<Self, LayoutError> {
        let min = min_stride(width, height)?;
        if stride_bytes < min {
            return Err(LayoutError::StrideTooSmall {
                width,
                stride: stride_bytes,
                min,
            });
        }
        let expected = checked_len(stride_bytes, width, height)?;
        if data.len() != expected {
            return Err(LayoutError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride_bytes,
            channel_order: ChannelOrder::Rgb,
            data,
        })
    }

    /// Wrap a decoded image. Rows are tightly packed, so the stride is `width * 3`.
    pub fn from_rgb_image(image: RgbImage) -> Result<Self, LayoutError> {
        let (width, height) = image.dimensions();
        let stride = min_stride(width, height)?;
        Self::from_raw_parts(width, height, stride, image.into_raw())
    }

    /// Copy the visible pixels into an `RgbImage`, dropping any row padding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut packed = Vec::with_capacity(self.row_len() * self.height as usize);
        for row in self.rows() {
            packed.extend_from_slice(row);
        }
        // Length is width * height * 3 by construction.
        RgbImage::from_raw(self.width, self.height, packed)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride_bytes(&self) -> usize {
        self.stride_bytes
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    /// All bytes, padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of meaningful bytes in one row (`width * 3`).
    pub fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// The visible bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride_bytes;
        &self.data[start..start + self.row_len()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride_bytes;
        let len = self.row_len();
        &mut self.data[start..start + len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Row `y` viewed as RGB triples.
    pub fn row_pixels(&self, y: u32) -> &[[u8; 3]] {
        bytemuck::cast_slice(self.row(y))
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.row_pixels(y)[x as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let pixels: &mut [[u8; 3]] = bytemuck::cast_slice_mut(self.row_mut(y));
        pixels[x as usize] = rgb;
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride_bytes", &self.stride_bytes)
            .field("channel_order", &self.channel_order)
            .field("len", &self.data.len())
            .finish()
    }
}

fn min_stride(width: u32, height: u32) -> Result<usize, LayoutError> {
    if width == 0 || height == 0 {
        return Err(LayoutError::Empty { width, height });
    }
    (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .ok_or(LayoutError::Overflow { width, height })
}

fn checked_len(stride: usize, width: u32, height: u32) -> Result<usize, LayoutError> {
    stride
        .checked_mul(height as usize)
        .ok_or(LayoutError::Overflow { width, height })
}
