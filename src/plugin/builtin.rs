//! Filters that ship with the editor.
//!
//! They implement the same [`EditorPlugin`] capability as native plugins and
//! are registered in the same table, so the dispatcher cannot tell them apart.

use super::capability::EditorPlugin;
use crate::error::EditFailure;
use crate::pixels::{PixelBuffer, BYTES_PER_PIXEL};

pub const BLUR_NAME: &str = "Blur";
pub const ROTATE_CW_NAME: &str = "Rotate Clockwise";

/// Separable box blur. Output keeps the input's geometry and stride.
#[derive(Debug, Clone, Copy)]
pub struct BoxBlur {
    radius: u32,
}

impl BoxBlur {
    pub fn new(radius: u32) -> Self {
        Self {
            radius: radius.max(1),
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }
}

impl EditorPlugin for BoxBlur {
    fn name(&self) -> &str {
        BLUR_NAME
    }

    fn edit(&self, input: &PixelBuffer) -> Result<PixelBuffer, EditFailure> {
        Ok(box_blur(input, self.radius as usize))
    }
}

/// Rotates 90 degrees clockwise, swapping width and height.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotateClockwise;

impl EditorPlugin for RotateClockwise {
    fn name(&self) -> &str {
        ROTATE_CW_NAME
    }

    fn edit(&self, input: &PixelBuffer) -> Result<PixelBuffer, EditFailure> {
        let (width, height) = (input.width(), input.height());
        // New geometry gets a freshly computed (tight) stride.
        let mut out = PixelBuffer::new(height, width)?;
        for y in 0..height {
            for (x, rgb) in input.row_pixels(y).iter().enumerate() {
                out.set_pixel(height - 1 - y, x as u32, *rgb);
            }
        }
        Ok(out)
    }
}

fn box_blur(image: &PixelBuffer, radius: usize) -> PixelBuffer {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let mut horiz = vec![[0u8; 3]; width * height];

    for y in 0..height {
        let row = image.row_pixels(y as u32);
        let line = &mut horiz[y * width..(y + 1) * width];
        blur_line(width, radius, |x| row[x], |x, rgb| line[x] = rgb);
    }

    // Cloning keeps the stride and any padding bytes as they were.
    let mut out = image.clone();
    for x in 0..width {
        blur_line(
            height,
            radius,
            |y| horiz[y * width + x],
            |y, rgb| out.set_pixel(x as u32, y as u32, rgb),
        );
    }

    debug_assert_eq!(out.stride_bytes(), image.stride_bytes());
    debug_assert!(out.stride_bytes() >= width * BYTES_PER_PIXEL);
    out
}

/// One-dimensional box blur of `len` samples with a running window sum.
///
/// Output `i` is the rounded mean of samples `[i - radius, i + radius]`,
/// clamped to the line. Sums are `u64`, so no line length can overflow them.
fn blur_line(
    len: usize,
    radius: usize,
    sample: impl Fn(usize) -> [u8; 3],
    mut emit: impl FnMut(usize, [u8; 3]),
) {
    let mut sum = [0u64; 3];
    // Samples in `lo..hi` are currently summed.
    let (mut lo, mut hi) = (0, 0);

    for i in 0..len {
        let window_end = (i + radius).min(len - 1) + 1;
        while hi < window_end {
            let [r, g, b] = sample(hi);
            sum[0] += r as u64;
            sum[1] += g as u64;
            sum[2] += b as u64;
            hi += 1;
        }
        let window_start = i.saturating_sub(radius);
        while lo < window_start {
            let [r, g, b] = sample(lo);
            sum[0] -= r as u64;
            sum[1] -= g as u64;
            sum[2] -= b as u64;
            lo += 1;
        }
        emit(i, window_mean(sum, (hi - lo) as u64));
    }
}

fn window_mean(sum: [u64; 3], count: u64) -> [u8; 3] {
    [
        ((sum[0] + count / 2) / count) as u8,
        ((sum[1] + count / 2) / count) as u8,
        ((sum[2] + count / 2) / count) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_keeps_geometry_and_stride() {
        let input = PixelBuffer::from_raw_parts(10, 10, 32, vec![0; 320]).unwrap();
        let output = BoxBlur::new(2).edit(&input).unwrap();
        assert_eq!((output.width(), output.height()), (10, 10));
        assert_eq!(output.stride_bytes(), 32);
    }

    #[test]
    fn test_blur_uniform_image_is_unchanged() {
        let mut input = PixelBuffer::new(6, 4).unwrap();
        for y in 0..4 {
            for x in 0..6 {
                input.set_pixel(x, y, [90, 120, 30]);
            }
        }
        assert_eq!(BoxBlur::new(3).edit(&input).unwrap(), input);
    }

    #[test]
    fn test_blur_spreads_a_bright_pixel() {
        let mut input = PixelBuffer::new(5, 5).unwrap();
        input.set_pixel(2, 2, [255, 255, 255]);

        let output = BoxBlur::new(1).edit(&input).unwrap();
        // 3x3 window around the center: 255 / 9 rounds to 28
        assert_eq!(output.pixel(2, 2), [28, 28, 28]);
        assert_eq!(output.pixel(1, 1), [28, 28, 28]);
        assert_eq!(output.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_blur_does_not_touch_padding() {
        let input = PixelBuffer::from_raw_parts(1, 2, 4, vec![10, 10, 10, 0xAB, 30, 30, 30, 0xCD])
            .unwrap();
        let output = BoxBlur::new(1).edit(&input).unwrap();
        assert_eq!(output.as_bytes(), &[20, 20, 20, 0xAB, 20, 20, 20, 0xCD]);
    }

    #[test]
    fn test_blur_very_wide_row() {
        // 255 * width no longer fits in a u32.
        let width = u32::MAX / 255 + 1;
        let len = width as usize * BYTES_PER_PIXEL;
        let input = PixelBuffer::from_raw_parts(width, 1, len, vec![255; len]).unwrap();

        let output = BoxBlur::new(2).edit(&input).unwrap();
        assert_eq!(output.width(), width);
        assert!(output.as_bytes().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_rotate_reshapes_and_recomputes_stride() {
        // 3x2 with 16 byte stride (7 bytes of padding per row)
        let mut input = PixelBuffer::from_raw_parts(3, 2, 16, vec![0; 32]).unwrap();
        input.set_pixel(0, 0, [1, 1, 1]);
        input.set_pixel(2, 0, [2, 2, 2]);
        input.set_pixel(0, 1, [3, 3, 3]);

        let output = RotateClockwise.edit(&input).unwrap();
        assert_eq!((output.width(), output.height()), (2, 3));
        assert_eq!(output.stride_bytes(), 6);
        // Top-left moves to top-right, bottom-left to top-left.
        assert_eq!(output.pixel(1, 0), [1, 1, 1]);
        assert_eq!(output.pixel(1, 2), [2, 2, 2]);
        assert_eq!(output.pixel(0, 0), [3, 3, 3]);
    }

    #[test]
    fn test_four_rotations_restore_image() {
        let mut input = PixelBuffer::new(4, 3).unwrap();
        input.set_pixel(3, 1, [9, 8, 7]);
        let mut image = input.clone();
        for _ in 0..4 {
            image = RotateClockwise.edit(&image).unwrap();
        }
        assert_eq!(image, input);
    }
}
