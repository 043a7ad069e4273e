//! Decoding files into [`PixelBuffer`]s and encoding them back out.
//!
//! Whatever the source format (indexed, grayscale, RGBA, 16-bit), decoding
//! normalizes to 8-bit RGB so every filter sees the same layout.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
use std::io::{BufRead, Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

use super::PixelBuffer;
use crate::config::DecodeLimits;
use crate::error::{DecodeError, EncodeError};

/// Extensions recognized for saving and for directory listings. Case-sensitive.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "bmp", "jpg"];

/// Map a path's extension to its encoder, if it is a recognized image extension.
///
/// Matches on the text after the last `.` of the file name, so a file named
/// just `.png` counts as a PNG.
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    let (_, extension) = path.file_name()?.to_str()?.rsplit_once('.')?;
    match extension {
        "png" => Some(ImageFormat::Png),
        "bmp" => Some(ImageFormat::Bmp),
        "jpg" => Some(ImageFormat::Jpeg),
        _ => None,
    }
}

/// Whether `path` ends in one of [`IMAGE_EXTENSIONS`].
pub fn has_image_extension(path: &Path) -> bool {
    format_for_path(path).is_some()
}

/// Decode an image file from disk.
pub fn decode_path(path: &Path, limits: &DecodeLimits) -> Result<PixelBuffer, DecodeError> {
    let io_err = |source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;

    let image = decode_reader(reader, limits).map_err(|source| DecodeError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let buffer = normalize(image, limits)?;
    debug!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "decoded image"
    );
    Ok(buffer)
}

/// Decode an in-memory encoded image (e.g. dropped or pasted bytes).
pub fn decode_bytes(bytes: &[u8], limits: &DecodeLimits) -> Result<PixelBuffer, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Bytes(image::ImageError::IoError(e)))?;
    let image = decode_reader(reader, limits).map_err(DecodeError::Bytes)?;
    normalize(image, limits)
}

/// Write `buffer` to `path`, choosing the format from the extension.
///
/// Targets without a recognized extension are rejected before anything is written.
pub fn encode(buffer: &PixelBuffer, path: &Path) -> Result<(), EncodeError> {
    let format = format_for_path(path).ok_or_else(|| EncodeError::UnsupportedExtension {
        path: path.to_path_buf(),
    })?;

    buffer
        .to_rgb_image()
        .save_with_format(path, format)
        .map_err(|source| EncodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), ?format, "encoded image");
    Ok(())
}

fn decode_reader<R>(
    mut reader: ImageReader<R>,
    limits: &DecodeLimits,
) -> image::ImageResult<DynamicImage>
where
    R: Read + Seek + BufRead,
{
    let limits = limits.sanitized();
    let mut reader_limits = Limits::default();
    reader_limits.max_image_width = Some(limits.max_dimension);
    reader_limits.max_image_height = Some(limits.max_dimension);
    reader_limits.max_alloc = Some(limits.max_alloc_bytes);
    reader.limits(reader_limits);
    reader.decode()
}

fn normalize(image: DynamicImage, limits: &DecodeLimits) -> Result<PixelBuffer, DecodeError> {
    let (width, height) = image.dimensions();
    let max_pixels = limits.sanitized().max_pixels;
    if u64::from(width) * u64::from(height) > max_pixels {
        return Err(DecodeError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    Ok(PixelBuffer::from_rgb_image(image.to_rgb8())?)
}
