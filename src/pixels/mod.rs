//! Pixel data and format conversion
//!
//! - `buffer.rs` - the owned RGB raster every other component exchanges
//! - `codec.rs` - decode from files/bytes, encode by extension
//! - `info.rs` - status-line summary of a loaded image

pub mod buffer;
pub mod codec;
pub mod info;

pub use buffer::{ChannelOrder, LayoutError, PixelBuffer, BYTES_PER_PIXEL};
pub use codec::{decode_bytes, decode_path, encode, has_image_extension, IMAGE_EXTENSIONS};
pub use info::ImageInfo;
