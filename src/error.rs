//! Error types for the editor core.
//!
//! Each failure domain gets its own `thiserror` enum so callers can match on the
//! exact reason; [`EditorError`] aggregates them for the session-level API.
//! Every variant renders a distinct message the shell can show as-is.

use std::path::PathBuf;
use thiserror::Error;

use crate::pixels::LayoutError;
use crate::state::navigation::Direction;

/// An image file could not be read or decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode image data: {0}")]
    Bytes(#[source] image::ImageError),

    /// Decoded geometry exceeds the configured limits.
    #[error("Image too large: {width}x{height} exceeds the {max_pixels} pixel limit")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("Decoded image has an invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

/// The current image could not be written.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Cannot save {}: extension must be one of .png, .bmp, .jpg", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A plugin candidate was rejected during discovery.
///
/// These never escape the registry: they are logged and summarized in the
/// discovery report, and the scan moves on to the next candidate.
#[derive(Debug, Error)]
pub enum PluginLoadError {
    #[error("Failed to load library {}: {source}", path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("{} does not export the plugin entry point: {source}", path.display())]
    MissingEntryPoint {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("{} returned no capability table", path.display())]
    NullCapability { path: PathBuf },

    #[error("{} targets plugin ABI v{found}, host requires v{expected}", path.display())]
    AbiMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("{} reported a missing or non UTF-8 name", path.display())]
    InvalidName { path: PathBuf },
}

/// Why a capability's `edit` did not produce a usable buffer.
#[derive(Debug, Error)]
pub enum EditFailure {
    #[error("plugin reported failure code {0}")]
    Rejected(i32),

    #[error("{0}")]
    Message(String),

    #[error("plugin returned a buffer with no data")]
    NullOutput,

    #[error("plugin returned unsupported channel order {0}")]
    ChannelOrder(u32),

    #[error("plugin returned an invalid buffer: {0}")]
    Layout(#[from] LayoutError),
}

/// Dispatching a named filter failed.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("No plugin found for filter \"{0}\"")]
    NotFound(String),

    #[error("Filter \"{name}\" failed: {source}")]
    Failed {
        name: String,
        #[source]
        source: EditFailure,
    },
}

/// A previous/next request could not be resolved to a sibling image.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("{}", boundary_message(.0))]
    Boundary(Direction),

    #[error("{} is no longer in its directory listing", path.display())]
    NotFound { path: PathBuf },

    #[error("{} has no parent directory", path.display())]
    NoParent { path: PathBuf },

    #[error("Failed to list {}: {source}", dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

fn boundary_message(direction: &Direction) -> &'static str {
    match direction {
        Direction::Previous => "Already at the first image",
        Direction::Next => "Already at the last image",
    }
}

/// Any failure surfaced by an [`EditSession`](crate::state::session::EditSession) operation.
///
/// All variants are recoverable: the session state is left untouched when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No image is loaded; open an image before using \"{operation}\"")]
    Precondition { operation: &'static str },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, EditorError>;
