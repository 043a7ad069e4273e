//! The editing session: one current image plus the operations on it.
//!
//! The session owns the only decoded buffer. Every operation either succeeds
//! and replaces that buffer with a new value, or fails and leaves the session
//! exactly as it was.

use std::path::{Path, PathBuf};
use tracing::info;

use super::navigation::{self, Direction};
use crate::config::DecodeLimits;
use crate::error::{EditorError, EncodeError, Result};
use crate::pixels::{self, ImageInfo, PixelBuffer};
use crate::plugin::FilterDispatcher;

/// Whether an image is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
}

/// The current image and its source path.
struct Current {
    buffer: PixelBuffer,
    path: PathBuf,
}

/// Orchestrates decoding, filtering, saving and navigation.
pub struct EditSession {
    dispatcher: FilterDispatcher,
    limits: DecodeLimits,
    current: Option<Current>,
}

impl EditSession {
    pub fn new(dispatcher: FilterDispatcher, limits: DecodeLimits) -> Self {
        Self {
            dispatcher,
            limits,
            current: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Empty
        }
    }

    pub fn current(&self) -> Option<&PixelBuffer> {
        self.current.as_ref().map(|c| &c.buffer)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.path.as_path())
    }

    /// Status-line info for the loaded image.
    pub fn info(&self) -> Option<ImageInfo> {
        self.current
            .as_ref()
            .map(|c| ImageInfo::collect(&c.path, &c.buffer))
    }

    /// Names the shell can offer in its filter menu.
    pub fn filter_names(&self) -> Vec<String> {
        self.dispatcher.filter_names()
    }

    pub fn dispatcher(&self) -> &FilterDispatcher {
        &self.dispatcher
    }

    /// Decode `path` and make it the current image.
    pub fn open(&mut self, path: &Path) -> Result<&PixelBuffer> {
        let buffer = pixels::decode_path(path, &self.limits)?;
        info!(
            path = %path.display(),
            width = buffer.width(),
            height = buffer.height(),
            "opened image"
        );
        let current = self.current.insert(Current {
            buffer,
            path: path.to_path_buf(),
        });
        Ok(&current.buffer)
    }

    /// Run the filter called `name` on the current image.
    pub fn apply_filter(&mut self, name: &str) -> Result<&PixelBuffer> {
        let current = self.current.as_mut().ok_or(EditorError::Precondition {
            operation: "apply filter",
        })?;
        let output = self.dispatcher.apply(name, &current.buffer)?;
        info!(
            filter = name,
            width = output.width(),
            height = output.height(),
            "applied filter"
        );
        current.buffer = output;
        Ok(&current.buffer)
    }

    /// Encode the current image to `path`.
    ///
    /// The target must end in `.png`, `.bmp` or `.jpg`; the session's current
    /// path does not change.
    pub fn save(&self, path: &Path) -> Result<()> {
        let current = self.loaded("save")?;
        if !pixels::has_image_extension(path) {
            return Err(EncodeError::UnsupportedExtension {
                path: path.to_path_buf(),
            }
            .into());
        }
        pixels::encode(&current.buffer, path)?;
        info!(path = %path.display(), "saved image");
        Ok(())
    }

    /// Open the image before the current one in its directory.
    pub fn go_previous(&mut self) -> Result<&PixelBuffer> {
        self.go(Direction::Previous)
    }

    /// Open the image after the current one in its directory.
    pub fn go_next(&mut self) -> Result<&PixelBuffer> {
        self.go(Direction::Next)
    }

    /// Drop the current image.
    pub fn clear(&mut self) {
        self.current = None;
    }

    fn go(&mut self, direction: Direction) -> Result<&PixelBuffer> {
        let operation = match direction {
            Direction::Previous => "previous image",
            Direction::Next => "next image",
        };
        let current = self.loaded(operation)?;
        let target = navigation::NavigationContext::resolve(&current.path)?.step(direction)?;
        self.open(&target)
    }

    fn loaded(&self, operation: &'static str) -> Result<&Current> {
        self.current
            .as_ref()
            .ok_or(EditorError::Precondition { operation })
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state())
            .field("current_path", &self.current_path())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
