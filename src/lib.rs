//! Core of a small image viewer/editor.
//!
//! The UI shell only forwards user intents to an [`EditSession`]:
//! open a file, apply a named filter, save, or step to the previous/next
//! image in the same directory. Filters come from a name-keyed table holding
//! built-ins and native plugins discovered at startup.

pub mod config;
pub mod error;
pub mod logging;
pub mod pixels;
pub mod plugin;
pub mod state;

pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use pixels::PixelBuffer;
pub use plugin::{FilterDispatcher, PluginRegistry};
pub use state::{EditSession, SessionState};
