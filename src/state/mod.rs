//! State management module
//!
//! This module holds everything that changes while the editor runs:
//! - The edit session and its current image (session.rs)
//! - Directory-based previous/next navigation (navigation.rs)

pub mod navigation;
pub mod session;

pub use navigation::{Direction, NavigationContext};
pub use session::{EditSession, SessionState};
