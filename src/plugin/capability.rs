//! The capability every filter exposes, native or built-in.

use crate::error::EditFailure;
use crate::pixels::PixelBuffer;

/// A named image transform.
///
/// `edit` never mutates its input: it returns a fresh buffer, which may have a
/// different size than the input (with its stride recomputed to match).
pub trait EditorPlugin {
    /// Unique, user-visible name used as the dispatch key.
    fn name(&self) -> &str;

    /// Run the transform on `input`.
    fn edit(&self, input: &PixelBuffer) -> Result<PixelBuffer, EditFailure>;
}

impl std::fmt::Debug for dyn EditorPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorPlugin")
            .field("name", &self.name())
            .finish()
    }
}
