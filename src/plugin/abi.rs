//! C ABI shared between the host and native filter plugins.
//!
//! A plugin library exports one symbol, [`ENTRY_POINT`], returning a pointer
//! to a static [`PluginVTable`]. Buffers cross the boundary as a
//! [`BufferLayout`] plus a raw byte pointer; the layout must match the host's
//! [`PixelBuffer`] exactly (RGB, 8 bits per channel, explicit row stride).
//!
//! Ownership:
//! - `PluginInput` borrows host memory for the duration of `edit` only.
//! - `PluginOutput` points at plugin-owned memory; the host copies it and then
//!   hands it back through `release`.

use bytemuck::{Pod, Zeroable};
use std::ffi::c_char;

use crate::error::EditFailure;
use crate::pixels::{ChannelOrder, PixelBuffer};

/// Symbol name of the plugin entry point (NUL-terminated for `dlsym`).
pub const ENTRY_POINT: &[u8] = b"image_editor_plugin_entry\0";

/// Version of the table layout below. Bumped on any breaking change.
pub const ABI_VERSION: u32 = 1;

/// `edit` return value meaning success.
pub const EDIT_OK: i32 = 0;

/// Geometry of a buffer crossing the plugin boundary
/// Must match the plugin's struct layout field for field
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct BufferLayout {
    pub width: u32,
    pub height: u32,
    pub stride_bytes: u32,
    /// 0 = RGB; nothing else is accepted
    pub channel_order: u32,
}

impl BufferLayout {
    /// Describe `buffer`. Returns `None` if its stride does not fit the ABI's `u32`.
    pub fn of(buffer: &PixelBuffer) -> Option<Self> {
        Some(Self {
            width: buffer.width(),
            height: buffer.height(),
            stride_bytes: u32::try_from(buffer.stride_bytes()).ok()?,
            channel_order: buffer.channel_order().as_raw(),
        })
    }
}

/// Read-only view of the host's current buffer.
#[repr(C)]
#[derive(Debug)]
pub struct PluginInput {
    pub layout: BufferLayout,
    pub data: *const u8,
    pub len: usize,
}

/// Buffer produced by the plugin, filled in by `edit`.
#[repr(C)]
#[derive(Debug)]
pub struct PluginOutput {
    pub layout: BufferLayout,
    pub data: *mut u8,
    pub len: usize,
}

impl PluginOutput {
    pub fn empty() -> Self {
        Self {
            layout: BufferLayout::zeroed(),
            data: std::ptr::null_mut(),
            len: 0,
        }
    }

    /// Copy the plugin's bytes into a validated host buffer.
    ///
    /// # Safety
    ///
    /// If `data` is non-null it must point to at least `len` readable bytes.
    pub unsafe fn to_pixel_buffer(&self) -> Result<PixelBuffer, EditFailure> {
        if self.data.is_null() {
            return Err(EditFailure::NullOutput);
        }
        if ChannelOrder::from_raw(self.layout.channel_order).is_none() {
            return Err(EditFailure::ChannelOrder(self.layout.channel_order));
        }

        let bytes = std::slice::from_raw_parts(self.data as *const u8, self.len).to_vec();
        Ok(PixelBuffer::from_raw_parts(
            self.layout.width,
            self.layout.height,
            self.layout.stride_bytes as usize,
            bytes,
        )?)
    }
}

/// Capability table exported by a plugin.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PluginVTable {
    pub abi_version: u32,
    /// Returns a NUL-terminated UTF-8 name with static lifetime.
    pub name: unsafe extern "C" fn() -> *const c_char,
    /// Fills `output`; returns [`EDIT_OK`] on success.
    pub edit: unsafe extern "C" fn(input: *const PluginInput, output: *mut PluginOutput) -> i32,
    /// Frees memory previously handed out through `output`.
    pub release: unsafe extern "C" fn(output: *mut PluginOutput),
}

/// Signature of [`ENTRY_POINT`].
pub type EntryPoint = unsafe extern "C" fn() -> *const PluginVTable;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_plain_old_data() {
        assert_eq!(std::mem::size_of::<BufferLayout>(), 16);
        let layout = BufferLayout {
            width: 2,
            height: 3,
            stride_bytes: 8,
            channel_order: 0,
        };
        let bytes = bytemuck::bytes_of(&layout);
        assert_eq!(bytemuck::pod_read_unaligned::<BufferLayout>(bytes), layout);
    }

    #[test]
    fn test_layout_of_buffer() {
        let buffer = PixelBuffer::from_raw_parts(2, 3, 8, vec![0; 24]).unwrap();
        let layout = BufferLayout::of(&buffer).unwrap();
        assert_eq!(layout.stride_bytes, 8);
        assert_eq!(layout.channel_order, 0);
    }

    #[test]
    fn test_output_validation() {
        let mut bytes = vec![0u8; 12];
        let mut output = PluginOutput::empty();
        assert!(matches!(
            unsafe { output.to_pixel_buffer() },
            Err(EditFailure::NullOutput)
        ));

        output.data = bytes.as_mut_ptr();
        output.len = bytes.len();
        output.layout = BufferLayout {
            width: 2,
            height: 2,
            stride_bytes: 6,
            channel_order: 1,
        };
        assert!(matches!(
            unsafe { output.to_pixel_buffer() },
            Err(EditFailure::ChannelOrder(1))
        ));

        output.layout.channel_order = 0;
        output.layout.stride_bytes = 5;
        assert!(matches!(
            unsafe { output.to_pixel_buffer() },
            Err(EditFailure::Layout(_))
        ));

        output.layout.stride_bytes = 6;
        let buffer = unsafe { output.to_pixel_buffer() }.unwrap();
        assert_eq!((buffer.width(), buffer.height()), (2, 2));
    }
}
