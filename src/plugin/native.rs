//! Native plugins loaded from dynamic libraries.
//!
//! All `unsafe` interop with plugin libraries lives here: resolving the entry
//! point, validating the capability table, and marshalling buffers across the
//! C ABI described in `abi.rs`.

use libloading::{Library, Symbol};
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::abi::{
    BufferLayout, EntryPoint, PluginInput, PluginOutput, PluginVTable, ABI_VERSION, EDIT_OK,
    ENTRY_POINT,
};
use super::capability::EditorPlugin;
use crate::error::{EditFailure, PluginLoadError};
use crate::pixels::PixelBuffer;

/// Whether `path` carries the platform's dynamic library extension.
pub fn is_native_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == std::env::consts::DLL_EXTENSION)
}

/// A filter backed by a loaded dynamic library.
pub struct NativePlugin {
    name: String,
    vtable: PluginVTable,
    library_path: PathBuf,
    // Keeps the code behind `vtable` mapped; declared last so it drops last.
    _library: Option<Library>,
}

impl NativePlugin {
    /// Load `path` and validate the capability it exports.
    pub fn load(path: &Path) -> Result<Self, PluginLoadError> {
        // Running a library's initializers is inherently trusted; plugins are
        // only read from the configured plugin directory.
        let library = unsafe { Library::new(path) }.map_err(|source| PluginLoadError::Library {
            path: path.to_path_buf(),
            source,
        })?;

        let vtable_ptr = {
            let entry: Symbol<EntryPoint> = unsafe { library.get(ENTRY_POINT) }.map_err(|source| {
                PluginLoadError::MissingEntryPoint {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            unsafe { entry() }
        };

        unsafe { Self::from_vtable(vtable_ptr, path, Some(library)) }
    }

    /// Validate a capability table and take a copy of it.
    ///
    /// # Safety
    ///
    /// `vtable` must be null or point to a valid `PluginVTable` whose function
    /// pointers stay callable for as long as `library` (or the process, when
    /// `library` is `None`) is alive.
    pub unsafe fn from_vtable(
        vtable: *const PluginVTable,
        path: &Path,
        library: Option<Library>,
    ) -> Result<Self, PluginLoadError> {
        let Some(vtable) = vtable.as_ref().copied() else {
            return Err(PluginLoadError::NullCapability {
                path: path.to_path_buf(),
            });
        };

        if vtable.abi_version != ABI_VERSION {
            return Err(PluginLoadError::AbiMismatch {
                path: path.to_path_buf(),
                expected: ABI_VERSION,
                found: vtable.abi_version,
            });
        }

        let name_ptr = (vtable.name)();
        if name_ptr.is_null() {
            return Err(PluginLoadError::InvalidName {
                path: path.to_path_buf(),
            });
        }
        let name = match CStr::from_ptr(name_ptr).to_str() {
            Ok(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                return Err(PluginLoadError::InvalidName {
                    path: path.to_path_buf(),
                })
            }
        };

        debug!(%name, path = %path.display(), "validated plugin capability");
        Ok(Self {
            name,
            vtable,
            library_path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }
}

impl EditorPlugin for NativePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn edit(&self, input: &PixelBuffer) -> Result<PixelBuffer, EditFailure> {
        let layout = BufferLayout::of(input)
            .ok_or_else(|| EditFailure::Message("buffer stride exceeds the plugin ABI".into()))?;
        let request = PluginInput {
            layout,
            data: input.as_bytes().as_ptr(),
            len: input.as_bytes().len(),
        };
        let mut output = PluginOutput::empty();

        let code = unsafe { (self.vtable.edit)(&request, &mut output) };
        let result = if code == EDIT_OK {
            unsafe { output.to_pixel_buffer() }
        } else {
            Err(EditFailure::Rejected(code))
        };

        if !output.data.is_null() {
            unsafe { (self.vtable.release)(&mut output) };
        }
        result
    }
}

impl std::fmt::Debug for NativePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativePlugin")
            .field("name", &self.name)
            .field("library_path", &self.library_path)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::ffi::c_char;

    // An in-process "plugin" that inverts every pixel, written against the raw ABI.

    unsafe extern "C" fn invert_name() -> *const c_char {
        b"Invert\0".as_ptr().cast()
    }

    unsafe extern "C" fn invert_edit(input: *const PluginInput, output: *mut PluginOutput) -> i32 {
        let input = &*input;
        let bytes = std::slice::from_raw_parts(input.data, input.len);
        let out: Box<[u8]> = bytes.iter().map(|b| 255 - b).collect();
        let output = &mut *output;
        output.layout = input.layout;
        output.len = out.len();
        output.data = Box::into_raw(out).cast::<u8>();
        EDIT_OK
    }

    unsafe extern "C" fn boxed_release(output: *mut PluginOutput) {
        let output = &mut *output;
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            output.data,
            output.len,
        )));
        output.data = std::ptr::null_mut();
    }

    unsafe extern "C" fn failing_edit(_: *const PluginInput, _: *mut PluginOutput) -> i32 {
        7
    }

    // Halves the geometry but returns the input's byte count and stride.
    unsafe extern "C" fn stale_stride_edit(
        input: *const PluginInput,
        output: *mut PluginOutput,
    ) -> i32 {
        let input = &*input;
        let out = vec![0u8; input.len].into_boxed_slice();
        let output = &mut *output;
        output.layout = BufferLayout {
            width: input.layout.width / 2,
            height: input.layout.height / 2,
            ..input.layout
        };
        output.len = out.len();
        output.data = Box::into_raw(out).cast::<u8>();
        EDIT_OK
    }

    unsafe extern "C" fn null_name() -> *const c_char {
        std::ptr::null()
    }

    pub(crate) static INVERT_VTABLE: PluginVTable = PluginVTable {
        abi_version: ABI_VERSION,
        name: invert_name,
        edit: invert_edit,
        release: boxed_release,
    };

    pub(crate) fn invert_plugin() -> NativePlugin {
        unsafe { NativePlugin::from_vtable(&INVERT_VTABLE, Path::new("invert.so"), None) }.unwrap()
    }

    #[test]
    fn test_invert_through_abi() {
        let plugin = invert_plugin();
        assert_eq!(plugin.name(), "Invert");

        let mut input = PixelBuffer::from_raw_parts(2, 1, 8, vec![0; 8]).unwrap();
        input.set_pixel(1, 0, [10, 20, 30]);

        let output = plugin.edit(&input).unwrap();
        assert_eq!(output.stride_bytes(), 8);
        assert_eq!(output.pixel(0, 0), [255, 255, 255]);
        assert_eq!(output.pixel(1, 0), [245, 235, 225]);
        // Input is untouched.
        assert_eq!(input.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_plugin_failure_code() {
        let vtable = PluginVTable {
            edit: failing_edit,
            ..INVERT_VTABLE
        };
        let plugin = unsafe { NativePlugin::from_vtable(&vtable, Path::new("f.so"), None) }.unwrap();
        let input = PixelBuffer::new(2, 2).unwrap();
        assert!(matches!(plugin.edit(&input), Err(EditFailure::Rejected(7))));
    }

    #[test]
    fn test_stale_stride_is_rejected() {
        let vtable = PluginVTable {
            edit: stale_stride_edit,
            ..INVERT_VTABLE
        };
        let plugin = unsafe { NativePlugin::from_vtable(&vtable, Path::new("s.so"), None) }.unwrap();
        let input = PixelBuffer::new(4, 4).unwrap();
        assert!(matches!(plugin.edit(&input), Err(EditFailure::Layout(_))));
    }

    #[test]
    fn test_abi_mismatch_rejected() {
        let vtable = PluginVTable {
            abi_version: ABI_VERSION + 1,
            ..INVERT_VTABLE
        };
        let err = unsafe { NativePlugin::from_vtable(&vtable, Path::new("v.so"), None) }.unwrap_err();
        assert!(matches!(err, PluginLoadError::AbiMismatch { found, .. } if found == ABI_VERSION + 1));
    }

    #[test]
    fn test_null_capability_and_name_rejected() {
        let err = unsafe { NativePlugin::from_vtable(std::ptr::null(), Path::new("n.so"), None) }
            .unwrap_err();
        assert!(matches!(err, PluginLoadError::NullCapability { .. }));

        let vtable = PluginVTable {
            name: null_name,
            ..INVERT_VTABLE
        };
        let err = unsafe { NativePlugin::from_vtable(&vtable, Path::new("n.so"), None) }.unwrap_err();
        assert!(matches!(err, PluginLoadError::InvalidName { .. }));
    }

    #[test]
    fn test_load_garbage_library_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("broken.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&path, b"not a shared object").unwrap();

        let err = NativePlugin::load(&path).unwrap_err();
        assert!(matches!(err, PluginLoadError::Library { .. }));
    }

    #[test]
    fn test_native_extension_detection() {
        let ext = std::env::consts::DLL_EXTENSION;
        assert!(is_native_library(Path::new(&format!("libblur.{ext}"))));
        assert!(!is_native_library(Path::new("readme.txt")));
        assert!(!is_native_library(Path::new("noext")));
    }
}
