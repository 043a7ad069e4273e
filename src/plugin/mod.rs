//! Filter plugins
//!
//! - `capability.rs` - the `{name, edit}` interface every filter implements
//! - `abi.rs` - C layout shared with native plugin libraries
//! - `native.rs` - loading and calling plugin libraries
//! - `builtin.rs` - filters compiled into the editor (blur, rotate)
//! - `registry.rs` - discovery and the name -> capability table
//! - `dispatch.rs` - routing a named request to its capability

pub mod abi;
pub mod builtin;
pub mod capability;
pub mod dispatch;
pub mod native;
pub mod registry;

pub use capability::EditorPlugin;
pub use dispatch::FilterDispatcher;
pub use native::NativePlugin;
pub use registry::{DiscoveryReport, PluginDescriptor, PluginRegistry, Registration};
