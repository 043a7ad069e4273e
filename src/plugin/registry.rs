//! The dispatch table: filter name -> capability.
//!
//! Filled once at startup (built-ins first, then native plugins discovered on
//! disk) and treated as read-only afterwards. A plugin that fails to load is
//! logged and left out; it never aborts discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::builtin::{BoxBlur, RotateClockwise};
use super::capability::EditorPlugin;
use super::native::{is_native_library, NativePlugin};
use crate::config::{DuplicatePolicy, EditorConfig};

/// Where a registered filter came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: String,
    /// `None` for filters compiled into the editor.
    pub library_path: Option<PathBuf>,
}

impl PluginDescriptor {
    pub fn is_builtin(&self) -> bool {
        self.library_path.is_none()
    }
}

/// A candidate file that did not make it into the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPlugin {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub loaded: Vec<PluginDescriptor>,
    pub rejected: Vec<RejectedPlugin>,
    /// Names reported by more than one registration.
    pub collisions: Vec<String>,
}

impl DiscoveryReport {
    pub fn summary(&self) -> String {
        format!(
            "{} plugin(s) loaded, {} rejected, {} name collision(s)",
            self.loaded.len(),
            self.rejected.len(),
            self.collisions.len()
        )
    }
}

/// Outcome of registering one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The name was taken and the earlier entry was overwritten.
    Replaced(PluginDescriptor),
    /// The name was taken and the newcomer was dropped.
    Rejected,
}

struct RegisteredFilter {
    descriptor: PluginDescriptor,
    capability: Box<dyn EditorPlugin>,
}

/// All filters available for dispatch, keyed by name.
pub struct PluginRegistry {
    filters: BTreeMap<String, RegisteredFilter>,
    duplicate_policy: DuplicatePolicy,
}

impl PluginRegistry {
    /// An empty table.
    pub fn new(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            filters: BTreeMap::new(),
            duplicate_policy,
        }
    }

    /// A table pre-populated with the built-in filters.
    pub fn with_builtins(config: &EditorConfig) -> Self {
        let mut registry = Self::new(config.duplicate_plugins);
        registry.register(Box::new(BoxBlur::new(config.effective_blur_radius())), None);
        registry.register(Box::new(RotateClockwise), None);
        registry
    }

    /// Built-ins plus everything discovered in the configured plugin directory.
    pub fn load(config: &EditorConfig) -> (Self, DiscoveryReport) {
        let mut registry = Self::with_builtins(config);
        let report = match config.plugin_dir() {
            Some(dir) => registry.discover(&dir),
            None => {
                warn!("could not determine a plugin directory, skipping discovery");
                DiscoveryReport::default()
            }
        };
        (registry, report)
    }

    /// Add a capability under its own name, applying the duplicate policy.
    pub fn register(
        &mut self,
        capability: Box<dyn EditorPlugin>,
        library_path: Option<PathBuf>,
    ) -> Registration {
        let name = capability.name().to_string();
        let descriptor = PluginDescriptor {
            name: name.clone(),
            library_path,
        };

        if let Some(existing) = self.filters.get(&name) {
            let previous = existing.descriptor.clone();
            match self.duplicate_policy {
                DuplicatePolicy::Reject => {
                    warn!(%name, kept = ?previous.library_path, dropped = ?descriptor.library_path,
                        "duplicate filter name, keeping the first registration");
                    return Registration::Rejected;
                }
                DuplicatePolicy::Replace => {
                    warn!(%name, replaced = ?previous.library_path, by = ?descriptor.library_path,
                        "duplicate filter name, later registration wins");
                    self.filters.insert(name, RegisteredFilter { descriptor, capability });
                    return Registration::Replaced(previous);
                }
            }
        }

        self.filters.insert(name, RegisteredFilter { descriptor, capability });
        Registration::Added
    }

    /// Scan `dir` (non-recursively) for native plugins and register each valid one.
    ///
    /// Candidates are visited in byte order of file name, so with
    /// [`DuplicatePolicy::Replace`] the last name in that order wins.
    pub fn discover(&mut self, dir: &Path) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        if !dir.is_dir() {
            info!(dir = %dir.display(), "plugin directory not found, no plugins loaded");
            return report;
        }

        let candidates = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(%err, "skipping unreadable plugin directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_native_library(entry.path()));

        for entry in candidates {
            let path = entry.path();
            match NativePlugin::load(path) {
                Ok(plugin) => self.register_discovered(Box::new(plugin), path, &mut report),
                Err(err) => {
                    warn!(%err, "rejected plugin candidate");
                    report.rejected.push(RejectedPlugin {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(dir = %dir.display(), "{}", report.summary());
        report
    }

    /// Register one plugin found on disk and record the outcome in `report`.
    ///
    /// A plugin that gets overwritten under [`DuplicatePolicy::Replace`] is
    /// removed from `report.loaded`, so the report matches the final table.
    fn register_discovered(
        &mut self,
        capability: Box<dyn EditorPlugin>,
        path: &Path,
        report: &mut DiscoveryReport,
    ) {
        let name = capability.name().to_string();
        match self.register(capability, Some(path.to_path_buf())) {
            Registration::Added => {}
            Registration::Replaced(previous) => {
                report.collisions.push(name.clone());
                report.loaded.retain(|loaded| *loaded != previous);
            }
            Registration::Rejected => {
                report.collisions.push(name.clone());
                report.rejected.push(RejectedPlugin {
                    path: path.to_path_buf(),
                    reason: format!("a filter named \"{name}\" is already registered"),
                });
                return;
            }
        }
        info!(%name, path = %path.display(), "loaded plugin");
        report.loaded.push(PluginDescriptor {
            name,
            library_path: Some(path.to_path_buf()),
        });
    }

    /// Look up a capability by its exact name.
    pub fn get(&self, name: &str) -> Option<&dyn EditorPlugin> {
        self.filters.get(name).map(|f| f.capability.as_ref())
    }

    pub fn descriptor(&self, name: &str) -> Option<&PluginDescriptor> {
        self.filters.get(name).map(|f| &f.descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names in sorted order, for menus.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.filters.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PluginDescriptor> + '_ {
        self.filters.values().map(|f| &f.descriptor)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("filters", &self.names().collect::<Vec<_>>())
            .field("duplicate_policy", &self.duplicate_policy)
            .finish()
    }
}
