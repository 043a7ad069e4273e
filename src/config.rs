//! Editor configuration
//!
//! Settings are stored as JSON in the user's config directory:
//! - Linux: ~/.config/image-editor/config.json
//! - macOS: ~/Library/Application Support/image-editor/config.json
//! - Windows: %APPDATA%\image-editor\config.json
//!
//! A missing file means defaults; a malformed one is reported and ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_DIR_NAME: &str = "image-editor";
const CONFIG_FILE_NAME: &str = "config.json";

/// Subdirectory next to the executable that is scanned for plugins.
pub const PLUGIN_DIR_NAME: &str = "plugins";

/// What to do when a discovered plugin reports a name that is already registered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one.
    #[default]
    Replace,
    /// The earlier registration is kept and the newcomer is dropped.
    Reject,
}

/// Guards applied while decoding untrusted image files
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DecodeLimits {
    /// Largest accepted width or height
    pub max_dimension: u32,
    /// Largest accepted width * height
    pub max_pixels: u64,
    /// Largest allocation the decoder may make
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_dimension: 16_384,
            max_pixels: 100_000_000,          // ~100 MP
            max_alloc_bytes: 1024 * 1024 * 1024, // 1 GiB
        }
    }
}

impl DecodeLimits {
    /// Clamp to workable bounds so a bad config cannot disable decoding entirely.
    pub fn sanitized(&self) -> Self {
        Self {
            max_dimension: self.max_dimension.clamp(64, 100_000),
            max_pixels: self.max_pixels.clamp(4_096, 5_000_000_000),
            max_alloc_bytes: self
                .max_alloc_bytes
                .clamp(8 * 1024 * 1024, 16 * 1024 * 1024 * 1024),
        }
    }
}

/// All user-tunable settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Overrides the default `<exe dir>/plugins` discovery location
    pub plugin_dir: Option<PathBuf>,

    /// Radius of the built-in box blur (1 to 24)
    pub blur_radius: u32,

    /// Collision handling for plugins that share a name
    pub duplicate_plugins: DuplicatePolicy,

    /// Default tracing filter, e.g. "info" or "image_editor=debug"
    pub log_level: String,

    pub limits: DecodeLimits,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            blur_radius: 2,
            duplicate_plugins: DuplicatePolicy::Replace,
            log_level: "info".to_string(),
            limits: DecodeLimits::default(),
        }
    }
}

impl EditorConfig {
    /// Load from the user config directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit file; missing or malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(path = %path.display(), %err, "no config file, using defaults");
                return Self::default();
            }
        };

        match Self::from_json(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Where the config file lives, if the platform has a config directory.
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        Some(path)
    }

    /// The directory plugin discovery should scan.
    pub fn plugin_dir(&self) -> Option<PathBuf> {
        self.plugin_dir.clone().or_else(default_plugin_dir)
    }

    pub fn effective_blur_radius(&self) -> u32 {
        self.blur_radius.clamp(1, 24)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// `<directory of the running executable>/plugins`
pub fn default_plugin_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(PLUGIN_DIR_NAME))
}
