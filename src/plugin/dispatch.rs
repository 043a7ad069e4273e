//! Routes a filter request by name to the registered capability.

use tracing::{debug, warn};

use super::registry::PluginRegistry;
use crate::error::FilterError;
use crate::pixels::PixelBuffer;

/// Pure routing layer over a finished [`PluginRegistry`].
///
/// Each `apply` makes at most one synchronous call into a capability and
/// never retries; what the filter does is entirely up to the filter.
#[derive(Debug)]
pub struct FilterDispatcher {
    registry: PluginRegistry,
}

impl FilterDispatcher {
    /// Takes ownership of the table, so it cannot change once dispatch starts.
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }

    /// Run the filter called `name` on `input` and return its output.
    pub fn apply(&self, name: &str, input: &PixelBuffer) -> Result<PixelBuffer, FilterError> {
        let capability = self
            .registry
            .get(name)
            .ok_or_else(|| FilterError::NotFound(name.to_string()))?;

        debug!(%name, width = input.width(), height = input.height(), "applying filter");
        capability.edit(input).map_err(|source| {
            warn!(%name, %source, "filter failed");
            FilterError::Failed {
                name: name.to_string(),
                source,
            }
        })
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Available filter names, sorted.
    pub fn filter_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }
}
