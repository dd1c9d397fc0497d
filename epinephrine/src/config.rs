//! Container configuration

#[cfg(feature = "config")]
use crate::error::{DiError, DiResult};
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default limit on nested resolutions per thread
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 128;

/// Options controlling the resolution engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Nested resolutions allowed before a request fails with
    /// [`DiError::DepthExceeded`](crate::DiError::DepthExceeded)
    pub max_resolution_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }
}

#[cfg(feature = "config")]
impl ContainerOptions {
    /// Load options from TOML string
    pub fn from_toml(toml_str: &str) -> DiResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| DiError::ConfigError(format!("Failed to parse TOML: {}", e)))
    }

    /// Load options from JSON string
    pub fn from_json(json_str: &str) -> DiResult<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| DiError::ConfigError(format!("Failed to parse JSON: {}", e)))
    }
}

// Example configuration file:
// ```toml
// max_resolution_depth = 64
// ```
