//! Utility configuration.

use gadgets_world::Allocator;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding [`UtilityConfig::owned_allocator`].
pub const OWNED_ALLOCATOR_ENV: &str = "GADGETS_OWNED_ALLOCATOR";

/// Environment variable overriding [`UtilityConfig::copy_allocator`].
pub const COPY_ALLOCATOR_ENV: &str = "GADGETS_COPY_ALLOCATOR";

/// Allocation choices for the array projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityConfig {
    /// Allocator for arrays handed to the caller (`component_data_array`,
    /// `entity_array`).
    pub owned_allocator: Allocator,
    /// Allocator for the scratch array behind copies (`get`, `entities`).
    pub copy_allocator: Allocator,
}

impl UtilityConfig {
    /// The default configuration: persistent owned arrays, temp scratch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owned_allocator: Allocator::Persistent,
            copy_allocator: Allocator::Temp,
        }
    }

    /// Override the allocator for caller-owned arrays.
    #[must_use]
    pub fn with_owned_allocator(mut self, allocator: Allocator) -> Self {
        self.owned_allocator = allocator;
        self
    }

    /// Override the allocator for copy scratch arrays.
    #[must_use]
    pub fn with_copy_allocator(mut self, allocator: Allocator) -> Self {
        self.copy_allocator = allocator;
        self
    }

    /// Defaults, overridden by `GADGETS_OWNED_ALLOCATOR` and
    /// `GADGETS_COPY_ALLOCATOR` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`UtilityConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &'static str, fallback: Allocator| match lookup(var) {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidAllocator { var, source }),
            None => Ok(fallback),
        };

        let defaults = Self::new();
        Ok(Self {
            owned_allocator: read(OWNED_ALLOCATOR_ENV, defaults.owned_allocator)?,
            copy_allocator: read(COPY_ALLOCATOR_ENV, defaults.copy_allocator)?,
        })
    }
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self::new()
    }
}
