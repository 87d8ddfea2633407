//! Configuration errors.

use gadgets_world::ParseAllocatorError;

/// Errors raised while loading a [`crate::UtilityConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable named an unknown allocator.
    #[error("invalid value for {var}: {source}")]
    InvalidAllocator {
        var: &'static str,
        #[source]
        source: ParseAllocatorError,
    },
}
