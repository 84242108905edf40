//! Configuration options for the bridge.

use crate::errbuf::DEFAULT_ERROR_CAPACITY;
use crate::reclaim::ReclaimStrategy;
use tracing::warn;

/// Environment variable selecting the default reclamation strategy.
pub const RECLAIM_ENV: &str = "CELBRIDGE_RECLAIM";

/// Environment variable overriding the recommended error buffer capacity.
pub const ERROR_CAPACITY_ENV: &str = "CELBRIDGE_ERROR_CAPACITY";

/// Configuration options for the bridge.
///
/// # Example
///
/// ```
/// use celbridge_core::{BridgeOptions, ReclaimStrategy};
///
/// let options = BridgeOptions {
///     error_capacity: 1024,
///     reclaim: ReclaimStrategy::Finalizer,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Size of the error buffer hosts should allocate per call.
    ///
    /// Default: 4096
    pub error_capacity: usize,

    /// Strategy committed when the host never calls `cel_reclaim_init`.
    ///
    /// Default: `Pool`
    pub reclaim: ReclaimStrategy,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            error_capacity: DEFAULT_ERROR_CAPACITY,
            reclaim: ReclaimStrategy::Pool,
        }
    }
}

impl BridgeOptions {
    /// Defaults overridden by `CELBRIDGE_RECLAIM` and `CELBRIDGE_ERROR_CAPACITY`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup(RECLAIM_ENV) {
            match raw.parse() {
                Ok(strategy) => options.reclaim = strategy,
                Err(err) => warn!(%err, "ignoring {}", RECLAIM_ENV),
            }
        }

        if let Some(raw) = lookup(ERROR_CAPACITY_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => options.error_capacity = capacity,
                _ => warn!(value = %raw, "ignoring {}", ERROR_CAPACITY_ENV),
            }
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let options = BridgeOptions::from_lookup(|_| None);
        assert_eq!(options, BridgeOptions::default());
        assert_eq!(options.error_capacity, 4096);
        assert_eq!(options.reclaim, ReclaimStrategy::Pool);
    }

    #[test]
    fn overrides() {
        let options = BridgeOptions::from_lookup(|key| match key {
            RECLAIM_ENV => Some("finalizer".into()),
            ERROR_CAPACITY_ENV => Some("512".into()),
            _ => None,
        });
        assert_eq!(options.reclaim, ReclaimStrategy::Finalizer);
        assert_eq!(options.error_capacity, 512);
    }

    #[test]
    fn bad_values_are_ignored() {
        let options = BridgeOptions::from_lookup(|key| match key {
            RECLAIM_ENV => Some("refcount".into()),
            ERROR_CAPACITY_ENV => Some("0".into()),
            _ => None,
        });
        assert_eq!(options, BridgeOptions::default());
    }
}
