//! Ownership of buffers returned to the host.
//!
//! Two reclamation protocols exist and exactly one is committed per process:
//!
//! - [`ReclaimStrategy::Finalizer`]: the host frees each buffer individually
//!   (`cel_string_free`), typically from a finalizer or destructor.
//! - [`ReclaimStrategy::Pool`]: buffers accumulate until the host calls
//!   `cel_string_pool_clear`, e.g. at a request boundary. Individual frees
//!   are still honored.
//!
//! Mixing them is what leads to double frees, so the registry keeps track of
//! every live buffer: releasing an unknown or already released pointer is a
//! no-op, and clearing the pool under the finalizer strategy is refused.
//!
//! The host must not clear the pool while any conversion that reads a
//! pool-owned buffer is in flight.

mod pool;

use crate::error::BridgeError;
use crate::options::BridgeOptions;
use crate::value::CelBuffer;
use core::fmt;
use core::str::FromStr;
use once_cell::sync::OnceCell;
use pool::StringPool;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

/// Reclamation protocol for native buffers handed to the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReclaimStrategy {
    Finalizer = 0,
    Pool = 1,
}

impl ReclaimStrategy {
    /// Pick the strategy a host can support.
    pub fn for_host(capabilities: HostCapabilities) -> Self {
        if capabilities.finalizers {
            ReclaimStrategy::Finalizer
        } else {
            ReclaimStrategy::Pool
        }
    }

    /// Decode the ABI representation.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ReclaimStrategy::Finalizer),
            1 => Some(ReclaimStrategy::Pool),
            _ => None,
        }
    }
}

impl fmt::Display for ReclaimStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReclaimStrategy::Finalizer => write!(f, "finalizer"),
            ReclaimStrategy::Pool => write!(f, "pool"),
        }
    }
}

impl FromStr for ReclaimStrategy {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finalizer" => Ok(ReclaimStrategy::Finalizer),
            "pool" => Ok(ReclaimStrategy::Pool),
            other => Err(BridgeError::InvalidArgument(format!(
                "unknown reclamation strategy '{}'",
                other
            ))),
        }
    }
}

/// What the embedding host can do for memory it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCapabilities {
    /// The host reliably runs a hook when an object becomes unreachable.
    pub finalizers: bool,
}

/// Registry of native buffers plus the strategy used to release them.
#[derive(Debug)]
pub struct Reclaimer {
    strategy: ReclaimStrategy,
    pool: Mutex<StringPool>,
}

impl Reclaimer {
    pub fn new(strategy: ReclaimStrategy) -> Self {
        Self {
            strategy,
            pool: Mutex::new(StringPool::default()),
        }
    }

    pub fn strategy(&self) -> ReclaimStrategy {
        self.strategy
    }

    fn pool(&self) -> MutexGuard<'_, StringPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy `bytes` into a buffer the host now owns under this strategy.
    pub fn alloc(&self, bytes: &[u8]) -> CelBuffer {
        let buffer = self.pool().insert(bytes);
        trace!(ptr = ?buffer.ptr, len = buffer.len, "allocated host buffer");
        buffer
    }

    /// Release one buffer. Returns whether anything was freed.
    pub fn release(&self, ptr: *const u8) -> bool {
        if ptr.is_null() {
            return false;
        }
        let freed = self.pool().remove(ptr);
        if freed {
            trace!(?ptr, "released host buffer");
        } else {
            debug!(?ptr, "ignoring release of unknown buffer");
        }
        freed
    }

    /// Free every outstanding buffer. Only valid under [`ReclaimStrategy::Pool`].
    pub fn clear(&self) -> Result<usize, BridgeError> {
        if self.strategy != ReclaimStrategy::Pool {
            warn!(strategy = %self.strategy, "pool clear refused");
            return Err(BridgeError::Reclamation(format!(
                "pool clear is not available under the {} strategy",
                self.strategy
            )));
        }
        let count = self.pool().clear();
        debug!(count, "cleared string pool");
        Ok(count)
    }

    /// Number of buffers the host has not released yet.
    pub fn live(&self) -> usize {
        self.pool().len()
    }

    pub fn is_live(&self, ptr: *const u8) -> bool {
        self.pool().contains(ptr)
    }
}

static RECLAIMER: OnceCell<Reclaimer> = OnceCell::new();

/// Commit the process-wide strategy.
///
/// Installing the strategy that is already committed is a no-op; asking for a
/// different one fails.
pub fn install(strategy: ReclaimStrategy) -> Result<&'static Reclaimer, BridgeError> {
    let reclaimer = RECLAIMER.get_or_init(|| {
        debug!(%strategy, "committing reclamation strategy");
        Reclaimer::new(strategy)
    });
    if reclaimer.strategy() != strategy {
        warn!(
            committed = %reclaimer.strategy(),
            requested = %strategy,
            "reclamation strategy already committed"
        );
        return Err(BridgeError::Reclamation(format!(
            "strategy already committed as {}, cannot switch to {}",
            reclaimer.strategy(),
            strategy
        )));
    }
    Ok(reclaimer)
}

/// The process-wide reclaimer, committing the configured default if the host
/// never called [`install`].
pub fn global() -> &'static Reclaimer {
    RECLAIMER.get_or_init(|| {
        let strategy = BridgeOptions::from_env().reclaim;
        debug!(%strategy, "committing default reclamation strategy");
        Reclaimer::new(strategy)
    })
}

/// The committed strategy, if any.
pub fn committed() -> Option<ReclaimStrategy> {
    RECLAIMER.get().map(Reclaimer::strategy)
}
