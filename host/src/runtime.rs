//! Entry point for host code.

use crate::codec::{Ownership, native_to_host};
use crate::context::Context;
use crate::error::{ErrorKind, HostError};
use crate::program::Program;
use crate::value::HostValue;
use celbridge_core::ffi::{
    cel_last_error_kind, cel_reclaim_init, cel_string_pool_clear, program_validate,
};
use celbridge_core::{BridgeOptions, CelBuffer, CelValue, HostCapabilities, ReclaimStrategy, reclaim};
use std::ffi::CString;
use tracing::debug;

/// A host's view of the bridge with the reclamation strategy committed.
///
/// Cheap to copy; [`Context`] and [`Program`] keep their own copy so they
/// know how to read errors and release results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runtime {
    strategy: ReclaimStrategy,
    error_capacity: usize,
}

impl Runtime {
    /// Commit the strategy matching `capabilities` for the whole process.
    ///
    /// Fails with [`ErrorKind::Reclamation`] if a different strategy was
    /// committed earlier.
    pub fn new(capabilities: HostCapabilities) -> Result<Self, HostError> {
        let options = BridgeOptions::from_env();
        let runtime = Runtime {
            strategy: ReclaimStrategy::for_host(capabilities),
            error_capacity: options.error_capacity,
        };
        runtime.call(|errbuf, errbuf_len| unsafe {
            cel_reclaim_init(runtime.strategy as u32, errbuf, errbuf_len)
        })?;
        debug!(strategy = %runtime.strategy, "runtime ready");
        Ok(runtime)
    }

    /// Like [`Runtime::new`], deriving the capabilities from the strategy
    /// already committed in this process or, failing that, from
    /// `CELBRIDGE_RECLAIM`.
    pub fn detect() -> Result<Self, HostError> {
        let strategy = reclaim::committed().unwrap_or(BridgeOptions::from_env().reclaim);
        Self::new(HostCapabilities {
            finalizers: strategy == ReclaimStrategy::Finalizer,
        })
    }

    /// Use error buffers of `capacity` bytes. Longer messages are truncated.
    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    pub fn strategy(&self) -> ReclaimStrategy {
        self.strategy
    }

    pub fn error_capacity(&self) -> usize {
        self.error_capacity
    }

    pub fn context(&self) -> Context {
        Context::new(*self)
    }

    pub fn program(&self) -> Program {
        Program::new(*self)
    }

    /// Parse `expression` and return the names of its free variables.
    pub fn validate(&self, expression: &str) -> Result<Vec<String>, HostError> {
        let expression = c_string(expression, "expression")?;
        let mut names = CelBuffer::EMPTY;
        let mut count = 0usize;
        self.call(|errbuf, errbuf_len| unsafe {
            program_validate(expression.as_ptr(), &mut names, &mut count, errbuf, errbuf_len)
        })?;

        let joined =
            match unsafe { native_to_host(CelValue::bytes(names), Ownership::Native, self.strategy) }? {
                HostValue::Bytes(joined) => joined,
                other => return Err(HostError::unsupported_result(other.type_name())),
            };
        if count == 0 {
            return Ok(Vec::new());
        }
        joined
            .split(|&b| b == 0)
            .map(|name| {
                String::from_utf8(name.to_vec()).map_err(|e| {
                    HostError::new(ErrorKind::InvalidArgument, format!("variable name: {}", e))
                })
            })
            .collect()
    }

    /// Free every string returned since the last clear.
    ///
    /// Only meaningful under [`ReclaimStrategy::Pool`]; no host value may be
    /// in the middle of being converted.
    pub fn clear_pool(&self) -> Result<(), HostError> {
        if cel_string_pool_clear() {
            return Ok(());
        }
        let kind = ErrorKind::from_native(cel_last_error_kind());
        let message = match kind {
            ErrorKind::Reclamation => {
                format!("pool clear is not available under the {} strategy", self.strategy)
            }
            other => format!("pool clear failed ({} error)", other),
        };
        Err(HostError::new(kind, message))
    }

    /// Run a fallible native call with a fresh error buffer.
    pub(crate) fn call(
        &self,
        f: impl FnOnce(*mut u8, *mut usize) -> bool,
    ) -> Result<(), HostError> {
        let mut errbuf = vec![0u8; self.error_capacity];
        let mut errbuf_len = errbuf.len();
        if f(errbuf.as_mut_ptr(), &mut errbuf_len) {
            return Ok(());
        }
        let kind = ErrorKind::from_native(cel_last_error_kind());
        errbuf.truncate(errbuf_len);
        Err(HostError {
            kind,
            message: String::from_utf8_lossy(&errbuf).into_owned(),
        })
    }
}

pub(crate) fn c_string(s: &str, what: &str) -> Result<CString, HostError> {
    CString::new(s).map_err(|_| {
        HostError::new(
            ErrorKind::InvalidArgument,
            format!("{} contains a NUL byte", what),
        )
    })
}
