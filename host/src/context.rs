use crate::codec::host_to_native;
use crate::error::HostError;
use crate::runtime::{Runtime, c_string};
use crate::value::HostValue;
use celbridge_core::Context as NativeContext;
use celbridge_core::ffi::{context_add_variable, context_free, context_new, context_reset};
use tracing::trace;

/// Variable bindings owned by the native side.
///
/// The native handle is freed exactly once, when this value is dropped.
#[derive(Debug)]
pub struct Context {
    handle: *mut NativeContext,
    runtime: Runtime,
}

impl Context {
    pub(crate) fn new(runtime: Runtime) -> Self {
        Self {
            handle: context_new(),
            runtime,
        }
    }

    pub(crate) fn as_ptr(&self) -> *const NativeContext {
        self.handle
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: &str, value: &HostValue) -> Result<(), HostError> {
        let c_name = c_string(name, "variable name")?;
        let native = host_to_native(value)?;
        self.runtime.call(|errbuf, errbuf_len| unsafe {
            context_add_variable(self.handle, c_name.as_ptr(), native.as_raw(), errbuf, errbuf_len)
        })?;
        trace!(name, value = %value, "bound variable");
        Ok(())
    }

    /// Remove every binding. The context stays usable.
    pub fn reset(&mut self) {
        unsafe { context_reset(self.handle) };
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe { context_free(self.handle) };
    }
}
