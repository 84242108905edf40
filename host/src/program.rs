use crate::codec::{Ownership, native_to_host};
use crate::context::Context;
use crate::error::HostError;
use crate::runtime::{Runtime, c_string};
use crate::value::HostValue;
use celbridge_core::CelValue;
use celbridge_core::Program as NativeProgram;
use celbridge_core::ffi::{program_compile, program_execute, program_free, program_new};

/// A compiled expression owned by the native side.
///
/// The native handle is freed exactly once, when this value is dropped.
#[derive(Debug)]
pub struct Program {
    handle: *mut NativeProgram,
    runtime: Runtime,
}

impl Program {
    pub(crate) fn new(runtime: Runtime) -> Self {
        Self {
            handle: program_new(),
            runtime,
        }
    }

    /// Compile `expression`, replacing the current one.
    ///
    /// On failure the previously compiled expression stays in effect.
    pub fn compile(&mut self, expression: &str) -> Result<(), HostError> {
        let expression = c_string(expression, "expression")?;
        self.runtime.call(|errbuf, errbuf_len| unsafe {
            program_compile(self.handle, expression.as_ptr(), errbuf, errbuf_len)
        })
    }

    /// Evaluate against `context` and copy the result into a host value.
    pub fn execute(&self, context: &Context) -> Result<HostValue, HostError> {
        let mut result = CelValue::null();
        self.runtime.call(|errbuf, errbuf_len| unsafe {
            program_execute(self.handle, context.as_ptr(), &mut result, errbuf, errbuf_len)
        })?;
        unsafe { native_to_host(result, Ownership::Native, self.runtime.strategy()) }
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe { program_free(self.handle) };
    }
}
