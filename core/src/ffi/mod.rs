//! The C ABI.
//!
//! Handles are raw pointers to boxed [`Context`] and [`Program`] values.
//! Each `*_new` must be matched by exactly one `*_free`; freeing twice is
//! undefined behavior, never freeing leaks. Fallible functions return `false`
//! and report through the error buffer described in [`crate::errbuf`]; the
//! error kind of the last failure on the calling thread is available from
//! [`cel_last_error_kind`].
//!
//! No panic unwinds out of an entry point: fallible calls report it as an
//! `Internal` error, the others log it and return a neutral value.
//!
//! Handles are not synchronized: one handle must not be used from two
//! threads at once.


use crate::context::Context;
use crate::errbuf::write_error;
use crate::error::{BridgeError, CelErrorKind, panic_message};
use crate::program::Program;
use crate::reclaim::{self, ReclaimStrategy};
use crate::validate::validate;
use crate::value::{CEL_VALUE_ABI_VERSION, CelBuffer, CelValue, marshal};
use core::cell::Cell;
use core::ffi::{CStr, c_char};
use core::ptr;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, trace};

thread_local! {
    static LAST_ERROR: Cell<CelErrorKind> = const { Cell::new(CelErrorKind::None) };
}

fn succeed() -> bool {
    LAST_ERROR.with(|last| last.set(CelErrorKind::None));
    true
}

/// Report `err` through the error channel and return `false`.
///
/// # Safety
///
/// Same contract as [`write_error`].
unsafe fn fail(err: BridgeError, errbuf: *mut u8, errbuf_len: *mut usize) -> bool {
    debug!(kind = ?err.kind(), %err, "bridge call failed");
    LAST_ERROR.with(|last| last.set(err.kind()));
    unsafe { write_error(&err.to_string(), errbuf, errbuf_len) };
    false
}

/// Run the body of a fallible entry point. A panic becomes
/// [`BridgeError::Internal`] instead of unwinding into the host.
fn catch<T>(f: impl FnOnce() -> Result<T, BridgeError>) -> Result<T, BridgeError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(BridgeError::Internal(panic_message(&*payload))))
}

/// Run the body of an entry point that has no error channel. A panic is
/// logged and `fallback` returned.
fn absorb<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        error!(panic = %panic_message(&*payload), "panic at the C ABI");
        LAST_ERROR.with(|last| last.set(CelErrorKind::Internal));
        fallback
    })
}

/// # Safety
///
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, BridgeError> {
    if ptr.is_null() {
        return Err(BridgeError::InvalidArgument(format!("{} is null", what)));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| BridgeError::InvalidArgument(format!("{} is not valid UTF-8: {}", what, e)))
}

/// Version of the `CelValue` layout this library was built with.
#[unsafe(no_mangle)]
pub extern "C" fn cel_abi_version() -> u32 {
    CEL_VALUE_ABI_VERSION
}

/// Kind of the last failure on the calling thread, or `None` if the last
/// fallible call succeeded.
#[unsafe(no_mangle)]
pub extern "C" fn cel_last_error_kind() -> CelErrorKind {
    LAST_ERROR.with(Cell::get)
}

/// Commit the reclamation strategy for the process.
///
/// `strategy` is `0` (finalizer) or `1` (pool). Must be called before any
/// buffer is returned to the host; afterwards only the committed strategy is
/// accepted.
///
/// # Safety
///
/// `errbuf`/`errbuf_len` follow the error buffer contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cel_reclaim_init(
    strategy: u32,
    errbuf: *mut u8,
    errbuf_len: *mut usize,
) -> bool {
    let result = catch(|| {
        let strategy = ReclaimStrategy::from_raw(strategy).ok_or_else(|| {
            BridgeError::InvalidArgument(format!("unknown reclamation strategy {}", strategy))
        })?;
        reclaim::install(strategy)
    });
    match result {
        Ok(_) => succeed(),
        Err(err) => unsafe { fail(err, errbuf, errbuf_len) },
    }
}

/// The committed reclamation strategy (committing the default if needed).
#[unsafe(no_mangle)]
pub extern "C" fn cel_reclaim_strategy() -> ReclaimStrategy {
    absorb(ReclaimStrategy::Pool, || reclaim::global().strategy())
}

/// Create an empty context.
#[unsafe(no_mangle)]
pub extern "C" fn context_new() -> *mut Context {
    absorb(ptr::null_mut(), || {
        let context = Box::into_raw(Box::new(Context::new()));
        trace!(?context, "context_new");
        context
    })
}

/// Free a context.
///
/// # Safety
///
/// `context` must be null or a pointer returned by [`context_new`] that has
/// not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn context_free(context: *mut Context) {
    if !context.is_null() {
        trace!(?context, "context_free");
        absorb((), || drop(unsafe { Box::from_raw(context) }));
    }
}

/// Bind `name` to `value` in `context`.
///
/// String and bytes payloads are read during the call only.
///
/// # Safety
///
/// `context` must be a live context handle, `name` a NUL-terminated string,
/// `value` a valid `CelValue` whose buffer (if any) is readable for the
/// duration of the call, and `errbuf`/`errbuf_len` must follow the error
/// buffer contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn context_add_variable(
    context: *mut Context,
    name: *const c_char,
    value: *const CelValue,
    errbuf: *mut u8,
    errbuf_len: *mut usize,
) -> bool {
    let result = catch(|| {
        let context = unsafe { context.as_mut() }
            .ok_or_else(|| BridgeError::InvalidArgument("context is null".into()))?;
        let name = unsafe { read_str(name, "variable name") }?;
        let value = unsafe { value.as_ref() }
            .ok_or_else(|| BridgeError::InvalidArgument("value is null".into()))?;
        let value = unsafe { marshal::to_engine(value) }?;
        context.bind(name, value)
    });
    match result {
        Ok(()) => succeed(),
        Err(err) => unsafe { fail(err, errbuf, errbuf_len) },
    }
}

/// Remove every binding from `context`. The handle stays valid.
///
/// # Safety
///
/// `context` must be null or a live context handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn context_reset(context: *mut Context) {
    if let Some(context) = unsafe { context.as_mut() } {
        absorb((), || context.reset());
    }
}

/// Create a program with no compiled expression.
#[unsafe(no_mangle)]
pub extern "C" fn program_new() -> *mut Program {
    absorb(ptr::null_mut(), || {
        let program = Box::into_raw(Box::new(Program::new()));
        trace!(?program, "program_new");
        program
    })
}

/// Free a program.
///
/// # Safety
///
/// `program` must be null or a pointer returned by [`program_new`] that has
/// not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn program_free(program: *mut Program) {
    if !program.is_null() {
        trace!(?program, "program_free");
        absorb((), || drop(unsafe { Box::from_raw(program) }));
    }
}

/// Compile `expression` into `program`, replacing any previous expression.
///
/// On failure the previously compiled expression (if any) stays in effect.
///
/// # Safety
///
/// `program` must be a live program handle, `expression` a NUL-terminated
/// string, and `errbuf`/`errbuf_len` must follow the error buffer contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn program_compile(
    program: *mut Program,
    expression: *const c_char,
    errbuf: *mut u8,
    errbuf_len: *mut usize,
) -> bool {
    let result = catch(|| {
        let program = unsafe { program.as_mut() }
            .ok_or_else(|| BridgeError::InvalidArgument("program is null".into()))?;
        let expression = unsafe { read_str(expression, "expression") }?;
        program.compile(expression)
    });
    match result {
        Ok(()) => succeed(),
        Err(err) => unsafe { fail(err, errbuf, errbuf_len) },
    }
}

/// Evaluate `program` against `context` and store the result in `out_result`.
///
/// An uncompiled program fails with `NotCompiled` without reading `context`.
/// A string or bytes result points at a native buffer that the host must
/// release under the committed reclamation strategy. `out_result` is only
/// written on success.
///
/// # Safety
///
/// `program` must be a live program handle, `context` a live context handle,
/// `out_result` valid for writes, and `errbuf`/`errbuf_len` must follow the
/// error buffer contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn program_execute(
    program: *const Program,
    context: *const Context,
    out_result: *mut CelValue,
    errbuf: *mut u8,
    errbuf_len: *mut usize,
) -> bool {
    let result = catch(|| {
        let program = unsafe { program.as_ref() }
            .ok_or_else(|| BridgeError::InvalidArgument("program is null".into()))?;
        if !program.is_compiled() {
            return Err(BridgeError::NotCompiled);
        }
        let context = unsafe { context.as_ref() }
            .ok_or_else(|| BridgeError::InvalidArgument("context is null".into()))?;
        if out_result.is_null() {
            return Err(BridgeError::InvalidArgument("result pointer is null".into()));
        }
        let value = program.execute(context)?;
        marshal::from_engine(&value, reclaim::global())
    });
    match result {
        Ok(value) => {
            unsafe { out_result.write(value) };
            succeed()
        }
        Err(err) => unsafe { fail(err, errbuf, errbuf_len) },
    }
}

/// Parse `expression` without creating a program and report its variables.
///
/// On success `*out_variable_count` receives the number of distinct free
/// variables and `*out_variable_names` a native buffer holding their names,
/// sorted and separated by NUL bytes. The names buffer must be released like
/// any other returned string. Either out pointer may be null.
///
/// # Safety
///
/// `expression` must be a NUL-terminated string, non-null out pointers must
/// be valid for writes, and `errbuf`/`errbuf_len` must follow the error
/// buffer contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn program_validate(
    expression: *const c_char,
    out_variable_names: *mut CelBuffer,
    out_variable_count: *mut usize,
    errbuf: *mut u8,
    errbuf_len: *mut usize,
) -> bool {
    let result = catch(|| {
        let expression = unsafe { read_str(expression, "expression") }?;
        validate(expression)
    });
    match result {
        Ok(validation) => {
            if !out_variable_count.is_null() {
                unsafe { out_variable_count.write(validation.variable_count()) };
            }
            if !out_variable_names.is_null() {
                let joined = validation.variables.join("\0");
                let names = reclaim::global().alloc(joined.as_bytes());
                unsafe { out_variable_names.write(names) };
            }
            succeed()
        }
        Err(err) => unsafe { fail(err, errbuf, errbuf_len) },
    }
}

/// Release one buffer returned by the library.
///
/// Null, unknown and already released pointers are ignored.
///
/// # Safety
///
/// The host must not read the buffer after this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cel_string_free(ptr: *const u8) {
    absorb(false, || reclaim::global().release(ptr));
}

/// Release every buffer returned since the last clear.
///
/// Only available under the pool strategy; returns `false` (and frees
/// nothing) under the finalizer strategy. No conversion reading a returned
/// buffer may be in flight on any thread.
#[unsafe(no_mangle)]
pub extern "C" fn cel_string_pool_clear() -> bool {
    match catch(|| reclaim::global().clear()) {
        Ok(_) => succeed(),
        Err(err) => {
            LAST_ERROR.with(|last| last.set(err.kind()));
            false
        }
    }
}
