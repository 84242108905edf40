//! Host side of the value codec.
//!
//! [`host_to_native`] borrows host memory for the duration of a bind call.
//! [`native_to_host`] copies native results into host values and is the only
//! place on the host side that releases native buffers.


use crate::error::{ErrorKind, HostError};
use crate::value::HostValue;
use celbridge_core::ffi::cel_string_free;
use celbridge_core::{CelBuffer, CelValue, CelValueType, ReclaimStrategy};
use core::marker::PhantomData;
use tracing::trace;

/// A [`CelValue`] that may point into a host value.
///
/// The lifetime keeps the host value alive (and unmodified) for as long as
/// the native representation exists, which covers the bind call.
#[derive(Debug)]
pub struct BorrowedValue<'a> {
    raw: CelValue,
    _host: PhantomData<&'a HostValue>,
}

impl BorrowedValue<'_> {
    pub fn as_raw(&self) -> &CelValue {
        &self.raw
    }
}

/// Who owns the buffer behind a string or bytes [`CelValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Allocated by the native side and handed to the host.
    Native,
    /// Host memory that was lent to the native side.
    Borrowed,
}

/// Convert a host value for binding. Strings and bytes are not copied.
pub fn host_to_native(value: &HostValue) -> Result<BorrowedValue<'_>, HostError> {
    let raw = match value {
        HostValue::Nil => CelValue::null(),
        HostValue::Bool(b) => CelValue::bool(*b),
        HostValue::Int(n) => CelValue::int(*n),
        HostValue::Float(x) => CelValue::double(*x),
        HostValue::Str(s) => CelValue::string(CelBuffer::borrowed(s.as_bytes())),
        HostValue::Bytes(bytes) => CelValue::bytes(CelBuffer::borrowed(bytes)),
        HostValue::List(_) | HostValue::Map(_) | HostValue::Function(_) | HostValue::Opaque(_) => {
            return Err(HostError::unsupported_binding(value.type_name()));
        }
    };
    Ok(BorrowedValue {
        raw,
        _host: PhantomData,
    })
}

/// Convert a native value into a host value.
///
/// String and bytes contents are copied. A natively owned buffer is released
/// right after the copy under [`ReclaimStrategy::Finalizer`]; under
/// [`ReclaimStrategy::Pool`] it stays alive until the next pool clear.
///
/// # Safety
///
/// A string or bytes `value` must point at `len` readable bytes. With
/// [`Ownership::Native`] the buffer must not have been released yet and must
/// not be used again by the caller.
pub unsafe fn native_to_host(
    value: CelValue,
    ownership: Ownership,
    strategy: ReclaimStrategy,
) -> Result<HostValue, HostError> {
    match value.value_type {
        CelValueType::Null => Ok(HostValue::Nil),
        CelValueType::Bool => Ok(HostValue::Bool(value.as_bool().unwrap_or_default())),
        CelValueType::Int => Ok(HostValue::Int(value.as_int().unwrap_or_default())),
        CelValueType::Uint => {
            let n = value.as_uint().unwrap_or_default();
            i64::try_from(n).map(HostValue::Int).map_err(|_| {
                HostError::new(
                    ErrorKind::TypeUnsupported,
                    format!("uint value {} does not fit in a host integer", n),
                )
            })
        }
        CelValueType::Double => Ok(HostValue::Float(value.as_double().unwrap_or_default())),
        CelValueType::String | CelValueType::Bytes => {
            let buffer = value.as_buffer().unwrap_or(CelBuffer::EMPTY);
            let copied = unsafe { buffer.as_slice() }.map(<[u8]>::to_vec);
            if ownership == Ownership::Native && strategy == ReclaimStrategy::Finalizer {
                trace!(ptr = ?buffer.ptr, "releasing native buffer");
                unsafe { cel_string_free(buffer.ptr) };
            }
            let bytes = copied.ok_or_else(|| {
                HostError::new(
                    ErrorKind::InvalidArgument,
                    format!("{} buffer has a null pointer", value.value_type),
                )
            })?;
            if value.value_type == CelValueType::Bytes {
                return Ok(HostValue::Bytes(bytes));
            }
            String::from_utf8(bytes).map(HostValue::Str).map_err(|e| {
                HostError::new(
                    ErrorKind::TypeUnsupported,
                    format!("string result is not valid UTF-8: {}", e),
                )
            })
        }
        CelValueType::List
        | CelValueType::Map
        | CelValueType::Timestamp
        | CelValueType::Duration => Err(HostError::unsupported_result(value.value_type)),
    }
}
