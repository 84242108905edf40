//! The fixed-layout value representation shared with the host.
//!
//! A [`CelValue`] is a tagged union: `value_type` says which member of
//! `data` is active, and readers must never touch any other member. String
//! and bytes payloads are `{ptr, len}` pairs ([`CelBuffer`]). A `CelValue`
//! never owns memory; who frees a buffer depends on who produced it:
//!
//! - values built by the host for `context_add_variable` borrow host memory
//!   for the duration of that call only;
//! - values written by `program_execute` point at buffers owned by the
//!   [`crate::reclaim`] registry until the host releases them.

pub mod marshal;

#[cfg(test)]
mod value_test;

use core::fmt;
use static_assertions::{assert_eq_size, const_assert_eq};

/// Version of the `CelValue` layout and `CelValueType` numbering.
///
/// Bump on any change to field order, sizes or discriminants.
pub const CEL_VALUE_ABI_VERSION: u32 = 1;

/// Discriminant of a [`CelValue`].
///
/// `List`, `Map`, `Timestamp` and `Duration` are reserved: they are part of
/// the numbering but the bridge does not marshal them yet.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CelValueType {
    Null = 0,
    Bool = 1,
    Int = 2,
    Uint = 3,
    Double = 4,
    String = 5,
    Bytes = 6,
    List = 7,
    Map = 8,
    Timestamp = 9,
    Duration = 10,
}

impl fmt::Display for CelValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CelValueType::Null => "null",
            CelValueType::Bool => "bool",
            CelValueType::Int => "int",
            CelValueType::Uint => "uint",
            CelValueType::Double => "double",
            CelValueType::String => "string",
            CelValueType::Bytes => "bytes",
            CelValueType::List => "list",
            CelValueType::Map => "map",
            CelValueType::Timestamp => "timestamp",
            CelValueType::Duration => "duration",
        };
        f.write_str(name)
    }
}

/// A `{ptr, len}` view of a byte buffer.
///
/// `ptr` may be null only when `len` is zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelBuffer {
    pub ptr: *const u8,
    pub len: usize,
}

impl CelBuffer {
    pub const EMPTY: CelBuffer = CelBuffer {
        ptr: core::ptr::null(),
        len: 0,
    };

    /// Borrow `bytes` without copying.
    pub fn borrowed(bytes: &[u8]) -> Self {
        CelBuffer {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View the buffer as a slice.
    ///
    /// # Safety
    ///
    /// Unless `len` is zero, `ptr` must point to `len` initialized bytes that
    /// stay valid and unmodified for `'a`.
    pub unsafe fn as_slice<'a>(&self) -> Option<&'a [u8]> {
        if self.len == 0 {
            return Some(&[]);
        }
        if self.ptr.is_null() {
            return None;
        }
        Some(unsafe { core::slice::from_raw_parts(self.ptr, self.len) })
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union CelValueData {
    pub bool_val: bool,
    pub int_val: i64,
    pub uint_val: u64,
    pub double_val: f64,
    pub string_val: CelBuffer,
    pub bytes_val: CelBuffer,
}

/// A value crossing the bridge.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CelValue {
    pub value_type: CelValueType,
    pub data: CelValueData,
}

#[cfg(target_pointer_width = "64")]
const_assert_eq!(core::mem::size_of::<CelValue>(), 24);
#[cfg(target_pointer_width = "64")]
const_assert_eq!(core::mem::align_of::<CelValue>(), 8);
assert_eq_size!(CelBuffer, [usize; 2]);
assert_eq_size!(CelValueType, u32);

impl CelValue {
    pub const fn null() -> Self {
        CelValue {
            value_type: CelValueType::Null,
            data: CelValueData { uint_val: 0 },
        }
    }

    pub const fn bool(value: bool) -> Self {
        CelValue {
            value_type: CelValueType::Bool,
            data: CelValueData { bool_val: value },
        }
    }

    pub const fn int(value: i64) -> Self {
        CelValue {
            value_type: CelValueType::Int,
            data: CelValueData { int_val: value },
        }
    }

    pub const fn uint(value: u64) -> Self {
        CelValue {
            value_type: CelValueType::Uint,
            data: CelValueData { uint_val: value },
        }
    }

    pub const fn double(value: f64) -> Self {
        CelValue {
            value_type: CelValueType::Double,
            data: CelValueData { double_val: value },
        }
    }

    /// A `String` value whose payload is `buffer`. Ownership is not transferred.
    pub const fn string(buffer: CelBuffer) -> Self {
        CelValue {
            value_type: CelValueType::String,
            data: CelValueData { string_val: buffer },
        }
    }

    /// A `Bytes` value whose payload is `buffer`. Ownership is not transferred.
    pub const fn bytes(buffer: CelBuffer) -> Self {
        CelValue {
            value_type: CelValueType::Bytes,
            data: CelValueData { bytes_val: buffer },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value_type {
            CelValueType::Bool => Some(unsafe { self.data.bool_val }),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.value_type {
            CelValueType::Int => Some(unsafe { self.data.int_val }),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self.value_type {
            CelValueType::Uint => Some(unsafe { self.data.uint_val }),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.value_type {
            CelValueType::Double => Some(unsafe { self.data.double_val }),
            _ => None,
        }
    }

    /// The payload buffer of a `String` or `Bytes` value.
    pub fn as_buffer(&self) -> Option<CelBuffer> {
        match self.value_type {
            CelValueType::String => Some(unsafe { self.data.string_val }),
            CelValueType::Bytes => Some(unsafe { self.data.bytes_val }),
            _ => None,
        }
    }
}

impl Default for CelValue {
    fn default() -> Self {
        CelValue::null()
    }
}

impl fmt::Debug for CelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("CelValue");
        out.field("value_type", &self.value_type);
        match self.value_type {
            CelValueType::Bool => out.field("data", &unsafe { self.data.bool_val }),
            CelValueType::Int => out.field("data", &unsafe { self.data.int_val }),
            CelValueType::Uint => out.field("data", &unsafe { self.data.uint_val }),
            CelValueType::Double => out.field("data", &unsafe { self.data.double_val }),
            CelValueType::String => out.field("data", &unsafe { self.data.string_val }),
            CelValueType::Bytes => out.field("data", &unsafe { self.data.bytes_val }),
            _ => &mut out,
        };
        out.finish()
    }
}
