//! Conversion between [`CelValue`] and evaluator values.
//!
//! Incoming values (bindings) are copied into evaluator-owned storage, so the
//! host buffer only has to outlive the call that binds it. Outgoing strings
//! and bytes are copied into buffers registered with a [`Reclaimer`].

use super::{CelValue, CelValueType};
use crate::error::BridgeError;
use crate::reclaim::Reclaimer;
use cel_interpreter::Value;
use std::sync::Arc;

/// Convert a host-supplied value into an evaluator value.
///
/// # Safety
///
/// If `value` is a `String` or `Bytes`, its buffer must point to `len`
/// readable bytes for the duration of this call.
pub unsafe fn to_engine(value: &CelValue) -> Result<Value, BridgeError> {
    match value.value_type {
        CelValueType::Null => Ok(Value::Null),
        CelValueType::Bool => Ok(Value::Bool(unsafe { value.data.bool_val })),
        CelValueType::Int => Ok(Value::Int(unsafe { value.data.int_val })),
        CelValueType::Uint => Ok(Value::UInt(unsafe { value.data.uint_val })),
        CelValueType::Double => Ok(Value::Float(unsafe { value.data.double_val })),
        CelValueType::String => {
            let buffer = unsafe { value.data.string_val };
            let bytes = unsafe { buffer.as_slice() }
                .ok_or_else(|| BridgeError::Binding("null string pointer".into()))?;
            let text = core::str::from_utf8(bytes)
                .map_err(|e| BridgeError::Binding(format!("invalid UTF-8 string: {}", e)))?;
            Ok(Value::String(Arc::new(text.to_owned())))
        }
        CelValueType::Bytes => {
            let buffer = unsafe { value.data.bytes_val };
            let bytes = unsafe { buffer.as_slice() }
                .ok_or_else(|| BridgeError::Binding("null bytes pointer".into()))?;
            Ok(Value::Bytes(Arc::new(bytes.to_vec())))
        }
        ty @ (CelValueType::List
        | CelValueType::Map
        | CelValueType::Timestamp
        | CelValueType::Duration) => Err(BridgeError::unsupported_binding(ty)),
    }
}

/// Convert an evaluator result into a [`CelValue`].
///
/// String and bytes payloads are allocated through `reclaimer`; the host
/// becomes responsible for releasing them under the committed strategy.
pub fn from_engine(value: &Value, reclaimer: &Reclaimer) -> Result<CelValue, BridgeError> {
    match value {
        Value::Null => Ok(CelValue::null()),
        Value::Bool(b) => Ok(CelValue::bool(*b)),
        Value::Int(i) => Ok(CelValue::int(*i)),
        Value::UInt(u) => Ok(CelValue::uint(*u)),
        Value::Float(f) => Ok(CelValue::double(*f)),
        Value::String(s) => Ok(CelValue::string(reclaimer.alloc(s.as_bytes()))),
        Value::Bytes(b) => Ok(CelValue::bytes(reclaimer.alloc(b.as_slice()))),
        Value::List(_) => Err(BridgeError::unsupported_result("list")),
        Value::Map(_) => Err(BridgeError::unsupported_result("map")),
        Value::Timestamp(_) => Err(BridgeError::unsupported_result("timestamp")),
        Value::Duration(_) => Err(BridgeError::unsupported_result("duration")),
        Value::Function(..) => Err(BridgeError::unsupported_result("function")),
        #[allow(unreachable_patterns)]
        _ => Err(BridgeError::unsupported_result("opaque")),
    }
}
