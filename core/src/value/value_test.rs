use super::marshal::{from_engine, to_engine};
use super::*;
use crate::error::BridgeError;
use crate::reclaim::{ReclaimStrategy, Reclaimer};
use cel_interpreter::Value;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn accessors_check_the_tag() {
    let value = CelValue::int(-123);
    assert_eq!(value.as_int(), Some(-123));
    assert_eq!(value.as_uint(), None);
    assert_eq!(value.as_bool(), None);
    assert_eq!(value.as_double(), None);
    assert!(value.as_buffer().is_none());

    assert_eq!(CelValue::bool(true).as_bool(), Some(true));
    assert_eq!(CelValue::uint(456).as_uint(), Some(456));
    assert_eq!(CelValue::double(2.5).as_double(), Some(2.5));
    assert_eq!(CelValue::default().value_type, CelValueType::Null);
}

#[test]
fn borrowed_buffers_point_at_host_memory() {
    let text = String::from("hello");
    let value = CelValue::string(CelBuffer::borrowed(text.as_bytes()));
    let buffer = value.as_buffer().unwrap();
    assert_eq!(buffer.ptr, text.as_ptr());
    assert_eq!(buffer.len, 5);

    let empty = CelBuffer::borrowed(&[]);
    assert!(empty.is_empty());
    assert_eq!(unsafe { empty.as_slice() }, Some(&[][..]));
    assert_eq!(unsafe { CelBuffer::EMPTY.as_slice() }, Some(&[][..]));
}

#[test]
fn discriminants_are_stable() {
    assert_eq!(CelValueType::Null as u32, 0);
    assert_eq!(CelValueType::String as u32, 5);
    assert_eq!(CelValueType::Duration as u32, 10);
    assert_eq!(CEL_VALUE_ABI_VERSION, 1);
}

#[test]
fn debug_shows_active_member_only() {
    assert_eq!(
        format!("{:?}", CelValue::int(7)),
        "CelValue { value_type: Int, data: 7 }"
    );
    assert_eq!(
        format!("{:?}", CelValue::null()),
        "CelValue { value_type: Null }"
    );
}

#[test]
fn scalars_to_engine() {
    unsafe {
        assert_eq!(to_engine(&CelValue::null()), Ok(Value::Null));
        assert_eq!(to_engine(&CelValue::bool(true)), Ok(Value::Bool(true)));
        assert_eq!(to_engine(&CelValue::int(i64::MIN)), Ok(Value::Int(i64::MIN)));
        assert_eq!(to_engine(&CelValue::uint(u64::MAX)), Ok(Value::UInt(u64::MAX)));
        assert_eq!(to_engine(&CelValue::double(1.5)), Ok(Value::Float(1.5)));
    }
}

#[test]
fn strings_to_engine_are_copied() {
    let text = "Test string with special chars: áéíóú, 你好, 🚀";
    let value = CelValue::string(CelBuffer::borrowed(text.as_bytes()));
    let engine = unsafe { to_engine(&value) }.unwrap();
    assert_eq!(engine, Value::String(Arc::new(text.to_owned())));

    let empty = CelValue::string(CelBuffer::EMPTY);
    assert_eq!(
        unsafe { to_engine(&empty) },
        Ok(Value::String(Arc::new(String::new())))
    );
}

#[test]
fn composite_bindings_are_rejected() {
    for ty in [
        CelValueType::List,
        CelValueType::Map,
        CelValueType::Timestamp,
        CelValueType::Duration,
    ] {
        let value = CelValue {
            value_type: ty,
            data: CelValueData { uint_val: 0 },
        };
        let err = unsafe { to_engine(&value) }.unwrap_err();
        assert_eq!(
            err,
            BridgeError::TypeUnsupported(format!("unsupported type for binding: {}", ty))
        );
    }
}

#[test]
fn results_allocate_through_the_reclaimer() {
    let reclaimer = Reclaimer::new(ReclaimStrategy::Finalizer);

    let value = from_engine(&Value::String(Arc::new("Hello, World!".into())), &reclaimer).unwrap();
    assert_eq!(value.value_type, CelValueType::String);
    let buffer = value.as_buffer().unwrap();
    assert_eq!(unsafe { buffer.as_slice() }, Some(&b"Hello, World!"[..]));
    assert_eq!(reclaimer.live(), 1);
    assert!(reclaimer.release(buffer.ptr));

    let value = from_engine(&Value::Bytes(Arc::new(vec![1, 2, 3])), &reclaimer).unwrap();
    assert_eq!(value.value_type, CelValueType::Bytes);
    assert_eq!(reclaimer.live(), 1);

    let value = from_engine(&Value::String(Arc::new(String::new())), &reclaimer).unwrap();
    assert_eq!(value.as_buffer(), Some(CelBuffer::EMPTY));
    assert_eq!(reclaimer.live(), 1);
}

#[test]
fn scalar_results() {
    let reclaimer = Reclaimer::new(ReclaimStrategy::Pool);
    assert_eq!(from_engine(&Value::Int(3), &reclaimer).unwrap().as_int(), Some(3));
    assert_eq!(from_engine(&Value::UInt(3), &reclaimer).unwrap().as_uint(), Some(3));
    assert_eq!(
        from_engine(&Value::Bool(false), &reclaimer).unwrap().as_bool(),
        Some(false)
    );
    assert_eq!(
        from_engine(&Value::Float(0.25), &reclaimer).unwrap().as_double(),
        Some(0.25)
    );
    assert_eq!(
        from_engine(&Value::Null, &reclaimer).unwrap().value_type,
        CelValueType::Null
    );
    assert_eq!(reclaimer.live(), 0);
}

#[test]
fn composite_results_are_rejected() {
    let reclaimer = Reclaimer::new(ReclaimStrategy::Pool);
    let list = Value::List(Arc::new(vec![Value::Int(1)]));
    assert_eq!(
        from_engine(&list, &reclaimer).unwrap_err().to_string(),
        "value type not supported: list"
    );
}
