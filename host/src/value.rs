//! The host's own value model.

use core::fmt;

/// A value as a dynamically typed host sees it.
///
/// Only the scalar variants, strings and bytes can cross into the evaluator.
/// The remaining variants exist so that the codec has something concrete to
/// reject.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
    /// A callable, identified by name.
    Function(String),
    /// Any other host object, identified by its class name.
    Opaque(String),
}

impl HostValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Nil => "nil",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "string",
            HostValue::Bytes(_) => "bytes",
            HostValue::List(_) => "list",
            HostValue::Map(_) => "map",
            HostValue::Function(_) => "function",
            HostValue::Opaque(_) => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Nil => write!(f, "nil"),
            HostValue::Bool(b) => write!(f, "{}", b),
            HostValue::Int(n) => write!(f, "{}", n),
            HostValue::Float(x) => write!(f, "{}", x),
            HostValue::Str(s) => write!(f, "{:?}", s),
            HostValue::Bytes(bytes) => write!(f, "b{:?}", String::from_utf8_lossy(bytes)),
            HostValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            HostValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            HostValue::Function(name) => write!(f, "<function {}>", name),
            HostValue::Opaque(class) => write!(f, "<{}>", class),
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Int(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Str(value.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        let value = HostValue::Map(vec![(
            HostValue::from("a"),
            HostValue::List(vec![HostValue::Int(1), HostValue::Nil]),
        )]);
        assert_eq!(value.to_string(), r#"{"a": [1, nil]}"#);
        assert_eq!(HostValue::Function("f".into()).to_string(), "<function f>");
    }
}
