//! Errors raised by the native side of the bridge.
//!
//! Every failure is reported synchronously through the error channel
//! (see [`crate::errbuf`]). The text goes into the caller's buffer and the
//! [`CelErrorKind`] is recorded for [`crate::ffi::cel_last_error_kind`].

use crate::value::CelValueType;
use core::any::Any;
use thiserror::Error;

/// Failure of a bridge operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The expression failed to parse.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A binding or a result uses a type the bridge cannot marshal.
    #[error("{0}")]
    TypeUnsupported(String),

    /// `execute` was called on a program that never compiled successfully.
    #[error("program has not been compiled")]
    NotCompiled,

    /// The variable name or value of a binding was rejected.
    #[error("invalid binding: {0}")]
    Binding(String),

    /// The evaluator failed while running a compiled expression.
    #[error("evaluation error: {0}")]
    RuntimeEvaluation(String),

    /// Invalid API usage (null handle, invalid UTF-8, bad enum value).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A reclamation call that does not match the committed strategy.
    #[error("reclamation error: {0}")]
    Reclamation(String),

    /// A panic inside the bridge or the evaluator, caught at the ABI.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    pub(crate) fn unsupported_binding(ty: CelValueType) -> Self {
        BridgeError::TypeUnsupported(format!("unsupported type for binding: {}", ty))
    }

    pub(crate) fn unsupported_result(kind: &str) -> Self {
        BridgeError::TypeUnsupported(format!("value type not supported: {}", kind))
    }

    /// The ABI-stable classification of this error.
    pub fn kind(&self) -> CelErrorKind {
        match self {
            BridgeError::Syntax(_) => CelErrorKind::Syntax,
            BridgeError::TypeUnsupported(_) => CelErrorKind::TypeUnsupported,
            BridgeError::NotCompiled => CelErrorKind::NotCompiled,
            BridgeError::Binding(_) => CelErrorKind::Binding,
            BridgeError::RuntimeEvaluation(_) => CelErrorKind::RuntimeEvaluation,
            BridgeError::InvalidArgument(_) => CelErrorKind::InvalidArgument,
            BridgeError::Reclamation(_) => CelErrorKind::Reclamation,
            BridgeError::Internal(_) => CelErrorKind::Internal,
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Error classification visible across the C ABI.
///
/// Discriminants are part of the ABI and must not be reordered.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CelErrorKind {
    None = 0,
    Syntax = 1,
    TypeUnsupported = 2,
    NotCompiled = 3,
    Binding = 4,
    RuntimeEvaluation = 5,
    InvalidArgument = 6,
    Reclamation = 7,
    Internal = 8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(
            BridgeError::Syntax("x".into()).kind(),
            CelErrorKind::Syntax
        );
        assert_eq!(BridgeError::NotCompiled.kind(), CelErrorKind::NotCompiled);
        assert_eq!(
            BridgeError::unsupported_binding(CelValueType::List).kind(),
            CelErrorKind::TypeUnsupported
        );
    }

    #[test]
    fn unsupported_messages() {
        assert_eq!(
            BridgeError::unsupported_binding(CelValueType::Map).to_string(),
            "unsupported type for binding: map"
        );
        assert_eq!(
            BridgeError::unsupported_result("list").to_string(),
            "value type not supported: list"
        );
    }

    #[test]
    fn panic_payloads() {
        let payload = std::panic::catch_unwind(|| panic!("entered unreachable code")).unwrap_err();
        assert_eq!(panic_message(&*payload), "entered unreachable code");

        let payload = std::panic::catch_unwind(|| panic!("{} + {}", 1, 2)).unwrap_err();
        assert_eq!(panic_message(&*payload), "1 + 2");
        assert_eq!(
            BridgeError::Internal("boom".into()).kind(),
            CelErrorKind::Internal
        );
    }
}
