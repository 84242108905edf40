//! Typed errors surfaced to host code.
//!
//! The native side reports failures as text in a caller-allocated buffer plus
//! a thread-local kind. Both are folded into a single [`HostError`] here.

use celbridge_core::CelErrorKind;
use core::fmt;
use thiserror::Error;

/// What went wrong, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The expression failed to parse.
    Syntax,
    /// A value could not cross the boundary in either direction.
    TypeUnsupported,
    /// The program was executed before any successful compile.
    NotCompiled,
    /// A variable could not be bound (bad name or payload).
    Binding,
    /// Evaluation failed, e.g. an undefined variable or a type mismatch.
    RuntimeEvaluation,
    /// The call itself was malformed (null handle, interior NUL, ...).
    InvalidArgument,
    /// The reclamation protocol was misused.
    Reclamation,
    /// The native side panicked; the call had no effect.
    Internal,
}

impl ErrorKind {
    /// Map a native error kind. `None` means the native side reported a
    /// failure without classifying it, which is treated as an argument error.
    pub fn from_native(kind: CelErrorKind) -> Self {
        match kind {
            CelErrorKind::Syntax => ErrorKind::Syntax,
            CelErrorKind::TypeUnsupported => ErrorKind::TypeUnsupported,
            CelErrorKind::NotCompiled => ErrorKind::NotCompiled,
            CelErrorKind::Binding => ErrorKind::Binding,
            CelErrorKind::RuntimeEvaluation => ErrorKind::RuntimeEvaluation,
            CelErrorKind::Reclamation => ErrorKind::Reclamation,
            CelErrorKind::Internal => ErrorKind::Internal,
            CelErrorKind::InvalidArgument | CelErrorKind::None => ErrorKind::InvalidArgument,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::TypeUnsupported => "type unsupported",
            ErrorKind::NotCompiled => "not compiled",
            ErrorKind::Binding => "binding",
            ErrorKind::RuntimeEvaluation => "runtime evaluation",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Reclamation => "reclamation",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Error returned by every fallible host operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub kind: ErrorKind,
    pub message: String,
}

impl HostError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported_binding(type_name: &str) -> Self {
        Self::new(
            ErrorKind::TypeUnsupported,
            format!("unsupported type for binding: {}", type_name),
        )
    }

    pub(crate) fn unsupported_result(type_name: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::TypeUnsupported,
            format!("value type not supported: {}", type_name),
        )
    }
}
