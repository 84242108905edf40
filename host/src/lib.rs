//! A reference host for the CEL bridge.
//!
//! Models what a dynamically typed, garbage-collected embedder does with the
//! C ABI: convert its values at the boundary, keep native handles inside
//! resource types, and release returned buffers under the committed
//! reclamation strategy.
//!
//! ```
//! use celbridge_host::{HostValue, Runtime};
//!
//! let runtime = Runtime::detect().unwrap();
//! let mut context = runtime.context();
//! context.set("name", &HostValue::from("World")).unwrap();
//!
//! let mut program = runtime.program();
//! program.compile("'Hello, ' + name + '!'").unwrap();
//! assert_eq!(program.execute(&context).unwrap(), HostValue::from("Hello, World!"));
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod program;
pub mod runtime;
pub mod value;

pub use codec::{BorrowedValue, Ownership, host_to_native, native_to_host};
pub use context::Context;
pub use error::{ErrorKind, HostError};
pub use program::Program;
pub use runtime::Runtime;
pub use value::HostValue;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn runtime() -> Runtime {
        Runtime::detect().unwrap()
    }

    #[test]
    fn boolean_expression() {
        let runtime = runtime();
        let mut context = runtime.context();
        context.set("age", &HostValue::Int(25)).unwrap();
        context.set("status", &HostValue::from("active")).unwrap();

        let mut program = runtime.program();
        program.compile("age >= 18 && status == 'active'").unwrap();
        assert_eq!(program.execute(&context), Ok(HostValue::Bool(true)));
    }

    #[test]
    fn execute_before_compile() {
        let runtime = runtime();
        let context = runtime.context();
        let program = runtime.program();
        let err = program.execute(&context).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotCompiled);
        assert_eq!(err.message, "program has not been compiled");
    }

    #[test]
    fn syntax_errors_are_typed() {
        let runtime = runtime();
        let mut program = runtime.program();
        for source in ["1 + + 2", "1 +", "("] {
            let err = program.compile(source).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Syntax, "{source:?}");
            assert!(!err.message.is_empty());
        }
        assert_eq!(runtime.validate("(").unwrap_err().kind, ErrorKind::Syntax);
    }

    #[test]
    fn floats_stay_doubles() {
        let runtime = runtime();
        let mut context = runtime.context();
        context.set("x", &HostValue::Float(3.0)).unwrap();

        let mut program = runtime.program();
        program.compile("x + 1.0").unwrap();
        assert_eq!(program.execute(&context), Ok(HostValue::Float(4.0)));

        // CEL has no implicit int/double promotion.
        program.compile("x + 1").unwrap();
        assert_eq!(
            program.execute(&context).unwrap_err().kind,
            ErrorKind::RuntimeEvaluation
        );
    }

    #[test]
    fn unsupported_binding_never_reaches_native() {
        let runtime = runtime();
        let mut context = runtime.context();
        let err = context
            .set("xs", &HostValue::List(vec![HostValue::Int(1)]))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeUnsupported);
        assert_eq!(err.message, "unsupported type for binding: list");
    }

    #[test]
    fn bad_names() {
        let runtime = runtime();
        let mut context = runtime.context();
        assert_eq!(
            context.set("a\0b", &HostValue::Nil).unwrap_err().kind,
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            context.set("9lives", &HostValue::Nil).unwrap_err().kind,
            ErrorKind::Binding
        );
    }

    #[test]
    fn validate_lists_variables() {
        let runtime = runtime();
        assert_eq!(runtime.validate("a + b").unwrap(), ["a", "b"]);
        assert_eq!(runtime.validate("items.all(x, x > min_age)").unwrap(), ["items", "min_age"]);
        assert_eq!(runtime.validate("1 + 2").unwrap(), Vec::<String>::new());
        assert_eq!(
            runtime.validate("1 + + 2").unwrap_err().kind,
            ErrorKind::Syntax
        );
    }
}
