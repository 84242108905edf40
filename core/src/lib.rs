//! Native side of the CEL bridge.
//!
//! This crate exposes a compiled-expression evaluator (backed by
//! `cel-interpreter`) to a dynamically typed host through a C ABI:
//!
//! - [`value`]: the fixed-layout `CelValue` tagged union and its marshaling
//!   to and from evaluator values.
//! - [`errbuf`]: the caller-allocated error buffer protocol.
//! - [`reclaim`]: ownership of buffers handed back to the host.
//! - [`context`], [`program`], [`validate`]: the objects behind the handles.
//! - [`ffi`]: the `extern "C"` entry points.
//!
//! # Example
//!
//! ```
//! use celbridge_core::{Context, Program};
//! use cel_interpreter::Value;
//!
//! let mut context = Context::new();
//! context.bind("age", Value::Int(25)).unwrap();
//!
//! let mut program = Program::new();
//! program.compile("age >= 18").unwrap();
//! assert_eq!(program.execute(&context).unwrap(), Value::Bool(true));
//! ```

pub mod context;
pub mod errbuf;
pub mod error;
pub mod ffi;
pub mod options;
pub mod program;
pub mod reclaim;
pub mod validate;
pub mod value;

pub use context::Context;
pub use error::{BridgeError, CelErrorKind};
pub use options::BridgeOptions;
pub use program::Program;
pub use reclaim::{HostCapabilities, ReclaimStrategy, Reclaimer};
pub use validate::{Validation, validate};
pub use value::{CEL_VALUE_ABI_VERSION, CelBuffer, CelValue, CelValueData, CelValueType};
