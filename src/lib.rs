//! celbridge - a C ABI bridge between dynamically typed hosts and a CEL evaluator
//!
//! # Overview
//!
//! The native side ([`native`]) compiles and evaluates CEL expressions with
//! `cel-interpreter` and exposes them through `extern "C"` functions built
//! around three ideas:
//!
//! - a fixed-layout tagged union, [`CelValue`], for every value crossing the
//!   boundary;
//! - a caller-allocated error buffer filled on failure;
//! - one process-wide reclamation strategy for buffers handed to the host.
//!
//! The host side ([`host`]) is a reference embedder: it converts its own
//! values at the boundary and owns native handles through resource types.
//!
//! # Quick Start
//!
//! ```
//! use celbridge::{HostValue, Runtime};
//!
//! let runtime = Runtime::detect().unwrap();
//!
//! let mut context = runtime.context();
//! context.set("age", &HostValue::Int(25)).unwrap();
//! context.set("status", &HostValue::from("active")).unwrap();
//!
//! let mut program = runtime.program();
//! program.compile("age >= 18 && status == 'active'").unwrap();
//! assert_eq!(program.execute(&context).unwrap(), HostValue::Bool(true));
//! ```
//!
//! # Reclamation
//!
//! Hosts with reliable finalizers release every returned string as soon as
//! it is copied. Hosts without them let strings accumulate and call
//! [`Runtime::clear_pool`] at a request boundary. The choice is made once per
//! process by [`Runtime::new`] and cannot change afterwards.

pub use celbridge_core as native;
pub use celbridge_host as host;

pub use celbridge_core::{
    BridgeError, BridgeOptions, CelBuffer, CelErrorKind, CelValue, CelValueType, HostCapabilities,
    ReclaimStrategy,
};
pub use celbridge_host::{Context, ErrorKind, HostError, HostValue, Program, Runtime};
