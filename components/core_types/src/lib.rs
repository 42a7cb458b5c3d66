//! Host-side value model and error handling for the QuickJS binding.
//!
//! This crate holds everything that exists on the host side of the
//! host/engine boundary and that does not need the engine itself:
//! the value union, function handles, runtime identity and thread
//! affinity, and the error taxonomy.
//!
//! # Overview
//!
//! - [`Value`] - Host representation of engine values
//! - [`FunctionRef`] - Opaque handle to an engine-side callable
//! - [`Affinity`] - Runtime identity, owner thread and Active/Closed state
//! - [`BindingError`] - Every failure the binding can surface
//! - [`JsException`] / [`ErrorKind`] - A thrown JavaScript value
//! - [`StackFrame`] - One parsed line of an engine stack trace
//!
//! # Examples
//!
//! ```
//! use core_types::{Value, ErrorKind, JsException};
//!
//! let num = Value::Int(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//! assert_eq!(num, Value::Float(42.0));
//!
//! let error = JsException::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod handle;
mod json;
mod source;
mod value;

pub use error::{BindingError, BindingResult, ErrorKind, JsException, LimitKind};
pub use handle::{Affinity, FunctionRef, Release, RuntimeId, RuntimeState};
pub use source::{parse_stack, StackFrame};
pub use value::{Map, Value};
