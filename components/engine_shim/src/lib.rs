//! Runtime/context shim over the QuickJS engine
//!
//! Owns engine runtimes and contexts on behalf of the host and forwards
//! evaluation and function calls to the engine:
//!
//! - [`Runtime`] - one engine runtime, bound to the thread that created it
//! - [`Context`] - a global scope inside a runtime
//! - [`FunctionExt`] - calling a [`FunctionRef`] obtained from a context
//! - [`RuntimeConfig`] / [`StackPolicy`] - limits and stack checking
//! - [`ThreadedFunction`] - one JS function served from a dedicated thread
//!
//! Engine state never leaves its thread. Handles are ids checked against
//! the runtime's owner thread and Active/Closed state before anything
//! touches the engine, so cross-thread use fails with
//! [`BindingError::ThreadAffinity`] and use after teardown fails with
//! [`BindingError::UseAfterFree`].
//!
//! # Example
//!
//! ```no_run
//! use engine_shim::{FunctionExt, Runtime};
//! use core_types::Value;
//!
//! let runtime = Runtime::new().unwrap();
//! let context = runtime.create_context().unwrap();
//!
//! assert_eq!(context.eval("1 + 2").unwrap(), Value::Int(3));
//!
//! context.eval("function f(a, b) { return a + b; }").unwrap();
//! let f = context.get("f").unwrap();
//! let sum = f.as_function().unwrap().call(&[2.into(), 3.into()]).unwrap();
//! assert_eq!(sum, Value::Int(5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod arena;
mod callable;
pub mod config;
mod context;
mod exception;
mod function;
mod limits;
mod runtime;
mod stats;
mod worker;

pub use config::{RuntimeConfig, StackPolicy, DEFAULT_MAX_STACK_SIZE};
pub use context::Context;
pub use function::FunctionExt;
pub use runtime::Runtime;
pub use stats::MemoryStats;
pub use worker::ThreadedFunction;

pub use core_types::{
    BindingError, BindingResult, ErrorKind, FunctionRef, JsException, LimitKind, Map, RuntimeId,
    RuntimeState, Value,
};

/// Version of this binding
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
