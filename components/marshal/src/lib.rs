//! Value marshalling between host values and QuickJS values
//!
//! Converts [`core_types::Value`] into engine values and back. Composite
//! values are converted recursively; engine functions are not converted at
//! all but registered with a [`FunctionRegistry`] and handed out as
//! [`core_types::FunctionRef`]s.
//!
//! The marshaller never decides what an engine exception means. Engine
//! failures come back as [`MarshalError::Engine`] so the caller, which
//! owns the runtime's limit state, can translate them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod error;
pub mod registry;

pub use convert::{to_engine, to_host, Marshaller, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
pub use error::{MarshalError, MarshalResult};
pub use registry::FunctionRegistry;
