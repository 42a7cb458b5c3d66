//! Integration test suite for the QuickJS host binding
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use core_types;
    pub use engine_shim;
    pub use js_cli;
    pub use marshal;
}

use engine_shim::{Context, Runtime};

/// A fresh runtime with one context, for tests that need nothing else
pub fn runtime_with_context() -> (Runtime, Context) {
    let runtime = Runtime::new().expect("runtime");
    let context = runtime.create_context().expect("context");
    (runtime, context)
}
