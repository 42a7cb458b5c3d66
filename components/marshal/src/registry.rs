//! Function handle registry seam
//!
//! Engine functions are never deep-converted. The marshaller hands them to
//! a registry which keeps them alive and returns a [`FunctionRef`]; going
//! the other way, the registry resolves a handle back to the function.

use crate::MarshalResult;
use core_types::FunctionRef;
use rquickjs::{Ctx, Function};

/// Keeps engine functions alive on behalf of host handles.
///
/// Implementations must refuse handles that belong to another runtime or
/// that have already been released.
pub trait FunctionRegistry<'js> {
    /// Keeps `function` alive and returns a handle for it.
    fn register(&self, ctx: &Ctx<'js>, function: Function<'js>) -> MarshalResult<FunctionRef>;

    /// Looks a handle back up inside `ctx`.
    fn resolve(&self, ctx: &Ctx<'js>, function: &FunctionRef) -> MarshalResult<Function<'js>>;
}
