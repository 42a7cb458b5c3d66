//! Calling engine functions through their handles

use crate::arena::{self, Target};
use core_types::{BindingResult, FunctionRef, Value};
use marshal::FunctionRegistry;
use rquickjs::function::Args;
use rquickjs::Value as JsValue;

/// Invocation of a [`FunctionRef`].
///
/// The function runs in the context it was obtained from, under the same
/// thread and lifetime checks as every other operation on its runtime.
pub trait FunctionExt {
    /// Calls the function with `args` and converts its result.
    fn call(&self, args: &[Value]) -> BindingResult<Value>;
}

impl FunctionExt for FunctionRef {
    fn call(&self, args: &[Value]) -> BindingResult<Value> {
        call(self, args)
    }
}

pub(crate) fn call(function: &FunctionRef, args: &[Value]) -> BindingResult<Value> {
    let engine = arena::lookup(function.runtime())?;
    engine.run(Target::Function(function.slot()), |ctx, scope| {
        let marshaller = scope.marshaller();
        let target = scope.resolve(ctx, function)?;
        let mut call_args = Args::new(ctx.clone(), args.len());
        for arg in marshaller.to_engine_all(ctx, args)? {
            call_args.push_arg(arg)?;
        }
        let result: JsValue = target.call_arg(call_args)?;
        marshaller.to_host(result)
    })
}
