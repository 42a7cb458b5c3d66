//! Host callables exposed as engine globals
//!
//! Arguments are converted to host values before the callable sees them and
//! its result is converted back. A host error becomes a JS `Error` thrown at
//! the call site, so scripts can catch it like any other exception.

use crate::arena::{Engine, Scope};
use core_types::{BindingResult, Value};
use marshal::{MarshalError, MarshalResult};
use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, Value as JsValue};
use std::rc::{Rc, Weak};

/// Shared form of a host callable
pub(crate) type HostFn = Rc<dyn Fn(&[Value]) -> BindingResult<Value>>;

/// Defines `name` on the scope's global object.
pub(crate) fn install<'js>(
    ctx: &Ctx<'js>,
    scope: &Scope<'_>,
    name: &str,
    callable: HostFn,
) -> MarshalResult<()> {
    let engine = scope.engine().weak();
    let context = scope.context_id();
    let label = name.to_string();
    let function = Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<JsValue<'js>>| -> rquickjs::Result<JsValue<'js>> {
            invoke(&ctx, &engine, context, &label, &callable, args.0)
        },
    )?;
    ctx.globals().set(name, function)?;
    log::trace!("installed host callable {}", name);
    Ok(())
}

fn invoke<'js>(
    ctx: &Ctx<'js>,
    engine: &Weak<Engine>,
    context: u64,
    name: &str,
    callable: &HostFn,
    args: Vec<JsValue<'js>>,
) -> rquickjs::Result<JsValue<'js>> {
    let engine = engine
        .upgrade()
        .ok_or_else(|| Exception::throw_internal(ctx, "runtime has been closed"))?;
    let scope = Scope::new(&engine, context);
    let marshaller = scope.marshaller();

    let host_args = args
        .into_iter()
        .map(|arg| marshaller.to_host(arg))
        .collect::<MarshalResult<Vec<Value>>>()
        .map_err(|err| rethrow(ctx, name, err))?;

    match callable(&host_args) {
        Ok(result) => marshaller
            .to_engine(ctx, &result)
            .map_err(|err| rethrow(ctx, name, err)),
        Err(err) => {
            log::debug!("host callable {} failed: {}", name, err);
            Err(Exception::throw_message(ctx, &format!("{}: {}", name, err)))
        }
    }
}

fn rethrow(ctx: &Ctx<'_>, name: &str, err: MarshalError) -> rquickjs::Error {
    match err {
        MarshalError::Engine(inner) => inner,
        other => Exception::throw_type(ctx, &format!("{}: {}", name, other)),
    }
}
