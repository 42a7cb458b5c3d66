//! Context handle

use crate::arena::{self, Target};
use crate::callable::{self, HostFn};
use crate::function;
use core_types::{Affinity, BindingError, BindingResult, FunctionRef, Release, RuntimeId, Value};
use rquickjs::context::EvalOptions;
use rquickjs::{Ctx, Value as JsValue};
use std::rc::Rc;
use std::sync::Arc;

/// A global scope inside a [`Runtime`](crate::Runtime).
///
/// Contexts of one runtime share its heap and limits but not their globals.
/// Subject to the same thread and lifetime checks as the runtime.
///
/// Dropping the context releases it; function handles obtained from it
/// fail with `UseAfterFree` from then on.
#[derive(Debug)]
pub struct Context {
    affinity: Arc<Affinity>,
    id: u64,
}

fn eval_script<'js>(ctx: &Ctx<'js>, source: &str) -> rquickjs::Result<JsValue<'js>> {
    // scripts run sloppy, like a classic <script>
    let mut options = EvalOptions::default();
    options.global = true;
    options.strict = false;
    ctx.eval_with_options(source, options)
}

impl Context {
    pub(crate) fn new(affinity: Arc<Affinity>, id: u64) -> Self {
        Self { affinity, id }
    }

    /// Id of the owning runtime
    pub fn runtime_id(&self) -> RuntimeId {
        self.affinity.id()
    }

    /// Evaluates `source` as a global script and returns its completion
    /// value.
    ///
    /// # Errors
    ///
    /// - `Engine` for syntax errors and uncaught exceptions
    /// - `TypeConversion` when the result has no host form (symbols, BigInts)
    /// - `Recursion` / `ResourceLimitExceeded` when a limit is hit
    pub fn eval(&self, source: &str) -> BindingResult<Value> {
        arena::lookup(&self.affinity)?.run(Target::Context(self.id), |ctx, scope| {
            let value = eval_script(ctx, source)?;
            scope.marshaller().to_host(value)
        })
    }

    /// Evaluates `source` for its side effects, discarding the result.
    pub fn execute(&self, source: &str) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.run(Target::Context(self.id), |ctx, _| {
            eval_script(ctx, source)?;
            Ok(())
        })
    }

    /// Reads a global variable. Missing globals read as `Undefined`.
    pub fn get(&self, name: &str) -> BindingResult<Value> {
        arena::lookup(&self.affinity)?.run(Target::Context(self.id), |ctx, scope| {
            let value: JsValue = ctx.globals().get(name)?;
            scope.marshaller().to_host(value)
        })
    }

    /// Defines or overwrites a global variable.
    pub fn set(&self, name: &str, value: &Value) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.run(Target::Context(self.id), |ctx, scope| {
            let converted = scope.marshaller().to_engine(ctx, value)?;
            ctx.globals().set(name, converted)?;
            Ok(())
        })
    }

    /// Parses `text` with the engine's JSON parser.
    pub fn parse_json(&self, text: &str) -> BindingResult<Value> {
        arena::lookup(&self.affinity)?.run(Target::Context(self.id), |ctx, scope| {
            let value = ctx.json_parse(text)?;
            scope.marshaller().to_host(value)
        })
    }

    /// Exposes a host function as the global `name`.
    ///
    /// The callable runs on the owner thread while the runtime is executing,
    /// so it cannot evaluate in its own runtime; doing so fails with
    /// `Reentrancy`. An `Err` it returns is thrown into the script as an
    /// `Error` whose message starts with `name`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use engine_shim::{Runtime, Value};
    ///
    /// let runtime = Runtime::new().unwrap();
    /// let context = runtime.create_context().unwrap();
    /// context
    ///     .add_callable("double", |args| {
    ///         Ok(Value::from(args[0].as_f64().unwrap_or(0.0) * 2.0))
    ///     })
    ///     .unwrap();
    /// assert_eq!(context.eval("double(21)").unwrap(), Value::Int(42));
    /// ```
    pub fn add_callable<F>(&self, name: &str, callable: F) -> BindingResult<()>
    where
        F: Fn(&[Value]) -> BindingResult<Value> + 'static,
    {
        let host: HostFn = Rc::new(callable);
        arena::lookup(&self.affinity)?.run(Target::Context(self.id), |ctx, scope| {
            callable::install(ctx, scope, name, host)
        })
    }

    /// Calls `function` with `args`, like
    /// [`FunctionExt::call`](crate::FunctionExt::call), but only for
    /// functions obtained from this context.
    ///
    /// # Errors
    ///
    /// `TypeConversion` when `function` belongs to another context or
    /// runtime.
    pub fn call(&self, function: &FunctionRef, args: &[Value]) -> BindingResult<Value> {
        let engine = arena::lookup(&self.affinity)?;
        if function.runtime_id() != self.runtime_id() {
            return Err(BindingError::TypeConversion(format!(
                "{:?} belongs to {}, not {}",
                function,
                function.runtime_id(),
                self.runtime_id()
            )));
        }
        let owner = engine.function_context(function.slot())?;
        if owner != self.id {
            return Err(BindingError::TypeConversion(format!(
                "{:?} belongs to context {}, not {}",
                function, owner, self.id
            )));
        }
        drop(engine);
        function::call(function, args)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.affinity.defer_release(Release::Context(self.id));
    }
}
