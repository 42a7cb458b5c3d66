//! Per-thread home of engine state
//!
//! Every engine runtime lives in a thread-local table on the thread that
//! created it, together with its contexts and the functions the host holds
//! handles to. Public handles carry only ids plus the runtime's
//! [`Affinity`]; every operation goes through [`lookup`], which checks the
//! calling thread and the lifecycle state before the table is consulted.
//!
//! Handles dropped on other threads cannot free engine values directly.
//! They queue a [`Release`] on the affinity record, and the owner drains
//! the queue the next time it enters the runtime.

use crate::config::RuntimeConfig;
use crate::exception;
use crate::limits::{self, Deadline};
use core_types::{Affinity, BindingError, BindingResult, FunctionRef, Release, RuntimeId};
use marshal::{FunctionRegistry, MarshalError, MarshalResult, Marshaller};
use rquickjs::{Ctx, Function, Persistent};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

thread_local! {
    static ENGINES: RefCell<HashMap<RuntimeId, Rc<Engine>>> = RefCell::new(HashMap::new());
}

struct SavedFunction {
    context: u64,
    function: Persistent<Function<'static>>,
}

/// What an evaluation runs against
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target {
    Context(u64),
    Function(u64),
}

pub(crate) struct Engine {
    this: Weak<Engine>,
    affinity: Arc<Affinity>,
    // field order is drop order: functions, then contexts, then the runtime
    functions: RefCell<HashMap<u64, SavedFunction>>,
    contexts: RefCell<HashMap<u64, rquickjs::Context>>,
    next_slot: Cell<u64>,
    busy: Cell<bool>,
    max_depth: usize,
    max_length: usize,
    memory_limit: Cell<Option<usize>>,
    deadline: Rc<Deadline>,
    runtime: rquickjs::Runtime,
}

/// Marks the engine as executing until dropped.
pub(crate) struct Busy<'a> {
    engine: &'a Engine,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.engine.busy.set(false);
    }
}

impl Engine {
    /// Creates a runtime owned by the calling thread and registers it.
    pub(crate) fn create(config: &RuntimeConfig) -> BindingResult<Arc<Affinity>> {
        let runtime = rquickjs::Runtime::new().map_err(exception::engine_failure)?;
        let deadline = Rc::new(Deadline::new(config.time_limit));
        runtime.set_interrupt_handler(Some(limits::interrupt_handler(deadline.clone())));
        runtime.set_max_stack_size(config.stack_policy.engine_limit());
        runtime.set_memory_limit(config.memory_limit.unwrap_or(0));
        if let Some(threshold) = config.gc_threshold {
            runtime.set_gc_threshold(threshold);
        }

        let affinity = Affinity::new();
        let engine = Rc::new_cyclic(|this| Engine {
            this: this.clone(),
            affinity: affinity.clone(),
            functions: RefCell::new(HashMap::new()),
            contexts: RefCell::new(HashMap::new()),
            next_slot: Cell::new(0),
            busy: Cell::new(false),
            max_depth: config.max_conversion_depth,
            max_length: config.max_array_length,
            memory_limit: Cell::new(config.memory_limit),
            deadline,
            runtime,
        });

        ENGINES
            .try_with(|engines| engines.borrow_mut().insert(affinity.id(), engine))
            .map_err(|_| BindingError::UseAfterFree("thread is shutting down".to_string()))?;
        log::debug!("created {} on {:?}", affinity.id(), affinity.owner());
        Ok(affinity)
    }

    pub(crate) fn id(&self) -> RuntimeId {
        self.affinity.id()
    }

    pub(crate) fn weak(&self) -> Weak<Engine> {
        self.this.clone()
    }

    fn next_slot(&self) -> u64 {
        let slot = self.next_slot.get();
        self.next_slot.set(slot + 1);
        slot
    }

    /// Fails with `Reentrancy` while the engine is already executing, e.g.
    /// when a host callable tries to evaluate in its own runtime.
    pub(crate) fn enter(&self) -> BindingResult<Busy<'_>> {
        if self.busy.replace(true) {
            return Err(BindingError::Reentrancy(self.id()));
        }
        let busy = Busy { engine: self };
        self.release_pending();
        Ok(busy)
    }

    fn release_pending(&self) {
        for release in self.affinity.take_released() {
            match release {
                Release::Function(slot) => {
                    let removed = self.functions.borrow_mut().remove(&slot);
                    drop(removed);
                }
                Release::Context(id) => {
                    let owned: Vec<SavedFunction> = {
                        let mut functions = self.functions.borrow_mut();
                        let slots: Vec<u64> = functions
                            .iter()
                            .filter(|(_, saved)| saved.context == id)
                            .map(|(slot, _)| *slot)
                            .collect();
                        slots.iter().filter_map(|slot| functions.remove(slot)).collect()
                    };
                    drop(owned);
                    let removed = self.contexts.borrow_mut().remove(&id);
                    drop(removed);
                    log::trace!("released context {} of {}", id, self.id());
                }
            }
        }
    }

    pub(crate) fn create_context(&self) -> BindingResult<u64> {
        let _busy = self.enter()?;
        let context = rquickjs::Context::full(&self.runtime).map_err(exception::engine_failure)?;
        let id = self.next_slot();
        self.contexts.borrow_mut().insert(id, context);
        Ok(id)
    }

    /// Context a registered function was obtained from.
    pub(crate) fn function_context(&self, slot: u64) -> BindingResult<u64> {
        self.functions
            .borrow()
            .get(&slot)
            .map(|saved| saved.context)
            .ok_or_else(|| released_function(self.id(), slot))
    }

    fn resolve_target(&self, target: Target) -> BindingResult<(u64, rquickjs::Context)> {
        let context_id = match target {
            Target::Context(id) => id,
            Target::Function(slot) => self.function_context(slot)?,
        };
        let context = self
            .contexts
            .borrow()
            .get(&context_id)
            .cloned()
            .ok_or_else(|| {
                BindingError::UseAfterFree(format!("context {} of {} was released", context_id, self.id()))
            })?;
        Ok((context_id, context))
    }

    /// Runs `f` inside the target's context with the time limit armed.
    pub(crate) fn run<R>(
        &self,
        target: Target,
        f: impl FnOnce(&Ctx<'_>, &Scope<'_>) -> MarshalResult<R>,
    ) -> BindingResult<R> {
        let _busy = self.enter()?;
        let (context_id, context) = self.resolve_target(target)?;
        let _armed = self.deadline.arm();
        context
            .with(|ctx| {
                let scope = Scope::new(self, context_id);
                f(&ctx, &scope).map_err(|err| match err.into_binding() {
                    Ok(err) => err,
                    Err(engine) => exception::translate(&ctx, engine, &self.deadline),
                })
            })
            .map_err(|err| self.recheck_memory(err))
    }

    /// Usage can only be read once the context lock is released.
    fn recheck_memory(&self, error: BindingError) -> BindingError {
        match self.memory_limit.get() {
            Some(limit) if limit > 0 => {
                exception::classify_memory(error, limit, self.runtime.memory_usage().malloc_size)
            }
            _ => error,
        }
    }

    /// Runs `f` against the bare runtime.
    pub(crate) fn with_runtime<R>(&self, f: impl FnOnce(&rquickjs::Runtime) -> R) -> BindingResult<R> {
        let _busy = self.enter()?;
        Ok(f(&self.runtime))
    }

    pub(crate) fn set_memory_limit(&self, limit: Option<usize>) -> BindingResult<()> {
        let _busy = self.enter()?;
        self.runtime.set_memory_limit(limit.unwrap_or(0));
        self.memory_limit.set(limit);
        Ok(())
    }

    pub(crate) fn set_time_limit(&self, limit: Option<Duration>) -> BindingResult<()> {
        let _busy = self.enter()?;
        self.deadline.set_budget(limit);
        Ok(())
    }

    pub(crate) fn time_limit(&self) -> Option<Duration> {
        self.deadline.budget()
    }

    pub(crate) fn execute_pending_job(&self) -> BindingResult<bool> {
        let _busy = self.enter()?;
        let _armed = self.deadline.arm();
        match self.runtime.execute_pending_job() {
            Ok(ran) => Ok(ran),
            Err(job) => {
                let error = job
                    .0
                    .with(|ctx| exception::translate(&ctx, rquickjs::Error::Exception, &self.deadline));
                Err(self.recheck_memory(error))
            }
        }
    }
}

fn released_function(runtime: RuntimeId, slot: u64) -> BindingError {
    BindingError::UseAfterFree(format!("function {} of {} was released", slot, runtime))
}

fn gone(affinity: &Affinity) -> BindingError {
    BindingError::UseAfterFree(format!("{} is closed", affinity.id()))
}

/// Finds the engine behind `affinity`, purging runtimes that were closed
/// from other threads on the way.
pub(crate) fn lookup(affinity: &Affinity) -> BindingResult<Rc<Engine>> {
    affinity.check()?;
    let (found, purged) = ENGINES
        .try_with(|engines| {
            let mut engines = engines.borrow_mut();
            let closed: Vec<RuntimeId> = engines
                .iter()
                .filter(|(_, engine)| engine.affinity.is_closed())
                .map(|(id, _)| *id)
                .collect();
            let purged: Vec<Rc<Engine>> = closed.iter().filter_map(|id| engines.remove(id)).collect();
            (engines.get(&affinity.id()).cloned(), purged)
        })
        .map_err(|_| gone(affinity))?;
    // engine teardown runs finalizers, keep it outside the table borrow
    drop(purged);
    found.ok_or_else(|| gone(affinity))
}

/// Closes the runtime and frees its engine state.
pub(crate) fn teardown(affinity: &Affinity) -> BindingResult<()> {
    let engine = lookup(affinity)?;
    if engine.busy.get() {
        return Err(BindingError::Reentrancy(affinity.id()));
    }
    affinity.close();
    let removed = ENGINES
        .try_with(|engines| engines.borrow_mut().remove(&affinity.id()))
        .ok()
        .flatten();
    drop(engine);
    drop(removed);
    log::debug!("closed {}", affinity.id());
    Ok(())
}

/// Function registry scoped to one context of one engine.
pub(crate) struct Scope<'e> {
    engine: &'e Engine,
    context: u64,
}

impl<'e> Scope<'e> {
    pub(crate) fn new(engine: &'e Engine, context: u64) -> Self {
        Self { engine, context }
    }

    pub(crate) fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub(crate) fn context_id(&self) -> u64 {
        self.context
    }

    pub(crate) fn marshaller(&self) -> Marshaller<'_, Self> {
        Marshaller::new(self)
            .with_max_depth(self.engine.max_depth)
            .with_max_length(self.engine.max_length)
    }
}

impl<'js> FunctionRegistry<'js> for Scope<'_> {
    fn register(&self, ctx: &Ctx<'js>, function: Function<'js>) -> MarshalResult<FunctionRef> {
        let slot = self.engine.next_slot();
        self.engine.functions.borrow_mut().insert(
            slot,
            SavedFunction {
                context: self.context,
                function: Persistent::save(ctx, function),
            },
        );
        Ok(FunctionRef::new(self.engine.affinity.clone(), slot))
    }

    fn resolve(&self, ctx: &Ctx<'js>, function: &FunctionRef) -> MarshalResult<Function<'js>> {
        if function.runtime_id() != self.engine.id() {
            return Err(MarshalError::Unsupported(format!(
                "{:?} belongs to {}, not {}",
                function,
                function.runtime_id(),
                self.engine.id()
            )));
        }
        let saved = self
            .engine
            .functions
            .borrow()
            .get(&function.slot())
            .map(|saved| saved.function.clone())
            .ok_or_else(|| released_function(self.engine.id(), function.slot()))?;
        Ok(saved.restore(ctx)?)
    }
}
