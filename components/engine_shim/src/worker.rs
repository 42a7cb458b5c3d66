//! One JS function served from a dedicated thread
//!
//! [`ThreadedFunction`] owns a runtime on its own thread and forwards calls
//! to it over a channel, so any thread may call the function. Calls are
//! serialized by a lock and answered in order.

use crate::config::{RuntimeConfig, StackPolicy};
use crate::context::Context;
use crate::function::FunctionExt;
use crate::runtime::Runtime;
use crate::stats::MemoryStats;
use core_types::{BindingError, BindingResult, FunctionRef, Value};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Reply<T> = Sender<BindingResult<T>>;
type SendableFn = Box<dyn Fn(&[Value]) -> BindingResult<Value> + Send>;

enum Command {
    Call {
        args: Vec<Value>,
        collect: bool,
        reply: Reply<Value>,
    },
    Eval {
        source: String,
        reply: Reply<Value>,
    },
    AddCallable {
        name: String,
        callable: SendableFn,
        reply: Reply<()>,
    },
    SetMemoryLimit {
        limit: Option<usize>,
        reply: Reply<()>,
    },
    SetTimeLimit {
        limit: Option<Duration>,
        reply: Reply<()>,
    },
    SetStackPolicy {
        policy: StackPolicy,
        reply: Reply<()>,
    },
    Memory {
        reply: Reply<MemoryStats>,
    },
    Gc {
        reply: Reply<()>,
    },
    ExecutePendingJob {
        reply: Reply<bool>,
    },
}

/// A JS function living on its own thread.
///
/// Construction evaluates `source` in a fresh runtime on a new thread and
/// looks up the global `name`, which must be a function. Arguments and
/// results cross the thread boundary as host values; a result that contains
/// a function handle fails with `TypeConversion`, since the handle could
/// only be used on the worker thread.
///
/// By default a GC cycle runs after every call, which keeps the worker's
/// heap small between calls at some cost per call.
///
/// # Example
///
/// ```no_run
/// use engine_shim::{ThreadedFunction, Value};
///
/// let add = ThreadedFunction::new("add", "function add(a, b) { return a + b; }").unwrap();
/// let sum = std::thread::spawn(move || add.call(&[1.into(), 2.into()]))
///     .join()
///     .unwrap()
///     .unwrap();
/// assert_eq!(sum, Value::Int(3));
/// ```
pub struct ThreadedFunction {
    name: String,
    commands: Option<Sender<Command>>,
    thread: Option<JoinHandle<()>>,
    lock: Mutex<()>,
}

impl ThreadedFunction {
    /// Starts a worker with default runtime settings.
    pub fn new(name: &str, source: &str) -> BindingResult<Self> {
        Self::with_config(name, source, RuntimeConfig::default())
    }

    /// Starts a worker whose runtime uses `config`.
    pub fn with_config(name: &str, source: &str, config: RuntimeConfig) -> BindingResult<Self> {
        let (commands, inbox) = channel::unbounded();
        let (ready_tx, ready_rx) = channel::bounded(1);
        let worker_name = name.to_string();
        let worker_source = source.to_string();

        let thread = thread::Builder::new()
            .name(format!("qjs-fn-{}", name))
            .spawn(move || match Worker::start(&worker_name, &worker_source, config) {
                Ok(worker) => {
                    let _ = ready_tx.send(Ok(()));
                    worker.serve(inbox);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .map_err(|err| BindingError::host(format!("failed to spawn worker thread: {}", err)))?;

        let started = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(BindingError::host("worker thread exited during start")));
        if let Err(err) = started {
            let _ = thread.join();
            return Err(err);
        }

        log::debug!("started threaded function {}", name);
        Ok(Self {
            name: name.to_string(),
            commands: Some(commands),
            thread: Some(thread),
            lock: Mutex::new(()),
        })
    }

    /// Name of the served global
    pub fn name(&self) -> &str {
        &self.name
    }

    fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> BindingResult<T> {
        let _serial = self.lock.lock();
        let (reply, answer) = channel::bounded(1);
        let stopped = || BindingError::UseAfterFree(format!("worker for {} has stopped", self.name));
        self.commands
            .as_ref()
            .ok_or_else(stopped)?
            .send(command(reply))
            .map_err(|_| stopped())?;
        answer.recv().map_err(|_| stopped())?
    }

    /// Calls the function, then runs a GC cycle.
    pub fn call(&self, args: &[Value]) -> BindingResult<Value> {
        self.call_with_gc(args, true)
    }

    /// Calls the function, optionally skipping the GC cycle afterwards.
    pub fn call_with_gc(&self, args: &[Value], collect: bool) -> BindingResult<Value> {
        self.request(|reply| Command::Call {
            args: args.to_vec(),
            collect,
            reply,
        })
    }

    /// Evaluates `source` in the worker's context.
    pub fn eval(&self, source: &str) -> BindingResult<Value> {
        self.request(|reply| Command::Eval {
            source: source.to_string(),
            reply,
        })
    }

    /// Exposes a host function to the worker's context as the global `name`.
    pub fn add_callable<F>(&self, name: &str, callable: F) -> BindingResult<()>
    where
        F: Fn(&[Value]) -> BindingResult<Value> + Send + 'static,
    {
        self.request(|reply| Command::AddCallable {
            name: name.to_string(),
            callable: Box::new(callable),
            reply,
        })
    }

    /// See [`Runtime::set_memory_limit`]
    pub fn set_memory_limit(&self, limit: Option<usize>) -> BindingResult<()> {
        self.request(|reply| Command::SetMemoryLimit { limit, reply })
    }

    /// See [`Runtime::set_time_limit`]
    pub fn set_time_limit(&self, limit: Option<Duration>) -> BindingResult<()> {
        self.request(|reply| Command::SetTimeLimit { limit, reply })
    }

    /// See [`Runtime::set_stack_policy`]
    pub fn set_stack_policy(&self, policy: StackPolicy) -> BindingResult<()> {
        self.request(|reply| Command::SetStackPolicy { policy, reply })
    }

    /// See [`Runtime::memory`]
    pub fn memory(&self) -> BindingResult<MemoryStats> {
        self.request(|reply| Command::Memory { reply })
    }

    /// See [`Runtime::gc`]
    pub fn gc(&self) -> BindingResult<()> {
        self.request(|reply| Command::Gc { reply })
    }

    /// See [`Runtime::execute_pending_job`]
    pub fn execute_pending_job(&self) -> BindingResult<bool> {
        self.request(|reply| Command::ExecutePendingJob { reply })
    }
}

impl Drop for ThreadedFunction {
    fn drop(&mut self) {
        // closing the channel ends the serve loop
        self.commands.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("worker for {} panicked", self.name);
            }
        }
    }
}

impl std::fmt::Debug for ThreadedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedFunction")
            .field("name", &self.name)
            .field("running", &self.commands.is_some())
            .finish()
    }
}

// field order is drop order: the handle and context go before the runtime
struct Worker {
    function: FunctionRef,
    context: Context,
    runtime: Runtime,
}

impl Worker {
    fn start(name: &str, source: &str, config: RuntimeConfig) -> BindingResult<Self> {
        let runtime = Runtime::with_config(config)?;
        let context = runtime.create_context()?;
        context.execute(source)?;
        let function = match context.get(name)? {
            Value::Function(function) => function,
            other => {
                return Err(BindingError::conversion(format!(
                    "{} is a {}, not a function",
                    name,
                    other.type_of()
                )))
            }
        };
        Ok(Self {
            function,
            context,
            runtime,
        })
    }

    fn serve(self, inbox: Receiver<Command>) {
        for command in inbox.iter() {
            match command {
                Command::Call {
                    args,
                    collect,
                    reply,
                } => {
                    let result = self.function.call(&args);
                    if collect {
                        if let Err(err) = self.runtime.gc() {
                            log::warn!("gc after call failed: {}", err);
                        }
                    }
                    let _ = reply.send(result.and_then(detached));
                }
                Command::Eval { source, reply } => {
                    let _ = reply.send(self.context.eval(&source).and_then(detached));
                }
                Command::AddCallable {
                    name,
                    callable,
                    reply,
                } => {
                    let _ = reply.send(self.context.add_callable(&name, callable));
                }
                Command::SetMemoryLimit { limit, reply } => {
                    let _ = reply.send(self.runtime.set_memory_limit(limit));
                }
                Command::SetTimeLimit { limit, reply } => {
                    let _ = reply.send(self.runtime.set_time_limit(limit));
                }
                Command::SetStackPolicy { policy, reply } => {
                    let _ = reply.send(self.runtime.set_stack_policy(policy));
                }
                Command::Memory { reply } => {
                    let _ = reply.send(self.runtime.memory());
                }
                Command::Gc { reply } => {
                    let _ = reply.send(self.runtime.gc());
                }
                Command::ExecutePendingJob { reply } => {
                    let _ = reply.send(self.runtime.execute_pending_job());
                }
            }
        }
    }
}

/// Refuses results that would carry a worker-bound handle off the thread.
fn detached(value: Value) -> BindingResult<Value> {
    if value.contains_function() {
        return Err(BindingError::conversion(
            "result contains a function, which cannot leave the worker thread",
        ));
    }
    Ok(value)
}
