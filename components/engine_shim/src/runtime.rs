//! Runtime handle

use crate::arena::{self, Engine};
use crate::config::{RuntimeConfig, StackPolicy};
use crate::context::Context;
use crate::stats::MemoryStats;
use core_types::{Affinity, BindingError, BindingResult, RuntimeId, RuntimeState};
use std::sync::Arc;
use std::time::Duration;

/// An engine runtime: one heap, one garbage collector, any number of
/// contexts.
///
/// The handle itself is `Send + Sync`, but the runtime belongs to the thread
/// that created it. Every method fails with
/// [`BindingError::ThreadAffinity`] when called from any other thread, and
/// with [`BindingError::UseAfterFree`] once the runtime is closed.
///
/// Dropping the handle closes the runtime. Dropped on a foreign thread it is
/// only marked closed; the owner thread frees it the next time it touches
/// any runtime.
#[derive(Debug)]
pub struct Runtime {
    affinity: Arc<Affinity>,
}

impl Runtime {
    /// Creates a runtime with default settings.
    pub fn new() -> BindingResult<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a runtime with `config` applied.
    pub fn with_config(config: RuntimeConfig) -> BindingResult<Self> {
        let affinity = Engine::create(&config)?;
        Ok(Self { affinity })
    }

    /// Runtime id
    pub fn id(&self) -> RuntimeId {
        self.affinity.id()
    }

    /// Active until [`close`](Self::close) or drop
    pub fn state(&self) -> RuntimeState {
        self.affinity.state()
    }

    /// Creates a fresh global scope in this runtime.
    pub fn create_context(&self) -> BindingResult<Context> {
        let engine = arena::lookup(&self.affinity)?;
        let id = engine.create_context()?;
        Ok(Context::new(self.affinity.clone(), id))
    }

    /// Sets or clears the heap budget. Allocation beyond it fails the
    /// running evaluation with `ResourceLimitExceeded(Memory)`.
    pub fn set_memory_limit(&self, limit: Option<usize>) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.set_memory_limit(limit)
    }

    /// Sets or clears the wall-clock budget of each evaluation, call or job.
    pub fn set_time_limit(&self, limit: Option<Duration>) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.set_time_limit(limit)
    }

    /// Current wall-clock budget
    pub fn time_limit(&self) -> BindingResult<Option<Duration>> {
        Ok(arena::lookup(&self.affinity)?.time_limit())
    }

    /// Changes how stack overflow is detected.
    pub fn set_stack_policy(&self, policy: StackPolicy) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.with_runtime(|rt| rt.set_max_stack_size(policy.engine_limit()))
    }

    /// Sets the allocation volume that triggers a GC cycle.
    pub fn set_gc_threshold(&self, bytes: usize) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.with_runtime(|rt| rt.set_gc_threshold(bytes))
    }

    /// Allocator counters
    pub fn memory(&self) -> BindingResult<MemoryStats> {
        arena::lookup(&self.affinity)?.with_runtime(MemoryStats::read)
    }

    /// Runs a full garbage collection cycle.
    pub fn gc(&self) -> BindingResult<()> {
        arena::lookup(&self.affinity)?.with_runtime(|rt| rt.run_gc())
    }

    /// Whether promise jobs are queued
    pub fn is_job_pending(&self) -> BindingResult<bool> {
        arena::lookup(&self.affinity)?.with_runtime(|rt| rt.is_job_pending())
    }

    /// Runs one queued promise job. Returns false when the queue was empty.
    ///
    /// An exception escaping the job is reported like an evaluation error.
    pub fn execute_pending_job(&self) -> BindingResult<bool> {
        arena::lookup(&self.affinity)?.execute_pending_job()
    }

    /// Runs queued jobs until the queue is empty; returns how many ran.
    pub fn run_pending_jobs(&self) -> BindingResult<usize> {
        let mut ran = 0;
        while self.execute_pending_job()? {
            ran += 1;
        }
        Ok(ran)
    }

    /// Tears the runtime down. Contexts and function handles obtained from
    /// it fail with `UseAfterFree` afterwards, as does a second `close`.
    pub fn close(&self) -> BindingResult<()> {
        arena::teardown(&self.affinity)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.affinity.is_closed() {
            return;
        }
        match arena::teardown(&self.affinity) {
            Ok(()) => {}
            Err(BindingError::ThreadAffinity { caller, .. }) => {
                log::warn!(
                    "{} dropped on foreign thread {:?}; deferring teardown to its owner",
                    self.affinity.id(),
                    caller
                );
                self.affinity.close();
            }
            Err(err) => {
                log::debug!("{} dropped while unavailable: {}", self.affinity.id(), err);
                self.affinity.close();
            }
        }
    }
}
