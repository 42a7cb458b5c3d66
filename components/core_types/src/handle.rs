//! Runtime identity, thread affinity and handle lifetimes.
//!
//! Engine objects never cross the boundary as pointers. A runtime is
//! identified by a [`RuntimeId`] and described by a shared [`Affinity`]
//! record; contexts and functions are ids validated against it. The
//! record is the only piece of runtime state that may be touched from
//! any thread: it is immutable apart from an atomic state flag and a
//! queue of releases waiting for the owning thread.

use crate::{BindingError, BindingResult};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

static NEXT_RUNTIME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique runtime identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(u64);

impl RuntimeId {
    fn next() -> Self {
        RuntimeId(NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runtime#{}", self.0)
    }
}

/// Lifecycle of a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Created and usable
    Active,
    /// Torn down; every operation fails with `UseAfterFree`
    Closed,
}

/// A handle dropped somewhere that the owning thread still has to free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// A context slot
    Context(u64),
    /// A function slot
    Function(u64),
}

/// Identity and ownership record of one runtime.
///
/// # Examples
///
/// ```
/// use core_types::{Affinity, BindingError, RuntimeState};
///
/// let affinity = Affinity::new();
/// assert!(affinity.check().is_ok());
///
/// affinity.close();
/// assert_eq!(affinity.state(), RuntimeState::Closed);
/// assert!(matches!(affinity.check(), Err(BindingError::UseAfterFree(_))));
/// ```
pub struct Affinity {
    id: RuntimeId,
    owner: ThreadId,
    closed: AtomicBool,
    pending: Mutex<Vec<Release>>,
}

impl Affinity {
    /// Creates a record owned by the calling thread.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: RuntimeId::next(),
            owner: thread::current().id(),
            closed: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Runtime id
    pub fn id(&self) -> RuntimeId {
        self.id
    }

    /// Thread that created the runtime
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Current lifecycle state
    pub fn state(&self) -> RuntimeState {
        if self.closed.load(Ordering::Acquire) {
            RuntimeState::Closed
        } else {
            RuntimeState::Active
        }
    }

    /// Whether the runtime has been torn down
    pub fn is_closed(&self) -> bool {
        self.state() == RuntimeState::Closed
    }

    /// Fails with `ThreadAffinity` unless called from the owning thread.
    pub fn check_thread(&self) -> BindingResult<()> {
        let caller = thread::current().id();
        if caller != self.owner {
            return Err(BindingError::ThreadAffinity {
                runtime: self.id,
                owner: self.owner,
                caller,
            });
        }
        Ok(())
    }

    /// Thread check followed by liveness check.
    pub fn check(&self) -> BindingResult<()> {
        self.check_thread()?;
        if self.is_closed() {
            return Err(BindingError::UseAfterFree(format!("{} is closed", self.id)));
        }
        Ok(())
    }

    /// Moves the runtime to `Closed`. Returns false if it already was.
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Queues a release for the owning thread. Ignored once closed, since
    /// teardown frees everything anyway.
    pub fn defer_release(&self, release: Release) {
        if !self.is_closed() {
            self.pending.lock().push(release);
        }
    }

    /// Drains queued releases.
    pub fn take_released(&self) -> Vec<Release> {
        std::mem::take(&mut *self.pending.lock())
    }
}

impl fmt::Debug for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Affinity")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("state", &self.state())
            .finish()
    }
}

struct FunctionKey {
    runtime: Arc<Affinity>,
    slot: u64,
}

impl Drop for FunctionKey {
    fn drop(&mut self) {
        self.runtime.defer_release(Release::Function(self.slot));
    }
}

/// Opaque handle to an engine-side function.
///
/// Clones share one registration; the engine function is released once
/// the last clone is dropped. Calling it requires the owning thread and a
/// live runtime.
#[derive(Clone)]
pub struct FunctionRef {
    key: Arc<FunctionKey>,
}

impl FunctionRef {
    /// Wraps a function slot registered in `runtime`'s arena.
    pub fn new(runtime: Arc<Affinity>, slot: u64) -> Self {
        Self {
            key: Arc::new(FunctionKey { runtime, slot }),
        }
    }

    /// Affinity record of the owning runtime
    pub fn runtime(&self) -> &Arc<Affinity> {
        &self.key.runtime
    }

    /// Id of the owning runtime
    pub fn runtime_id(&self) -> RuntimeId {
        self.key.runtime.id()
    }

    /// Arena slot of the function
    pub fn slot(&self) -> u64 {
        self.key.slot
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        self.runtime_id() == other.runtime_id() && self.slot() == other.slot()
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRef({}, fn#{})", self.runtime_id(), self.slot())
    }
}
