//! Runtime configuration
//!
//! Limits can be given up front through [`RuntimeConfig`] or changed later
//! on the [`Runtime`](crate::Runtime).

use marshal::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
use std::time::Duration;

/// Native stack budget used by [`StackPolicy::NativeProbe`] unless overridden.
pub const DEFAULT_MAX_STACK_SIZE: usize = 256 * 1024;

/// How deep recursion inside the engine is detected.
///
/// The engine measures stack use by comparing native frame addresses
/// against the address recorded on entry. Some toolchains report frame
/// addresses the probe misreads, which shows up as a spurious stack
/// overflow; `Unchecked` turns the probe off for those environments and
/// leaves recursion bounded only by the thread's real stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPolicy {
    /// Trust the engine's frame-address probe with this many bytes of stack
    NativeProbe {
        /// Bytes of native stack the engine may use
        max_bytes: usize,
    },
    /// Disable the probe
    Unchecked,
}

impl StackPolicy {
    /// Value handed to the engine; zero disables its check
    pub(crate) fn engine_limit(self) -> usize {
        match self {
            StackPolicy::NativeProbe { max_bytes } => max_bytes,
            StackPolicy::Unchecked => 0,
        }
    }
}

impl Default for StackPolicy {
    /// `NativeProbe` with [`DEFAULT_MAX_STACK_SIZE`], or `Unchecked` when
    /// built with the `unchecked-stack` feature.
    fn default() -> Self {
        if cfg!(feature = "unchecked-stack") {
            StackPolicy::Unchecked
        } else {
            StackPolicy::NativeProbe {
                max_bytes: DEFAULT_MAX_STACK_SIZE,
            }
        }
    }
}

/// Settings applied when a runtime is created.
///
/// # Example
///
/// ```
/// use engine_shim::{RuntimeConfig, StackPolicy};
/// use std::time::Duration;
///
/// let config = RuntimeConfig::default()
///     .with_memory_limit(Some(16 << 20))
///     .with_time_limit(Some(Duration::from_secs(2)))
///     .with_stack_policy(StackPolicy::Unchecked);
///
/// assert_eq!(config.memory_limit, Some(16 << 20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Heap budget in bytes; `None` for unlimited
    pub memory_limit: Option<usize>,
    /// Wall-clock budget per evaluation or call; `None` for unlimited
    pub time_limit: Option<Duration>,
    /// Stack overflow detection
    pub stack_policy: StackPolicy,
    /// Allocation volume that triggers a GC cycle; `None` keeps the engine default
    pub gc_threshold: Option<usize>,
    /// Nesting limit when converting composite values
    pub max_conversion_depth: usize,
    /// Largest engine array `length` read back to the host
    pub max_array_length: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            memory_limit: None,
            time_limit: None,
            stack_policy: StackPolicy::default(),
            gc_threshold: None,
            max_conversion_depth: DEFAULT_MAX_DEPTH,
            max_array_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl RuntimeConfig {
    /// Set the heap budget
    pub fn with_memory_limit(mut self, limit: Option<usize>) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Set the per-evaluation time budget
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Set the stack policy
    pub fn with_stack_policy(mut self, policy: StackPolicy) -> Self {
        self.stack_policy = policy;
        self
    }

    /// Set the GC threshold
    pub fn with_gc_threshold(mut self, bytes: Option<usize>) -> Self {
        self.gc_threshold = bytes;
        self
    }

    /// Set the conversion nesting limit
    pub fn with_max_conversion_depth(mut self, depth: usize) -> Self {
        self.max_conversion_depth = depth;
        self
    }

    /// Set the array length cap
    pub fn with_max_array_length(mut self, length: usize) -> Self {
        self.max_array_length = length;
        self
    }
}
