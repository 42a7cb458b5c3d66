//! Error taxonomy of the binding.
//!
//! Every failure crossing the host/engine boundary is one of the
//! [`BindingError`] variants. Thrown JavaScript values are carried as a
//! [`JsException`] inside [`BindingError::Engine`].

use crate::source::{parse_stack, StackFrame};
use crate::RuntimeId;
use std::fmt;
use std::thread::ThreadId;
use thiserror::Error;

/// The kind of a thrown JavaScript value.
///
/// These correspond to JavaScript's built-in error constructors, plus
/// [`ErrorKind::Thrown`] for a `throw` of something that is not an `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Plain `Error`
    Error,
    /// Syntax error in JavaScript code
    SyntaxError,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Error in eval() function
    EvalError,
    /// Error in URI handling functions
    URIError,
    /// Several errors wrapped together
    AggregateError,
    /// Internal engine error (stack overflow, out of memory, interrupted)
    InternalError,
    /// A non-`Error` value was thrown, e.g. `throw 42`
    Thrown,
    /// An `Error` subclass with a user-defined name
    Other(String),
}

impl ErrorKind {
    /// Maps the `name` property of an engine error object to a kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Error" => ErrorKind::Error,
            "SyntaxError" => ErrorKind::SyntaxError,
            "TypeError" => ErrorKind::TypeError,
            "ReferenceError" => ErrorKind::ReferenceError,
            "RangeError" => ErrorKind::RangeError,
            "EvalError" => ErrorKind::EvalError,
            "URIError" => ErrorKind::URIError,
            "AggregateError" => ErrorKind::AggregateError,
            "InternalError" => ErrorKind::InternalError,
            other => ErrorKind::Other(other.to_string()),
        }
    }

    /// The constructor name as JavaScript reports it.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::URIError => "URIError",
            ErrorKind::AggregateError => "AggregateError",
            ErrorKind::InternalError => "InternalError",
            ErrorKind::Thrown => "Uncaught",
            ErrorKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JavaScript exception caught at the binding boundary.
///
/// # Examples
///
/// ```
/// use core_types::{JsException, ErrorKind};
///
/// let error = JsException::new(ErrorKind::Error, "x")
///     .with_stack("    at f (<eval>:1:22)\n");
///
/// assert_eq!(error.message, "x");
/// assert_eq!(error.frames().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsException {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Raw stack text as produced by the engine
    pub stack: Option<String>,
}

impl JsException {
    /// Creates an exception without stack text.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: None,
        }
    }

    /// Attaches raw stack text. Empty text is ignored.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        let stack = stack.into();
        if !stack.trim().is_empty() {
            self.stack = Some(stack);
        }
        self
    }

    /// Parses the stack text into frames, innermost first.
    pub fn frames(&self) -> Vec<StackFrame> {
        self.stack.as_deref().map(parse_stack).unwrap_or_default()
    }
}

impl fmt::Display for JsException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Which configured budget an evaluation ran out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// The runtime's memory limit
    Memory,
    /// The runtime's time limit
    Time,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Memory => f.write_str("memory limit"),
            LimitKind::Time => f.write_str("time limit"),
        }
    }
}

/// Every failure surfaced by the binding.
///
/// None of these are retried by the binding; the caller decides.
#[derive(Debug, Clone, Error)]
pub enum BindingError {
    /// A value has no equivalent on the other side of the boundary
    #[error("type conversion failed: {0}")]
    TypeConversion(String),

    /// JavaScript code threw
    #[error("{0}")]
    Engine(JsException),

    /// Native stack exhaustion during evaluation
    #[error("stack overflow: {0}")]
    Recursion(String),

    /// The memory or time budget ran out
    #[error("{0} exceeded")]
    ResourceLimitExceeded(LimitKind),

    /// The runtime was used from a thread other than its creator
    #[error("{runtime} is owned by thread {owner:?} but was used from {caller:?}")]
    ThreadAffinity {
        /// Runtime that was touched
        runtime: RuntimeId,
        /// Thread that created it
        owner: ThreadId,
        /// Thread that attempted the operation
        caller: ThreadId,
    },

    /// The runtime, context or function has already been torn down
    #[error("use after free: {0}")]
    UseAfterFree(String),

    /// An operation was attempted while the runtime was already executing
    #[error("{0} is already executing")]
    Reentrancy(RuntimeId),

    /// A host callable reported a failure
    #[error("host callable failed: {0}")]
    Host(String),
}

impl BindingError {
    /// Shorthand for a host callable failure.
    pub fn host(message: impl Into<String>) -> Self {
        BindingError::Host(message.into())
    }

    /// Shorthand for a conversion failure.
    pub fn conversion(message: impl Into<String>) -> Self {
        BindingError::TypeConversion(message.into())
    }

    /// The thrown exception, if this error came from JavaScript.
    pub fn exception(&self) -> Option<&JsException> {
        match self {
            BindingError::Engine(exception) => Some(exception),
            _ => None,
        }
    }
}

impl From<JsException> for BindingError {
    fn from(exception: JsException) -> Self {
        BindingError::Engine(exception)
    }
}

/// Result type for binding operations
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_round_trips_names() {
        for name in ["Error", "TypeError", "SyntaxError", "InternalError"] {
            assert_eq!(ErrorKind::from_name(name).as_str(), name);
        }
        assert_eq!(
            ErrorKind::from_name("ValidationError"),
            ErrorKind::Other("ValidationError".to_string())
        );
    }

    #[test]
    fn test_exception_display() {
        let error = JsException::new(ErrorKind::RangeError, "bad length");
        assert_eq!(error.to_string(), "RangeError: bad length");
        assert_eq!(BindingError::from(error).to_string(), "RangeError: bad length");
    }

    #[test]
    fn test_blank_stack_is_dropped() {
        let error = JsException::new(ErrorKind::Error, "x").with_stack("  \n");
        assert!(error.stack.is_none());
        assert!(error.frames().is_empty());
    }

    #[test]
    fn test_limit_display() {
        let error = BindingError::ResourceLimitExceeded(LimitKind::Time);
        assert_eq!(error.to_string(), "time limit exceeded");
    }
}
