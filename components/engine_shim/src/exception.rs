//! Translation of engine failures into [`BindingError`]
//!
//! A thrown value is read out of the context right after the failing call.
//! Error instances keep their name, message and stack; anything else that
//! was thrown becomes [`ErrorKind::Thrown`] with its string form. Engine
//! conditions that are really host limits are picked out by their message.
//!
//! Running out of memory does not always produce the engine's own
//! `InternalError: out of memory`: when even that object cannot be
//! allocated the engine throws a bare `null`. With a memory limit in force,
//! [`classify_memory`] treats that, and any engine error raised while the
//! heap sits close to the limit, as [`LimitKind::Memory`].

use crate::limits::Deadline;
use core_types::{BindingError, ErrorKind, JsException, LimitKind};
use rquickjs::{Coerced, Ctx, Object, Type, Value as JsValue};

/// Translates a failure that happened while running inside `ctx`.
pub(crate) fn translate(ctx: &Ctx<'_>, error: rquickjs::Error, deadline: &Deadline) -> BindingError {
    if deadline.take_tripped() {
        // drop the uncatchable interrupt exception
        let _ = ctx.catch();
        return BindingError::ResourceLimitExceeded(LimitKind::Time);
    }
    match error {
        rquickjs::Error::Exception => classify(describe(ctx.catch())),
        rquickjs::Error::Allocation => BindingError::ResourceLimitExceeded(LimitKind::Memory),
        e @ (rquickjs::Error::FromJs { .. } | rquickjs::Error::IntoJs { .. }) => {
            BindingError::TypeConversion(e.to_string())
        }
        other => engine_failure(other),
    }
}

/// Failure outside any context, e.g. while creating one.
pub(crate) fn engine_failure(error: rquickjs::Error) -> BindingError {
    match error {
        rquickjs::Error::Allocation => BindingError::ResourceLimitExceeded(LimitKind::Memory),
        other => BindingError::Engine(JsException::new(ErrorKind::InternalError, other.to_string())),
    }
}

/// Share of the memory limit above which an engine error counts as memory
/// exhaustion.
const NEAR_LIMIT: f64 = 0.9;

/// Second pass over a failure, made with the heap usage in hand.
pub(crate) fn classify_memory(error: BindingError, limit: usize, used: i64) -> BindingError {
    let near_limit = used as f64 >= limit as f64 * NEAR_LIMIT;
    match &error {
        BindingError::Engine(exception) if is_allocation_fallback(exception) => {
            BindingError::ResourceLimitExceeded(LimitKind::Memory)
        }
        BindingError::Engine(exception)
            if near_limit
                && matches!(
                    exception.kind,
                    ErrorKind::InternalError | ErrorKind::RangeError | ErrorKind::Thrown
                ) =>
        {
            BindingError::ResourceLimitExceeded(LimitKind::Memory)
        }
        _ => error,
    }
}

/// What the engine throws when it cannot allocate the error object itself.
fn is_allocation_fallback(exception: &JsException) -> bool {
    exception.kind == ErrorKind::Thrown
        && exception.stack.is_none()
        && matches!(exception.message.as_str(), "null" | "<Uninitialized>")
}

fn describe(thrown: JsValue<'_>) -> JsException {
    if matches!(thrown.type_of(), Type::Exception) {
        if let Some(object) = thrown.as_object() {
            return from_error_object(object);
        }
    }
    let message = thrown
        .get::<Coerced<String>>()
        .map(|text| text.0)
        .unwrap_or_else(|_| format!("<{:?}>", thrown.type_of()));
    JsException::new(ErrorKind::Thrown, message)
}

fn from_error_object(object: &Object<'_>) -> JsException {
    let text = |key: &str| object.get::<_, Option<String>>(key).ok().flatten();
    let kind = text("name")
        .map(|name| ErrorKind::from_name(&name))
        .unwrap_or(ErrorKind::Error);
    let exception = JsException::new(kind, text("message").unwrap_or_default());
    match text("stack") {
        Some(stack) => exception.with_stack(stack),
        None => exception,
    }
}

fn classify(exception: JsException) -> BindingError {
    let message = exception.message.as_str();
    match exception.kind {
        ErrorKind::InternalError if message.contains("stack overflow") => {
            BindingError::Recursion(exception.to_string())
        }
        ErrorKind::RangeError if message.contains("call stack size exceeded") => {
            BindingError::Recursion(exception.to_string())
        }
        ErrorKind::InternalError | ErrorKind::RangeError if message == "out of memory" => {
            BindingError::ResourceLimitExceeded(LimitKind::Memory)
        }
        ErrorKind::InternalError if message == "interrupted" => {
            BindingError::ResourceLimitExceeded(LimitKind::Time)
        }
        _ => BindingError::Engine(exception),
    }
}
