//! Error types for marshalling

use core_types::BindingError;
use thiserror::Error;

/// Why a conversion failed
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The value has no counterpart on the other side
    #[error("{0}")]
    Unsupported(String),

    /// Nesting exceeded the depth limit (also how cycles surface)
    #[error("value nested deeper than {0} levels (cyclic structure?)")]
    TooDeep(usize),

    /// An array reported a `length` above the cap
    #[error("array length exceeds the limit of {0} elements")]
    TooLong(usize),

    /// The engine failed while building or reading a value
    #[error(transparent)]
    Engine(#[from] rquickjs::Error),

    /// A handle check failed (foreign or released function)
    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl MarshalError {
    /// Converts everything except engine failures, which need the
    /// context to be translated.
    pub fn into_binding(self) -> Result<BindingError, rquickjs::Error> {
        match self {
            MarshalError::Unsupported(what) => Ok(BindingError::TypeConversion(what)),
            e @ (MarshalError::TooDeep(_) | MarshalError::TooLong(_)) => {
                Ok(BindingError::TypeConversion(e.to_string()))
            }
            MarshalError::Binding(e) => Ok(e),
            MarshalError::Engine(e) => Err(e),
        }
    }
}

/// Result type for marshalling
pub type MarshalResult<T> = Result<T, MarshalError>;
