//! QuickJS binding CLI library
//!
//! Provides the [`Session`] driver and supporting modules for the
//! `qjs-bind` executable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod logger;
pub mod repl;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::Session;
