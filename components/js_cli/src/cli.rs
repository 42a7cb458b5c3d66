//! Command-line arguments

use clap::Parser;
use engine_shim::{RuntimeConfig, StackPolicy};
use std::time::Duration;

/// QuickJS host binding
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "qjs-bind", version, about = "Run JavaScript through the QuickJS host binding")]
pub struct Cli {
    /// JavaScript file to execute
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<String>,

    /// Inline JavaScript to evaluate
    #[arg(short, long, value_name = "CODE")]
    pub eval: Option<String>,

    /// Start the interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Heap budget of the runtime in bytes
    #[arg(long, value_name = "BYTES")]
    pub memory_limit: Option<usize>,

    /// Wall-clock budget per evaluation in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_limit_ms: Option<u64>,

    /// Native stack budget in bytes for the engine's stack probe
    #[arg(long, value_name = "BYTES")]
    pub max_stack_size: Option<usize>,

    /// Disable the engine's native stack probe
    #[arg(long, conflicts_with = "max_stack_size")]
    pub no_stack_probe: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Print memory statistics after running
    #[arg(long)]
    pub stats: bool,

    /// Log runtime activity to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments for running one file
    pub fn with_file(file: String) -> Self {
        Self {
            file: Some(file),
            ..Self::default()
        }
    }

    /// Arguments for evaluating one snippet
    pub fn with_eval(code: String) -> Self {
        Self {
            eval: Some(code),
            ..Self::default()
        }
    }

    /// Runtime settings selected by the flags
    pub fn runtime_config(&self) -> RuntimeConfig {
        let stack_policy = if self.no_stack_probe {
            StackPolicy::Unchecked
        } else if let Some(max_bytes) = self.max_stack_size {
            StackPolicy::NativeProbe { max_bytes }
        } else {
            StackPolicy::default()
        };

        RuntimeConfig::default()
            .with_memory_limit(self.memory_limit)
            .with_time_limit(self.time_limit_ms.map(Duration::from_millis))
            .with_stack_policy(stack_policy)
    }
}
