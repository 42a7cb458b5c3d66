//! Session orchestration for JavaScript execution
//!
//! A [`Session`] owns one engine runtime and one context for the lifetime
//! of the process. It installs a `print` global and a minimal `console`,
//! evaluates sources, drains the promise job queue after each evaluation
//! and formats results for display.

use crate::error::CliResult;
use engine_shim::{Context, MemoryStats, Runtime, RuntimeConfig, Value};
use std::io::Write;

const CONSOLE_SHIM: &str = r#"
globalThis.console = {
    log: (...args) => print(...args),
    info: (...args) => print(...args),
    warn: (...args) => print(...args),
    error: (...args) => print(...args),
};
"#;

/// One runtime plus its global context
pub struct Session {
    runtime: Runtime,
    context: Context,
    json_output: bool,
}

impl Session {
    /// Create a session with `config` applied to its runtime
    ///
    /// # Example
    /// ```no_run
    /// use js_cli::Session;
    /// use engine_shim::RuntimeConfig;
    ///
    /// let session = Session::new(RuntimeConfig::default()).unwrap();
    /// ```
    pub fn new(config: RuntimeConfig) -> CliResult<Self> {
        let runtime = Runtime::with_config(config)?;
        let context = runtime.create_context()?;
        context.add_callable("print", |args| {
            let line = args.iter().map(format_print).collect::<Vec<_>>().join(" ");
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", line);
            Ok(Value::Undefined)
        })?;
        context.execute(CONSOLE_SHIM)?;
        Ok(Self {
            runtime,
            context,
            json_output: false,
        })
    }

    /// Print results as JSON
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Check if JSON output is enabled
    pub fn is_json_output(&self) -> bool {
        self.json_output
    }

    /// Execute a JavaScript file
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or execution fails
    ///
    /// # Example
    /// ```no_run
    /// use js_cli::Session;
    /// use engine_shim::RuntimeConfig;
    ///
    /// let mut session = Session::new(RuntimeConfig::default()).unwrap();
    /// let result = session.execute_file("example.js").unwrap();
    /// ```
    pub fn execute_file(&mut self, path: &str) -> CliResult<Value> {
        let source = std::fs::read_to_string(path)?;
        log::debug!("executing {} ({} bytes)", path, source.len());
        self.execute_string(&source)
    }

    /// Execute a JavaScript source string and run queued promise jobs
    ///
    /// # Example
    /// ```
    /// use js_cli::Session;
    /// use engine_shim::{RuntimeConfig, Value};
    ///
    /// let mut session = Session::new(RuntimeConfig::default()).unwrap();
    /// assert_eq!(session.execute_string("6 * 7").unwrap(), Value::Int(42));
    /// ```
    pub fn execute_string(&mut self, source: &str) -> CliResult<Value> {
        let result = self.context.eval(source)?;
        let jobs = self.runtime.run_pending_jobs()?;
        if jobs > 0 {
            log::debug!("ran {} pending jobs", jobs);
        }
        Ok(result)
    }

    /// Render a result the way the session prints it
    pub fn render(&self, value: &Value) -> CliResult<String> {
        if self.json_output {
            Ok(serde_json::to_string(&value.to_json()?)?)
        } else {
            Ok(format_value(value))
        }
    }

    /// Start the REPL (Read-Eval-Print Loop)
    ///
    /// # Example
    /// ```no_run
    /// use js_cli::Session;
    /// use engine_shim::RuntimeConfig;
    ///
    /// let mut session = Session::new(RuntimeConfig::default()).unwrap();
    /// session.repl().unwrap();
    /// ```
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }

    /// Memory statistics of the session's runtime
    pub fn stats(&self) -> CliResult<MemoryStats> {
        Ok(self.runtime.memory()?)
    }

    /// Run a garbage collection cycle
    pub fn gc(&self) -> CliResult<()> {
        Ok(self.runtime.gc()?)
    }

    /// The session's context
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The session's runtime
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

/// Format a value for interactive display, roughly like a JS console
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(format_value).collect();
            format!("[ {} ]", parts.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(key, item)| format!("{}: {}", key, format_value(item)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        Value::Function(_) => "[Function]".to_string(),
        other => other.to_string(),
    }
}

fn format_print(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => format_value(other),
    }
}

/// Memory statistics as printed by `--stats`
pub fn format_stats(stats: &MemoryStats) -> String {
    format!(
        "memory: {} bytes in {} allocations, {} objects, {} strings, {} functions",
        stats.malloc_size,
        stats.malloc_count,
        stats.object_count,
        stats.string_count,
        stats.function_count
    )
}
