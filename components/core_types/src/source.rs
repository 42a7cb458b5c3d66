//! Stack frame types parsed from engine stack traces.
//!
//! The engine reports stacks as text, one frame per line:
//!
//! ```text
//!     at add (<input>:1:31)
//!     at <eval> (<input>:3)
//!     at map (native)
//! ```

/// Represents a single frame in a JavaScript call stack.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame {
///     function_name: Some("myFunction".to_string()),
///     source_url: Some("main.js".to_string()),
///     line: Some(25),
///     column: Some(10),
/// };
///
/// assert_eq!(frame.function_name, Some("myFunction".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for anonymous functions
    pub function_name: Option<String>,
    /// Script name, or `native` for built-ins
    pub source_url: Option<String>,
    /// 1-based line, when the engine reports one
    pub line: Option<u32>,
    /// 1-based column, when the engine reports one
    pub column: Option<u32>,
}

/// Parses engine stack text into frames. Lines that are not frames are skipped.
///
/// ```
/// use core_types::parse_stack;
///
/// let frames = parse_stack("    at f (<input>:2:9)\n    at <eval> (<input>:4)\n");
/// assert_eq!(frames[0].function_name.as_deref(), Some("f"));
/// assert_eq!(frames[0].column, Some(9));
/// assert_eq!(frames[1].line, Some(4));
/// assert_eq!(frames[1].column, None);
/// ```
pub fn parse_stack(stack: &str) -> Vec<StackFrame> {
    stack.lines().filter_map(parse_frame).collect()
}

fn parse_frame(line: &str) -> Option<StackFrame> {
    let frame = line.trim().strip_prefix("at ")?;

    let (name, location) = match frame.rfind(" (") {
        Some(idx) if frame.ends_with(')') => (
            Some(&frame[..idx]),
            &frame[idx + 2..frame.len() - 1],
        ),
        _ => (None, frame),
    };

    let (source_url, line, column) = parse_location(location);
    Some(StackFrame {
        function_name: name
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != "<anonymous>")
            .map(str::to_string),
        source_url,
        line,
        column,
    })
}

fn parse_location(location: &str) -> (Option<String>, Option<u32>, Option<u32>) {
    // Trailing numeric segments are line then column; the script name itself
    // may contain ':' so only peel numbers off the end.
    let mut rest = location;
    let mut numbers = Vec::with_capacity(2);
    while numbers.len() < 2 {
        match rest.rsplit_once(':') {
            Some((head, tail)) => match tail.parse::<u32>() {
                Ok(n) => {
                    numbers.push(n);
                    rest = head;
                }
                Err(_) => break,
            },
            None => break,
        }
    }

    let (line, column) = match numbers.as_slice() {
        [column, line] => (Some(*line), Some(*column)),
        [line] => (Some(*line), None),
        _ => (None, None),
    };
    let source = (!rest.is_empty()).then(|| rest.to_string());
    (source, line, column)
}
