//! Unit tests for stack frame parsing

use core_types::{parse_stack, StackFrame};

#[test]
fn test_parse_typical_engine_stack() {
    let stack = "    at f (<input>:1:27)\n    at <eval> (<input>:1:45)\n";
    let frames = parse_stack(stack);
    assert_eq!(frames.len(), 2);
    assert_eq!(
        frames[1],
        StackFrame {
            function_name: Some("<eval>".to_string()),
            source_url: Some("<input>".to_string()),
            line: Some(1),
            column: Some(45),
        }
    );
}

#[test]
fn test_parse_empty_stack() {
    assert!(parse_stack("").is_empty());
}

#[test]
fn test_anonymous_frame_has_no_name() {
    let frames = parse_stack("    at <anonymous> (a.js:4:1)");
    assert_eq!(frames[0].function_name, None);
}
