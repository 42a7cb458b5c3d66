//! End-to-end host/engine tests
//!
//! Tests the complete stack: host value -> marshaller -> engine -> marshaller
//! -> host value. Covers:
//! - literal evaluation and function calls
//! - round-trips of representable values
//! - thrown errors and their taxonomy
//! - serde values passing through the engine

use engine_shim::{BindingError, ErrorKind, FunctionExt, Map, Value};
use integration_tests::runtime_with_context;
use serde::Serialize;

#[test]
fn test_literal_evaluation() {
    let (_runtime, context) = runtime_with_context();
    assert_eq!(context.eval("1+2").unwrap(), Value::Int(3));
    assert_eq!(context.eval("'a'+'b'").unwrap(), Value::from("ab"));
}

#[test]
fn test_declared_function_call() {
    let (_runtime, context) = runtime_with_context();
    context.eval("function f(a,b){return a+b;}").unwrap();
    let f = context.get("f").unwrap();
    let result = f
        .as_function()
        .unwrap()
        .call(&[Value::Int(2), Value::Int(3)])
        .unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn test_thrown_error() {
    let (_runtime, context) = runtime_with_context();
    match context.eval("throw new Error('x')") {
        Err(BindingError::Engine(e)) => {
            assert_eq!(e.kind, ErrorKind::Error);
            assert!(e.message.contains('x'));
        }
        other => panic!("expected engine error, got {:?}", other),
    }
}

#[test]
fn test_round_trip_through_identity() {
    let (_runtime, context) = runtime_with_context();
    let identity = context.eval("(v => v)").unwrap();
    let identity = identity.as_function().unwrap();

    let mut nested = Map::new();
    nested.insert("z".to_string(), Value::Float(-0.5));
    nested.insert("a".to_string(), Value::from(vec![Value::Null, Value::Boolean(false)]));

    let samples = vec![
        Value::Undefined,
        Value::Null,
        Value::Boolean(true),
        Value::Int(i32::MIN),
        Value::Int(i32::MAX),
        Value::Float(1e300),
        Value::from(""),
        Value::from("unicode ✓ 日本"),
        Value::Array(vec![]),
        Value::Object(Map::new()),
        Value::Object(nested),
    ];

    for sample in samples {
        assert_eq!(identity.call(&[sample.clone()]).unwrap(), sample);
    }
}

#[test]
fn test_round_trip_through_global() {
    let (_runtime, context) = runtime_with_context();
    let value: Value = [
        ("id", Value::Int(7)),
        ("tags", Value::from(vec!["x", "y"])),
        ("score", Value::Float(9.75)),
    ]
    .into_iter()
    .collect();
    context.set("record", &value).unwrap();
    assert_eq!(context.get("record").unwrap(), value);
    assert_eq!(context.eval("Object.keys(record).join()").unwrap(), Value::from("id,tags,score"));
}

#[derive(Serialize)]
struct Job {
    name: String,
    retries: u32,
    weights: Vec<f64>,
    owner: Option<String>,
}

#[test]
fn test_serde_value_reaches_script() {
    let (_runtime, context) = runtime_with_context();
    let job = Value::from_serialize(&Job {
        name: "nightly".to_string(),
        retries: 3,
        weights: vec![0.5, 0.25],
        owner: None,
    })
    .unwrap();
    context.set("job", &job).unwrap();

    let summary = context
        .eval("`${job.name}:${job.retries}:${job.weights.reduce((a, b) => a + b)}:${job.owner}`")
        .unwrap();
    assert_eq!(summary, Value::from("nightly:3:0.75:null"));
}

#[test]
fn test_engine_result_to_json() {
    let (_runtime, context) = runtime_with_context();
    let value = context.eval("({a: [1, 2.5], b: undefined, c: 'x'})").unwrap();
    let json = value.to_json().unwrap();
    assert_eq!(json, serde_json::json!({"a": [1, 2.5], "c": "x"}));
}

#[test]
fn test_json_parse_matches_serde() {
    let (_runtime, context) = runtime_with_context();
    let text = r#"{"k": [1, {"n": null}], "s": "t"}"#;
    let from_engine = context.parse_json(text).unwrap();
    let from_serde = Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap());
    assert_eq!(from_engine, from_serde);
}

#[test]
fn test_error_taxonomy_is_distinct() {
    let (runtime, context) = runtime_with_context();

    let engine = context.eval("undefinedName").unwrap_err();
    assert_eq!(engine.exception().unwrap().kind, ErrorKind::ReferenceError);

    let conversion = context.eval("Symbol()").unwrap_err();
    assert!(matches!(conversion, BindingError::TypeConversion(_)));

    runtime
        .set_time_limit(Some(std::time::Duration::from_millis(20)))
        .unwrap();
    let limit = context.eval("for (;;) {}").unwrap_err();
    assert!(matches!(limit, BindingError::ResourceLimitExceeded(_)));

    runtime.close().unwrap();
    let freed = context.eval("1").unwrap_err();
    assert!(matches!(freed, BindingError::UseAfterFree(_)));
}

#[test]
fn test_host_callable_pipeline() {
    let (_runtime, context) = runtime_with_context();
    context
        .add_callable("sum", |args| {
            let total: f64 = args
                .iter()
                .flat_map(|arg| arg.as_array().map(|items| items.to_vec()).unwrap_or_default())
                .filter_map(|item| item.as_f64())
                .sum();
            Ok(Value::Float(total))
        })
        .unwrap();
    assert_eq!(context.eval("sum([1, 2], [3.5])").unwrap(), Value::Float(6.5));
}
