//! Contract compliance tests for core_types
//!
//! These tests pin the public surface other components rely on.

use core_types::{
    Affinity, BindingError, BindingResult, ErrorKind, FunctionRef, JsException, LimitKind, Map,
    RuntimeId, StackFrame, Value,
};

#[cfg(test)]
mod value_contract_tests {
    use super::*;

    /// Contract: Value has one variant per member of the engine value union
    #[test]
    fn test_value_has_all_variants() {
        let affinity = Affinity::new();
        let _: Vec<Value> = vec![
            Value::Undefined,
            Value::Null,
            Value::Boolean(true),
            Value::Int(i32::MIN),
            Value::Float(f64::NAN),
            Value::String(String::new()),
            Value::Array(Vec::new()),
            Value::Object(Map::new()),
            Value::Function(FunctionRef::new(affinity, 0)),
        ];
    }

    /// Contract: Value is Send + Sync so it can cross to a worker thread
    #[test]
    fn test_value_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
        assert_send_sync::<FunctionRef>();
        assert_send_sync::<BindingError>();
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    /// Contract: every failure class is a distinct, matchable variant
    #[test]
    fn test_error_taxonomy_is_distinct() {
        let affinity = Affinity::new();
        let id: RuntimeId = affinity.id();
        let errors: Vec<BindingError> = vec![
            BindingError::TypeConversion("t".into()),
            BindingError::Engine(JsException::new(ErrorKind::Error, "e")),
            BindingError::Recursion("r".into()),
            BindingError::ResourceLimitExceeded(LimitKind::Time),
            BindingError::ThreadAffinity {
                runtime: id,
                owner: affinity.owner(),
                caller: affinity.owner(),
            },
            BindingError::UseAfterFree("u".into()),
            BindingError::Reentrancy(id),
            BindingError::Host("h".into()),
        ];
        let names: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                BindingError::TypeConversion(_) => "conversion",
                BindingError::Engine(_) => "engine",
                BindingError::Recursion(_) => "recursion",
                BindingError::ResourceLimitExceeded(_) => "limit",
                BindingError::ThreadAffinity { .. } => "affinity",
                BindingError::UseAfterFree(_) => "uaf",
                BindingError::Reentrancy(_) => "reentrancy",
                BindingError::Host(_) => "host",
            })
            .collect();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn test_binding_result_alias() {
        let ok: BindingResult<Value> = Ok(Value::Null);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_stack_frame_fields() {
        let frame = StackFrame {
            function_name: None,
            source_url: None,
            line: None,
            column: None,
        };
        assert_eq!(frame.clone(), frame);
    }
}
