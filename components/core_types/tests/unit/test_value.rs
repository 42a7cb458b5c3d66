//! Unit tests for the Value union

use core_types::{Map, Value};

#[cfg(test)]
mod value_creation_tests {
    use super::*;

    #[test]
    fn test_value_default_is_undefined() {
        assert!(matches!(Value::default(), Value::Undefined));
    }

    #[test]
    fn test_value_from_scalars() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(3.5), Value::Float(3.5));
        assert_eq!(Value::from("ab"), Value::String("ab".to_string()));
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(1)), Value::Int(1));
    }

    #[test]
    fn test_value_from_u32_max() {
        assert_eq!(Value::from(u32::MAX), Value::Float(4_294_967_295.0));
    }

    #[test]
    fn test_value_collect_object() {
        let value: Value = [("b", 2), ("a", 1)].into_iter().collect();
        let map = value.as_object().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}

#[cfg(test)]
mod value_equality_tests {
    use super::*;

    #[test]
    fn test_nested_equality() {
        let mut inner = Map::new();
        inner.insert("k".to_string(), Value::from(vec![1, 2]));
        let a = Value::Array(vec![Value::Object(inner.clone()), Value::Null]);
        let b = Value::Array(vec![Value::Object(inner), Value::Null]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_undefined_is_not_null() {
        assert_ne!(Value::Undefined, Value::Null);
    }

    #[test]
    fn test_array_length_matters() {
        assert_ne!(Value::from(vec![1]), Value::from(vec![1, 1]));
    }
}

#[cfg(test)]
mod value_is_truthy_tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        for v in [
            Value::Undefined,
            Value::Null,
            Value::Boolean(false),
            Value::Int(0),
            Value::Float(-0.0),
            Value::Float(f64::NAN),
            Value::from(""),
        ] {
            assert!(!v.is_truthy(), "{:?} should be falsy", v);
        }
    }

    #[test]
    fn test_composites_are_truthy() {
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::Object(Map::new()).is_truthy());
    }
}

#[cfg(test)]
mod value_accessor_tests {
    use super::*;

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(7.0).as_i64(), Some(7));
        assert_eq!(Value::Float(7.5).as_i64(), None);
        assert_eq!(Value::from("7").as_f64(), None);
    }

    #[test]
    fn test_contains_function_on_plain_data() {
        let v = Value::from(vec![Value::from(vec![1]), Value::Null]);
        assert!(!v.contains_function());
    }
}

#[cfg(test)]
mod value_to_string_tests {
    use super::*;

    #[test]
    fn test_number_to_string() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_object_to_string() {
        assert_eq!(Value::Object(Map::new()).to_string(), "[object Object]");
    }
}
