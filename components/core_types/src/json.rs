//! JSON bridging for host values.
//!
//! Any serde-serializable host type can become a [`Value`] through
//! `serde_json`, and values without functions can be rendered back to JSON.

use crate::{BindingError, BindingResult, Map, Value};
use serde::Serialize;
use serde_json::Number;

impl Value {
    /// Converts a serializable host value.
    ///
    /// Fails with `TypeConversion` for shapes JSON cannot express, such as
    /// maps keyed by composite types.
    ///
    /// ```
    /// use core_types::Value;
    /// use std::collections::BTreeMap;
    ///
    /// let mut scores = BTreeMap::new();
    /// scores.insert("a", vec![1.5, 2.0]);
    /// let value = Value::from_serialize(&scores).unwrap();
    /// assert_eq!(value.as_object().unwrap()["a"], Value::from(vec![1.5, 2.0]));
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> BindingResult<Value> {
        serde_json::to_value(value)
            .map(Value::from)
            .map_err(|e| BindingError::TypeConversion(e.to_string()))
    }

    /// Renders the value as JSON the way `JSON.stringify` would, except that
    /// functions are rejected instead of silently dropped.
    pub fn to_json(&self) -> BindingResult<serde_json::Value> {
        Ok(match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::Number(Number::from(*n)),
            Value::Float(n) => Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<BindingResult<_>>()?,
            ),
            Value::Object(map) => {
                let mut object = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    if !matches!(value, Value::Undefined) {
                        object.insert(key.clone(), value.to_json()?);
                    }
                }
                serde_json::Value::Object(object)
            }
            Value::Function(func) => {
                return Err(BindingError::TypeConversion(format!(
                    "{:?} cannot be represented as JSON",
                    func
                )))
            }
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map>(),
            ),
        }
    }
}
