//! Recursive conversion in both directions.
//!
//! | host                 | engine                         |
//! |----------------------|--------------------------------|
//! | `Undefined` / `Null` | `undefined` / `null`           |
//! | `Boolean`            | boolean                        |
//! | `Int` / `Float`      | int / float64 tag              |
//! | `String`             | string                         |
//! | `Array`              | `Array`                        |
//! | `Object`             | plain object, string keys      |
//! | `Function`           | the registered function itself |
//!
//! Engine `Error` instances come back as `{name, message, stack}` objects.
//! Symbols, BigInts, promises and modules have no host form, and neither do
//! objects whose prototype is something other than `Object.prototype` or
//! `null` (`Date`, `Map`, typed arrays, class instances).
//!
//! Integer-like keys follow engine property order: `({b: 1, 1: 2})` reads
//! back as `{"1": 2, "b": 1}`, and the host map keeps that order.

use crate::{FunctionRegistry, MarshalError, MarshalResult};
use core_types::{Map, Value};
use rquickjs::{Array, Ctx, Function, Object, Type, Value as JsValue};

/// Default nesting limit for composite values.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default cap on the `length` of an engine array read back to the host.
pub const DEFAULT_MAX_LENGTH: usize = 1 << 24;

/// Converter bound to one registry.
///
/// # Example
///
/// ```ignore
/// let marshaller = Marshaller::new(&registry).with_max_depth(64);
/// let js = marshaller.to_engine(&ctx, &Value::from(vec![1, 2, 3]))?;
/// let back = marshaller.to_host(js)?;
/// ```
pub struct Marshaller<'a, R: ?Sized> {
    registry: &'a R,
    max_depth: usize,
    max_length: usize,
}

impl<'a, R: ?Sized> Marshaller<'a, R> {
    /// Create a marshaller with the default depth limit
    pub fn new(registry: &'a R) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Override the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Current nesting limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Override the array length cap
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Converts a host value into an engine value, allocating engine
    /// objects for composites.
    pub fn to_engine<'js>(&self, ctx: &Ctx<'js>, value: &Value) -> MarshalResult<JsValue<'js>>
    where
        R: FunctionRegistry<'js>,
    {
        self.to_engine_at(ctx, value, 0)
    }

    /// Converts a slice of host values, e.g. call arguments.
    pub fn to_engine_all<'js>(
        &self,
        ctx: &Ctx<'js>,
        values: &[Value],
    ) -> MarshalResult<Vec<JsValue<'js>>>
    where
        R: FunctionRegistry<'js>,
    {
        values.iter().map(|v| self.to_engine(ctx, v)).collect()
    }

    /// Converts an engine value into a host value.
    pub fn to_host<'js>(&self, value: JsValue<'js>) -> MarshalResult<Value>
    where
        R: FunctionRegistry<'js>,
    {
        self.to_host_at(value, 0)
    }

    fn enter(&self, depth: usize) -> MarshalResult<()> {
        if depth > self.max_depth {
            return Err(MarshalError::TooDeep(self.max_depth));
        }
        Ok(())
    }

    fn to_engine_at<'js>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value,
        depth: usize,
    ) -> MarshalResult<JsValue<'js>>
    where
        R: FunctionRegistry<'js>,
    {
        self.enter(depth)?;
        let converted = match value {
            Value::Undefined => JsValue::new_undefined(ctx.clone()),
            Value::Null => JsValue::new_null(ctx.clone()),
            Value::Boolean(b) => JsValue::new_bool(ctx.clone(), *b),
            Value::Int(n) => JsValue::new_int(ctx.clone(), *n),
            Value::Float(n) => JsValue::new_float(ctx.clone(), *n),
            Value::String(s) => rquickjs::String::from_str(ctx.clone(), s)?.into_value(),
            Value::Array(items) => {
                let array = Array::new(ctx.clone())?;
                for (index, item) in items.iter().enumerate() {
                    array.set(index, self.to_engine_at(ctx, item, depth + 1)?)?;
                }
                array.into_value()
            }
            Value::Object(map) => {
                let object = Object::new(ctx.clone())?;
                for (key, item) in map {
                    object.set(key.as_str(), self.to_engine_at(ctx, item, depth + 1)?)?;
                }
                object.into_value()
            }
            Value::Function(func) => self.registry.resolve(ctx, func)?.into_value(),
        };
        Ok(converted)
    }

    fn to_host_at<'js>(&self, value: JsValue<'js>, depth: usize) -> MarshalResult<Value>
    where
        R: FunctionRegistry<'js>,
    {
        self.enter(depth)?;
        match value.type_of() {
            Type::Undefined | Type::Uninitialized => Ok(Value::Undefined),
            Type::Null => Ok(Value::Null),
            Type::Bool => Ok(Value::Boolean(value.get::<bool>()?)),
            Type::Int => Ok(Value::Int(value.get::<i32>()?)),
            Type::Float => Ok(Value::Float(value.get::<f64>()?)),
            Type::String => Ok(Value::String(value.get::<String>()?)),
            Type::Array => {
                // `length` can reach 2^32 - 1 on a sparse array, so it is
                // read as a number and checked before any index is visited.
                let array = value.get::<Object>()?;
                let length = array.get::<_, f64>("length")?;
                if length > self.max_length as f64 {
                    return Err(MarshalError::TooLong(self.max_length));
                }
                let mut items = Vec::new();
                for index in 0..length as u32 {
                    let item = array.get::<_, JsValue>(index)?;
                    items.push(self.to_host_at(item, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            Type::Function | Type::Constructor => {
                let ctx = value.ctx().clone();
                let function = value.get::<Function>()?;
                Ok(Value::Function(self.registry.register(&ctx, function)?))
            }
            Type::Exception => {
                let object = value.get::<Object>()?;
                let mut map = Map::new();
                for key in ["name", "message", "stack"] {
                    if let Some(text) = object.get::<_, Option<String>>(key)? {
                        map.insert(key.to_string(), Value::String(text));
                    }
                }
                Ok(Value::Object(map))
            }
            Type::Object => {
                let object = value.get::<Object>()?;
                ensure_plain(&object)?;
                let mut map = Map::new();
                for entry in object.props::<String, JsValue>() {
                    let (key, item) = entry?;
                    map.insert(key, self.to_host_at(item, depth + 1)?);
                }
                Ok(Value::Object(map))
            }
            Type::Symbol => Err(MarshalError::Unsupported(
                "symbols have no host equivalent".to_string(),
            )),
            Type::BigInt => Err(MarshalError::Unsupported(
                "BigInt values have no host equivalent".to_string(),
            )),
            Type::Promise => Err(MarshalError::Unsupported(
                "promises must be resolved inside the engine".to_string(),
            )),
            other => Err(MarshalError::Unsupported(format!(
                "engine value of type {:?} has no host equivalent",
                other
            ))),
        }
    }
}

/// Rejects objects built by a constructor other than `Object`.
fn ensure_plain(object: &Object<'_>) -> MarshalResult<()> {
    let Some(prototype) = object.get_prototype() else {
        return Ok(());
    };
    let plain = Object::new(object.ctx().clone())?.get_prototype();
    if plain.as_ref() == Some(&prototype) {
        return Ok(());
    }
    let name = prototype
        .get::<_, Option<Object>>("constructor")
        .ok()
        .flatten()
        .and_then(|constructor| constructor.get::<_, Option<String>>("name").ok().flatten())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "anonymous".to_string());
    Err(MarshalError::Unsupported(format!(
        "{} instances have no host equivalent",
        name
    )))
}

/// Converts one host value with the default depth limit.
pub fn to_engine<'js, R>(ctx: &Ctx<'js>, value: &Value, registry: &R) -> MarshalResult<JsValue<'js>>
where
    R: FunctionRegistry<'js> + ?Sized,
{
    Marshaller::new(registry).to_engine(ctx, value)
}

/// Converts one engine value with the default depth limit.
pub fn to_host<'js, R>(value: JsValue<'js>, registry: &R) -> MarshalResult<Value>
where
    R: FunctionRegistry<'js> + ?Sized,
{
    Marshaller::new(registry).to_host(value)
}
