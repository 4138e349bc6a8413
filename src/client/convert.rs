//! Typed conversion of reply values
use crate::client::{ClientError, Value};
use bytes::Bytes;
use std::collections::HashMap;
use std::hash::Hash;

/// Conversion from a complete reply value
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ClientError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        Ok(value)
    }
}

/// Accepts any reply, e.g. for `SET`
impl FromValue for () {
    fn from_value(_: Value) -> Result<Self, ClientError> {
        Ok(())
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Integer(integer) => Ok(integer),
            _ => Err(ClientError::UnexpectedType("integer")),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Bytes(data) | Value::Status(data) => Ok(data),
            _ => Err(ClientError::UnexpectedType("string")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        let data = Bytes::from_value(value)?;
        String::from_utf8(data.to_vec()).map_err(|_| ClientError::UnexpectedType("UTF-8 string"))
    }
}

/// Nil maps to None
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Nil => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            _ => Err(ClientError::UnexpectedType("array")),
        }
    }
}

/// Builds a map from a flat field/value array, as returned by `HGETALL`
///
/// A trailing element without value is ignored.
impl<K, V> FromValue for HashMap<K, V>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
{
    fn from_value(value: Value) -> Result<Self, ClientError> {
        let Value::Array(items) = value else {
            return Err(ClientError::UnexpectedType("array"));
        };

        let mut map = HashMap::with_capacity(items.len() / 2);
        let mut items = items.into_iter();
        while let (Some(field), Some(value)) = (items.next(), items.next()) {
            map.insert(K::from_value(field)?, V::from_value(value)?);
        }

        Ok(map)
    }
}
