use crate::client::{ClientError, FromValue, Value};
use bytes::Bytes;
use std::collections::HashMap;

fn bulk(data: &'static str) -> Value {
    Value::Bytes(Bytes::from_static(data.as_bytes()))
}

#[test]
fn test_integer() {
    assert_eq!(5, i64::from_value(Value::Integer(5)).unwrap());
    assert_eq!(ClientError::UnexpectedType("integer"), i64::from_value(bulk("5")).unwrap_err());
}

#[test]
fn test_string() {
    assert_eq!("OK", String::from_value(Value::Status(Bytes::from_static(b"OK"))).unwrap());
    assert_eq!("value", String::from_value(bulk("value")).unwrap());
    assert_eq!(
        ClientError::UnexpectedType("UTF-8 string"),
        String::from_value(Value::Bytes(Bytes::from_static(&[0xFF, 0xFE]))).unwrap_err()
    );
    assert_eq!(ClientError::UnexpectedType("string"), String::from_value(Value::Nil).unwrap_err());
}

#[test]
fn test_option() {
    assert_eq!(None, Option::<String>::from_value(Value::Nil).unwrap());
    assert_eq!(Some(3), Option::<i64>::from_value(Value::Integer(3)).unwrap());
}

#[test]
fn test_vec_with_nil() {
    let value = Value::Array(vec![bulk("a"), Value::Nil, bulk("c")]);

    let list = Vec::<Option<String>>::from_value(value).unwrap();
    assert_eq!(vec![Some("a".to_string()), None, Some("c".to_string())], list);
}

#[test]
fn test_vec_of_integers() {
    let value = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
    assert_eq!(vec![1, 2], Vec::<i64>::from_value(value).unwrap());
}

#[test]
fn test_map_from_pairs() {
    let value = Value::Array(vec![bulk("name"), bulk("Ada"), bulk("lang"), bulk("en")]);

    let map = HashMap::<String, String>::from_value(value).unwrap();
    assert_eq!(2, map.len());
    assert_eq!("Ada", map["name"]);
    assert_eq!("en", map["lang"]);
}

#[test]
fn test_map_ignores_trailing_field() {
    let value = Value::Array(vec![bulk("a"), Value::Integer(1), bulk("b")]);

    let map = HashMap::<String, i64>::from_value(value).unwrap();
    assert_eq!(1, map.len());
    assert_eq!(1, map["a"]);
}

#[test]
fn test_map_requires_array() {
    assert_eq!(
        ClientError::UnexpectedType("array"),
        HashMap::<String, String>::from_value(Value::Nil).unwrap_err()
    );
}
