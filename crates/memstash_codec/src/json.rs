//! JSON encoding helpers.
//!
//! Every value that crosses the store boundary as a typed result is
//! deep-copied through a JSON round trip, so callers never alias stored data.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Encodes any serializable value as compact JSON bytes.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Encodes any serializable value as indented JSON bytes.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Decodes JSON bytes into `T`.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

/// Converts any serializable value into a dynamic [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> CodecResult<Value> {
    let json = serde_json::to_value(value).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Value::deserialize(json).map_err(|e| CodecError::decoding_failed(e.to_string()))
}

/// Deep-copies `source` into `T` through a serialize/deserialize round trip.
pub fn decode_as<T, S>(source: &S) -> CodecResult<T>
where
    T: DeserializeOwned,
    S: Serialize + ?Sized,
{
    let bytes = to_json(source)?;
    from_json(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        name: String,
        age: i64,
    }

    #[test]
    fn struct_to_value_is_map() {
        let v = to_value(&User {
            name: "Jane".into(),
            age: 30,
        })
        .unwrap();
        assert_eq!(v.get("name"), Some(&Value::from("Jane")));
        assert_eq!(v.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn decode_map_into_struct() {
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::from("John"));
        m.insert("age".to_string(), Value::from(35));
        m.insert("is_synced".to_string(), Value::from(false));

        let user: User = decode_as(&Value::Map(m)).unwrap();
        assert_eq!(
            user,
            User {
                name: "John".into(),
                age: 35
            }
        );
    }

    #[test]
    fn decode_shape_mismatch_fails() {
        let result: CodecResult<User> = decode_as(&Value::from(42));
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));
    }

    #[test]
    fn invalid_json_fails() {
        let result: CodecResult<Value> = from_json(b"{not json");
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));
    }
}
