//! Composite converters: element-wise lists and string-keyed maps.
//!
//! Both wrap an inner converter and apply it element-wise, preserving
//! container shape and cardinality. Nullability and emptiness are distinct
//! dimensions: an empty container round-trips to an empty container, never
//! to null, and vice versa.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::converter::Converter;
use crate::error::{CoercionError, Kind, SerializationError};
use crate::param::Param;
use crate::state::{CoerceState, DumpState};

/// Applies an inner converter to every element of a JSON list.
#[derive(Debug)]
pub struct ListOf {
    inner: Arc<dyn Converter>,
    nullable: bool,
}

impl ListOf {
    /// Wraps an inner converter. The list itself is non-nullable unless
    /// [`nullable`](Self::nullable) is chained.
    pub fn new(inner: Arc<dyn Converter>) -> Self {
        Self {
            inner,
            nullable: false,
        }
    }

    /// Lets a literal null pass through unchanged in both directions.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl Converter for ListOf {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError> {
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }
        let Value::Array(items) = value else {
            return Err(CoercionError::TypeMismatch {
                expected: Kind::List,
                actual: Kind::of(value),
                path: state.path(),
            });
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            state.push_index(index);
            let coerced = self.inner.coerce(item, state);
            state.pop();
            out.push(coerced?);
        }
        Ok(Value::Array(out))
    }

    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError> {
        match value {
            Param::Value(Value::Null) if self.nullable => Ok(Value::Null),
            Param::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    state.push_index(index);
                    let dumped = self.inner.dump(item, state);
                    state.pop();
                    out.push(dumped?);
                }
                Ok(Value::Array(out))
            }
            // Shape mismatches on the way out are passed through
            // unconverted, matching the lenient dump policy of the rest of
            // the engine.
            other => other.to_json(state),
        }
    }
}

/// Applies an inner converter to every value of a string-keyed mapping.
#[derive(Debug)]
pub struct MapOf {
    inner: Arc<dyn Converter>,
    nullable: bool,
}

impl MapOf {
    /// Wraps an inner converter. The map itself is non-nullable unless
    /// [`nullable`](Self::nullable) is chained.
    pub fn new(inner: Arc<dyn Converter>) -> Self {
        Self {
            inner,
            nullable: false,
        }
    }

    /// Lets a literal null pass through unchanged in both directions.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl Converter for MapOf {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError> {
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }
        let Value::Object(entries) = value else {
            return Err(CoercionError::TypeMismatch {
                expected: Kind::Map,
                actual: Kind::of(value),
                path: state.path(),
            });
        };

        let mut out = Map::new();
        for (key, item) in entries {
            state.push_key(key);
            let coerced = self.inner.coerce(item, state);
            state.pop();
            out.insert(key.clone(), coerced?);
        }
        Ok(Value::Object(out))
    }

    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError> {
        match value {
            Param::Value(Value::Null) if self.nullable => Ok(Value::Null),
            Param::Map(entries) => {
                let mut out = Map::new();
                for (key, item) in entries.iter() {
                    state.push_key(key);
                    let dumped = self.inner.dump(item, state);
                    state.pop();
                    out.insert(key.to_string(), dumped?);
                }
                Ok(Value::Object(out))
            }
            Param::Value(Value::Object(entries)) => {
                let mut out = Map::new();
                for (key, item) in entries {
                    state.push_key(key);
                    let wrapped = Param::Value(item.clone());
                    let dumped = self.inner.dump(&wrapped, state);
                    state.pop();
                    out.insert(key.clone(), dumped?);
                }
                Ok(Value::Object(out))
            }
            other => other.to_json(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{number, string};
    use serde_json::json;

    #[test]
    fn test_list_coerce_element_wise() {
        let conv = ListOf::new(string());
        let mut state = CoerceState::new();
        let out = conv.coerce(&json!(["a", "b"]), &mut state).unwrap();
        assert_eq!(out, json!(["a", "b"]));
    }

    #[test]
    fn test_list_coerce_preserves_cardinality() {
        let conv = ListOf::new(number());
        let mut state = CoerceState::new();
        let out = conv.coerce(&json!([1, 2, 3]), &mut state).unwrap();
        assert_eq!(out.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_list_element_error_carries_index_path() {
        let conv = ListOf::new(string());
        let mut state = CoerceState::new();
        let err = conv.coerce(&json!(["a", 2]), &mut state).unwrap_err();
        assert_eq!(err.path(), "$[1]");
    }

    #[test]
    fn test_nullable_list_passes_null_through() {
        let conv = ListOf::new(string()).nullable();
        let mut state = CoerceState::new();
        assert_eq!(conv.coerce(&json!(null), &mut state).unwrap(), json!(null));
    }

    #[test]
    fn test_non_nullable_list_rejects_null() {
        let conv = ListOf::new(string());
        let mut state = CoerceState::new();
        assert!(conv.coerce(&json!(null), &mut state).is_err());
    }

    #[test]
    fn test_empty_list_stays_empty_not_null() {
        let conv = ListOf::new(string()).nullable();
        let mut state = CoerceState::new();
        assert_eq!(conv.coerce(&json!([]), &mut state).unwrap(), json!([]));
        assert_eq!(conv.coerce(&json!(null), &mut state).unwrap(), json!(null));
    }

    #[test]
    fn test_map_coerce_value_wise() {
        let conv = MapOf::new(number());
        let mut state = CoerceState::new();
        let out = conv.coerce(&json!({"a": 1, "b": 2}), &mut state).unwrap();
        assert_eq!(out, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_map_value_error_carries_key_path() {
        let conv = MapOf::new(number());
        let mut state = CoerceState::new();
        let err = conv.coerce(&json!({"a": "nope"}), &mut state).unwrap_err();
        assert_eq!(err.path(), "$.a");
    }

    #[test]
    fn test_map_coerce_rejects_list() {
        let conv = MapOf::new(number());
        let mut state = CoerceState::new();
        let err = conv.coerce(&json!([1]), &mut state).unwrap_err();
        assert!(matches!(
            err,
            CoercionError::TypeMismatch {
                expected: Kind::Map,
                ..
            }
        ));
    }

    #[test]
    fn test_list_dump_shares_state_across_elements() {
        // A latch cleared by element 0 stays cleared while element 1 is
        // processed and persists to the caller.
        let conv = ListOf::new(crate::primitive::unknown());
        let param = Param::List(vec![
            Param::stream(std::io::Cursor::new(b"one-shot".to_vec())),
            Param::string("plain"),
        ]);
        let mut state = DumpState::new();
        let out = conv.dump(&param, &mut state).unwrap();
        assert_eq!(out, json!(["one-shot", "plain"]));
        assert!(!state.can_retry());
    }

    #[test]
    fn test_map_dump_over_plain_json_object() {
        let conv = MapOf::new(string());
        let param = Param::Value(json!({"k": "v"}));
        let mut state = DumpState::new();
        assert_eq!(conv.dump(&param, &mut state).unwrap(), json!({"k": "v"}));
    }
}
