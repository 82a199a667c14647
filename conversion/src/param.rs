//! Request parameter values prior to serialization.
//!
//! [`Param`] is the typed side of a dump pass: plain JSON values, ordered
//! containers of further params, or a one-shot [`ReadStream`]. Streams are
//! what make a request body unrepeatable: dumping one consumes the
//! underlying reader and clears the retry latch on the [`DumpState`]
//! threading through the pass.

use std::fmt;
use std::io::Read;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::SerializationError;
use crate::model::Field;
use crate::state::DumpState;

/// A parameter tree handed to a dump pass.
#[derive(Debug)]
pub enum Param {
    /// A plain JSON value, dumped as-is.
    Value(Value),
    /// An ordered sequence of params.
    List(Vec<Param>),
    /// An order-preserving string-keyed mapping of params.
    Map(ParamMap),
    /// A one-shot byte source. Dumping it consumes the reader and clears
    /// the retry latch.
    Stream(ReadStream),
    /// A number with no JSON representation (NaN or an infinity).
    /// Dumping it fails rather than silently altering the value.
    NonFinite(f64),
}

impl Param {
    /// Wraps a string.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }

    /// Wraps a number. NaN and infinities are carried through and fail
    /// the dump pass, since JSON has no representation for them.
    pub fn number(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(n) => Self::Value(Value::Number(n)),
            None => Self::NonFinite(value),
        }
    }

    /// Wraps a boolean.
    pub fn boolean(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }

    /// Wraps an arbitrary JSON value without interpretation.
    pub fn json(value: Value) -> Self {
        Self::Value(value)
    }

    /// Wraps a string-keyed JSON mapping.
    pub fn json_map(value: Map<String, Value>) -> Self {
        Self::Value(Value::Object(value))
    }

    /// Wraps a one-shot byte source.
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Self::Stream(ReadStream::new(reader))
    }

    /// Whether this tree contains a one-shot stream anywhere.
    pub fn has_stream(&self) -> bool {
        match self {
            Self::Stream(_) => true,
            Self::Value(_) | Self::NonFinite(_) => false,
            Self::List(items) => items.iter().any(Param::has_stream),
            Self::Map(map) => map.entries.iter().any(|(_, p)| p.has_stream()),
        }
    }

    /// Serializes this tree without converter-specific interpretation.
    ///
    /// Containers recurse; streams are read to completion, which consumes
    /// the reader and clears the retry latch. A stream that was already
    /// consumed fails.
    pub fn to_json(&self, state: &mut DumpState) -> Result<Value, SerializationError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    state.push_index(index);
                    let dumped = item.to_json(state);
                    state.pop();
                    out.push(dumped?);
                }
                Ok(Value::Array(out))
            }
            Self::Map(map) => {
                let mut out = Map::new();
                for (key, value) in &map.entries {
                    state.push_key(key);
                    let dumped = value.to_json(state);
                    state.pop();
                    out.insert(key.clone(), dumped?);
                }
                Ok(Value::Object(out))
            }
            Self::Stream(stream) => stream.read_to_value(state),
            Self::NonFinite(value) => Err(SerializationError::NonFiniteNumber {
                value: *value,
                path: state.path(),
            }),
        }
    }
}

impl From<Value> for Param {
    /// Deep-converts a JSON value: objects become [`ParamMap`]s and arrays
    /// become param lists, so model converters see their natural shapes.
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(Param::from).collect()),
            Value::Object(map) => {
                let mut out = ParamMap::new();
                for (key, value) in map {
                    out.insert(key, Param::from(value));
                }
                Self::Map(out)
            }
            other => Self::Value(other),
        }
    }
}

/// An order-preserving, string-keyed mapping of [`Param`]s.
#[derive(Debug, Default)]
pub struct ParamMap {
    entries: Vec<(String, Param)>,
}

impl ParamMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, preserving insertion order.
    pub fn insert(&mut self, key: impl Into<String>, value: Param) {
        self.entries.push((key.into(), value));
    }

    /// Appends a tri-state field: unset fields contribute nothing, null
    /// fields become an explicit JSON null, set fields are converted by
    /// `wrap`.
    pub fn field<T>(&mut self, key: &str, field: Field<T>, wrap: impl FnOnce(T) -> Param) {
        match field {
            Field::Unset => {}
            Field::Null => self.insert(key, Param::Value(Value::Null)),
            Field::Set(value) => self.insert(key, wrap(value)),
        }
    }

    /// Looks up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Param> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A one-shot byte source for request bodies that cannot be re-sent.
///
/// The reader is taken out the first time the stream is dumped; further
/// dumps fail with [`SerializationError::StreamConsumed`].
pub struct ReadStream {
    inner: Mutex<Option<Box<dyn Read + Send>>>,
}

impl ReadStream {
    /// Wraps a reader.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Some(Box::new(reader))),
        }
    }

    /// Whether the underlying reader has already been taken.
    pub fn is_consumed(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn Read + Send>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reads the stream to completion as a UTF-8 string, clearing the
    /// retry latch on `state`.
    fn read_to_value(&self, state: &mut DumpState) -> Result<Value, SerializationError> {
        let mut reader = match self.lock().take() {
            Some(reader) => reader,
            None => {
                return Err(SerializationError::StreamConsumed { path: state.path() });
            }
        };

        // The reader is gone from self; this body cannot be regenerated.
        state.forbid_retry();

        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|source| SerializationError::StreamRead {
                path: state.path(),
                source,
            })?;

        let text = String::from_utf8(buf)
            .map_err(|_| SerializationError::StreamEncoding { path: state.path() })?;
        Ok(Value::String(text))
    }
}

impl fmt::Debug for ReadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadStream")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_roundtrip_through_to_json() {
        let param = Param::from(json!({"a": [1, 2], "b": {"c": true}}));
        let mut state = DumpState::new();
        let out = param.to_json(&mut state).unwrap();
        assert_eq!(out, json!({"a": [1, 2], "b": {"c": true}}));
        assert!(state.can_retry());
    }

    #[test]
    fn test_from_value_builds_param_containers() {
        let param = Param::from(json!({"k": [1]}));
        let Param::Map(map) = &param else {
            panic!("expected a param map");
        };
        assert!(matches!(map.get("k"), Some(Param::List(_))));
    }

    #[test]
    fn test_stream_dump_clears_latch() {
        let param = Param::stream(std::io::Cursor::new(b"payload".to_vec()));
        let mut state = DumpState::new();
        let out = param.to_json(&mut state).unwrap();
        assert_eq!(out, json!("payload"));
        assert!(!state.can_retry());
    }

    #[test]
    fn test_stream_second_dump_fails() {
        let param = Param::stream(std::io::Cursor::new(b"x".to_vec()));
        let mut state = DumpState::new();
        param.to_json(&mut state).unwrap();

        let mut second = DumpState::new();
        let err = param.to_json(&mut second).unwrap_err();
        assert!(matches!(err, SerializationError::StreamConsumed { .. }));
    }

    #[test]
    fn test_stream_invalid_utf8_fails() {
        let param = Param::stream(std::io::Cursor::new(vec![0xff, 0xfe]));
        let mut state = DumpState::new();
        let err = param.to_json(&mut state).unwrap_err();
        assert!(matches!(err, SerializationError::StreamEncoding { .. }));
    }

    #[test]
    fn test_non_finite_number_fails_dump() {
        let mut map = ParamMap::new();
        map.insert("rate", Param::number(f64::NAN));
        let mut state = DumpState::new();
        let err = Param::Map(map).to_json(&mut state).unwrap_err();
        match err {
            SerializationError::NonFiniteNumber { path, .. } => assert_eq!(path, "$.rate"),
            other => panic!("expected a non-finite error, got {other:?}"),
        }

        let mut state = DumpState::new();
        assert!(Param::number(f64::INFINITY).to_json(&mut state).is_err());
        assert!(Param::number(1.5).to_json(&mut state).is_ok());
    }

    #[test]
    fn test_has_stream_recurses() {
        let mut map = ParamMap::new();
        map.insert("file", Param::stream(std::io::Cursor::new(Vec::new())));
        let param = Param::List(vec![Param::Map(map)]);
        assert!(param.has_stream());
        assert!(!Param::from(json!({"a": 1})).has_stream());
    }

    #[test]
    fn test_param_map_preserves_insertion_order() {
        let mut map = ParamMap::new();
        map.insert("z", Param::boolean(true));
        map.insert("a", Param::boolean(false));
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_field_helper_tri_state() {
        let mut map = ParamMap::new();
        map.field("unset", Field::<String>::Unset, Param::string);
        map.field("null", Field::<String>::Null, Param::string);
        map.field("set", Field::Set("v".to_string()), Param::string);

        assert!(map.get("unset").is_none());
        assert!(matches!(map.get("null"), Some(Param::Value(Value::Null))));
        assert!(matches!(map.get("set"), Some(Param::Value(Value::String(_)))));
    }
}
