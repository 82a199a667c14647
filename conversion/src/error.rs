//! Conversion error types.
//!
//! [`CoercionError`] covers everything that can go wrong turning raw wire
//! JSON into a typed value; [`SerializationError`] covers the reverse
//! direction. Both carry the path of the offending value so callers can
//! point at the exact field in a deeply nested document.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The runtime shape of a decoded JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl Kind {
    /// Classifies a decoded JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "a boolean",
            Self::Number => "a number",
            Self::String => "a string",
            Self::List => "a list",
            Self::Map => "a mapping",
        };
        f.write_str(name)
    }
}

/// Raw input does not match the shape a converter expects.
///
/// Always local to a single coerce pass and never retried; the caller
/// surfaces it as a client-side decode failure, distinct from any server
/// error.
#[derive(Debug, Error)]
pub enum CoercionError {
    /// The value's runtime kind differs from the expected kind.
    #[error("expected {expected} at `{path}`, found {actual}")]
    TypeMismatch {
        /// The kind the converter requires.
        expected: Kind,
        /// The kind actually found in the raw input.
        actual: Kind,
        /// Path of the offending value.
        path: String,
    },

    /// A required field is absent from the raw mapping.
    #[error("missing required field `{field}` at `{path}`")]
    MissingRequiredField {
        /// Local name of the absent field.
        field: &'static str,
        /// Path of the enclosing mapping.
        path: String,
    },

    /// A non-nullable field was given an explicit null.
    #[error("unexpected null for field `{field}` at `{path}`")]
    UnexpectedNull {
        /// Local name of the field.
        field: &'static str,
        /// Path of the enclosing mapping.
        path: String,
    },

    /// The value is not a member of the enum's closed set.
    #[error("value `{actual}` at `{path}` is not one of the allowed members {allowed:?}")]
    UnknownEnumValue {
        /// The members the enum accepts.
        allowed: Vec<Value>,
        /// The rejected value.
        actual: Value,
        /// Path of the offending value.
        path: String,
    },

    /// A discriminator key was present but no variant is registered for it.
    #[error("unknown discriminator value `{value}` at `{path}`")]
    UnknownDiscriminator {
        /// The unregistered discriminator value, rendered as text.
        value: String,
        /// Path of the enclosing mapping.
        path: String,
    },

    /// No union variant accepted the value.
    #[error("no union variant matched the value at `{path}`")]
    NoMatchingVariant {
        /// Path of the offending value.
        path: String,
    },
}

impl CoercionError {
    /// Path of the value that failed to coerce.
    pub fn path(&self) -> &str {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::MissingRequiredField { path, .. }
            | Self::UnexpectedNull { path, .. }
            | Self::UnknownEnumValue { path, .. }
            | Self::UnknownDiscriminator { path, .. }
            | Self::NoMatchingVariant { path } => path,
        }
    }
}

/// A typed value cannot be represented on the wire.
///
/// This is a programmer error (the caller handed the engine something
/// nonsensical), not a transient condition.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// A one-shot stream was dumped a second time.
    #[error("stream at `{path}` was already consumed by an earlier dump")]
    StreamConsumed {
        /// Path of the streamed value.
        path: String,
    },

    /// Reading a one-shot stream failed.
    #[error("failed to read stream at `{path}`")]
    StreamRead {
        /// Path of the streamed value.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A number with no JSON representation was dumped.
    #[error("non-finite number `{value}` at `{path}` has no JSON representation")]
    NonFiniteNumber {
        /// The NaN or infinite value.
        value: f64,
        /// Path of the offending value.
        path: String,
    },

    /// A one-shot stream produced bytes that are not valid UTF-8.
    #[error("stream at `{path}` is not valid UTF-8")]
    StreamEncoding {
        /// Path of the streamed value.
        path: String,
    },

    /// A discriminator key was present but no variant is registered for it.
    #[error("unknown discriminator value `{value}` at `{path}`")]
    UnknownDiscriminator {
        /// The unregistered discriminator value, rendered as text.
        value: String,
        /// Path of the enclosing mapping.
        path: String,
    },

    /// A streamed value inside an undiscriminated union cannot be resolved.
    ///
    /// Probing variants would consume the stream, so unions holding streams
    /// must declare a discriminator.
    #[error("streamed value at `{path}` requires a discriminated union")]
    StreamInUnion {
        /// Path of the union value.
        path: String,
    },

    /// No union variant accepted the value during a dump.
    #[error("no union variant accepted the value at `{path}`")]
    NoDumpVariant {
        /// Path of the union value.
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Kind::of(&json!(null)), Kind::Null);
        assert_eq!(Kind::of(&json!(true)), Kind::Bool);
        assert_eq!(Kind::of(&json!(1.5)), Kind::Number);
        assert_eq!(Kind::of(&json!("x")), Kind::String);
        assert_eq!(Kind::of(&json!([])), Kind::List);
        assert_eq!(Kind::of(&json!({})), Kind::Map);
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = CoercionError::TypeMismatch {
            expected: Kind::String,
            actual: Kind::Number,
            path: "$.token".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("expected a string"));
        assert!(display.contains("found a number"));
        assert!(display.contains("$.token"));
    }

    #[test]
    fn test_error_path_accessor() {
        let err = CoercionError::MissingRequiredField {
            field: "token",
            path: "$".to_string(),
        };
        assert_eq!(err.path(), "$");
    }
}
