//! Leaf converters for JSON scalars and deliberately-untyped values.

use std::sync::Arc;

use serde_json::Value;

use crate::converter::Converter;
use crate::error::{CoercionError, Kind, SerializationError};
use crate::param::Param;
use crate::state::{CoerceState, DumpState};

/// A scalar or pass-through converter.
///
/// `Unknown` is the opaque-JSON sentinel: fields whose shape is
/// deliberately unvalidated (e.g. `is_bot`, `zip`, `phone_number`) pass
/// through both directions uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Bool,
    Unknown,
}

impl Primitive {
    fn expected(&self) -> Option<Kind> {
        match self {
            Self::String => Some(Kind::String),
            Self::Number => Some(Kind::Number),
            Self::Bool => Some(Kind::Bool),
            Self::Unknown => None,
        }
    }
}

impl Converter for Primitive {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError> {
        match self.expected() {
            None => Ok(value.clone()),
            Some(expected) => {
                let actual = Kind::of(value);
                if actual == expected {
                    Ok(value.clone())
                } else {
                    Err(CoercionError::TypeMismatch {
                        expected,
                        actual,
                        path: state.path(),
                    })
                }
            }
        }
    }

    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError> {
        // Identity on the way out; streams are consumed and clear the
        // retry latch inside to_json.
        value.to_json(state)
    }
}

/// A shared string converter.
pub fn string() -> Arc<dyn Converter> {
    Arc::new(Primitive::String)
}

/// A shared number converter.
pub fn number() -> Arc<dyn Converter> {
    Arc::new(Primitive::Number)
}

/// A shared boolean converter.
pub fn boolean() -> Arc<dyn Converter> {
    Arc::new(Primitive::Bool)
}

/// A shared pass-through converter for deliberately-untyped values.
pub fn unknown() -> Arc<dyn Converter> {
    Arc::new(Primitive::Unknown)
}
