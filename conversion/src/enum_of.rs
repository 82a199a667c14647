//! Closed-set converter.

use serde_json::Value;

use crate::converter::Converter;
use crate::error::{CoercionError, SerializationError};
use crate::param::Param;
use crate::state::{CoerceState, DumpState};

/// Accepts only a value that strictly equals one of the predeclared
/// members.
///
/// Membership is exact: no fuzzy matching, no case folding, and no
/// cross-kind equality (the string `"1"` never matches the number `1`).
#[derive(Debug)]
pub struct EnumOf {
    members: Vec<Value>,
}

impl EnumOf {
    /// Declares the closed set of allowed literal values.
    pub fn new(members: impl IntoIterator<Item = Value>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Convenience constructor for string-valued enums.
    pub fn strings(members: impl IntoIterator<Item = &'static str>) -> Self {
        Self::new(members.into_iter().map(|m| Value::String(m.to_string())))
    }
}

impl Converter for EnumOf {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError> {
        if self.members.iter().any(|member| member == value) {
            Ok(value.clone())
        } else {
            Err(CoercionError::UnknownEnumValue {
                allowed: self.members.clone(),
                actual: value.clone(),
                path: state.path(),
            })
        }
    }

    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError> {
        // Enum members are already wire-representable literals.
        value.to_json(state)
    }
}
