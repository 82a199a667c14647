//! Struct (model) conversion.
//!
//! Each model type declares an explicit field table (local name, optional
//! wire name, nullability, optionality and a nested converter) built once
//! and memoized for the process lifetime. [`ModelConverter`] walks the
//! table in declaration order in both directions; the omit-vs-explicit-null
//! distinction survives the round trip because unset fields never appear
//! in the output at all.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::converter::Converter;
use crate::error::{CoercionError, Kind, SerializationError};
use crate::param::Param;
use crate::state::{CoerceState, DumpState};

/// A tri-state optional model field.
///
/// Distinguishes a field that was never set (omitted from the wire, the
/// server leaves the property unchanged) from one explicitly set to null
/// (sent as JSON null, the server unsets the property).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Never set; contributes nothing to the wire mapping.
    #[default]
    Unset,
    /// Explicitly null; sent as JSON null.
    Null,
    /// Set to a value.
    Set(T),
}

impl<T> Field<T> {
    /// Whether the field was never set.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Whether the field is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value, if one is set.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the field, returning the value if one is set.
    pub fn into_set(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    /// `Some` sets a value; `None` is an explicit null. An unset field is
    /// only ever produced by never assigning it.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Null,
        }
    }
}

/// One declared field of a model type.
#[derive(Debug)]
pub struct FieldDescriptor {
    local: &'static str,
    wire: Option<&'static str>,
    nullable: bool,
    optional: bool,
    converter: Arc<dyn Converter>,
}

impl FieldDescriptor {
    /// A required, non-nullable field whose wire name equals its local
    /// name.
    pub fn new(local: &'static str, converter: Arc<dyn Converter>) -> Self {
        Self {
            local,
            wire: None,
            nullable: false,
            optional: false,
            converter,
        }
    }

    /// Overrides the key used in the JSON payload.
    pub fn wire(mut self, wire: &'static str) -> Self {
        self.wire = Some(wire);
        self
    }

    /// Marks the field as allowed to be absent from the raw input.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field as accepting an explicit null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn wire_name(&self) -> &'static str {
        self.wire.unwrap_or(self.local)
    }
}

/// Shorthand for [`FieldDescriptor::new`].
pub fn field(local: &'static str, converter: Arc<dyn Converter>) -> FieldDescriptor {
    FieldDescriptor::new(local, converter)
}

/// Converts between wire-shaped and local-name-keyed mappings for one
/// model type, per its declared field table.
#[derive(Debug)]
pub struct ModelConverter {
    fields: Vec<FieldDescriptor>,
}

impl ModelConverter {
    /// Builds the converter from a field table. Declaration order is
    /// preserved in dump output.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    fn declared(&self, local: &str) -> bool {
        self.fields.iter().any(|f| f.local == local)
    }
}

impl Converter for ModelConverter {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError> {
        let Value::Object(raw) = value else {
            return Err(CoercionError::TypeMismatch {
                expected: Kind::Map,
                actual: Kind::of(value),
                path: state.path(),
            });
        };

        let mut out = Map::new();
        for descriptor in &self.fields {
            match raw.get(descriptor.wire_name()) {
                None => {
                    if !descriptor.optional {
                        return Err(CoercionError::MissingRequiredField {
                            field: descriptor.local,
                            path: state.path(),
                        });
                    }
                    // Optional and absent: leave unset, never write a
                    // null placeholder.
                }
                Some(Value::Null) => {
                    if !descriptor.nullable {
                        return Err(CoercionError::UnexpectedNull {
                            field: descriptor.local,
                            path: state.path(),
                        });
                    }
                    out.insert(descriptor.local.to_string(), Value::Null);
                }
                Some(present) => {
                    state.push_key(descriptor.local);
                    let coerced = descriptor.converter.coerce(present, state);
                    state.pop();
                    out.insert(descriptor.local.to_string(), coerced?);
                }
            }
        }
        // Unknown keys in the raw input are ignored: decoding is
        // forward-compatible, not strict.
        Ok(Value::Object(out))
    }

    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError> {
        let Param::Map(entries) = value else {
            return value.to_json(state);
        };

        let mut out = Map::new();
        for descriptor in &self.fields {
            let Some(param) = entries.get(descriptor.local) else {
                // Unset fields contribute nothing to the wire mapping.
                continue;
            };
            match param {
                Param::Value(Value::Null) => {
                    out.insert(descriptor.wire_name().to_string(), Value::Null);
                }
                present => {
                    state.push_key(descriptor.local);
                    let dumped = descriptor.converter.dump(present, state);
                    state.pop();
                    out.insert(descriptor.wire_name().to_string(), dumped?);
                }
            }
        }
        // Undeclared keys pass through unchanged, preserving the
        // extra-params behavior of raw call sites.
        for (key, param) in entries.iter() {
            if self.declared(key) {
                continue;
            }
            state.push_key(key);
            let dumped = param.to_json(state);
            state.pop();
            out.insert(key.to_string(), dumped?);
        }
        Ok(Value::Object(out))
    }
}

/// A type with a memoized [`ModelConverter`] for its field table.
///
/// Implementations construct the converter once behind a
/// `std::sync::OnceLock` and hand out clones of the shared handle.
pub trait ModelType {
    /// The converter for this model's field table.
    fn converter() -> Arc<ModelConverter>;
}

/// A request-parameter model: dumps into a wire-ready mapping.
pub trait ParamsModel: ModelType {
    /// The model's fields as a local-name-keyed parameter tree.
    fn into_param(self) -> Param;
}

/// A response model: rebuilt from an already-coerced canonical value.
pub trait ResponseModel: ModelType + Sized {
    /// Extracts the typed model from the local-name-keyed mapping produced
    /// by a successful coerce pass.
    fn from_coerced(value: Value) -> Result<Self, CoercionError>;
}

/// Runs a full coerce pass for `T` over a decoded wire value.
pub fn coerce_model<T: ResponseModel>(raw: &Value) -> Result<T, CoercionError> {
    let mut state = CoerceState::new();
    let canonical = T::converter().coerce(raw, &mut state)?;
    T::from_coerced(canonical)
}

/// Runs a full dump pass for `T`, returning the wire body and the finished
/// state (whose retry latch the caller inspects).
pub fn dump_model<T: ParamsModel>(params: T) -> Result<(Value, DumpState), SerializationError> {
    let mut state = DumpState::new();
    let param = params.into_param();
    let body = T::converter().dump(&param, &mut state)?;
    Ok((body, state))
}

/// Runs a dump pass over a loosely-typed mapping using an explicit
/// converter, for raw call sites that bypass the typed models.
pub fn dump_raw(
    converter: &ModelConverter,
    params: Value,
) -> Result<(Value, DumpState), SerializationError> {
    let mut state = DumpState::new();
    let param = Param::from(params);
    let body = converter.dump(&param, &mut state)?;
    Ok((body, state))
}
