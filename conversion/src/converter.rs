//! The two-operation conversion contract.

use std::fmt;

use serde_json::Value;

use crate::error::{CoercionError, SerializationError};
use crate::param::Param;
use crate::state::{CoerceState, DumpState};

/// The polymorphic unit of (de)serialization.
///
/// Every primitive, container, enum, union and model type implements the
/// same two operations: `coerce` turns an untyped decoded-JSON value into
/// the validated, local-name-keyed canonical shape; `dump` turns a
/// parameter tree back into wire-ready JSON.
///
/// Converters are immutable after construction and safe to share across
/// concurrently executing calls; only [`CoerceState`] and [`DumpState`]
/// carry per-call context. Neither operation mutates its input.
pub trait Converter: fmt::Debug + Send + Sync {
    /// Validates and transforms a raw decoded-JSON value into the target
    /// shape.
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError>;

    /// Transforms a parameter tree into a wire-ready JSON value. May clear
    /// the retry latch on `state` when it encounters a value that cannot
    /// be safely re-sent.
    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError>;
}
