//! Generic model conversion engine.
//!
//! Turns untyped decoded-JSON values into strongly-typed request/response
//! models and back. Every convertible type implements the same
//! two-operation [`Converter`] contract, `coerce` (raw to typed) and
//! `dump` (typed to raw), composed from primitives, lists, maps, enums,
//! unions and per-model field tables.
//!
//! Converters are constructed once per type and shared for the process
//! lifetime; [`CoerceState`] and [`DumpState`] carry the per-call context,
//! including the retry latch: a dump pass that encounters a one-shot value
//! (a [`ReadStream`]) clears `can_retry`, and the request layer then caps
//! that request's retry budget at zero.
//!
//! The engine performs no I/O and no logging; it is pure computation over
//! in-memory values. Network concerns live entirely in the client crate
//! that invokes it.

mod container;
mod converter;
mod enum_of;
mod error;
mod model;
mod param;
mod primitive;
mod state;
mod union;

pub use container::{ListOf, MapOf};
pub use converter::Converter;
pub use enum_of::EnumOf;
pub use error::{CoercionError, Kind, SerializationError};
pub use model::{
    coerce_model, dump_model, dump_raw, field, Field, FieldDescriptor, ModelConverter, ModelType,
    ParamsModel, ResponseModel,
};
pub use param::{Param, ParamMap, ReadStream};
pub use primitive::{boolean, number, string, unknown, Primitive};
pub use state::{CoerceState, DumpState};
pub use union::UnionOf;
