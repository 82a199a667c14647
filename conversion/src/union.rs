//! Tagged and ordered-fallback union resolution.
//!
//! When a discriminator field is configured and present, its value selects
//! the variant exclusively, with no further trial. Otherwise variants are
//! attempted in declared order and the first structurally-valid match
//! wins. That tie-break is documented policy, not an accident: reordering
//! the variant list changes which type wins for ambiguous payloads.

use std::sync::Arc;

use serde_json::Value;

use crate::converter::Converter;
use crate::error::{CoercionError, SerializationError};
use crate::param::Param;
use crate::state::{CoerceState, DumpState};

#[derive(Debug)]
struct Variant {
    tag: Option<&'static str>,
    converter: Arc<dyn Converter>,
}

/// Resolves a value against an ordered list of candidate converters.
#[derive(Debug)]
pub struct UnionOf {
    discriminator: Option<&'static str>,
    variants: Vec<Variant>,
}

impl UnionOf {
    /// An undiscriminated union: variants are tried in the declared order.
    pub fn new(variants: impl IntoIterator<Item = Arc<dyn Converter>>) -> Self {
        Self {
            discriminator: None,
            variants: variants
                .into_iter()
                .map(|converter| Variant {
                    tag: None,
                    converter,
                })
                .collect(),
        }
    }

    /// A discriminated union: the named field's value selects the variant
    /// registered under the matching tag.
    pub fn discriminated(
        field: &'static str,
        variants: impl IntoIterator<Item = (&'static str, Arc<dyn Converter>)>,
    ) -> Self {
        Self {
            discriminator: Some(field),
            variants: variants
                .into_iter()
                .map(|(tag, converter)| Variant {
                    tag: Some(tag),
                    converter,
                })
                .collect(),
        }
    }

    fn variant_for_tag(&self, tag: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|variant| variant.tag == Some(tag))
    }

    /// Renders a discriminator value for error reporting.
    fn render_tag(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Converter for UnionOf {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Result<Value, CoercionError> {
        if let (Some(field), Value::Object(map)) = (self.discriminator, value) {
            if let Some(tag_value) = map.get(field) {
                let tag = Self::render_tag(tag_value);
                return match self.variant_for_tag(&tag) {
                    Some(variant) => variant.converter.coerce(value, state),
                    None => Err(CoercionError::UnknownDiscriminator {
                        value: tag,
                        path: state.path(),
                    }),
                };
            }
        }

        // Ordered trial: failures are captured here as results, never
        // surfaced to the caller. First success wins.
        for variant in &self.variants {
            if let Ok(coerced) = variant.converter.coerce(value, state) {
                return Ok(coerced);
            }
        }
        Err(CoercionError::NoMatchingVariant { path: state.path() })
    }

    fn dump(&self, value: &Param, state: &mut DumpState) -> Result<Value, SerializationError> {
        if let (Some(field), Param::Map(map)) = (self.discriminator, value) {
            if let Some(Param::Value(tag_value)) = map.get(field) {
                let tag = Self::render_tag(tag_value);
                return match self.variant_for_tag(&tag) {
                    Some(variant) => variant.converter.dump(value, state),
                    None => Err(SerializationError::UnknownDiscriminator {
                        value: tag,
                        path: state.path(),
                    }),
                };
            }
        }

        // Undiscriminated: probe variants in declared order against a
        // scratch state, then fold the winner's latch into the caller's.
        // A stream would be consumed by the probe, so it must go through
        // a discriminated union instead.
        if value.has_stream() {
            return Err(SerializationError::StreamInUnion { path: state.path() });
        }
        for variant in &self.variants {
            let mut scratch = DumpState::new();
            if let Ok(dumped) = variant.converter.dump(value, &mut scratch) {
                state.merge_latch(&scratch);
                return Ok(dumped);
            }
        }
        Err(SerializationError::NoDumpVariant { path: state.path() })
    }
}
