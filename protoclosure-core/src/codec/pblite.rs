//! # PBLite
//!
//! The positional array format: the value of tag `t` sits at index `t`, or at `t - 1`
//! in the zero-indexed variant, which drops the otherwise unused slot 0.
//!
//! ```text
//! tag1 = 101, tag2 unset (repeated), tag3 = ["foo", "bar"]
//!
//! pblite             [null,101,[],["foo","bar"]]
//! pblite-zero-index  [101,[],["foo","bar"]]
//! ```
//!
//! Unset fields occupy a `null` slot, except unset repeated fields which occupy `[]`.
//! Trailing `null`s are trimmed, so decoding treats indices past the end as unset.
use super::{Decoded, decode_field, encode_field};
use crate::{
    error::{DecodeError, EncodeError, JsonKind, Location},
    format::Format,
    schema::{MessageSchema, schema_for},
};
use prost_reflect::{DynamicMessage, ReflectMessage};

fn first_tag(format: Format) -> u32 {
    match format {
        Format::PbLiteZeroIndex => 1,
        _ => 0,
    }
}

pub(super) fn encode(
    message: &DynamicMessage,
    format: Format,
) -> Result<serde_json::Value, EncodeError> {
    let schema = schema_for(&message.descriptor());

    let mut slots = Vec::new();
    for tag in first_tag(format)..=schema.max_tag() {
        let slot = match schema.field_by_tag(tag) {
            Some(field) if message.has_field(field.descriptor()) => {
                encode_field(field, &message.get_field(field.descriptor()), format)?
            }
            Some(field) if field.is_repeated() => serde_json::Value::Array(Vec::new()),
            _ => serde_json::Value::Null,
        };
        slots.push(slot);
    }

    let len = slots
        .iter()
        .rposition(|slot| !slot.is_null())
        .map_or(0, |last| last + 1);
    slots.truncate(len);

    Ok(serde_json::Value::Array(slots))
}

pub(super) fn decode<'s>(
    value: &serde_json::Value,
    schema: &'s MessageSchema,
    format: Format,
) -> Result<Decoded<'s>, DecodeError> {
    let serde_json::Value::Array(slots) = value else {
        return Err(DecodeError::ShapeMismatch {
            location: Location::message(schema),
            expected: JsonKind::Array,
            found: JsonKind::of(value),
        });
    };

    let offset = first_tag(format);
    let mut decoded = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        if slot.is_null() {
            continue;
        }

        let field = u32::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(offset))
            .and_then(|tag| schema.field_by_tag(tag));
        let Some(field) = field else {
            tracing::trace!(
                message = schema.descriptor().full_name(),
                index,
                "Ignoring PBLite slot without a field"
            );
            continue;
        };

        decoded.push((field, decode_field(field, slot, format)?));
    }

    Ok(decoded)
}
