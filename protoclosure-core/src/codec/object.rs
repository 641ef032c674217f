//! # Object
//!
//! The keyed format: each set field is stored under its lowercase name, or under its
//! decimal tag number. Unset fields are left out entirely.
use super::{Decoded, decode_field, encode_field};
use crate::{
    error::{DecodeError, EncodeError, JsonKind, Location},
    format::Format,
    schema::{FieldSchema, MessageSchema, schema_for},
};
use prost_reflect::{DynamicMessage, ReflectMessage};

fn key(field: &FieldSchema, format: Format) -> String {
    match format {
        Format::ObjectKeyTag => field.tag().to_string(),
        _ => field.name().to_string(),
    }
}

pub(super) fn encode(
    message: &DynamicMessage,
    format: Format,
) -> Result<serde_json::Value, EncodeError> {
    let schema = schema_for(&message.descriptor());

    let mut entries = Vec::new();
    for field in schema.fields() {
        if !message.has_field(field.descriptor()) {
            continue;
        }
        let value = encode_field(field, &message.get_field(field.descriptor()), format)?;
        entries.push((key(field, format), value));
    }

    // Keys must come out in byte order ("10" before "2"), also when serde_json is
    // built with `preserve_order`.
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    Ok(serde_json::Value::Object(entries.into_iter().collect()))
}

/// Decodes an Object-format JSON object into field assignments.
///
/// A key whose value is `null` counts as absent and leaves the field unset. Keys that
/// match no field are ignored.
pub(super) fn decode<'s>(
    value: &serde_json::Value,
    schema: &'s MessageSchema,
    format: Format,
) -> Result<Decoded<'s>, DecodeError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(DecodeError::ShapeMismatch {
            location: Location::message(schema),
            expected: JsonKind::Object,
            found: JsonKind::of(value),
        });
    };

    let mut decoded = Vec::new();
    for field in schema.fields() {
        match entries.get(&key(field, format)) {
            None | Some(serde_json::Value::Null) => continue,
            Some(value) => decoded.push((field, decode_field(field, value, format)?)),
        }
    }

    if tracing::enabled!(tracing::Level::TRACE) {
        for unknown in entries
            .keys()
            .filter(|k| !schema.fields().iter().any(|field| key(field, format) == **k))
        {
            tracing::trace!(
                message = schema.descriptor().full_name(),
                key = unknown.as_str(),
                "Ignoring unknown Object key"
            );
        }
    }

    Ok(decoded)
}
