//! Repeated fields: JSON arrays converted element by element.
use super::{decode_single, encode_single};
use crate::{
    error::{DecodeError, EncodeError, JsonKind, Location},
    format::Format,
    schema::FieldSchema,
};
use prost_reflect::Value;

pub(super) fn encode(
    field: &FieldSchema,
    items: &[Value],
    format: Format,
) -> Result<serde_json::Value, EncodeError> {
    items
        .iter()
        .map(|item| encode_single(field, item, format))
        .collect::<Result<Vec<_>, _>>()
        .map(serde_json::Value::Array)
}

/// Decodes a JSON array; the first element that fails aborts the whole field.
///
/// An empty array yields an empty list, which is still assigned to the field.
pub(super) fn decode(
    field: &FieldSchema,
    value: &serde_json::Value,
    format: Format,
) -> Result<Value, DecodeError> {
    let serde_json::Value::Array(items) = value else {
        return Err(DecodeError::ShapeMismatch {
            location: Location::field(field, None),
            expected: JsonKind::Array,
            found: JsonKind::of(value),
        });
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_single(field, item, format, Some(index)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}
