//! # JSON <-> Message Codec
//!
//! This module converts `prost_reflect::DynamicMessage`s to and from `serde_json::Value`
//! trees in one of the four [`Format`]s.
//!
//! ## How it works
//!
//! 1. **Encoder (Message -> JSON)**:
//!    - Looks up the cached [`MessageSchema`](crate::schema::MessageSchema) of the message type.
//!    - Walks it position by position (PBLite) or field by field (Object).
//!    - Coerces scalars per field and recurses into sub-messages with the same format.
//!
//! 2. **Decoder (JSON -> Message)**:
//!    - Checks the value has the shape of the format (Array or Object).
//!    - Decodes every present field into a list of assignments, stopping at the first failure.
//!    - Applies the assignments only once the whole tree decoded, so a failed decode never
//!      leaves a half-written message behind.
mod list;
mod object;
mod pblite;
pub(crate) mod scalar;

use crate::{
    error::{DecodeError, EncodeError, JsonKind, Location},
    format::Format,
    schema::{FieldKind, FieldSchema, MessageSchema, schema_for},
};
use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage, Value};
use scalar::BoolEncoding;

/// Field assignments produced by a successful decode.
type Decoded<'s> = Vec<(&'s FieldSchema, Value)>;

/// Encodes a message into a JSON value.
pub fn to_value(message: &DynamicMessage, format: Format) -> Result<serde_json::Value, EncodeError> {
    tracing::debug!(
        message = message.descriptor().full_name(),
        %format,
        "Encoding message"
    );
    encode_message(message, format)
}

/// Decodes a JSON value into an existing message.
///
/// Fields present in `value` overwrite the corresponding fields of `message`; other
/// fields are left as they are. On error `message` is not modified.
pub fn from_value(
    value: &serde_json::Value,
    message: &mut DynamicMessage,
    format: Format,
) -> Result<(), DecodeError> {
    let descriptor = message.descriptor();
    tracing::debug!(message = descriptor.full_name(), %format, "Decoding message");

    let schema = schema_for(&descriptor);
    for (field, value) in decode_fields(value, &schema, format)? {
        message.set_field(field.descriptor(), value);
    }
    Ok(())
}

/// Decodes a JSON value into a new message of the given type.
pub fn decode_new(
    value: &serde_json::Value,
    descriptor: MessageDescriptor,
    format: Format,
) -> Result<DynamicMessage, DecodeError> {
    tracing::debug!(message = descriptor.full_name(), %format, "Decoding message");
    decode_message(value, descriptor, format)
}

fn encode_message(message: &DynamicMessage, format: Format) -> Result<serde_json::Value, EncodeError> {
    match format {
        Format::PbLite | Format::PbLiteZeroIndex => pblite::encode(message, format),
        Format::ObjectKeyName | Format::ObjectKeyTag => object::encode(message, format),
    }
}

fn decode_message(
    value: &serde_json::Value,
    descriptor: MessageDescriptor,
    format: Format,
) -> Result<DynamicMessage, DecodeError> {
    let schema = schema_for(&descriptor);
    let decoded = decode_fields(value, &schema, format)?;

    let mut message = DynamicMessage::new(descriptor);
    for (field, value) in decoded {
        message.set_field(field.descriptor(), value);
    }
    Ok(message)
}

fn decode_fields<'s>(
    value: &serde_json::Value,
    schema: &'s MessageSchema,
    format: Format,
) -> Result<Decoded<'s>, DecodeError> {
    match format {
        Format::PbLite | Format::PbLiteZeroIndex => pblite::decode(value, schema, format),
        Format::ObjectKeyName | Format::ObjectKeyTag => object::decode(value, schema, format),
    }
}

/// Encodes the value of a set field, repeated or not.
fn encode_field(
    field: &FieldSchema,
    value: &Value,
    format: Format,
) -> Result<serde_json::Value, EncodeError> {
    if field.kind() == FieldKind::Map {
        return Err(unsupported_kind(field));
    }

    match value {
        Value::List(items) => list::encode(field, items, format),
        value => encode_single(field, value, format),
    }
}

/// Encodes one value of a field: the field itself, or one element of a repeated field.
fn encode_single(
    field: &FieldSchema,
    value: &Value,
    format: Format,
) -> Result<serde_json::Value, EncodeError> {
    if let Value::Message(message) = value {
        return encode_message(message, format);
    }

    let bools = if format.is_pblite() {
        BoolEncoding::Number
    } else {
        BoolEncoding::Literal
    };
    scalar::encode(value, field.is_numeric_safe(), bools).ok_or_else(|| unsupported_kind(field))
}

fn unsupported_kind(field: &FieldSchema) -> EncodeError {
    EncodeError::UnsupportedFieldKind {
        location: Location::field(field, None),
        kind: field.kind(),
    }
}

/// Decodes the JSON value of a present field.
fn decode_field(
    field: &FieldSchema,
    value: &serde_json::Value,
    format: Format,
) -> Result<Value, DecodeError> {
    if field.kind() == FieldKind::Map {
        return Err(DecodeError::UnsupportedFieldKind {
            location: Location::field(field, None),
            kind: field.kind(),
        });
    }

    if field.is_repeated() {
        list::decode(field, value, format)
    } else {
        decode_single(field, value, format, None)
    }
}

/// Decodes one value of a field; `index` is the element position within a repeated field.
fn decode_single(
    field: &FieldSchema,
    value: &serde_json::Value,
    format: Format,
    index: Option<usize>,
) -> Result<Value, DecodeError> {
    let Some(descriptor) = field.message_descriptor() else {
        return scalar::decode(field.kind(), value).map_err(|error| error.at(field, index));
    };

    let expected = format.message_kind();
    let found = JsonKind::of(value);
    if found != expected {
        return Err(DecodeError::ShapeMismatch {
            location: Location::field(field, index),
            expected,
            found,
        });
    }

    decode_message(value, descriptor.clone(), format).map(Value::Message)
}
