//! # Text Entry Points
//!
//! Encode messages to JSON text and decode JSON text into messages. The text layer is
//! `serde_json`, which escapes control characters per standard JSON rules.
use crate::{
    codec,
    error::{DecodeError, EncodeError},
    format::Format,
};
use prost_reflect::{DynamicMessage, ReflectMessage};

/// Encodes a message into JSON text in the given format.
pub fn marshal(message: &DynamicMessage, format: Format) -> Result<String, EncodeError> {
    let value = codec::to_value(message, format)?;
    Ok(serde_json::to_string(&value)?)
}

/// Decodes JSON text in the given format and places the result in `message`.
///
/// On error `message` is left untouched.
pub fn unmarshal(data: &str, message: &mut DynamicMessage, format: Format) -> Result<(), DecodeError> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    codec::from_value(&value, message, format)
}

/// Encodes a message into the PBLite format.
pub fn marshal_pblite(message: &DynamicMessage) -> Result<String, EncodeError> {
    marshal(message, Format::PbLite)
}

/// Encodes a message into the zero-indexed PBLite format.
pub fn marshal_pblite_zero_index(message: &DynamicMessage) -> Result<String, EncodeError> {
    marshal(message, Format::PbLiteZeroIndex)
}

/// Encodes a message into the Object format keyed by field name.
pub fn marshal_object_key_name(message: &DynamicMessage) -> Result<String, EncodeError> {
    marshal(message, Format::ObjectKeyName)
}

/// Encodes a message into the Object format keyed by tag number.
pub fn marshal_object_key_tag(message: &DynamicMessage) -> Result<String, EncodeError> {
    marshal(message, Format::ObjectKeyTag)
}

/// Decodes PBLite text into `message`.
pub fn unmarshal_pblite(data: &str, message: &mut DynamicMessage) -> Result<(), DecodeError> {
    unmarshal(data, message, Format::PbLite)
}

/// Decodes zero-indexed PBLite text into `message`.
pub fn unmarshal_pblite_zero_index(
    data: &str,
    message: &mut DynamicMessage,
) -> Result<(), DecodeError> {
    unmarshal(data, message, Format::PbLiteZeroIndex)
}

/// Decodes Object text keyed by field name into `message`.
pub fn unmarshal_object_key_name(
    data: &str,
    message: &mut DynamicMessage,
) -> Result<(), DecodeError> {
    unmarshal(data, message, Format::ObjectKeyName)
}

/// Decodes Object text keyed by tag number into `message`.
pub fn unmarshal_object_key_tag(data: &str, message: &mut DynamicMessage) -> Result<(), DecodeError> {
    unmarshal(data, message, Format::ObjectKeyTag)
}

/// Encodes any reflectable message, including generated `prost` types.
pub fn marshal_message<M: ReflectMessage>(message: &M, format: Format) -> Result<String, EncodeError> {
    marshal(&message.transcode_to_dynamic(), format)
}

/// Decodes JSON text into a generated `prost` type.
pub fn unmarshal_message<M>(data: &str, format: Format) -> Result<M, DecodeError>
where
    M: ReflectMessage + Default,
{
    let descriptor = M::default().descriptor();
    let value: serde_json::Value = serde_json::from_str(data)?;

    let message = codec::decode_new(&value, descriptor.clone(), format)?;
    message
        .transcode_to::<M>()
        .map_err(|source| DecodeError::Transcode {
            message: descriptor.full_name().to_string(),
            source,
        })
}
