//! # Commands
//!
//! The conversions behind each subcommand. They work on in-memory bytes so `main`
//! only has to deal with files, stdin and stdout.
use crate::cli::TextFormat;
use prost::Message;
use protoclosure_core::{
    DecodeError, EncodeError, marshal, unmarshal,
    prost_reflect::{DescriptorError, DescriptorPool, DynamicMessage, MessageDescriptor},
};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("I/O error: '{0}'")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse file descriptor set: '{0}'")]
    Descriptor(#[from] DescriptorError),

    #[error("Message '{0}' not found in the file descriptor set")]
    MessageNotFound(String),

    #[error("Input is not valid UTF-8: '{0}'")]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Invalid protobuf JSON: '{0}'")]
    CanonicalJson(#[from] serde_json::Error),

    #[error("Invalid binary message: '{0}'")]
    Wire(#[from] prost::DecodeError),
}

/// Finds a message type in an encoded `FileDescriptorSet`.
pub fn load_message(
    file_descriptor_set: &[u8],
    name: &str,
) -> Result<MessageDescriptor, CommandError> {
    let pool = DescriptorPool::decode(file_descriptor_set)?;
    tracing::debug!(files = pool.files().count(), "Loaded file descriptor set");

    pool.get_message_by_name(name)
        .ok_or_else(|| CommandError::MessageNotFound(name.to_string()))
}

pub fn convert(
    descriptor: MessageDescriptor,
    from: TextFormat,
    to: TextFormat,
    input: &[u8],
) -> Result<String, CommandError> {
    let message = decode_text(descriptor, from, input)?;
    encode_text(&message, to)
}

pub fn from_binary(
    descriptor: MessageDescriptor,
    to: TextFormat,
    input: &[u8],
) -> Result<String, CommandError> {
    let message = DynamicMessage::decode(descriptor, input)?;
    encode_text(&message, to)
}

pub fn to_binary(
    descriptor: MessageDescriptor,
    from: TextFormat,
    input: &[u8],
) -> Result<Vec<u8>, CommandError> {
    let message = decode_text(descriptor, from, input)?;
    Ok(message.encode_to_vec())
}

fn decode_text(
    descriptor: MessageDescriptor,
    format: TextFormat,
    input: &[u8],
) -> Result<DynamicMessage, CommandError> {
    let text = std::str::from_utf8(input)?;

    match format.closure_format() {
        Some(format) => {
            let mut message = DynamicMessage::new(descriptor);
            unmarshal(text, &mut message, format)?;
            Ok(message)
        }
        None => {
            let mut deserializer = serde_json::Deserializer::from_str(text);
            let message = DynamicMessage::deserialize(descriptor, &mut deserializer)?;
            deserializer.end()?;
            Ok(message)
        }
    }
}

fn encode_text(message: &DynamicMessage, format: TextFormat) -> Result<String, CommandError> {
    match format.closure_format() {
        Some(format) => Ok(marshal(message, format)?),
        None => Ok(serde_json::to_string(message)?),
    }
}
