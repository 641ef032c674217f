//! # Codec Errors
//!
//! Every decode failure is reported with the field it happened on (full name and tag,
//! plus the element position for repeated fields) and the expected vs. observed
//! kind, so a schema/format mismatch can be diagnosed from the message alone.
use crate::schema::{FieldKind, FieldSchema, MessageSchema};
use std::fmt;

/// The kind of a `serde_json::Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonKind::Null,
            serde_json::Value::Bool(_) => JsonKind::Bool,
            serde_json::Value::Number(_) => JsonKind::Number,
            serde_json::Value::String(_) => JsonKind::String,
            serde_json::Value::Array(_) => JsonKind::Array,
            serde_json::Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        })
    }
}

/// Where in a message a failure was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The value standing for a whole message.
    Message { name: String },
    /// A field value, or one element of a repeated field.
    Field {
        name: String,
        tag: u32,
        index: Option<usize>,
    },
}

impl Location {
    pub(crate) fn message(schema: &MessageSchema) -> Self {
        Location::Message {
            name: schema.descriptor().full_name().to_string(),
        }
    }

    pub(crate) fn field(field: &FieldSchema, index: Option<usize>) -> Self {
        Location::Field {
            name: field.full_name().to_string(),
            tag: field.tag(),
            index,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Message { name } => write!(f, "message '{name}'"),
            Location::Field {
                name,
                tag,
                index: None,
            } => write!(f, "field '{name}' (tag {tag})"),
            Location::Field {
                name,
                tag,
                index: Some(index),
            } => write!(f, "element {index} of field '{name}' (tag {tag})"),
        }
    }
}

/// Errors that can occur while turning a JSON value into a message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid JSON text: '{0}'")]
    Json(#[from] serde_json::Error),

    #[error("Shape mismatch in {location}: expected a JSON {expected}, found {found}")]
    ShapeMismatch {
        location: Location,
        expected: JsonKind,
        found: JsonKind,
    },

    #[error("Type mismatch in {location}: cannot decode a {kind} value from JSON {found}")]
    TypeMismatch {
        location: Location,
        kind: FieldKind,
        found: JsonKind,
    },

    #[error("Numeric parse error in {location}: '{input}' is not a valid {kind}")]
    NumericParse {
        location: Location,
        kind: FieldKind,
        input: String,
    },

    #[error("Unsupported field kind in {location}: {kind} fields have no JSON encoding")]
    UnsupportedFieldKind { location: Location, kind: FieldKind },

    #[error("Failed to convert the decoded message into '{message}': '{source}'")]
    Transcode {
        message: String,
        #[source]
        source: prost::DecodeError,
    },
}

impl DecodeError {
    /// The location of a classified failure, `None` for JSON text and transcoding errors.
    pub fn location(&self) -> Option<&Location> {
        match self {
            DecodeError::ShapeMismatch { location, .. }
            | DecodeError::TypeMismatch { location, .. }
            | DecodeError::NumericParse { location, .. }
            | DecodeError::UnsupportedFieldKind { location, .. } => Some(location),
            DecodeError::Json(_) | DecodeError::Transcode { .. } => None,
        }
    }
}

/// Errors that can occur while turning a message into JSON.
///
/// Messages are already well typed, so the only failures are fields the formats
/// cannot express.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Unsupported field kind in {location}: {kind} fields have no JSON encoding")]
    UnsupportedFieldKind { location: Location, kind: FieldKind },

    #[error("Failed to write JSON text: '{0}'")]
    Json(#[from] serde_json::Error),
}
