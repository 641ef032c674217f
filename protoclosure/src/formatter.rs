use crate::commands::CommandError;
use colored::*;
use protoclosure_core::{
    DecodeError, EncodeError,
    prost_reflect::{Cardinality, Kind},
    schema::{FieldSchema, MessageSchema},
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<CommandError> for FormattedString {
    fn from(err: CommandError) -> Self {
        let title = match &err {
            CommandError::Io(_) => "I/O Failed:",
            CommandError::Descriptor(_) | CommandError::MessageNotFound(_) => {
                "Symbol Lookup Failed:"
            }
            CommandError::Utf8(_) | CommandError::CanonicalJson(_) | CommandError::Wire(_) => {
                "Invalid Input:"
            }
            CommandError::Decode(DecodeError::Json(_)) => "Invalid JSON:",
            CommandError::Decode(_) => "Decode Failed:",
            CommandError::Encode(EncodeError::Json(_)) => "Failed to write JSON:",
            CommandError::Encode(_) => "Encode Failed:",
        };

        FormattedString(format!("{}\n\n{}", title.red().bold(), err))
    }
}

impl From<&MessageSchema> for FormattedString {
    fn from(schema: &MessageSchema) -> Self {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {} {{\n",
            "message".cyan(),
            schema.descriptor().full_name().green()
        ));

        for field in schema.fields() {
            let numeric_safe = if field.kind().is_64_bit_integer() && field.is_numeric_safe() {
                format!(" {}", "// numeric-safe".purple())
            } else {
                "".to_string()
            };

            out.push_str(&format!(
                "  {} {} {} = {};{}\n",
                label(field).cyan(),
                type_name(field).yellow(),
                field.name(),
                field.tag(),
                numeric_safe
            ));
        }
        out.push('}');
        FormattedString(out)
    }
}

fn label(field: &FieldSchema) -> &'static str {
    match field.descriptor().cardinality() {
        Cardinality::Optional => "optional",
        Cardinality::Required => "required",
        Cardinality::Repeated => "repeated",
    }
}

fn type_name(field: &FieldSchema) -> String {
    match field.descriptor().kind() {
        Kind::Message(message) => format!("{} {}", field.kind(), message.full_name()),
        Kind::Enum(enum_desc) => format!("{} {}", field.kind(), enum_desc.full_name()),
        _ => field.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoclosure_core::schema::schema_for;
    use test_schema::{ENVELOPE, TEST_ALL_TYPES, WITH_MAP, message};

    #[test]
    fn test_describe_schema() {
        colored::control::set_override(false);

        let schema = schema_for(&message(ENVELOPE));
        let FormattedString(out) = FormattedString::from(schema.as_ref());

        assert_eq!(
            out,
            "message protoclosure.test.Envelope {\n  \
             optional int32 field1 = 1;\n  \
             repeated string field2 = 2;\n  \
             optional message protoclosure.test.Sample field3 = 3;\n  \
             repeated message protoclosure.test.Sample field4 = 4;\n  \
             optional uint64 count_number = 5; // numeric-safe\n\
             }"
        );
    }

    #[test]
    fn test_describe_groups_and_enums() {
        colored::control::set_override(false);

        let schema = schema_for(&message(TEST_ALL_TYPES));
        let FormattedString(out) = FormattedString::from(schema.as_ref());

        assert!(out.contains(
            "  optional group protoclosure.test.TestAllTypes.OptionalGroup optionalgroup = 16;\n"
        ));
        assert!(out.contains(
            "  optional enum protoclosure.test.TestAllTypes.NestedEnum optional_nested_enum = 21;\n"
        ));
        assert!(out.contains("  optional int64 optional_int64_number = 50; // numeric-safe\n"));
        assert!(out.contains("  optional int64 optional_int64_string = 51;\n"));
    }

    #[test]
    fn test_describe_map_fields() {
        colored::control::set_override(false);

        let schema = schema_for(&message(WITH_MAP));
        let FormattedString(out) = FormattedString::from(schema.as_ref());

        assert!(out.contains("  repeated map protoclosure.test.WithMap.CountsEntry counts = 2;\n"));
    }
}
