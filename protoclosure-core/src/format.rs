//! # JSON Formats
//!
//! The four encodings understood by closure-library's `goog.proto2` serializers.
use crate::error::JsonKind;
use std::{fmt, str::FromStr};

/// Selects one of the supported JSON encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Positional array, tag `t` at index `t` (index 0 is padding).
    PbLite,
    /// Positional array, tag `t` at index `t - 1`.
    PbLiteZeroIndex,
    /// Object keyed by lowercase field name.
    ObjectKeyName,
    /// Object keyed by decimal tag number.
    ObjectKeyTag,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown format '{0}', expected one of: pblite, pblite-zero-index, object-key-name, object-key-tag")]
pub struct UnknownFormat(pub String);

impl Format {
    pub const ALL: [Format; 4] = [
        Format::PbLite,
        Format::PbLiteZeroIndex,
        Format::ObjectKeyName,
        Format::ObjectKeyTag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::PbLite => "pblite",
            Format::PbLiteZeroIndex => "pblite-zero-index",
            Format::ObjectKeyName => "object-key-name",
            Format::ObjectKeyTag => "object-key-tag",
        }
    }

    pub fn is_pblite(self) -> bool {
        matches!(self, Format::PbLite | Format::PbLiteZeroIndex)
    }

    /// The JSON kind every message is encoded as.
    pub fn message_kind(self) -> JsonKind {
        if self.is_pblite() {
            JsonKind::Array
        } else {
            JsonKind::Object
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for format in Format::ALL {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "pbobject".parse::<Format>().unwrap_err();
        assert_eq!(err.0, "pbobject");
    }
}
