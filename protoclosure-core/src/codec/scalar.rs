//! # Numeric Coercion
//!
//! Conversions between single scalar field values and JSON values.
//!
//! 64-bit integers are written as decimal strings unless the field is numeric-safe,
//! since a JSON number (an IEEE double on the JavaScript side) only holds integers
//! up to 2^53 - 1 exactly. Decoding is tolerant: it accepts either representation.
use crate::{
    error::{DecodeError, JsonKind, Location},
    schema::{FieldKind, FieldSchema},
};
use prost::bytes::Bytes;
use prost_reflect::Value;
use serde_json::Number;

/// 2^53, the first integer a double cannot tell apart from its successor.
const MAX_EXACT_DOUBLE: f64 = 9_007_199_254_740_992.0;

/// How `bool` values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoolEncoding {
    /// `1` / `0`, as PBLite does.
    Number,
    /// `true` / `false`, as the Object format does.
    Literal,
}

/// Encodes a scalar value. Returns `None` for messages, lists and maps.
pub(crate) fn encode(
    value: &Value,
    numeric_safe: bool,
    bools: BoolEncoding,
) -> Option<serde_json::Value> {
    let json = match value {
        Value::Bool(b) => match bools {
            BoolEncoding::Number => serde_json::Value::from(u8::from(*b)),
            BoolEncoding::Literal => serde_json::Value::Bool(*b),
        },
        Value::I32(v) => serde_json::Value::from(*v),
        Value::U32(v) => serde_json::Value::from(*v),
        Value::EnumNumber(v) => serde_json::Value::from(*v),
        Value::I64(v) if numeric_safe => serde_json::Value::from(*v),
        Value::I64(v) => serde_json::Value::String(v.to_string()),
        Value::U64(v) if numeric_safe => serde_json::Value::from(*v),
        Value::U64(v) => serde_json::Value::String(v.to_string()),
        Value::F32(v) => float(widen(*v)),
        Value::F64(v) => float(*v),
        Value::String(s) => serde_json::Value::String(s.clone()),
        // Raw bytes travel as text. Invalid UTF-8 sequences cannot and become U+FFFD.
        Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
        Value::Message(_) | Value::List(_) | Value::Map(_) => return None,
    };
    Some(json)
}

/// Widens a float to the double with the same shortest decimal form, so `0.1f32` is
/// written as `0.1` rather than `0.10000000149011612`.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

/// Integral doubles are written without a fraction, the way JavaScript prints them.
/// `NaN` and the infinities have no JSON form and become `null`, as in `JSON.stringify`.
fn float(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_DOUBLE {
        return serde_json::Value::from(value as i64);
    }

    Number::from_f64(value).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// A scalar decode failure, before it is attributed to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScalarError {
    TypeMismatch { kind: FieldKind, found: JsonKind },
    NumericParse { kind: FieldKind, input: String },
}

impl ScalarError {
    pub(crate) fn at(self, field: &FieldSchema, index: Option<usize>) -> DecodeError {
        let location = Location::field(field, index);
        match self {
            ScalarError::TypeMismatch { kind, found } => DecodeError::TypeMismatch {
                location,
                kind,
                found,
            },
            ScalarError::NumericParse { kind, input } => DecodeError::NumericParse {
                location,
                kind,
                input,
            },
        }
    }
}

/// Decodes a scalar of the given kind.
pub(crate) fn decode(kind: FieldKind, json: &serde_json::Value) -> Result<Value, ScalarError> {
    let mismatch = || ScalarError::TypeMismatch {
        kind,
        found: JsonKind::of(json),
    };

    match (kind, json) {
        (FieldKind::Bool, serde_json::Value::Bool(b)) => Ok(Value::Bool(*b)),
        (FieldKind::Bool, serde_json::Value::Number(n)) => {
            Ok(Value::Bool(n.as_f64().is_some_and(|v| v != 0.0)))
        }

        (FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32, serde_json::Value::Number(n)) => {
            narrow(kind, n).map(Value::I32)
        }
        (FieldKind::Uint32 | FieldKind::Fixed32, serde_json::Value::Number(n)) => {
            narrow(kind, n).map(Value::U32)
        }
        (FieldKind::Enum, serde_json::Value::Number(n)) => narrow(kind, n).map(Value::EnumNumber),

        (FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64, serde_json::Value::Number(n)) => {
            as_i64(n)
                .map(Value::I64)
                .ok_or_else(|| parse_error(kind, n.to_string()))
        }
        (FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64, serde_json::Value::String(s)) => s
            .parse::<i64>()
            .map(Value::I64)
            .map_err(|_| parse_error(kind, s.clone())),
        (FieldKind::Uint64 | FieldKind::Fixed64, serde_json::Value::Number(n)) => as_u64(n)
            .map(Value::U64)
            .ok_or_else(|| parse_error(kind, n.to_string())),
        (FieldKind::Uint64 | FieldKind::Fixed64, serde_json::Value::String(s)) => s
            .parse::<u64>()
            .map(Value::U64)
            .map_err(|_| parse_error(kind, s.clone())),

        (FieldKind::Float, serde_json::Value::Number(n)) => {
            let v = n.as_f64().ok_or_else(mismatch)?;
            let narrowed = v as f32;
            // Finite input outside the float range would otherwise become infinity.
            if !narrowed.is_finite() {
                return Err(parse_error(kind, n.to_string()));
            }
            Ok(Value::F32(narrowed))
        }
        (FieldKind::Double, serde_json::Value::Number(n)) => {
            n.as_f64().map(Value::F64).ok_or_else(mismatch)
        }

        (FieldKind::String, serde_json::Value::String(s)) => Ok(Value::String(s.clone())),
        (FieldKind::Bytes, serde_json::Value::String(s)) => {
            Ok(Value::Bytes(Bytes::from(s.clone().into_bytes())))
        }

        _ => Err(mismatch()),
    }
}

fn parse_error(kind: FieldKind, input: String) -> ScalarError {
    ScalarError::NumericParse { kind, input }
}

/// Converts an exactly integral JSON number into a 32-bit integer type.
fn narrow<T: TryFrom<i64>>(kind: FieldKind, n: &Number) -> Result<T, ScalarError> {
    as_i64(n)
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| parse_error(kind, n.to_string()))
}

fn as_i64(n: &Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    let v = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

fn as_u64(n: &Number) -> Option<u64> {
    if let Some(v) = n.as_u64() {
        return Some(v);
    }
    let v = n.as_f64()?;
    (v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64).then_some(v as u64)
}
