use protoclosure_core::error::{JsonKind, Location};
use protoclosure_core::prost_reflect::{DynamicMessage, MapKey, Value};
use protoclosure_core::schema::FieldKind;
use protoclosure_core::{
    DecodeError, EncodeError, Format, marshal, marshal_object_key_name, unmarshal,
    unmarshal_object_key_name, unmarshal_object_key_tag, unmarshal_pblite,
};
use std::collections::HashMap;
use test_schema::{ENVELOPE, SAMPLE, TEST_ALL_TYPES, WITH_MAP, message};

fn field(name: &str, tag: u32, index: Option<usize>) -> Location {
    Location::Field {
        name: name.to_string(),
        tag,
        index,
    }
}

#[test]
fn test_sub_message_with_wrong_shape() {
    let mut envelope = DynamicMessage::new(message(ENVELOPE));
    let err = unmarshal_object_key_name(r#"{"field3":42}"#, &mut envelope).unwrap_err();

    match err {
        DecodeError::ShapeMismatch {
            location,
            expected,
            found,
        } => {
            assert_eq!(location, field("protoclosure.test.Envelope.field3", 3, None));
            assert_eq!(expected, JsonKind::Object);
            assert_eq!(found, JsonKind::Number);
        }
        other => panic!("Expected ShapeMismatch, got {other:?}"),
    }

    let err = unmarshal_pblite(r#"[null,null,null,{"1":2}]"#, &mut envelope).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::ShapeMismatch {
            expected: JsonKind::Array,
            found: JsonKind::Object,
            ..
        }
    ));
}

#[test]
fn test_root_with_wrong_shape() {
    for (data, format) in [
        ("{}", Format::PbLite),
        ("{}", Format::PbLiteZeroIndex),
        ("[]", Format::ObjectKeyName),
        ("7", Format::ObjectKeyTag),
    ] {
        let mut sample = DynamicMessage::new(message(SAMPLE));
        let err = unmarshal(data, &mut sample, format).unwrap_err();

        assert!(
            matches!(err, DecodeError::ShapeMismatch { .. }),
            "{format}: {err:?}"
        );
        assert_eq!(
            err.location(),
            Some(&Location::Message {
                name: SAMPLE.to_string()
            })
        );
    }
}

#[test]
fn test_repeated_field_requires_an_array() {
    let mut sample = DynamicMessage::new(message(SAMPLE));
    let err = unmarshal_object_key_name(r#"{"field3":"foo"}"#, &mut sample).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::ShapeMismatch {
            expected: JsonKind::Array,
            found: JsonKind::String,
            ..
        }
    ));
}

#[test]
fn test_type_mismatch_reports_the_element() {
    let mut message = DynamicMessage::new(message(TEST_ALL_TYPES));
    let err =
        unmarshal_object_key_name(r#"{"repeated_int32":[1,"2",3]}"#, &mut message).unwrap_err();

    match err {
        DecodeError::TypeMismatch {
            location,
            kind,
            found,
        } => {
            assert_eq!(
                location,
                field("protoclosure.test.TestAllTypes.repeated_int32", 31, Some(1))
            );
            assert_eq!(kind, FieldKind::Int32);
            assert_eq!(found, JsonKind::String);
        }
        other => panic!("Expected TypeMismatch, got {other:?}"),
    }

    let err = unmarshal_object_key_tag(r#"{"13":"yes"}"#, &mut message).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch {
            kind: FieldKind::Bool,
            found: JsonKind::String,
            ..
        }
    ));
}

#[test]
fn test_malformed_numeric_string() {
    let mut message = DynamicMessage::new(message(TEST_ALL_TYPES));
    let err = unmarshal_object_key_name(r#"{"optional_int64":"12x"}"#, &mut message).unwrap_err();

    match &err {
        DecodeError::NumericParse {
            location,
            kind,
            input,
        } => {
            assert_eq!(
                location,
                &field("protoclosure.test.TestAllTypes.optional_int64", 2, None)
            );
            assert_eq!(*kind, FieldKind::Int64);
            assert_eq!(input, "12x");
        }
        other => panic!("Expected NumericParse, got {other:?}"),
    }

    assert_eq!(
        err.to_string(),
        "Numeric parse error in field 'protoclosure.test.TestAllTypes.optional_int64' (tag 2): \
         '12x' is not a valid int64"
    );
}

#[test]
fn test_float_out_of_range() {
    let float = field("protoclosure.test.TestAllTypes.optional_float", 11, None);

    for (data, format) in [
        ("[null,null,null,null,null,null,null,null,null,null,1e40]", Format::PbLiteZeroIndex),
        ("[null,null,null,null,null,null,null,null,null,null,null,1e40]", Format::PbLite),
        (r#"{"optional_float":-1e40}"#, Format::ObjectKeyName),
        (r#"{"11":1e40}"#, Format::ObjectKeyTag),
    ] {
        let mut message = DynamicMessage::new(message(TEST_ALL_TYPES));
        let err = unmarshal(data, &mut message, format).unwrap_err();

        assert!(
            matches!(
                &err,
                DecodeError::NumericParse {
                    kind: FieldKind::Float,
                    ..
                }
            ),
            "{format}: {err:?}"
        );
        assert_eq!(err.location(), Some(&float), "{format}");
        assert!(!message.has_field_by_name("optional_float"), "{format}");
    }
}

#[test]
fn test_invalid_json_text() {
    let mut sample = DynamicMessage::new(message(SAMPLE));
    let err = unmarshal_pblite("[null,101", &mut sample).unwrap_err();

    assert!(matches!(err, DecodeError::Json(_)));
    assert!(err.location().is_none());
}

#[test]
fn test_failed_decode_leaves_message_untouched() {
    let mut envelope = DynamicMessage::new(message(ENVELOPE));
    envelope.set_field_by_name("field1", Value::I32(7));
    let before = marshal_object_key_name(&envelope).unwrap();

    let err = unmarshal_object_key_name(
        r#"{"field1":9,"field2":["a"],"field4":[{"field1":1},{"field1":"x"}]}"#,
        &mut envelope,
    )
    .unwrap_err();

    assert_eq!(
        err.location(),
        Some(&field("protoclosure.test.Sample.field1", 1, None))
    );
    assert_eq!(marshal_object_key_name(&envelope).unwrap(), before);
}

#[test]
fn test_map_fields_are_unsupported() {
    let mut with_map = DynamicMessage::new(message(WITH_MAP));
    with_map.set_field_by_name("label", Value::String("x".to_string()));

    // An unset map field does not get in the way.
    assert_eq!(
        marshal(&with_map, Format::ObjectKeyName).unwrap(),
        r#"{"label":"x"}"#
    );

    with_map.set_field_by_name(
        "counts",
        Value::Map(HashMap::from([(MapKey::String("a".to_string()), Value::I32(1))])),
    );
    for format in Format::ALL {
        let err = marshal(&with_map, format).unwrap_err();
        assert!(
            matches!(
                err,
                EncodeError::UnsupportedFieldKind {
                    kind: FieldKind::Map,
                    ..
                }
            ),
            "{format}: {err:?}"
        );
    }

    let mut decoded = DynamicMessage::new(message(WITH_MAP));
    let err = unmarshal_object_key_name(r#"{"counts":[]}"#, &mut decoded).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnsupportedFieldKind {
            kind: FieldKind::Map,
            ..
        }
    ));
}
