//! # Schema Descriptors
//!
//! Read-only, per-message-type metadata consumed by the codecs.
//!
//! A [`MessageSchema`] is built once from a `prost_reflect::MessageDescriptor` and
//! cached for the lifetime of the process, so encoding and decoding only ever walk
//! an explicit, tag-ordered field list instead of introspecting descriptors on
//! every call.
//!
//! ## Numeric-safe fields
//!
//! JSON numbers cannot represent every 64-bit integer, so 64-bit fields are
//! written as decimal strings unless they opt in to number encoding. The opt-in is
//! read from the field's `jstype` option (`JS_NUMBER`). Fields without an explicit
//! `jstype` fall back to the naming convention used by existing PBLite schemas: a
//! name ending in `_number`.
use prost_reflect::{Cardinality, FieldDescriptor, Kind, MessageDescriptor};
use prost_types::field_options::JsType;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

const NUMERIC_SAFE_SUFFIX: &str = "_number";

/// The value kind of a field, as far as the JSON codecs are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum,
    Message,
    Group,
    /// Protobuf `map<K, V>` fields. Neither JSON format defines a layout for them.
    Map,
}

impl FieldKind {
    fn of(field: &FieldDescriptor) -> Self {
        if field.is_map() {
            return FieldKind::Map;
        }

        match field.kind() {
            Kind::Double => FieldKind::Double,
            Kind::Float => FieldKind::Float,
            Kind::Int32 => FieldKind::Int32,
            Kind::Int64 => FieldKind::Int64,
            Kind::Uint32 => FieldKind::Uint32,
            Kind::Uint64 => FieldKind::Uint64,
            Kind::Sint32 => FieldKind::Sint32,
            Kind::Sint64 => FieldKind::Sint64,
            Kind::Fixed32 => FieldKind::Fixed32,
            Kind::Fixed64 => FieldKind::Fixed64,
            Kind::Sfixed32 => FieldKind::Sfixed32,
            Kind::Sfixed64 => FieldKind::Sfixed64,
            Kind::Bool => FieldKind::Bool,
            Kind::String => FieldKind::String,
            Kind::Bytes => FieldKind::Bytes,
            Kind::Enum(_) => FieldKind::Enum,
            Kind::Message(_) if field.is_group() => FieldKind::Group,
            Kind::Message(_) => FieldKind::Message,
        }
    }

    /// Whether values of this kind may exceed the integer precision of a JSON number.
    pub fn is_64_bit_integer(self) -> bool {
        matches!(
            self,
            FieldKind::Int64
                | FieldKind::Uint64
                | FieldKind::Sint64
                | FieldKind::Fixed64
                | FieldKind::Sfixed64
        )
    }

    /// Messages and groups, which are encoded recursively with the same format.
    pub fn is_message(self) -> bool {
        matches!(self, FieldKind::Message | FieldKind::Group)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::Sint32 => "sint32",
            FieldKind::Sint64 => "sint64",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::Fixed64 => "fixed64",
            FieldKind::Sfixed32 => "sfixed32",
            FieldKind::Sfixed64 => "sfixed64",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Enum => "enum",
            FieldKind::Message => "message",
            FieldKind::Group => "group",
            FieldKind::Map => "map",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Codec metadata for a single field.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    descriptor: FieldDescriptor,
    tag: u32,
    name: String,
    kind: FieldKind,
    repeated: bool,
    numeric_safe: bool,
    message: Option<MessageDescriptor>,
}

impl FieldSchema {
    fn new(descriptor: FieldDescriptor) -> Self {
        let name = descriptor.name().to_lowercase();
        let kind = FieldKind::of(&descriptor);
        let numeric_safe = is_numeric_safe(&descriptor, &name);
        let message = match descriptor.kind() {
            Kind::Message(message) if kind.is_message() => Some(message),
            _ => None,
        };

        Self {
            tag: descriptor.number(),
            repeated: descriptor.cardinality() == Cardinality::Repeated,
            descriptor,
            name,
            kind,
            numeric_safe,
            message,
        }
    }

    /// The underlying descriptor, used to read and write the field on a `DynamicMessage`.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// The lowercased field name, which is also the Object-format key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fully qualified field name, used in error reports.
    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// Whether a 64-bit value of this field is written as a JSON number instead of a string.
    pub fn is_numeric_safe(&self) -> bool {
        self.numeric_safe
    }

    /// The sub-message type for `message` and `group` fields.
    pub fn message_descriptor(&self) -> Option<&MessageDescriptor> {
        self.message.as_ref()
    }
}

fn is_numeric_safe(field: &FieldDescriptor, lowercase_name: &str) -> bool {
    let jstype = field
        .field_descriptor_proto()
        .options
        .as_ref()
        .map(|options| options.jstype())
        .unwrap_or(JsType::JsNormal);

    match jstype {
        JsType::JsNumber => true,
        JsType::JsString => false,
        JsType::JsNormal => lowercase_name.ends_with(NUMERIC_SAFE_SUFFIX),
    }
}

/// The tag-ordered fields of one message type.
#[derive(Debug)]
pub struct MessageSchema {
    descriptor: MessageDescriptor,
    fields: Vec<FieldSchema>,
    by_tag: HashMap<u32, usize>,
}

impl MessageSchema {
    fn build(descriptor: &MessageDescriptor) -> Self {
        let mut fields: Vec<FieldSchema> = descriptor.fields().map(FieldSchema::new).collect();
        fields.sort_by_key(FieldSchema::tag);

        let by_tag = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.tag, index))
            .collect();

        Self {
            descriptor: descriptor.clone(),
            fields,
            by_tag,
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Fields in ascending tag order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldSchema> {
        self.by_tag.get(&tag).map(|&index| &self.fields[index])
    }

    /// The highest declared tag, or `0` for a message without fields.
    pub fn max_tag(&self) -> u32 {
        self.fields.last().map_or(0, FieldSchema::tag)
    }
}

/// Schemas by message full name. Distinct descriptor pools may define the same name, so
/// each name holds one schema per pool.
type SchemaCache = RwLock<HashMap<String, Vec<Arc<MessageSchema>>>>;

fn cache() -> &'static SchemaCache {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

fn lookup(
    schemas: &[Arc<MessageSchema>],
    descriptor: &MessageDescriptor,
) -> Option<Arc<MessageSchema>> {
    schemas
        .iter()
        .find(|schema| schema.descriptor() == descriptor)
        .map(Arc::clone)
}

/// Returns the cached schema of a message type, building it on first use.
///
/// Two threads missing the cache at the same time may both build the schema; the
/// results are identical and whichever is inserted first is kept.
pub fn schema_for(descriptor: &MessageDescriptor) -> Arc<MessageSchema> {
    let cached = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(descriptor.full_name())
        .and_then(|schemas| lookup(schemas, descriptor));
    if let Some(schema) = cached {
        return schema;
    }

    let schema = Arc::new(MessageSchema::build(descriptor));
    tracing::debug!(
        message = descriptor.full_name(),
        fields = schema.fields.len(),
        max_tag = schema.max_tag(),
        "Built message schema"
    );

    let mut cache = cache().write().unwrap_or_else(PoisonError::into_inner);
    let schemas = cache.entry(descriptor.full_name().to_string()).or_default();
    if let Some(existing) = lookup(schemas, descriptor) {
        return existing;
    }
    schemas.push(Arc::clone(&schema));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_reflect::DescriptorPool;
    use prost_types::{
        DescriptorProto, FieldDescriptorProto, FieldOptions, FileDescriptorProto,
        FileDescriptorSet,
        field_descriptor_proto::{Label, Type},
    };

    fn field(name: &str, number: i32, ty: Type, jstype: Option<JsType>) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            options: jstype.map(|jstype| FieldOptions {
                jstype: Some(jstype as i32),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn unordered(fields: Vec<FieldDescriptorProto>) -> MessageDescriptor {
        let file = FileDescriptorProto {
            name: Some("schema_test.proto".to_string()),
            package: Some("schema.test".to_string()),
            syntax: Some("proto2".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Unordered".to_string()),
                field: fields,
                ..Default::default()
            }],
            ..Default::default()
        };

        DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
            .unwrap()
            .get_message_by_name("schema.test.Unordered")
            .unwrap()
    }

    fn descriptor() -> MessageDescriptor {
        // Declared out of tag order on purpose.
        unordered(vec![
            field("Mixed_Case", 7, Type::String, None),
            field("plain_int64", 3, Type::Int64, None),
            field("total_number", 1, Type::Uint64, None),
            field("forced_number", 12, Type::Int64, Some(JsType::JsString)),
            field("declared", 5, Type::Sfixed64, Some(JsType::JsNumber)),
        ])
    }

    #[test]
    fn fields_are_ordered_by_tag() {
        let schema = schema_for(&descriptor());

        let tags: Vec<u32> = schema.fields().iter().map(FieldSchema::tag).collect();
        assert_eq!(tags, vec![1, 3, 5, 7, 12]);
        assert_eq!(schema.max_tag(), 12);
    }

    #[test]
    fn lookup_by_tag() {
        let schema = schema_for(&descriptor());

        assert_eq!(schema.field_by_tag(3).unwrap().name(), "plain_int64");
        assert_eq!(schema.field_by_tag(7).unwrap().kind(), FieldKind::String);
        assert!(schema.field_by_tag(2).is_none());
        assert!(schema.field_by_tag(0).is_none());
    }

    #[test]
    fn names_are_lowercased() {
        let schema = schema_for(&descriptor());
        let field = schema.field_by_tag(7).unwrap();

        assert_eq!(field.name(), "mixed_case");
        assert_eq!(field.full_name(), "schema.test.Unordered.Mixed_Case");
    }

    #[test]
    fn numeric_safety_prefers_jstype_over_name_suffix() {
        let schema = schema_for(&descriptor());
        let safe = |tag| schema.field_by_tag(tag).unwrap().is_numeric_safe();

        assert!(safe(1), "legacy '_number' suffix");
        assert!(!safe(3), "plain 64-bit field");
        assert!(safe(5), "jstype = JS_NUMBER");
        assert!(!safe(12), "jstype = JS_STRING overrides the suffix");
    }

    #[test]
    fn schemas_are_cached() {
        let descriptor = descriptor();

        let first = schema_for(&descriptor);
        let second = schema_for(&descriptor);

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn same_name_in_another_pool_gets_its_own_schema() {
        let first = descriptor();
        let second = unordered(vec![field("only", 2, Type::Bool, None)]);
        assert_eq!(first.full_name(), second.full_name());

        let first_schema = schema_for(&first);
        let second_schema = schema_for(&second);

        assert!(!Arc::ptr_eq(&first_schema, &second_schema));
        assert_eq!(first_schema.fields().len(), 5);
        assert_eq!(second_schema.fields().len(), 1);
        assert_eq!(second_schema.fields()[0].name(), "only");
        assert!(Arc::ptr_eq(&schema_for(&second), &second_schema));
    }

    #[test]
    fn concurrent_lookups_share_one_schema() {
        let descriptor = descriptor();

        let schemas: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| schema_for(&descriptor)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        for schema in &schemas {
            assert!(Arc::ptr_eq(schema, &schemas[0]));
        }
        assert!(Arc::ptr_eq(&schemas[0], &schema_for(&descriptor)));
    }
}
