//! Serializer schema to JSON Schema conversion.

use indexmap::IndexMap;

use hermes_core::HttpErrorKind;
use hermes_schema::{FieldKind, Schema, SchemaField, Value};

use crate::openapi::{JsonSchema, SchemaType};

/// Converts serializer schemas, registering named components on the way.
///
/// Nested schemas and error payloads become components and are referenced
/// by name. A component is registered once; later references reuse it.
pub(crate) struct Converter<'c> {
    components: &'c mut IndexMap<String, JsonSchema>,
}

impl<'c> Converter<'c> {
    pub(crate) fn new(components: &'c mut IndexMap<String, JsonSchema>) -> Self {
        Self { components }
    }

    /// Registers `schema` as a component and returns a reference to it.
    pub(crate) fn component(&mut self, schema: &Schema) -> JsonSchema {
        let name = schema.name();
        if !self.components.contains_key(name) {
            // Placeholder first so self-referencing schemas terminate.
            self.components.insert(name.to_string(), JsonSchema::default());
            let object = self.object(schema);
            self.components.insert(name.to_string(), object);
        }
        JsonSchema::component(name)
    }

    /// An inline object schema for `schema`.
    pub(crate) fn object(&mut self, schema: &Schema) -> JsonSchema {
        let mut object = JsonSchema::of(SchemaType::Object);
        for (name, field) in schema.fields() {
            if field.is_required() {
                object.required.push(name.to_string());
            }
            let property = self.field(field);
            object.properties.insert(name.to_string(), property);
        }
        object
    }

    pub(crate) fn field(&mut self, field: &SchemaField) -> JsonSchema {
        let mut schema = self.kind(field.kind());
        schema.description = field.description_text().map(str::to_string);
        schema.nullable = field.is_nullable();
        schema.default = field.default_value().map(Value::to_json);
        schema
    }

    pub(crate) fn kind(&mut self, kind: &FieldKind) -> JsonSchema {
        match kind {
            FieldKind::Int | FieldKind::TimeDelta => JsonSchema::of(SchemaType::Integer),
            FieldKind::Float | FieldKind::Decimal => JsonSchema::of(SchemaType::Number),
            FieldKind::Bool => JsonSchema::of(SchemaType::Boolean),
            FieldKind::Str => JsonSchema::of(SchemaType::String),
            FieldKind::Email => JsonSchema::formatted(SchemaType::String, "email"),
            FieldKind::Url => JsonSchema::formatted(SchemaType::String, "url"),
            FieldKind::Date => JsonSchema::formatted(SchemaType::String, "date"),
            FieldKind::DateTime => JsonSchema::formatted(SchemaType::String, "date-time"),
            FieldKind::Time => JsonSchema::formatted(SchemaType::String, "time"),
            FieldKind::File => JsonSchema::formatted(SchemaType::String, "uri"),
            FieldKind::Dict => JsonSchema::of(SchemaType::Object),
            FieldKind::Raw => JsonSchema::default(),
            FieldKind::List(inner) => JsonSchema::array(self.kind(inner)),
            FieldKind::Nested { schema, many } => {
                let reference = self.component(schema);
                if *many {
                    JsonSchema::array(reference)
                } else {
                    reference
                }
            }
        }
    }

    /// Registers the payload schema of an error kind and references it.
    pub(crate) fn error(&mut self, kind: HttpErrorKind) -> JsonSchema {
        let name = kind.schema_name();
        self.components.entry(name.to_string()).or_insert_with(|| {
            let mut schema = JsonSchema::of(SchemaType::Object)
                .property(
                    "status",
                    JsonSchema::of(SchemaType::String).with_example(kind.alias()),
                )
                .property(
                    "message",
                    JsonSchema::of(SchemaType::String).with_example(kind.description()),
                )
                .property("data", JsonSchema::of(SchemaType::Object));
            if kind.has_field_problems() {
                schema = schema.property("field_problems", JsonSchema::of(SchemaType::Object));
            }
            schema
        });
        JsonSchema::component(name)
    }
}
