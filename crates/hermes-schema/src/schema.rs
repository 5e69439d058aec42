//! Serializers: named, ordered sets of output fields.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use hermes_core::{CapabilityRef, MetaValue, KIND_SERIALIZER};

use crate::error::SerializeError;
use crate::field::SchemaField;
use crate::resolve::ResolverChain;
use crate::value::Value;

/// An output schema.
///
/// # Example
///
/// ```
/// use hermes_schema::{Schema, SchemaField, Value};
/// use indexmap::IndexMap;
///
/// let schema = Schema::new("PointSerializer")
///     .with_field("x", SchemaField::int())
///     .with_field("label", SchemaField::str().optional());
///
/// let mut point = IndexMap::new();
/// point.insert("x".to_string(), Value::from("3"));
/// point.insert("secret".to_string(), Value::from("hidden"));
///
/// let json = schema.dump(&Value::Map(point)).unwrap();
/// assert_eq!(json, serde_json::json!({"x": 3, "label": null}));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: IndexMap<String, SchemaField>,
    resolvers: ResolverChain,
}

impl Schema {
    /// An empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            resolvers: ResolverChain::default(),
        }
    }

    /// Adds (or replaces) a field, builder style.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field: SchemaField) -> Self {
        self.add_field(name, field);
        self
    }

    /// Adds (or replaces) a field.
    pub fn add_field(&mut self, name: impl Into<String>, field: SchemaField) -> &mut Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Replaces the resolver chain.
    #[must_use]
    pub fn with_resolvers(mut self, resolvers: ResolverChain) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    /// Field names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes one object.
    pub fn dump(&self, source: &Value) -> Result<Json, SerializeError> {
        let mut out = Map::with_capacity(self.fields.len());
        for (name, field) in &self.fields {
            let value = match field.read(name, source, &self.resolvers) {
                Some(value) => value,
                None => match field.default_value() {
                    Some(default) => default.clone(),
                    None if field.is_required() => {
                        return Err(SerializeError::MissingField {
                            schema: self.name.clone(),
                            field: name.clone(),
                        })
                    }
                    None => continue,
                },
            };
            out.insert(name.clone(), field.dump(name, &value)?);
        }
        Ok(Json::Object(out))
    }

    /// Serializes a list of objects.
    pub fn dump_many(&self, source: &Value) -> Result<Json, SerializeError> {
        match source {
            Value::List(items) => items
                .iter()
                .map(|item| self.dump(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            other => Err(SerializeError::NotASequence {
                schema: self.name.clone(),
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Serializes a single object or a list, depending on `many`.
    pub fn dump_value(&self, source: &Value, many: bool) -> Result<Json, SerializeError> {
        if many {
            self.dump_many(source)
        } else {
            self.dump(source)
        }
    }

    /// Combines two schemas. On a name collision the field of `second` wins;
    /// field order follows `first`, then the new names of `second`.
    #[must_use]
    pub fn merge(first: &Self, second: &Self) -> Self {
        let mut merged = first.clone();
        for (name, field) in &second.fields {
            merged.fields.insert(name.clone(), field.clone());
        }
        merged
    }
}

impl From<Schema> for MetaValue {
    fn from(schema: Schema) -> Self {
        let name = schema.name.clone();
        Self::Ref(CapabilityRef::new(KIND_SERIALIZER, name, schema))
    }
}
