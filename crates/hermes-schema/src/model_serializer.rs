//! Serializers derived from model descriptors.

use indexmap::IndexMap;

use crate::error::{DefinitionErrors, SerializerDefinitionError};
use crate::field::SchemaField;
use crate::mapping::FieldMapping;
use crate::model::ModelDescriptor;
use crate::schema::Schema;

/// Builder deriving a [`Schema`] from a model's columns.
///
/// Derivation happens once, in [`build`](Self::build), and reports every
/// problem it finds instead of stopping at the first.
///
/// # Example
///
/// ```
/// use hermes_schema::{ModelDescriptor, ModelField, ModelSerializer, StorageKind};
///
/// let model = ModelDescriptor::new("Article")
///     .field(ModelField::new("id", StorageKind::Auto))
///     .field(ModelField::new("title", StorageKind::Char))
///     .field(ModelField::new("body", StorageKind::Text));
///
/// let schema = ModelSerializer::new("ArticleSerializer")
///     .model(model)
///     .exclude(["body"])
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.field_names(), vec!["id", "title"]);
/// ```
#[derive(Debug, Clone)]
pub struct ModelSerializer {
    name: String,
    model: Option<ModelDescriptor>,
    fields: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    mapping: FieldMapping,
    extra: IndexMap<String, SchemaField>,
}

impl ModelSerializer {
    /// Starts a derivation for the serializer `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            fields: None,
            exclude: None,
            mapping: FieldMapping::serializer_defaults(),
            extra: IndexMap::new(),
        }
    }

    /// Model to derive from.
    #[must_use]
    pub fn model(mut self, model: ModelDescriptor) -> Self {
        self.model = Some(model);
        self
    }

    /// Only these columns take part.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// These columns are left out.
    #[must_use]
    pub fn exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(exclude.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the storage kind table.
    #[must_use]
    pub fn mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Declares an extra field, or overrides a derived one.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: SchemaField) -> Self {
        self.extra.insert(name.into(), field);
        self
    }

    /// Derives the schema.
    pub fn build(self) -> Result<Schema, SerializerDefinitionError> {
        let fail = |errors: Vec<String>| {
            Err(SerializerDefinitionError(DefinitionErrors::new(
                self.name.clone(),
                errors,
            )))
        };

        let Some(model) = &self.model else {
            return fail(vec!["`model` is required".into()]);
        };

        for selection in [&self.fields, &self.exclude].into_iter().flatten() {
            let missing: Vec<String> = selection
                .iter()
                .filter(|name| model.get_field(name).is_none())
                .map(|name| format!("`{name}` does not exist into model"))
                .collect();
            if !missing.is_empty() {
                return fail(missing);
            }
        }

        let fields = self.fields.as_ref().filter(|f| !f.is_empty());
        let exclude = self.exclude.as_ref().filter(|e| !e.is_empty());
        if fields.is_some() && exclude.is_some() {
            return fail(vec!["`fields` and `exclude` can not be simultaneously ".into()]);
        }

        let mut schema = Schema::new(self.name.clone());
        let mut errors = Vec::new();
        for column in model.fields() {
            let name = column.name();
            if fields.is_some_and(|f| !f.iter().any(|n| n == name)) {
                continue;
            }
            if exclude.is_some_and(|e| e.iter().any(|n| n == name)) {
                continue;
            }
            let Some(kind) = self.mapping.get(column.kind().name()) else {
                errors.push(format!(
                    "`{name}` has unknown type {}, you should add rule to SERIALIZER_FIELD_MAPPING in settings",
                    column.kind().name()
                ));
                continue;
            };

            let mut field = SchemaField::new(kind.clone()).description(column.verbose());
            if column.is_null() {
                field = field.allow_null();
            }
            schema.add_field(name, field);
        }
        if !errors.is_empty() {
            return fail(errors);
        }

        for (name, field) in &self.extra {
            schema.add_field(name.clone(), field.clone());
        }
        Ok(schema)
    }
}
