//! Kind mapping tables.
//!
//! Two tables translate foreign field kinds into serializer [`FieldKind`]s:
//! one keyed by storage kind name (used by [`ModelSerializer`]) and one keyed
//! by form field kind name (used to document forms). Both can be extended
//! from settings by kind name.
//!
//! [`ModelSerializer`]: crate::ModelSerializer

use indexmap::IndexMap;

use crate::error::MappingError;
use crate::field::{FieldKind, SchemaField};
use crate::form::Form;
use crate::schema::Schema;

/// A table from kind name to serializer field kind.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    entries: IndexMap<String, FieldKind>,
}

impl FieldMapping {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table for storage kinds.
    #[must_use]
    pub fn serializer_defaults() -> Self {
        let ints = [
            "AutoField",
            "BigAutoField",
            "ForeignKey",
            "OneToOneField",
            "IntegerField",
            "BigIntegerField",
            "SmallIntegerField",
            "PositiveIntegerField",
            "PositiveSmallIntegerField",
        ];
        let strs = [
            "CharField",
            "TextField",
            "SlugField",
            "EmailField",
            "URLField",
            "UUIDField",
            "GenericIPAddressField",
            "CommaSeparatedIntegerField",
        ];

        let mut mapping = Self::new();
        for name in ints {
            mapping = mapping.with(name, FieldKind::Int);
        }
        for name in strs {
            mapping = mapping.with(name, FieldKind::Str);
        }
        mapping
            .with("BooleanField", FieldKind::Bool)
            .with("DateField", FieldKind::Date)
            .with("DateTimeField", FieldKind::DateTime)
            .with("TimeField", FieldKind::Time)
            .with("DurationField", FieldKind::TimeDelta)
            .with("DecimalField", FieldKind::Decimal)
            .with("FloatField", FieldKind::Float)
            .with("FileField", FieldKind::File)
            .with("ImageField", FieldKind::File)
    }

    /// Built-in table for form field kinds.
    #[must_use]
    pub fn form_defaults() -> Self {
        Self::new()
            .with("IntegerField", FieldKind::Int)
            .with("BooleanField", FieldKind::Bool)
            .with("CharField", FieldKind::Str)
            .with("EmailField", FieldKind::Email)
            .with("URLField", FieldKind::Url)
            .with("DateField", FieldKind::Date)
            .with("DateTimeField", FieldKind::DateTime)
            .with("TimeField", FieldKind::Time)
            .with("DecimalField", FieldKind::Decimal)
            .with("FloatField", FieldKind::Float)
            .with("MultipleChoiceField", FieldKind::list(FieldKind::Str))
            .with("ModelMultipleChoiceField", FieldKind::list(FieldKind::Int))
            .with("ModelChoiceField", FieldKind::Int)
            .with("TypedChoiceField", FieldKind::Str)
    }

    /// Adds or replaces an entry.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.entries.insert(name.into(), kind);
        self
    }

    /// Layers `name -> kind name` entries (as found in settings) over the table.
    pub fn extend_from_names(mut self, names: &IndexMap<String, String>) -> Result<Self, MappingError> {
        for (source_kind, kind) in names {
            let parsed = FieldKind::from_name(kind).ok_or_else(|| MappingError::UnknownSchemaKind {
                source_kind: source_kind.clone(),
                kind: kind.clone(),
            })?;
            self.entries.insert(source_kind.clone(), parsed);
        }
        Ok(self)
    }

    /// Looks up a kind name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldKind> {
        self.entries.get(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Projects a form onto an output schema, for documentation.
///
/// The schema keeps the form's name and field order. A form field whose kind
/// has no entry in `mapping` is reported rather than dropped.
pub fn schema_from_form(form: &Form, mapping: &FieldMapping) -> Result<Schema, MappingError> {
    let mut schema = Schema::new(form.name());
    for (name, field) in form.fields() {
        let kind = mapping
            .get(field.kind().name())
            .ok_or_else(|| MappingError::UnknownFormField {
                form: form.name().to_string(),
                field: name.to_string(),
                kind: field.kind().name().to_string(),
            })?;

        let mut schema_field = SchemaField::new(kind.clone());
        if !field.is_required() {
            schema_field = schema_field.optional();
        }
        if let Some(text) = field.describe() {
            schema_field = schema_field.description(text);
        }
        schema.add_field(name, schema_field);
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormField, FormFieldKind};

    #[test]
    fn test_form_projection() {
        let form = Form::new("SearchForm")
            .with_field("page", FormField::integer().help_text("Page number"))
            .with_field("tags", FormField::new(FormFieldKind::MultipleChoice).optional())
            .with_field("owner", FormField::new(FormFieldKind::ModelChoice));

        let schema = schema_from_form(&form, &FieldMapping::form_defaults()).unwrap();
        assert_eq!(schema.name(), "SearchForm");
        assert_eq!(schema.field_names(), vec!["page", "tags", "owner"]);

        let page = schema.field("page").unwrap();
        assert!(page.is_required());
        assert_eq!(page.description_text(), Some("Page number"));
        assert_eq!(schema.field("tags").unwrap().kind().name(), "List<Str>");
        assert!(!schema.field("tags").unwrap().is_required());
        assert_eq!(schema.field("owner").unwrap().kind().name(), "Int");
    }

    #[test]
    fn test_unknown_form_kind_is_reported() {
        let form = Form::new("UploadForm")
            .with_field("blob", FormField::new(FormFieldKind::Custom("JSONField".into())));
        let err = schema_from_form(&form, &FieldMapping::form_defaults()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`blob` of UploadForm has unknown type JSONField, you should add rule to FORM_FIELD_MAPPING in settings"
        );

        let mut names = IndexMap::new();
        names.insert("JSONField".to_string(), "Dict".to_string());
        let mapping = FieldMapping::form_defaults().extend_from_names(&names).unwrap();
        assert!(schema_from_form(&form, &mapping).is_ok());
    }

    #[test]
    fn test_extension_with_bad_kind_name() {
        let mut names = IndexMap::new();
        names.insert("MoneyField".to_string(), "Money".to_string());
        assert_eq!(
            FieldMapping::serializer_defaults().extend_from_names(&names).unwrap_err(),
            MappingError::UnknownSchemaKind {
                source_kind: "MoneyField".into(),
                kind: "Money".into()
            }
        );
    }

    #[test]
    fn test_serializer_defaults_cover_storage_kinds() {
        let mapping = FieldMapping::serializer_defaults();
        assert_eq!(mapping.get("ForeignKey").unwrap().name(), "Int");
        assert_eq!(mapping.get("DurationField").unwrap().name(), "TimeDelta");
        assert_eq!(mapping.get("ImageField").unwrap().name(), "File");
        assert!(mapping.get("JSONField").is_none());
    }
}
