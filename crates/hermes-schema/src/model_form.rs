//! Input forms derived from model descriptors.

use indexmap::IndexMap;

use hermes_core::{CapabilityRef, FieldErrors, MetaValue, KIND_FORM};

use crate::error::{DefinitionErrors, FormDefinitionError, StoreResult};
use crate::form::{CleanedData, Form, FormData, FormField, FormFieldKind};
use crate::model::{ModelField, Row, StorageKind};
use crate::store::Model;
use crate::value::Value;

/// A [`Form`] bound to a model, able to save what it validates.
#[derive(Debug, Clone)]
pub struct ModelForm {
    form: Form,
    model: Model,
}

impl ModelForm {
    /// Starts deriving a model form named `name` for `model`.
    #[must_use]
    pub fn builder(name: impl Into<String>, model: Model) -> ModelFormBuilder {
        ModelFormBuilder {
            name: name.into(),
            model,
            fields: None,
            exclude: None,
            overrides: IndexMap::new(),
        }
    }

    /// The derived form.
    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.form
    }

    /// The bound model.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Form name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.form.name()
    }

    /// Validates raw input.
    pub fn validate(&self, data: &FormData) -> Result<CleanedData, FieldErrors> {
        self.form.validate(data)
    }

    /// Stores validated data: updates `instance` if given, inserts otherwise.
    ///
    /// Only cleaned values naming a model column are written.
    pub fn save(&self, cleaned: &CleanedData, instance: Option<&Row>) -> StoreResult<Row> {
        let descriptor = self.model.descriptor();
        let values: IndexMap<String, Value> = cleaned
            .iter()
            .filter(|(name, _)| descriptor.get_field(name).is_some())
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        let source = self.model.source();
        match instance {
            Some(row) => source.update(row.pk(), values),
            None => source.insert(values),
        }
    }
}

impl From<ModelForm> for MetaValue {
    fn from(form: ModelForm) -> Self {
        let name = form.name().to_string();
        Self::Ref(CapabilityRef::new(KIND_FORM, name, form))
    }
}

/// Builder returned by [`ModelForm::builder`].
#[derive(Debug, Clone)]
pub struct ModelFormBuilder {
    name: String,
    model: Model,
    fields: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    overrides: IndexMap<String, FormField>,
}

impl ModelFormBuilder {
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

    /// Declares an extra input, or replaces a derived one.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FormField) -> Self {
        self.overrides.insert(name.into(), field);
        self
    }

    /// Derives the form.
    pub fn build(self) -> Result<ModelForm, FormDefinitionError> {
        let descriptor = self.model.descriptor();
        let fail = |errors: Vec<String>| {
            Err(FormDefinitionError(DefinitionErrors::new(
                self.name.clone(),
                errors,
            )))
        };

        let mut errors: Vec<String> = [&self.fields, &self.exclude]
            .into_iter()
            .flatten()
            .flatten()
            .filter(|name| descriptor.get_field(name).is_none())
            .map(|name| format!("`{name}` does not exist into model"))
            .collect();
        if self.fields.is_some() && self.exclude.is_some() {
            errors.push("`fields` and `exclude` can not be simultaneously ".into());
        }
        if !errors.is_empty() {
            return fail(errors);
        }

        let mut form = Form::new(self.name.clone());
        for column in descriptor.fields() {
            let name = column.name();
            let selected = match (&self.fields, &self.exclude) {
                (Some(fields), _) => fields.iter().any(|n| n == name),
                (_, Some(exclude)) => !exclude.iter().any(|n| n == name),
                (None, None) => column.is_editable(),
            };
            if selected && column.is_editable() {
                form.add_field(name, form_field_for(column));
            }
        }
        for (name, field) in &self.overrides {
            form.add_field(name.clone(), field.clone());
        }

        Ok(ModelForm {
            form,
            model: self.model.clone(),
        })
    }
}

fn form_field_for(column: &ModelField) -> FormField {
    let kind = match column.kind() {
        StorageKind::Integer
        | StorageKind::BigInteger
        | StorageKind::SmallInteger
        | StorageKind::PositiveInteger
        | StorageKind::PositiveSmallInteger
        | StorageKind::Auto
        | StorageKind::BigAuto => FormFieldKind::Integer,
        StorageKind::Boolean => FormFieldKind::Boolean,
        StorageKind::Char
        | StorageKind::Text
        | StorageKind::Slug
        | StorageKind::Uuid
        | StorageKind::GenericIpAddress
        | StorageKind::CommaSeparatedInteger => FormFieldKind::Char,
        StorageKind::Email => FormFieldKind::Email,
        StorageKind::Url => FormFieldKind::Url,
        StorageKind::Date => FormFieldKind::Date,
        StorageKind::DateTime => FormFieldKind::DateTime,
        StorageKind::Time => FormFieldKind::Time,
        StorageKind::Decimal => FormFieldKind::Decimal,
        StorageKind::Float => FormFieldKind::Float,
        StorageKind::ForeignKey | StorageKind::OneToOne => FormFieldKind::ModelChoice,
        other => FormFieldKind::Custom(other.name().to_string()),
    };

    let mut field = FormField::new(kind.clone()).label(column.verbose());
    if column.is_blank() || kind == FormFieldKind::Boolean {
        field = field.optional();
        if let Some(default) = column.default_value() {
            field = field.initial(default.clone());
        }
    }
    if let Some(max) = column.max_length_value() {
        field = field.max_length(max);
    }
    if matches!(
        column.kind(),
        StorageKind::PositiveInteger | StorageKind::PositiveSmallInteger
    ) {
        field = field.min_value(0);
    }
    field
}
