//! OpenAPI generation from endpoint metadata.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use hermes_core::Meta;
use hermes_pipeline::PaginatorRef;
use hermes_schema::{schema_from_form, FieldMapping, Form, MetaExt, ModelForm, Schema};

use crate::convert::Converter;
use crate::error::{DocsError, DocsResult};
use crate::openapi::{
    Components, Info, JsonSchema, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Tag,
};

/// Default document title.
pub const DEFAULT_TITLE: &str = "default";
/// Default API version.
pub const DEFAULT_VERSION: &str = "1.0.0";
/// Default OpenAPI version.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.2";

/// Walks endpoint metadata and builds an [`OpenApi`] document.
///
/// For every endpoint the generator emits one operation with:
///
/// - `tags` from `Meta.tags`
/// - query `parameters` from `query_form`, plus the paginator's query form
///   when one is declared
/// - a `requestBody` from `body_form` merged with `model_form`
/// - a `200` response referencing the serializer, and one response per
///   declared error kind
///
/// # Example
///
/// ```rust
/// use hermes_core::MetaLayer;
/// use hermes_docs::DocsGenerator;
/// use hermes_pipeline::GetView;
/// use hermes_schema::{MemoryStore, ModelDescriptor, ModelField, StorageKind};
///
/// let store = MemoryStore::new(
///     ModelDescriptor::new("Note").field(ModelField::new("id", StorageKind::Auto)),
/// );
/// let view = GetView::define("GetNote", MetaLayer::new().tags(["notes"]).set("model", store.model())).unwrap();
///
/// let doc = DocsGenerator::new()
///     .title("Notes")
///     .generate([("/notes/get", view.meta())])
///     .unwrap();
/// let operation = doc.operation("/notes/get", "get").unwrap();
/// assert_eq!(operation.parameters[0].name, "id");
/// assert!(operation.responses.contains_key("404"));
/// ```
#[derive(Debug, Clone)]
pub struct DocsGenerator {
    title: String,
    version: String,
    openapi_version: String,
    form_mapping: FieldMapping,
}

impl Default for DocsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocsGenerator {
    /// Creates a generator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
            form_mapping: FieldMapping::form_defaults(),
        }
    }

    /// Sets the document title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the OpenAPI version string.
    #[must_use]
    pub fn openapi_version(mut self, openapi_version: impl Into<String>) -> Self {
        self.openapi_version = openapi_version.into();
        self
    }

    /// Replaces the form kind table used to document forms.
    #[must_use]
    pub fn form_mapping(mut self, mapping: FieldMapping) -> Self {
        self.form_mapping = mapping;
        self
    }

    /// Documents every `(path, meta)` pair.
    pub fn generate<'a, I>(&self, endpoints: I) -> DocsResult<OpenApi>
    where
        I: IntoIterator<Item = (&'a str, &'a Meta)>,
    {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut components = Components::default();
        let mut tags: IndexSet<String> = IndexSet::new();

        for (path, meta) in endpoints {
            let method = meta.method().as_str();
            debug!(path = %path, method = %method, class = %meta.class_name(), "Documenting endpoint");

            let operation = self.operation(meta, &mut Converter::new(&mut components.schemas))?;
            tags.extend(meta.tags().iter().cloned());

            let item = paths.entry(path.to_string()).or_default();
            if item.operations.contains_key(&method.to_lowercase()) {
                return Err(DocsError::DuplicateOperation {
                    path: path.to_string(),
                    method: method.to_string(),
                });
            }
            item.summary = meta.summary().map(str::to_string).or(item.summary.take());
            item.description = meta.description().map(str::to_string).or(item.description.take());
            item.operations.insert(method.to_lowercase(), operation);
        }

        Ok(OpenApi {
            openapi: self.openapi_version.clone(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
            },
            paths,
            components,
            tags: tags
                .into_iter()
                .map(|name| Tag {
                    description: name.clone(),
                    name,
                })
                .collect(),
        })
    }

    fn operation(&self, meta: &Meta, converter: &mut Converter<'_>) -> DocsResult<Operation> {
        let mut responses = IndexMap::new();
        let success = match meta.serializer() {
            Some(serializer) => {
                let reference = converter.component(serializer);
                let schema = if meta.serializer_many() {
                    JsonSchema::array(reference)
                } else {
                    reference
                };
                Response::json("success", schema)
            }
            None => Response {
                description: "success".to_string(),
                content: IndexMap::new(),
            },
        };
        responses.insert("200".to_string(), success);
        for kind in meta.errors() {
            responses.insert(
                kind.http_code().to_string(),
                Response::json(kind.description(), converter.error(kind)),
            );
        }

        let paginator_form = PaginatorRef::declared(meta).map(|paginator| paginator.form());
        let query = merged(
            self.form_schema(meta.form("query_form"))?,
            self.form_schema(paginator_form)?,
        );
        let parameters = query
            .map(|schema| query_parameters(&schema, converter))
            .unwrap_or_default();

        let body = merged(
            self.form_schema(meta.form("body_form"))?,
            self.form_schema(meta.model_form("model_form").map(ModelForm::form))?,
        );
        let request_body = body.map(|schema| {
            let mut content = IndexMap::new();
            content.insert(
                "application/json".to_string(),
                MediaType {
                    schema: converter.object(&schema),
                },
            );
            RequestBody { content }
        });

        Ok(Operation {
            tags: meta.tags().to_vec(),
            parameters,
            request_body,
            responses,
        })
    }

    fn form_schema(&self, form: Option<&Form>) -> DocsResult<Option<Schema>> {
        Ok(form
            .map(|form| schema_from_form(form, &self.form_mapping))
            .transpose()?)
    }
}

/// Second wins on a name collision.
fn merged(first: Option<Schema>, second: Option<Schema>) -> Option<Schema> {
    match (first, second) {
        (Some(first), Some(second)) => Some(Schema::merge(&first, &second)),
        (first, second) => first.or(second),
    }
}

fn query_parameters(schema: &Schema, converter: &mut Converter<'_>) -> Vec<Parameter> {
    schema
        .fields()
        .map(|(name, field)| {
            let mut parameter_schema = converter.field(field);
            let description = parameter_schema.description.take();
            Parameter {
                name: name.to_string(),
                location: ParameterIn::Query,
                description,
                required: field.is_required(),
                schema: parameter_schema,
            }
        })
        .collect()
}
