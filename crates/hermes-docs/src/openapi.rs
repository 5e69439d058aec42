//! OpenAPI document types.
//!
//! Only the parts of OpenAPI 3.0 that the generator emits are modelled:
//! <https://spec.openapis.org/oas/v3.0.3>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DocsResult;

/// The generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// Value of the `openapi` field, `3.0.2` unless configured.
    pub openapi: String,
    /// Title and version.
    pub info: Info,
    /// Mounted paths in registration order.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Serializer and error schemas referenced with `$ref`.
    #[serde(default)]
    pub components: Components,
    /// Every tag used by an operation, once.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApi {
    /// Operation registered for `path` and lower-case `method`.
    #[must_use]
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path)?.operations.get(method)
    }

    /// Renders the document as pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The `info` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Project name.
    pub title: String,
    /// Project version.
    pub version: String,
}

/// Everything mounted at one path.
///
/// Each endpoint declares a single method, so `operations` normally holds
/// one entry, keyed by the lower-case method name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// `summary` of the endpoint metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// `description` of the endpoint metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub operations: IndexMap<String, Operation>,
}

/// One method of a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Tags declared by the endpoint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Query form fields, then paginator fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Body form merged with the model form.
    #[serde(default, rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// `200` first, then one entry per declared error.
    pub responses: IndexMap<String, Response>,
}

/// Where a parameter is read from. Endpoints only take query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// The query string.
    Query,
}

/// A query parameter derived from a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Form field name.
    pub name: String,
    /// Serialized as `in`.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Field label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Mirrors the form field's `required`.
    #[serde(default)]
    pub required: bool,
    /// Converted field kind.
    pub schema: JsonSchema,
}

/// The `requestBody` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Always a single `application/json` entry.
    pub content: IndexMap<String, MediaType>,
}

/// Schema of one media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Inline schema or `$ref`.
    pub schema: JsonSchema,
}

/// One status code of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// `success` or the error kind's description.
    pub description: String,
    /// Empty when the endpoint has no serializer.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    /// A response whose `application/json` body follows `schema`.
    #[must_use]
    pub fn json(description: impl Into<String>, schema: JsonSchema) -> Self {
        let mut content = IndexMap::new();
        content.insert("application/json".to_string(), MediaType { schema });
        Self {
            description: description.into(),
            content,
        }
    }
}

/// The `components` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schemas by component name.
    #[serde(default)]
    pub schemas: IndexMap<String, JsonSchema>,
}

/// Tag catalog entry; the description repeats the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag as declared.
    pub name: String,
    /// Same as `name`.
    pub description: String,
}

/// Value of a schema's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `string`.
    String,
    /// Floats and decimals.
    Number,
    /// Integers and durations in seconds.
    Integer,
    /// `boolean`.
    Boolean,
    /// `array`.
    Array,
    /// `object`.
    Object,
}

/// The JSON Schema keywords the converter fills in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// `#/components/schemas/<name>`.
    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Absent on references.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// `date`, `date-time`, `time`, `email`, `url` or `uri`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Field description or verbose name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields of an object schema, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, JsonSchema>,
    /// Names of the required fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Element schema of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
    /// Form field `initial`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Set on the `status` and `message` of error components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Nullable model columns.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl JsonSchema {
    /// A schema of the given type.
    #[must_use]
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// A schema of the given type and format.
    #[must_use]
    pub fn formatted(schema_type: SchemaType, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..Self::of(schema_type)
        }
    }

    /// An array of `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// A reference to the component named `name`.
    #[must_use]
    pub fn component(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{name}")),
            ..Self::default()
        }
    }

    /// Sets the example value.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<serde_json::Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Adds an object property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Self) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_serialization_skips_empty() {
        let schema = JsonSchema::formatted(SchemaType::String, "date-time");
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "string", "format": "date-time"})
        );
        assert_eq!(
            serde_json::to_value(JsonSchema::component("Note")).unwrap(),
            json!({"$ref": "#/components/schemas/Note"})
        );
    }

    #[test]
    fn test_path_item_flattens_operations() {
        let mut item = PathItem {
            summary: Some("Notes".into()),
            ..PathItem::default()
        };
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "success".into(),
                content: IndexMap::new(),
            },
        );
        item.operations.insert(
            "get".into(),
            Operation {
                tags: vec!["notes".into()],
                responses,
                ..Operation::default()
            },
        );

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "summary": "Notes",
                "get": {"tags": ["notes"], "responses": {"200": {"description": "success"}}}
            })
        );
    }

    #[test]
    fn test_parameter_location() {
        let parameter = Parameter {
            name: "limit".into(),
            location: ParameterIn::Query,
            description: None,
            required: false,
            schema: JsonSchema::of(SchemaType::Integer),
        };
        let json = serde_json::to_value(&parameter).unwrap();
        assert_eq!(json["in"], "query");
        assert_eq!(json["required"], false);
    }
}
