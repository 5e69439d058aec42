//! Endpoint metadata contracts.
//!
//! Every endpoint carries a [`Meta`]: its HTTP method, tags, optional input
//! forms, output serializer, declared errors and any extra fields a generic
//! view needs (`model`, `object_key`, `paginator`, ...).
//!
//! A `Meta` is produced once, at definition time, by [`Meta::define`]:
//!
//! 1. the endpoint's own [`MetaLayer`] is merged over its base `Meta`
//!    (values the layer does not set are copied from the base);
//! 2. the merged values are checked against a [`MetaSchema`];
//! 3. every violation is collected into a single [`IncorrectMeta`].
//!
//! After that the `Meta` is read-only.
//!
//! # Example
//!
//! ```
//! use hermes_core::{HttpMethod, Meta, MetaLayer, MetaSchema};
//!
//! let meta = Meta::define(
//!     "PingView",
//!     None,
//!     MetaLayer::new().method(HttpMethod::Get).tags(["health"]),
//!     &MetaSchema::base(),
//! )
//! .unwrap();
//!
//! assert_eq!(meta.method(), HttpMethod::Get);
//! assert_eq!(meta.tags(), ["health".to_string()]);
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::HttpErrorKind;

/// Capability kind of input validation forms.
pub const KIND_FORM: &str = "Form";
/// Capability kind of output serializers.
pub const KIND_SERIALIZER: &str = "Serializer";
/// Capability kind of storage models.
pub const KIND_MODEL: &str = "Model";
/// Capability kind of paginators.
pub const KIND_PAGINATOR: &str = "Paginator";

/// HTTP methods an endpoint may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// All methods.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
    ];

    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// Returns true if the incoming `http::Method` is this method.
    #[must_use]
    pub fn matches(self, method: &http::Method) -> bool {
        method.as_str() == self.as_str()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown HTTP method: {s}"))
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Trace => Self::TRACE,
        }
    }
}

/// A shared reference to a capability object (form, serializer, model,
/// paginator) stored in metadata.
///
/// The `kind` plays the role of a base class: a rule expecting "subclass of
/// `Form`" accepts any reference whose kind is [`KIND_FORM`].
#[derive(Clone)]
pub struct CapabilityRef {
    kind: &'static str,
    name: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl CapabilityRef {
    /// Wraps a capability object.
    pub fn new<T: Any + Send + Sync>(kind: &'static str, name: impl Into<String>, value: T) -> Self {
        Self {
            kind,
            name: name.into(),
            value: Arc::new(value),
        }
    }

    /// Capability kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Display name of the wrapped object (e.g. the form's class name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrows the wrapped object as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns true if both references share the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for CapabilityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.name)
    }
}

/// A declared metadata value.
#[derive(Debug, Clone)]
pub enum MetaValue {
    /// A string.
    Str(String),
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// An ordered list.
    List(Vec<MetaValue>),
    /// A reference to an error kind.
    Error(HttpErrorKind),
    /// A reference to a capability object.
    Ref(CapabilityRef),
}

impl MetaValue {
    /// Type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "str",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Error(_) => "HttpError",
            Self::Ref(r) => r.kind(),
        }
    }

    /// Borrows a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrows a capability reference.
    #[must_use]
    pub const fn as_capability(&self) -> Option<&CapabilityRef> {
        match self {
            Self::Ref(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<HttpMethod> for MetaValue {
    fn from(value: HttpMethod) -> Self {
        Self::Str(value.as_str().to_string())
    }
}

impl From<HttpErrorKind> for MetaValue {
    fn from(value: HttpErrorKind) -> Self {
        Self::Error(value)
    }
}

impl From<CapabilityRef> for MetaValue {
    fn from(value: CapabilityRef) -> Self {
        Self::Ref(value)
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Plain value types a rule can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// `str`
    Str,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `list`
    List,
}

impl ValueType {
    const fn name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::List => "list",
        }
    }

    fn accepts(self, value: &MetaValue) -> bool {
        matches!(
            (self, value),
            (Self::Str, MetaValue::Str(_))
                | (Self::Bool, MetaValue::Bool(_))
                | (Self::Int, MetaValue::Int(_))
                | (Self::List, MetaValue::List(_))
        )
    }
}

/// What a metadata attribute must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A plain value of the given type.
    Type(ValueType),
    /// A capability reference of the given kind.
    SubclassOf(&'static str),
}

/// Validation rule for one metadata attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaRule {
    expected: Expected,
    optional: bool,
    choices: Option<&'static [&'static str]>,
}

impl MetaRule {
    /// A required attribute.
    #[must_use]
    pub const fn required(expected: Expected) -> Self {
        Self {
            expected,
            optional: false,
            choices: None,
        }
    }

    /// An optional attribute.
    #[must_use]
    pub const fn optional(expected: Expected) -> Self {
        Self {
            expected,
            optional: true,
            choices: None,
        }
    }

    /// Restricts string values to a fixed set, compared ignoring ASCII case.
    #[must_use]
    pub const fn one_of(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Whether the attribute may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// What the attribute must hold.
    #[must_use]
    pub const fn expected(&self) -> Expected {
        self.expected
    }

    fn check(&self, name: &str, value: Option<&MetaValue>, errors: &mut Vec<String>) {
        let Some(value) = value else {
            if !self.optional {
                errors.push(format!("`{name}` is required"));
            }
            return;
        };

        match self.expected {
            Expected::SubclassOf(kind) => {
                if !matches!(value, MetaValue::Ref(r) if r.kind() == kind) {
                    errors.push(format!(
                        "`{name}` has incorrect type, should be subclass of `{kind}`"
                    ));
                }
            }
            Expected::Type(ty) => {
                if !ty.accepts(value) {
                    errors.push(format!(
                        "`{name}` has incorrect type, should be `{}`",
                        ty.name()
                    ));
                } else if let (Some(choices), MetaValue::Str(s)) = (self.choices, value) {
                    if !choices.iter().any(|c| c.eq_ignore_ascii_case(s)) {
                        errors.push(format!(
                            "`{name}` has incorrect value, should be one of {}",
                            choices.join(", ")
                        ));
                    }
                }
            }
        }
    }
}

const METHOD_NAMES: &[&str] = &[
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE",
];

/// The set of rules a merged [`Meta`] is validated against.
///
/// Rules are evaluated in alphabetical order of attribute name, after the
/// dedicated `tags` and `errors` checks.
#[derive(Debug, Clone, Default)]
pub struct MetaSchema {
    rules: BTreeMap<String, MetaRule>,
}

impl MetaSchema {
    /// An empty schema (only `tags` and `errors` are checked).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules shared by every endpoint.
    #[must_use]
    pub fn base() -> Self {
        Self::empty()
            .rule(
                "method",
                MetaRule::required(Expected::Type(ValueType::Str)).one_of(METHOD_NAMES),
            )
            .rule("summary", MetaRule::optional(Expected::Type(ValueType::Str)))
            .rule("description", MetaRule::optional(Expected::Type(ValueType::Str)))
            .rule("query_form", MetaRule::optional(Expected::SubclassOf(KIND_FORM)))
            .rule("body_form", MetaRule::optional(Expected::SubclassOf(KIND_FORM)))
            .rule("serializer", MetaRule::optional(Expected::SubclassOf(KIND_SERIALIZER)))
            .rule("serializer_many", MetaRule::optional(Expected::Type(ValueType::Bool)))
    }

    /// Adds or replaces a rule.
    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, rule: MetaRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    /// Looks up the rule for an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetaRule> {
        self.rules.get(name)
    }

    /// Iterates rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// The values an endpoint declares on top of its base metadata.
#[derive(Debug, Clone, Default)]
pub struct MetaLayer {
    values: IndexMap<String, MetaValue>,
}

impl MetaLayer {
    /// An empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets any attribute.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets `method`.
    #[must_use]
    pub fn method(self, method: HttpMethod) -> Self {
        self.set("method", method)
    }

    /// Sets `tags`.
    #[must_use]
    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<MetaValue> = tags.into_iter().map(|t| MetaValue::Str(t.into())).collect();
        self.set("tags", MetaValue::List(tags))
    }

    /// Sets `summary`.
    #[must_use]
    pub fn summary(self, summary: impl Into<String>) -> Self {
        self.set("summary", summary.into())
    }

    /// Sets `description`.
    #[must_use]
    pub fn description(self, description: impl Into<String>) -> Self {
        self.set("description", description.into())
    }

    /// Sets `serializer_many`.
    #[must_use]
    pub fn serializer_many(self, many: bool) -> Self {
        self.set("serializer_many", many)
    }

    /// Sets `errors`.
    #[must_use]
    pub fn errors(self, errors: impl IntoIterator<Item = HttpErrorKind>) -> Self {
        let errors: Vec<MetaValue> = errors.into_iter().map(MetaValue::Error).collect();
        self.set("errors", MetaValue::List(errors))
    }

    /// Returns true if the layer sets the attribute.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Fills attributes this layer leaves unset from `base`.
    ///
    /// Used for abstract bases (generic views) that are never validated on
    /// their own.
    #[must_use]
    pub fn over(mut self, base: &Self) -> Self {
        for (name, value) in &base.values {
            if !self.values.contains_key(name) {
                self.values.insert(name.clone(), value.clone());
            }
        }
        self
    }
}

/// Validated, immutable endpoint metadata.
#[derive(Debug, Clone)]
pub struct Meta {
    class_name: String,
    values: IndexMap<String, MetaValue>,
    method: HttpMethod,
    tags: Vec<String>,
}

impl Meta {
    /// Merges `layer` over `base` and validates the result against `schema`.
    ///
    /// All violations are reported at once.
    pub fn define(
        class_name: impl Into<String>,
        base: Option<&Meta>,
        layer: MetaLayer,
        schema: &MetaSchema,
    ) -> Result<Self, IncorrectMeta> {
        let class_name = class_name.into();
        let mut values = layer.values;
        if let Some(base) = base {
            for (name, value) in &base.values {
                if !values.contains_key(name) {
                    values.insert(name.clone(), value.clone());
                }
            }
        }

        let mut errors = Vec::new();
        check_tags(values.get("tags"), &mut errors);
        check_errors(values.get("errors"), &mut errors);
        for (name, rule) in schema.iter() {
            rule.check(name, values.get(name), &mut errors);
        }

        let method = values
            .get("method")
            .and_then(MetaValue::as_str)
            .and_then(|m| m.parse::<HttpMethod>().ok());
        let method = match method {
            Some(method) if errors.is_empty() => method,
            Some(_) => return Err(IncorrectMeta::new(class_name, errors)),
            None => {
                if errors.is_empty() {
                    errors.push("`method` is required".to_string());
                }
                return Err(IncorrectMeta::new(class_name, errors));
            }
        };

        let tags = match values.get("tags") {
            Some(MetaValue::List(items)) => items
                .iter()
                .filter_map(MetaValue::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            class_name,
            values,
            method,
            tags,
        })
    }

    /// Name of the endpoint this metadata belongs to.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Declared HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Declared tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Optional summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.get_str("summary")
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    /// Whether the serializer treats results as sequences.
    #[must_use]
    pub fn serializer_many(&self) -> bool {
        self.get_bool("serializer_many").unwrap_or(false)
    }

    /// Declared error kinds, in declaration order.
    #[must_use]
    pub fn errors(&self) -> Vec<HttpErrorKind> {
        match self.values.get("errors") {
            Some(MetaValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    MetaValue::Error(kind) => Some(*kind),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Raw attribute lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetaValue> {
        self.values.get(name)
    }

    /// String attribute lookup.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(MetaValue::as_str)
    }

    /// Boolean attribute lookup.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(MetaValue::as_bool)
    }

    /// Capability reference lookup.
    #[must_use]
    pub fn capability(&self, name: &str) -> Option<&CapabilityRef> {
        self.get(name).and_then(MetaValue::as_capability)
    }

    /// Capability lookup downcast to its concrete type.
    #[must_use]
    pub fn capability_as<T: Any>(&self, name: &str) -> Option<&T> {
        self.capability(name).and_then(CapabilityRef::downcast_ref::<T>)
    }

    /// Returns true if the attribute is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates every attribute.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn check_tags(tags: Option<&MetaValue>, errors: &mut Vec<String>) {
    match tags {
        None => errors.push("`tags` is required".to_string()),
        Some(MetaValue::List(items)) if items.is_empty() => {
            errors.push("`tags` is required".to_string());
        }
        Some(MetaValue::List(items)) => {
            if items.iter().any(|t| !matches!(t, MetaValue::Str(_))) {
                errors.push("`tags` item has incorrect type, should be str".to_string());
            }
        }
        Some(_) => errors.push("`tags` has incorrect type, should be `list`".to_string()),
    }
}

fn check_errors(declared: Option<&MetaValue>, errors: &mut Vec<String>) {
    match declared {
        None => {}
        Some(MetaValue::List(items)) => {
            if items.iter().any(|e| !matches!(e, MetaValue::Error(_))) {
                errors.push(
                    "`errors` item has incorrect type, should be subtype of HttpError".to_string(),
                );
            }
        }
        Some(_) => errors.push("`errors` has incorrect type, should be `list`".to_string()),
    }
}

/// Definition-time failure listing every metadata violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Meta class of {class_name} is incorrect {}", bullets(.errors))]
pub struct IncorrectMeta {
    class_name: String,
    errors: Vec<String>,
}

impl IncorrectMeta {
    /// Creates the failure for a class.
    #[must_use]
    pub fn new(class_name: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            class_name: class_name.into(),
            errors,
        }
    }

    /// The offending endpoint class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Every violation, in evaluation order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

fn bullets(errors: &[String]) -> String {
    errors.iter().map(|e| format!("\n* {e}")).collect()
}
