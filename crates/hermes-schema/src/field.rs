//! Serializer fields.

use std::sync::Arc;

use chrono::{NaiveDate, SecondsFormat};
use serde_json::{Number, Value as Json};

use crate::error::SerializeError;
use crate::resolve::{FnResolver, Resolver, ResolverChain};
use crate::schema::Schema;
use crate::value::Value;

/// Wire-format kind of a serializer field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Integer.
    Int,
    /// String.
    Str,
    /// Boolean.
    Bool,
    /// Float.
    Float,
    /// Decimal rendered as a string.
    Decimal,
    /// ISO-8601 date.
    Date,
    /// ISO-8601 timestamp.
    DateTime,
    /// ISO-8601 time of day.
    Time,
    /// Whole seconds.
    TimeDelta,
    /// String holding an email address.
    Email,
    /// String holding a URL.
    Url,
    /// File, rendered as its URL.
    File,
    /// Free-form object.
    Dict,
    /// Value rendered as-is.
    Raw,
    /// Homogeneous list.
    List(Box<FieldKind>),
    /// Nested schema.
    Nested {
        /// Schema of the nested object.
        schema: Arc<Schema>,
        /// Whether the nested value is a list of objects.
        many: bool,
    },
}

impl FieldKind {
    /// List of `inner`.
    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// Nested single object.
    #[must_use]
    pub fn nested(schema: Schema) -> Self {
        Self::Nested {
            schema: Arc::new(schema),
            many: false,
        }
    }

    /// Nested list of objects.
    #[must_use]
    pub fn nested_many(schema: Schema) -> Self {
        Self::Nested {
            schema: Arc::new(schema),
            many: true,
        }
    }

    /// Kind name, as used in mapping tables.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Int => "Int".into(),
            Self::Str => "Str".into(),
            Self::Bool => "Bool".into(),
            Self::Float => "Float".into(),
            Self::Decimal => "Decimal".into(),
            Self::Date => "Date".into(),
            Self::DateTime => "DateTime".into(),
            Self::Time => "Time".into(),
            Self::TimeDelta => "TimeDelta".into(),
            Self::Email => "Email".into(),
            Self::Url => "Url".into(),
            Self::File => "File".into(),
            Self::Dict => "Dict".into(),
            Self::Raw => "Raw".into(),
            Self::List(inner) => format!("List<{}>", inner.name()),
            Self::Nested { schema, .. } => format!("Nested<{}>", schema.name()),
        }
    }

    /// Parses a scalar or list kind name (`Int`, `List<Str>`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(inner) = name.strip_prefix("List<").and_then(|r| r.strip_suffix('>')) {
            return Self::from_name(inner).map(Self::list);
        }
        let kind = match name {
            "Int" => Self::Int,
            "Str" => Self::Str,
            "Bool" => Self::Bool,
            "Float" => Self::Float,
            "Decimal" => Self::Decimal,
            "Date" => Self::Date,
            "DateTime" => Self::DateTime,
            "Time" => Self::Time,
            "TimeDelta" => Self::TimeDelta,
            "Email" => Self::Email,
            "Url" => Self::Url,
            "File" => Self::File,
            "Dict" => Self::Dict,
            "Raw" => Self::Raw,
            _ => return None,
        };
        Some(kind)
    }
}

/// One serializer field.
#[derive(Debug, Clone)]
pub struct SchemaField {
    kind: FieldKind,
    required: bool,
    allow_null: bool,
    default: Option<Value>,
    description: Option<String>,
    source: Option<String>,
    resolver: Option<Arc<dyn Resolver>>,
}

impl SchemaField {
    /// A required field of the given kind.
    #[must_use]
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            allow_null: false,
            default: None,
            description: None,
            source: None,
            resolver: None,
        }
    }

    /// Required `Int`.
    #[must_use]
    pub fn int() -> Self {
        Self::new(FieldKind::Int)
    }

    /// Required `Str`.
    #[must_use]
    pub fn str() -> Self {
        Self::new(FieldKind::Str)
    }

    /// Required `Bool`.
    #[must_use]
    pub fn bool() -> Self {
        Self::new(FieldKind::Bool)
    }

    /// Required `Float`.
    #[must_use]
    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    /// Required `DateTime`.
    #[must_use]
    pub fn datetime() -> Self {
        Self::new(FieldKind::DateTime)
    }

    /// Makes the field optional; a missing value is emitted as `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self.default = Some(Value::Null);
        self
    }

    /// Value emitted when the source has none. Implies optional.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    /// Marks the field as nullable.
    #[must_use]
    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reads the value from another attribute name.
    #[must_use]
    pub fn source(mut self, attribute: impl Into<String>) -> Self {
        self.source = Some(attribute.into());
        self
    }

    /// Computes the value from the whole source object.
    #[must_use]
    pub fn computed(mut self, f: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.resolver = Some(Arc::new(FnResolver::new(f)));
        self
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether a missing value is an error.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether `null` is an acceptable value.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.allow_null
    }

    /// Default value.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Description.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Reads this field's value out of `source`.
    pub(crate) fn read(&self, name: &str, source: &Value, chain: &ResolverChain) -> Option<Value> {
        if let Some(resolver) = &self.resolver {
            return resolver.resolve(source, name);
        }
        chain.resolve(source, self.source.as_deref().unwrap_or(name))
    }

    /// Renders one value according to this field's kind.
    pub fn dump(&self, name: &str, value: &Value) -> Result<Json, SerializeError> {
        dump_kind(&self.kind, name, value)
    }
}

fn invalid(field: &str, expected: &str, value: &Value) -> SerializeError {
    SerializeError::InvalidValue {
        field: field.to_string(),
        expected: expected.to_string(),
        found: value.type_name().to_string(),
    }
}

fn dump_kind(kind: &FieldKind, name: &str, value: &Value) -> Result<Json, SerializeError> {
    if value.is_null() {
        return Ok(Json::Null);
    }

    match kind {
        FieldKind::Int => match value {
            Value::Int(n) => Ok(Json::from(*n)),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(f) => Ok(Json::from(f.trunc() as i64)),
            Value::Bool(b) => Ok(Json::from(i64::from(*b))),
            Value::Str(s) | Value::Decimal(s) => s
                .trim()
                .parse::<i64>()
                .map(Json::from)
                .map_err(|_| invalid(name, "Int", value)),
            _ => Err(invalid(name, "Int", value)),
        },
        FieldKind::Float => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .and_then(Number::from_f64)
            .map(Json::Number)
            .ok_or_else(|| invalid(name, "Float", value)),
        FieldKind::Decimal => match value {
            Value::Decimal(s) | Value::Str(s) => Ok(Json::String(s.clone())),
            Value::Int(n) => Ok(Json::String(n.to_string())),
            Value::Float(f) => Ok(Json::String(f.to_string())),
            _ => Err(invalid(name, "Decimal", value)),
        },
        FieldKind::Bool => match value {
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Int(0) => Ok(Json::Bool(false)),
            Value::Int(1) => Ok(Json::Bool(true)),
            Value::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Json::Bool(true)),
                "false" | "0" => Ok(Json::Bool(false)),
                _ => Err(invalid(name, "Bool", value)),
            },
            _ => Err(invalid(name, "Bool", value)),
        },
        FieldKind::Str | FieldKind::Email | FieldKind::Url => match value {
            Value::Str(s) | Value::Decimal(s) => Ok(Json::String(s.clone())),
            Value::Int(n) => Ok(Json::String(n.to_string())),
            Value::Float(f) => Ok(Json::String(f.to_string())),
            Value::Bool(b) => Ok(Json::String(b.to_string())),
            Value::Date(_) | Value::DateTime(_) | Value::Time(_) => Ok(value.to_json()),
            Value::File(file) => Ok(Json::String(file.name.clone())),
            _ => Err(invalid(name, "Str", value)),
        },
        FieldKind::Date => match value {
            Value::Date(d) => Ok(Json::String(d.format("%Y-%m-%d").to_string())),
            Value::DateTime(dt) => Ok(Json::String(dt.date_naive().format("%Y-%m-%d").to_string())),
            Value::Str(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => {
                Ok(Json::String(s.clone()))
            }
            _ => Err(invalid(name, "Date", value)),
        },
        FieldKind::DateTime => match value {
            Value::DateTime(dt) => Ok(Json::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))),
            Value::Date(d) => Ok(Json::String(format!("{}T00:00:00", d.format("%Y-%m-%d")))),
            Value::Str(s) => Ok(Json::String(s.clone())),
            _ => Err(invalid(name, "DateTime", value)),
        },
        FieldKind::Time => match value {
            Value::Time(t) => Ok(Json::String(t.to_string())),
            Value::DateTime(dt) => Ok(Json::String(dt.time().to_string())),
            Value::Str(s) => Ok(Json::String(s.clone())),
            _ => Err(invalid(name, "Time", value)),
        },
        FieldKind::TimeDelta => match value {
            Value::Duration(d) => Ok(Json::from(d.num_seconds())),
            Value::Int(n) => Ok(Json::from(*n)),
            _ => Err(invalid(name, "TimeDelta", value)),
        },
        FieldKind::File => match value {
            Value::File(file) => Ok(Json::String(file.url.clone())),
            Value::Str(s) => Ok(Json::String(s.clone())),
            _ => Err(invalid(name, "File", value)),
        },
        FieldKind::Dict => match value {
            Value::Map(_) | Value::Record(_) => Ok(value.to_json()),
            _ => Err(invalid(name, "Dict", value)),
        },
        FieldKind::Raw => Ok(value.to_json()),
        FieldKind::List(inner) => match value {
            Value::List(items) => items
                .iter()
                .map(|item| dump_kind(inner, name, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            _ => Err(invalid(name, "List", value)),
        },
        FieldKind::Nested { schema, many } => schema.dump_value(value, *many),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn dump(kind: FieldKind, value: Value) -> Result<Json, SerializeError> {
        SchemaField::new(kind).dump("f", &value)
    }

    #[test]
    fn test_int_coerces_numeric_strings() {
        assert_eq!(dump(FieldKind::Int, Value::from("1")).unwrap(), json!(1));
        assert_eq!(dump(FieldKind::Int, Value::Float(2.9)).unwrap(), json!(2));
        assert!(matches!(
            dump(FieldKind::Int, Value::from("x")),
            Err(SerializeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_str_stringifies_scalars() {
        assert_eq!(dump(FieldKind::Str, Value::Int(1)).unwrap(), json!("1"));
        assert_eq!(dump(FieldKind::Str, Value::Bool(true)).unwrap(), json!("true"));
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(dump(FieldKind::Int, Value::Null).unwrap(), Json::Null);
    }

    #[test]
    fn test_temporal_kinds() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            dump(FieldKind::DateTime, Value::DateTime(dt)).unwrap(),
            json!("2024-05-01T12:30:00+00:00")
        );
        assert_eq!(dump(FieldKind::Date, Value::DateTime(dt)).unwrap(), json!("2024-05-01"));
        assert_eq!(dump(FieldKind::Time, Value::DateTime(dt)).unwrap(), json!("12:30:00"));
        assert_eq!(
            dump(FieldKind::TimeDelta, Value::Duration(Duration::hours(1))).unwrap(),
            json!(3600)
        );
    }

    #[test]
    fn test_list_of_ints() {
        let value = Value::List(vec![Value::Int(1), Value::from("2")]);
        assert_eq!(dump(FieldKind::list(FieldKind::Int), value).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for name in ["Int", "Str", "Decimal", "TimeDelta", "List<Int>", "List<List<Str>>"] {
            assert_eq!(FieldKind::from_name(name).unwrap().name(), name);
        }
        assert!(FieldKind::from_name("Nested").is_none());
    }

    #[test]
    fn test_optional_defaults_to_null() {
        let field = SchemaField::int().optional();
        assert!(!field.is_required());
        assert_eq!(field.default_value(), Some(&Value::Null));
    }
}
