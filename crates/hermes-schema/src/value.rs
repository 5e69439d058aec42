//! Native values flowing between forms, business logic and serializers.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value as Json};

/// An object whose attributes a serializer can read.
///
/// `attribute` is plain field access; `call` exposes computed values
/// (the equivalent of zero-argument methods). Serializers try attributes
/// first and fall back to `call`.
pub trait Record: fmt::Debug + Send + Sync {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Reads a stored attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Evaluates a computed attribute.
    fn call(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Names of stored attributes, used when the record is emitted without a
    /// serializer.
    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Storage name.
    pub name: String,
    /// Public URL.
    pub url: String,
}

impl FileRef {
    /// Creates a file reference.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A dynamically typed native value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent / null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    Str(String),
    /// Decimal kept as its normalised textual form.
    Decimal(String),
    /// Calendar date.
    Date(NaiveDate),
    /// UTC timestamp.
    DateTime(DateTime<Utc>),
    /// Time of day.
    Time(NaiveTime),
    /// Time span.
    Duration(Duration),
    /// Stored file.
    File(FileRef),
    /// Ordered list.
    List(Vec<Value>),
    /// Ordered mapping.
    Map(IndexMap<String, Value>),
    /// Opaque record.
    Record(Arc<dyn Record>),
}

impl Value {
    /// Wraps a record.
    pub fn record(record: impl Record + 'static) -> Self {
        Self::Record(Arc::new(record))
    }

    /// Short type name for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Time(_) => "time",
            Self::Duration(_) => "timedelta",
            Self::File(_) => "file",
            Self::List(_) => "list",
            Self::Map(_) => "dict",
            Self::Record(r) => r.type_name(),
        }
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view. Floats without a fractional part are accepted.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Float view of any numeric value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Decimal(d) => d.parse().ok(),
            _ => None,
        }
    }

    /// String view.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// List view.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts parsed JSON into a native value.
    #[must_use]
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Json::String(s) => Self::Str(s.clone()),
            Json::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Json::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Natural JSON rendering, used when no serializer shapes the value.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(n) => Json::Number((*n).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Str(s) | Self::Decimal(s) => Json::String(s.clone()),
            Self::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Json::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::Time(t) => Json::String(t.to_string()),
            Self::Duration(d) => Json::Number(d.num_seconds().into()),
            Self::File(file) => Json::String(file.url.clone()),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Json>>(),
            ),
            Self::Record(record) => Json::Object(
                record
                    .attribute_names()
                    .into_iter()
                    .map(|name| {
                        let value = record.attribute(&name).unwrap_or_default().to_json();
                        (name, value)
                    })
                    .collect(),
            ),
        }
    }

    /// Orders two values of compatible types.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _) => Some(Ordering::Less),
            (_, Self::Null) => Some(Ordering::Greater),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            (Self::Duration(a), Self::Duration(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::File(a), Self::File(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    f64 => Float,
    String => Str,
    &str => Str,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
    NaiveTime => Time,
    Duration => Duration,
    FileRef => File,
    Vec<Value> => List,
    IndexMap<String, Value> => Map,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
