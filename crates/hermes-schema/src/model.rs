//! Storage model descriptions.
//!
//! Hermes does not implement persistence. A [`ModelDescriptor`] only
//! describes the columns of a stored entity so that serializers and forms
//! can be derived from it; rows come from a [`DataSource`](crate::DataSource).

use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::{Record, Value};

/// Storage type of a model column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Auto-incremented integer primary key.
    Auto,
    /// Auto-incremented 64-bit primary key.
    BigAuto,
    /// Reference to another model (stored as its key).
    ForeignKey,
    /// One-to-one reference.
    OneToOne,
    /// Integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// 16-bit integer.
    SmallInteger,
    /// Non-negative integer.
    PositiveInteger,
    /// Non-negative 16-bit integer.
    PositiveSmallInteger,
    /// Boolean.
    Boolean,
    /// Bounded text.
    Char,
    /// Unbounded text.
    Text,
    /// URL-safe text.
    Slug,
    /// Email address.
    Email,
    /// URL.
    Url,
    /// UUID.
    Uuid,
    /// IPv4/IPv6 address.
    GenericIpAddress,
    /// Comma separated integers.
    CommaSeparatedInteger,
    /// Date.
    Date,
    /// Timestamp.
    DateTime,
    /// Time of day.
    Time,
    /// Time span.
    Duration,
    /// Decimal.
    Decimal,
    /// Float.
    Float,
    /// Stored file.
    File,
    /// Stored image.
    Image,
    /// Any other storage type, identified by name.
    Custom(String),
}

impl StorageKind {
    /// Storage type name, as used in mapping tables.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Auto => "AutoField",
            Self::BigAuto => "BigAutoField",
            Self::ForeignKey => "ForeignKey",
            Self::OneToOne => "OneToOneField",
            Self::Integer => "IntegerField",
            Self::BigInteger => "BigIntegerField",
            Self::SmallInteger => "SmallIntegerField",
            Self::PositiveInteger => "PositiveIntegerField",
            Self::PositiveSmallInteger => "PositiveSmallIntegerField",
            Self::Boolean => "BooleanField",
            Self::Char => "CharField",
            Self::Text => "TextField",
            Self::Slug => "SlugField",
            Self::Email => "EmailField",
            Self::Url => "URLField",
            Self::Uuid => "UUIDField",
            Self::GenericIpAddress => "GenericIPAddressField",
            Self::CommaSeparatedInteger => "CommaSeparatedIntegerField",
            Self::Date => "DateField",
            Self::DateTime => "DateTimeField",
            Self::Time => "TimeField",
            Self::Duration => "DurationField",
            Self::Decimal => "DecimalField",
            Self::Float => "FloatField",
            Self::File => "FileField",
            Self::Image => "ImageField",
            Self::Custom(name) => name,
        }
    }

    /// Returns true for auto-incremented keys.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto | Self::BigAuto)
    }
}

/// One model column.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    name: String,
    kind: StorageKind,
    verbose_name: Option<String>,
    null: bool,
    blank: bool,
    editable: bool,
    auto_now_add: bool,
    primary_key: bool,
    max_length: Option<usize>,
    default: Option<Value>,
}

impl ModelField {
    /// A non-null, editable column.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: StorageKind) -> Self {
        let primary_key = kind.is_auto();
        Self {
            name: name.into(),
            kind,
            verbose_name: None,
            null: false,
            blank: false,
            editable: true,
            auto_now_add: false,
            primary_key,
            max_length: None,
            default: None,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    /// Allows `NULL` in storage.
    #[must_use]
    pub fn null(mut self) -> Self {
        self.null = true;
        self
    }

    /// Allows an empty value in forms.
    #[must_use]
    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Excludes the column from model forms.
    #[must_use]
    pub fn not_editable(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Sets the column to the creation time on insert. Implies not editable.
    #[must_use]
    pub fn auto_now_add(mut self) -> Self {
        self.auto_now_add = true;
        self.editable = false;
        self.blank = true;
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Maximum text length.
    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Value stored when an insert omits the column.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage type.
    #[must_use]
    pub const fn kind(&self) -> &StorageKind {
        &self.kind
    }

    /// Verbose name, defaulting to the column name with spaces.
    #[must_use]
    pub fn verbose(&self) -> String {
        self.verbose_name
            .clone()
            .unwrap_or_else(|| self.name.replace('_', " "))
    }

    /// Whether storage accepts `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.null
    }

    /// Whether forms accept an empty value.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.blank
    }

    /// Whether model forms include the column.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.editable && !self.kind.is_auto()
    }

    /// Whether inserts stamp the creation time.
    #[must_use]
    pub const fn is_auto_now_add(&self) -> bool {
        self.auto_now_add
    }

    /// Whether this is the primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Maximum text length.
    #[must_use]
    pub const fn max_length_value(&self) -> Option<usize> {
        self.max_length
    }

    /// Insert default.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A stored entity's column list.
///
/// # Example
///
/// ```
/// use hermes_schema::{ModelDescriptor, ModelField, StorageKind};
///
/// let model = ModelDescriptor::new("Article")
///     .field(ModelField::new("id", StorageKind::Auto))
///     .field(ModelField::new("title", StorageKind::Char).max_length(200));
///
/// assert_eq!(model.pk_name(), "id");
/// assert!(model.get_field("title").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    name: String,
    fields: Vec<ModelField>,
}

impl ModelDescriptor {
    /// A model without columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn field(mut self, field: ModelField) -> Self {
        self.fields.push(field);
        self
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[ModelField] {
        &self.fields
    }

    /// Looks up a column.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Name of the primary key column (`id` if none is declared).
    #[must_use]
    pub fn pk_name(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.is_primary_key())
            .map_or("id", ModelField::name)
    }
}

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    model: Arc<str>,
    pk_name: Arc<str>,
    values: IndexMap<String, Value>,
}

impl Row {
    /// Creates a row of `descriptor` from column values.
    #[must_use]
    pub fn new(descriptor: &ModelDescriptor, values: IndexMap<String, Value>) -> Self {
        Self {
            model: Arc::from(descriptor.name()),
            pk_name: Arc::from(descriptor.pk_name()),
            values,
        }
    }

    /// Model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reads a column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Primary key value.
    #[must_use]
    pub fn pk(&self) -> &Value {
        self.values.get(&*self.pk_name).unwrap_or(&Value::Null)
    }

    /// Writes a column.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Column values in declaration order.
    #[must_use]
    pub const fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Wraps the row as a [`Value::Record`].
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Record(Arc::new(self))
    }
}

impl Record for Row {
    fn type_name(&self) -> &str {
        &self.model
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn call(&self, name: &str) -> Option<Value> {
        (name == "pk").then(|| self.pk().clone())
    }

    fn attribute_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
