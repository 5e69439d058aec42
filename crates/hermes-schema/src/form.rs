//! Input validation forms.
//!
//! A [`Form`] validates raw request data (query parameters or a parsed JSON
//! body) field by field. Valid input produces [`CleanedData`] of native
//! [`Value`]s; invalid input produces [`FieldErrors`] with human-readable
//! messages per field.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value as Json};

use hermes_core::{CapabilityRef, FieldErrors, MetaValue, KIND_FORM};

use crate::store::QuerySet;
use crate::value::Value;

/// Raw input handed to a form.
pub type FormData = Map<String, Json>;

const REQUIRED: &str = "This field is required.";

/// Kind of an input form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormFieldKind {
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
    /// Decimal number.
    Decimal,
    /// Boolean flag.
    Boolean,
    /// Free text.
    Char,
    /// Email address.
    Email,
    /// URL.
    Url,
    /// Calendar date.
    Date,
    /// Timestamp.
    DateTime,
    /// Time of day.
    Time,
    /// Several values out of `choices`.
    MultipleChoice,
    /// One value out of `choices`.
    TypedChoice,
    /// Primary key of one model row.
    ModelChoice,
    /// Primary keys of several model rows.
    ModelMultipleChoice,
    /// Any other kind; values pass through unchanged.
    Custom(String),
}

impl FormFieldKind {
    /// Kind name, as used in mapping tables.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Integer => "IntegerField",
            Self::Float => "FloatField",
            Self::Decimal => "DecimalField",
            Self::Boolean => "BooleanField",
            Self::Char => "CharField",
            Self::Email => "EmailField",
            Self::Url => "URLField",
            Self::Date => "DateField",
            Self::DateTime => "DateTimeField",
            Self::Time => "TimeField",
            Self::MultipleChoice => "MultipleChoiceField",
            Self::TypedChoice => "TypedChoiceField",
            Self::ModelChoice => "ModelChoiceField",
            Self::ModelMultipleChoice => "ModelMultipleChoiceField",
            Self::Custom(name) => name,
        }
    }
}

/// One input field.
#[derive(Debug, Clone)]
pub struct FormField {
    kind: FormFieldKind,
    required: bool,
    initial: Option<Value>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    max_length: Option<usize>,
    choices: Vec<String>,
    label: Option<String>,
    help_text: Option<String>,
    queryset: Option<QuerySet>,
}

impl FormField {
    /// A required field of the given kind.
    #[must_use]
    pub fn new(kind: FormFieldKind) -> Self {
        Self {
            kind,
            required: true,
            initial: None,
            min_value: None,
            max_value: None,
            max_length: None,
            choices: Vec::new(),
            label: None,
            help_text: None,
            queryset: None,
        }
    }

    /// Required integer field.
    #[must_use]
    pub fn integer() -> Self {
        Self::new(FormFieldKind::Integer)
    }

    /// Required float field.
    #[must_use]
    pub fn float() -> Self {
        Self::new(FormFieldKind::Float)
    }

    /// Required text field.
    #[must_use]
    pub fn char() -> Self {
        Self::new(FormFieldKind::Char)
    }

    /// Boolean field (optional, as an absent flag means `false`).
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(FormFieldKind::Boolean).optional()
    }

    /// Makes the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Value used when the field is absent.
    #[must_use]
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Lower bound for numeric fields.
    #[must_use]
    pub fn min_value(mut self, min: impl Into<f64>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    /// Upper bound for numeric fields.
    #[must_use]
    pub fn max_value(mut self, max: impl Into<f64>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    /// Maximum length for text fields.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Allowed values for choice fields.
    #[must_use]
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Rows a model choice must refer to.
    #[must_use]
    pub fn queryset(mut self, queryset: QuerySet) -> Self {
        self.queryset = Some(queryset);
        self
    }

    /// Short label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Longer help text.
    #[must_use]
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Field kind.
    #[must_use]
    pub const fn kind(&self) -> &FormFieldKind {
        &self.kind
    }

    /// Whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Help text, falling back to the label.
    #[must_use]
    pub fn describe(&self) -> Option<&str> {
        self.help_text.as_deref().or(self.label.as_deref())
    }

    /// Validates one raw value.
    pub fn clean(&self, raw: Option<&Json>) -> Result<Value, Vec<String>> {
        if is_empty(raw) {
            return self.clean_empty();
        }
        let raw = raw.unwrap_or(&Json::Null);
        match &self.kind {
            FormFieldKind::Integer => {
                let n = to_integer(raw).ok_or_else(|| vec!["Enter a whole number.".to_string()])?;
                self.check_bounds(n as f64)?;
                Ok(Value::Int(n))
            }
            FormFieldKind::Float => {
                let f = to_float(raw).ok_or_else(|| vec!["Enter a number.".to_string()])?;
                self.check_bounds(f)?;
                Ok(Value::Float(f))
            }
            FormFieldKind::Decimal => {
                let d = to_decimal(raw).ok_or_else(|| vec!["Enter a number.".to_string()])?;
                if let Ok(f) = d.parse::<f64>() {
                    self.check_bounds(f)?;
                }
                Ok(Value::Decimal(d))
            }
            FormFieldKind::Boolean => {
                let b = to_bool(raw);
                if self.required && !b {
                    return Err(vec![REQUIRED.to_string()]);
                }
                Ok(Value::Bool(b))
            }
            FormFieldKind::Char => self.clean_text(raw).map(Value::Str),
            FormFieldKind::Email => {
                let s = self.clean_text(raw)?;
                if is_email(&s) {
                    Ok(Value::Str(s))
                } else {
                    Err(vec!["Enter a valid email address.".to_string()])
                }
            }
            FormFieldKind::Url => {
                let s = self.clean_text(raw)?;
                if is_url(&s) {
                    Ok(Value::Str(s))
                } else {
                    Err(vec!["Enter a valid URL.".to_string()])
                }
            }
            FormFieldKind::Date => raw
                .as_str()
                .and_then(parse_date)
                .map(Value::Date)
                .ok_or_else(|| vec!["Enter a valid date.".to_string()]),
            FormFieldKind::DateTime => raw
                .as_str()
                .and_then(parse_datetime)
                .map(Value::DateTime)
                .ok_or_else(|| vec!["Enter a valid date/time.".to_string()]),
            FormFieldKind::Time => raw
                .as_str()
                .and_then(parse_time)
                .map(Value::Time)
                .ok_or_else(|| vec!["Enter a valid time.".to_string()]),
            FormFieldKind::TypedChoice => {
                let s = scalar_text(raw).ok_or_else(|| vec![invalid_choice(&raw.to_string())])?;
                self.check_choice(&s)?;
                Ok(Value::Str(s))
            }
            FormFieldKind::MultipleChoice => {
                let items = as_items(raw).ok_or_else(|| vec!["Enter a list of values.".to_string()])?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let s = scalar_text(item).ok_or_else(|| vec![invalid_choice(&item.to_string())])?;
                    self.check_choice(&s)?;
                    out.push(Value::Str(s));
                }
                Ok(Value::List(out))
            }
            FormFieldKind::ModelChoice => {
                let pk = to_integer(raw).ok_or_else(|| {
                    vec!["Select a valid choice. That choice is not one of the available choices."
                        .to_string()]
                })?;
                if !self.pk_exists(pk) {
                    return Err(vec![
                        "Select a valid choice. That choice is not one of the available choices."
                            .to_string(),
                    ]);
                }
                Ok(Value::Int(pk))
            }
            FormFieldKind::ModelMultipleChoice => {
                let items = as_items(raw).ok_or_else(|| vec!["Enter a list of values.".to_string()])?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let pk = to_integer(item)
                        .ok_or_else(|| vec![format!("\"{}\" is not a valid value.", plain(item))])?;
                    if !self.pk_exists(pk) {
                        return Err(vec![invalid_choice(&pk.to_string())]);
                    }
                    out.push(Value::Int(pk));
                }
                Ok(Value::List(out))
            }
            FormFieldKind::Custom(_) => Ok(Value::from_json(raw)),
        }
    }

    fn clean_empty(&self) -> Result<Value, Vec<String>> {
        if self.required {
            return Err(vec![REQUIRED.to_string()]);
        }
        if let Some(initial) = &self.initial {
            return Ok(initial.clone());
        }
        Ok(match self.kind {
            FormFieldKind::Boolean => Value::Bool(false),
            FormFieldKind::MultipleChoice | FormFieldKind::ModelMultipleChoice => {
                Value::List(Vec::new())
            }
            FormFieldKind::Char | FormFieldKind::Email | FormFieldKind::Url => {
                Value::Str(String::new())
            }
            _ => Value::Null,
        })
    }

    fn clean_text(&self, raw: &Json) -> Result<String, Vec<String>> {
        let s = scalar_text(raw).ok_or_else(|| vec!["Enter a valid value.".to_string()])?;
        let s = s.trim().to_string();
        if let Some(max) = self.max_length {
            let len = s.chars().count();
            if len > max {
                return Err(vec![format!(
                    "Ensure this value has at most {max} characters (it has {len})."
                )]);
            }
        }
        Ok(s)
    }

    fn check_bounds(&self, n: f64) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(min) = self.min_value {
            if n < min {
                errors.push(format!("Ensure this value is greater than or equal to {min}."));
            }
        }
        if let Some(max) = self.max_value {
            if n > max {
                errors.push(format!("Ensure this value is less than or equal to {max}."));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_choice(&self, value: &str) -> Result<(), Vec<String>> {
        if self.choices.is_empty() || self.choices.iter().any(|c| c == value) {
            Ok(())
        } else {
            Err(vec![invalid_choice(value)])
        }
    }

    fn pk_exists(&self, pk: i64) -> bool {
        match &self.queryset {
            None => true,
            Some(qs) => {
                let pk_name = qs.descriptor().pk_name().to_string();
                matches!(qs.get(&pk_name, &Value::Int(pk)), Ok(Some(_)))
            }
        }
    }
}

/// Validated form output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedData(IndexMap<String, Value>);

impl CleanedData {
    /// Empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Integer lookup.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Boolean lookup.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// String lookup.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Inserts a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Iterates values in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consumes into the underlying map.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }

    /// As a [`Value::Map`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(self.0.clone())
    }
}

impl FromIterator<(String, Value)> for CleanedData {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An input validation schema.
///
/// # Example
///
/// ```
/// use hermes_schema::{Form, FormField};
/// use serde_json::json;
///
/// let form = Form::new("PageForm")
///     .with_field("limit", FormField::integer().optional().min_value(1).max_value(100).initial(10));
///
/// let data = json!({"limit": "25"});
/// let cleaned = form.validate(data.as_object().unwrap()).unwrap();
/// assert_eq!(cleaned.get_i64("limit"), Some(25));
///
/// let data = json!({"limit": "0"});
/// let errors = form.validate(data.as_object().unwrap()).unwrap_err();
/// assert_eq!(
///     errors.get("limit").unwrap()[0],
///     "Ensure this value is greater than or equal to 1."
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    fields: IndexMap<String, FormField>,
}

impl Form {
    /// An empty form.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds (or replaces) a field, builder style.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field: FormField) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Adds (or replaces) a field.
    pub fn add_field(&mut self, name: impl Into<String>, field: FormField) {
        self.fields.insert(name.into(), field);
    }

    /// Form name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FormField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.get(name)
    }

    /// Validates `data`. Unknown keys are ignored.
    pub fn validate(&self, data: &FormData) -> Result<CleanedData, FieldErrors> {
        let mut cleaned = CleanedData::new();
        let mut errors = FieldErrors::new();
        for (name, field) in &self.fields {
            match field.clean(data.get(name)) {
                Ok(value) => cleaned.insert(name.clone(), value),
                Err(messages) => errors.extend_field(name.clone(), messages),
            }
        }
        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

impl From<Form> for MetaValue {
    fn from(form: Form) -> Self {
        let name = form.name.clone();
        Self::Ref(CapabilityRef::new(KIND_FORM, name, form))
    }
}

fn is_empty(raw: Option<&Json>) -> bool {
    match raw {
        None | Some(Json::Null) => true,
        Some(Json::String(s)) => s.is_empty(),
        Some(Json::Array(items)) => items.is_empty(),
        Some(Json::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

fn plain(raw: &Json) -> String {
    raw.as_str().map_or_else(|| raw.to_string(), str::to_string)
}

fn scalar_text(raw: &Json) -> Option<String> {
    match raw {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_items(raw: &Json) -> Option<Vec<&Json>> {
    match raw {
        Json::Array(items) => Some(items.iter().collect()),
        Json::String(_) | Json::Number(_) => Some(vec![raw]),
        _ => None,
    }
}

fn to_integer(raw: &Json) -> Option<i64> {
    match raw {
        Json::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation)]
                    let n = f as i64;
                    n
                })
        }),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(raw: &Json) -> Option<f64> {
    match raw {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn to_decimal(raw: &Json) -> Option<String> {
    let text = match raw {
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.trim().to_string(),
        _ => return None,
    };
    is_decimal(&text).then_some(text)
}

fn to_bool(raw: &Json) -> bool {
    match raw {
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "off" | "no"
        ),
        _ => false,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc())
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
}

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static URL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static DECIMAL_RE: OnceLock<Option<Regex>> = OnceLock::new();

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$";
const URL_PATTERN: &str = r"^(?i)(https?|ftps?)://([a-z0-9-]+\.)*[a-z0-9-]+(\.[a-z]{2,})?(:\d+)?(/[^\s]*)?$";
const DECIMAL_PATTERN: &str = r"^[+-]?(\d+(\.\d*)?|\.\d+)$";

fn pattern_matches(cell: &OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

fn is_email(text: &str) -> bool {
    pattern_matches(&EMAIL_RE, EMAIL_PATTERN, text)
}

fn is_url(text: &str) -> bool {
    pattern_matches(&URL_RE, URL_PATTERN, text)
}

fn is_decimal(text: &str) -> bool {
    pattern_matches(&DECIMAL_RE, DECIMAL_PATTERN, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Json) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_fields_reported_together() {
        let form = Form::new("ThingForm")
            .with_field("i", FormField::integer())
            .with_field("f", FormField::float())
            .with_field("note", FormField::char().optional());
        let errors = form.validate(&data(json!({}))).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("i").unwrap(), [REQUIRED.to_string()]);
        assert_eq!(errors.get("f").unwrap(), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_integer_coercion_and_bounds() {
        let field = FormField::integer().min_value(1).max_value(100);
        assert_eq!(field.clean(Some(&json!("42"))).unwrap(), Value::Int(42));
        assert_eq!(field.clean(Some(&json!(7))).unwrap(), Value::Int(7));
        assert_eq!(
            field.clean(Some(&json!("abc"))).unwrap_err(),
            vec!["Enter a whole number.".to_string()]
        );
        assert_eq!(
            field.clean(Some(&json!(101))).unwrap_err(),
            vec!["Ensure this value is less than or equal to 100.".to_string()]
        );
    }

    #[test]
    fn test_char_coerces_numbers() {
        let field = FormField::char().max_length(3);
        assert_eq!(field.clean(Some(&json!(1))).unwrap(), Value::from("1"));
        assert_eq!(
            field.clean(Some(&json!("abcd"))).unwrap_err(),
            vec!["Ensure this value has at most 3 characters (it has 4).".to_string()]
        );
    }

    #[test]
    fn test_optional_uses_initial() {
        let field = FormField::integer().optional().initial(10);
        assert_eq!(field.clean(None).unwrap(), Value::Int(10));
        assert_eq!(field.clean(Some(&json!(""))).unwrap(), Value::Int(10));
        assert_eq!(FormField::integer().optional().clean(None).unwrap(), Value::Null);
    }

    #[test]
    fn test_boolean_parsing() {
        let field = FormField::boolean();
        assert_eq!(field.clean(Some(&json!("true"))).unwrap(), Value::Bool(true));
        assert_eq!(field.clean(Some(&json!("false"))).unwrap(), Value::Bool(false));
        assert_eq!(field.clean(Some(&json!("0"))).unwrap(), Value::Bool(false));
        assert_eq!(field.clean(None).unwrap(), Value::Bool(false));

        let must_accept = FormField::new(FormFieldKind::Boolean);
        assert!(must_accept.clean(Some(&json!(false))).is_err());
    }

    #[test]
    fn test_email_and_url() {
        let email = FormField::new(FormFieldKind::Email);
        assert!(email.clean(Some(&json!("ada@example.com"))).is_ok());
        assert_eq!(
            email.clean(Some(&json!("nope"))).unwrap_err(),
            vec!["Enter a valid email address.".to_string()]
        );

        let url = FormField::new(FormFieldKind::Url);
        assert!(url.clean(Some(&json!("https://example.com/a?b=1"))).is_ok());
        assert!(url.clean(Some(&json!("example"))).is_err());
    }

    #[test]
    fn test_temporal_fields() {
        let date = FormField::new(FormFieldKind::Date);
        assert_eq!(
            date.clean(Some(&json!("2024-01-31"))).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
        assert!(date.clean(Some(&json!("2024-02-31"))).is_err());

        let datetime = FormField::new(FormFieldKind::DateTime);
        assert!(datetime.clean(Some(&json!("2024-01-31T10:00:00Z"))).is_ok());
        assert!(datetime.clean(Some(&json!("2024-01-31 10:00"))).is_ok());
        assert_eq!(
            datetime.clean(Some(&json!("later"))).unwrap_err(),
            vec!["Enter a valid date/time.".to_string()]
        );

        let time = FormField::new(FormFieldKind::Time);
        assert!(time.clean(Some(&json!("10:15"))).is_ok());
    }

    #[test]
    fn test_decimal_normalisation() {
        let field = FormField::new(FormFieldKind::Decimal);
        assert_eq!(field.clean(Some(&json!("1.50"))).unwrap(), Value::Decimal("1.50".into()));
        assert_eq!(field.clean(Some(&json!(2))).unwrap(), Value::Decimal("2".into()));
        assert!(field.clean(Some(&json!("1e5"))).is_err());
    }

    #[test]
    fn test_choice_fields() {
        let single = FormField::new(FormFieldKind::TypedChoice).choices(["a", "b"]);
        assert_eq!(single.clean(Some(&json!("a"))).unwrap(), Value::from("a"));
        assert_eq!(
            single.clean(Some(&json!("c"))).unwrap_err(),
            vec!["Select a valid choice. c is not one of the available choices.".to_string()]
        );

        let multi = FormField::new(FormFieldKind::MultipleChoice).choices(["a", "b"]);
        assert_eq!(
            multi.clean(Some(&json!(["a", "b"]))).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
        assert_eq!(multi.clean(Some(&json!("a"))).unwrap(), Value::List(vec![Value::from("a")]));
    }

    #[test]
    fn test_model_multiple_choice_without_queryset() {
        let field = FormField::new(FormFieldKind::ModelMultipleChoice);
        assert_eq!(
            field.clean(Some(&json!(["1", 2]))).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            field.clean(Some(&json!(["x"]))).unwrap_err(),
            vec!["\"x\" is not a valid value.".to_string()]
        );
    }

    #[test]
    fn test_custom_kind_passes_through() {
        let field = FormField::new(FormFieldKind::Custom("JSONField".into()));
        assert_eq!(field.clean(Some(&json!([1]))).unwrap(), Value::List(vec![Value::Int(1)]));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let form = Form::new("F").with_field("a", FormField::integer());
        let cleaned = form.validate(&data(json!({"a": 1, "b": 2}))).unwrap();
        assert_eq!(cleaned.get_i64("a"), Some(1));
        assert!(cleaned.get("b").is_none());
    }
}
