//! Ordered data sources.
//!
//! A [`DataSource`] is the persistence capability Hermes consumes. Views never
//! talk to it directly; they build a [`QuerySet`], a lazy and restartable
//! description of "which rows, in which order, which slice", and execute it
//! with [`QuerySet::fetch`] or [`QuerySet::count`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use hermes_core::{CapabilityRef, MetaValue, KIND_MODEL};

use crate::error::StoreResult;
use crate::model::{ModelDescriptor, Row};
use crate::value::Value;

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// `field == value`
    Exact,
    /// `field > value`
    Gt,
    /// `field >= value`
    Gte,
    /// `field < value`
    Lt,
    /// `field <= value`
    Lte,
}

/// A single filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    lookup: Lookup,
    value: Value,
}

impl Condition {
    /// Creates a condition.
    #[must_use]
    pub fn new(field: impl Into<String>, lookup: Lookup, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            lookup,
            value: value.into(),
        }
    }

    /// `field == value`
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Exact, value)
    }

    /// `field > value`
    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Gt, value)
    }

    /// `field < value`
    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Lt, value)
    }

    /// Field the condition reads.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Comparison.
    #[must_use]
    pub const fn lookup(&self) -> Lookup {
        self.lookup
    }

    /// Value compared against.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Evaluates the condition against a row.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(&self.field) else {
            return false;
        };
        let Some(ordering) = actual.compare(&self.value) else {
            return false;
        };
        match self.lookup {
            Lookup::Exact => ordering == Ordering::Equal,
            Lookup::Gt => ordering == Ordering::Greater,
            Lookup::Gte => ordering != Ordering::Less,
            Lookup::Lt => ordering == Ordering::Less,
            Lookup::Lte => ordering != Ordering::Greater,
        }
    }
}

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    field: String,
    descending: bool,
}

impl OrderBy {
    /// Parses `"field"` (ascending) or `"-field"` (descending).
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: spec.to_string(),
                descending: false,
            },
        }
    }

    /// Field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the order is descending.
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        self.descending
    }
}

/// Filters, ordering and slice of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Condition>,
    ordering: Vec<OrderBy>,
    offset: usize,
    limit: Option<usize>,
}

impl Query {
    /// Filters, all of which must match.
    #[must_use]
    pub fn filters(&self) -> &[Condition] {
        &self.filters
    }

    /// Ordering keys, most significant first.
    #[must_use]
    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    /// Rows skipped.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Maximum number of rows.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Evaluates the query over an in-memory row set.
    #[must_use]
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut rows: Vec<Row> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|c| c.matches(row)))
            .collect();

        if !self.ordering.is_empty() {
            rows.sort_by(|a, b| {
                for key in &self.ordering {
                    let left = a.get(&key.field).unwrap_or(&Value::Null);
                    let right = b.get(&key.field).unwrap_or(&Value::Null);
                    let ordering = left.compare(right).unwrap_or(Ordering::Equal);
                    let ordering = if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let rows = rows.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

/// Persistence capability for one model.
pub trait DataSource: fmt::Debug + Send + Sync {
    /// Column description of the stored model.
    fn descriptor(&self) -> &ModelDescriptor;

    /// Rows matching the query, in query order.
    fn fetch(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// Number of rows the query would return.
    fn count(&self, query: &Query) -> StoreResult<usize>;

    /// Stores a new row and returns it with generated values filled in.
    fn insert(&self, values: IndexMap<String, Value>) -> StoreResult<Row>;

    /// Overwrites columns of an existing row.
    fn update(&self, pk: &Value, values: IndexMap<String, Value>) -> StoreResult<Row>;

    /// Removes a row. Returns false if it did not exist.
    fn delete(&self, pk: &Value) -> StoreResult<bool>;
}

/// Shared handle on a model's data source, declared as `model` in metadata.
#[derive(Debug, Clone)]
pub struct Model(Arc<dyn DataSource>);

impl Model {
    /// Wraps a data source.
    pub fn new(source: impl DataSource + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Wraps an already shared data source.
    #[must_use]
    pub fn from_arc(source: Arc<dyn DataSource>) -> Self {
        Self(source)
    }

    /// Column description.
    #[must_use]
    pub fn descriptor(&self) -> &ModelDescriptor {
        self.0.descriptor()
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.descriptor().name()
    }

    /// Query over every row.
    #[must_use]
    pub fn objects(&self) -> QuerySet {
        QuerySet::new(Arc::clone(&self.0))
    }

    /// The underlying data source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.0
    }
}

impl From<Model> for MetaValue {
    fn from(model: Model) -> Self {
        let name = model.name().to_string();
        Self::Ref(CapabilityRef::new(KIND_MODEL, name, model))
    }
}

/// A lazy, restartable query over a data source.
///
/// Every combinator returns a new `QuerySet`; the source is only touched by
/// [`fetch`](Self::fetch), [`count`](Self::count), [`first`](Self::first) and
/// [`get`](Self::get).
#[derive(Debug, Clone)]
pub struct QuerySet {
    source: Arc<dyn DataSource>,
    query: Query,
}

impl QuerySet {
    /// Every row of `source`.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            query: Query::default(),
        }
    }

    /// Column description of the underlying model.
    #[must_use]
    pub fn descriptor(&self) -> &ModelDescriptor {
        self.source.descriptor()
    }

    /// The accumulated query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(&self, condition: Condition) -> Self {
        let mut next = self.clone();
        next.query.filters.push(condition);
        next
    }

    /// Appends an ordering key (`"id"` or `"-id"`).
    #[must_use]
    pub fn order_by(&self, spec: &str) -> Self {
        let mut next = self.clone();
        next.query.ordering.push(OrderBy::parse(spec));
        next
    }

    /// Restricts to `[offset, offset + limit)` of the current result.
    #[must_use]
    pub fn slice(&self, offset: usize, limit: usize) -> Self {
        let mut next = self.clone();
        next.query.offset = self.query.offset + offset;
        next.query.limit = Some(match self.query.limit {
            Some(current) => current.saturating_sub(offset).min(limit),
            None => limit,
        });
        next
    }

    /// Executes the query.
    pub fn fetch(&self) -> StoreResult<Vec<Row>> {
        self.source.fetch(&self.query)
    }

    /// Counts matching rows.
    pub fn count(&self) -> StoreResult<usize> {
        self.source.count(&self.query)
    }

    /// First matching row.
    pub fn first(&self) -> StoreResult<Option<Row>> {
        Ok(self.slice(0, 1).fetch()?.into_iter().next())
    }

    /// Row whose `field` equals `value`.
    pub fn get(&self, field: &str, value: &Value) -> StoreResult<Option<Row>> {
        self.filter(Condition::eq(field, value.clone())).first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelField, StorageKind};

    fn rows() -> Vec<Row> {
        let model = ModelDescriptor::new("N")
            .field(ModelField::new("id", StorageKind::Auto))
            .field(ModelField::new("n", StorageKind::Integer));
        (1..=5)
            .map(|i| {
                let mut values = IndexMap::new();
                values.insert("id".to_string(), Value::Int(i));
                values.insert("n".to_string(), Value::Int(i % 2));
                Row::new(&model, values)
            })
            .collect()
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().filter_map(|r| r.pk().as_i64()).collect()
    }

    #[test]
    fn test_condition_lookups() {
        let row = &rows()[2];
        assert!(Condition::eq("id", 3).matches(row));
        assert!(Condition::gt("id", 2).matches(row));
        assert!(!Condition::lt("id", 3).matches(row));
        assert!(Condition::new("id", Lookup::Lte, 3).matches(row));
        assert!(!Condition::eq("missing", 3).matches(row));
    }

    #[test]
    fn test_query_filter_order_slice() {
        let query = Query {
            filters: vec![Condition::eq("n", 1)],
            ordering: vec![OrderBy::parse("-id")],
            offset: 1,
            limit: Some(5),
        };
        assert_eq!(ids(&query.apply(rows())), vec![3, 1]);
    }

    #[test]
    fn test_multi_key_ordering() {
        let query = Query {
            ordering: vec![OrderBy::parse("n"), OrderBy::parse("-id")],
            ..Query::default()
        };
        assert_eq!(ids(&query.apply(rows())), vec![4, 2, 5, 3, 1]);
    }

    #[test]
    fn test_order_by_parse() {
        let desc = OrderBy::parse("-created");
        assert_eq!(desc.field(), "created");
        assert!(desc.is_descending());
        assert!(!OrderBy::parse("id").is_descending());
    }
}
