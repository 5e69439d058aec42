//! In-memory data source.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::model::{ModelDescriptor, Row};
use crate::store::{DataSource, Model, Query};
use crate::value::Value;

/// Time source for `auto_now_add` columns.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

/// A data source holding rows in memory, in insertion order.
///
/// Integer primary keys are assigned from a counter starting at 1. An insert
/// that carries an explicit key keeps it and moves the counter past it.
///
/// # Example
///
/// ```
/// use hermes_schema::{MemoryStore, ModelDescriptor, ModelField, StorageKind, Value};
/// use indexmap::IndexMap;
///
/// let store = MemoryStore::new(
///     ModelDescriptor::new("Tag")
///         .field(ModelField::new("id", StorageKind::Auto))
///         .field(ModelField::new("label", StorageKind::Char)),
/// );
/// let model = store.model();
///
/// let mut values = IndexMap::new();
/// values.insert("label".to_string(), Value::from("rust"));
/// let row = model.source().insert(values).unwrap();
///
/// assert_eq!(row.pk(), &Value::Int(1));
/// assert_eq!(model.objects().count().unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    descriptor: Arc<ModelDescriptor>,
    table: Arc<RwLock<Table>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// An empty store using the system clock.
    #[must_use]
    pub fn new(descriptor: ModelDescriptor) -> Self {
        Self::with_clock(descriptor, SystemClock)
    }

    /// An empty store using the given clock.
    #[must_use]
    pub fn with_clock(descriptor: ModelDescriptor, clock: impl Clock + 'static) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            table: Arc::new(RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            })),
            clock: Arc::new(clock),
        }
    }

    /// A [`Model`] handle sharing this store's rows.
    #[must_use]
    pub fn model(&self) -> Model {
        Model::new(self.clone())
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Returns true if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().rows.is_empty()
    }

    fn check_columns(&self, values: &IndexMap<String, Value>) -> StoreResult<()> {
        match values
            .keys()
            .find(|name| self.descriptor.get_field(name).is_none())
        {
            Some(unknown) => Err(StoreError::UnknownField {
                model: self.descriptor.name().to_string(),
                field: unknown.clone(),
            }),
            None => Ok(()),
        }
    }

    fn not_found(&self, pk: &Value) -> StoreError {
        StoreError::NotFound {
            model: self.descriptor.name().to_string(),
            pk: pk.to_json().to_string(),
        }
    }
}

impl DataSource for MemoryStore {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn fetch(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let table = self.table.read();
        Ok(query.apply(table.rows.iter().cloned()))
    }

    fn count(&self, query: &Query) -> StoreResult<usize> {
        self.fetch(query).map(|rows| rows.len())
    }

    fn insert(&self, mut values: IndexMap<String, Value>) -> StoreResult<Row> {
        self.check_columns(&values)?;
        let pk_name = self.descriptor.pk_name().to_string();
        let mut table = self.table.write();

        let mut row = IndexMap::with_capacity(self.descriptor.fields().len());
        for field in self.descriptor.fields() {
            let name = field.name();
            let value = if name == pk_name {
                match values.shift_remove(name).filter(|v| !v.is_null()) {
                    Some(pk) => {
                        if let Some(n) = pk.as_i64() {
                            table.next_id = table.next_id.max(n + 1);
                        }
                        pk
                    }
                    None if field.kind().is_auto() => {
                        let id = table.next_id;
                        table.next_id += 1;
                        Value::Int(id)
                    }
                    None => {
                        return Err(StoreError::MissingValue {
                            model: self.descriptor.name().to_string(),
                            field: name.to_string(),
                        })
                    }
                }
            } else if field.is_auto_now_add() {
                values.shift_remove(name);
                Value::DateTime(self.clock.now())
            } else {
                match values.shift_remove(name) {
                    Some(value) => value,
                    None => field.default_value().cloned().unwrap_or(Value::Null),
                }
            };

            if value.is_null() && !field.is_null() {
                return Err(StoreError::MissingValue {
                    model: self.descriptor.name().to_string(),
                    field: name.to_string(),
                });
            }
            row.insert(name.to_string(), value);
        }

        let row = Row::new(&self.descriptor, row);
        table.rows.push(row.clone());
        Ok(row)
    }

    fn update(&self, pk: &Value, values: IndexMap<String, Value>) -> StoreResult<Row> {
        self.check_columns(&values)?;
        for (name, value) in &values {
            let nullable = self
                .descriptor
                .get_field(name)
                .is_some_and(|field| field.is_null());
            if value.is_null() && !nullable {
                return Err(StoreError::MissingValue {
                    model: self.descriptor.name().to_string(),
                    field: name.clone(),
                });
            }
        }

        let mut table = self.table.write();
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.pk() == pk)
            .ok_or_else(|| self.not_found(pk))?;
        for (name, value) in values {
            row.set(name, value);
        }
        Ok(row.clone())
    }

    fn delete(&self, pk: &Value) -> StoreResult<bool> {
        let mut table = self.table.write();
        let before = table.rows.len();
        table.rows.retain(|row| row.pk() != pk);
        Ok(table.rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelField, StorageKind};
    use crate::store::Condition;
    use chrono::TimeZone;

    fn store() -> MemoryStore {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        MemoryStore::with_clock(
            ModelDescriptor::new("SomeModel")
                .field(ModelField::new("id", StorageKind::Auto))
                .field(ModelField::new("i", StorageKind::Integer))
                .field(ModelField::new("note", StorageKind::Char).null())
                .field(ModelField::new("created", StorageKind::DateTime).auto_now_add()),
            FixedClock(at),
        )
    }

    fn values(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_insert_assigns_ids_and_timestamps() {
        let store = store();
        let first = store.insert(values(&[("i", Value::Int(5))])).unwrap();
        let second = store.insert(values(&[("i", Value::Int(6))])).unwrap();

        assert_eq!(first.pk(), &Value::Int(1));
        assert_eq!(second.pk(), &Value::Int(2));
        assert_eq!(first.get("note"), Some(&Value::Null));
        assert_eq!(
            first.get("created"),
            Some(&Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_explicit_pk_moves_counter() {
        let store = store();
        store
            .insert(values(&[("id", Value::Int(10)), ("i", Value::Int(1))]))
            .unwrap();
        let next = store.insert(values(&[("i", Value::Int(2))])).unwrap();
        assert_eq!(next.pk(), &Value::Int(11));
    }

    #[test]
    fn test_insert_rejects_missing_and_unknown() {
        let store = store();
        assert!(matches!(
            store.insert(IndexMap::new()),
            Err(StoreError::MissingValue { field, .. }) if field == "i"
        ));
        assert!(matches!(
            store.insert(values(&[("i", Value::Int(1)), ("zzz", Value::Int(1))])),
            Err(StoreError::UnknownField { field, .. }) if field == "zzz"
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let store = store();
        let row = store.insert(values(&[("i", Value::Int(1))])).unwrap();
        let updated = store
            .update(row.pk(), values(&[("i", Value::Int(9))]))
            .unwrap();
        assert_eq!(updated.get("i"), Some(&Value::Int(9)));
        assert!(matches!(
            store.update(&Value::Int(99), IndexMap::new()),
            Err(StoreError::NotFound { .. })
        ));

        assert!(store.delete(row.pk()).unwrap());
        assert!(!store.delete(row.pk()).unwrap());
    }

    #[test]
    fn test_model_handle_shares_rows() {
        let store = store();
        let model = store.model();
        for i in 0..3 {
            store.insert(values(&[("i", Value::Int(i))])).unwrap();
        }
        let qs = model.objects().filter(Condition::gt("i", 0)).order_by("-id");
        let rows = qs.fetch().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pk(), &Value::Int(3));
        assert_eq!(qs.count().unwrap(), 2);
        assert!(model.objects().get("id", &Value::Int(2)).unwrap().is_some());
    }
}
