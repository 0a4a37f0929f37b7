//! In-memory queryable store
//!
//! Evaluates predicate trees against rows kept in memory. Each row is kept
//! alongside its JSON form, which is what predicates and orderings look at:
//! dotted paths walk nested objects, and a missing key or JSON `null` counts
//! as SQL NULL (it never matches a comparison).

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::data::error::DataError;
use crate::data::traits::{DataQuery, QueryableStore, SortOrder};
use crate::query::{Predicate, RangeBound, SortDirection, Value, coerce};
use crate::schema::ValueType;

const BACKEND: &str = "memory";

#[derive(Debug, Clone)]
struct Row<T> {
    item: T,
    json: JsonValue,
}

/// Rows grouped by entity type name
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    collections: HashMap<String, Vec<Row<T>>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }
}

impl<T: Serialize> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row to the entity's collection
    pub fn insert(&mut self, entity: &str, item: T) -> Result<(), DataError> {
        let json = serde_json::to_value(&item)?;
        self.collections
            .entry(entity.to_string())
            .or_default()
            .push(Row { item, json });
        Ok(())
    }

    /// Add many rows, creating the collection even when `items` is empty
    pub fn with_rows<I>(mut self, entity: &str, items: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = T>,
    {
        self.collections.entry(entity.to_string()).or_default();
        for item in items {
            self.insert(entity, item)?;
        }
        Ok(self)
    }
}

impl<T> MemoryStore<T> {
    /// Number of rows held for an entity
    pub fn len(&self, entity: &str) -> usize {
        self.collections.get(entity).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, entity: &str) -> bool {
        self.len(entity) == 0
    }

    fn rows(&self, entity: &str) -> Result<&[Row<T>], DataError> {
        self.collections
            .get(entity)
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::UnknownCollection(entity.to_string()))
    }

    fn matching<'a>(
        &'a self,
        entity: &str,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<&'a Row<T>>, DataError> {
        Ok(self
            .rows(entity)?
            .iter()
            .filter(|row| predicate.is_none_or(|p| matches(p, &row.json)))
            .collect())
    }
}

/// Walk a dotted path; `None` for missing keys and JSON null
fn lookup<'a>(row: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.')
        .try_fold(row, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}

/// Interpret a JSON field as a typed value
fn typed(json: &JsonValue, value_type: &ValueType) -> Option<Value> {
    match json {
        JsonValue::String(s) => match value_type {
            ValueType::DateTime => coerce(s, value_type).ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| Value::DateTime(dt.naive_utc()))
            }),
            _ => coerce(s, value_type).ok(),
        },
        JsonValue::Number(n) => match value_type {
            ValueType::I32 | ValueType::I64 => n.as_i64().map(Value::Int),
            ValueType::U32 | ValueType::U64 => n.as_u64().map(Value::UInt),
            ValueType::F32 | ValueType::F64 => n.as_f64().map(Value::Float),
            ValueType::Decimal | ValueType::String => coerce(&n.to_string(), value_type).ok(),
            _ => None,
        },
        JsonValue::Bool(b) => match value_type {
            ValueType::Bool => Some(Value::Bool(*b)),
            ValueType::String => Some(Value::String(b.to_string())),
            _ => None,
        },
        _ => None,
    }
}

/// Textual form of a scalar field, used by LIKE
fn text(json: &JsonValue) -> Option<String> {
    match json {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn field_value(row: &JsonValue, path: &str, value_type: &ValueType) -> Option<Value> {
    lookup(row, path).and_then(|json| typed(json, value_type))
}

fn compare_field(row: &JsonValue, path: &str, value_type: &ValueType, other: &Value) -> Option<Ordering> {
    field_value(row, path, value_type).and_then(|v| v.compare(other))
}

/// Evaluate a predicate against one row
fn matches(predicate: &Predicate, row: &JsonValue) -> bool {
    match predicate {
        Predicate::Equals { attribute, value } => {
            compare_field(row, &attribute.path, &attribute.value_type, value) == Some(Ordering::Equal)
        }
        Predicate::Like { attribute, needle } => lookup(row, &attribute.path)
            .and_then(text)
            .is_some_and(|t| t.to_lowercase().contains(needle.as_str())),
        Predicate::Range {
            attribute,
            bound,
            value,
        } => {
            let expected = match bound {
                RangeBound::GreaterThan => Ordering::Greater,
                RangeBound::LessThan => Ordering::Less,
            };
            compare_field(row, &attribute.path, &attribute.value_type, value) == Some(expected)
        }
        Predicate::In { attribute, values } => field_value(row, &attribute.path, &attribute.value_type)
            .is_some_and(|v| values.iter().any(|candidate| v.compare(candidate) == Some(Ordering::Equal))),
        Predicate::Between {
            attribute,
            low,
            high,
        } => field_value(row, &attribute.path, &attribute.value_type).is_some_and(|v| {
            matches!(v.compare(low), Some(Ordering::Greater | Ordering::Equal))
                && matches!(v.compare(high), Some(Ordering::Less | Ordering::Equal))
        }),
        Predicate::IsNull { attribute } => lookup(row, &attribute.path).is_none(),
        Predicate::IsNotNull { attribute } => lookup(row, &attribute.path).is_some(),
        Predicate::And(terms) => terms.iter().all(|term| matches(term, row)),
        Predicate::Or(terms) => terms.iter().any(|term| matches(term, row)),
    }
}

/// NULLs sort after values ascending, before them descending
fn order_rows<T>(rows: &mut [&Row<T>], order: &SortOrder) {
    let path = &order.attribute.path;
    let value_type = &order.attribute.value_type;

    rows.sort_by(|a, b| {
        let left = field_value(&a.json, path, value_type);
        let right = field_value(&b.json, path, value_type);
        let ordering = match (&left, &right) {
            (Some(l), Some(r)) => l.compare(r).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl<T> QueryableStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn count(&self, entity: &str, predicate: Option<&Predicate>) -> Result<u64, DataError> {
        let count = self.matching(entity, predicate)?.len();
        tracing::trace!(backend = BACKEND, entity, count, "Counted rows");
        Ok(count as u64)
    }

    async fn query(&self, entity: &str, query: DataQuery<'_>) -> Result<Vec<T>, DataError> {
        let mut rows = self.matching(entity, query.predicate)?;
        if let Some(order) = query.order {
            order_rows(&mut rows, order);
        }

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let content: Vec<T> = rows
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .map(|row| row.item.clone())
            .collect();

        tracing::trace!(
            backend = BACKEND,
            entity,
            offset = query.offset,
            limit = query.limit,
            returned = content.len(),
            "Queried rows"
        );
        Ok(content)
    }
}
