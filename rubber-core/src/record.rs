//! Attribute-navigable view over a JSON object.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::{Result, RubberError};
use crate::serializer::Indexable;

/// Prefix the document store uses for metadata keys (`_id`, `_source`, ...).
const RESERVED_PREFIX: char = '_';

/// A value inside a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Field>),
    Record(Record),
}

impl Field {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Field::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Field::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Field::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Field::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Convert back to plain JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Field::Null => Value::Null,
            Field::Bool(b) => Value::Bool(*b),
            Field::Number(n) => Value::Number(n.clone()),
            Field::String(s) => Value::String(s.clone()),
            Field::List(items) => Value::Array(items.iter().map(Field::to_value).collect()),
            Field::Record(r) => r.to_value(),
        }
    }
}

impl From<&Value> for Field {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Field::Null,
            Value::Bool(b) => Field::Bool(*b),
            Value::Number(n) => Field::Number(n.clone()),
            Value::String(s) => Field::String(s.clone()),
            Value::Array(items) => Field::List(items.iter().map(Field::from).collect()),
            Value::Object(map) => Field::Record(Record::from(map)),
        }
    }
}

impl PartialEq<str> for Field {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Field {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// A JSON object whose fields are reachable by name.
///
/// Nested objects become nested records and arrays become lists, all built
/// once at construction. Lookups fall back to the reserved `_` prefix, so
/// `id` finds `_id` when there is no plain `id`:
///
/// ```
/// use rubber_core::Record;
/// use serde_json::json;
///
/// let hit = Record::from_value(&json!({"_id": "6", "_source": {"title": "Rust"}})).unwrap();
/// assert_eq!(hit.get("id").unwrap(), "6");
/// assert_eq!(hit.path("source.title").unwrap(), "Rust");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Field>,
}

impl Record {
    /// Build a record from a JSON value; `None` unless it is an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(Record::from)
    }

    /// Look up a field.
    ///
    /// An exact key wins. Otherwise, a name without the `_` prefix falls
    /// back to the prefixed key. Names that already carry the prefix get no
    /// further fallback.
    pub fn get(&self, name: &str) -> Result<&Field> {
        if let Some(field) = self.fields.get(name) {
            return Ok(field);
        }
        if !name.starts_with(RESERVED_PREFIX) {
            if let Some(field) = self.fields.get(&format!("{RESERVED_PREFIX}{name}")) {
                return Ok(field);
            }
        }
        Err(RubberError::FieldNotFound(name.to_string()))
    }

    /// Resolve a dotted path such as `source.tags.0`.
    ///
    /// Each segment is looked up with [`get`](Self::get); numeric segments
    /// index into lists.
    pub fn path(&self, path: &str) -> Result<&Field> {
        let not_found = || RubberError::FieldNotFound(path.to_string());
        let mut segments = path.split('.');
        let first = segments.next().ok_or_else(not_found)?;
        let mut current = self.get(first).map_err(|_| not_found())?;

        for segment in segments {
            current = match current {
                Field::Record(record) => record.get(segment).map_err(|_| not_found())?,
                Field::List(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or_else(not_found)?,
                _ => return Err(not_found()),
            };
        }
        Ok(current)
    }

    /// Whether [`get`](Self::get) would succeed.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Keys as stored, prefixes included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert back to a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    fn to_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect()
    }
}

impl From<&Map<String, Value>> for Record {
    fn from(map: &Map<String, Value>) -> Self {
        Self {
            fields: map.iter().map(|(k, v)| (k.clone(), Field::from(v))).collect(),
        }
    }
}

impl Indexable for Record {
    fn as_mapping(&self) -> Option<Map<String, Value>> {
        Some(self.to_map())
    }
}
