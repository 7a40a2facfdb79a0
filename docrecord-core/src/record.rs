//! Record and identifier types
//!
//! A [`Record`] is a schema-less JSON object. The `_id` field holds its
//! [`RecordId`]; a record whose `_id` is missing, `null` or `""` has no
//! identifier yet.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::RecordError;

/// Field holding a record's identifier.
pub const ID_FIELD: &str = "_id";

/// Identifier of a record within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Value);

impl RecordId {
    /// Generate a random UUID v4 identifier (36 characters).
    pub fn generate() -> Self {
        Self(Value::String(Uuid::new_v4().to_string()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// `null` and `""` do not identify anything.
    fn is_blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<Value> for RecordId {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<&String> for RecordId {
    fn from(value: &String) -> Self {
        Self(Value::String(value.clone()))
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<&RecordId> for RecordId {
    fn from(value: &RecordId) -> Self {
        value.clone()
    }
}

/// A schema-less document: field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record's identifier, if it has a usable one.
    pub fn id(&self) -> Option<RecordId> {
        self.0
            .get(ID_FIELD)
            .filter(|value| !RecordId::is_blank(value))
            .cloned()
            .map(RecordId)
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    pub fn set_id(&mut self, id: impl Into<RecordId>) {
        self.0.insert(ID_FIELD.to_owned(), id.into().into_value());
    }

    /// Builder form of [`Record::set_id`].
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.set_id(id);
        self
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Overlay `patch` onto this record: patch fields overwrite, all other
    /// fields are kept.
    pub fn merge(&mut self, patch: &Record) {
        for (field, value) in &patch.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Whether this record's `_id` equals `id`.
    pub fn matches_id(&self, id: &RecordId) -> bool {
        self.0.get(ID_FIELD) == Some(id.as_value())
    }

    /// Copy of this record without the `_id` field.
    pub fn without_id(&self) -> Record {
        let mut fields = self.0.clone();
        fields.remove(ID_FIELD);
        Record(fields)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(RecordError::argument(format!(
                "A record must be a JSON object, got: {}",
                other
            ))),
        }
    }
}
