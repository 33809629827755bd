//! Indexable entity capability
//!
//! Any domain type that wants to live in the search index implements
//! [`Indexable`]: a stable identity, a kind discriminator, and a flat,
//! ordered field projection derived purely from its current state.

use chrono::{DateTime, SecondsFormat, Utc};
use imstr::ImString;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::utils::{ENTRY_TYPE_FIELD, ID_FIELD};

/// Stable identifier shared by the search index and the primary store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(ImString);

impl EntityId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(ImString::from(id.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(ImString::from(id))
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(ImString::from(id))
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(EntityId::from)
    }
}

/// A single projected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// Multi-valued field, written as one element per item
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Render the value the way the search server stores it
    ///
    /// Lists have no single rendering; callers expand them first.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::render)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Scalar values in document order, flattening nested lists
    pub(crate) fn scalars(&self) -> Vec<&FieldValue> {
        match self {
            FieldValue::List(items) => items.iter().flat_map(FieldValue::scalars).collect(),
            scalar => vec![scalar],
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Integer(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<&EntityId> for FieldValue {
    fn from(v: &EntityId) -> Self {
        FieldValue::Text(v.as_str().to_string())
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Ordered field-name to value mapping: the indexable projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchEntry {
    fields: IndexMap<String, FieldValue>,
}

impl SearchEntry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a projection carrying the `id` and `entry_type` fields
    ///
    /// Query results are grouped and rehydrated through those two fields,
    /// so projections built from here are always searchable.
    #[must_use]
    pub fn for_entity<E: Indexable + ?Sized>(entity: &E) -> Self {
        Self::new()
            .field(ID_FIELD, &entity.identity())
            .field(ENTRY_TYPE_FIELD, entity.entry_type())
    }

    /// Builder-style insert. Re-inserting a name keeps its original position.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Put `id` and `entry_type` first, overriding projected values
    ///
    /// Deletes match on `id` and queries group on `entry_type`, so both must
    /// agree with the entity's identity.
    #[must_use]
    pub(crate) fn with_identity(mut self, id: &EntityId, entry_type: &str) -> Self {
        self.fields.shift_insert(0, ID_FIELD.to_string(), id.into());
        self.fields
            .shift_insert(1, ENTRY_TYPE_FIELD.to_string(), entry_type.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SearchEntry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Capability of a domain entity to participate in the search index
///
/// `search_entry` must be a pure function of the entity's current state:
/// two calls without an intervening mutation yield equal projections.
pub trait Indexable: Send + Sync {
    /// Identifier reused across the index and the primary store
    ///
    /// Must be unique across every entity kind: the index keys documents
    /// by `id` alone and deletes match `id:<identity>`.
    fn identity(&self) -> EntityId;

    /// Discriminator naming the concrete entity kind, e.g. `"Question"`
    fn entry_type(&self) -> &str;

    /// The indexable projection
    fn search_entry(&self) -> SearchEntry;
}

impl<T: Indexable + ?Sized> Indexable for &T {
    fn identity(&self) -> EntityId {
        (**self).identity()
    }

    fn entry_type(&self) -> &str {
        (**self).entry_type()
    }

    fn search_entry(&self) -> SearchEntry {
        (**self).search_entry()
    }
}

impl<T: Indexable + ?Sized> Indexable for std::sync::Arc<T> {
    fn identity(&self) -> EntityId {
        (**self).identity()
    }

    fn entry_type(&self) -> &str {
        (**self).entry_type()
    }

    fn search_entry(&self) -> SearchEntry {
        (**self).search_entry()
    }
}
