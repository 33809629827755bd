//! Shared fixtures for the integration suite: a small Q&A domain, an
//! in-memory primary store and a recording transport

#![allow(dead_code)]

use futures::future::BoxFuture;
use parking_lot::Mutex;
use search_index_sync::search::dispatch::IndexTransport;
use search_index_sync::{
    EntityId, EntityStore, Indexable, SearchConfig, SearchEntry, SearchError, SearchResult,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub topics: Vec<String>,
}

impl Question {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            body: String::new(),
            topics: Vec::new(),
        }
    }
}

impl Indexable for Question {
    fn identity(&self) -> EntityId {
        EntityId::from(self.id)
    }

    fn entry_type(&self) -> &str {
        "Question"
    }

    fn search_entry(&self) -> SearchEntry {
        SearchEntry::for_entity(self)
            .field("title", &self.title)
            .field("body", &self.body)
            .field("topics", self.topics.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub id: u64,
    pub name: String,
}

impl Indexable for Topic {
    fn identity(&self) -> EntityId {
        EntityId::from(self.id)
    }

    fn entry_type(&self) -> &str {
        "Topic"
    }

    fn search_entry(&self) -> SearchEntry {
        SearchEntry::for_entity(self).field("name", &self.name)
    }
}

/// Everything the façade can hand back
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Question(Question),
    Topic(Topic),
}

impl Indexable for Entity {
    fn identity(&self) -> EntityId {
        match self {
            Entity::Question(q) => q.identity(),
            Entity::Topic(t) => t.identity(),
        }
    }

    fn entry_type(&self) -> &str {
        match self {
            Entity::Question(q) => q.entry_type(),
            Entity::Topic(t) => t.entry_type(),
        }
    }

    fn search_entry(&self) -> SearchEntry {
        match self {
            Entity::Question(q) => q.search_entry(),
            Entity::Topic(t) => t.search_entry(),
        }
    }
}

/// Primary store for one entity kind
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Entity>>,
    lookups: Mutex<Vec<Vec<String>>>,
    fail: bool,
}

impl MemoryStore {
    pub fn with(records: Vec<Entity>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn remove(&self, id: u64) {
        let id = EntityId::from(id);
        self.records.lock().retain(|e| e.identity() != id);
    }

    /// Ids requested by each lookup so far
    pub fn lookups(&self) -> Vec<Vec<String>> {
        self.lookups.lock().clone()
    }
}

impl EntityStore<Entity> for MemoryStore {
    fn find_by_ids<'a>(&'a self, ids: &'a [EntityId]) -> BoxFuture<'a, SearchResult<Vec<Entity>>> {
        Box::pin(async move {
            self.lookups
                .lock()
                .push(ids.iter().map(|id| id.to_string()).collect());
            if self.fail {
                return Err(SearchError::Transport("connection reset".to_string()));
            }
            let records = self.records.lock();
            Ok(records
                .iter()
                .filter(|e| ids.contains(&e.identity()))
                .cloned()
                .collect())
        })
    }
}

/// Transport that records update bodies and answers selects from a canned body
#[derive(Default)]
pub struct RecordingTransport {
    updates: Mutex<Vec<String>>,
    select_body: Mutex<String>,
    queries: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answering(body: &str) -> Arc<Self> {
        let transport = Self::default();
        *transport.select_body.lock() = body.to_string();
        Arc::new(transport)
    }

    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

impl IndexTransport for RecordingTransport {
    fn post_update(&self, body: String) -> BoxFuture<'_, SearchResult<()>> {
        self.updates.lock().push(body);
        Box::pin(async { Ok(()) })
    }

    fn select(&self, query: &str, _rows: Option<u32>) -> BoxFuture<'_, SearchResult<String>> {
        self.queries.lock().push(query.to_string());
        let body = self.select_body.lock().clone();
        Box::pin(async move { Ok(body) })
    }
}

/// Select response body listing `(id, entry_type)` docs in ranking order
pub fn select_body(docs: &[(u64, &str)]) -> String {
    let docs: Vec<serde_json::Value> = docs
        .iter()
        .map(|(id, entry_type)| serde_json::json!({ "id": id.to_string(), "entry_type": entry_type }))
        .collect();
    serde_json::json!({
        "responseHeader": { "status": 0 },
        "response": { "numFound": docs.len(), "start": 0, "docs": docs }
    })
    .to_string()
}

pub fn test_config() -> SearchConfig {
    SearchConfig::builder()
        .host("127.0.0.1")
        .request_timeout_secs(2)
        .build()
        .unwrap()
}
