//! Index commands and their wire form
//!
//! A command is an immutable value carrying only an identity and, for
//! upserts, the projected fields. Commands are serde-serializable so a
//! reconciliation job can persist and replay them.

mod serializer;

pub use serializer::{escape_query_term, serialize_delete, serialize_upsert};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::search::entity::{EntityId, Indexable, SearchEntry};
use crate::search::errors::{SearchError, SearchResult};

/// Kind of an index command, used in logs and outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Upsert,
    Delete,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Upsert => write!(f, "upsert"),
            CommandKind::Delete => write!(f, "delete"),
        }
    }
}

/// Instruction for the search server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IndexCommand {
    /// Add or replace the document for `id`
    Upsert { id: EntityId, entry: SearchEntry },
    /// Remove every document whose `id` field equals `id`
    Delete { id: EntityId },
}

impl IndexCommand {
    /// Build an upsert from the entity's current projection
    ///
    /// The document always leads with the entity's `id` and `entry_type`,
    /// whether or not the projection carried them.
    ///
    /// # Errors
    ///
    /// Returns `UnimplementedProjection` when the entity projects no fields.
    pub fn upsert_for<E: Indexable + ?Sized>(entity: &E) -> SearchResult<Self> {
        let entry = entity.search_entry();
        if entry.is_empty() {
            return Err(SearchError::UnimplementedProjection {
                entry_type: entity.entry_type().to_string(),
            });
        }
        let id = entity.identity();
        let entry = entry.with_identity(&id, entity.entry_type());
        Ok(IndexCommand::Upsert { id, entry })
    }

    #[must_use]
    pub fn delete(id: EntityId) -> Self {
        IndexCommand::Delete { id }
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            IndexCommand::Upsert { id, .. } | IndexCommand::Delete { id } => id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            IndexCommand::Upsert { .. } => CommandKind::Upsert,
            IndexCommand::Delete { .. } => CommandKind::Delete,
        }
    }

    /// Wire body for the update endpoint
    #[must_use]
    pub fn to_xml(&self) -> String {
        match self {
            IndexCommand::Upsert { id, entry } => serialize_upsert(id, entry),
            IndexCommand::Delete { id } => serialize_delete(id),
        }
    }
}

#[cfg(test)]
mod tests;
