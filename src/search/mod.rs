//! Search index synchronization
//!
//! Keeps an external full-text index in step with a primary store. Entity
//! lifecycle hooks decide when a change must reach the index, commands are
//! serialized to the server's XML update protocol, and a background worker
//! pool delivers them without ever blocking or failing the caller. The read
//! path queries the server and rehydrates hits from the primary store.

pub mod command;
pub mod dispatch;
pub mod entity;
pub mod errors;
pub mod lifecycle;
pub mod query;
pub mod runtime_helpers;
mod sync;

pub use command::{CommandKind, IndexCommand};
pub use dispatch::{
    DispatchChannel, DispatchStatsSnapshot, DispatchWorkers, IndexTransport, SendStatus,
    SolrHttpTransport, SyncSwitch,
};
pub use entity::{EntityId, FieldValue, Indexable, SearchEntry};
pub use errors::{RetryConfig, SearchError, SearchResult};
pub use lifecycle::{LifecycleCoordinator, SyncOutcome, SyncState};
pub use query::{EntityStore, QueryFacade, RawHit, SearchResultSet, collection_key};
pub use runtime_helpers::{retry_task, with_timeout};
pub use sync::SearchSync;
