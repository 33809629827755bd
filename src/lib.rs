pub mod config;
pub mod search;
pub mod utils;

pub use config::{BackpressureMode, SearchConfig, UnknownEntryPolicy};
pub use search::{
    CommandKind, DispatchChannel, EntityId, EntityStore, FieldValue, IndexCommand, IndexTransport,
    Indexable, LifecycleCoordinator, QueryFacade, SearchEntry, SearchError, SearchResult,
    SearchResultSet, SearchSync, SendStatus, SolrHttpTransport, SyncOutcome, SyncState,
    SyncSwitch,
};
