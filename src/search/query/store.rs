//! Primary store seam used for rehydration

use futures::future::BoxFuture;

use crate::search::entity::EntityId;
use crate::search::errors::SearchResult;

/// Batch lookup of entities of one kind by identifier
///
/// Identifiers with no record are simply absent from the result; order of
/// the returned entities does not matter.
pub trait EntityStore<E>: Send + Sync {
    fn find_by_ids<'a>(&'a self, ids: &'a [EntityId]) -> BoxFuture<'a, SearchResult<Vec<E>>>;
}
