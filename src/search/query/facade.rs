//! Query façade: free text in, rehydrated entities out

use ahash::RandomState;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::parsing::{RawHit, group_hits, parse_select_response};
use super::results::SearchResultSet;
use super::store::EntityStore;
use crate::config::{SearchConfig, UnknownEntryPolicy};
use crate::search::dispatch::IndexTransport;
use crate::search::entity::{EntityId, Indexable};
use crate::search::errors::{SearchError, SearchResult};

/// Read path over the search server and the primary store
pub struct QueryFacade<E> {
    transport: Arc<dyn IndexTransport>,
    stores: HashMap<String, Arc<dyn EntityStore<E>>, RandomState>,
    policy: UnknownEntryPolicy,
    rows: Option<u32>,
}

impl<E> std::fmt::Debug for QueryFacade<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryFacade")
            .field("entry_types", &self.stores.keys().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<E: Indexable + 'static> QueryFacade<E> {
    #[must_use]
    pub fn new(transport: Arc<dyn IndexTransport>, config: &SearchConfig) -> Self {
        Self {
            transport,
            stores: HashMap::with_hasher(RandomState::new()),
            policy: config.unknown_entry_policy(),
            rows: config.rows(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: UnknownEntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Map a discriminator to the store that rehydrates it
    ///
    /// # Errors
    ///
    /// `Registration` for an empty or already registered discriminator.
    pub fn register(
        &mut self,
        entry_type: impl Into<String>,
        store: Arc<dyn EntityStore<E>>,
    ) -> SearchResult<()> {
        let entry_type = entry_type.into();
        if entry_type.trim().is_empty() {
            return Err(SearchError::Registration(
                "entry type must not be empty".to_string(),
            ));
        }
        if self.stores.contains_key(&entry_type) {
            return Err(SearchError::Registration(format!(
                "entry type '{entry_type}' is already registered"
            )));
        }
        tracing::debug!(entry_type = %entry_type, "Registered search entity store");
        self.stores.insert(entry_type, store);
        Ok(())
    }

    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    #[must_use]
    pub fn policy(&self) -> UnknownEntryPolicy {
        self.policy
    }

    /// Run `text` against the select endpoint without rehydrating
    ///
    /// # Errors
    ///
    /// Transport failures and `MalformedResponse`.
    pub async fn raw_hits(&self, text: &str) -> SearchResult<Vec<RawHit>> {
        let body = self.transport.select(text, self.rows).await?;
        parse_select_response(&body).inspect_err(|e| {
            tracing::warn!(query = %text, error = %e, "Discarding unparseable search response");
        })
    }

    /// Search, group hits by discriminator and rehydrate each group
    ///
    /// Hits whose record no longer exists are dropped. Blank text returns an
    /// empty set without contacting the server.
    ///
    /// # Errors
    ///
    /// Transport and parse failures, store failures, and
    /// `UnknownEntryType` under [`UnknownEntryPolicy::Fail`].
    pub async fn query(&self, text: &str) -> SearchResult<SearchResultSet<E>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SearchResultSet::new());
        }

        let start = Instant::now();
        let hits = self.raw_hits(text).await?;
        let hit_count = hits.len();

        let mut lookups = Vec::new();
        for (entry_type, ids) in group_hits(hits) {
            match self.stores.get(&entry_type) {
                Some(store) => lookups.push(rehydrate(entry_type, ids, store.clone())),
                None => match self.policy {
                    UnknownEntryPolicy::Skip => {
                        tracing::warn!(
                            entry_type = %entry_type,
                            hits = ids.len(),
                            "Skipping search hits of unknown entry type"
                        );
                    }
                    UnknownEntryPolicy::Fail => {
                        return Err(SearchError::UnknownEntryType(entry_type));
                    }
                },
            }
        }

        let mut results = SearchResultSet::new();
        for (entry_type, entities) in try_join_all(lookups).await? {
            results.insert(entry_type, entities);
        }

        tracing::info!(
            query = %text,
            hits = hit_count,
            results = results.len(),
            groups = results.group_count(),
            duration_ms = start.elapsed().as_millis(),
            "Search completed"
        );

        Ok(results)
    }
}

/// One store lookup for a group, reordered to hit order
async fn rehydrate<E: Indexable>(
    entry_type: String,
    ids: Vec<EntityId>,
    store: Arc<dyn EntityStore<E>>,
) -> SearchResult<(String, Vec<E>)> {
    let found = store.find_by_ids(&ids).await.map_err(|e| match e {
        SearchError::Store { .. } => e,
        other => SearchError::Store {
            entry_type: entry_type.clone(),
            message: other.to_string(),
        },
    })?;

    let mut by_id: HashMap<EntityId, E, RandomState> =
        HashMap::with_capacity_and_hasher(found.len(), RandomState::new());
    for entity in found {
        by_id.insert(entity.identity(), entity);
    }

    let entities: Vec<E> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
    let stale = ids.len() - entities.len();
    if stale > 0 {
        tracing::debug!(
            entry_type = %entry_type,
            stale = stale,
            "Dropped search hits with no backing record"
        );
    }

    Ok((entry_type, entities))
}
