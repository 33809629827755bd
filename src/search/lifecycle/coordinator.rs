//! Lifecycle coordinator: decides when an entity change reaches the index
//!
//! The coordinator owns one small state machine per entity, keyed by
//! `(entry_type, identity)`. Absent entries are `Clean`, so only dirty
//! entities and removal tombstones take memory.
//!
//! Each hook evaluates and updates the state while holding the map entry,
//! and enqueues its command before releasing it. A destroy running on
//! another thread therefore either happens entirely before an upsert
//! decision (and suppresses it) or entirely after it.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::state::{SyncOutcome, SyncState};
use crate::search::command::{CommandKind, IndexCommand};
use crate::search::dispatch::DispatchChannel;
use crate::search::entity::{EntityId, Indexable};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    entry_type: String,
    id: EntityId,
}

impl StateKey {
    fn of<E: Indexable + ?Sized>(entity: &E) -> Self {
        Self {
            entry_type: entity.entry_type().to_string(),
            id: entity.identity(),
        }
    }
}

/// Hooks entity lifecycle events and emits at most one command per event
#[derive(Debug)]
pub struct LifecycleCoordinator {
    states: DashMap<StateKey, SyncState, ahash::RandomState>,
    channel: DispatchChannel,
}

impl LifecycleCoordinator {
    #[must_use]
    pub fn new(channel: DispatchChannel) -> Self {
        Self {
            states: DashMap::with_hasher(ahash::RandomState::new()),
            channel,
        }
    }

    #[must_use]
    pub fn channel(&self) -> &DispatchChannel {
        &self.channel
    }

    /// Record that the entity's persisted state changed
    ///
    /// Ignored once the entity is being removed.
    pub fn mark_dirty<E: Indexable + ?Sized>(&self, entity: &E) -> SyncState {
        match self.states.entry(StateKey::of(entity)) {
            Entry::Occupied(entry) => {
                let state = *entry.get();
                if state.is_removing() {
                    debug!(
                        "Ignoring mutation of {} {} during removal",
                        entity.entry_type(),
                        entity.identity()
                    );
                }
                state
            }
            Entry::Vacant(entry) => {
                let state = SyncState::Dirty {
                    since: Instant::now(),
                };
                entry.insert(state);
                trace!("{} {} marked dirty", entity.entry_type(), entity.identity());
                state
            }
        }
    }

    /// Post-save hook
    ///
    /// `changed` folds a mutation observed by this save into the call.
    /// Dispatches an upsert only when the entity is dirty and not being
    /// removed; the dirty flag is cleared as soon as the upsert is queued.
    pub fn after_save<E: Indexable + ?Sized>(&self, entity: &E, changed: bool) -> SyncOutcome {
        self.sync(entity, changed, false)
    }

    /// Dispatch an upsert regardless of the dirty flag, unless removing
    pub fn force_sync<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        self.sync(entity, false, true)
    }

    fn sync<E: Indexable + ?Sized>(&self, entity: &E, changed: bool, force: bool) -> SyncOutcome {
        // Removal is checked before the dirty flag on every path.
        match self.states.entry(StateKey::of(entity)) {
            Entry::Occupied(entry) if entry.get().is_removing() => {
                debug!(
                    "Suppressed upsert of {} {}: removal in progress",
                    entity.entry_type(),
                    entity.identity()
                );
                SyncOutcome::Suppressed
            }
            Entry::Occupied(entry) => {
                let outcome = self.dispatch_upsert(entity);
                entry.remove();
                outcome
            }
            Entry::Vacant(_) if changed || force => self.dispatch_upsert(entity),
            Entry::Vacant(_) => SyncOutcome::Clean,
        }
    }

    /// Pre-destroy hook: enter the `Removing` state
    pub fn before_destroy<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        let mut entry = self.states.entry(StateKey::of(entity)).or_insert(SyncState::Clean);
        match *entry {
            SyncState::Removing {
                deleted_at: Some(_),
                ..
            } => SyncOutcome::AlreadyRemoved,
            SyncState::Removing { .. } => SyncOutcome::MarkedForRemoval,
            SyncState::Clean | SyncState::Dirty { .. } => {
                *entry = SyncState::Removing {
                    since: Instant::now(),
                    deleted_at: None,
                };
                debug!(
                    "{} {} will be removed from the search index",
                    entity.entry_type(),
                    entity.identity()
                );
                SyncOutcome::MarkedForRemoval
            }
        }
    }

    /// Post-destroy hook: dispatch the single delete for this entity
    ///
    /// Enters `Removing` itself when `before_destroy` was never observed.
    pub fn after_destroy<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        let now = Instant::now();
        let mut entry = self.states.entry(StateKey::of(entity)).or_insert(SyncState::Clean);
        let since = match *entry {
            SyncState::Removing {
                deleted_at: Some(_),
                ..
            } => return SyncOutcome::AlreadyRemoved,
            SyncState::Removing { since, .. } => since,
            SyncState::Clean | SyncState::Dirty { .. } => now,
        };
        *entry = SyncState::Removing {
            since,
            deleted_at: Some(now),
        };
        self.dispatch_delete(entity)
    }

    /// Rollback hook: the store's destroy failed after `before_destroy`
    ///
    /// Clears a pending removal so later saves reach the index again. Once
    /// the delete was dispatched the removal stands.
    pub fn cancel_destroy<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        match self.states.entry(StateKey::of(entity)) {
            Entry::Occupied(entry) => match *entry.get() {
                SyncState::Removing {
                    deleted_at: Some(_),
                    ..
                } => SyncOutcome::AlreadyRemoved,
                SyncState::Removing { .. } => {
                    entry.remove();
                    info!(
                        "Removal of {} {} was rolled back",
                        entity.entry_type(),
                        entity.identity()
                    );
                    SyncOutcome::Restored
                }
                SyncState::Clean | SyncState::Dirty { .. } => SyncOutcome::Clean,
            },
            Entry::Vacant(_) => SyncOutcome::Clean,
        }
    }

    /// Both destroy hooks in order, for callers without a two-phase destroy
    pub fn destroy<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        let _ = self.before_destroy(entity);
        self.after_destroy(entity)
    }

    fn dispatch_upsert<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        match IndexCommand::upsert_for(entity) {
            Ok(command) => {
                let status = self.channel.send(command);
                SyncOutcome::Dispatched {
                    kind: CommandKind::Upsert,
                    status,
                }
            }
            Err(e) => {
                error!(
                    "Cannot index {} {}: {}",
                    entity.entry_type(),
                    entity.identity(),
                    e
                );
                SyncOutcome::Rejected(e)
            }
        }
    }

    fn dispatch_delete<E: Indexable + ?Sized>(&self, entity: &E) -> SyncOutcome {
        let status = self.channel.send(IndexCommand::delete(entity.identity()));
        info!(
            "Removing {} {} from the search index",
            entity.entry_type(),
            entity.identity()
        );
        SyncOutcome::Dispatched {
            kind: CommandKind::Delete,
            status,
        }
    }

    /// Current state of an entity; untracked entities are `Clean`
    #[must_use]
    pub fn state_of<E: Indexable + ?Sized>(&self, entity: &E) -> SyncState {
        self.states
            .get(&StateKey::of(entity))
            .map_or(SyncState::Clean, |state| *state)
    }

    /// Number of dirty entities and tombstones currently tracked
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    /// Evict removal tombstones older than `older_than`
    ///
    /// Dispatched tombstones age from the moment their delete was queued.
    /// A pending removal whose `after_destroy` never arrived ages from
    /// `before_destroy` and is evicted as abandoned. Until evicted, a
    /// tombstone suppresses upserts for an entity with the same identity.
    pub fn purge_tombstones(&self, older_than: Duration) -> usize {
        let mut purged = 0;
        let mut abandoned = 0;
        self.states.retain(|_, state| match *state {
            SyncState::Removing {
                deleted_at: Some(deleted_at),
                ..
            } if deleted_at.elapsed() >= older_than => {
                purged += 1;
                false
            }
            SyncState::Removing {
                since,
                deleted_at: None,
            } if since.elapsed() >= older_than => {
                abandoned += 1;
                false
            }
            _ => true,
        });
        if abandoned > 0 {
            warn!(
                "Evicted {} search index removals that never completed",
                abandoned
            );
        }
        if purged > 0 {
            debug!("Purged {} search index tombstones", purged);
        }
        purged + abandoned
    }

    /// Run [`Self::purge_tombstones`] every `every` until aborted
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_purge_task(self: Arc<Self>, ttl: Duration, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.purge_tombstones(ttl);
            }
        })
    }
}
