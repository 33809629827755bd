//! Per-entity synchronization state and hook outcomes

use std::time::Instant;

use crate::search::command::CommandKind;
use crate::search::dispatch::SendStatus;
use crate::search::errors::SearchError;

/// Synchronization state of one entity
///
/// ```text
/// Clean --mutation--> Dirty --after_save / force_sync--> Clean
///   \                   |
///    `---before_destroy / after_destroy---> Removing
/// ```
///
/// `Removing` is terminal once the delete went out. Before that,
/// `cancel_destroy` returns the entity to `Clean` when the store's destroy
/// was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// In step with the last dispatched projection
    Clean,
    /// Mutated since the last upsert was requested
    Dirty { since: Instant },
    /// Destruction started; only the delete may still be dispatched
    Removing {
        since: Instant,
        /// When the delete was handed to the dispatch channel
        deleted_at: Option<Instant>,
    },
}

impl SyncState {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, SyncState::Clean)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        matches!(self, SyncState::Dirty { .. })
    }

    #[must_use]
    pub fn is_removing(&self) -> bool {
        matches!(self, SyncState::Removing { .. })
    }

    #[must_use]
    pub fn delete_dispatched(&self) -> bool {
        matches!(
            self,
            SyncState::Removing {
                deleted_at: Some(_),
                ..
            }
        )
    }
}

/// What a lifecycle hook did
#[derive(Debug)]
pub enum SyncOutcome {
    /// A command was handed to the dispatch channel
    Dispatched {
        kind: CommandKind,
        status: SendStatus,
    },
    /// Nothing changed since the last sync; no command
    Clean,
    /// Entity is being removed; the upsert was suppressed
    Suppressed,
    /// Entity entered `Removing`; the delete follows after destruction
    MarkedForRemoval,
    /// Delete already dispatched for this entity
    AlreadyRemoved,
    /// Pending removal was abandoned; the entity syncs normally again
    Restored,
    /// Projection could not be built; nothing dispatched
    Rejected(SearchError),
}

impl SyncOutcome {
    /// Kind of command dispatched, if any
    #[must_use]
    pub fn dispatched(&self) -> Option<CommandKind> {
        match self {
            SyncOutcome::Dispatched { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
