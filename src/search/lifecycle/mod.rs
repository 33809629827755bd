//! Entity lifecycle hooks driving index synchronization
//!
//! Attach the coordinator's hooks to the primary store's callbacks:
//!
//! | store callback | coordinator hook |
//! |---|---|
//! | attribute change | `mark_dirty` |
//! | `afterSave` | `after_save` |
//! | `beforeDestroy` | `before_destroy` |
//! | `afterDestroy` | `after_destroy` |
//! | destroy rolled back | `cancel_destroy` |
//!
//! Administrative re-index tools call `force_sync`.

mod coordinator;
mod state;

pub use coordinator::LifecycleCoordinator;
pub use state::{SyncOutcome, SyncState};
