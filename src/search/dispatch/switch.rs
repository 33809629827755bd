//! Process-wide enable/disable toggle for index dispatch

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared on/off switch gating every `send`
///
/// Cloning shares the flag. Toggling only affects sends issued afterwards;
/// commands already queued or in flight are delivered regardless.
#[derive(Debug, Clone)]
pub struct SyncSwitch {
    enabled: Arc<AtomicBool>,
}

impl SyncSwitch {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn enable(&self) {
        self.set(true);
    }

    pub fn disable(&self) {
        self.set(false);
    }

    /// Set the flag, returning the previous value
    pub fn set(&self, enabled: bool) -> bool {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::info!(enabled, "Search index dispatch toggled");
        }
        previous
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl Default for SyncSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}
