//! Dark/light change notifications
//!
//! Listeners subscribe and get a [`SubscriptionId`] back to unsubscribe
//! with. Emission is edge-triggered by the caller: the injector only emits
//! when its stored classification actually changes.

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex, MutexGuard};

new_key_type! {
    /// Handle for removing a dark-changed listener
    pub struct SubscriptionId;
}

/// Listener invoked with the new dark flag
pub type DarkChangedHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// Registry of dark-changed listeners
#[derive(Default)]
pub struct DarkChangedEvents {
    listeners: Mutex<SlotMap<SubscriptionId, DarkChangedHandler>>,
}

impl DarkChangedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.lock().insert(Arc::new(listener))
    }

    /// Remove a listener; `false` if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Call every listener with `is_dark`.
    ///
    /// Listeners are snapshotted first, so a listener may subscribe or
    /// unsubscribe while being called.
    pub fn emit(&self, is_dark: bool) -> usize {
        let listeners: Vec<DarkChangedHandler> = self.lock().values().cloned().collect();
        for listener in &listeners {
            listener(is_dark);
        }
        listeners.len()
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, SlotMap<SubscriptionId, DarkChangedHandler>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
