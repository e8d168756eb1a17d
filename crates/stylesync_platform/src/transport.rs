//! Host transport abstraction
//!
//! A transport owns a registry of message handlers. Inbound host messages
//! are fanned out to every registered handler in registration order;
//! outbound messages are fire-and-forget.

use crate::error::{BridgeError, Result};
use crate::message::{InboundMessage, OutboundMessage};
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

new_key_type! {
    /// Identifier handed out when a handler is registered
    pub struct HandlerId;
}

/// Receives host messages.
pub trait MessageHandler: Send + Sync {
    /// Handle one message.
    ///
    /// Returns `true` when the message was consumed. Returning `true` never
    /// stops delivery to the remaining handlers.
    fn handle_message(&self, kind: &str, payload: Option<&Value>) -> bool;
}

/// Publish/subscribe channel to the host.
pub trait HostTransport: Send + Sync {
    /// Register a handler for inbound messages.
    fn add_handler(&self, handler: Arc<dyn MessageHandler>) -> Result<HandlerId>;

    /// Remove a previously registered handler.
    ///
    /// Returns `false` if the id was not registered.
    fn remove_handler(&self, id: HandlerId) -> Result<bool>;

    /// Send a message to the host without waiting for an answer.
    fn post_message(&self, message: OutboundMessage) -> Result<()>;
}

/// Handler registry shared by transport implementations.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<SlotMap<HandlerId, Arc<dyn MessageHandler>>>,
    added: AtomicUsize,
    removed: AtomicUsize,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler
    pub fn insert(&self, handler: Arc<dyn MessageHandler>) -> Result<HandlerId> {
        let id = self.lock()?.insert(handler);
        self.added.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("registered message handler {:?}", id);
        Ok(id)
    }

    /// Deregister a handler
    pub fn remove(&self, id: HandlerId) -> Result<bool> {
        let removed = self.lock()?.remove(id).is_some();
        if removed {
            self.removed.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("removed message handler {:?}", id);
        }
        Ok(removed)
    }

    /// Deliver a message to every registered handler.
    ///
    /// Handlers are snapshotted first so they may register or deregister
    /// while being called. Returns how many handlers reported the message
    /// as consumed.
    pub fn dispatch(&self, kind: &str, payload: Option<&Value>) -> usize {
        let handlers: Vec<Arc<dyn MessageHandler>> = match self.handlers.lock() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        };

        handlers
            .iter()
            .filter(|handler| handler.handle_message(kind, payload))
            .count()
    }

    /// Number of currently registered handlers
    pub fn len(&self) -> usize {
        match self.handlers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total successful registrations since creation
    pub fn registrations(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    /// Total successful deregistrations since creation
    pub fn deregistrations(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SlotMap<HandlerId, Arc<dyn MessageHandler>>>> {
        self.handlers
            .lock()
            .map_err(|_| BridgeError::Other("handler registry lock poisoned".to_string()))
    }
}

/// In-process transport.
///
/// Outbound messages are queued in an outbox the embedder drains; inbound
/// messages are pushed with [`LocalTransport::deliver`]. This is the
/// transport used when host and document share a process, and the fake
/// transport in tests.
#[derive(Default)]
pub struct LocalTransport {
    registry: HandlerRegistry,
    outbox: Mutex<Vec<OutboundMessage>>,
    post_failure: Mutex<Option<String>>,
}

impl LocalTransport {
    /// Create a transport with no handlers and an empty outbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a raw host message to all handlers
    pub fn deliver(&self, kind: &str, payload: Option<&Value>) -> usize {
        self.registry.dispatch(kind, payload)
    }

    /// Deliver a typed host message to all handlers
    pub fn deliver_inbound(&self, message: &InboundMessage) -> usize {
        let payload = message.payload();
        self.registry.dispatch(message.kind(), Some(&payload))
    }

    /// Take every message posted so far, oldest first
    pub fn drain_outbox(&self) -> Vec<OutboundMessage> {
        match self.outbox.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Number of messages waiting in the outbox
    pub fn outbox_len(&self) -> usize {
        match self.outbox.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Make subsequent posts fail with the given reason, or succeed again with `None`
    pub fn reject_posts(&self, reason: Option<&str>) {
        let reason = reason.map(str::to_string);
        match self.post_failure.lock() {
            Ok(mut guard) => *guard = reason,
            Err(poisoned) => *poisoned.into_inner() = reason,
        }
    }

    /// The handler registry backing this transport
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

impl HostTransport for LocalTransport {
    fn add_handler(&self, handler: Arc<dyn MessageHandler>) -> Result<HandlerId> {
        self.registry.insert(handler)
    }

    fn remove_handler(&self, id: HandlerId) -> Result<bool> {
        self.registry.remove(id)
    }

    fn post_message(&self, message: OutboundMessage) -> Result<()> {
        let failure = self
            .post_failure
            .lock()
            .map_err(|_| BridgeError::Other("transport state lock poisoned".to_string()))?
            .clone();
        if let Some(reason) = failure {
            return Err(BridgeError::PostFailed(reason));
        }

        self.outbox
            .lock()
            .map_err(|_| BridgeError::Other("outbox lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}
