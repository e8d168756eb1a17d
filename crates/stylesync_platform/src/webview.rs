//! WebView bridge.
//!
//! Adapts a host-side WebView handle into a [`HostTransport`]: outbound
//! messages are encoded as [`WireMessage`] envelopes and posted as text,
//! inbound text messages are decoded and fanned out to registered handlers.

use crate::error::{BridgeError, Result};
use crate::message::OutboundMessage;
use crate::transport::{HandlerId, HandlerRegistry, HostTransport, MessageHandler};
use crate::wire::WireMessage;
use std::sync::{Arc, Mutex, MutexGuard};

/// Stable identifier for a WebView instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WebViewId(pub u64);

/// WebView error details for asynchronous callback/reporting paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebViewError {
    /// Message bridge failed.
    MessageFailed(String),
    /// Any backend-specific error.
    Other(String),
}

/// WebView lifecycle and bridge events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebViewEvent {
    /// WebView is initialized and ready.
    Ready,
    /// Message received from web content.
    Message(String),
    /// Error emitted by the backend.
    Error(WebViewError),
}

/// Callback invoked for WebView events.
pub type WebViewEventHandler = Box<dyn Fn(WebViewEvent) + Send + Sync + 'static>;

/// WebView abstraction used by platform backends.
pub trait WebView: Send {
    /// Get the stable WebView identifier.
    fn id(&self) -> WebViewId;

    /// Post a message to web content.
    fn post_message(&self, message: &str) -> Result<()>;

    /// Register or clear the event callback.
    fn set_event_handler(&mut self, handler: Option<WebViewEventHandler>) -> Result<()>;
}

/// [`HostTransport`] over a [`WebView`].
pub struct WebViewTransport<W: WebView> {
    webview: Mutex<W>,
    registry: Arc<HandlerRegistry>,
}

impl<W: WebView> WebViewTransport<W> {
    /// Take over the WebView's event callback and start routing messages.
    pub fn attach(mut webview: W) -> Result<Self> {
        let registry = Arc::new(HandlerRegistry::new());
        let sink = Arc::clone(&registry);
        let id = webview.id();

        webview.set_event_handler(Some(Box::new(move |event| {
            route_event(&sink, id, event);
        })))?;

        tracing::debug!("attached transport to webview {:?}", id);
        Ok(Self {
            webview: Mutex::new(webview),
            registry,
        })
    }

    /// Release the WebView's event callback and hand the WebView back.
    pub fn detach(self) -> Result<W> {
        let mut webview = self
            .webview
            .into_inner()
            .map_err(|_| BridgeError::WebViewOperation("webview lock poisoned".to_string()))?;
        webview.set_event_handler(None)?;
        tracing::debug!("detached transport from webview {:?}", webview.id());
        Ok(webview)
    }

    /// The handler registry backing this transport
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    fn lock_webview(&self) -> Result<MutexGuard<'_, W>> {
        self.webview
            .lock()
            .map_err(|_| BridgeError::WebViewOperation("webview lock poisoned".to_string()))
    }
}

impl<W: WebView> HostTransport for WebViewTransport<W> {
    fn add_handler(&self, handler: Arc<dyn MessageHandler>) -> Result<HandlerId> {
        self.registry.insert(handler)
    }

    fn remove_handler(&self, id: HandlerId) -> Result<bool> {
        self.registry.remove(id)
    }

    fn post_message(&self, message: OutboundMessage) -> Result<()> {
        let text = WireMessage::from(&message).to_json()?;
        self.lock_webview()?.post_message(&text)
    }
}

fn route_event(registry: &HandlerRegistry, id: WebViewId, event: WebViewEvent) {
    match event {
        WebViewEvent::Ready => tracing::debug!("webview {:?} ready", id),
        WebViewEvent::Message(text) => match WireMessage::from_json(&text) {
            Ok(wire) => {
                registry.dispatch(&wire.kind, wire.payload.as_ref());
            }
            Err(e) => tracing::warn!("dropping malformed message from webview {:?}: {}", id, e),
        },
        WebViewEvent::Error(error) => tracing::warn!("webview {:?} reported {:?}", id, error),
    }
}
