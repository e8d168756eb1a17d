//! stylesync Host Transport
//!
//! The message channel between a rendered document and the host process
//! that owns its stylesheet:
//!
//! - **Protocol**: typed inbound/outbound messages decoded once at the
//!   boundary ([`InboundMessage`], [`OutboundMessage`])
//! - **Transport**: the [`HostTransport`] publish/subscribe contract and its
//!   handler registry
//! - **Bridges**: an in-process [`LocalTransport`] and a [`WebViewTransport`]
//!   speaking JSON envelopes over a WebView
//!
//! # Example
//!
//! ```rust
//! use stylesync_platform::{HostTransport, LocalTransport, OutboundMessage};
//!
//! let transport = LocalTransport::new();
//! transport.post_message(OutboundMessage::style_request(true)).unwrap();
//! assert_eq!(transport.drain_outbox().len(), 1);
//! ```

pub mod error;
pub mod message;
pub mod transport;
pub mod webview;
pub mod wire;

pub use error::{BridgeError, ProtocolError, Result};
pub use message::{kinds, CssRequest, CssResponse, HostSettings, InboundMessage, OutboundMessage};
pub use transport::{HandlerId, HandlerRegistry, HostTransport, LocalTransport, MessageHandler};
pub use webview::{
    WebView, WebViewError, WebViewEvent, WebViewEventHandler, WebViewId, WebViewTransport,
};
pub use wire::WireMessage;
