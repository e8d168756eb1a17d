//! stylesync Core
//!
//! Keeps a rendered document's stylesheet and dark/light state consistent
//! with a host process it can only reach through an asynchronous message
//! channel.
//!
//! - **Injector**: [`StyleInjector`] attaches to a
//!   [`HostTransport`](stylesync_platform::HostTransport), requests the
//!   stylesheet, and reconciles host responses with the ambient theme
//! - **Events**: edge-triggered dark/light notifications
//! - **Config**: TOML configuration for rendering and classification
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use stylesync_core::{InjectorOptions, StyleInjector};
//! use stylesync_platform::{kinds, LocalTransport, OutboundMessage};
//! use stylesync_theme::SharedBaseTheme;
//!
//! let ambient = SharedBaseTheme::new(Some("vscode-dark"));
//! let transport = Arc::new(LocalTransport::new());
//! let injector = StyleInjector::new(
//!     InjectorOptions::new(true).ambient(Arc::new(ambient.clone())),
//! );
//!
//! let registration = injector.start(transport.clone()).unwrap();
//! assert_eq!(transport.drain_outbox(), vec![OutboundMessage::style_request(true)]);
//!
//! let payload = serde_json::json!({ "css": "body { color: white; }", "theme": "Dark+" });
//! transport.deliver(kinds::GET_CSS_RESPONSE, Some(&payload));
//! assert_eq!(injector.known_dark(), Some(true));
//!
//! registration.dispose().unwrap();
//! assert!(!injector.is_started());
//! ```

pub mod config;
pub mod events;
pub mod injector;
pub mod render;
pub mod state;

pub use config::{ConfigError, LogConfig, RenderConfig, StyleSyncConfig, ThemeConfig};
pub use events::{DarkChangedEvents, DarkChangedHandler, SubscriptionId};
pub use injector::{InjectorOptions, Registration, StyleInjector};
pub use render::render_style_block;
pub use state::StyleState;
