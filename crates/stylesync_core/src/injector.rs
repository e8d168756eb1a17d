//! Style injector
//!
//! Keeps a document's stylesheet and dark/light state in step with a host it
//! can only talk to through a [`HostTransport`]. Three inputs race:
//!
//! - stylesheet responses pushed by the host
//! - settings updates pushed by the host
//! - the ambient theme of the embedding environment
//!
//! The ambient classification is authoritative. Whatever dark/light verdict
//! the host computed earlier is ignored; the injector reclassifies every
//! time it applies a stylesheet.
//!
//! # Lifecycle
//!
//! ```text
//! start(transport) ─► register handler ─► placeholder css ─► post request
//!        ▲                                                        │
//!        │               handle_message(get_css_response) ◄───────┘
//!        │               handle_message(update_settings)  ─► maybe re-request
//!        │
//! Registration::dispose() / drop ─► deregister handler ─► discard state
//! ```

use crate::config::StyleSyncConfig;
use crate::events::{DarkChangedEvents, SubscriptionId};
use crate::render::render_style_block;
use crate::state::StyleState;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use stylesync_platform::{
    BridgeError, CssResponse, HandlerId, HostSettings, HostTransport, InboundMessage,
    MessageHandler, OutboundMessage, Result,
};
use stylesync_theme::{AmbientTheme, ColorScheme, StaticTheme, ThemeClassifier};

/// Construction parameters for a [`StyleInjector`]
pub struct InjectorOptions {
    /// Dark/light hint sent with the initial style request
    pub expecting_dark: bool,
    /// Listener subscribed to dark-changed events on construction
    pub on_dark_changed: Option<Box<dyn Fn(bool) + Send + Sync + 'static>>,
    /// Rendering and classification settings
    pub config: StyleSyncConfig,
    /// Where the ambient base theme is read from
    pub ambient: Arc<dyn AmbientTheme>,
}

impl InjectorOptions {
    /// Options with default config and no ambient source (always light)
    pub fn new(expecting_dark: bool) -> Self {
        Self {
            expecting_dark,
            on_dark_changed: None,
            config: StyleSyncConfig::default(),
            ambient: Arc::new(StaticTheme::unavailable()),
        }
    }

    /// Subscribe a dark-changed listener on construction
    pub fn on_dark_changed<F>(mut self, listener: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_dark_changed = Some(Box::new(listener));
        self
    }

    /// Set the configuration
    pub fn config(mut self, config: StyleSyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the ambient theme source
    pub fn ambient(mut self, ambient: Arc<dyn AmbientTheme>) -> Self {
        self.ambient = ambient;
        self
    }
}

struct Attachment {
    transport: Arc<dyn HostTransport>,
    handler: HandlerId,
    generation: u64,
}

struct InjectorInner {
    expecting_dark: bool,
    config: StyleSyncConfig,
    classifier: ThemeClassifier,
    state: Mutex<StyleState>,
    attachment: Mutex<Option<Attachment>>,
    generation: AtomicU64,
    events: DarkChangedEvents,
}

/// Synchronizes stylesheet and theme state with the host.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct StyleInjector {
    inner: Arc<InjectorInner>,
}

impl StyleInjector {
    /// Create a detached injector
    pub fn new(options: InjectorOptions) -> Self {
        let InjectorOptions {
            expecting_dark,
            on_dark_changed,
            config,
            ambient,
        } = options;

        let classifier =
            ThemeClassifier::new(ambient).with_light_sentinel(config.theme.light_sentinel.clone());

        let events = DarkChangedEvents::new();
        if let Some(listener) = on_dark_changed {
            events.subscribe(listener);
        }

        Self {
            inner: Arc::new(InjectorInner {
                expecting_dark,
                config,
                classifier,
                state: Mutex::new(StyleState::default()),
                attachment: Mutex::new(None),
                generation: AtomicU64::new(0),
                events,
            }),
        }
    }

    /// Attach to a transport and request the initial stylesheet.
    ///
    /// The handler is registered before anything is posted, so no response
    /// can be missed. Fails with [`BridgeError::AlreadyStarted`] if already
    /// attached. If the initial request cannot be posted the registration is
    /// rolled back and the post error returned.
    pub fn start(&self, transport: Arc<dyn HostTransport>) -> Result<Registration> {
        let generation = {
            let mut attachment = self.inner.lock_attachment();
            if attachment.is_some() {
                return Err(BridgeError::AlreadyStarted);
            }

            let handler: Arc<dyn MessageHandler> = self.inner.clone();
            let id = transport.add_handler(handler)?;
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *attachment = Some(Attachment {
                transport: Arc::clone(&transport),
                handler: id,
                generation,
            });
            generation
        };
        tracing::debug!("style injector attached (generation {})", generation);

        if let Err(e) = self.inner.request_initial_styles(transport.as_ref()) {
            tracing::warn!("initial style request failed: {}", e);
            if let Err(rollback) = self.inner.detach(generation) {
                tracing::warn!("failed to roll back handler registration: {}", rollback);
            }
            return Err(e);
        }

        Ok(Registration {
            inner: Arc::clone(&self.inner),
            generation,
            disposed: false,
        })
    }

    /// Detach using the registration returned by [`StyleInjector::start`].
    ///
    /// Returns `false` if the registration was already stale.
    pub fn stop(&self, registration: Registration) -> Result<bool> {
        registration.dispose()
    }

    /// Whether the injector is attached to a transport
    pub fn is_started(&self) -> bool {
        self.inner.lock_attachment().is_some()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> StyleState {
        self.inner.lock_state().clone()
    }

    /// Current stylesheet text
    pub fn root_css(&self) -> Option<String> {
        self.inner.lock_state().root_css.clone()
    }

    /// Last recorded ambient classification
    pub fn known_dark(&self) -> Option<bool> {
        self.inner.lock_state().known_dark
    }

    /// Render the style block wrapping `children`
    pub fn render(&self, children: &str) -> String {
        let state = self.inner.lock_state();
        render_style_block(
            &self.inner.config.render.container_class,
            state.root_css.as_deref(),
            children,
        )
    }

    /// Listen for dark/light transitions
    pub fn subscribe_dark_changed<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(listener)
    }

    /// Stop listening; `false` if the listener was already gone
    pub fn unsubscribe_dark_changed(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// The classifier used for ambient reads
    pub fn classifier(&self) -> &ThemeClassifier {
        &self.inner.classifier
    }
}

impl MessageHandler for StyleInjector {
    fn handle_message(&self, kind: &str, payload: Option<&Value>) -> bool {
        self.inner.dispatch(kind, payload)
    }
}

impl fmt::Debug for StyleInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleInjector")
            .field("expecting_dark", &self.inner.expecting_dark)
            .field("started", &self.is_started())
            .field("state", &self.state())
            .finish()
    }
}

impl InjectorInner {
    fn lock_state(&self) -> MutexGuard<'_, StyleState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_attachment(&self) -> MutexGuard<'_, Option<Attachment>> {
        self.attachment
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_attachment(&self) -> Option<(Arc<dyn HostTransport>, u64)> {
        self.lock_attachment()
            .as_ref()
            .map(|attachment| (Arc::clone(&attachment.transport), attachment.generation))
    }

    fn request_initial_styles(&self, transport: &dyn HostTransport) -> Result<()> {
        {
            let mut state = self.lock_state();
            if state.has_css() {
                return Ok(());
            }
            // Non-empty so the style element never collapses before the
            // first response arrives.
            state.root_css = Some(self.config.render.placeholder.clone());
        }

        tracing::debug!(
            "requesting initial styles (expecting dark: {})",
            self.expecting_dark
        );
        transport.post_message(OutboundMessage::style_request(self.expecting_dark))
    }

    /// Deregister if `generation` is still the live attachment.
    fn detach(&self, generation: u64) -> Result<bool> {
        let attachment = {
            let mut guard = self.lock_attachment();
            match guard.as_ref() {
                Some(current) if current.generation == generation => {
                    // Reset while still holding the attachment so no in-flight
                    // message can write between the two.
                    *self.lock_state() = StyleState::default();
                    guard.take()
                }
                _ => None,
            }
        };
        let Some(attachment) = attachment else {
            return Ok(false);
        };

        let removed = attachment.transport.remove_handler(attachment.handler)?;
        tracing::debug!(
            "style injector detached (generation {}, removed: {})",
            generation,
            removed
        );
        Ok(removed)
    }

    /// Run `f` on the state if `generation` is still attached.
    ///
    /// Lock order is attachment then state, the same as [`Self::detach`].
    fn with_attached_state<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut StyleState) -> R,
    ) -> Option<R> {
        let attachment = self.lock_attachment();
        if !attachment
            .as_ref()
            .is_some_and(|current| current.generation == generation)
        {
            return None;
        }
        let mut state = self.lock_state();
        Some(f(&mut state))
    }

    fn dispatch(&self, kind: &str, payload: Option<&Value>) -> bool {
        let Some((transport, generation)) = self.current_attachment() else {
            tracing::trace!("ignoring '{}' while detached", kind);
            return true;
        };

        match InboundMessage::decode(kind, payload) {
            Ok(Some(InboundMessage::StyleResponse(response))) => {
                self.handle_response(response, generation)
            }
            Ok(Some(InboundMessage::SettingsUpdate(raw))) => {
                self.update_settings(&raw, transport.as_ref(), generation)
            }
            Ok(None) => tracing::trace!("nothing to do for '{}'", kind),
            Err(e) => tracing::warn!("dropping '{}' message: {}", kind, e),
        }

        true
    }

    fn handle_response(&self, response: CssResponse, generation: u64) {
        if response.css.is_empty() {
            tracing::trace!("ignoring style response without css");
            return;
        }

        // Ambient state is more current than whatever the host saw when it
        // built the response.
        let computed_dark = self.classifier.is_dark();
        let Some(edge) = self.with_attached_state(generation, |state| {
            state.apply_response(response, computed_dark)
        }) else {
            tracing::trace!("dropping style response for detached generation {}", generation);
            return;
        };

        if let Some(is_dark) = edge {
            tracing::debug!("ambient theme is now {}", ColorScheme::from_dark(is_dark));
            self.events.emit(is_dark);
        }
    }

    fn update_settings(&self, raw: &str, transport: &dyn HostTransport, generation: u64) {
        let settings = match HostSettings::parse(raw) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring malformed settings update: {}", e);
                return;
            }
        };

        let Some(theme) = settings.theme else {
            return;
        };
        let changed = self.with_attached_state(generation, |state| state.theme_changed(&theme));
        if changed != Some(true) {
            return;
        }

        let is_dark = self.classifier.is_dark();
        tracing::debug!(
            "host theme changed to '{}', requesting styles (dark: {})",
            theme,
            is_dark
        );
        if let Err(e) = transport.post_message(OutboundMessage::style_request(is_dark)) {
            tracing::warn!("style request after theme change failed: {}", e);
        }
    }
}

impl MessageHandler for InjectorInner {
    fn handle_message(&self, kind: &str, payload: Option<&Value>) -> bool {
        self.dispatch(kind, payload)
    }
}

/// Disposer returned by [`StyleInjector::start`].
///
/// Disposing (explicitly or by dropping) deregisters the injector's handler
/// and discards its state. Only the first disposal has an effect, and a
/// registration from an earlier start cycle never detaches a later one.
#[must_use = "dropping a Registration detaches the injector"]
pub struct Registration {
    inner: Arc<InjectorInner>,
    generation: u64,
    disposed: bool,
}

impl Registration {
    /// Detach now; `false` if this registration was already stale
    pub fn dispose(mut self) -> Result<bool> {
        self.disposed = true;
        self.inner.detach(self.generation)
    }

    /// Whether this registration is the injector's live attachment
    pub fn is_active(&self) -> bool {
        !self.disposed
            && self
                .inner
                .lock_attachment()
                .as_ref()
                .is_some_and(|attachment| attachment.generation == self.generation)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Err(e) = self.inner.detach(self.generation) {
            tracing::warn!("failed to detach style injector on drop: {}", e);
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("generation", &self.generation)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stylesync_platform::{kinds, LocalTransport};
    use std::sync::Barrier;
    use std::thread;
    use stylesync_theme::{FnTheme, SharedBaseTheme};

    fn setup(expecting_dark: bool) -> (StyleInjector, Arc<LocalTransport>, SharedBaseTheme) {
        let ambient = SharedBaseTheme::new(Some("vscode-light"));
        let injector = StyleInjector::new(
            InjectorOptions::new(expecting_dark).ambient(Arc::new(ambient.clone())),
        );
        (injector, Arc::new(LocalTransport::new()), ambient)
    }

    #[test]
    fn test_start_sets_placeholder_and_requests_once() {
        let (injector, transport, _ambient) = setup(true);

        let _registration = injector.start(transport.clone()).unwrap();

        assert_eq!(injector.root_css().as_deref(), Some(" "));
        assert_eq!(
            transport.drain_outbox(),
            vec![OutboundMessage::style_request(true)]
        );
        assert_eq!(transport.registry().len(), 1);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let (injector, transport, _ambient) = setup(false);
        let _registration = injector.start(transport.clone()).unwrap();

        let err = injector.start(transport.clone()).unwrap_err();

        assert!(matches!(err, BridgeError::AlreadyStarted));
        assert_eq!(transport.registry().registrations(), 1);
        assert_eq!(transport.outbox_len(), 1);
    }

    #[test]
    fn test_failed_initial_request_rolls_back() {
        let (injector, transport, _ambient) = setup(false);
        transport.reject_posts(Some("closed"));

        let err = injector.start(transport.clone()).unwrap_err();

        assert!(matches!(err, BridgeError::PostFailed(_)));
        assert!(!injector.is_started());
        assert_eq!(injector.state(), StyleState::default());
        assert_eq!(transport.registry().registrations(), 1);
        assert_eq!(transport.registry().deregistrations(), 1);
    }

    #[test]
    fn test_response_ignores_payload_classification() {
        let (injector, transport, ambient) = setup(true);
        let _registration = injector.start(transport.clone()).unwrap();
        ambient.set(Some("vscode-light"));

        transport.deliver(
            kinds::GET_CSS_RESPONSE,
            Some(&json!({ "css": "body{}", "theme": "Dark+", "knownDark": true })),
        );

        assert_eq!(injector.known_dark(), Some(false));
        assert_eq!(injector.state().theme.as_deref(), Some("Dark+"));
    }

    #[test]
    fn test_malformed_settings_are_dropped() {
        let (injector, transport, _ambient) = setup(false);
        let _registration = injector.start(transport.clone()).unwrap();
        transport.drain_outbox();
        let before = injector.state();

        let consumed = transport.deliver(kinds::UPDATE_SETTINGS, Some(&json!("{oops")));

        assert_eq!(consumed, 1);
        assert_eq!(injector.state(), before);
        assert_eq!(transport.outbox_len(), 0);
    }

    #[test]
    fn test_detached_injector_ignores_messages() {
        let (injector, _transport, _ambient) = setup(false);

        assert!(injector.handle_message(
            kinds::GET_CSS_RESPONSE,
            Some(&json!({ "css": "body{}", "theme": "t" }))
        ));

        assert_eq!(injector.state(), StyleState::default());
    }

    #[test]
    fn test_stale_registration_does_not_detach_new_cycle() {
        let (injector, transport, _ambient) = setup(false);
        let first = injector.start(transport.clone()).unwrap();
        assert!(injector.stop(first).unwrap());

        let second = injector.start(transport.clone()).unwrap();
        assert!(second.is_active());
        assert_eq!(transport.registry().registrations(), 2);
        assert_eq!(transport.registry().deregistrations(), 1);

        drop(second);
        assert!(!injector.is_started());
        assert_eq!(transport.registry().deregistrations(), 2);
    }

    #[test]
    fn test_render_uses_configured_class() {
        let mut config = StyleSyncConfig::default();
        config.render.container_class = "notebook".to_string();
        let injector = StyleInjector::new(InjectorOptions::new(false).config(config));
        let transport = Arc::new(LocalTransport::new());
        let _registration = injector.start(transport.clone()).unwrap();

        transport.deliver(
            kinds::GET_CSS_RESPONSE,
            Some(&json!({ "css": "p{}", "theme": "t" })),
        );

        assert_eq!(
            injector.render("<p>x</p>"),
            "<div class=\"notebook\"><style>p{}</style><p>x</p></div>"
        );
    }

    #[test]
    fn test_stop_during_in_flight_response_discards_it() {
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let (ambient_entered, ambient_release) = (Arc::clone(&entered), Arc::clone(&release));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        // The ambient read happens mid-response; park it there until stopped.
        let injector = StyleInjector::new(
            InjectorOptions::new(true)
                .ambient(Arc::new(FnTheme(move || {
                    ambient_entered.wait();
                    ambient_release.wait();
                    Some("vscode-dark".to_string())
                })))
                .on_dark_changed(move |is_dark| sink.lock().unwrap().push(is_dark)),
        );
        let transport = Arc::new(LocalTransport::new());
        let registration = injector.start(transport.clone()).unwrap();

        let host = Arc::clone(&transport);
        let in_flight = thread::spawn(move || {
            host.deliver(
                kinds::GET_CSS_RESPONSE,
                Some(&json!({ "css": "late{}", "theme": "x" })),
            )
        });

        entered.wait();
        assert!(injector.stop(registration).unwrap());
        release.wait();
        assert_eq!(in_flight.join().unwrap(), 1);

        assert!(!injector.is_started());
        assert_eq!(injector.state(), StyleState::default());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_rerequest_after_theme_change_is_dropped() {
        let (injector, transport, _ambient) = setup(false);
        let registration = injector.start(transport.clone()).unwrap();
        transport.deliver(
            kinds::GET_CSS_RESPONSE,
            Some(&json!({ "css": "a{}", "theme": "Light+" })),
        );
        transport.drain_outbox();
        let before = injector.state();
        transport.reject_posts(Some("host gone"));

        let consumed = transport.deliver(
            kinds::UPDATE_SETTINGS,
            Some(&json!(r#"{"extraSettings":{"theme":"Dark+"}}"#)),
        );

        assert_eq!(consumed, 1);
        assert_eq!(transport.outbox_len(), 0);
        assert_eq!(injector.state(), before);
        assert!(registration.is_active());

        // Posting recovers and the next change is requested normally.
        transport.reject_posts(None);
        transport.deliver(
            kinds::UPDATE_SETTINGS,
            Some(&json!(r#"{"extraSettings":{"theme":"Dark+"}}"#)),
        );
        assert_eq!(
            transport.drain_outbox(),
            vec![OutboundMessage::style_request(false)]
        );
    }

    #[test]
    fn test_empty_theme_differs_from_absent_theme() {
        let (injector, transport, _ambient) = setup(false);
        let _registration = injector.start(transport.clone()).unwrap();
        transport.deliver(kinds::GET_CSS_RESPONSE, Some(&json!({ "css": "a{}" })));
        transport.drain_outbox();
        assert_eq!(injector.state().theme, None);

        transport.deliver(
            kinds::UPDATE_SETTINGS,
            Some(&json!(r#"{"extraSettings":{"theme":""}}"#)),
        );

        assert_eq!(
            transport.drain_outbox(),
            vec![OutboundMessage::style_request(false)]
        );
    }
}
