//! Ambient theme sources
//!
//! The ambient signal is whatever the surrounding environment says about
//! its current base theme, independent of the host message channel. It is
//! read synchronously and must never block.

use crate::scheme::base_themes;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Synchronous query for the environment's current base theme name.
///
/// Returns `None` when the environment cannot be inspected.
pub trait AmbientTheme: Send + Sync {
    /// Current base theme name
    fn base_theme(&self) -> Option<String>;
}

/// Pick the base theme out of a whitespace-separated class list.
///
/// Returns `None` for an empty list. A non-empty list with no recognised
/// class is reported as light.
pub fn detect_base_theme(class_list: &str) -> Option<&'static str> {
    let mut classes = class_list.split_whitespace().peekable();
    classes.peek()?;

    let found = classes.find_map(|class| base_themes::ALL.into_iter().find(|name| *name == class));
    Some(found.unwrap_or(base_themes::LIGHT))
}

/// Base theme cell updated by the embedder.
///
/// Clones share the same cell, so the embedder keeps one clone to write
/// and hands another to the classifier.
#[derive(Clone, Default)]
pub struct SharedBaseTheme {
    current: Arc<RwLock<Option<String>>>,
}

impl SharedBaseTheme {
    /// Create a cell holding `initial`
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial.map(str::to_string))),
        }
    }

    /// Replace the current base theme
    pub fn set(&self, base_theme: Option<&str>) {
        let value = base_theme.map(str::to_string);
        match self.current.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
        tracing::trace!("ambient base theme set to {:?}", base_theme);
    }
}

impl AmbientTheme for SharedBaseTheme {
    fn base_theme(&self) -> Option<String> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl fmt::Debug for SharedBaseTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBaseTheme")
            .field("current", &self.base_theme())
            .finish()
    }
}

/// Base theme derived from a document body's class attribute
#[derive(Clone, Debug, Default)]
pub struct ClassListTheme {
    classes: SharedBaseTheme,
}

impl ClassListTheme {
    /// Create from the current class attribute
    pub fn new(class_list: &str) -> Self {
        Self {
            classes: SharedBaseTheme::new(Some(class_list)),
        }
    }

    /// Replace the class attribute (the environment switched theme)
    pub fn set_class_list(&self, class_list: &str) {
        self.classes.set(Some(class_list));
    }
}

impl AmbientTheme for ClassListTheme {
    fn base_theme(&self) -> Option<String> {
        let classes = self.classes.base_theme()?;
        detect_base_theme(&classes).map(str::to_string)
    }
}

/// Base theme computed by a closure
pub struct FnTheme<F>(pub F);

impl<F> AmbientTheme for FnTheme<F>
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn base_theme(&self) -> Option<String> {
        (self.0)()
    }
}

/// Fixed base theme
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticTheme(pub Option<String>);

impl StaticTheme {
    /// A source that always reports `name`
    pub fn named(name: &str) -> Self {
        Self(Some(name.to_string()))
    }

    /// A source that can never be inspected
    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl AmbientTheme for StaticTheme {
    fn base_theme(&self) -> Option<String> {
        self.0.clone()
    }
}
