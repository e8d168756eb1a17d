//! Dark/light classification of the ambient theme

use crate::ambient::{AmbientTheme, StaticTheme};
use crate::scheme::{base_themes, ColorScheme};
use std::fmt;
use std::sync::Arc;

/// Classifies the ambient base theme as dark or light.
///
/// Any base theme other than the light sentinel is dark. When the ambient
/// source cannot be inspected the result is light, so styling is never held
/// up by a missing signal. Nothing is cached: every call reads the source.
#[derive(Clone)]
pub struct ThemeClassifier {
    source: Arc<dyn AmbientTheme>,
    light_sentinel: String,
}

impl ThemeClassifier {
    /// Classify `source` against the default light sentinel
    pub fn new(source: Arc<dyn AmbientTheme>) -> Self {
        Self {
            source,
            light_sentinel: base_themes::LIGHT.to_string(),
        }
    }

    /// Replace the base theme name treated as light
    pub fn with_light_sentinel(mut self, light_sentinel: impl Into<String>) -> Self {
        self.light_sentinel = light_sentinel.into();
        self
    }

    /// Base theme name treated as light
    pub fn light_sentinel(&self) -> &str {
        &self.light_sentinel
    }

    /// Classify an already-read base theme name
    pub fn classify(&self, base_theme: Option<&str>) -> ColorScheme {
        ColorScheme::from_dark(base_theme.is_some_and(|name| name != self.light_sentinel))
    }

    /// Read the ambient source and classify it
    pub fn scheme(&self) -> ColorScheme {
        let base_theme = self.source.base_theme();
        let scheme = self.classify(base_theme.as_deref());
        tracing::trace!("ambient base theme {:?} classified {}", base_theme, scheme);
        scheme
    }

    /// Read the ambient source; `true` when it is dark
    pub fn is_dark(&self) -> bool {
        self.scheme().is_dark()
    }
}

impl Default for ThemeClassifier {
    fn default() -> Self {
        Self::new(Arc::new(StaticTheme::unavailable()))
    }
}

impl fmt::Debug for ThemeClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeClassifier")
            .field("light_sentinel", &self.light_sentinel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::SharedBaseTheme;

    #[test]
    fn test_only_sentinel_is_light() {
        let classifier = ThemeClassifier::default();

        assert_eq!(classifier.classify(Some("vscode-light")), ColorScheme::Light);
        assert_eq!(classifier.classify(Some("vscode-dark")), ColorScheme::Dark);
        assert_eq!(
            classifier.classify(Some("vscode-high-contrast")),
            ColorScheme::Dark
        );
        assert_eq!(classifier.classify(Some("")), ColorScheme::Dark);
        assert_eq!(classifier.classify(Some("VSCODE-LIGHT")), ColorScheme::Dark);
    }

    #[test]
    fn test_unavailable_source_is_light() {
        assert!(!ThemeClassifier::default().is_dark());
    }

    #[test]
    fn test_reads_source_every_time() {
        let ambient = SharedBaseTheme::new(Some("vscode-light"));
        let classifier = ThemeClassifier::new(Arc::new(ambient.clone()));

        assert!(!classifier.is_dark());
        ambient.set(Some("vscode-dark"));
        assert!(classifier.is_dark());
        ambient.set(None);
        assert!(!classifier.is_dark());
    }

    #[test]
    fn test_custom_sentinel() {
        let classifier = ThemeClassifier::new(Arc::new(StaticTheme::named("daylight")))
            .with_light_sentinel("daylight");

        assert_eq!(classifier.light_sentinel(), "daylight");
        assert!(!classifier.is_dark());
        assert_eq!(classifier.classify(Some("vscode-light")), ColorScheme::Dark);
    }
}
