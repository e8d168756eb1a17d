//! Injector state and its transitions

use stylesync_platform::CssResponse;

/// Rendering state owned by one injector
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleState {
    /// Stylesheet to render; the placeholder until the first response
    pub root_css: Option<String>,
    /// Host theme name of the last applied response
    pub theme: Option<String>,
    /// Ambient classification recorded with the last applied response
    pub known_dark: Option<bool>,
}

impl StyleState {
    /// Whether a stylesheet (real or placeholder) is present
    pub fn has_css(&self) -> bool {
        self.root_css.as_deref().is_some_and(|css| !css.is_empty())
    }

    /// Apply a style response.
    ///
    /// `computed_dark` must come from the ambient classifier, not from the
    /// response. Empty CSS leaves the state untouched. Otherwise every field
    /// is replaced, and the new dark flag is returned if it differs from the
    /// previously stored one (including the first time one is stored).
    pub fn apply_response(&mut self, response: CssResponse, computed_dark: bool) -> Option<bool> {
        if response.css.is_empty() {
            return None;
        }

        let changed = self.known_dark != Some(computed_dark);

        self.root_css = Some(response.css);
        self.theme = response.theme;
        self.known_dark = Some(computed_dark);

        changed.then_some(computed_dark)
    }

    /// Whether a host-reported theme differs from the stored one
    pub fn theme_changed(&self, incoming: &str) -> bool {
        self.theme.as_deref() != Some(incoming)
    }
}
