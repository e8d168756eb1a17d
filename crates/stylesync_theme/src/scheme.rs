//! Color scheme and base theme names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base theme names exposed by the embedding environment
pub mod base_themes {
    /// The only name classified as light by default
    pub const LIGHT: &str = "vscode-light";
    /// Dark base theme
    pub const DARK: &str = "vscode-dark";
    /// High contrast base theme (classified as dark)
    pub const HIGH_CONTRAST: &str = "vscode-high-contrast";

    /// Every recognised base theme
    pub const ALL: [&str; 3] = [LIGHT, DARK, HIGH_CONTRAST];
}

/// Light or dark presentation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Light background, dark text
    #[default]
    Light,
    /// Dark background, light text
    Dark,
}

impl ColorScheme {
    /// Scheme for a dark flag
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Whether this is the dark scheme
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dark_roundtrips_flag() {
        assert!(ColorScheme::from_dark(true).is_dark());
        assert!(!ColorScheme::from_dark(false).is_dark());
    }

    #[test]
    fn test_display() {
        assert_eq!(ColorScheme::Dark.to_string(), "dark");
        assert_eq!(ColorScheme::default().to_string(), "light");
    }
}
