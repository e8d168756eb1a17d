//! stylesync Theme Detection
//!
//! Decides whether the embedding environment is currently dark or light.
//!
//! The environment exposes a base theme name (for a webview, one of the
//! `vscode-*` classes on the document body). That name is read through an
//! [`AmbientTheme`] source and classified by a [`ThemeClassifier`]: anything
//! but the light sentinel is dark, and an unreadable source is light.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stylesync_theme::{ColorScheme, SharedBaseTheme, ThemeClassifier};
//!
//! let ambient = SharedBaseTheme::new(Some("vscode-dark"));
//! let classifier = ThemeClassifier::new(Arc::new(ambient.clone()));
//! assert_eq!(classifier.scheme(), ColorScheme::Dark);
//!
//! ambient.set(Some("vscode-light"));
//! assert!(!classifier.is_dark());
//! ```

pub mod ambient;
pub mod classifier;
pub mod scheme;

pub use ambient::{
    detect_base_theme, AmbientTheme, ClassListTheme, FnTheme, SharedBaseTheme, StaticTheme,
};
pub use classifier::ThemeClassifier;
pub use scheme::{base_themes, ColorScheme};
