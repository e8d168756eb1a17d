//! Message protocol spoken with the host
//!
//! Messages cross the boundary as a kind string plus an optional untyped
//! JSON payload. They are decoded here, once, into tagged unions so the
//! rest of the stack never inspects raw payloads.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message kind names as they appear on the wire
pub mod kinds {
    /// Outbound: ask the host for the current stylesheet
    pub const GET_CSS_REQUEST: &str = "get_css_request";
    /// Inbound: stylesheet answer from the host
    pub const GET_CSS_RESPONSE: &str = "get_css_response";
    /// Inbound: host settings changed (JSON-encoded string payload)
    pub const UPDATE_SETTINGS: &str = "update_settings";
}

/// Payload of a style request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRequest {
    /// Whether the requester expects a dark stylesheet
    #[serde(rename = "isDark")]
    pub is_dark: bool,
}

/// Payload of a style response
///
/// Missing or null css decodes as an empty string; a missing or null theme
/// stays absent. Any other fields the host sends along (such as its own
/// dark/light verdict) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CssResponse {
    /// Stylesheet text
    pub css: String,
    /// Host theme name the stylesheet was generated for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl<'de> Deserialize<'de> for CssResponse {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            css: Option<String>,
            #[serde(default)]
            theme: Option<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            css: raw.css.unwrap_or_default(),
            theme: raw.theme,
        })
    }
}

impl CssResponse {
    /// Create a response payload
    pub fn new(css: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            theme: Some(theme.into()),
        }
    }
}

/// The subset of host settings this crate cares about
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostSettings {
    /// `extraSettings.theme`, when present and a string
    pub theme: Option<String>,
}

impl HostSettings {
    /// Parse a JSON-encoded settings document
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ProtocolError::invalid_json(kinds::UPDATE_SETTINGS, e))?;

        let theme = value
            .get("extraSettings")
            .and_then(|extra| extra.get("theme"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { theme })
    }
}

/// Messages received from the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundMessage {
    /// Stylesheet answer
    StyleResponse(CssResponse),
    /// Raw JSON text of the updated settings
    SettingsUpdate(String),
}

impl InboundMessage {
    /// Decode a kind and optional payload.
    ///
    /// Returns `Ok(None)` for unknown kinds and for known kinds whose payload
    /// is absent, null, or an empty settings string: there is nothing to act
    /// on in either case.
    pub fn decode(kind: &str, payload: Option<&Value>) -> Result<Option<Self>, ProtocolError> {
        let payload = match payload {
            Some(Value::Null) | None => return Ok(None),
            Some(payload) => payload,
        };

        match kind {
            kinds::GET_CSS_RESPONSE => {
                let response = CssResponse::deserialize(payload)
                    .map_err(|e| ProtocolError::invalid_json(kind, e))?;
                Ok(Some(Self::StyleResponse(response)))
            }
            kinds::UPDATE_SETTINGS => match payload {
                Value::String(raw) if raw.is_empty() => Ok(None),
                Value::String(raw) => Ok(Some(Self::SettingsUpdate(raw.clone()))),
                _ => Err(ProtocolError::unexpected(kind, "a JSON-encoded string")),
            },
            _ => Ok(None),
        }
    }

    /// Wire kind of this message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StyleResponse(_) => kinds::GET_CSS_RESPONSE,
            Self::SettingsUpdate(_) => kinds::UPDATE_SETTINGS,
        }
    }

    /// Wire payload of this message
    pub fn payload(&self) -> Value {
        match self {
            Self::StyleResponse(response) => serde_json::json!({
                "css": response.css,
                "theme": response.theme,
            }),
            Self::SettingsUpdate(raw) => Value::String(raw.clone()),
        }
    }
}

/// Messages sent to the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Ask for the current stylesheet
    StyleRequest(CssRequest),
}

impl OutboundMessage {
    /// Shorthand for a style request
    pub fn style_request(is_dark: bool) -> Self {
        Self::StyleRequest(CssRequest { is_dark })
    }

    /// Wire kind of this message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StyleRequest(_) => kinds::GET_CSS_REQUEST,
        }
    }

    /// Wire payload of this message
    pub fn payload(&self) -> Value {
        match self {
            Self::StyleRequest(request) => serde_json::json!({ "isDark": request.is_dark }),
        }
    }
}
