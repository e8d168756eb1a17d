//! JSON envelope used when messages travel as text

use crate::error::ProtocolError;
use crate::message::{InboundMessage, OutboundMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ "type": kind, "payload": ... }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl WireMessage {
    /// Create an envelope
    pub fn new(kind: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Parse an envelope from JSON text
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::invalid_json("envelope", e))
    }

    /// Serialize the envelope to JSON text
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::invalid_json(&self.kind, e))
    }
}

impl From<&OutboundMessage> for WireMessage {
    fn from(message: &OutboundMessage) -> Self {
        Self::new(message.kind(), Some(message.payload()))
    }
}

impl From<&InboundMessage> for WireMessage {
    fn from(message: &InboundMessage) -> Self {
        Self::new(message.kind(), Some(message.payload()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::kinds;
    use serde_json::json;

    #[test]
    fn test_outbound_envelope_text() {
        let wire = WireMessage::from(&OutboundMessage::style_request(false));

        let text = wire.to_json().unwrap();

        assert_eq!(text, r#"{"type":"get_css_request","payload":{"isDark":false}}"#);
    }

    #[test]
    fn test_envelope_without_payload() {
        let wire = WireMessage::from_json(r#"{"type":"update_settings"}"#).unwrap();

        assert_eq!(wire.kind, kinds::UPDATE_SETTINGS);
        assert_eq!(wire.payload, None);
    }

    #[test]
    fn test_envelope_with_null_payload() {
        let wire = WireMessage::from_json(r#"{"type":"get_css_response","payload":null}"#).unwrap();

        assert_eq!(wire.payload, None);
    }

    #[test]
    fn test_envelope_requires_type() {
        assert!(WireMessage::from_json(r#"{"payload":{"css":"a"}}"#).is_err());
        assert!(WireMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_inbound_envelope_payload() {
        let message = InboundMessage::SettingsUpdate(r#"{"extraSettings":{}}"#.to_string());

        let wire = WireMessage::from(&message);

        assert_eq!(wire.kind, kinds::UPDATE_SETTINGS);
        assert_eq!(wire.payload, Some(json!(r#"{"extraSettings":{}}"#)));
    }
}
