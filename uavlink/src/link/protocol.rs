//! Wire format for frames exchanged over the link.
//!
//! Frames are JSON text messages tagged by event name:
//!
//! ```json
//! {"event": "position_update", "data": {"latitude": 45.31, "longitude": -75.91, "altitude": 300}}
//! ```

use serde::{Deserialize, Serialize};

use super::error::LinkError;
use crate::position::PositionSample;

/// Application messages carried by the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum LinkMessage {
    /// Mover → station position report.
    PositionUpdate(PositionSample),
}

impl LinkMessage {
    /// Event name on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            LinkMessage::PositionUpdate(_) => "position_update",
        }
    }

    /// Encode as a JSON text frame.
    pub fn encode(&self) -> Result<String, LinkError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame.
    ///
    /// Anything that is not a known event with a well-formed, finite payload
    /// is reported as [`LinkError::MalformedPayload`].
    pub fn decode(text: &str) -> Result<Self, LinkError> {
        let message: LinkMessage =
            serde_json::from_str(text).map_err(|e| LinkError::MalformedPayload(e.to_string()))?;

        match &message {
            LinkMessage::PositionUpdate(sample) if !sample.is_finite() => Err(
                LinkError::MalformedPayload("non-finite coordinate".to_string()),
            ),
            _ => Ok(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_position_update() {
        let message = LinkMessage::PositionUpdate(PositionSample::new(45.31, -75.91, 300.0));
        let json: serde_json::Value = serde_json::from_str(&message.encode().unwrap()).unwrap();

        assert_eq!(json["event"], "position_update");
        assert_eq!(json["data"]["latitude"], 45.31);
        assert_eq!(json["data"]["longitude"], -75.91);
        assert_eq!(json["data"]["altitude"], 300.0);
        assert_eq!(message.event_name(), "position_update");
    }

    #[test]
    fn test_decode_position_update() {
        let text = r#"{"event":"position_update","data":{"latitude":1.5,"longitude":2.5,"altitude":3}}"#;
        let message = LinkMessage::decode(text).unwrap();
        assert_eq!(
            message,
            LinkMessage::PositionUpdate(PositionSample::new(1.5, 2.5, 3.0))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            LinkMessage::decode("not json"),
            Err(LinkError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_event() {
        let text = r#"{"event":"heartbeat","data":{}}"#;
        assert!(matches!(
            LinkMessage::decode(text),
            Err(LinkError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let text = r#"{"event":"position_update","data":{"latitude":1.5}}"#;
        assert!(matches!(
            LinkMessage::decode(text),
            Err(LinkError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_finite() {
        // JSON has no NaN literal; an overflowing number parses to infinity.
        let text = r#"{"event":"position_update","data":{"latitude":1e400,"longitude":0,"altitude":0}}"#;
        assert!(LinkMessage::decode(text).is_err());
    }
}
