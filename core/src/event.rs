use serde::Deserialize;
use serde_json::Value;

use crate::print_job::PrintOutcome;
use crate::Error;

/// A push message as delivered by the server, before decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginMessage {
    pub plugin: String,
    pub data: Value,
}

impl PluginMessage {
    pub fn new(plugin: impl Into<String>, data: Value) -> Self {
        Self {
            plugin: plugin.into(),
            data,
        }
    }
}

/// One frame read from the push socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketFrame {
    Plugin(PluginMessage),
    /// A server event such as `SettingsUpdated`.
    Event { kind: String },
    Other,
}

impl SocketFrame {
    /// Plugin frames look like `{"plugin": {"plugin": <id>, "data": {...}}}`,
    /// server events like `{"event": {"type": <name>, "payload": {...}}}`.
    pub fn decode(text: &str) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct PluginEnvelope {
            plugin: String,
            #[serde(default)]
            data: Value,
        }

        #[derive(Deserialize)]
        struct EventEnvelope {
            #[serde(rename = "type")]
            kind: String,
        }

        let frame: Value = serde_json::from_str(text).map_err(|source| Error::Decode {
            context: "push frame".to_string(),
            source,
        })?;

        if let Some(inner) = frame.get("plugin") {
            let envelope: PluginEnvelope =
                serde_json::from_value(inner.clone()).map_err(|source| Error::Decode {
                    context: "plugin message".to_string(),
                    source,
                })?;
            return Ok(SocketFrame::Plugin(PluginMessage::new(
                envelope.plugin,
                envelope.data,
            )));
        }
        if let Some(inner) = frame.get("event") {
            let envelope: EventEnvelope =
                serde_json::from_value(inner.clone()).map_err(|source| Error::Decode {
                    context: "server event".to_string(),
                    source,
                })?;
            return Ok(SocketFrame::Event {
                kind: envelope.kind,
            });
        }
        Ok(SocketFrame::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    RemoteError(String),
    RegistrationReady {
        qr_image_url: String,
        serial_number: Option<String>,
    },
    PrinterRemoved,
    PrintFinished(PrintOutcome),
    Ignored,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPushPayload {
    error: Option<Value>,
    #[serde(rename = "qrImageUrl", alias = "qr_image_url")]
    qr_image_url: Option<String>,
    #[serde(rename = "printerSerialNumber", alias = "printer_serial_number")]
    printer_serial_number: Option<String>,
    #[serde(rename = "printerRemoved", alias = "printer_removed")]
    printer_removed: Option<Value>,
    #[serde(rename = "mmfPrintComplete", alias = "mmf_print_complete")]
    mmf_print_complete: Option<Value>,
    #[serde(rename = "mmfPrintCancelled", alias = "mmf_print_cancelled")]
    mmf_print_cancelled: Option<Value>,
}

impl PushEvent {
    /// Decodes a payload into the single event it stands for. When several
    /// fields are present the first in this order wins: error, QR code,
    /// printer removed, print complete, print cancelled.
    pub fn decode(payload: &Value) -> Result<Self, Error> {
        Self::decode_against(payload, "")
    }

    /// Like [`PushEvent::decode`], but a QR code equal to `displayed_qr` does
    /// not count, so the remaining fields still get a say.
    pub fn decode_against(payload: &Value, displayed_qr: &str) -> Result<Self, Error> {
        if !payload.is_object() {
            return Ok(PushEvent::Ignored);
        }
        let raw: RawPushPayload =
            serde_json::from_value(payload.clone()).map_err(|source| Error::Decode {
                context: "push payload".to_string(),
                source,
            })?;

        if let Some(error) = raw.error.as_ref().filter(|value| truthy(value)) {
            return Ok(PushEvent::RemoteError(error_text(error)));
        }
        if let Some(qr_image_url) = raw
            .qr_image_url
            .filter(|url| !url.is_empty() && url != displayed_qr)
        {
            return Ok(PushEvent::RegistrationReady {
                qr_image_url,
                serial_number: raw.printer_serial_number,
            });
        }
        if raw.printer_removed.as_ref().is_some_and(truthy) {
            return Ok(PushEvent::PrinterRemoved);
        }
        if raw.mmf_print_complete.as_ref().is_some_and(truthy) {
            return Ok(PushEvent::PrintFinished(PrintOutcome::Completed));
        }
        if raw.mmf_print_cancelled.as_ref().is_some_and(truthy) {
            return Ok(PushEvent::PrintFinished(PrintOutcome::Cancelled));
        }
        Ok(PushEvent::Ignored)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_takes_precedence() {
        let event = PushEvent::decode(&json!({"error": "token expired", "qrImageUrl": "https://x/qr.png"}))
            .expect("decode");
        assert_eq!(event, PushEvent::RemoteError("token expired".to_string()));
    }

    #[test]
    fn numeric_error_is_rendered() {
        let event = PushEvent::decode(&json!({"error": 401})).expect("decode");
        assert_eq!(event, PushEvent::RemoteError("401".to_string()));
    }

    #[test]
    fn qr_code_with_serial() {
        let event = PushEvent::decode(&json!({
            "qrImageUrl": "https://x/qr.png",
            "printerSerialNumber": "SN999"
        }))
        .expect("decode");
        assert_eq!(
            event,
            PushEvent::RegistrationReady {
                qr_image_url: "https://x/qr.png".to_string(),
                serial_number: Some("SN999".to_string()),
            }
        );
    }

    #[test]
    fn backend_snake_case_fields_are_accepted() {
        assert_eq!(
            PushEvent::decode(&json!({"printer_removed": true})).expect("decode"),
            PushEvent::PrinterRemoved
        );
        assert_eq!(
            PushEvent::decode(&json!({"mmf_print_cancelled": true})).expect("decode"),
            PushEvent::PrintFinished(PrintOutcome::Cancelled)
        );
    }

    #[test]
    fn completion_wins_over_cancellation() {
        let event = PushEvent::decode(&json!({"mmfPrintComplete": true, "mmfPrintCancelled": true}))
            .expect("decode");
        assert_eq!(event, PushEvent::PrintFinished(PrintOutcome::Completed));
    }

    #[test]
    fn falsy_fields_are_ignored() {
        for payload in [
            json!({}),
            json!({"error": ""}),
            json!({"qrImageUrl": ""}),
            json!({"printerRemoved": false}),
            json!({"mmfPrintComplete": 0}),
            json!({"somethingElse": true}),
            json!("not an object"),
        ] {
            assert_eq!(PushEvent::decode(&payload).expect("decode"), PushEvent::Ignored);
        }
    }

    #[test]
    fn mistyped_field_is_a_decode_error() {
        assert!(PushEvent::decode(&json!({"qrImageUrl": 42})).is_err());
    }

    #[test]
    fn socket_frame_carries_plugin_message() {
        let frame = r#"{"plugin": {"plugin": "myminifactory", "data": {"printer_removed": true}}}"#;
        assert_eq!(
            SocketFrame::decode(frame).expect("decode frame"),
            SocketFrame::Plugin(PluginMessage::new(
                "myminifactory",
                json!({"printer_removed": true})
            ))
        );
    }

    #[test]
    fn socket_frame_recognizes_server_events() {
        let frame = r#"{"event": {"type": "SettingsUpdated", "payload": {}}}"#;
        assert_eq!(
            SocketFrame::decode(frame).expect("decode frame"),
            SocketFrame::Event {
                kind: "SettingsUpdated".to_string()
            }
        );
        assert_eq!(
            SocketFrame::decode(r#"{"current": {"state": {}}}"#).expect("decode frame"),
            SocketFrame::Other
        );
        assert!(SocketFrame::decode("{oops").is_err());
    }

    #[test]
    fn displayed_qr_code_falls_through_to_other_fields() {
        let payload = json!({"qrImageUrl": "https://x/qr.png", "printerRemoved": true});
        assert_eq!(
            PushEvent::decode_against(&payload, "https://x/qr.png").expect("decode"),
            PushEvent::PrinterRemoved
        );
        assert!(matches!(
            PushEvent::decode_against(&payload, "https://x/old.png").expect("decode"),
            PushEvent::RegistrationReady { .. }
        ));
        assert_eq!(
            PushEvent::decode_against(&json!({"qrImageUrl": "https://x/qr.png"}), "https://x/qr.png")
                .expect("decode"),
            PushEvent::Ignored
        );
    }
}
