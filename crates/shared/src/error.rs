use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body shapes emitted by the backend: `{"error": ..}` from the web
/// proxy, `{"detail": ..}` from the despacho service, or plain text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Some(error);
        }
        match self.detail {
            Some(Value::String(detail)) if !detail.trim().is_empty() => return Some(detail),
            Some(Value::Null) | None => {}
            Some(Value::String(_)) => {}
            Some(other) => return Some(other.to_string()),
        }
        self.message.filter(|m| !m.trim().is_empty())
    }
}

/// Pulls a human-readable message out of an error response body.
pub fn error_message_from_body(body: &[u8]) -> Option<String> {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if let Some(message) = parsed.into_message() {
            return Some(message);
        }
        // Valid JSON object without any known key carries nothing useful.
        if serde_json::from_slice::<serde_json::Map<String, Value>>(body).is_ok() {
            return None;
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_error_key() {
        let body = br#"{"error": "Despacho duplicado", "detail": "ignored"}"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("Despacho duplicado")
        );
    }

    #[test]
    fn reads_detail_string_and_structured_detail() {
        assert_eq!(
            error_message_from_body(br#"{"detail": "Despacho no encontrado"}"#).as_deref(),
            Some("Despacho no encontrado")
        );
        let structured = error_message_from_body(br#"{"detail": [{"loc": ["body"]}]}"#)
            .expect("structured detail");
        assert!(structured.contains("loc"));
    }

    #[test]
    fn falls_back_to_plain_text() {
        assert_eq!(
            error_message_from_body(b"  El archivo no es un PDF valido \n").as_deref(),
            Some("El archivo no es un PDF valido")
        );
    }

    #[test]
    fn empty_or_keyless_bodies_have_no_message() {
        assert_eq!(error_message_from_body(b""), None);
        assert_eq!(error_message_from_body(br#"{"status": "failed"}"#), None);
        assert_eq!(error_message_from_body(br#"{"error": ""}"#), None);
    }
}
