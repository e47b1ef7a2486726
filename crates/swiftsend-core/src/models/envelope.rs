//! Wire envelopes used by every auth endpoint.

use serde::Deserialize;

/// Success envelope: `{ success, message?, data? }`.
///
/// `data` is absent on a few endpoints (logout), so it stays optional here
/// and callers decide whether its absence is an error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error envelope: `{ success: false, error, error_code, timestamp }`.
///
/// `success` is required so that arbitrary JSON bodies do not parse as an
/// error envelope by accident.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deliberately no Default impl: the envelope must deserialize for any
    // payload type, absent fields included.
    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        id: String,
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let envelope: Envelope<Payload> =
            serde_json::from_str(r#"{"success":true}"#).expect("parse");
        assert!(envelope.success);
        assert!(envelope.message.is_none());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn data_parses_when_present() {
        let envelope: Envelope<Payload> =
            serde_json::from_str(r#"{"success":true,"data":{"id":"usr_1"}}"#).expect("parse");
        assert_eq!(envelope.data.expect("data").id, "usr_1");
    }
}
