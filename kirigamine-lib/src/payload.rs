//! XML payloads exchanged with the adaptor's `/smart` endpoint.
//!
//! Requests are small `<CSV>` documents; responses are `<LSV>` documents
//! carrying identity fields and hex frames in `<CODE>` elements. The shapes are
//! fixed, so plain pattern extraction is enough.

use crate::crypto::{EnvelopeKey, decrypt_payload, encrypt_payload};
use crate::error::KirigamineError;
use crate::frame::Frame;
use regex::Regex;
use std::sync::LazyLock;

static ROOT_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:<\?xml[^>]*\?>)?\s*<[A-Za-z_][\w.-]*[^>]*>\s*([^<]*?)\s*<").expect("static regex")
});
static CODE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<CODE>.*?<VALUE>([^<]*)</VALUE>").expect("static regex"));
static PROFILE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<PROFILECODE>.*?<VALUE>([^<]*)</VALUE>").expect("static regex"));
static MAC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<MAC>([^<]*)</MAC>").expect("static regex"));
static SERIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<SERIAL>([^<]*)</SERIAL>").expect("static regex"));
static VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<VERSION>([^<]*)</VERSION>").expect("static regex"));

/// Poll the current device state
pub fn status_request() -> String {
    "<CSV><CONNECT>ON</CONNECT></CSV>".to_string()
}

/// Enable the ECHONET Lite interface
pub fn echonet_enable_request() -> String {
    "<CSV><CONNECT>ON</CONNECT><ECHONET>ON</ECHONET></CSV>".to_string()
}

/// Send one command frame
pub fn hex_command_request(frame: &[u8]) -> String {
    format!(
        "<CSV><CONNECT>ON</CONNECT><CODE><VALUE>{}</VALUE></CODE></CSV>",
        hex::encode(frame)
    )
}

/// Wrap an encrypted payload into the HTTP request body.
pub fn wrap_envelope(encrypted: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><ESV>{}</ESV>"#, encrypted)
}

/// Text content of the response's root element (the encrypted payload).
pub fn unwrap_envelope(body: &str) -> Result<&str, KirigamineError> {
    let text = ROOT_TEXT
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(KirigamineError::Payload("response has no root text".to_string()));
    }
    Ok(text)
}

/// Encrypt a request payload and wrap it into a request body.
pub fn seal_request(payload: &str, key: &EnvelopeKey) -> String {
    wrap_envelope(&encrypt_payload(payload, key, None))
}

/// Unwrap and decrypt a response body into its XML payload.
pub fn open_response(body: &str, key: &EnvelopeKey) -> Result<String, KirigamineError> {
    decrypt_payload(unwrap_envelope(body)?, key)
}

/// Contents of a decrypted `<LSV>` response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceResponse {
    pub mac: Option<String>,
    pub serial: Option<String>,
    pub version: Option<String>,
    /// Hex strings from `<CODE>` elements, in document order
    pub code_values: Vec<String>,
    /// Hex strings from `<PROFILECODE>` elements, in document order
    pub profile_codes: Vec<String>,
}

impl DeviceResponse {
    pub fn parse(xml: &str) -> Self {
        let single = |re: &Regex| re.captures(xml).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_string());
        let all = |re: &Regex| {
            re.captures_iter(xml)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .collect::<Vec<_>>()
        };

        Self {
            mac: single(&MAC),
            serial: single(&SERIAL),
            version: single(&VERSION),
            code_values: all(&CODE_VALUE),
            profile_codes: all(&PROFILE_VALUE),
        }
    }

    /// Code values that decode as hex; others are dropped.
    pub fn frames(&self) -> Vec<Frame> {
        self.code_values
            .iter()
            .filter_map(|value| match Frame::from_hex(value) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::debug!(%value, error = %e, "Skipping code value");
                    None
                }
            })
            .collect()
    }
}
