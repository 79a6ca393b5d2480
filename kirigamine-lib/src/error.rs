use crate::frame::FrameGroup;
use thiserror::Error;

/// The primary error type for the `kirigamine-lib` library.
#[derive(Error, Debug)]
pub enum KirigamineError {
    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Invalid hex frame: {0}")]
    InvalidHex(String),

    #[error("Checksum mismatch: expected 0x{expected:02x}, got 0x{actual:02x}")]
    Checksum { expected: u8, actual: u8 },

    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Unexpected frame group: expected {expected}, got {actual}")]
    UnexpectedGroup { expected: FrameGroup, actual: FrameGroup },

    #[error("Envelope decode error: {0}")]
    Decode(String),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KirigamineError {
    /// Frame-shape problems: too short or not valid hex.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            KirigamineError::InsufficientData { .. } | KirigamineError::InvalidHex(_)
        )
    }

    /// Envelope-level failures: base64, padding or UTF-8.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            KirigamineError::Decode(_) | KirigamineError::Base64(_) | KirigamineError::Utf8(_)
        )
    }
}

impl From<hex::FromHexError> for KirigamineError {
    fn from(err: hex::FromHexError) -> Self {
        KirigamineError::InvalidHex(err.to_string())
    }
}
