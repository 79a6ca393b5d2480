use crate::constants::*;
use crate::error::KirigamineError;
use crate::frame::{Frame, FrameGroup, validate_state_frame};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error status from an Error (subtype `0x04`) frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    /// Big-endian code at offsets 9..11; `0x8000` means no error
    pub error_code: u16,
}

impl Default for ErrorState {
    fn default() -> Self {
        Self {
            error_code: NO_ERROR_CODE,
        }
    }
}

impl ErrorState {
    pub fn from_bytes(data: &[u8]) -> Result<Self, KirigamineError> {
        validate_state_frame(data, FrameGroup::Error)?;
        Ok(Self {
            error_code: u16::from_be_bytes([data[9], data[10]]),
        })
    }

    pub fn is_abnormal(&self) -> bool {
        self.error_code != NO_ERROR_CODE
    }
}

impl TryFrom<&Frame> for ErrorState {
    type Error = KirigamineError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        Self::from_bytes(frame.as_bytes())
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_abnormal() {
            write!(f, "Abnormal (code 0x{:04x})", self.error_code)
        } else {
            write!(f, "Normal")
        }
    }
}
