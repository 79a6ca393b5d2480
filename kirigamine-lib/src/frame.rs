use crate::checksum::{expected_frame_checksum, verify_frame};
use crate::constants::*;
use crate::error::KirigamineError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// State group a frame carries, selected by the subtype byte at offset 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum FrameGroup {
    General,
    Sensor,
    Error,
    Energy,
    Unknown,
}

impl FrameGroup {
    /// Classify a raw frame by its group marker and subtype.
    ///
    /// Total: short frames and unrecognised markers are `Unknown`.
    pub fn classify(frame: &[u8]) -> Self {
        if frame.len() < MIN_CLASSIFY_SIZE || !GROUP_MARKERS.contains(&frame[GROUP_MARKER_OFFSET]) {
            return FrameGroup::Unknown;
        }
        match frame[SUBTYPE_OFFSET] {
            SUBTYPE_GENERAL => FrameGroup::General,
            SUBTYPE_SENSOR => FrameGroup::Sensor,
            SUBTYPE_ERROR => FrameGroup::Error,
            SUBTYPE_ENERGY => FrameGroup::Energy,
            _ => FrameGroup::Unknown,
        }
    }

    pub fn subtype(&self) -> Option<u8> {
        match self {
            FrameGroup::General => Some(SUBTYPE_GENERAL),
            FrameGroup::Sensor => Some(SUBTYPE_SENSOR),
            FrameGroup::Error => Some(SUBTYPE_ERROR),
            FrameGroup::Energy => Some(SUBTYPE_ENERGY),
            FrameGroup::Unknown => None,
        }
    }

    /// Minimum frame size the group's decoder accepts
    pub fn min_size(&self) -> usize {
        match self {
            FrameGroup::General => GENERAL_MIN_SIZE,
            FrameGroup::Sensor => SENSOR_MIN_SIZE,
            FrameGroup::Error => ERROR_MIN_SIZE,
            FrameGroup::Energy => ENERGY_MIN_SIZE,
            FrameGroup::Unknown => MIN_CLASSIFY_SIZE,
        }
    }
}

/// One checksummed frame as exchanged inside `<VALUE>` elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Parse a hex frame. Odd-length or non-hex strings are rejected.
    pub fn from_hex(hex_str: &str) -> Result<Self, KirigamineError> {
        let decoded = hex::decode(hex_str.trim())?;
        Ok(Self::new(Bytes::from(decoded)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn group(&self) -> FrameGroup {
        FrameGroup::classify(&self.bytes)
    }

    /// Lowercase hex, the form the adaptor expects
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Checksum byte stored at the end of the frame
    pub fn stored_checksum(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// Checksum computed over `frame[1..len - 1]`
    pub fn computed_checksum(&self) -> Option<u8> {
        expected_frame_checksum(&self.bytes)
    }

    pub fn is_valid(&self) -> bool {
        verify_frame(&self.bytes).is_ok()
    }
}

impl From<Bytes> for Frame {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(Bytes::from(bytes))
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Common prologue of every state decoder: size, then checksum, then group.
///
/// The checksum is checked before the group so that any corruption of a
/// valid frame surfaces as a checksum error.
pub(crate) fn validate_state_frame(data: &[u8], group: FrameGroup) -> Result<(), KirigamineError> {
    let expected = group.min_size();
    if data.len() < expected {
        return Err(KirigamineError::InsufficientData {
            expected,
            actual: data.len(),
        });
    }
    verify_frame(data)?;
    let actual = FrameGroup::classify(data);
    if actual != group {
        return Err(KirigamineError::UnexpectedGroup { expected: group, actual });
    }
    Ok(())
}
