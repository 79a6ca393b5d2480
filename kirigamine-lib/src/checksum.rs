//! FCC checksum used by every frame.
//!
//! The checksum is the two's complement of the byte sum, so a valid frame's
//! bytes from offset 1 through the checksum itself sum to zero mod 256.

use crate::error::KirigamineError;

/// Compute the checksum byte for `payload`: `0x100 - (sum % 0x100)`, reduced to one byte.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum)
}

/// Checksum a complete frame should carry in its last byte.
///
/// Covers `frame[1..len - 1]`; the sync byte and the checksum slot are excluded.
/// Returns `None` for frames too short to hold a sync byte and a checksum.
pub fn expected_frame_checksum(frame: &[u8]) -> Option<u8> {
    if frame.len() < 2 {
        return None;
    }
    Some(checksum(&frame[1..frame.len() - 1]))
}

/// Verify the trailing checksum of a frame.
pub fn verify_frame(frame: &[u8]) -> Result<(), KirigamineError> {
    let expected = expected_frame_checksum(frame).ok_or(KirigamineError::InsufficientData {
        expected: 2,
        actual: frame.len(),
    })?;
    let actual = frame[frame.len() - 1];
    if expected != actual {
        return Err(KirigamineError::Checksum { expected, actual });
    }
    Ok(())
}
